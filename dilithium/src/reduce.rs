use crate::params::Q;

/// q^{-1} mod 2^32.
pub const QINV: i32 = 58728449;

/// 2^32 mod q, the Montgomery form of 1.
pub const MONT: i32 = 4193792;

/// For finite field element a with -2^{31}Q <= a <= Q*2^31, compute r = a*2^{-32} (mod Q) such
/// that -Q < r < Q.
pub fn montgomery_reduce(a: i64) -> i32 {
	let t = (a as i32).wrapping_mul(QINV);
	((a - t as i64 * Q as i64) >> 32) as i32
}

/// For finite field element a with a <= 2^{31} - 2^{22} - 1, compute r = a (mod Q) such that
/// -6283008 <= r <= 6283008.
pub fn reduce32(a: i32) -> i32 {
	let t = (a + (1 << 22)) >> 23;
	a - t * Q
}

/// Add Q if input coefficient is negative.
pub fn caddq(a: i32) -> i32 {
	a + ((a >> 31) & Q)
}

/// Standard representative in [0, Q-1].
pub fn freeze(a: i32) -> i32 {
	caddq(reduce32(a))
}

/// Centered representative in [-(Q-1)/2, (Q-1)/2].
pub fn centered(a: i32) -> i32 {
	let a = freeze(a);
	a - (((Q - 1) / 2 - a) >> 31 & Q)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::{rngs::StdRng, Rng, SeedableRng};

	#[test]
	fn qinv_inverts_q() {
		assert_eq!(Q.wrapping_mul(QINV), 1);
		assert_eq!(MONT as i64, (1i64 << 32) % Q as i64);
	}

	#[test]
	fn montgomery_reduce_divides_by_2_32() {
		let mut rng = StdRng::seed_from_u64(11);
		for _ in 0..10_000 {
			let a = rng.random_range(-(Q as i64) * (1 << 31)..(Q as i64) * (1 << 31));
			let r = montgomery_reduce(a);
			assert!(r > -Q && r < Q, "montgomery_reduce({a}) = {r} out of range");
			let lhs = (r as i64 * (1i64 << 32) - a).rem_euclid(Q as i64);
			assert_eq!(lhs, 0, "r * 2^32 must equal a mod q");
		}
	}

	#[test]
	fn freeze_and_centered_ranges() {
		let mut rng = StdRng::seed_from_u64(12);
		for _ in 0..10_000 {
			let a = rng.random_range(i32::MIN / 2..i32::MAX / 2);
			let f = freeze(a);
			assert!((0..Q).contains(&f));
			assert_eq!((f as i64 - a as i64).rem_euclid(Q as i64), 0);
			let c = centered(a);
			assert!(c.abs() <= (Q - 1) / 2);
			assert_eq!((c as i64 - a as i64).rem_euclid(Q as i64), 0);
		}
		assert_eq!(centered((Q - 1) / 2), (Q - 1) / 2);
		assert_eq!(centered((Q + 1) / 2), -(Q - 1) / 2);
		assert_eq!(caddq(-1), Q - 1);
		assert_eq!(caddq(5), 5);
	}
}
