use crate::{
	params::{D, Q},
	reduce::freeze,
};

/// For finite field element a, compute a0, a1 such that a mod^+ Q = a1*2^D + a0 with
/// -2^{D-1} < a0 <= 2^{D-1}. Assumes a to be standard representative.
///
/// # Arguments
///
/// * 'a' - input element
///
/// Returns a touple (a1, a0)
pub fn power2round(a: i32) -> (i32, i32) {
	let a1 = (a + (1 << (D - 1)) - 1) >> D;
	(a1, a - (a1 << D))
}

/// For finite field element a, compute high and low bits a0, a1 such that a mod^+ Q = a1*2*gamma2
/// + a0 with -gamma2 < a0 <= gamma2, except if a1 = (Q-1)/(2*gamma2) where we set a1 = 0 and
/// -gamma2 <= a0 = a mod^+ Q - Q < 0. Assumes a to be standard representative.
///
/// # Arguments
///
/// * 'a' - input element
/// * 'gamma2' - either (Q-1)/88 or (Q-1)/32
///
/// Returns a touple (a1, a0)
pub fn decompose(a: i32, gamma2: i32) -> (i32, i32) {
	let mut a1 = (a + 127) >> 7;
	if gamma2 == (Q - 1) / 32 {
		a1 = (a1 * 1025 + (1 << 21)) >> 22;
		a1 &= 15;
	} else {
		a1 = (a1 * 11275 + (1 << 23)) >> 24;
		a1 ^= ((43 - a1) >> 31) & a1;
	}
	let mut a0 = a - a1 * 2 * gamma2;
	a0 -= (((Q - 1) / 2 - a0) >> 31) & Q;
	(a1, a0)
}

pub fn high_bits(a: i32, gamma2: i32) -> i32 {
	decompose(a, gamma2).0
}

pub fn low_bits(a: i32, gamma2: i32) -> i32 {
	decompose(a, gamma2).1
}

/// Whether adding z to r moves r into a different high-bits bucket.
///
/// # Arguments
///
/// * 'z' - small perturbation, any representative
/// * 'r' - standard representative
pub fn make_hint(z: i32, r: i32, gamma2: i32) -> bool {
	high_bits(r, gamma2) != high_bits(freeze(r + z), gamma2)
}

/// Correct high bits according to hint.
///
/// # Arguments
///
/// * 'hint' - hint bit
/// * 'a' - standard representative of the value to round
/// * 'gamma2' - rounding range
///
/// Returns corrected high bits
pub fn use_hint(hint: bool, a: i32, gamma2: i32) -> i32 {
	let (a1, a0) = decompose(a, gamma2);
	if !hint {
		return a1;
	}
	if gamma2 == (Q - 1) / 32 {
		if a0 > 0 {
			(a1 + 1) & 15
		} else {
			(a1 - 1) & 15
		}
	} else if a0 > 0 {
		if a1 == 43 {
			0
		} else {
			a1 + 1
		}
	} else if a1 == 0 {
		43
	} else {
		a1 - 1
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	const GAMMA2_SMALL: i32 = (Q - 1) / 88;
	const GAMMA2_LARGE: i32 = (Q - 1) / 32;

	fn naive_decompose(a: i32, gamma2: i32) -> (i32, i32) {
		let alpha = 2 * gamma2;
		let mut a0 = a % alpha;
		if a0 > gamma2 {
			a0 -= alpha;
		}
		if a - a0 == Q - 1 {
			(0, a0 - 1)
		} else {
			((a - a0) / alpha, a0)
		}
	}

	fn gamma2_strategy() -> impl Strategy<Value = i32> {
		prop_oneof![Just(GAMMA2_SMALL), Just(GAMMA2_LARGE)]
	}

	proptest! {
		#[test]
		fn power2round_recombines(a in 0..Q) {
			let (a1, a0) = power2round(a);
			prop_assert_eq!(a1 * (1 << D) + a0, a);
			prop_assert!(a0 > -(1 << (D - 1)) && a0 <= 1 << (D - 1));
			prop_assert!((0..1 << 10).contains(&a1));
		}

		#[test]
		fn decompose_recombines(a in 0..Q, gamma2 in gamma2_strategy()) {
			let (a1, a0) = decompose(a, gamma2);
			prop_assert_eq!((a1 * 2 * gamma2 + a0).rem_euclid(Q), a);
			prop_assert!(a0 >= -gamma2 && a0 <= gamma2);
			prop_assert!(a1 >= 0 && a1 < (Q - 1) / (2 * gamma2));
			prop_assert_eq!((a1, a0), naive_decompose(a, gamma2));
		}

		#[test]
		fn hint_recovers_high_bits(
			r in 0..Q,
			z_frac in -1_000_000i32..=1_000_000,
			gamma2 in gamma2_strategy(),
		) {
			let z = (z_frac as i64 * gamma2 as i64 / 1_000_000) as i32;
			let h = make_hint(z, r, gamma2);
			prop_assert_eq!(use_hint(h, r, gamma2), high_bits(freeze(r + z), gamma2));
		}
	}

	#[test]
	fn decompose_folds_top_bucket() {
		for gamma2 in [GAMMA2_SMALL, GAMMA2_LARGE] {
			assert_eq!(decompose(Q - 1, gamma2), (0, -1));
			assert_eq!(decompose(Q - gamma2, gamma2), (0, -gamma2));
			assert_eq!(decompose(0, gamma2), (0, 0));
			assert_eq!(decompose(gamma2, gamma2), (0, gamma2));
			assert_eq!(decompose(gamma2 + 1, gamma2), (1, -gamma2 + 1));
		}
	}

	#[test]
	fn use_hint_wraps_buckets() {
		assert_eq!(use_hint(true, Q - 1, GAMMA2_SMALL), 43);
		assert_eq!(use_hint(true, Q - 1, GAMMA2_LARGE), 15);
		assert_eq!(use_hint(true, 1, GAMMA2_LARGE), 1);
		assert_eq!(use_hint(false, Q - 1, GAMMA2_SMALL), 0);
		let top = 43 * 2 * GAMMA2_SMALL + 5;
		assert_eq!(use_hint(true, top, GAMMA2_SMALL), 0);
	}

	#[test]
	fn make_hint_detects_bucket_change() {
		assert!(!make_hint(0, 12345, GAMMA2_SMALL));
		assert!(make_hint(1, GAMMA2_LARGE, GAMMA2_LARGE));
		assert!(!make_hint(-1, GAMMA2_LARGE, GAMMA2_LARGE));
		assert!(make_hint(-1, 0, GAMMA2_SMALL) == (high_bits(Q - 1, GAMMA2_SMALL) != 0));
	}
}
