use crate::{
	params::{N, Q, ROOT_OF_UNITY},
	reduce::{montgomery_reduce, MONT},
};

/// mont^2/256, undoes the 1/N scaling of the inverse transform and leaves a factor 2^32.
const F_TOMONT: i64 = 41978;
/// mont/256, undoes the 1/N scaling of the inverse transform exactly.
const F_PLAIN: i64 = 16382;

const fn pow_mod(base: i64, mut exp: u32) -> i64 {
	let mut acc = 1i64;
	let mut b = base % Q as i64;
	while exp > 0 {
		if exp & 1 == 1 {
			acc = acc * b % Q as i64;
		}
		b = b * b % Q as i64;
		exp >>= 1;
	}
	acc
}

const fn bit_reverse_8(x: usize) -> u32 {
	let mut r = 0u32;
	let mut i = 0;
	while i < 8 {
		r |= (((x >> i) & 1) as u32) << (7 - i);
		i += 1;
	}
	r
}

/// Powers of the root of unity in bit-reversed order, Montgomery form, centered.
const fn gen_zetas() -> [i32; N] {
	let mut zetas = [0i32; N];
	let mut i = 0;
	while i < N {
		let z = pow_mod(ROOT_OF_UNITY as i64, bit_reverse_8(i)) * MONT as i64 % Q as i64;
		zetas[i] = if z > (Q as i64 - 1) / 2 { (z - Q as i64) as i32 } else { z as i32 };
		i += 1;
	}
	zetas
}

pub const ZETAS: [i32; N] = gen_zetas();

/// Forward NTT, in-place. No modular reduction is performed after additions or subtractions.
/// Output vector is in bitreversed order.
pub fn ntt(a: &mut [i32; N]) {
	let mut k = 0usize;
	let mut len = 128;
	while len > 0 {
		let mut start = 0;
		while start < N {
			k += 1;
			let zeta = ZETAS[k] as i64;
			for j in start..start + len {
				let t = montgomery_reduce(zeta * a[j + len] as i64);
				a[j + len] = a[j] - t;
				a[j] += t;
			}
			start += 2 * len;
		}
		len >>= 1;
	}
}

fn invntt_scaled(a: &mut [i32; N], f: i64) {
	let mut k = N;
	let mut len = 1;
	while len < N {
		let mut start = 0;
		while start < N {
			k -= 1;
			let zeta = -ZETAS[k] as i64;
			for j in start..start + len {
				let t = a[j];
				a[j] = t + a[j + len];
				a[j + len] = montgomery_reduce(zeta * (t - a[j + len]) as i64);
			}
			start += 2 * len;
		}
		len <<= 1;
	}
	for coeff in a.iter_mut() {
		*coeff = montgomery_reduce(f * *coeff as i64);
	}
}

/// Inverse NTT and multiplication by Montgomery factor 2^32. In-place. No modular reductions after
/// additions or subtractions; input coefficients need to be smaller than Q in absolute value.
/// Output coefficient are smaller than Q in absolute value.
pub fn invntt_tomont(a: &mut [i32; N]) {
	invntt_scaled(a, F_TOMONT)
}

/// Exact inverse of [`ntt`]: `invntt(ntt(a)) == a (mod Q)`.
pub fn invntt(a: &mut [i32; N]) {
	invntt_scaled(a, F_PLAIN)
}
