use crate::{
	ntt,
	params::{self, N, Q},
	reduce, rounding,
};
use zeroize::Zeroize;

const D_SHL: i32 = 1 << (params::D - 1);

/// Polynomial in the coefficient domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Zeroize)]
pub struct Poly {
	pub coeffs: [i32; N],
}

/// Polynomial in the NTT (evaluation) domain. Only [`ntt`] produces one and only
/// [`invntt_tomont`] or [`invntt`] turn it back, so the two domains never mix by accident.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Zeroize)]
pub struct NttPoly {
	pub coeffs: [i32; N],
}

impl Default for Poly {
	fn default() -> Self {
		Poly { coeffs: [0i32; N] }
	}
}

impl Default for NttPoly {
	fn default() -> Self {
		NttPoly { coeffs: [0i32; N] }
	}
}

/// Inplace reduction of all coefficients of polynomial to representative in [-6283008,6283008].
pub fn reduce(a: &mut Poly) {
	for coeff in a.coeffs.iter_mut() {
		*coeff = reduce::reduce32(*coeff);
	}
}

/// For all coefficients of in/out polynomial add Q if coefficient is negative.
pub fn caddq(a: &mut Poly) {
	for coeff in a.coeffs.iter_mut() {
		*coeff = reduce::caddq(*coeff);
	}
}

/// Inplace reduction of all coefficients to standard representatives in [0, Q-1].
pub fn freeze(a: &mut Poly) {
	for coeff in a.coeffs.iter_mut() {
		*coeff = reduce::freeze(*coeff);
	}
}

/// Add polynomials. No modular reduction is performed.
///
/// # Arguments
///
/// * 'a' - 1st input polynomial
/// * 'b' - 2nd input polynomial
///
/// Returns coefficient wise a + b
pub fn add(a: &Poly, b: &Poly) -> Poly {
	let mut c = Poly::default();
	for i in 0..N {
		c.coeffs[i] = a.coeffs[i] + b.coeffs[i];
	}
	c
}

/// Add polynomials in place. No modular reduction is performed.
pub fn add_ip(a: &mut Poly, b: &Poly) {
	for i in 0..N {
		a.coeffs[i] += b.coeffs[i];
	}
}

/// Subtract polynomials. No modular reduction is performed.
///
/// # Arguments
///
/// * 'a' - 1st input polynomial
/// * 'b' - 2nd input polynomial
///
/// Returns coefficient wise a - b
pub fn sub(a: &Poly, b: &Poly) -> Poly {
	let mut c = Poly::default();
	for i in 0..N {
		c.coeffs[i] = a.coeffs[i] - b.coeffs[i];
	}
	c
}

/// Subtract polynomials in place. No modular reduction is performed.
pub fn sub_ip(a: &mut Poly, b: &Poly) {
	for i in 0..N {
		a.coeffs[i] -= b.coeffs[i];
	}
}

/// Multiply polynomial by 2^D without modular reduction.
/// Assumes input coefficients to be less than 2^{31-D} in absolute value.
pub fn shiftl(a: &mut Poly) {
	for coeff in a.coeffs.iter_mut() {
		*coeff <<= params::D;
	}
}

/// Forward NTT. Input coefficients must be smaller than Q in absolute value; output coefficients
/// can grow by 8*Q.
pub fn ntt(a: &Poly) -> NttPoly {
	let mut r = NttPoly { coeffs: a.coeffs };
	ntt::ntt(&mut r.coeffs);
	r
}

/// Inverse NTT and multiplication by 2^{32}. Output coefficients are bounded by Q in absolute
/// value.
pub fn invntt_tomont(a: &NttPoly) -> Poly {
	let mut r = Poly { coeffs: a.coeffs };
	ntt::invntt_tomont(&mut r.coeffs);
	r
}

/// Exact inverse of [`ntt`].
pub fn invntt(a: &NttPoly) -> Poly {
	let mut r = Poly { coeffs: a.coeffs };
	ntt::invntt(&mut r.coeffs);
	r
}

/// Pointwise multiplication of polynomials in NTT domain representation and multiplication of
/// resulting polynomial by 2^{-32}.
pub fn pointwise_montgomery(a: &NttPoly, b: &NttPoly) -> NttPoly {
	let mut c = NttPoly::default();
	for i in 0..N {
		c.coeffs[i] = reduce::montgomery_reduce(a.coeffs[i] as i64 * b.coeffs[i] as i64);
	}
	c
}

/// Add NTT-domain polynomials in place. No modular reduction is performed.
pub fn ntt_add_ip(a: &mut NttPoly, b: &NttPoly) {
	for i in 0..N {
		a.coeffs[i] += b.coeffs[i];
	}
}

/// Subtract NTT-domain polynomials in place. No modular reduction is performed.
pub fn ntt_sub_ip(a: &mut NttPoly, b: &NttPoly) {
	for i in 0..N {
		a.coeffs[i] -= b.coeffs[i];
	}
}

pub fn ntt_reduce(a: &mut NttPoly) {
	for coeff in a.coeffs.iter_mut() {
		*coeff = reduce::reduce32(*coeff);
	}
}

/// Product in Z_q[X]/(X^N + 1) computed through the NTT. Output coefficients are standard
/// representatives.
pub fn multiply(a: &Poly, b: &Poly) -> Poly {
	let mut a = *a;
	let mut b = *b;
	reduce(&mut a);
	reduce(&mut b);
	let mut c = invntt_tomont(&pointwise_montgomery(&ntt(&a), &ntt(&b)));
	freeze(&mut c);
	c
}

/// For all coefficients c of the input polynomial, compute c0, c1 such that c mod Q = c1*2^D + c0
/// with -2^{D-1} < c0 <= 2^{D-1}. Assumes coefficients to be standard representatives.
///
/// # Arguments
///
/// * 'a1' - input polynomial, replaced by the high parts
/// * 'a0' - output polynomial for the low parts
pub fn power2round(a1: &mut Poly, a0: &mut Poly) {
	for i in 0..N {
		(a1.coeffs[i], a0.coeffs[i]) = rounding::power2round(a1.coeffs[i]);
	}
}

/// For all coefficients c of the input polynomial, compute high and low bits c0, c1 such c mod Q =
/// c1*2*gamma2 + c0 with -gamma2 < c0 <= gamma2, folding the top bucket to c1 = 0. Assumes
/// coefficients to be standard representatives.
///
/// # Arguments
///
/// * 'a1' - input polynomial, replaced by the high parts
/// * 'a0' - output polynomial for the low parts
/// * 'gamma2' - rounding range
pub fn decompose(a1: &mut Poly, a0: &mut Poly, gamma2: i32) {
	for i in 0..N {
		(a1.coeffs[i], a0.coeffs[i]) = rounding::decompose(a1.coeffs[i], gamma2);
	}
}

/// Check infinity norm of polynomial against given bound.
/// Assumes input coefficients were reduced by reduce32().
///
/// # Arguments
///
/// * 'a' - input polynomial
/// * 'b' - norm bound
///
/// Returns false if norm is strictly smaller than B and B <= (Q-1)/8, true otherwise.
pub fn check_norm(a: &Poly, b: i32) -> bool {
	let mut result = b > (Q - 1) / 8;

	// Always scan every coefficient, no early exit.
	for coeff in a.coeffs.iter() {
		let mut t = *coeff >> 31;
		t = *coeff - (t & 2 * *coeff);
		result |= t >= b;
	}
	result
}

/// Largest centered absolute value over all coefficients, any representatives accepted.
pub fn infinity_norm(a: &Poly) -> i32 {
	a.coeffs.iter().map(|&c| reduce::centered(c).abs()).max().unwrap_or(0)
}

fn pack_bits(r: &mut [u8], bits: usize, mut value: impl FnMut(usize) -> u32) {
	let mask = (1u64 << bits) - 1;
	let mut acc = 0u64;
	let mut filled = 0;
	let mut pos = 0;
	for i in 0..N {
		acc |= (value(i) as u64 & mask) << filled;
		filled += bits;
		while filled >= 8 {
			r[pos] = acc as u8;
			acc >>= 8;
			filled -= 8;
			pos += 1;
		}
	}
}

fn unpack_bits(a: &[u8], bits: usize, mut store: impl FnMut(usize, u32)) {
	let mask = (1u64 << bits) - 1;
	let mut acc = 0u64;
	let mut filled = 0;
	let mut pos = 0;
	for i in 0..N {
		while filled < bits {
			acc |= (a[pos] as u64) << filled;
			filled += 8;
			pos += 1;
		}
		store(i, (acc & mask) as u32);
		acc >>= bits;
		filled -= bits;
	}
}

/// Bit-pack polynomial t1 with coefficients fitting in 10 bits.
/// Input coefficients are assumed to be standard representatives.
pub fn t1_pack(r: &mut [u8], a: &Poly) {
	pack_bits(r, 10, |i| a.coeffs[i] as u32);
}

/// Unpack polynomial t1 with 10-bit coefficients.
/// Output coefficients are standard representatives.
pub fn t1_unpack(r: &mut Poly, a: &[u8]) {
	unpack_bits(a, 10, |i, t| r.coeffs[i] = t as i32);
}

/// Bit-pack polynomial t0 with coefficients in ]-2^{D-1}, 2^{D-1}].
pub fn t0_pack(r: &mut [u8], a: &Poly) {
	pack_bits(r, params::D as usize, |i| (D_SHL - a.coeffs[i]) as u32);
}

/// Unpack polynomial t0 with coefficients in ]-2^{D-1}, 2^{D-1}].
pub fn t0_unpack(r: &mut Poly, a: &[u8]) {
	unpack_bits(a, params::D as usize, |i, t| r.coeffs[i] = D_SHL - t as i32);
}

/// Bit-pack polynomial with coefficients in [-eta,eta].
pub fn eta_pack(r: &mut [u8], a: &Poly, eta: i32) {
	let bits = if eta == 2 { 3 } else { 4 };
	pack_bits(r, bits, |i| (eta - a.coeffs[i]) as u32);
}

/// Unpack polynomial with coefficients in [-eta,eta].
///
/// Returns false if some packed value exceeds 2*eta, in which case `r` holds garbage.
pub fn eta_unpack(r: &mut Poly, a: &[u8], eta: i32) -> bool {
	let bits = if eta == 2 { 3 } else { 4 };
	let mut valid = true;
	unpack_bits(a, bits, |i, t| {
		valid &= t as i32 <= 2 * eta;
		r.coeffs[i] = eta - t as i32;
	});
	valid
}

/// Bit-pack polynomial z with coefficients in [-(gamma1 - 1), gamma1].
pub fn z_pack(r: &mut [u8], a: &Poly, gamma1: i32) {
	let bits = if gamma1 == 1 << 17 { 18 } else { 20 };
	pack_bits(r, bits, |i| (gamma1 - a.coeffs[i]) as u32);
}

/// Unpack polynomial z with coefficients in [-(gamma1 - 1), gamma1].
pub fn z_unpack(r: &mut Poly, a: &[u8], gamma1: i32) {
	let bits = if gamma1 == 1 << 17 { 18 } else { 20 };
	unpack_bits(a, bits, |i, t| r.coeffs[i] = gamma1 - t as i32);
}

/// Bit-pack polynomial w1 with coefficients in [0, (Q-1)/(2*gamma2) - 1].
/// Input coefficients are assumed to be standard representatives.
pub fn w1_pack(r: &mut [u8], a: &Poly, gamma2: i32) {
	let bits = if gamma2 == (Q - 1) / 88 { 6 } else { 4 };
	pack_bits(r, bits, |i| a.coeffs[i] as u32);
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::{rngs::StdRng, Rng, SeedableRng};

	fn random_poly(rng: &mut StdRng, bound: i32) -> Poly {
		let mut p = Poly::default();
		for c in p.coeffs.iter_mut() {
			*c = rng.random_range(-bound..=bound);
		}
		p
	}

	/// Direct negacyclic convolution, the ground truth for ring multiplication.
	fn schoolbook(a: &Poly, b: &Poly) -> Poly {
		let mut acc = [0i64; N];
		for i in 0..N {
			for j in 0..N {
				let prod = a.coeffs[i] as i64 * b.coeffs[j] as i64;
				if i + j < N {
					acc[i + j] += prod;
				} else {
					acc[i + j - N] -= prod;
				}
			}
		}
		let mut r = Poly::default();
		for i in 0..N {
			r.coeffs[i] = acc[i].rem_euclid(Q as i64) as i32;
		}
		r
	}

	#[test]
	fn test_poly_default() {
		let poly = Poly::default();
		assert!(poly.coeffs.iter().all(|&c| c == 0));
		assert_eq!(NttPoly::default().coeffs, [0i32; N]);
	}

	#[test]
	fn test_reduce() {
		let mut poly = Poly::default();
		poly.coeffs[0] = Q + 100;
		poly.coeffs[1] = -Q - 200;
		poly.coeffs[2] = 2 * Q + 50;

		reduce(&mut poly);

		assert_eq!(poly.coeffs[0], 100);
		assert_eq!(poly.coeffs[1], -200);
		assert_eq!(poly.coeffs[2], 50);
		assert!(poly.coeffs.iter().all(|c| c.abs() < Q));
	}

	#[test]
	fn test_caddq_and_freeze() {
		let mut poly = Poly::default();
		poly.coeffs[0] = -100;
		poly.coeffs[1] = -1;
		poly.coeffs[3] = 100;
		caddq(&mut poly);
		assert_eq!(poly.coeffs[0], Q - 100);
		assert_eq!(poly.coeffs[1], Q - 1);
		assert_eq!(poly.coeffs[2], 0);
		assert_eq!(poly.coeffs[3], 100);

		poly.coeffs[4] = 3 * Q + 7;
		freeze(&mut poly);
		assert_eq!(poly.coeffs[4], 7);
	}

	#[test]
	fn test_add_sub() {
		let mut a = Poly::default();
		let mut b = Poly::default();
		for i in 0..N {
			a.coeffs[i] = (i * 10) as i32;
			b.coeffs[i] = (i * 3) as i32;
		}

		let sum = add(&a, &b);
		let diff = sub(&a, &b);
		for i in 0..N {
			assert_eq!(sum.coeffs[i], 13 * i as i32);
			assert_eq!(diff.coeffs[i], 7 * i as i32);
		}

		let mut c = a;
		add_ip(&mut c, &b);
		sub_ip(&mut c, &b);
		assert_eq!(c, a);
	}

	#[test]
	fn test_shiftl() {
		let mut a = Poly::default();
		a.coeffs[0] = 1;
		a.coeffs[1] = 1023;
		shiftl(&mut a);
		assert_eq!(a.coeffs[0], 1 << params::D);
		assert_eq!(a.coeffs[1], 1023 << params::D);
	}

	#[test]
	fn test_ntt_invntt_roundtrip() {
		let mut rng = StdRng::seed_from_u64(1);
		for _ in 0..1000 {
			let mut p = random_poly(&mut rng, Q - 1);
			let mut back = invntt(&ntt(&p));
			freeze(&mut back);
			freeze(&mut p);
			assert_eq!(back, p, "invntt(ntt(p)) must return p");
		}
	}

	#[test]
	fn test_ntt_multiply_matches_schoolbook() {
		let mut rng = StdRng::seed_from_u64(2);
		for round in 0..1000 {
			let a = random_poly(&mut rng, Q - 1);
			let b = random_poly(&mut rng, Q - 1);
			assert_eq!(multiply(&a, &b), schoolbook(&a, &b), "pair {round}");
		}
	}

	#[test]
	fn test_pointwise_montgomery_accumulate() {
		let mut rng = StdRng::seed_from_u64(4);
		let a = random_poly(&mut rng, 1000);
		let b = random_poly(&mut rng, 1000);
		let c = random_poly(&mut rng, 1000);

		let mut acc = pointwise_montgomery(&ntt(&a), &ntt(&b));
		ntt_add_ip(&mut acc, &pointwise_montgomery(&ntt(&a), &ntt(&c)));
		ntt_reduce(&mut acc);
		let mut got = invntt_tomont(&acc);
		freeze(&mut got);

		let mut expected = add(&schoolbook(&a, &b), &schoolbook(&a, &c));
		freeze(&mut expected);
		assert_eq!(got, expected, "a*b + a*c must distribute in the NTT domain");

		let mut diff = pointwise_montgomery(&ntt(&a), &ntt(&b));
		ntt_sub_ip(&mut diff, &pointwise_montgomery(&ntt(&a), &ntt(&b)));
		let mut zero = invntt_tomont(&diff);
		freeze(&mut zero);
		assert_eq!(zero, Poly::default());
	}

	#[test]
	fn test_chknorm() {
		let mut a = Poly::default();
		assert!(!check_norm(&a, 100));
		a.coeffs[17] = -100;
		assert!(check_norm(&a, 100));
		assert!(!check_norm(&a, 101));
		assert!(check_norm(&Poly::default(), Q), "bounds above (Q-1)/8 always fail");
	}

	#[test]
	fn test_infinity_norm() {
		let mut a = Poly::default();
		assert_eq!(infinity_norm(&a), 0);
		a.coeffs[3] = Q - 5;
		a.coeffs[9] = 4;
		assert_eq!(infinity_norm(&a), 5);
		a.coeffs[10] = -(Q - 1) / 2;
		assert_eq!(infinity_norm(&a), (Q - 1) / 2);
	}

	#[test]
	fn test_power2round() {
		let mut rng = StdRng::seed_from_u64(5);
		let mut a1 = Poly::default();
		for c in a1.coeffs.iter_mut() {
			*c = rng.random_range(0..Q);
		}
		let original = a1;
		let mut a0 = Poly::default();
		power2round(&mut a1, &mut a0);
		for i in 0..N {
			assert_eq!((a1.coeffs[i] << params::D) + a0.coeffs[i], original.coeffs[i]);
		}
	}

	#[test]
	fn test_decompose_recombines() {
		let mut rng = StdRng::seed_from_u64(6);
		for gamma2 in [(Q - 1) / 88, (Q - 1) / 32] {
			let mut a1 = Poly::default();
			for c in a1.coeffs.iter_mut() {
				*c = rng.random_range(0..Q);
			}
			let original = a1;
			let mut a0 = Poly::default();
			decompose(&mut a1, &mut a0, gamma2);
			for i in 0..N {
				let back = (a1.coeffs[i] * 2 * gamma2 + a0.coeffs[i]).rem_euclid(Q);
				assert_eq!(back, original.coeffs[i]);
			}
		}
	}

	#[test]
	fn test_t1_t0_pack_unpack_roundtrip() {
		let mut rng = StdRng::seed_from_u64(7);
		let mut t1 = Poly::default();
		let mut t0 = Poly::default();
		for i in 0..N {
			t1.coeffs[i] = rng.random_range(0..1 << 10);
			t0.coeffs[i] = rng.random_range(-D_SHL + 1..=D_SHL);
		}

		let mut buf = [0u8; params::POLYT1_PACKEDBYTES];
		t1_pack(&mut buf, &t1);
		let mut back = Poly::default();
		t1_unpack(&mut back, &buf);
		assert_eq!(back, t1);

		let mut buf = [0u8; params::POLYT0_PACKEDBYTES];
		t0_pack(&mut buf, &t0);
		t0_unpack(&mut back, &buf);
		assert_eq!(back, t0);
	}

	#[test]
	fn test_eta_pack_unpack_roundtrip() {
		let mut rng = StdRng::seed_from_u64(8);
		for eta in [2, 4] {
			let a = random_poly(&mut rng, eta);
			let mut buf = [0u8; 128];
			let len = N * if eta == 2 { 3 } else { 4 } / 8;
			eta_pack(&mut buf[..len], &a, eta);
			let mut back = Poly::default();
			assert!(eta_unpack(&mut back, &buf[..len], eta));
			assert_eq!(back, a, "eta = {eta}");
		}
	}

	#[test]
	fn test_eta_unpack_rejects_out_of_range() {
		// 3-bit value 7 > 2*eta for eta = 2
		let mut buf = [0u8; 96];
		buf[0] = 0x07;
		let mut p = Poly::default();
		assert!(!eta_unpack(&mut p, &buf, 2));

		// 4-bit value 9 > 2*eta for eta = 4
		let mut buf = [0u8; 128];
		buf[127] = 0x90;
		assert!(!eta_unpack(&mut p, &buf, 4));
		buf[127] = 0x80;
		assert!(eta_unpack(&mut p, &buf, 4));
		assert_eq!(p.coeffs[N - 1], -4);
	}

	#[test]
	fn test_z_pack_unpack_roundtrip() {
		let mut rng = StdRng::seed_from_u64(9);
		for gamma1 in [1 << 17, 1 << 19] {
			let mut z = Poly::default();
			for c in z.coeffs.iter_mut() {
				*c = rng.random_range(-gamma1 + 1..=gamma1);
			}
			let mut buf = [0u8; 640];
			let len = N * if gamma1 == 1 << 17 { 18 } else { 20 } / 8;
			z_pack(&mut buf[..len], &z, gamma1);
			let mut back = Poly::default();
			z_unpack(&mut back, &buf[..len], gamma1);
			assert_eq!(back, z, "gamma1 = {gamma1}");
		}
	}

	#[test]
	fn test_w1_pack_layout() {
		let mut w1 = Poly::default();
		w1.coeffs[0] = 0x3;
		w1.coeffs[1] = 0xA;
		let mut buf = [0u8; 128];
		w1_pack(&mut buf, &w1, (Q - 1) / 32);
		assert_eq!(buf[0], 0xA3);

		let mut w1 = Poly::default();
		w1.coeffs[0] = 43;
		w1.coeffs[1] = 1;
		let mut buf = [0u8; 192];
		w1_pack(&mut buf, &w1, (Q - 1) / 88);
		assert_eq!(buf[0], 43 | (1 << 6));
		assert_eq!(buf[1], 0);
	}
}
