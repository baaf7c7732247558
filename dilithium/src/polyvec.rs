use crate::{
	params::{Params, CRHBYTES, SEEDBYTES},
	poly::{self, NttPoly, Poly},
	sampler,
};
use alloc::vec::Vec;
use zeroize::Zeroize;

/// Vector of coefficient-domain polynomials, length k or l depending on role.
#[derive(Clone, Debug, PartialEq, Eq, Zeroize)]
pub struct PolyVec {
	pub vec: Vec<Poly>,
}

/// Vector of NTT-domain polynomials.
#[derive(Clone, Debug, PartialEq, Eq, Zeroize)]
pub struct NttPolyVec {
	pub vec: Vec<NttPoly>,
}

/// The public matrix A, k rows of l NTT-domain polynomials.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
	rows: Vec<NttPolyVec>,
}

impl PolyVec {
	pub fn new(len: usize) -> Self {
		PolyVec { vec: alloc::vec![Poly::default(); len] }
	}

	pub fn len(&self) -> usize {
		self.vec.len()
	}

	pub fn is_empty(&self) -> bool {
		self.vec.is_empty()
	}
}

impl NttPolyVec {
	pub fn new(len: usize) -> Self {
		NttPolyVec { vec: alloc::vec![NttPoly::default(); len] }
	}

	pub fn len(&self) -> usize {
		self.vec.len()
	}

	pub fn is_empty(&self) -> bool {
		self.vec.is_empty()
	}
}

impl Matrix {
	/// Implementation of ExpandA. Entry (i, j) comes from SHAKE128(rho || 256*i + j).
	pub fn expand(rho: &[u8; SEEDBYTES], params: &Params) -> Self {
		let rows = (0..params.k)
			.map(|i| NttPolyVec {
				vec: (0..params.l).map(|j| sampler::uniform(rho, ((i << 8) + j) as u16)).collect(),
			})
			.collect();
		Matrix { rows }
	}

	pub fn k(&self) -> usize {
		self.rows.len()
	}

	pub fn l(&self) -> usize {
		self.rows.first().map_or(0, NttPolyVec::len)
	}

	pub fn entry(&self, i: usize, j: usize) -> &NttPoly {
		&self.rows[i].vec[j]
	}

	/// Matrix-vector multiplication in the NTT domain, including the 2^{-32} Montgomery factor.
	/// Output coefficients are reduced by reduce32().
	pub fn mul(&self, v: &NttPolyVec) -> NttPolyVec {
		NttPolyVec { vec: self.rows.iter().map(|row| pointwise_acc_montgomery(row, v)).collect() }
	}
}

/// Pointwise multiply vectors of polynomials of equal length, multiply resulting vector by
/// 2^{-32} and add (accumulate) polynomials in it.
pub fn pointwise_acc_montgomery(u: &NttPolyVec, v: &NttPolyVec) -> NttPoly {
	let mut w = NttPoly::default();
	for (a, b) in u.vec.iter().zip(v.vec.iter()) {
		poly::ntt_add_ip(&mut w, &poly::pointwise_montgomery(a, b));
	}
	poly::ntt_reduce(&mut w);
	w
}

/// Multiply every entry of `v` by the single polynomial `a`, all in the NTT domain.
pub fn pointwise_poly_montgomery(a: &NttPoly, v: &NttPolyVec) -> NttPolyVec {
	NttPolyVec { vec: v.vec.iter().map(|p| poly::pointwise_montgomery(a, p)).collect() }
}

/// Implementation of ExpandS: `len` polynomials from SHAKE256(seed || nonce), nonce increasing.
pub fn uniform_eta(seed: &[u8; CRHBYTES], mut nonce: u16, len: usize, eta: i32) -> PolyVec {
	let mut v = PolyVec::new(len);
	for p in v.vec.iter_mut() {
		*p = sampler::uniform_eta(seed, nonce, eta);
		nonce += 1;
	}
	v
}

/// Implementation of ExpandMask: polynomial i comes from SHAKE256(seed || nonce + i).
pub fn uniform_gamma1(seed: &[u8; CRHBYTES], nonce: u16, len: usize, gamma1: i32) -> PolyVec {
	PolyVec {
		vec: (0..len)
			.map(|i| sampler::uniform_gamma1(seed, nonce.wrapping_add(i as u16), gamma1))
			.collect(),
	}
}

pub fn ntt(v: &PolyVec) -> NttPolyVec {
	NttPolyVec { vec: v.vec.iter().map(poly::ntt).collect() }
}

pub fn invntt_tomont(v: &NttPolyVec) -> PolyVec {
	PolyVec { vec: v.vec.iter().map(poly::invntt_tomont).collect() }
}

pub fn reduce(v: &mut PolyVec) {
	v.vec.iter_mut().for_each(poly::reduce);
}

pub fn caddq(v: &mut PolyVec) {
	v.vec.iter_mut().for_each(poly::caddq);
}

pub fn freeze(v: &mut PolyVec) {
	v.vec.iter_mut().for_each(poly::freeze);
}

/// Add vectors of polynomials of equal length. No modular reduction is performed.
pub fn add_ip(w: &mut PolyVec, v: &PolyVec) {
	for (a, b) in w.vec.iter_mut().zip(v.vec.iter()) {
		poly::add_ip(a, b);
	}
}

/// Subtract vectors of polynomials of equal length. No modular reduction is performed.
pub fn sub_ip(w: &mut PolyVec, v: &PolyVec) {
	for (a, b) in w.vec.iter_mut().zip(v.vec.iter()) {
		poly::sub_ip(a, b);
	}
}

pub fn ntt_sub_ip(w: &mut NttPolyVec, v: &NttPolyVec) {
	for (a, b) in w.vec.iter_mut().zip(v.vec.iter()) {
		poly::ntt_sub_ip(a, b);
	}
}

pub fn ntt_reduce(v: &mut NttPolyVec) {
	v.vec.iter_mut().for_each(poly::ntt_reduce);
}

/// Multiply vector of polynomials by 2^D without modular reduction. Assumes input coefficients
/// to be less than 2^{31-D}.
pub fn shiftl(v: &mut PolyVec) {
	v.vec.iter_mut().for_each(poly::shiftl);
}

/// Check infinity norm of every polynomial against the bound, scanning all of them.
///
/// Returns true if some coefficient reaches the bound.
pub fn check_norm(v: &PolyVec, bound: i32) -> bool {
	v.vec.iter().fold(false, |acc, p| acc | poly::check_norm(p, bound))
}

pub fn infinity_norm(v: &PolyVec) -> i32 {
	v.vec.iter().map(poly::infinity_norm).max().unwrap_or(0)
}

/// Split every coefficient into (high, low) parts around 2^D: v1 receives the high parts, v0 the
/// low parts. Assumes standard representatives.
pub fn power2round(v1: &mut PolyVec, v0: &mut PolyVec) {
	for (a1, a0) in v1.vec.iter_mut().zip(v0.vec.iter_mut()) {
		poly::power2round(a1, a0);
	}
}

/// Split every coefficient into (high, low) parts around 2*gamma2. Assumes standard
/// representatives.
pub fn decompose(v1: &mut PolyVec, v0: &mut PolyVec, gamma2: i32) {
	for (a1, a0) in v1.vec.iter_mut().zip(v0.vec.iter_mut()) {
		poly::decompose(a1, a0, gamma2);
	}
}

/// Pack the high-bits vector w1 into `r`, which must hold k * poly_w1_packed_bytes bytes.
pub fn pack_w1(r: &mut [u8], w1: &PolyVec, params: &Params) {
	let size = params.poly_w1_packed_bytes();
	for (chunk, p) in r.chunks_exact_mut(size).zip(w1.vec.iter()) {
		poly::w1_pack(chunk, p, params.gamma2);
	}
}
