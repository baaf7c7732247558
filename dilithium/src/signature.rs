use alloc::vec::Vec;

use crate::{
	errors::Error,
	hint::HintVec,
	packing,
	params::{ParameterSet, Params, CTILDEBYTES},
	poly::Poly,
	polyvec::PolyVec,
	sampler,
};

/// Signature (c_tilde, z, h) under one parameter set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
	pub(crate) set: ParameterSet,
	pub(crate) c_tilde: [u8; CTILDEBYTES],
	pub(crate) z: PolyVec,
	pub(crate) h: HintVec,
}

impl Signature {
	pub(crate) fn new(
		set: ParameterSet,
		c_tilde: [u8; CTILDEBYTES],
		z: PolyVec,
		h: HintVec,
	) -> Self {
		Signature { set, c_tilde, z, h }
	}

	pub fn parameter_set(&self) -> ParameterSet {
		self.set
	}

	/// Commitment hash the challenge polynomial is derived from.
	pub fn c_tilde(&self) -> &[u8; CTILDEBYTES] {
		&self.c_tilde
	}

	/// Expand c_tilde into the challenge polynomial c. `None` when the sampler runs past its
	/// block budget, which makes the signature unverifiable.
	pub fn challenge(&self) -> Option<Poly> {
		sampler::challenge(&self.c_tilde, self.set.params().tau)
	}

	/// Response vector z, l polynomials with centered coefficients.
	pub fn z(&self) -> &PolyVec {
		&self.z
	}

	pub fn hint(&self) -> &HintVec {
		&self.h
	}

	/// Number of set hint bits.
	pub fn hint_weight(&self) -> usize {
		self.h.weight()
	}

	/// Encoded signature, `signature_bytes` long.
	pub fn to_bytes(&self) -> Vec<u8> {
		let params = self.set.params();
		let mut sig = alloc::vec![0u8; params.signature_bytes()];
		packing::pack_sig(&mut sig, params, &self.c_tilde, &self.z, &self.h);
		sig
	}

	/// Decode a signature for the given parameter set.
	///
	/// # Arguments
	///
	/// * 'set' - parameter set of the signing key
	/// * 'bytes' - encoded signature
	pub fn from_bytes(set: ParameterSet, bytes: &[u8]) -> Result<Self, Error> {
		packing::check_length(set, bytes.len(), Params::signature_bytes)?;
		let params = set.params();
		let mut c_tilde = [0u8; CTILDEBYTES];
		let mut z = PolyVec::new(params.l);
		let mut h = HintVec::new(params.k);
		packing::unpack_sig(&mut c_tilde, &mut z, &mut h, bytes, params)?;
		Ok(Signature { set, c_tilde, z, h })
	}
}
