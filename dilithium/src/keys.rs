use alloc::vec::Vec;
use core::fmt;

use rand_core::TryCryptoRng;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::{
	errors::{Error, FormatError},
	packing,
	params::{ParameterSet, Params, SEEDBYTES, TRBYTES},
	polyvec::{self, Matrix, NttPolyVec, PolyVec},
	sampler, sign,
	signature::Signature,
};

/// 32 bytes of key generation entropy, wiped when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeySeed([u8; SEEDBYTES]);

impl KeySeed {
	pub fn new(bytes: [u8; SEEDBYTES]) -> Self {
		KeySeed(bytes)
	}

	/// Draw a fresh seed from `rng`.
	pub fn generate<R: TryCryptoRng + ?Sized>(rng: &mut R) -> Result<Self, Error> {
		let mut seed = KeySeed([0u8; SEEDBYTES]);
		rng.try_fill_bytes(&mut seed.0).map_err(|err| {
			log::warn!("randomness source failed during key generation: {err}");
			Error::Randomness
		})?;
		Ok(seed)
	}

	pub fn as_bytes(&self) -> &[u8; SEEDBYTES] {
		&self.0
	}
}

/// Takes the bytes and wipes the source buffer.
impl From<&mut [u8; SEEDBYTES]> for KeySeed {
	fn from(bytes: &mut [u8; SEEDBYTES]) -> Self {
		let seed = KeySeed(*bytes);
		bytes.zeroize();
		seed
	}
}

impl fmt::Debug for KeySeed {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("KeySeed(..)")
	}
}

/// Public key (rho, t1) together with the values every verification needs: the expanded matrix
/// A, NTT(t1 * 2^d) and tr = H(pk).
#[derive(Clone)]
pub struct PublicKey {
	pub(crate) set: ParameterSet,
	pub(crate) rho: [u8; SEEDBYTES],
	pub(crate) t1: PolyVec,
	pub(crate) tr: [u8; TRBYTES],
	pub(crate) a: Matrix,
	pub(crate) t1_ntt: NttPolyVec,
}

impl PublicKey {
	pub(crate) fn from_parts(
		set: ParameterSet,
		rho: [u8; SEEDBYTES],
		t1: PolyVec,
		a: Matrix,
	) -> Self {
		let mut shifted = t1.clone();
		polyvec::shiftl(&mut shifted);
		let t1_ntt = polyvec::ntt(&shifted);

		let mut key = PublicKey { set, rho, t1, tr: [0u8; TRBYTES], a, t1_ntt };
		key.tr = compute_tr(set.params(), &key.rho, &key.t1);
		key
	}

	pub fn parameter_set(&self) -> ParameterSet {
		self.set
	}

	/// Encoded public key, `public_key_bytes` long.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut pk = alloc::vec![0u8; self.set.params().public_key_bytes()];
		packing::pack_pk(&mut pk, &self.rho, &self.t1);
		pk
	}

	/// Decode a public key for the given parameter set.
	///
	/// # Arguments
	///
	/// * 'set' - parameter set the key was generated under
	/// * 'bytes' - encoded public key
	pub fn from_bytes(set: ParameterSet, bytes: &[u8]) -> Result<Self, Error> {
		packing::check_length(set, bytes.len(), Params::public_key_bytes)?;
		let params = set.params();
		let mut rho = [0u8; SEEDBYTES];
		let mut t1 = PolyVec::new(params.k);
		packing::unpack_pk(&mut rho, &mut t1, bytes);
		let a = Matrix::expand(&rho, params);
		Ok(PublicKey::from_parts(set, rho, t1, a))
	}

	/// Verify `sig` over `msg`.
	pub fn verify(&self, msg: &[u8], sig: &Signature) -> Result<(), Error> {
		sign::verify(self, msg, sig)
	}

	/// Decode and verify an encoded signature. Any decoding failure counts as an invalid
	/// signature.
	pub fn verify_bytes(&self, msg: &[u8], sig: &[u8]) -> bool {
		match Signature::from_bytes(self.set, sig) {
			Ok(sig) => self.verify(msg, &sig).is_ok(),
			Err(err) => {
				log::debug!("rejecting undecodable signature: {err}");
				false
			},
		}
	}
}

impl PartialEq for PublicKey {
	fn eq(&self, other: &Self) -> bool {
		self.set == other.set && self.rho == other.rho && self.t1 == other.t1
	}
}

impl Eq for PublicKey {}

impl fmt::Debug for PublicKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PublicKey")
			.field("set", &self.set)
			.field("rho", &self.rho)
			.field("tr", &self.tr)
			.finish_non_exhaustive()
	}
}

/// Private key (rho, K, tr, s1, s2, t0) with the NTT forms of its secret vectors. The public
/// half t1 is kept so the matching public key can be rebuilt without recomputing A * s1.
#[derive(Clone, ZeroizeOnDrop)]
pub struct PrivateKey {
	#[zeroize(skip)]
	pub(crate) set: ParameterSet,
	pub(crate) rho: [u8; SEEDBYTES],
	pub(crate) key: [u8; SEEDBYTES],
	pub(crate) tr: [u8; TRBYTES],
	pub(crate) s1: PolyVec,
	pub(crate) s2: PolyVec,
	pub(crate) t0: PolyVec,
	pub(crate) t1: PolyVec,
	pub(crate) s1_ntt: NttPolyVec,
	pub(crate) s2_ntt: NttPolyVec,
	pub(crate) t0_ntt: NttPolyVec,
	#[zeroize(skip)]
	pub(crate) a: Matrix,
}

impl PrivateKey {
	#[allow(clippy::too_many_arguments)]
	pub(crate) fn from_parts(
		set: ParameterSet,
		rho: [u8; SEEDBYTES],
		key: [u8; SEEDBYTES],
		tr: [u8; TRBYTES],
		s1: PolyVec,
		s2: PolyVec,
		t0: PolyVec,
		t1: PolyVec,
		a: Matrix,
	) -> Self {
		let s1_ntt = polyvec::ntt(&s1);
		let s2_ntt = polyvec::ntt(&s2);
		let t0_ntt = polyvec::ntt(&t0);
		PrivateKey { set, rho, key, tr, s1, s2, t0, t1, s1_ntt, s2_ntt, t0_ntt, a }
	}

	pub fn parameter_set(&self) -> ParameterSet {
		self.set
	}

	/// Encoded private key, `secret_key_bytes` long. The buffer is wiped when dropped.
	pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
		let params = self.set.params();
		let mut sk = Zeroizing::new(alloc::vec![0u8; params.secret_key_bytes()]);
		packing::pack_sk(
			&mut sk, params, &self.rho, &self.key, &self.tr, &self.s1, &self.s2, &self.t0,
		);
		sk
	}

	/// Decode a private key for the given parameter set.
	///
	/// Besides the coefficient range checks, the decoded key must be internally consistent:
	/// recomputing t = A * s1 + s2 has to reproduce the stored t0, and tr has to be the hash of
	/// the implied public key.
	///
	/// # Arguments
	///
	/// * 'set' - parameter set the key was generated under
	/// * 'bytes' - encoded private key
	pub fn from_bytes(set: ParameterSet, bytes: &[u8]) -> Result<Self, Error> {
		packing::check_length(set, bytes.len(), Params::secret_key_bytes)?;
		let params = set.params();
		let mut rho = [0u8; SEEDBYTES];
		let mut key = [0u8; SEEDBYTES];
		let mut tr = [0u8; TRBYTES];
		let mut s1 = PolyVec::new(params.l);
		let mut s2 = PolyVec::new(params.k);
		let mut t0 = PolyVec::new(params.k);
		let unpacked =
			packing::unpack_sk(&mut rho, &mut key, &mut tr, &mut s1, &mut s2, &mut t0, bytes, params);
		if let Err(err) = unpacked {
			key.zeroize();
			s1.zeroize();
			s2.zeroize();
			return Err(err.into());
		}

		let a = Matrix::expand(&rho, params);
		let (t1, expected_t0) = compute_t(&a, &s1, &s2);
		let sk = PrivateKey::from_parts(set, rho, key, tr, s1, s2, t0, t1, a);

		if sk.t0 != expected_t0 || sk.tr != compute_tr(params, &sk.rho, &sk.t1) {
			log::debug!("{set} private key failed the consistency check");
			return Err(FormatError::InconsistentPrivateKey.into());
		}
		Ok(sk)
	}

	/// The public key this private key belongs to.
	pub fn public_key(&self) -> PublicKey {
		PublicKey::from_parts(self.set, self.rho, self.t1.clone(), self.a.clone())
	}

	/// Deterministic signature over `msg`.
	pub fn sign(&self, msg: &[u8]) -> Signature {
		sign::signature(self, msg, None)
	}

	/// Randomized signature over `msg`, drawing the per-signature seed from `rng`.
	pub fn sign_randomized<R: TryCryptoRng + ?Sized>(
		&self,
		msg: &[u8],
		rng: &mut R,
	) -> Result<Signature, Error> {
		sign::signature_randomized(self, msg, rng)
	}
}

impl PartialEq for PrivateKey {
	fn eq(&self, other: &Self) -> bool {
		use subtle::ConstantTimeEq;
		self.set == other.set && bool::from(self.to_bytes()[..].ct_eq(&other.to_bytes()[..]))
	}
}

impl Eq for PrivateKey {}

impl fmt::Debug for PrivateKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PrivateKey").field("set", &self.set).finish_non_exhaustive()
	}
}

/// A pair of private and public keys.
#[derive(Clone, PartialEq, Eq)]
pub struct Keypair {
	pub secret: PrivateKey,
	pub public: PublicKey,
}

impl Keypair {
	/// Generate a key pair from fresh randomness.
	///
	/// # Arguments
	///
	/// * 'set' - parameter set to generate under
	/// * 'rng' - cryptographically secure randomness source
	pub fn generate<R: TryCryptoRng + ?Sized>(
		set: ParameterSet,
		rng: &mut R,
	) -> Result<Keypair, Error> {
		let seed = KeySeed::generate(rng)?;
		Ok(Keypair::from_seed(set, &seed))
	}

	/// Deterministically derive a key pair from a 32-byte seed.
	pub fn from_seed(set: ParameterSet, seed: &KeySeed) -> Keypair {
		let (public, secret) = sign::keypair(set, seed);
		Keypair { secret, public }
	}

	pub fn parameter_set(&self) -> ParameterSet {
		self.public.set
	}

	/// Deterministic signature over `msg`.
	pub fn sign(&self, msg: &[u8]) -> Signature {
		self.secret.sign(msg)
	}

	pub fn verify(&self, msg: &[u8], sig: &Signature) -> Result<(), Error> {
		self.public.verify(msg, sig)
	}
}

impl fmt::Debug for Keypair {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Keypair").field("public", &self.public).finish_non_exhaustive()
	}
}

/// t = A * s1 + s2 in standard representatives, split into (t1, t0).
pub(crate) fn compute_t(a: &Matrix, s1: &PolyVec, s2: &PolyVec) -> (PolyVec, PolyVec) {
	let mut t1 = polyvec::invntt_tomont(&a.mul(&polyvec::ntt(s1)));
	polyvec::add_ip(&mut t1, s2);
	polyvec::reduce(&mut t1);
	polyvec::caddq(&mut t1);
	let mut t0 = PolyVec::new(t1.len());
	polyvec::power2round(&mut t1, &mut t0);
	(t1, t0)
}

/// tr = SHAKE256(pk) truncated to 32 bytes.
fn compute_tr(params: &Params, rho: &[u8; SEEDBYTES], t1: &PolyVec) -> [u8; TRBYTES] {
	let mut pk = alloc::vec![0u8; params.public_key_bytes()];
	packing::pack_pk(&mut pk, rho, t1);
	let mut tr = [0u8; TRBYTES];
	sampler::shake256(&mut tr, &[&pk[..]]);
	tr
}
