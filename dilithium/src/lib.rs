//! CRYSTALS-Dilithium lattice signatures (round 3.1) for the Dilithium2, Dilithium3 and
//! Dilithium5 parameter sets.
//!
//! ```
//! use dilithium_sig::{generate_keys, sign, verify, ParameterSet};
//!
//! let mut rng = rand::rng();
//! let keys = generate_keys(ParameterSet::Dilithium3, &mut rng).unwrap();
//! let sig = sign(&keys.secret, b"attack at dawn", None);
//! assert!(verify(&keys.public, b"attack at dawn", &sig).is_ok());
//! ```
#![cfg_attr(not(feature = "std"), no_std)]
#![allow(clippy::identity_op)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::precedence)]
#![allow(clippy::unnecessary_cast)]

extern crate alloc;

pub mod drbg;
mod errors;
pub mod hint;
mod keys;
pub mod ntt;
pub mod packing;
pub mod params;
pub mod poly;
pub mod polyvec;
pub mod reduce;
pub mod rounding;
pub mod sampler;
mod sign;
mod signature;

pub use errors::{DrbgError, Error, FormatError};
pub use keys::{KeySeed, Keypair, PrivateKey, PublicKey};
pub use params::{ParameterSet, Params, CRHBYTES, SEEDBYTES};
pub use rand_core::{TryCryptoRng, TryRngCore};
pub use signature::Signature;

/// Generate a key pair under `set`, drawing the 32-byte seed from `rng`.
pub fn generate_keys<R: TryCryptoRng + ?Sized>(
	set: ParameterSet,
	rng: &mut R,
) -> Result<Keypair, Error> {
	Keypair::generate(set, rng)
}

/// Sign `msg`. With `rnd = None` the signature is deterministic; otherwise the 64 bytes are used
/// as the per-signature seed.
pub fn sign(sk: &PrivateKey, msg: &[u8], rnd: Option<&[u8; CRHBYTES]>) -> Signature {
	sign::signature(sk, msg, rnd)
}

/// Sign `msg` with a per-signature seed drawn from `rng`.
pub fn sign_randomized<R: TryCryptoRng + ?Sized>(
	sk: &PrivateKey,
	msg: &[u8],
	rng: &mut R,
) -> Result<Signature, Error> {
	sk.sign_randomized(msg, rng)
}

/// Verify `sig` over `msg`. `Ok(())` means the signature is valid.
pub fn verify(pk: &PublicKey, msg: &[u8], sig: &Signature) -> Result<(), Error> {
	pk.verify(msg, sig)
}
