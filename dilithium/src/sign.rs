use core::fmt;

use log::{debug, trace};
use rand_core::TryCryptoRng;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use crate::{
	errors::Error,
	hint::HintVec,
	keys::{compute_t, KeySeed, PrivateKey, PublicKey},
	params::{ParameterSet, Params, CRHBYTES, CTILDEBYTES, N, SEEDBYTES},
	poly::{self, NttPoly},
	polyvec::{self, Matrix, NttPolyVec, PolyVec},
	reduce, rounding, sampler,
	signature::Signature,
};

/// Why a signing attempt was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rejection {
	/// The challenge stream exceeded its block budget.
	ChallengeSampling,
	/// ||z|| >= gamma1 - beta.
	ResponseNorm,
	/// ||LowBits(w - c*s2)|| >= gamma2 - beta.
	LowBitsNorm,
	/// HighBits(w - c*s2) differs from w1.
	HighBitsChanged,
	/// ||c*t0|| >= gamma2.
	CommitmentNorm,
	/// More than omega hint bits.
	HintWeight,
}

impl fmt::Display for Rejection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Rejection::ChallengeSampling => "challenge sampling ran out of blocks",
			Rejection::ResponseNorm => "response norm too large",
			Rejection::LowBitsNorm => "low bits norm too large",
			Rejection::HighBitsChanged => "high bits changed",
			Rejection::CommitmentNorm => "c*t0 norm too large",
			Rejection::HintWeight => "too many hint bits",
		})
	}
}

/// Generate public and private key from a seed.
///
/// # Arguments
///
/// * 'set' - parameter set to generate under
/// * 'seed' - 32 bytes of key generation entropy
pub(crate) fn keypair(set: ParameterSet, seed: &KeySeed) -> (PublicKey, PrivateKey) {
	let params = set.params();
	let mut seedbuf = [0u8; 2 * SEEDBYTES + CRHBYTES];
	sampler::shake256(&mut seedbuf, &[&seed.as_bytes()[..]]);

	let mut rho = [0u8; SEEDBYTES];
	let mut rho_prime = [0u8; CRHBYTES];
	let mut key = [0u8; SEEDBYTES];
	rho.copy_from_slice(&seedbuf[..SEEDBYTES]);
	rho_prime.copy_from_slice(&seedbuf[SEEDBYTES..SEEDBYTES + CRHBYTES]);
	key.copy_from_slice(&seedbuf[SEEDBYTES + CRHBYTES..]);
	seedbuf.zeroize();

	let a = Matrix::expand(&rho, params);
	let s1 = polyvec::uniform_eta(&rho_prime, 0, params.l, params.eta);
	let s2 = polyvec::uniform_eta(&rho_prime, params.l as u16, params.k, params.eta);
	rho_prime.zeroize();

	let (t1, t0) = compute_t(&a, &s1, &s2);
	let public = PublicKey::from_parts(set, rho, t1.clone(), a.clone());
	let secret = PrivateKey::from_parts(set, rho, key, public.tr, s1, s2, t0, t1, a);
	key.zeroize();

	debug!("generated {set} key pair");
	(public, secret)
}

/// Deterministic or caller-seeded signature.
///
/// # Arguments
///
/// * 'sk' - signing key
/// * 'msg' - message to sign
/// * 'rnd' - per-signature seed rho'; derived from (K, mu) when `None`
pub(crate) fn signature(sk: &PrivateKey, msg: &[u8], rnd: Option<&[u8; CRHBYTES]>) -> Signature {
	let params = sk.set.params();
	let mut mu = [0u8; CRHBYTES];
	sampler::shake256(&mut mu, &[&sk.tr[..], msg]);

	let mut rho_prime = [0u8; CRHBYTES];
	match rnd {
		Some(rnd) => rho_prime.copy_from_slice(rnd),
		None => sampler::shake256(&mut rho_prime, &[&sk.key[..], &mu[..]]),
	}

	let mut attempts: u32 = 0;
	let sig = loop {
		// nonce is kappa = l * attempt, truncated to 16 bits
		let nonce = (params.l as u32).wrapping_mul(attempts) as u16;
		attempts += 1;
		match attempt(sk, params, &mu, &rho_prime, nonce) {
			Ok(sig) => break sig,
			Err(reason) => trace!("signing attempt {attempts} rejected: {reason}"),
		}
	};
	rho_prime.zeroize();

	debug!("{} signature produced after {attempts} attempts", sk.set);
	sig
}

/// Randomized signature with rho' drawn from `rng`.
pub(crate) fn signature_randomized<R: TryCryptoRng + ?Sized>(
	sk: &PrivateKey,
	msg: &[u8],
	rng: &mut R,
) -> Result<Signature, Error> {
	let mut rnd = [0u8; CRHBYTES];
	rng.try_fill_bytes(&mut rnd).map_err(|err| {
		log::warn!("randomness source failed during signing: {err}");
		Error::Randomness
	})?;
	let sig = signature(sk, msg, Some(&rnd));
	rnd.zeroize();
	Ok(sig)
}

/// One pass of the rejection loop with mask nonce base `nonce`.
fn attempt(
	sk: &PrivateKey,
	params: &Params,
	mu: &[u8; CRHBYTES],
	rho_prime: &[u8; CRHBYTES],
	nonce: u16,
) -> Result<Signature, Rejection> {
	let y = Zeroizing::new(polyvec::uniform_gamma1(rho_prime, nonce, params.l, params.gamma1));

	// w = A * y, split into high and low parts
	let y_ntt = Zeroizing::new(polyvec::ntt(&y));
	let mut w = Zeroizing::new(polyvec::invntt_tomont(&Zeroizing::new(sk.a.mul(&y_ntt))));
	polyvec::caddq(&mut w);
	let mut w1 = w.clone();
	let mut w0 = Zeroizing::new(PolyVec::new(params.k));
	polyvec::decompose(&mut w1, &mut w0, params.gamma2);

	let mut w1_packed = Zeroizing::new(alloc::vec![0u8; params.k * params.poly_w1_packed_bytes()]);
	polyvec::pack_w1(&mut w1_packed, &w1, params);
	let mut c_tilde = [0u8; CTILDEBYTES];
	sampler::shake256(&mut c_tilde, &[&mu[..], &w1_packed[..]]);
	let c = sampler::challenge(&c_tilde, params.tau).ok_or(Rejection::ChallengeSampling)?;
	let c_ntt = poly::ntt(&c);

	// z = y + c * s1
	let mut z = polyvec::invntt_tomont(&secret_product(&c_ntt, &sk.s1_ntt));
	polyvec::add_ip(&mut z, &y);
	polyvec::reduce(&mut z);
	if polyvec::check_norm(&z, params.gamma1 - params.beta) {
		z.zeroize();
		return Err(Rejection::ResponseNorm);
	}

	// r = w - c * s2
	let cs2 = Zeroizing::new(polyvec::invntt_tomont(&secret_product(&c_ntt, &sk.s2_ntt)));
	let mut r = w;
	polyvec::sub_ip(&mut r, &cs2);
	polyvec::freeze(&mut r);
	let mut r1 = r.clone();
	let mut r0 = Zeroizing::new(PolyVec::new(params.k));
	polyvec::decompose(&mut r1, &mut r0, params.gamma2);
	if polyvec::check_norm(&r0, params.gamma2 - params.beta) {
		z.zeroize();
		return Err(Rejection::LowBitsNorm);
	}
	if r1 != w1 {
		z.zeroize();
		return Err(Rejection::HighBitsChanged);
	}

	let mut ct0 = Zeroizing::new(polyvec::invntt_tomont(&secret_product(&c_ntt, &sk.t0_ntt)));
	polyvec::reduce(&mut ct0);
	if polyvec::check_norm(&ct0, params.gamma2) {
		z.zeroize();
		return Err(Rejection::CommitmentNorm);
	}

	// h = MakeHint(-c*t0, w - c*s2 + c*t0)
	let mut h = HintVec::new(params.k);
	for (i, (r_poly, ct0_poly)) in r.vec.iter().zip(ct0.vec.iter()).enumerate() {
		for j in 0..N {
			let ct0_ij = ct0_poly.coeffs[j];
			let shifted = reduce::freeze(r_poly.coeffs[j] + ct0_ij);
			h.set(i, j, rounding::make_hint(-ct0_ij, shifted, params.gamma2));
		}
	}
	if h.weight() > params.omega {
		z.zeroize();
		return Err(Rejection::HintWeight);
	}

	Ok(Signature::new(params.set, c_tilde, z, h))
}

/// c * v in the NTT domain, wiped on drop.
fn secret_product(c_ntt: &NttPoly, v: &NttPolyVec) -> Zeroizing<NttPolyVec> {
	Zeroizing::new(polyvec::pointwise_poly_montgomery(c_ntt, v))
}

/// Verify signature.
///
/// # Arguments
///
/// * 'pk' - public key with its cached A, NTT(t1 * 2^d) and tr
/// * 'msg' - message that is claimed to be signed
/// * 'sig' - decoded signature
pub(crate) fn verify(pk: &PublicKey, msg: &[u8], sig: &Signature) -> Result<(), Error> {
	if sig.set != pk.set {
		return Err(Error::ParameterMismatch { expected: pk.set, found: sig.set });
	}
	let params = pk.set.params();

	if polyvec::check_norm(&sig.z, params.gamma1 - params.beta) {
		debug!("signature rejected: response norm too large");
		return Err(Error::InvalidSignature);
	}
	if sig.h.weight() > params.omega {
		debug!("signature rejected: too many hint bits");
		return Err(Error::InvalidSignature);
	}

	let mut mu = [0u8; CRHBYTES];
	sampler::shake256(&mut mu, &[&pk.tr[..], msg]);

	let Some(c) = sampler::challenge(&sig.c_tilde, params.tau) else {
		debug!("signature rejected: challenge sampling ran out of blocks");
		return Err(Error::InvalidSignature);
	};
	let c_ntt = poly::ntt(&c);

	// w' = A * z - c * t1 * 2^d
	let mut w = pk.a.mul(&polyvec::ntt(&sig.z));
	polyvec::ntt_sub_ip(&mut w, &polyvec::pointwise_poly_montgomery(&c_ntt, &pk.t1_ntt));
	polyvec::ntt_reduce(&mut w);
	let mut w1 = polyvec::invntt_tomont(&w);
	polyvec::reduce(&mut w1);
	polyvec::caddq(&mut w1);

	for (i, p) in w1.vec.iter_mut().enumerate() {
		for (j, coeff) in p.coeffs.iter_mut().enumerate() {
			*coeff = rounding::use_hint(sig.h.get(i, j), *coeff, params.gamma2);
		}
	}

	let mut w1_packed = alloc::vec![0u8; params.k * params.poly_w1_packed_bytes()];
	polyvec::pack_w1(&mut w1_packed, &w1, params);
	let mut c_tilde = [0u8; CTILDEBYTES];
	sampler::shake256(&mut c_tilde, &[&mu[..], &w1_packed[..]]);

	if bool::from(c_tilde[..].ct_eq(&sig.c_tilde[..])) {
		Ok(())
	} else {
		debug!("signature rejected: commitment hash mismatch");
		Err(Error::InvalidSignature)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::keys::Keypair;
	use rand::{rngs::StdRng, Rng, SeedableRng};

	fn seeded(set: ParameterSet, byte: u8) -> Keypair {
		Keypair::from_seed(set, &KeySeed::new([byte; SEEDBYTES]))
	}

	#[test]
	fn test_sign_verify_all_sets() {
		for set in ParameterSet::ALL {
			let kp = seeded(set, 1);
			let sig = signature(&kp.secret, b"message", None);
			assert_eq!(verify(&kp.public, b"message", &sig), Ok(()));
			assert_eq!(verify(&kp.public, b"massage", &sig), Err(Error::InvalidSignature));
		}
	}

	#[test]
	fn test_keypair_is_deterministic() {
		for set in ParameterSet::ALL {
			assert_eq!(seeded(set, 2), seeded(set, 2));
			assert_ne!(seeded(set, 2).public, seeded(set, 3).public);
		}
	}

	#[test]
	fn test_deterministic_signing_repeats() {
		let kp = seeded(ParameterSet::Dilithium3, 4);
		let a = signature(&kp.secret, b"same", None);
		let b = signature(&kp.secret, b"same", None);
		assert_eq!(a, b);
		assert_ne!(a, signature(&kp.secret, b"other", None));
	}

	#[test]
	fn test_explicit_rnd_changes_signature() {
		let kp = seeded(ParameterSet::Dilithium2, 5);
		let a = signature(&kp.secret, b"msg", Some(&[1u8; CRHBYTES]));
		let b = signature(&kp.secret, b"msg", Some(&[2u8; CRHBYTES]));
		assert_ne!(a.c_tilde, b.c_tilde);
		assert_eq!(verify(&kp.public, b"msg", &a), Ok(()));
		assert_eq!(verify(&kp.public, b"msg", &b), Ok(()));
		assert_eq!(a, signature(&kp.secret, b"msg", Some(&[1u8; CRHBYTES])));
	}

	#[test]
	fn test_randomized_signing_uses_rng() {
		let kp = seeded(ParameterSet::Dilithium5, 6);
		let mut rng = StdRng::seed_from_u64(61);
		let a = signature_randomized(&kp.secret, b"msg", &mut rng).unwrap();
		let b = signature_randomized(&kp.secret, b"msg", &mut rng).unwrap();
		assert_ne!(a, b);
		assert!(verify(&kp.public, b"msg", &a).is_ok());
		assert!(verify(&kp.public, b"msg", &b).is_ok());
	}

	#[test]
	fn test_signature_bounds_hold() {
		for set in ParameterSet::ALL {
			let params = set.params();
			let kp = seeded(set, 7);
			for m in 0u8..20 {
				let sig = signature(&kp.secret, &[m; 3], None);
				assert!(polyvec::infinity_norm(&sig.z) < params.gamma1 - params.beta);
				assert!(sig.h.weight() <= params.omega);
			}
		}
	}

	#[test]
	fn test_verify_rejects_other_set() {
		let kp2 = seeded(ParameterSet::Dilithium2, 8);
		let kp3 = seeded(ParameterSet::Dilithium3, 8);
		let sig = signature(&kp3.secret, b"x", None);
		assert_eq!(
			verify(&kp2.public, b"x", &sig),
			Err(Error::ParameterMismatch {
				expected: ParameterSet::Dilithium2,
				found: ParameterSet::Dilithium3
			})
		);
	}

	#[test]
	fn test_verify_rejects_large_z() {
		let set = ParameterSet::Dilithium2;
		let params = set.params();
		let kp = seeded(set, 9);
		let mut sig = signature(&kp.secret, b"z", None);
		sig.z.vec[0].coeffs[0] = params.gamma1 - params.beta;
		assert_eq!(verify(&kp.public, b"z", &sig), Err(Error::InvalidSignature));
	}

	#[test]
	fn test_verify_rejects_heavy_hint() {
		let set = ParameterSet::Dilithium2;
		let params = set.params();
		let kp = seeded(set, 10);
		let mut sig = signature(&kp.secret, b"h", None);
		for j in 0..=params.omega {
			sig.h.set(0, j, true);
		}
		assert_eq!(verify(&kp.public, b"h", &sig), Err(Error::InvalidSignature));
	}

	#[test]
	fn test_verify_rejects_shifted_response() {
		let mut rng = StdRng::seed_from_u64(11);
		for set in ParameterSet::ALL {
			let params = set.params();
			let kp = seeded(set, 11);
			let sig = signature(&kp.secret, b"response", None);
			for _ in 0..100 {
				let mut bad = sig.clone();
				let (i, j) = (rng.random_range(0..params.l), rng.random_range(0..N));
				bad.z.vec[i].coeffs[j] += if rng.random::<bool>() { 1 } else { -1 };
				assert_eq!(
					verify(&kp.public, b"response", &bad),
					Err(Error::InvalidSignature),
					"{set}: z[{i}][{j}]"
				);
			}
		}
	}

	#[test]
	fn test_verify_rejects_flipped_hint() {
		let mut rng = StdRng::seed_from_u64(12);
		for set in ParameterSet::ALL {
			let params = set.params();
			let kp = seeded(set, 12);
			let sig = signature(&kp.secret, b"hint", None);
			for _ in 0..100 {
				let mut bad = sig.clone();
				let (i, j) = (rng.random_range(0..params.k), rng.random_range(0..N));
				bad.h.set(i, j, !bad.h.get(i, j));
				assert_eq!(
					verify(&kp.public, b"hint", &bad),
					Err(Error::InvalidSignature),
					"{set}: h[{i}][{j}]"
				);
			}
		}
	}

	#[test]
	fn test_rejection_display() {
		assert_eq!(alloc::format!("{}", Rejection::HintWeight), "too many hint bits");
	}
}
