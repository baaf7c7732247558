use crate::{
	errors::{Error, FormatError},
	hint::HintVec,
	params::{
		ParameterSet, Params, CTILDEBYTES, POLYT0_PACKEDBYTES, POLYT1_PACKEDBYTES, SEEDBYTES,
		TRBYTES,
	},
	poly,
	polyvec::PolyVec,
};

/// Checks an encoded length against the selected set. A length that belongs to another set is
/// reported as a parameter mismatch rather than a format error.
///
/// # Arguments
///
/// * 'set' - the parameter set the caller selected
/// * 'actual' - length of the encoded bytes
/// * 'size' - size of the encoded object under a given set
pub fn check_length(
	set: ParameterSet,
	actual: usize,
	size: fn(&Params) -> usize,
) -> Result<(), Error> {
	let expected = size(set.params());
	if actual == expected {
		return Ok(());
	}
	match ParameterSet::ALL.into_iter().find(|other| size(other.params()) == actual) {
		Some(found) => Err(Error::ParameterMismatch { expected: set, found }),
		None => Err(FormatError::BadLength { expected, actual }.into()),
	}
}

/// Bit-pack public key pk = (rho, t1).
///
/// # Arguments
///
/// * 'pk' - output for public key value, exactly public_key_bytes long
/// * 'rho' - const seed
/// * 't1' - const PolyVec
pub fn pack_pk(pk: &mut [u8], rho: &[u8; SEEDBYTES], t1: &PolyVec) {
	pk[..SEEDBYTES].copy_from_slice(rho);
	for (chunk, p) in pk[SEEDBYTES..].chunks_exact_mut(POLYT1_PACKEDBYTES).zip(t1.vec.iter()) {
		poly::t1_pack(chunk, p);
	}
}

/// Unpack public key pk = (rho, t1). The length of `pk` must already be checked.
pub fn unpack_pk(rho: &mut [u8; SEEDBYTES], t1: &mut PolyVec, pk: &[u8]) {
	rho.copy_from_slice(&pk[..SEEDBYTES]);
	for (chunk, p) in pk[SEEDBYTES..].chunks_exact(POLYT1_PACKEDBYTES).zip(t1.vec.iter_mut()) {
		poly::t1_unpack(p, chunk);
	}
}

/// Bit-pack private key sk = (rho, key, tr, s1, s2, t0).
#[allow(clippy::too_many_arguments)]
pub fn pack_sk(
	sk: &mut [u8],
	params: &Params,
	rho: &[u8; SEEDBYTES],
	key: &[u8; SEEDBYTES],
	tr: &[u8; TRBYTES],
	s1: &PolyVec,
	s2: &PolyVec,
	t0: &PolyVec,
) {
	let (head, rest) = sk.split_at_mut(2 * SEEDBYTES + TRBYTES);
	head[..SEEDBYTES].copy_from_slice(rho);
	head[SEEDBYTES..2 * SEEDBYTES].copy_from_slice(key);
	head[2 * SEEDBYTES..].copy_from_slice(tr);

	let eta_bytes = params.poly_eta_packed_bytes();
	let (eta_part, t0_part) = rest.split_at_mut((params.l + params.k) * eta_bytes);
	for (chunk, p) in eta_part.chunks_exact_mut(eta_bytes).zip(s1.vec.iter().chain(s2.vec.iter())) {
		poly::eta_pack(chunk, p, params.eta);
	}
	for (chunk, p) in t0_part.chunks_exact_mut(POLYT0_PACKEDBYTES).zip(t0.vec.iter()) {
		poly::t0_pack(chunk, p);
	}
}

/// Unpack private key sk = (rho, key, tr, s1, s2, t0). The length of `sk` must already be
/// checked and the output vectors sized l, k and k.
#[allow(clippy::too_many_arguments)]
pub fn unpack_sk(
	rho: &mut [u8; SEEDBYTES],
	key: &mut [u8; SEEDBYTES],
	tr: &mut [u8; TRBYTES],
	s1: &mut PolyVec,
	s2: &mut PolyVec,
	t0: &mut PolyVec,
	sk: &[u8],
	params: &Params,
) -> Result<(), FormatError> {
	let (head, rest) = sk.split_at(2 * SEEDBYTES + TRBYTES);
	rho.copy_from_slice(&head[..SEEDBYTES]);
	key.copy_from_slice(&head[SEEDBYTES..2 * SEEDBYTES]);
	tr.copy_from_slice(&head[2 * SEEDBYTES..]);

	let eta_bytes = params.poly_eta_packed_bytes();
	let (s1_part, rest) = rest.split_at(params.l * eta_bytes);
	let (s2_part, t0_part) = rest.split_at(params.k * eta_bytes);
	for (field, part, v) in [("s1", s1_part, s1), ("s2", s2_part, s2)] {
		for (chunk, p) in part.chunks_exact(eta_bytes).zip(v.vec.iter_mut()) {
			if !poly::eta_unpack(p, chunk, params.eta) {
				return Err(FormatError::CoefficientOutOfRange { field });
			}
		}
	}
	for (chunk, p) in t0_part.chunks_exact(POLYT0_PACKEDBYTES).zip(t0.vec.iter_mut()) {
		poly::t0_unpack(p, chunk);
	}
	Ok(())
}

/// Bit-pack signature sig = (c_tilde, z, h). The hint weight must not exceed omega.
pub fn pack_sig(
	sig: &mut [u8],
	params: &Params,
	c_tilde: &[u8; CTILDEBYTES],
	z: &PolyVec,
	h: &HintVec,
) {
	sig[..CTILDEBYTES].copy_from_slice(c_tilde);

	let z_bytes = params.poly_z_packed_bytes();
	let (z_part, hint) = sig[CTILDEBYTES..].split_at_mut(params.l * z_bytes);
	for (chunk, p) in z_part.chunks_exact_mut(z_bytes).zip(z.vec.iter()) {
		poly::z_pack(chunk, p, params.gamma1);
	}

	hint.fill(0);
	let mut k = 0;
	for i in 0..params.k {
		for j in h.indices(i).take(params.omega - k) {
			hint[k] = j as u8;
			k += 1;
		}
		hint[params.omega + i] = k as u8;
	}
}

/// Unpack signature sig = (c_tilde, z, h). The length of `sig` must already be checked and `z`
/// sized l.
///
/// Rejects hint tables whose cumulative counts decrease or exceed omega, whose indices within a
/// polynomial are not strictly increasing, or whose unused slots are not zero. This keeps the
/// encoding of a valid signature unique.
pub fn unpack_sig(
	c_tilde: &mut [u8; CTILDEBYTES],
	z: &mut PolyVec,
	h: &mut HintVec,
	sig: &[u8],
	params: &Params,
) -> Result<(), FormatError> {
	c_tilde.copy_from_slice(&sig[..CTILDEBYTES]);

	let z_bytes = params.poly_z_packed_bytes();
	let (z_part, hint) = sig[CTILDEBYTES..].split_at(params.l * z_bytes);
	for (chunk, p) in z_part.chunks_exact(z_bytes).zip(z.vec.iter_mut()) {
		poly::z_unpack(p, chunk, params.gamma1);
	}

	*h = HintVec::new(params.k);
	let mut k = 0usize;
	for i in 0..params.k {
		let end = hint[params.omega + i] as usize;
		if end < k || end > params.omega {
			return Err(FormatError::MalformedHint);
		}
		for j in k..end {
			if j > k && hint[j] <= hint[j - 1] {
				return Err(FormatError::MalformedHint);
			}
			h.set(i, hint[j] as usize, true);
		}
		k = end;
	}

	if hint[k..params.omega].iter().any(|&b| b != 0) {
		return Err(FormatError::MalformedHint);
	}
	Ok(())
}
