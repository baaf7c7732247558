//! Deterministic expansion of seeds into ring elements.
//!
//! Every sampler owns a fresh SHAKE instance built from its own domain-separated input; nothing
//! is shared between calls.

use crate::{
	params::{CRHBYTES, N, Q, SEEDBYTES},
	poly::{self, NttPoly, Poly},
};
use sha3::{
	digest::{ExtendableOutput, Update, XofReader},
	Shake128, Shake128Reader, Shake256, Shake256Reader,
};
use subtle::{Choice, ConditionallySelectable};
use zeroize::Zeroize;

pub const SHAKE128_RATE: usize = 168;
pub const SHAKE256_RATE: usize = 136;

/// Block budget for challenge sampling. The expected need is a single block.
pub const CHALLENGE_MAX_BLOCKS: usize = 16;

/// Block-buffered reader over one SHAKE output stream.
pub struct XofStream<R: XofReader> {
	reader: R,
	block: [u8; SHAKE128_RATE],
	rate: usize,
	pos: usize,
	blocks: usize,
}

impl<R: XofReader> XofStream<R> {
	fn new(reader: R, rate: usize) -> Self {
		XofStream { reader, block: [0u8; SHAKE128_RATE], rate, pos: rate, blocks: 0 }
	}

	/// Squeeze the next full block, discarding whatever was left of the current one.
	pub fn next_block(&mut self) -> &[u8] {
		self.reader.read(&mut self.block[..self.rate]);
		self.blocks += 1;
		self.pos = self.rate;
		&self.block[..self.rate]
	}

	pub fn next_byte(&mut self) -> u8 {
		if self.pos == self.rate {
			self.next_block();
			self.pos = 0;
		}
		let b = self.block[self.pos];
		self.pos += 1;
		b
	}

	/// Like [`Self::next_byte`] but gives up instead of squeezing block number `max_blocks + 1`.
	pub fn try_next_byte(&mut self, max_blocks: usize) -> Option<u8> {
		if self.pos == self.rate && self.blocks >= max_blocks {
			return None;
		}
		Some(self.next_byte())
	}

	pub fn fill(&mut self, out: &mut [u8]) {
		for b in out.iter_mut() {
			*b = self.next_byte();
		}
	}

	/// Number of blocks squeezed so far.
	pub fn blocks(&self) -> usize {
		self.blocks
	}
}

impl<R: XofReader> Drop for XofStream<R> {
	fn drop(&mut self) {
		self.block.zeroize();
	}
}

/// SHAKE128(seed || nonce) with the nonce little endian.
pub fn shake128_stream(seed: &[u8], nonce: u16) -> XofStream<Shake128Reader> {
	let mut hasher = Shake128::default();
	hasher.update(seed);
	hasher.update(&nonce.to_le_bytes());
	XofStream::new(hasher.finalize_xof(), SHAKE128_RATE)
}

/// SHAKE256(seed || nonce) with the nonce little endian.
pub fn shake256_stream(seed: &[u8], nonce: u16) -> XofStream<Shake256Reader> {
	let mut hasher = Shake256::default();
	hasher.update(seed);
	hasher.update(&nonce.to_le_bytes());
	XofStream::new(hasher.finalize_xof(), SHAKE256_RATE)
}

/// SHAKE256 over the concatenation of `inputs`, squeezed into `out`.
pub fn shake256(out: &mut [u8], inputs: &[&[u8]]) {
	let mut hasher = Shake256::default();
	for input in inputs {
		hasher.update(input);
	}
	hasher.finalize_xof().read(out);
}

/// Sample uniformly random coefficients in [0, Q-1] by performing rejection sampling on array of
/// random bytes.
///
/// # Arguments
///
/// * 'a' - output coefficients still to be filled
/// * 'buf' - random bytes, consumed in groups of three
///
/// Returns number of sampled coefficients. Can be smaller than a.len() if not enough random bytes
/// were given.
pub fn rej_uniform(a: &mut [i32], buf: &[u8]) -> usize {
	let mut ctr = 0usize;
	for group in buf.chunks_exact(3) {
		if ctr == a.len() {
			break;
		}
		let t = (group[0] as u32 | (group[1] as u32) << 8 | (group[2] as u32) << 16) & 0x7FFFFF;
		if (t as i32) < Q {
			a[ctr] = t as i32;
			ctr += 1;
		}
	}
	ctr
}

/// Entry of the public matrix: uniformly random coefficients in [0, Q-1], read directly as an
/// NTT-domain polynomial, from SHAKE128(rho || nonce).
pub fn uniform(rho: &[u8; SEEDBYTES], nonce: u16) -> NttPoly {
	let mut stream = shake128_stream(rho, nonce);
	let mut a = NttPoly::default();
	let mut ctr = 0;
	// SHAKE128_RATE is a multiple of 3, so no group straddles two blocks.
	while ctr < N {
		ctr += rej_uniform(&mut a.coeffs[ctr..], stream.next_block());
	}
	a
}

/// Sample uniformly random coefficients in [-eta, eta] by performing rejection sampling on the
/// nibbles of `buf`, low nibble first.
///
/// Returns number of sampled coefficients. Can be smaller than a.len() if not enough random bytes
/// were given.
pub fn rej_eta(a: &mut [i32], buf: &[u8], eta: i32) -> usize {
	let mut ctr = 0usize;

	for &byte in buf {
		for nibble in [(byte & 0x0F) as u32, (byte >> 4) as u32] {
			// 205 * t >> 10 == t / 5 for t < 16
			let (valid, coeff) = if eta == 2 {
				(nibble < 15, 2 - (nibble - (205 * nibble >> 10) * 5) as i32)
			} else {
				(nibble < 9, 4 - nibble as i32)
			};

			let has_space = ctr < a.len();
			let store = Choice::from(valid as u8 & has_space as u8);
			if has_space {
				a[ctr] = i32::conditional_select(&a[ctr], &coeff, store);
			}
			ctr += store.unwrap_u8() as usize;
		}
	}
	ctr
}

/// Sample polynomial with uniformly random coefficients in [-eta, eta] by performing rejection
/// sampling on the output stream of SHAKE256(seed || nonce).
pub fn uniform_eta(seed: &[u8; CRHBYTES], nonce: u16, eta: i32) -> Poly {
	let mut stream = shake256_stream(seed, nonce);
	let mut a = Poly::default();
	let mut ctr = 0;
	while ctr < N {
		ctr += rej_eta(&mut a.coeffs[ctr..], stream.next_block(), eta);
	}
	a
}

/// Sample polynomial with uniformly random coefficients in [-(gamma1 - 1), gamma1] from the
/// output stream of SHAKE256(seed || nonce). No rejection: gamma1 is a power of two.
pub fn uniform_gamma1(seed: &[u8; CRHBYTES], nonce: u16, gamma1: i32) -> Poly {
	let mut stream = shake256_stream(seed, nonce);
	let mut buf = [0u8; N * 20 / 8];
	let len = if gamma1 == 1 << 17 { N * 18 / 8 } else { N * 20 / 8 };
	stream.fill(&mut buf[..len]);
	let mut a = Poly::default();
	poly::z_unpack(&mut a, &buf[..len], gamma1);
	buf.zeroize();
	a
}

/// Samples the challenge polynomial with `tau` nonzero coefficients in {-1, 1} from the output
/// stream of SHAKE256(seed).
///
/// Returns `None` if the stream does not settle within [`CHALLENGE_MAX_BLOCKS`] blocks.
pub fn challenge(seed: &[u8], tau: usize) -> Option<Poly> {
	let mut hasher = Shake256::default();
	hasher.update(seed);
	let mut stream = XofStream::new(hasher.finalize_xof(), SHAKE256_RATE);

	let mut signs: u64 = 0;
	for i in 0..8 {
		signs |= (stream.next_byte() as u64) << (8 * i);
	}

	let mut c = Poly::default();
	for i in (N - tau)..N {
		let b = loop {
			let b = stream.try_next_byte(CHALLENGE_MAX_BLOCKS)? as usize;
			if b <= i {
				break b;
			}
		};
		c.coeffs[i] = c.coeffs[b];
		c.coeffs[b] = 1 - 2 * ((signs & 1) as i32);
		signs >>= 1;
	}
	Some(c)
}
