//! AES-256 CTR_DRBG without derivation function, as used by the NIST known-answer test
//! generators. Deterministic, so only suitable for reproducing test vectors.

use aes::{
	cipher::{BlockEncrypt, KeyInit},
	Aes256, Block,
};
use rand_core::{TryCryptoRng, TryRngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::DrbgError;

/// Length of the entropy input and of the optional personalization string.
pub const ENTROPY_BYTES: usize = 48;

/// Maximum number of generate requests between reseeds (SP 800-90A, table 3).
pub const RESEED_INTERVAL: u64 = 1 << 48;

#[derive(Clone, ZeroizeOnDrop)]
pub struct Drbg {
	key: [u8; 32],
	v: [u8; 16],
	reseed_counter: u64,
	#[zeroize(skip)]
	reseed_interval: u64,
}

impl Drbg {
	/// Instantiate the DRBG.
	///
	/// # Arguments
	///
	/// * 'entropy_input' - 48 bytes of entropy
	/// * 'personalization_string' - optional 48 bytes XORed into the entropy
	pub fn new(
		entropy_input: &[u8],
		personalization_string: Option<&[u8]>,
	) -> Result<Self, DrbgError> {
		let mut drbg =
			Drbg { key: [0u8; 32], v: [0u8; 16], reseed_counter: 0, reseed_interval: RESEED_INTERVAL };
		drbg.reseed(entropy_input, personalization_string)?;
		Ok(drbg)
	}

	/// Use a shorter reseed interval than [`RESEED_INTERVAL`].
	pub fn with_reseed_interval(mut self, interval: u64) -> Self {
		self.reseed_interval = interval.min(RESEED_INTERVAL);
		self
	}

	/// Mix fresh entropy (and optional additional input) into the state and reset the request
	/// counter.
	pub fn reseed(
		&mut self,
		entropy_input: &[u8],
		additional_input: Option<&[u8]>,
	) -> Result<(), DrbgError> {
		if entropy_input.len() != ENTROPY_BYTES {
			return Err(DrbgError::InvalidEntropyLength(entropy_input.len()));
		}
		let mut seed_material = [0u8; ENTROPY_BYTES];
		seed_material.copy_from_slice(entropy_input);
		if let Some(extra) = additional_input {
			if extra.len() != ENTROPY_BYTES {
				seed_material.zeroize();
				return Err(DrbgError::InvalidPersonalizationLength(extra.len()));
			}
			for (s, e) in seed_material.iter_mut().zip(extra) {
				*s ^= e;
			}
		}

		self.update(Some(&seed_material));
		self.reseed_counter = 1;
		seed_material.zeroize();
		Ok(())
	}

	/// Fill `out` with pseudorandom bytes.
	///
	/// Fails once more than the reseed interval of requests were served since the last
	/// (re)seed.
	pub fn randombytes(&mut self, out: &mut [u8]) -> Result<(), DrbgError> {
		if self.reseed_counter > self.reseed_interval {
			return Err(DrbgError::ReseedRequired(self.reseed_interval));
		}

		let cipher = Aes256::new(&self.key.into());
		for chunk in out.chunks_mut(16) {
			self.increment_v();
			let mut block = Block::from(self.v);
			cipher.encrypt_block(&mut block);
			chunk.copy_from_slice(&block[..chunk.len()]);
			block.as_mut_slice().zeroize();
		}

		self.update(None);
		self.reseed_counter += 1;
		Ok(())
	}

	fn increment_v(&mut self) {
		for byte in self.v.iter_mut().rev() {
			let (next, carry) = byte.overflowing_add(1);
			*byte = next;
			if !carry {
				break;
			}
		}
	}

	/// CTR_DRBG_Update: three AES blocks, optionally XORed with `provided_data`, become the new
	/// key and V.
	fn update(&mut self, provided_data: Option<&[u8; ENTROPY_BYTES]>) {
		let cipher = Aes256::new(&self.key.into());
		let mut temp = [0u8; ENTROPY_BYTES];
		for chunk in temp.chunks_exact_mut(16) {
			self.increment_v();
			let mut block = Block::from(self.v);
			cipher.encrypt_block(&mut block);
			chunk.copy_from_slice(&block);
		}
		if let Some(data) = provided_data {
			for (t, d) in temp.iter_mut().zip(data) {
				*t ^= d;
			}
		}
		self.key.copy_from_slice(&temp[..32]);
		self.v.copy_from_slice(&temp[32..]);
		temp.zeroize();
	}
}

impl TryRngCore for Drbg {
	type Error = DrbgError;

	fn try_next_u32(&mut self) -> Result<u32, Self::Error> {
		let mut buf = [0u8; 4];
		self.randombytes(&mut buf)?;
		Ok(u32::from_le_bytes(buf))
	}

	fn try_next_u64(&mut self) -> Result<u64, Self::Error> {
		let mut buf = [0u8; 8];
		self.randombytes(&mut buf)?;
		Ok(u64::from_le_bytes(buf))
	}

	fn try_fill_bytes(&mut self, dst: &mut [u8]) -> Result<(), Self::Error> {
		self.randombytes(dst)
	}
}

impl TryCryptoRng for Drbg {}
