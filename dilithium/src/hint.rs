use crate::params::{MAX_K, N};

const WORDS: usize = MAX_K * N / 64;

/// Hint bits for up to `MAX_K` polynomials stored in one fixed arena, so a hint never allocates
/// and its encoded size depends on the parameter set alone.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct HintVec {
	k: usize,
	bits: [u64; WORDS],
}

impl HintVec {
	/// All-zero hint for `k` polynomials.
	pub fn new(k: usize) -> Self {
		debug_assert!(k <= MAX_K);
		HintVec { k, bits: [0u64; WORDS] }
	}

	/// Number of polynomials covered.
	pub fn len(&self) -> usize {
		self.k
	}

	pub fn is_empty(&self) -> bool {
		self.k == 0
	}

	pub fn get(&self, poly: usize, coeff: usize) -> bool {
		let bit = poly * N + coeff;
		self.bits[bit / 64] >> (bit % 64) & 1 == 1
	}

	pub fn set(&mut self, poly: usize, coeff: usize, value: bool) {
		let bit = poly * N + coeff;
		let mask = 1u64 << (bit % 64);
		if value {
			self.bits[bit / 64] |= mask;
		} else {
			self.bits[bit / 64] &= !mask;
		}
	}

	/// Total number of set bits.
	pub fn weight(&self) -> usize {
		self.bits.iter().map(|w| w.count_ones() as usize).sum()
	}

	/// Ascending coefficient indices of the set bits in polynomial `poly`.
	pub fn indices(&self, poly: usize) -> impl Iterator<Item = usize> + '_ {
		(0..N).filter(move |&j| self.get(poly, j))
	}
}

impl core::fmt::Debug for HintVec {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		let mut list = f.debug_list();
		for i in 0..self.k {
			list.entries(self.indices(i).map(|j| (i, j)));
		}
		list.finish()
	}
}
