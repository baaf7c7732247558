use core::{fmt, str::FromStr};

use crate::errors::Error;

pub const N: usize = 256;
pub const Q: i32 = 8380417;
pub const D: u32 = 13;
pub const ROOT_OF_UNITY: i32 = 1753;

pub const SEEDBYTES: usize = 32;
pub const CRHBYTES: usize = 64;
pub const TRBYTES: usize = 32;
pub const CTILDEBYTES: usize = 32;

pub const POLYT1_PACKEDBYTES: usize = 320;
pub const POLYT0_PACKEDBYTES: usize = 416;

/// Largest row count over all parameter sets, used to size the hint arena.
pub const MAX_K: usize = 8;

/// The three published CRYSTALS-Dilithium security levels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ParameterSet {
	#[default]
	Dilithium2,
	Dilithium3,
	Dilithium5,
}

/// Constants of one parameter set. Only ever handed out as `&'static` references.
#[derive(Debug, PartialEq, Eq)]
pub struct Params {
	pub set: ParameterSet,
	pub k: usize,
	pub l: usize,
	pub eta: i32,
	pub tau: usize,
	pub beta: i32,
	pub gamma1: i32,
	pub gamma2: i32,
	pub omega: usize,
}

pub static DILITHIUM2: Params = Params {
	set: ParameterSet::Dilithium2,
	k: 4,
	l: 4,
	eta: 2,
	tau: 39,
	beta: 78,
	gamma1: 1 << 17,
	gamma2: (Q - 1) / 88,
	omega: 80,
};

pub static DILITHIUM3: Params = Params {
	set: ParameterSet::Dilithium3,
	k: 6,
	l: 5,
	eta: 4,
	tau: 49,
	beta: 196,
	gamma1: 1 << 19,
	gamma2: (Q - 1) / 32,
	omega: 55,
};

pub static DILITHIUM5: Params = Params {
	set: ParameterSet::Dilithium5,
	k: 8,
	l: 7,
	eta: 2,
	tau: 60,
	beta: 120,
	gamma1: 1 << 19,
	gamma2: (Q - 1) / 32,
	omega: 75,
};

impl ParameterSet {
	pub const ALL: [ParameterSet; 3] =
		[ParameterSet::Dilithium2, ParameterSet::Dilithium3, ParameterSet::Dilithium5];

	pub fn params(self) -> &'static Params {
		match self {
			ParameterSet::Dilithium2 => &DILITHIUM2,
			ParameterSet::Dilithium3 => &DILITHIUM3,
			ParameterSet::Dilithium5 => &DILITHIUM5,
		}
	}

	/// NIST security level (2, 3 or 5).
	pub const fn security_level(self) -> u8 {
		match self {
			ParameterSet::Dilithium2 => 2,
			ParameterSet::Dilithium3 => 3,
			ParameterSet::Dilithium5 => 5,
		}
	}

	/// Finds the set whose public key encoding has exactly `len` bytes.
	pub fn from_public_key_len(len: usize) -> Option<ParameterSet> {
		Self::ALL.into_iter().find(|set| set.params().public_key_bytes() == len)
	}

	pub fn from_secret_key_len(len: usize) -> Option<ParameterSet> {
		Self::ALL.into_iter().find(|set| set.params().secret_key_bytes() == len)
	}

	pub fn from_signature_len(len: usize) -> Option<ParameterSet> {
		Self::ALL.into_iter().find(|set| set.params().signature_bytes() == len)
	}
}

impl Params {
	/// Bits per packed coefficient of s1/s2.
	pub const fn eta_bits(&self) -> usize {
		if self.eta == 2 {
			3
		} else {
			4
		}
	}

	pub const fn poly_eta_packed_bytes(&self) -> usize {
		N * self.eta_bits() / 8
	}

	/// Bits per packed coefficient of z and of the mask y.
	pub const fn gamma1_bits(&self) -> usize {
		if self.gamma1 == 1 << 17 {
			18
		} else {
			20
		}
	}

	pub const fn poly_z_packed_bytes(&self) -> usize {
		N * self.gamma1_bits() / 8
	}

	/// Number of high-bits buckets, `(q - 1) / (2 * gamma2)`.
	pub const fn w1_buckets(&self) -> i32 {
		(Q - 1) / (2 * self.gamma2)
	}

	pub const fn w1_bits(&self) -> usize {
		if self.gamma2 == (Q - 1) / 88 {
			6
		} else {
			4
		}
	}

	pub const fn poly_w1_packed_bytes(&self) -> usize {
		N * self.w1_bits() / 8
	}

	pub const fn public_key_bytes(&self) -> usize {
		SEEDBYTES + self.k * POLYT1_PACKEDBYTES
	}

	pub const fn secret_key_bytes(&self) -> usize {
		2 * SEEDBYTES +
			TRBYTES + (self.l + self.k) * self.poly_eta_packed_bytes() +
			self.k * POLYT0_PACKEDBYTES
	}

	pub const fn signature_bytes(&self) -> usize {
		CTILDEBYTES + self.l * self.poly_z_packed_bytes() + self.omega + self.k
	}
}

impl fmt::Display for ParameterSet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let str = match self {
			ParameterSet::Dilithium2 => "Dilithium2",
			ParameterSet::Dilithium3 => "Dilithium3",
			ParameterSet::Dilithium5 => "Dilithium5",
		};
		write!(f, "{str}")
	}
}

impl TryFrom<u8> for ParameterSet {
	type Error = Error;

	fn try_from(level: u8) -> Result<Self, Self::Error> {
		match level {
			2 => Ok(ParameterSet::Dilithium2),
			3 => Ok(ParameterSet::Dilithium3),
			5 => Ok(ParameterSet::Dilithium5),
			_ => Err(Error::UnknownParameterSet),
		}
	}
}

impl FromStr for ParameterSet {
	type Err = Error;

	/// Accepts `"Dilithium3"`, `"dilithium3"`, `"DILITHIUM3"` or the bare level `"3"`.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let s = s.trim();
		let level = if s.len() == "dilithium".len() + 1 &&
			s.is_char_boundary("dilithium".len()) &&
			s[.."dilithium".len()].eq_ignore_ascii_case("dilithium")
		{
			&s["dilithium".len()..]
		} else {
			s
		};
		let level: u8 = level.parse().map_err(|_| Error::UnknownParameterSet)?;
		ParameterSet::try_from(level)
	}
}
