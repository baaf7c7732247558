use crate::params::ParameterSet;

/// Malformed encoded key or signature bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
	#[error("expected {expected} bytes, got {actual}")]
	BadLength { expected: usize, actual: usize },
	#[error("packed coefficient out of range in {field}")]
	CoefficientOutOfRange { field: &'static str },
	#[error("malformed hint encoding")]
	MalformedHint,
	#[error("private key components are inconsistent")]
	InconsistentPrivateKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("format error: {0}")]
	Format(#[from] FormatError),
	#[error("parameter set mismatch: expected {expected}, found {found}")]
	ParameterMismatch { expected: ParameterSet, found: ParameterSet },
	#[error("invalid signature")]
	InvalidSignature,
	#[error("randomness source failed")]
	Randomness,
	#[error("unknown parameter set")]
	UnknownParameterSet,
}

/// Failures of the AES-256 CTR_DRBG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DrbgError {
	#[error("entropy input must be 48 bytes, got {0}")]
	InvalidEntropyLength(usize),
	#[error("personalization string must be 48 bytes, got {0}")]
	InvalidPersonalizationLength(usize),
	#[error("reseed required after {0} requests")]
	ReseedRequired(u64),
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloc::string::ToString;

	#[test]
	fn display_messages() {
		let err: Error = FormatError::BadLength { expected: 1312, actual: 1311 }.into();
		assert_eq!(err.to_string(), "format error: expected 1312 bytes, got 1311");
		let err = Error::ParameterMismatch {
			expected: ParameterSet::Dilithium2,
			found: ParameterSet::Dilithium5,
		};
		assert_eq!(
			err.to_string(),
			"parameter set mismatch: expected Dilithium2, found Dilithium5"
		);
		assert_eq!(
			FormatError::CoefficientOutOfRange { field: "s1" }.to_string(),
			"packed coefficient out of range in s1"
		);
		assert_eq!(DrbgError::ReseedRequired(2).to_string(), "reseed required after 2 requests");
	}
}
