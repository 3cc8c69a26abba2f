//! Canonical payload encodings for bridge attestations.
//!
//! Every attestation binds a signature to the exact byte sequence the
//! destination chain's verifier will reconstruct. Two independent encodings
//! exist per direction because the two chain families expect different byte
//! layouts: EVM verifiers hash an ABI-encoded tuple, Solana programs
//! deserialize a fixed-schema borsh struct. The codec to use is driven
//! strictly by the relevant chain id's family, never by heuristics, and
//! encoding is pure: the same logical payload always yields the same bytes.

use thiserror::Error;

pub mod evm;
pub mod svm;

/// Errors produced while encoding a payload.
#[derive(Debug, Error)]
pub enum CodecError {
	/// A numeric field does not fit its fixed wire width.
	#[error("field {field} does not fit {width} bits")]
	Overflow {
		field: &'static str,
		width: u32,
	},
	/// An address is not the byte length its slot requires.
	#[error("address field {field} must be {expected} bytes, got {got}")]
	AddressLength {
		field: &'static str,
		expected: usize,
		got: usize,
	},
	/// Struct serialization failed.
	#[error("serialization failed: {0}")]
	Serialization(String),
}
