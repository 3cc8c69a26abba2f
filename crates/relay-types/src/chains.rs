//! Chain-family resolution.
//!
//! Destination and origin chains fall into two structurally different
//! families: EVM-compatible chains (secp256k1 attestations over ABI-encoded
//! payloads) and Solana (ed25519 attestations over borsh-encoded payloads).
//! Two reserved chain ids identify the Solana mainnet and devnet deployments;
//! every other id is treated as an EVM chain. The family is resolved once at
//! the boundary and carried as a typed tag from there on.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Reserved chain id for Solana mainnet (big-endian ASCII `SOLANA\0\0`).
pub const SOLANA_CHAIN_ID: u64 = u64::from_be_bytes(*b"SOLANA\0\0");

/// Reserved chain id for Solana devnet (big-endian ASCII `SOLANADN`).
pub const SOLANA_DEV_CHAIN_ID: u64 = u64::from_be_bytes(*b"SOLANADN");

/// The chain family a numeric chain id belongs to.
///
/// Determines payload codec and signature scheme for any operation keyed by
/// a chain id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainFamily {
	/// Any EVM-compatible chain.
	Evm,
	/// Solana mainnet.
	SolanaMain,
	/// Solana devnet.
	SolanaDev,
}

impl ChainFamily {
	/// Resolves the family of a numeric chain id.
	///
	/// Ids outside the reserved Solana range are EVM chains; there is no
	/// heuristic beyond the two constants.
	pub fn of(chain_id: u64) -> Self {
		match chain_id {
			SOLANA_CHAIN_ID => ChainFamily::SolanaMain,
			SOLANA_DEV_CHAIN_ID => ChainFamily::SolanaDev,
			_ => ChainFamily::Evm,
		}
	}

	/// Returns true for either Solana deployment.
	pub fn is_solana(&self) -> bool {
		matches!(self, ChainFamily::SolanaMain | ChainFamily::SolanaDev)
	}

	/// Collapses the family into the two-way discovery partition.
	pub fn selector(&self) -> FamilySelector {
		if self.is_solana() {
			FamilySelector::Svm
		} else {
			FamilySelector::Evm
		}
	}
}

/// The two-way chain partition used by the discovery endpoints: receipts
/// bound for Solana (`svm`) versus everything else (`evm`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FamilySelector {
	Evm,
	Svm,
}

impl FamilySelector {
	/// Whether a destination chain id falls into this partition.
	pub fn matches(&self, chain_to: u64) -> bool {
		ChainFamily::of(chain_to).selector() == *self
	}
}

impl fmt::Display for FamilySelector {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			FamilySelector::Evm => write!(f, "evm"),
			FamilySelector::Svm => write!(f, "svm"),
		}
	}
}

impl std::str::FromStr for FamilySelector {
	type Err = UnsupportedChainError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"evm" => Ok(FamilySelector::Evm),
			"svm" => Ok(FamilySelector::Svm),
			other => Err(UnsupportedChainError::UnknownFamily(other.to_string())),
		}
	}
}

/// Errors raised when a chain id or family tag cannot be resolved.
#[derive(Debug, Error)]
pub enum UnsupportedChainError {
	/// A chain id that maps to no configured network.
	#[error("unsupported chain id: {0}")]
	UnknownChain(u64),
	/// A family tag other than `evm` or `svm`.
	#[error("unknown chain family: {0}")]
	UnknownFamily(String),
}
