//! Receipt and attestation record types.
//!
//! A receipt is an immutable record of a cross-chain transfer intent,
//! created by the chain indexers. The relay never mutates a receipt; only
//! the `claimed` flag changes, and that is set externally once the
//! destination contract consumes the signature set.

use alloy_primitives::{B256, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Flag bit 0: unwrap the wrapped native token on receive.
pub const FLAG_SHOULD_UNWRAP: u64 = 1;

/// Composite receipt key: `(chain_from, chain_to, event_id)`.
///
/// `event_id` is monotonic per chain pair, so the tuple is globally unique.
/// The canonical string form `"{chainFrom}-{chainTo}-{eventId}"` exists only
/// for external interfaces (URLs, JSON); in memory the structured tuple is
/// the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReceiptId {
	pub chain_from: u64,
	pub chain_to: u64,
	pub event_id: u64,
}

impl ReceiptId {
	pub fn new(chain_from: u64, chain_to: u64, event_id: u64) -> Self {
		Self {
			chain_from,
			chain_to,
			event_id,
		}
	}
}

impl fmt::Display for ReceiptId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}-{}-{}", self.chain_from, self.chain_to, self.event_id)
	}
}

/// Error parsing a canonical receipt id string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid receipt id '{0}': expected 'chainFrom-chainTo-eventId'")]
pub struct ReceiptIdParseError(pub String);

impl FromStr for ReceiptId {
	type Err = ReceiptIdParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let mut parts = s.split('-');
		let parse = |part: Option<&str>| -> Result<u64, ReceiptIdParseError> {
			part.and_then(|p| p.parse::<u64>().ok())
				.ok_or_else(|| ReceiptIdParseError(s.to_string()))
		};
		let chain_from = parse(parts.next())?;
		let chain_to = parse(parts.next())?;
		let event_id = parse(parts.next())?;
		if parts.next().is_some() {
			return Err(ReceiptIdParseError(s.to_string()));
		}
		Ok(ReceiptId::new(chain_from, chain_to, event_id))
	}
}

impl Serialize for ReceiptId {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.to_string())
	}
}

impl<'de> Deserialize<'de> for ReceiptId {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(serde::de::Error::custom)
	}
}

/// A cross-chain transfer receipt.
///
/// Addresses are stored in the canonical 32-byte cross-chain form: Solana
/// addresses natively, EVM addresses left-padded with zeros. Amounts are
/// 256-bit; `flags` is a bitfield (bit 0 = unwrap native on receive) and
/// `data` carries opaque auxiliary bytes such as the encoded claim nonce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
	pub receipt_id: ReceiptId,
	pub from: B256,
	pub to: B256,
	pub token_address_from: B256,
	pub token_address_to: B256,
	pub amount_from: U256,
	pub amount_to: U256,
	pub chain_from: u64,
	pub chain_to: u64,
	pub event_id: u64,
	pub flags: U256,
	pub data: Bytes,
	pub timestamp: u64,
	pub claimed: bool,
}

impl Receipt {
	/// The structured identity of this receipt.
	pub fn id(&self) -> ReceiptId {
		self.receipt_id
	}
}

/// Per-chain indexer metadata joined onto a receipt.
///
/// All fields are optional: the joining view may not have indexed the
/// originating transaction yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptMeta {
	pub block_hash: Option<String>,
	pub block_number: Option<u64>,
	pub timestamp: Option<u64>,
	pub transaction_hash: Option<String>,
	pub transaction_index: Option<u64>,
}

/// A receipt joined with its indexer metadata, as returned by the
/// unsigned-receipt discovery endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptWithMeta {
	#[serde(rename = "receipts")]
	pub receipt: Receipt,
	#[serde(rename = "receiptsMeta")]
	pub meta: Option<ReceiptMeta>,
}

/// A persisted attestation: one signer's authorization for one receipt.
///
/// `signed_by` is the cryptographically verified signer identity (a
/// checksummed EVM address or a base58 Solana pubkey, depending on the
/// destination chain), never the caller-supplied value. At most one record
/// exists per `(receipt_id, signed_by)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRecord {
	pub receipt_id: ReceiptId,
	pub signed_by: String,
	pub signature: String,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn receipt_id_round_trips_through_canonical_form() {
		let id = ReceiptId::new(1, 22040, 7);
		assert_eq!(id.to_string(), "1-22040-7");
		assert_eq!("1-22040-7".parse::<ReceiptId>().unwrap(), id);
	}

	#[test]
	fn receipt_id_rejects_malformed_strings() {
		assert!("1-2".parse::<ReceiptId>().is_err());
		assert!("1-2-3-4".parse::<ReceiptId>().is_err());
		assert!("a-b-c".parse::<ReceiptId>().is_err());
		assert!("".parse::<ReceiptId>().is_err());
	}

	#[test]
	fn receipt_id_serializes_as_string() {
		let id = ReceiptId::new(5, 6, 42);
		let json = serde_json::to_string(&id).unwrap();
		assert_eq!(json, "\"5-6-42\"");
		let back: ReceiptId = serde_json::from_str(&json).unwrap();
		assert_eq!(back, id);
	}
}
