//! Common types for the bridge relay system.
//!
//! This crate defines the domain types shared by every relay component:
//! receipts and their composite identifiers, attestation records, the
//! chain-family partition, network/token/fee configuration, and the HTTP
//! API types.

/// API request/response types and the HTTP error envelope.
pub mod api;
/// Chain-family resolution and the reserved Solana chain-id constants.
pub mod chains;
/// Network, token, and fee-policy configuration types.
pub mod networks;
/// Receipt, receipt metadata, and signature record types.
pub mod receipt;
/// Secure wrapper for private key material.
pub mod secret_string;
/// Hex and signature formatting helpers.
pub mod utils;

pub use api::{
	ApiError, FeesQuery, FeesResponse, ReceiptOrdering, ReceiptQuery, SendSignatureQuery,
	SubmitSignatureRequest, SubmitSignatureResponse,
};
pub use chains::{
	ChainFamily, FamilySelector, UnsupportedChainError, SOLANA_CHAIN_ID, SOLANA_DEV_CHAIN_ID,
};
pub use networks::{
	FeePolicy, NetworkConfig, NetworksConfig, TokenConfig, NATIVE_EVM_ADDRESS, NATIVE_SOL_MINT,
};
pub use receipt::{
	Receipt, ReceiptId, ReceiptIdParseError, ReceiptMeta, ReceiptWithMeta, SignatureRecord,
	FLAG_SHOULD_UNWRAP,
};
pub use secret_string::SecretString;
pub use utils::{
	evm_address_to_bytes32, normalize_signature_hex, parse_cross_chain_address, truncate_id,
	with_0x_prefix, without_0x_prefix, SignatureFormatError,
};
