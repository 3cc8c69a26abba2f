//! Solana-bound payload encoding.
//!
//! The on-chain bridge program deserializes a fixed borsh schema, so every
//! numeric field is confined to the widths that schema declares. A receipt
//! whose values do not fit is unrepresentable on Solana and must be rejected
//! here rather than silently truncated.

use alloy_primitives::U256;
use borsh::{BorshDeserialize, BorshSerialize};
use relay_types::Receipt;

use crate::CodecError;

/// Transfer intent signed by the backend before the user submits a `send`
/// instruction to the Solana bridge program.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct SendPayload {
	pub token_address_from: [u8; 32],
	pub token_address_to: [u8; 20],
	pub amount_to_send: u64,
	pub fee_amount: u64,
	pub chain_from: u64,
	pub timestamp: u64,
	pub flags: [u8; 32],
	pub flag_data: Vec<u8>,
}

/// Claim payload the Solana bridge program verifies an ed25519 attestation
/// against. Field order is the program's schema; do not reorder.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct ReceivePayload {
	pub to: [u8; 32],
	pub token_address_to: [u8; 32],
	pub amount_to: u64,
	pub chain_to: u64,
	pub flags: [u8; 32],
	pub flag_data: Vec<u8>,
}

fn u256_to_u64(value: U256, field: &'static str) -> Result<u64, CodecError> {
	u64::try_from(value).map_err(|_| CodecError::Overflow { field, width: 64 })
}

/// Builds the claim payload for a Solana-bound receipt.
pub fn receive_payload(receipt: &Receipt) -> Result<ReceivePayload, CodecError> {
	Ok(ReceivePayload {
		to: receipt.to.0,
		token_address_to: receipt.token_address_to.0,
		amount_to: u256_to_u64(receipt.amount_to, "amount_to")?,
		chain_to: receipt.chain_to,
		flags: receipt.flags.to_be_bytes::<32>(),
		flag_data: receipt.data.to_vec(),
	})
}

/// Borsh-serializes the claim payload for a Solana-bound receipt. These are
/// the exact bytes the ed25519 attestation is made over.
pub fn receive_payload_bytes(receipt: &Receipt) -> Result<Vec<u8>, CodecError> {
	let payload = receive_payload(receipt)?;
	borsh::to_vec(&payload).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Borsh-serializes a send payload.
pub fn send_payload_bytes(payload: &SendPayload) -> Result<Vec<u8>, CodecError> {
	borsh::to_vec(payload).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Narrows a canonical 32-byte cross-chain address to the 20-byte EVM form
/// required by the send schema, checking the padding is actually zero.
pub fn evm_slot_from_bytes32(
	bytes: &[u8; 32],
	field: &'static str,
) -> Result<[u8; 20], CodecError> {
	if bytes[..12].iter().any(|b| *b != 0) {
		return Err(CodecError::AddressLength {
			field,
			expected: 20,
			got: 32,
		});
	}
	let mut out = [0u8; 20];
	out.copy_from_slice(&bytes[12..]);
	Ok(out)
}
