//! EVM-bound payload encoding.
//!
//! The bridge contract verifies attestations against
//! `keccak256(abi.encode(payload))` wrapped in the EIP-191 personal-message
//! hash. Both hashing steps are mandatory; a signature over anything else is
//! rejected on chain.

use alloy_primitives::{keccak256, utils::eip191_hash_message, B256, U256};
use alloy_sol_types::{sol, SolValue};
use relay_types::Receipt;

sol! {
	/// Full receipt tuple as the bridge contract's `send` function returns
	/// it; the claim verifier hashes exactly this layout.
	#[derive(Debug, PartialEq, Eq)]
	struct ReceiptPayload {
		bytes32 from;
		bytes32 to;
		bytes32 tokenAddressFrom;
		bytes32 tokenAddressTo;
		uint256 amountFrom;
		uint256 amountTo;
		uint256 chainFrom;
		uint256 chainTo;
		uint256 eventId;
		uint256 flags;
		bytes data;
	}

	/// Transfer intent signed by the backend before the user calls `send`.
	#[derive(Debug, PartialEq, Eq)]
	struct SendPayload {
		uint256 destChainId;
		bytes32 tokenAddress;
		bytes32 externalTokenAddress;
		uint256 amountToSend;
		uint256 feeAmount;
		uint256 timestamp;
		uint256 flags;
		bytes flagData;
	}
}

impl From<&Receipt> for ReceiptPayload {
	fn from(receipt: &Receipt) -> Self {
		ReceiptPayload {
			from: receipt.from,
			to: receipt.to,
			tokenAddressFrom: receipt.token_address_from,
			tokenAddressTo: receipt.token_address_to,
			amountFrom: receipt.amount_from,
			amountTo: receipt.amount_to,
			chainFrom: U256::from(receipt.chain_from),
			chainTo: U256::from(receipt.chain_to),
			eventId: U256::from(receipt.event_id),
			flags: receipt.flags,
			data: receipt.data.clone().into(),
		}
	}
}

/// ABI-encodes the receipt tuple.
pub fn receipt_payload_bytes(receipt: &Receipt) -> Vec<u8> {
	ReceiptPayload::from(receipt).abi_encode()
}

/// The 32-byte message an EVM attestation is made over:
/// `eip191(keccak256(abi.encode(receipt)))`.
pub fn receipt_digest(receipt: &Receipt) -> B256 {
	let payload_hash = keccak256(receipt_payload_bytes(receipt));
	eip191_hash_message(payload_hash)
}

/// ABI-encodes a send payload.
pub fn send_payload_bytes(payload: &SendPayload) -> Vec<u8> {
	payload.abi_encode()
}

/// The 32-byte message an EVM send attestation is made over.
pub fn send_digest(payload: &SendPayload) -> B256 {
	let payload_hash = keccak256(send_payload_bytes(payload));
	eip191_hash_message(payload_hash)
}
