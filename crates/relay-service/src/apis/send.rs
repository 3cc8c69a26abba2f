//! Send-authorization endpoint.
//!
//! Before a user calls the bridge's `send`, the backend quotes the fee and
//! signs the resulting transfer intent so the contract can check the fee was
//! quoted by this backend. The payload layout follows the origin network's
//! family: ABI bytes for EVM origins, borsh for Solana origins.

use std::sync::Arc;

use alloy_primitives::{Bytes, U256};
use serde::{Deserialize, Serialize};

use relay_price::{fees::FeeCalculator, Clock};
use relay_signer::SignatureEngine;
use relay_types::{
	parse_cross_chain_address, without_0x_prefix, ApiError, ChainFamily, SendSignatureQuery,
};

/// Response of `GET /send-signature`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendSignatureResponse {
	pub fee_amount: String,
	pub amount_to_send: String,
	pub timestamp: u64,
	/// Encoded payload bytes the caller passes to the bridge contract,
	/// 0x-hex. ABI bytes for EVM origins, borsh for Solana origins.
	pub send_payload: String,
	pub signer: String,
	pub signature: String,
}

/// Quotes fees and signs send payloads.
pub struct SendSignatureService {
	engine: Arc<SignatureEngine>,
	fees: Arc<FeeCalculator>,
	clock: Arc<dyn Clock>,
}

impl SendSignatureService {
	pub fn new(
		engine: Arc<SignatureEngine>,
		fees: Arc<FeeCalculator>,
		clock: Arc<dyn Clock>,
	) -> Self {
		Self {
			engine,
			fees,
			clock,
		}
	}

	pub async fn sign_send(
		&self,
		query: &SendSignatureQuery,
	) -> Result<SendSignatureResponse, ApiError> {
		let amount = parse_amount(&query.amount)?;
		let fees = self
			.fees
			.quote(
				query.network_from,
				query.network_to,
				&query.token_address,
				amount,
				query.is_max_amount,
			)
			.await
			.map_err(|e| ApiError::BadRequest(e.to_string()))?;

		let flags = match query.flags.as_deref() {
			Some(raw) => parse_amount(raw)?,
			None => U256::ZERO,
		};
		let flag_data = match query.flag_data.as_deref() {
			Some(raw) => hex::decode(without_0x_prefix(raw))
				.map_err(|_| ApiError::BadRequest("flagData is not valid hex".to_string()))?,
			None => Vec::new(),
		};
		let timestamp = self.clock.now_millis() / 1000;

		let family = ChainFamily::of(query.network_from);
		let (send_payload, signature) = if family.is_solana() {
			self.sign_svm(query, &fees, flags, flag_data, timestamp)?
		} else {
			self.sign_evm(query, &fees, flags, flag_data, timestamp)?
		};

		Ok(SendSignatureResponse {
			fee_amount: fees.fee_amount.to_string(),
			amount_to_send: fees.amount_to_send.to_string(),
			timestamp,
			send_payload,
			signer: self.engine.keys().identity_for(family),
			signature,
		})
	}

	fn sign_evm(
		&self,
		query: &SendSignatureQuery,
		fees: &relay_price::fees::Fees,
		flags: U256,
		flag_data: Vec<u8>,
		timestamp: u64,
	) -> Result<(String, String), ApiError> {
		let payload = relay_codec::evm::SendPayload {
			destChainId: U256::from(query.network_to),
			tokenAddress: parse_address(&query.token_address)?,
			externalTokenAddress: parse_address(&query.external_token_address)?,
			amountToSend: fees.amount_to_send,
			feeAmount: fees.fee_amount,
			timestamp: U256::from(timestamp),
			flags,
			flagData: Bytes::from(flag_data),
		};
		let bytes = relay_codec::evm::send_payload_bytes(&payload);
		let signature = self
			.engine
			.sign_send_evm(&payload)
			.map_err(|e| ApiError::BadRequest(e.to_string()))?;
		Ok((format!("0x{}", hex::encode(bytes)), signature))
	}

	fn sign_svm(
		&self,
		query: &SendSignatureQuery,
		fees: &relay_price::fees::Fees,
		flags: U256,
		flag_data: Vec<u8>,
		timestamp: u64,
	) -> Result<(String, String), ApiError> {
		let token_address_from = parse_address(&query.token_address)?.0;
		let external = parse_address(&query.external_token_address)?;
		let token_address_to =
			relay_codec::svm::evm_slot_from_bytes32(&external.0, "external_token_address")
				.map_err(|e| ApiError::BadRequest(e.to_string()))?;

		let payload = relay_codec::svm::SendPayload {
			token_address_from,
			token_address_to,
			amount_to_send: narrow_u64(fees.amount_to_send, "amountToSend")?,
			fee_amount: narrow_u64(fees.fee_amount, "feeAmount")?,
			chain_from: query.network_from,
			timestamp,
			flags: flags.to_be_bytes::<32>(),
			flag_data,
		};
		let bytes = relay_codec::svm::send_payload_bytes(&payload)
			.map_err(|e| ApiError::BadRequest(e.to_string()))?;
		let signature = self
			.engine
			.sign_send_svm(&payload)
			.map_err(|e| ApiError::BadRequest(e.to_string()))?;
		Ok((format!("0x{}", hex::encode(bytes)), signature))
	}
}

fn parse_amount(raw: &str) -> Result<U256, ApiError> {
	U256::from_str_radix(raw, 10)
		.map_err(|_| ApiError::BadRequest(format!("invalid decimal amount '{}'", raw)))
}

fn parse_address(raw: &str) -> Result<alloy_primitives::B256, ApiError> {
	parse_cross_chain_address(raw)
		.ok_or_else(|| ApiError::BadRequest(format!("invalid address '{}'", raw)))
}

fn narrow_u64(value: U256, field: &str) -> Result<u64, ApiError> {
	u64::try_from(value)
		.map_err(|_| ApiError::BadRequest(format!("{} does not fit 64 bits", field)))
}
