//! Solana origin-chain validation.
//!
//! Confirms a Solana-origin receipt's transaction via `getTransaction` on
//! the configured RPC node: the transaction must exist at confirmed
//! commitment, carry no execution error, and sit in the slot the indexer
//! recorded.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

use relay_types::{ChainFamily, NetworksConfig, ReceiptWithMeta};

use crate::{ReceiptValidator, RelayError};

#[derive(Debug, Deserialize)]
struct RpcResponse {
	result: Option<TransactionResult>,
}

#[derive(Debug, Deserialize)]
struct TransactionResult {
	slot: u64,
	meta: Option<TransactionMeta>,
}

#[derive(Debug, Deserialize)]
struct TransactionMeta {
	err: Option<serde_json::Value>,
}

/// Validator speaking JSON-RPC to the configured Solana nodes.
pub struct SolanaReceiptValidator {
	client: reqwest::Client,
	rpc_urls: HashMap<u64, String>,
}

impl SolanaReceiptValidator {
	pub fn new(networks: &NetworksConfig) -> Result<Self, RelayError> {
		let client = reqwest::Client::builder()
			.timeout(Duration::from_secs(30))
			.build()
			.map_err(|e| RelayError::Validation(e.to_string()))?;
		let rpc_urls = networks
			.iter()
			.filter(|(chain_id, _)| ChainFamily::of(**chain_id).is_solana())
			.map(|(chain_id, network)| (*chain_id, network.rpc_url.clone()))
			.collect();
		Ok(Self { client, rpc_urls })
	}

	async fn get_transaction(
		&self,
		rpc_url: &str,
		signature: &str,
	) -> Result<Option<TransactionResult>, RelayError> {
		let body = json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": "getTransaction",
			"params": [
				signature,
				{ "commitment": "confirmed", "maxSupportedTransactionVersion": 0 }
			]
		});
		let response: RpcResponse = self
			.client
			.post(rpc_url)
			.json(&body)
			.send()
			.await
			.map_err(|e| RelayError::Validation(format!("rpc error: {}", e)))?
			.error_for_status()
			.map_err(|e| RelayError::Validation(format!("rpc error: {}", e)))?
			.json()
			.await
			.map_err(|e| RelayError::Validation(format!("rpc error: {}", e)))?;
		Ok(response.result)
	}
}

#[async_trait]
impl ReceiptValidator for SolanaReceiptValidator {
	async fn validate(&self, item: &ReceiptWithMeta) -> Result<(), RelayError> {
		let chain_id = item.receipt.chain_from;
		let rpc_url = self
			.rpc_urls
			.get(&chain_id)
			.ok_or(RelayError::NoEndpoint(chain_id))?;

		let meta = item
			.meta
			.as_ref()
			.ok_or_else(|| RelayError::Validation("receipt has no indexer metadata".into()))?;
		let signature = meta
			.transaction_hash
			.as_deref()
			.ok_or_else(|| RelayError::Validation("receipt has no transaction signature".into()))?;

		let transaction = self
			.get_transaction(rpc_url, signature)
			.await?
			.ok_or_else(|| {
				RelayError::Validation(format!("transaction {} not found on chain", signature))
			})?;

		if let Some(err) = transaction.meta.and_then(|m| m.err) {
			return Err(RelayError::Validation(format!(
				"transaction {} failed: {}",
				signature, err
			)));
		}
		// the indexer records the slot in the block-number column
		if let Some(expected) = meta.block_number {
			if expected != transaction.slot {
				return Err(RelayError::Validation(format!(
					"transaction {} moved: indexed in slot {}, found in {}",
					signature, expected, transaction.slot
				)));
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rpc_response_shapes_parse() {
		let found: RpcResponse = serde_json::from_str(
			r#"{"jsonrpc":"2.0","id":1,"result":{"slot":312345678,"meta":{"err":null}}}"#,
		)
		.unwrap();
		let result = found.result.unwrap();
		assert_eq!(result.slot, 312345678);
		assert!(result.meta.unwrap().err.is_none());

		let missing: RpcResponse =
			serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":null}"#).unwrap();
		assert!(missing.result.is_none());

		let failed: RpcResponse = serde_json::from_str(
			r#"{"jsonrpc":"2.0","id":1,"result":{"slot":1,"meta":{"err":{"InstructionError":[0,"Custom"]}}}}"#,
		)
		.unwrap();
		assert!(failed.result.unwrap().meta.unwrap().err.is_some());
	}
}
