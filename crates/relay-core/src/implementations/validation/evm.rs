//! EVM origin-chain validation.
//!
//! Confirms the transaction an EVM-origin receipt points at actually landed
//! on that chain, succeeded, and sits in the block the indexer recorded.
//! Anything less and the receipt is not signed.

use alloy_primitives::TxHash;
use alloy_provider::{Provider, RootProvider};
use alloy_transport_http::Http;
use async_trait::async_trait;
use std::collections::HashMap;

use relay_types::{ChainFamily, NetworksConfig, ReceiptWithMeta};

use crate::{ReceiptValidator, RelayError};

/// Validator backed by one RPC provider per configured EVM network.
pub struct EvmReceiptValidator {
	providers: HashMap<u64, RootProvider<Http<reqwest::Client>>>,
}

impl EvmReceiptValidator {
	/// Builds providers for every EVM network in the configuration.
	pub fn new(networks: &NetworksConfig) -> Result<Self, RelayError> {
		let mut providers = HashMap::new();
		for (chain_id, network) in networks {
			if ChainFamily::of(*chain_id).is_solana() {
				continue;
			}
			let url = network.rpc_url.parse().map_err(|e| {
				RelayError::Validation(format!(
					"invalid rpc url for chain {}: {}",
					chain_id, e
				))
			})?;
			providers.insert(*chain_id, RootProvider::new_http(url));
		}
		Ok(Self { providers })
	}
}

#[async_trait]
impl ReceiptValidator for EvmReceiptValidator {
	async fn validate(&self, item: &ReceiptWithMeta) -> Result<(), RelayError> {
		let chain_id = item.receipt.chain_from;
		let provider = self
			.providers
			.get(&chain_id)
			.ok_or(RelayError::NoEndpoint(chain_id))?;

		let meta = item
			.meta
			.as_ref()
			.ok_or_else(|| RelayError::Validation("receipt has no indexer metadata".into()))?;
		let tx_hash: TxHash = meta
			.transaction_hash
			.as_deref()
			.ok_or_else(|| RelayError::Validation("receipt has no transaction hash".into()))?
			.parse()
			.map_err(|e| RelayError::Validation(format!("bad transaction hash: {}", e)))?;

		let onchain = provider
			.get_transaction_receipt(tx_hash)
			.await
			.map_err(|e| RelayError::Validation(format!("rpc error: {}", e)))?
			.ok_or_else(|| {
				RelayError::Validation(format!("transaction {} not found on chain", tx_hash))
			})?;

		if !onchain.status() {
			return Err(RelayError::Validation(format!(
				"transaction {} reverted",
				tx_hash
			)));
		}
		if let (Some(expected), Some(actual)) = (meta.block_number, onchain.block_number) {
			if expected != actual {
				return Err(RelayError::Validation(format!(
					"transaction {} moved: indexed in block {}, found in {}",
					tx_hash, expected, actual
				)));
			}
		}
		Ok(())
	}
}
