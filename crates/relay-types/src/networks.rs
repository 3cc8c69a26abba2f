//! Network, token, and fee-policy configuration types.
//!
//! Maps numeric chain ids to the settings the relay needs per network:
//! a short name (used by the fee schedule), the RPC endpoint, the bridge
//! contract address, and the tokens known on that network.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use crate::utils::without_0x_prefix;

/// The wrapped-SOL mint, used as the native-asset token on Solana networks.
pub const NATIVE_SOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// The zero address, used as the native-asset token on EVM networks.
pub const NATIVE_EVM_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// A token known on a specific network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct TokenConfig {
	/// Chain-native address string (0x-hex on EVM, base58 on Solana).
	pub address: String,
	pub symbol: String,
	pub decimals: u8,
}

/// Configuration for a single network.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
	/// Short network name, e.g. `amb`, `eth`, `sol-dev`.
	pub name: String,
	/// HTTP RPC endpoint for this network.
	pub rpc_url: String,
	/// Bridge contract or program address on this network.
	pub bridge_address: Option<String>,
	#[serde(default)]
	pub tokens: Vec<TokenConfig>,
}

impl NetworkConfig {
	/// Looks up a token by its chain-native address.
	///
	/// EVM hex addresses compare case-insensitively and with or without the
	/// 0x prefix; base58 addresses compare exactly.
	pub fn token_by_address(&self, address: &str) -> Option<&TokenConfig> {
		let wanted = without_0x_prefix(address).to_ascii_lowercase();
		self.tokens.iter().find(|t| {
			t.address == address
				|| without_0x_prefix(&t.address).to_ascii_lowercase() == wanted
		})
	}
}

/// Networks configuration mapping chain ids to their settings.
pub type NetworksConfig = HashMap<u64, NetworkConfig>;

/// Deserializes a networks table keyed by stringified chain ids.
///
/// TOML tables cannot have numeric keys, so chain ids arrive as strings and
/// are parsed here into the u64 keys used everywhere else.
pub fn deserialize_networks<'de, D>(deserializer: D) -> Result<NetworksConfig, D::Error>
where
	D: Deserializer<'de>,
{
	let string_map: HashMap<String, NetworkConfig> = HashMap::deserialize(deserializer)?;
	let mut result = HashMap::new();
	for (key, value) in string_map {
		let chain_id = key
			.parse::<u64>()
			.map_err(|e| serde::de::Error::custom(format!("invalid chain id '{}': {}", key, e)))?;
		result.insert(chain_id, value);
	}
	Ok(result)
}

/// Bridge fee schedule: a flat USD amount per network, summed over the two
/// endpoints of a transfer. Pure configuration; nothing here is derived.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeePolicy {
	/// USD fee applied for networks without an explicit entry.
	pub default_fee_usd: rust_decimal::Decimal,
	/// Per-network USD fee overrides, keyed by network name.
	#[serde(default)]
	pub per_network_usd: HashMap<String, rust_decimal::Decimal>,
}

impl FeePolicy {
	/// The USD fee contribution of one network.
	pub fn network_fee_usd(&self, network_name: &str) -> rust_decimal::Decimal {
		self.per_network_usd
			.get(network_name)
			.copied()
			.unwrap_or(self.default_fee_usd)
	}
}
