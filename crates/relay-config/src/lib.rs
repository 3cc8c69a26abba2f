//! Configuration for the bridge relay system.
//!
//! Loads the TOML configuration file covering the relay loop, the networks
//! and their tokens, the fee schedule, the price feed, and the HTTP API
//! server, and validates the cross-section constraints the type system
//! cannot express.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use relay_types::{networks::deserialize_networks, FeePolicy, NetworksConfig, SecretString};

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the relay.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Relay loop and key configuration.
	pub relay: RelayConfig,
	/// Network and token configurations, keyed by chain id.
	#[serde(deserialize_with = "deserialize_networks")]
	pub networks: NetworksConfig,
	/// Bridge fee schedule.
	pub fees: FeePolicy,
	/// Price feed configuration.
	pub price: PriceConfig,
	/// HTTP API server configuration.
	pub api: Option<ApiConfig>,
}

/// Configuration for the relay signing loop.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayConfig {
	/// Base URL of the backend the relay polls and submits to.
	#[serde(default = "default_backend_url")]
	pub backend_url: String,
	/// Polling interval in milliseconds. Clamped to at least 1000.
	#[serde(default = "default_polling_interval_ms")]
	pub polling_interval_ms: u64,
	/// Whether the signing loop runs at all.
	#[serde(default = "default_enabled")]
	pub enabled: bool,
	/// Hex-encoded secp256k1 private key for EVM attestations.
	pub evm_private_key: SecretString,
	/// Hex-encoded ed25519 seed for Solana attestations.
	pub svm_secret_key: SecretString,
	/// Refuse signature submissions when validator membership cannot be
	/// checked, instead of skipping the check with a warning.
	#[serde(default)]
	pub require_validator_check: bool,
}

fn default_backend_url() -> String {
	"http://localhost:3000".to_string()
}

fn default_polling_interval_ms() -> u64 {
	10_000
}

fn default_enabled() -> bool {
	true
}

impl RelayConfig {
	/// Polling interval with the 1-second floor applied.
	pub fn polling_interval(&self) -> std::time::Duration {
		std::time::Duration::from_millis(self.polling_interval_ms.max(1000))
	}
}

/// Configuration for the price feed.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PriceConfig {
	/// Snapshot time-to-live in seconds.
	#[serde(default = "default_price_ttl_secs")]
	pub ttl_secs: u64,
	/// Endpoint returning the full pair-symbol ticker list.
	pub ticker_url: String,
	/// Optional bespoke endpoint for a native coin absent from the ticker.
	#[serde(default)]
	pub native_price_url: Option<String>,
	/// Pair-symbol prefix the native price is stored under.
	#[serde(default)]
	pub native_symbol: Option<String>,
}

fn default_price_ttl_secs() -> u64 {
	60
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	#[serde(default = "default_enabled")]
	pub enabled: bool,
	#[serde(default = "default_api_host")]
	pub host: String,
	#[serde(default = "default_api_port")]
	pub port: u16,
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	3000
}

impl Config {
	/// Loads and validates configuration from a TOML file.
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path)?;
		Self::from_toml_str(&content)
	}

	/// Parses and validates configuration from a TOML string.
	pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
		let config: Config = toml::from_str(content)?;
		config.validate()?;
		Ok(config)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.relay.enabled {
			if self.relay.evm_private_key.is_empty() {
				return Err(ConfigError::Validation(
					"relay.evm_private_key must be set".to_string(),
				));
			}
			if self.relay.svm_secret_key.is_empty() {
				return Err(ConfigError::Validation(
					"relay.svm_secret_key must be set".to_string(),
				));
			}
		}
		if self.networks.is_empty() {
			return Err(ConfigError::Validation(
				"at least one network must be configured".to_string(),
			));
		}
		for (chain_id, network) in &self.networks {
			if network.rpc_url.is_empty() {
				return Err(ConfigError::Validation(format!(
					"networks.{}.rpc_url must be set",
					chain_id
				)));
			}
		}
		if self.price.native_price_url.is_some() != self.price.native_symbol.is_some() {
			return Err(ConfigError::Validation(
				"price.native_price_url and price.native_symbol must be set together".to_string(),
			));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	const SAMPLE: &str = r#"
[relay]
backend_url = "http://localhost:3000"
polling_interval_ms = 10000
evm_private_key = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d"
svm_secret_key = "2222222222222222222222222222222222222222222222222222222222222222"

[networks.22040]
name = "amb"
rpc_url = "https://network.ambrosus-test.io"
bridge_address = "0xe0b52EC5cE3e124ab5306ea42463bE85aeb5eDDd"

[[networks.22040.tokens]]
address = "0x2Cf845b49e1c4E5D657fbBF36E97B7B5B7E7a24A"
symbol = "SAMB"
decimals = 18

[networks.6003100671677628416]
name = "sol"
rpc_url = "https://api.mainnet-beta.solana.com"
bridge_address = "ambrosKpZB54GXnBEKjCJZfGpEAJBQRvdN8S4K2hVcY"

[fees]
default_fee_usd = "1.0"

[fees.per_network_usd]
amb = "0.5"

[price]
ticker_url = "https://api.binance.com/api/v3/ticker/price"
native_price_url = "https://price.ambrosus.io/amb"
native_symbol = "AMB"

[api]
host = "0.0.0.0"
port = 3000
"#;

	#[test]
	fn sample_config_parses() {
		let config = Config::from_toml_str(SAMPLE).unwrap();
		assert_eq!(config.relay.backend_url, "http://localhost:3000");
		assert!(config.relay.enabled);
		assert!(!config.relay.require_validator_check);
		assert_eq!(config.networks.len(), 2);
		assert_eq!(config.networks[&22040].name, "amb");
		assert_eq!(config.networks[&22040].tokens[0].symbol, "SAMB");
		assert_eq!(config.price.ttl_secs, 60);
		assert_eq!(config.api.as_ref().unwrap().port, 3000);
	}

	#[test]
	fn polling_interval_has_a_floor() {
		let config = Config::from_toml_str(SAMPLE).unwrap();
		let mut relay = config.relay.clone();
		relay.polling_interval_ms = 50;
		assert_eq!(relay.polling_interval(), std::time::Duration::from_secs(1));
		assert_eq!(
			config.relay.polling_interval(),
			std::time::Duration::from_secs(10)
		);
	}

	#[test]
	fn missing_keys_fail_validation() {
		let broken = SAMPLE.replace(
			"evm_private_key = \"0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d\"",
			"evm_private_key = \"\"",
		);
		assert!(matches!(
			Config::from_toml_str(&broken),
			Err(ConfigError::Validation(_))
		));
	}

	#[test]
	fn native_price_settings_must_pair_up() {
		let broken = SAMPLE.replace("native_symbol = \"AMB\"\n", "");
		assert!(matches!(
			Config::from_toml_str(&broken),
			Err(ConfigError::Validation(_))
		));
	}

	#[test]
	fn loads_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(SAMPLE.as_bytes()).unwrap();
		let config = Config::from_file(file.path()).unwrap();
		assert_eq!(config.networks[&6003100671677628416].name, "sol");
	}
}
