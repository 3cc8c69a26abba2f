//! HTTP ticker price source.
//!
//! Pulls the full pair-symbol ticker list from an exchange-style endpoint
//! and optionally merges one native-coin price from a bespoke endpoint that
//! is not listed on the exchange. Both calls must succeed for the snapshot
//! to count; a half-fetched snapshot is worse than a stale one.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::{PriceError, PriceSource};

/// Configuration for the HTTP ticker source.
#[derive(Debug, Clone, Deserialize)]
pub struct TickerSourceConfig {
	/// Endpoint returning the full `[{"symbol", "price"}]` ticker list.
	pub ticker_url: String,
	/// Optional endpoint returning `{"data": {"price_usd": ...}}` for a
	/// native coin the ticker list does not carry.
	#[serde(default)]
	pub native_price_url: Option<String>,
	/// Pair-symbol prefix the native price is stored under.
	#[serde(default)]
	pub native_symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TickerEntry {
	symbol: String,
	price: String,
}

#[derive(Debug, Deserialize)]
struct NativePriceResponse {
	data: NativePriceData,
}

#[derive(Debug, Deserialize)]
struct NativePriceData {
	price_usd: Decimal,
}

/// Price source backed by an HTTP ticker endpoint.
pub struct TickerPriceSource {
	client: reqwest::Client,
	config: TickerSourceConfig,
}

impl TickerPriceSource {
	pub fn new(config: TickerSourceConfig) -> Result<Self, PriceError> {
		if config.native_price_url.is_some() != config.native_symbol.is_some() {
			return Err(PriceError::Configuration(
				"native_price_url and native_symbol must be set together".to_string(),
			));
		}
		let client = reqwest::Client::builder()
			.timeout(Duration::from_secs(30))
			.build()
			.map_err(|e| PriceError::Configuration(e.to_string()))?;
		Ok(Self { client, config })
	}

	async fn fetch_tickers(&self) -> Result<HashMap<String, Decimal>, PriceError> {
		let entries: Vec<TickerEntry> = self
			.client
			.get(&self.config.ticker_url)
			.send()
			.await
			.map_err(|e| PriceError::Upstream(e.to_string()))?
			.error_for_status()
			.map_err(|e| PriceError::Upstream(e.to_string()))?
			.json()
			.await
			.map_err(|e| PriceError::Upstream(e.to_string()))?;

		let mut prices = HashMap::with_capacity(entries.len());
		for entry in entries {
			match entry.price.parse::<Decimal>() {
				Ok(price) => {
					prices.insert(entry.symbol, price);
				}
				Err(_) => {
					debug!(symbol = %entry.symbol, "skipping unparsable ticker price");
				}
			}
		}
		Ok(prices)
	}

	async fn fetch_native(&self, url: &str) -> Result<Decimal, PriceError> {
		let response: NativePriceResponse = self
			.client
			.get(url)
			.send()
			.await
			.map_err(|e| PriceError::Upstream(e.to_string()))?
			.error_for_status()
			.map_err(|e| PriceError::Upstream(e.to_string()))?
			.json()
			.await
			.map_err(|e| PriceError::Upstream(e.to_string()))?;
		Ok(response.data.price_usd)
	}
}

#[async_trait]
impl PriceSource for TickerPriceSource {
	async fn fetch_all(&self) -> Result<HashMap<String, Decimal>, PriceError> {
		let mut prices = self.fetch_tickers().await?;
		if let (Some(url), Some(symbol)) = (
			self.config.native_price_url.as_deref(),
			self.config.native_symbol.as_deref(),
		) {
			let native = self.fetch_native(url).await?;
			prices.insert(format!("{}USDT", symbol), native);
		}
		Ok(prices)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn native_settings_must_pair_up() {
		let config: TickerSourceConfig = serde_json::from_value(serde_json::json!({
			"ticker_url": "https://example.com/ticker",
			"native_symbol": "AMB"
		}))
		.unwrap();
		assert!(TickerPriceSource::new(config).is_err());
	}

	#[test]
	fn native_response_parses_numeric_price() {
		let parsed: NativePriceResponse =
			serde_json::from_str(r#"{"data": {"price_usd": 0.00734}}"#).unwrap();
		assert_eq!(
			parsed.data.price_usd,
			"0.00734".parse::<Decimal>().unwrap()
		);
	}
}
