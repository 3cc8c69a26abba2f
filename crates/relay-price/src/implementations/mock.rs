//! Fixed-price source for tests and local development.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::{PriceError, PriceSource};

/// Price source returning a fixed snapshot on every fetch.
pub struct MockPriceSource {
	prices: HashMap<String, Decimal>,
}

impl MockPriceSource {
	pub fn new(pairs: &[(&str, &str)]) -> Self {
		let prices = pairs
			.iter()
			.filter_map(|(symbol, price)| {
				price.parse::<Decimal>().ok().map(|p| (symbol.to_string(), p))
			})
			.collect();
		Self { prices }
	}
}

#[async_trait]
impl PriceSource for MockPriceSource {
	async fn fetch_all(&self) -> Result<HashMap<String, Decimal>, PriceError> {
		Ok(self.prices.clone())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn returns_the_configured_snapshot() {
		let source = MockPriceSource::new(&[("ETHUSDT", "2000"), ("AMBUSDT", "0.01")]);
		let snapshot = source.fetch_all().await.unwrap();
		assert_eq!(snapshot.len(), 2);
		assert_eq!(snapshot["ETHUSDT"], Decimal::from(2000));
	}
}
