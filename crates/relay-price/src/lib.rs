//! Token price feeds and bridge fee computation.
//!
//! Prices arrive from an upstream ticker feed and are held in a TTL cache
//! that only ever replaces its contents wholesale: a refresh either swaps in
//! a complete new snapshot or leaves the previous one serving. Fee quoting
//! sits on top of the cache and converts a configured USD fee into token
//! units at the cached price.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::warn;

pub mod fees;

/// Re-export implementations
pub mod implementations {
	pub mod http;
	pub mod mock;
}

/// Errors that can occur during price feed operations.
#[derive(Debug, Error)]
pub enum PriceError {
	/// No price is known for the requested symbol.
	#[error("price unavailable for {0}")]
	Unavailable(String),
	/// The upstream feed failed and no snapshot exists to fall back on.
	#[error("upstream price feed unavailable: {0}")]
	Upstream(String),
	/// The feed configuration is invalid.
	#[error("price feed configuration error: {0}")]
	Configuration(String),
}

/// Clock abstraction so cache expiry is testable without real time.
pub trait Clock: Send + Sync {
	/// Milliseconds since the Unix epoch.
	fn now_millis(&self) -> u64;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
	fn now_millis(&self) -> u64 {
		std::time::SystemTime::now()
			.duration_since(std::time::UNIX_EPOCH)
			.map(|d| d.as_millis() as u64)
			.unwrap_or(0)
	}
}

/// Trait defining the interface for price source implementations.
///
/// A source returns one complete snapshot per fetch, keyed by upstream pair
/// symbol (for example `ETHUSDT`). Partial results are not a thing: a fetch
/// either yields the whole map or an error.
#[async_trait]
pub trait PriceSource: Send + Sync {
	/// Fetches a full price snapshot in USD per pair symbol.
	async fn fetch_all(&self) -> Result<HashMap<String, Decimal>, PriceError>;
}

struct Snapshot {
	prices: HashMap<String, Decimal>,
	fetched_at_millis: u64,
}

/// TTL cache over a price source.
///
/// All symbols share one expiry: when the snapshot ages past the TTL the
/// next lookup refreshes everything at once, so two symbols read in the same
/// window always come from the same upstream fetch. If a refresh fails and a
/// previous snapshot exists, the stale snapshot keeps serving.
pub struct PriceCache {
	source: Arc<dyn PriceSource>,
	clock: Arc<dyn Clock>,
	ttl: Duration,
	snapshot: RwLock<Option<Snapshot>>,
}

impl PriceCache {
	pub fn new(source: Arc<dyn PriceSource>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
		Self {
			source,
			clock,
			ttl,
			snapshot: RwLock::new(None),
		}
	}

	/// Returns the cached USD price for a pair symbol, refreshing the whole
	/// snapshot first if it is missing or expired.
	pub async fn get(&self, symbol: &str) -> Result<Decimal, PriceError> {
		{
			let guard = self.snapshot.read().await;
			if let Some(snapshot) = guard.as_ref() {
				if !self.is_expired(snapshot) {
					return lookup(&snapshot.prices, symbol);
				}
			}
		}

		let mut guard = self.snapshot.write().await;
		// another task may have refreshed while we waited for the lock
		if let Some(snapshot) = guard.as_ref() {
			if !self.is_expired(snapshot) {
				return lookup(&snapshot.prices, symbol);
			}
		}

		match self.source.fetch_all().await {
			Ok(prices) => {
				*guard = Some(Snapshot {
					prices,
					fetched_at_millis: self.clock.now_millis(),
				});
			}
			Err(e) => match guard.as_ref() {
				Some(_) => {
					warn!(error = %e, "price refresh failed, serving stale snapshot");
				}
				None => return Err(e),
			},
		}

		match guard.as_ref() {
			Some(snapshot) => lookup(&snapshot.prices, symbol),
			None => Err(PriceError::Unavailable(symbol.to_string())),
		}
	}

	fn is_expired(&self, snapshot: &Snapshot) -> bool {
		let age = self
			.clock
			.now_millis()
			.saturating_sub(snapshot.fetched_at_millis);
		age >= self.ttl.as_millis() as u64
	}
}

fn lookup(prices: &HashMap<String, Decimal>, symbol: &str) -> Result<Decimal, PriceError> {
	prices
		.get(symbol)
		.copied()
		.ok_or_else(|| PriceError::Unavailable(symbol.to_string()))
}
