//! Bridge fee quoting.
//!
//! A transfer pays a flat USD fee for each of its two endpoint networks.
//! The quote converts that USD sum into units of the token being sent,
//! at the cached market price. Wrapped-asset symbols are folded onto the
//! underlying asset before the price lookup, since tickers list the
//! underlying.

use alloy_primitives::U256;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;

use relay_types::{FeePolicy, NetworksConfig};

use crate::{PriceCache, PriceError};

/// Errors that can occur while quoting a fee.
#[derive(Debug, Error)]
pub enum FeeError {
	/// No network is configured for the given chain id.
	#[error("unsupported chain id: {0}")]
	UnsupportedChain(u64),
	/// The token is not configured on the origin network.
	#[error("unknown token {address} on chain {chain_id}")]
	UnknownToken { chain_id: u64, address: String },
	/// The cached price cannot be used for conversion.
	#[error("unusable price for {0}")]
	UnusablePrice(String),
	/// The send amount does not cover the fee.
	#[error("amount does not cover the bridge fee")]
	AmountTooSmall,
	#[error(transparent)]
	Price(#[from] PriceError),
}

/// A quoted fee, denominated in the sent token's smallest units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fees {
	pub fee_amount: U256,
	pub amount_to_send: U256,
}

/// Folds wrapped-asset symbols onto the underlying asset's ticker symbol.
pub fn canonical_symbol(symbol: &str) -> &str {
	match symbol {
		"SAMB" => "AMB",
		"WBNB" => "BNB",
		"WETH" => "ETH",
		"wSOL" => "SOL",
		other => other,
	}
}

/// Quotes bridge fees from the fee schedule and the price cache.
pub struct FeeCalculator {
	cache: Arc<PriceCache>,
	networks: NetworksConfig,
	policy: FeePolicy,
}

impl FeeCalculator {
	pub fn new(cache: Arc<PriceCache>, networks: NetworksConfig, policy: FeePolicy) -> Self {
		Self {
			cache,
			networks,
			policy,
		}
	}

	/// Quotes the fee for sending `amount` of `token_address` from
	/// `chain_from` to `chain_to`.
	///
	/// With `is_max_amount` the caller is sending their whole balance, so
	/// the fee is carved out of `amount`; otherwise the fee is charged on
	/// top and `amount` passes through unchanged.
	pub async fn quote(
		&self,
		chain_from: u64,
		chain_to: u64,
		token_address: &str,
		amount: U256,
		is_max_amount: bool,
	) -> Result<Fees, FeeError> {
		let from = self
			.networks
			.get(&chain_from)
			.ok_or(FeeError::UnsupportedChain(chain_from))?;
		let to = self
			.networks
			.get(&chain_to)
			.ok_or(FeeError::UnsupportedChain(chain_to))?;
		let token = from
			.token_by_address(token_address)
			.ok_or_else(|| FeeError::UnknownToken {
				chain_id: chain_from,
				address: token_address.to_string(),
			})?;

		let pair = format!("{}USDT", canonical_symbol(&token.symbol));
		let price_usd = self.cache.get(&pair).await?;
		if price_usd <= Decimal::ZERO {
			return Err(FeeError::UnusablePrice(pair));
		}

		let fee_usd =
			self.policy.network_fee_usd(&from.name) + self.policy.network_fee_usd(&to.name);
		let fee_amount = usd_to_token_units(fee_usd, price_usd, token.decimals)
			.ok_or(FeeError::UnusablePrice(pair))?;

		let amount_to_send = if is_max_amount {
			if amount <= fee_amount {
				return Err(FeeError::AmountTooSmall);
			}
			amount - fee_amount
		} else {
			amount
		};

		Ok(Fees {
			fee_amount,
			amount_to_send,
		})
	}
}

/// Converts a USD amount into token units at the given USD price, rounding
/// the fee up so it never undercharges.
fn usd_to_token_units(usd: Decimal, price_usd: Decimal, decimals: u8) -> Option<U256> {
	let tokens = usd.checked_div(price_usd)?;
	let scale = 10i128
		.checked_pow(decimals as u32)
		.and_then(|s| Decimal::try_from(s).ok())?;
	let units = tokens.checked_mul(scale)?.ceil();
	units.to_u128().map(U256::from)
}
