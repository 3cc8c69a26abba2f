//! Main entry point for the bridge relay service.
//!
//! This binary runs the two halves of the relay system: the backend HTTP
//! API (receipt queries, signature submission, fee and send-authorization
//! quoting) and the signing loop that polls a backend, validates receipts
//! against their origin chains, and submits attestations. Either half can
//! be disabled in configuration.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use relay_config::Config;
use relay_core::engine::RelayEngine;
use relay_core::implementations::backend::http::HttpBackend;
use relay_core::implementations::validation::evm::EvmReceiptValidator;
use relay_core::implementations::validation::svm::SolanaReceiptValidator;
use relay_price::fees::FeeCalculator;
use relay_price::implementations::http::{TickerPriceSource, TickerSourceConfig};
use relay_price::{PriceCache, SystemClock};
use relay_signer::{RelayKeys, SignatureEngine, ValidatorGate};
use relay_store::implementations::memory::MemoryReceiptStore;
use relay_store::lifecycle::LifecycleManager;

mod apis;
mod server;

use apis::send::SendSignatureService;

/// Command-line arguments for the relay service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};
	let env_filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(args.log_level.clone()));
	fmt().with_env_filter(env_filter).with_target(true).init();

	let config = Config::from_file(&args.config)?;
	tracing::info!(networks = config.networks.len(), "loaded configuration");

	let keys = RelayKeys::from_secrets(
		&config.relay.evm_private_key,
		&config.relay.svm_secret_key,
	)?;
	tracing::info!(
		evm = %keys.evm_address(),
		svm = %keys.svm_pubkey_base58(),
		"relay identities"
	);
	let engine = Arc::new(SignatureEngine::new(
		keys,
		ValidatorGate::Unconfigured,
		config.relay.require_validator_check,
	));

	// backend state
	let store = Arc::new(MemoryReceiptStore::new());
	let lifecycle = Arc::new(LifecycleManager::new(store, engine.clone()));

	let price_source = Arc::new(TickerPriceSource::new(TickerSourceConfig {
		ticker_url: config.price.ticker_url.clone(),
		native_price_url: config.price.native_price_url.clone(),
		native_symbol: config.price.native_symbol.clone(),
	})?);
	let price_cache = Arc::new(PriceCache::new(
		price_source,
		Arc::new(SystemClock),
		std::time::Duration::from_secs(config.price.ttl_secs),
	));
	let fees = Arc::new(FeeCalculator::new(
		price_cache,
		config.networks.clone(),
		config.fees.clone(),
	));
	let send = Arc::new(SendSignatureService::new(
		engine.clone(),
		fees.clone(),
		Arc::new(SystemClock),
	));
	let state = server::AppState {
		lifecycle,
		fees,
		send,
	};

	// signing loop
	let relay = if config.relay.enabled {
		let backend = Arc::new(HttpBackend::new(config.relay.backend_url.clone())?);
		let evm_validator = Arc::new(EvmReceiptValidator::new(&config.networks)?);
		let svm_validator = Arc::new(SolanaReceiptValidator::new(&config.networks)?);
		Some(RelayEngine::new(
			backend,
			evm_validator,
			svm_validator,
			engine,
			config.relay.polling_interval(),
		))
	} else {
		None
	};

	let api_config = config.api.clone().filter(|api| api.enabled);
	match (relay, api_config) {
		(Some(relay), Some(api_config)) => {
			tokio::select! {
				_ = relay.run() => {}
				result = server::start_server(api_config, state) => result?,
			}
		}
		(Some(relay), None) => relay.run().await,
		(None, Some(api_config)) => {
			server::start_server(api_config, state).await?;
		}
		(None, None) => {
			tracing::warn!("both the relay loop and the API server are disabled, nothing to do");
		}
	}

	Ok(())
}
