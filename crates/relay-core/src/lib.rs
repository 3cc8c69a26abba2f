//! Relay engine for the bridge signing loop.
//!
//! The engine polls the backend for receipts this relay has not yet
//! attested, validates each receipt against the origin chain it claims to
//! come from, signs the valid ones, and submits the attestations back. Every
//! receipt is processed independently: one bad receipt or one flaky chain
//! never stalls the rest of the cycle.

use async_trait::async_trait;
use thiserror::Error;

use relay_signer::SignerError;
use relay_types::{FamilySelector, ReceiptId, ReceiptWithMeta, SubmitSignatureRequest};

pub mod engine;

/// Re-export implementations
pub mod implementations {
	pub mod backend {
		pub mod http;
	}
	pub mod validation {
		pub mod evm;
		pub mod svm;
	}
}

/// Errors that can occur during relay operations.
#[derive(Debug, Error)]
pub enum RelayError {
	/// The backend API call failed.
	#[error("backend error: {0}")]
	Backend(String),
	/// The receipt could not be confirmed on its origin chain.
	#[error("validation failed: {0}")]
	Validation(String),
	/// No RPC endpoint is configured for a chain the receipt references.
	#[error("no rpc endpoint for chain {0}")]
	NoEndpoint(u64),
	#[error(transparent)]
	Signer(#[from] SignerError),
}

/// Client interface to the backend's relay endpoints.
#[async_trait]
pub trait BackendApi: Send + Sync {
	/// Receipts in the given family partition still missing this relay's
	/// attestation.
	async fn unsigned_receipts(
		&self,
		family: FamilySelector,
		address: &str,
	) -> Result<Vec<ReceiptWithMeta>, RelayError>;

	/// Submits one attestation for one receipt.
	async fn submit_signature(
		&self,
		id: &ReceiptId,
		request: &SubmitSignatureRequest,
	) -> Result<(), RelayError>;
}

/// Confirms that a receipt's originating transaction really happened on the
/// origin chain before the relay signs it.
#[async_trait]
pub trait ReceiptValidator: Send + Sync {
	async fn validate(&self, receipt: &ReceiptWithMeta) -> Result<(), RelayError>;
}
