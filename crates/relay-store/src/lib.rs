//! Receipt and attestation storage for the bridge relay.
//!
//! Defines the storage interface the backend runs against plus the receipt
//! lifecycle manager that sits between the HTTP surface and the store.
//! Listing queries read through a joined receipt view that must be refreshed
//! before each read; point lookups and writes go to the base records
//! directly.

use async_trait::async_trait;
use thiserror::Error;

use relay_types::{FamilySelector, ReceiptId, ReceiptQuery, ReceiptWithMeta, SignatureRecord};

pub mod lifecycle;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
	/// No receipt exists under the given id.
	#[error("receipt not found")]
	NotFound,
	/// The receipt has already been claimed on the destination chain.
	#[error("receipt already claimed")]
	AlreadyClaimed,
	/// The storage backend failed.
	#[error("storage backend error: {0}")]
	Backend(String),
}

/// Trait defining the interface for receipt store implementations.
#[async_trait]
pub trait ReceiptStoreInterface: Send + Sync {
	/// Refreshes the joined receipt view so listing queries observe all
	/// receipts indexed so far.
	async fn refresh_receipt_view(&self) -> Result<(), StoreError>;

	/// Point lookup by structured id, from the base records.
	async fn get_receipt(&self, id: &ReceiptId) -> Result<ReceiptWithMeta, StoreError>;

	/// Paginated listing through the joined view.
	async fn list_receipts(&self, query: &ReceiptQuery) -> Result<Vec<ReceiptWithMeta>, StoreError>;

	/// All attestations stored for a receipt.
	async fn signatures_for(&self, id: &ReceiptId) -> Result<Vec<SignatureRecord>, StoreError>;

	/// Unclaimed receipts routed to the given family partition that `signer`
	/// has not yet attested, oldest first.
	async fn unsigned_for(
		&self,
		signer: &str,
		family: FamilySelector,
	) -> Result<Vec<ReceiptWithMeta>, StoreError>;

	/// Persists an attestation, checking the receipt's terminal state
	/// atomically with the insert. Returns `false` when an attestation by
	/// the same signer already exists for the receipt, leaving the stored
	/// record untouched.
	async fn insert_signature(&self, record: SignatureRecord) -> Result<bool, StoreError>;
}
