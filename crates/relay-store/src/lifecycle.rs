//! Receipt lifecycle management.
//!
//! The lifecycle manager is the single write path for attestations: every
//! submission is normalized, checked against the receipt's terminal state,
//! cryptographically verified, and only then persisted under the verified
//! signer identity. It also fronts the read paths, refreshing the joined
//! view before any listing query.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use relay_signer::{SignatureEngine, SignerError};
use relay_types::{
	normalize_signature_hex, truncate_id, ApiError, FamilySelector, ReceiptId, ReceiptQuery,
	ReceiptWithMeta, SignatureFormatError, SignatureRecord, SubmitSignatureRequest,
};

use crate::{ReceiptStoreInterface, StoreError};

/// Errors surfaced by lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
	#[error(transparent)]
	Store(#[from] StoreError),
	#[error(transparent)]
	Signer(#[from] SignerError),
	#[error(transparent)]
	Format(#[from] SignatureFormatError),
}

impl From<LifecycleError> for ApiError {
	fn from(e: LifecycleError) -> Self {
		match e {
			LifecycleError::Store(StoreError::NotFound) => {
				ApiError::NotFound("receipt not found".to_string())
			}
			// claimed receipts are terminal and disappear from the API
			LifecycleError::Store(StoreError::AlreadyClaimed) => {
				ApiError::NotFound("receipt already claimed".to_string())
			}
			other => ApiError::BadRequest(other.to_string()),
		}
	}
}

/// Coordinates receipt reads and attestation writes against the store.
pub struct LifecycleManager {
	store: Arc<dyn ReceiptStoreInterface>,
	engine: Arc<SignatureEngine>,
}

impl LifecycleManager {
	pub fn new(store: Arc<dyn ReceiptStoreInterface>, engine: Arc<SignatureEngine>) -> Self {
		Self { store, engine }
	}

	pub fn store(&self) -> &Arc<dyn ReceiptStoreInterface> {
		&self.store
	}

	/// Unclaimed receipts in the given family partition still missing an
	/// attestation from `signer`. Refreshes the view first so freshly
	/// indexed receipts are discoverable.
	pub async fn list_unsigned(
		&self,
		signer: &str,
		family: FamilySelector,
	) -> Result<Vec<ReceiptWithMeta>, LifecycleError> {
		self.store.refresh_receipt_view().await?;
		Ok(self.store.unsigned_for(signer, family).await?)
	}

	/// Verifies and persists one attestation.
	///
	/// Returns `true` when the attestation was newly stored, `false` when
	/// the signer had already attested this receipt. Either way the caller
	/// may treat the submission as accepted.
	pub async fn add_signature(
		&self,
		id: ReceiptId,
		request: &SubmitSignatureRequest,
	) -> Result<bool, LifecycleError> {
		let (canonical, bytes) = normalize_signature_hex(&request.signature)?;

		let stored = self.store.get_receipt(&id).await?;
		if stored.receipt.claimed {
			return Err(StoreError::AlreadyClaimed.into());
		}

		let signed_by = self
			.engine
			.verify_claim(&stored.receipt, &request.signer, &bytes)
			.await?;

		let inserted = self
			.store
			.insert_signature(SignatureRecord {
				receipt_id: id,
				signed_by: signed_by.clone(),
				signature: canonical,
			})
			.await?;

		if inserted {
			info!(receipt = %truncate_id(&id.to_string()), signer = %signed_by, "attestation stored");
		} else {
			debug!(receipt = %truncate_id(&id.to_string()), signer = %signed_by, "duplicate attestation ignored");
		}
		Ok(inserted)
	}

	pub async fn get_receipt(&self, id: ReceiptId) -> Result<ReceiptWithMeta, LifecycleError> {
		Ok(self.store.get_receipt(&id).await?)
	}

	pub async fn receipt_signatures(
		&self,
		id: ReceiptId,
	) -> Result<Vec<SignatureRecord>, LifecycleError> {
		Ok(self.store.signatures_for(&id).await?)
	}

	/// Paginated receipt listing, view refreshed first.
	pub async fn list_receipts(
		&self,
		query: &ReceiptQuery,
	) -> Result<Vec<ReceiptWithMeta>, LifecycleError> {
		self.store.refresh_receipt_view().await?;
		Ok(self.store.list_receipts(query).await?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::implementations::memory::MemoryReceiptStore;
	use alloy_primitives::{Bytes, B256, U256};
	use relay_signer::{RelayKeys, ValidatorGate};
	use relay_types::{Receipt, SecretString, SOLANA_CHAIN_ID};

	const EVM_KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
	const SVM_KEY: &str = "2222222222222222222222222222222222222222222222222222222222222222";

	fn engine() -> Arc<SignatureEngine> {
		let keys = RelayKeys::from_secrets(
			&SecretString::from(EVM_KEY),
			&SecretString::from(SVM_KEY),
		)
		.unwrap();
		Arc::new(SignatureEngine::new(keys, ValidatorGate::Unconfigured, false))
	}

	fn receipt(chain_to: u64, event_id: u64) -> Receipt {
		Receipt {
			receipt_id: ReceiptId::new(1, chain_to, event_id),
			from: B256::repeat_byte(0x11),
			to: B256::repeat_byte(0xaa),
			token_address_from: B256::repeat_byte(0x22),
			token_address_to: B256::repeat_byte(0xbb),
			amount_from: U256::from(1000u64),
			amount_to: U256::from(1000u64),
			chain_from: 1,
			chain_to,
			event_id,
			flags: U256::ZERO,
			data: Bytes::new(),
			timestamp: 100 + event_id,
			claimed: false,
		}
	}

	async fn manager_with(receipts: Vec<Receipt>) -> (LifecycleManager, Arc<MemoryReceiptStore>) {
		let store = Arc::new(MemoryReceiptStore::new());
		for r in receipts {
			store.insert_receipt(r).await;
		}
		let manager = LifecycleManager::new(store.clone(), engine());
		(manager, store)
	}

	#[tokio::test]
	async fn submission_verifies_then_persists() {
		let r = receipt(2, 1);
		let engine = engine();
		let signature = engine.sign_claim(&r).unwrap();
		let signer = engine.keys().evm_address().to_string();

		let (manager, _) = manager_with(vec![r.clone()]).await;
		let inserted = manager
			.add_signature(
				r.id(),
				&SubmitSignatureRequest {
					signer: signer.clone(),
					signature: signature.clone(),
				},
			)
			.await
			.unwrap();
		assert!(inserted);

		let stored = manager.receipt_signatures(r.id()).await.unwrap();
		assert_eq!(stored.len(), 1);
		assert_eq!(stored[0].signed_by, signer);

		// resubmission is accepted but stores nothing new
		let again = manager
			.add_signature(r.id(), &SubmitSignatureRequest { signer, signature })
			.await
			.unwrap();
		assert!(!again);
		assert_eq!(manager.receipt_signatures(r.id()).await.unwrap().len(), 1);
	}

	#[tokio::test]
	async fn forged_signature_is_rejected_before_storage() {
		let r = receipt(2, 1);
		let engine = engine();
		let signer = engine.keys().evm_address().to_string();

		let (manager, _) = manager_with(vec![r.clone()]).await;
		let result = manager
			.add_signature(
				r.id(),
				&SubmitSignatureRequest {
					signer,
					signature: format!("0x{}", "ab".repeat(65)),
				},
			)
			.await;
		assert!(matches!(
			result,
			Err(LifecycleError::Signer(SignerError::InvalidSignature))
		));
		assert!(manager.receipt_signatures(r.id()).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn claimed_receipt_rejects_submissions_as_not_found() {
		let r = receipt(2, 1);
		let engine = engine();
		let signature = engine.sign_claim(&r).unwrap();
		let signer = engine.keys().evm_address().to_string();

		let (manager, store) = manager_with(vec![r.clone()]).await;
		store.mark_claimed(&r.id()).await;

		let result = manager
			.add_signature(r.id(), &SubmitSignatureRequest { signer, signature })
			.await;
		let api: ApiError = result.unwrap_err().into();
		assert!(matches!(api, ApiError::NotFound(_)));
	}

	#[tokio::test]
	async fn unknown_receipt_maps_to_not_found() {
		let (manager, _) = manager_with(vec![]).await;
		let result = manager
			.add_signature(
				ReceiptId::new(9, 9, 9),
				&SubmitSignatureRequest {
					signer: "0x0000000000000000000000000000000000000001".to_string(),
					signature: format!("0x{}", "ab".repeat(65)),
				},
			)
			.await;
		let api: ApiError = result.unwrap_err().into();
		assert!(matches!(api, ApiError::NotFound(_)));
	}

	#[tokio::test]
	async fn malformed_signature_maps_to_bad_request() {
		let r = receipt(2, 1);
		let (manager, _) = manager_with(vec![r.clone()]).await;
		let result = manager
			.add_signature(
				r.id(),
				&SubmitSignatureRequest {
					signer: "0x0000000000000000000000000000000000000001".to_string(),
					signature: "0xzz".to_string(),
				},
			)
			.await;
		let api: ApiError = result.unwrap_err().into();
		assert!(matches!(api, ApiError::BadRequest(_)));
	}

	#[tokio::test]
	async fn solana_submission_round_trips() {
		let r = receipt(SOLANA_CHAIN_ID, 1);
		let engine = engine();
		let signature = engine.sign_claim(&r).unwrap();
		let signer = engine.keys().svm_pubkey_base58();

		let (manager, _) = manager_with(vec![r.clone()]).await;
		assert!(manager
			.add_signature(r.id(), &SubmitSignatureRequest { signer, signature })
			.await
			.unwrap());
	}

	#[tokio::test]
	async fn listing_paths_refresh_the_view() {
		let (manager, store) = manager_with(vec![receipt(2, 1)]).await;
		assert_eq!(store.view_refresh_count(), 0);

		let unsigned = manager
			.list_unsigned("0xRelayA", FamilySelector::Evm)
			.await
			.unwrap();
		assert_eq!(unsigned.len(), 1);
		assert_eq!(store.view_refresh_count(), 1);

		let listed = manager.list_receipts(&ReceiptQuery::default()).await.unwrap();
		assert_eq!(listed.len(), 1);
		assert_eq!(store.view_refresh_count(), 2);
	}
}
