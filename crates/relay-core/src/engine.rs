//! The signing cycle.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use relay_signer::SignatureEngine;
use relay_types::{
	truncate_id, ChainFamily, FamilySelector, ReceiptWithMeta, SubmitSignatureRequest,
};

use crate::{BackendApi, ReceiptValidator, RelayError};

/// Outcome of one signing cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
	pub signed: usize,
	pub failed: usize,
}

/// Polls the backend and signs whatever validates.
pub struct RelayEngine {
	backend: Arc<dyn BackendApi>,
	evm_validator: Arc<dyn ReceiptValidator>,
	svm_validator: Arc<dyn ReceiptValidator>,
	signer: Arc<SignatureEngine>,
	interval: Duration,
}

impl RelayEngine {
	pub fn new(
		backend: Arc<dyn BackendApi>,
		evm_validator: Arc<dyn ReceiptValidator>,
		svm_validator: Arc<dyn ReceiptValidator>,
		signer: Arc<SignatureEngine>,
		interval: Duration,
	) -> Self {
		Self {
			backend,
			evm_validator,
			svm_validator,
			signer,
			interval,
		}
	}

	/// Fetches unsigned receipts from both family partitions. A failure in
	/// one partition is logged and does not hide the other partition's work.
	async fn discover(&self) -> Vec<ReceiptWithMeta> {
		let mut receipts = Vec::new();
		for family in [FamilySelector::Evm, FamilySelector::Svm] {
			let address = match family {
				FamilySelector::Evm => self.signer.keys().evm_address().to_string(),
				FamilySelector::Svm => self.signer.keys().svm_pubkey_base58(),
			};
			match self.backend.unsigned_receipts(family, &address).await {
				Ok(mut batch) => receipts.append(&mut batch),
				Err(e) => {
					warn!(family = %family, error = %e, "unsigned receipt discovery failed");
				}
			}
		}
		receipts
	}

	/// Validates, signs, and submits one receipt.
	async fn process(&self, item: &ReceiptWithMeta) -> Result<(), RelayError> {
		let validator = if ChainFamily::of(item.receipt.chain_from).is_solana() {
			&self.svm_validator
		} else {
			&self.evm_validator
		};
		validator.validate(item).await?;

		let signature = self.signer.sign_claim(&item.receipt)?;
		let family = ChainFamily::of(item.receipt.chain_to);
		let request = SubmitSignatureRequest {
			signer: self.signer.keys().identity_for(family),
			signature,
		};
		self.backend
			.submit_signature(&item.receipt.id(), &request)
			.await
	}

	/// Runs one discovery-validate-sign-submit cycle.
	pub async fn tick(&self) -> CycleReport {
		let mut report = CycleReport::default();
		for item in self.discover().await {
			let id = item.receipt.id().to_string();
			match self.process(&item).await {
				Ok(()) => {
					info!(receipt = %truncate_id(&id), "receipt signed and submitted");
					report.signed += 1;
				}
				Err(e) => {
					warn!(receipt = %truncate_id(&id), error = %e, "receipt skipped");
					report.failed += 1;
				}
			}
		}
		report
	}

	/// Runs the signing loop until the task is dropped.
	pub async fn run(&self) {
		info!(interval_ms = self.interval.as_millis() as u64, "relay loop started");
		let mut interval = tokio::time::interval(self.interval);
		interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
		loop {
			interval.tick().await;
			let report = self.tick().await;
			if report.signed > 0 || report.failed > 0 {
				info!(signed = report.signed, failed = report.failed, "relay cycle finished");
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{Bytes, B256, U256};
	use async_trait::async_trait;
	use relay_signer::{RelayKeys, ValidatorGate};
	use relay_types::{Receipt, ReceiptId, SecretString, SOLANA_CHAIN_ID};
	use std::sync::Mutex;

	const EVM_KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
	const SVM_KEY: &str = "2222222222222222222222222222222222222222222222222222222222222222";

	fn signer() -> Arc<SignatureEngine> {
		let keys = RelayKeys::from_secrets(
			&SecretString::from(EVM_KEY),
			&SecretString::from(SVM_KEY),
		)
		.unwrap();
		Arc::new(SignatureEngine::new(keys, ValidatorGate::Unconfigured, false))
	}

	fn item(chain_from: u64, chain_to: u64, event_id: u64) -> ReceiptWithMeta {
		ReceiptWithMeta {
			receipt: Receipt {
				receipt_id: ReceiptId::new(chain_from, chain_to, event_id),
				from: B256::repeat_byte(0x11),
				to: B256::repeat_byte(0xaa),
				token_address_from: B256::repeat_byte(0x22),
				token_address_to: B256::repeat_byte(0xbb),
				amount_from: U256::from(1000u64),
				amount_to: U256::from(1000u64),
				chain_from,
				chain_to,
				event_id,
				flags: U256::ZERO,
				data: Bytes::new(),
				timestamp: 100,
				claimed: false,
			},
			meta: None,
		}
	}

	struct MockBackend {
		evm: Result<Vec<ReceiptWithMeta>, String>,
		svm: Result<Vec<ReceiptWithMeta>, String>,
		submissions: Mutex<Vec<(ReceiptId, SubmitSignatureRequest)>>,
	}

	impl MockBackend {
		fn new(
			evm: Result<Vec<ReceiptWithMeta>, String>,
			svm: Result<Vec<ReceiptWithMeta>, String>,
		) -> Self {
			Self {
				evm,
				svm,
				submissions: Mutex::new(Vec::new()),
			}
		}
	}

	#[async_trait]
	impl BackendApi for MockBackend {
		async fn unsigned_receipts(
			&self,
			family: FamilySelector,
			_address: &str,
		) -> Result<Vec<ReceiptWithMeta>, RelayError> {
			let batch = match family {
				FamilySelector::Evm => &self.evm,
				FamilySelector::Svm => &self.svm,
			};
			batch.clone().map_err(RelayError::Backend)
		}

		async fn submit_signature(
			&self,
			id: &ReceiptId,
			request: &SubmitSignatureRequest,
		) -> Result<(), RelayError> {
			self.submissions
				.lock()
				.unwrap()
				.push((*id, request.clone()));
			Ok(())
		}
	}

	struct PassValidator;

	#[async_trait]
	impl ReceiptValidator for PassValidator {
		async fn validate(&self, _receipt: &ReceiptWithMeta) -> Result<(), RelayError> {
			Ok(())
		}
	}

	struct SelectiveValidator {
		reject_event_id: u64,
	}

	#[async_trait]
	impl ReceiptValidator for SelectiveValidator {
		async fn validate(&self, receipt: &ReceiptWithMeta) -> Result<(), RelayError> {
			if receipt.receipt.event_id == self.reject_event_id {
				Err(RelayError::Validation("transaction not found".into()))
			} else {
				Ok(())
			}
		}
	}

	fn engine_with(
		backend: Arc<MockBackend>,
		evm_validator: Arc<dyn ReceiptValidator>,
	) -> RelayEngine {
		RelayEngine::new(
			backend,
			evm_validator,
			Arc::new(PassValidator),
			signer(),
			Duration::from_secs(10),
		)
	}

	#[tokio::test]
	async fn signs_and_submits_both_partitions() {
		let backend = Arc::new(MockBackend::new(
			Ok(vec![item(SOLANA_CHAIN_ID, 2, 1)]),
			Ok(vec![item(1, SOLANA_CHAIN_ID, 2)]),
		));
		let engine = engine_with(backend.clone(), Arc::new(PassValidator));

		let report = engine.tick().await;
		assert_eq!(report, CycleReport { signed: 2, failed: 0 });

		let submissions = backend.submissions.lock().unwrap();
		assert_eq!(submissions.len(), 2);
		// evm-bound receipt carries the secp256k1 identity and a 65-byte
		// signature, solana-bound the ed25519 identity and 64 bytes
		let evm_bound = submissions.iter().find(|(id, _)| id.chain_to == 2).unwrap();
		assert!(evm_bound.1.signer.starts_with("0x"));
		assert_eq!(evm_bound.1.signature.len(), 2 + 65 * 2);
		let svm_bound = submissions
			.iter()
			.find(|(id, _)| id.chain_to == SOLANA_CHAIN_ID)
			.unwrap();
		assert!(!svm_bound.1.signer.starts_with("0x"));
		assert_eq!(svm_bound.1.signature.len(), 2 + 64 * 2);
	}

	#[tokio::test]
	async fn one_invalid_receipt_does_not_stop_the_cycle() {
		let backend = Arc::new(MockBackend::new(
			Ok(vec![item(1, 2, 1), item(1, 2, 2), item(1, 2, 3)]),
			Ok(vec![]),
		));
		let engine = engine_with(
			backend.clone(),
			Arc::new(SelectiveValidator { reject_event_id: 2 }),
		);

		let report = engine.tick().await;
		assert_eq!(report, CycleReport { signed: 2, failed: 1 });
		assert_eq!(backend.submissions.lock().unwrap().len(), 2);
	}

	#[tokio::test]
	async fn one_partition_failing_does_not_hide_the_other() {
		let backend = Arc::new(MockBackend::new(
			Err("backend down".to_string()),
			Ok(vec![item(1, SOLANA_CHAIN_ID, 1)]),
		));
		let engine = engine_with(backend.clone(), Arc::new(PassValidator));

		let report = engine.tick().await;
		assert_eq!(report, CycleReport { signed: 1, failed: 0 });
	}

	#[tokio::test]
	async fn origin_chain_family_picks_the_validator() {
		// the evm validator rejects everything; a solana-origin receipt must
		// not be routed to it
		struct RejectAll;

		#[async_trait]
		impl ReceiptValidator for RejectAll {
			async fn validate(&self, _receipt: &ReceiptWithMeta) -> Result<(), RelayError> {
				Err(RelayError::Validation("wrong validator".into()))
			}
		}

		let backend = Arc::new(MockBackend::new(
			Ok(vec![item(SOLANA_CHAIN_ID, 2, 1)]),
			Ok(vec![]),
		));
		let engine = engine_with(backend, Arc::new(RejectAll));
		let report = engine.tick().await;
		assert_eq!(report, CycleReport { signed: 1, failed: 0 });
	}
}
