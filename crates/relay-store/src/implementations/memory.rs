//! In-memory receipt store.
//!
//! Backs the relay backend with plain maps behind one lock. The joined
//! receipt view is modeled faithfully: receipts land in a pending set when
//! indexed and only become visible to listing queries after
//! `refresh_receipt_view`, matching the materialized view the production
//! database uses. Point lookups and signature writes bypass the view and
//! see pending receipts immediately.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use relay_types::{
	parse_cross_chain_address, FamilySelector, Receipt, ReceiptId, ReceiptMeta, ReceiptOrdering,
	ReceiptQuery, ReceiptWithMeta, SignatureRecord,
};

use crate::{ReceiptStoreInterface, StoreError};

#[derive(Default)]
struct Inner {
	visible: HashMap<ReceiptId, Receipt>,
	pending: HashMap<ReceiptId, Receipt>,
	metas: HashMap<ReceiptId, ReceiptMeta>,
	signatures: Vec<SignatureRecord>,
}

impl Inner {
	fn base_receipt(&self, id: &ReceiptId) -> Option<&Receipt> {
		self.visible.get(id).or_else(|| self.pending.get(id))
	}

	fn with_meta(&self, receipt: &Receipt) -> ReceiptWithMeta {
		ReceiptWithMeta {
			receipt: receipt.clone(),
			meta: self.metas.get(&receipt.id()).cloned(),
		}
	}
}

/// In-memory store implementation.
#[derive(Default)]
pub struct MemoryReceiptStore {
	inner: RwLock<Inner>,
	view_refreshes: AtomicU64,
}

impl MemoryReceiptStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Indexes a receipt into the pending set.
	pub async fn insert_receipt(&self, receipt: Receipt) {
		let mut inner = self.inner.write().await;
		inner.pending.insert(receipt.id(), receipt);
	}

	/// Attaches indexer metadata to a receipt.
	pub async fn set_meta(&self, id: ReceiptId, meta: ReceiptMeta) {
		let mut inner = self.inner.write().await;
		inner.metas.insert(id, meta);
	}

	/// Marks a receipt claimed, wherever it currently lives.
	pub async fn mark_claimed(&self, id: &ReceiptId) {
		let mut inner = self.inner.write().await;
		if let Some(receipt) = inner.visible.get_mut(id) {
			receipt.claimed = true;
		}
		if let Some(receipt) = inner.pending.get_mut(id) {
			receipt.claimed = true;
		}
	}

	/// How many times the view has been refreshed.
	pub fn view_refresh_count(&self) -> u64 {
		self.view_refreshes.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl ReceiptStoreInterface for MemoryReceiptStore {
	async fn refresh_receipt_view(&self) -> Result<(), StoreError> {
		let mut inner = self.inner.write().await;
		let pending = std::mem::take(&mut inner.pending);
		inner.visible.extend(pending);
		self.view_refreshes.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}

	async fn get_receipt(&self, id: &ReceiptId) -> Result<ReceiptWithMeta, StoreError> {
		let inner = self.inner.read().await;
		let receipt = inner.base_receipt(id).ok_or(StoreError::NotFound)?;
		Ok(inner.with_meta(receipt))
	}

	async fn list_receipts(&self, query: &ReceiptQuery) -> Result<Vec<ReceiptWithMeta>, StoreError> {
		let inner = self.inner.read().await;
		let address = match query.address.as_deref() {
			Some(raw) => match parse_cross_chain_address(raw) {
				Some(parsed) => Some(parsed),
				// an unparsable address matches nothing
				None => return Ok(Vec::new()),
			},
			None => None,
		};

		let mut rows: Vec<&Receipt> = inner
			.visible
			.values()
			.filter(|r| match address {
				Some(addr) => r.to == addr || r.from == addr,
				None => true,
			})
			.collect();
		rows.sort_by_key(|r| (r.timestamp, r.id()));
		if query.ordering == ReceiptOrdering::Desc {
			rows.reverse();
		}

		Ok(rows
			.into_iter()
			.skip(query.offset as usize)
			.take(query.limit as usize)
			.map(|r| inner.with_meta(r))
			.collect())
	}

	async fn signatures_for(&self, id: &ReceiptId) -> Result<Vec<SignatureRecord>, StoreError> {
		let inner = self.inner.read().await;
		if inner.base_receipt(id).is_none() {
			return Err(StoreError::NotFound);
		}
		Ok(inner
			.signatures
			.iter()
			.filter(|s| s.receipt_id == *id)
			.cloned()
			.collect())
	}

	async fn unsigned_for(
		&self,
		signer: &str,
		family: FamilySelector,
	) -> Result<Vec<ReceiptWithMeta>, StoreError> {
		let inner = self.inner.read().await;
		let mut rows: Vec<&Receipt> = inner
			.visible
			.values()
			.filter(|r| !r.claimed && family.matches(r.chain_to))
			.filter(|r| {
				!inner
					.signatures
					.iter()
					.any(|s| s.receipt_id == r.id() && s.signed_by == signer)
			})
			.collect();
		rows.sort_by_key(|r| (r.timestamp, r.id()));
		Ok(rows.into_iter().map(|r| inner.with_meta(r)).collect())
	}

	async fn insert_signature(&self, record: SignatureRecord) -> Result<bool, StoreError> {
		let mut inner = self.inner.write().await;
		let receipt = inner
			.base_receipt(&record.receipt_id)
			.ok_or(StoreError::NotFound)?;
		// the claimed check happens under the same lock as the insert
		if receipt.claimed {
			return Err(StoreError::AlreadyClaimed);
		}
		let duplicate = inner
			.signatures
			.iter()
			.any(|s| s.receipt_id == record.receipt_id && s.signed_by == record.signed_by);
		if duplicate {
			return Ok(false);
		}
		inner.signatures.push(record);
		Ok(true)
	}
}
