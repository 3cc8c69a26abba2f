//! Receipt query endpoints.

use relay_store::lifecycle::LifecycleManager;
use relay_types::{ApiError, ReceiptId, ReceiptQuery, ReceiptWithMeta, SignatureRecord};

fn parse_id(receipt_id: &str) -> Result<ReceiptId, ApiError> {
	receipt_id
		.parse()
		.map_err(|e: relay_types::ReceiptIdParseError| ApiError::BadRequest(e.to_string()))
}

/// `GET /receipts`: paginated listing, newest first by default.
pub async fn list(
	lifecycle: &LifecycleManager,
	query: &ReceiptQuery,
) -> Result<Vec<ReceiptWithMeta>, ApiError> {
	lifecycle.list_receipts(query).await.map_err(ApiError::from)
}

/// `GET /receipts/{receiptId}`: point lookup.
pub async fn get(
	lifecycle: &LifecycleManager,
	receipt_id: &str,
) -> Result<ReceiptWithMeta, ApiError> {
	let id = parse_id(receipt_id)?;
	lifecycle.get_receipt(id).await.map_err(ApiError::from)
}

/// `GET /receipts/{receiptId}/signatures`: stored attestations.
pub async fn signatures(
	lifecycle: &LifecycleManager,
	receipt_id: &str,
) -> Result<Vec<SignatureRecord>, ApiError> {
	let id = parse_id(receipt_id)?;
	lifecycle
		.receipt_signatures(id)
		.await
		.map_err(ApiError::from)
}
