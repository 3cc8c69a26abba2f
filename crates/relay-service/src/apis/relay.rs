//! Relay discovery and signature submission endpoints.

use relay_store::lifecycle::LifecycleManager;
use relay_types::{
	ApiError, FamilySelector, ReceiptId, ReceiptWithMeta, SubmitSignatureRequest,
	SubmitSignatureResponse,
};

/// `GET /relay/{family}/unsigned/{address}`: receipts in one family
/// partition still missing an attestation from `address`.
pub async fn list_unsigned(
	lifecycle: &LifecycleManager,
	family: &str,
	address: &str,
) -> Result<Vec<ReceiptWithMeta>, ApiError> {
	let family: FamilySelector = family
		.parse()
		.map_err(|e: relay_types::UnsupportedChainError| ApiError::BadRequest(e.to_string()))?;
	lifecycle
		.list_unsigned(address, family)
		.await
		.map_err(ApiError::from)
}

/// `POST /relay/{receiptId}`: verify and store one attestation.
pub async fn submit_signature(
	lifecycle: &LifecycleManager,
	receipt_id: &str,
	request: &SubmitSignatureRequest,
) -> Result<SubmitSignatureResponse, ApiError> {
	let id: ReceiptId = receipt_id
		.parse()
		.map_err(|e: relay_types::ReceiptIdParseError| ApiError::BadRequest(e.to_string()))?;
	lifecycle.add_signature(id, request).await?;
	// a duplicate submission is still a success for the caller
	Ok(SubmitSignatureResponse { signed: true })
}
