//! HTTP client for the backend relay endpoints.

use async_trait::async_trait;
use std::time::Duration;

use relay_types::{FamilySelector, ReceiptId, ReceiptWithMeta, SubmitSignatureRequest};

use crate::{BackendApi, RelayError};

/// Backend client speaking the relay discovery and submission endpoints.
pub struct HttpBackend {
	client: reqwest::Client,
	base_url: String,
}

impl HttpBackend {
	pub fn new(base_url: impl Into<String>) -> Result<Self, RelayError> {
		let client = reqwest::Client::builder()
			.timeout(Duration::from_secs(30))
			.build()
			.map_err(|e| RelayError::Backend(e.to_string()))?;
		Ok(Self {
			client,
			base_url: base_url.into().trim_end_matches('/').to_string(),
		})
	}
}

#[async_trait]
impl BackendApi for HttpBackend {
	async fn unsigned_receipts(
		&self,
		family: FamilySelector,
		address: &str,
	) -> Result<Vec<ReceiptWithMeta>, RelayError> {
		let url = format!("{}/relay/{}/unsigned/{}", self.base_url, family, address);
		self.client
			.get(&url)
			.send()
			.await
			.map_err(|e| RelayError::Backend(e.to_string()))?
			.error_for_status()
			.map_err(|e| RelayError::Backend(e.to_string()))?
			.json()
			.await
			.map_err(|e| RelayError::Backend(e.to_string()))
	}

	async fn submit_signature(
		&self,
		id: &ReceiptId,
		request: &SubmitSignatureRequest,
	) -> Result<(), RelayError> {
		let url = format!("{}/relay/{}", self.base_url, id);
		self.client
			.post(&url)
			.json(request)
			.send()
			.await
			.map_err(|e| RelayError::Backend(e.to_string()))?
			.error_for_status()
			.map_err(|e| RelayError::Backend(e.to_string()))?;
		Ok(())
	}
}
