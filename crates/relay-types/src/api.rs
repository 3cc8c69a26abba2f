//! HTTP API types for the relay backend surface.
//!
//! Request/response bodies for the signature submission, discovery, receipt
//! query, and fee endpoints, plus the error envelope every handler maps
//! into. Wire names are camelCase to match the backend the indexers and
//! relays already speak.

use serde::{Deserialize, Serialize};

/// Body of `POST /relay/{receiptId}`: one relayer's attestation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitSignatureRequest {
	/// Claimed signer identity: 0x address or base58 pubkey.
	pub signer: String,
	/// Hex signature, optionally `0x`/`0X` prefixed.
	pub signature: String,
}

/// Response of `POST /relay/{receiptId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitSignatureResponse {
	pub signed: bool,
}

/// Ordering of receipt listings by timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptOrdering {
	Asc,
	#[default]
	Desc,
}

/// Query parameters of `GET /receipts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReceiptQuery {
	pub limit: u64,
	pub offset: u64,
	pub ordering: ReceiptOrdering,
	/// Matches receipts whose `to` or `from` equals this address.
	pub address: Option<String>,
}

impl Default for ReceiptQuery {
	fn default() -> Self {
		Self {
			limit: 50,
			offset: 0,
			ordering: ReceiptOrdering::Desc,
			address: None,
		}
	}
}

/// Query parameters of `GET /fees`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeesQuery {
	pub network_from: u64,
	pub network_to: u64,
	pub token_address: String,
	/// Requested amount in base token units, decimal string.
	pub amount: String,
	#[serde(default)]
	pub is_max_amount: bool,
}

/// Response of `GET /fees`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeesResponse {
	pub fee_amount: String,
	pub amount_to_send: String,
}

/// Query parameters of `GET /send-signature`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendSignatureQuery {
	pub network_from: u64,
	pub network_to: u64,
	pub token_address: String,
	pub external_token_address: String,
	pub amount: String,
	#[serde(default)]
	pub is_max_amount: bool,
	/// Flags bitfield, decimal string.
	#[serde(default)]
	pub flags: Option<String>,
	/// Auxiliary flag data, hex string.
	#[serde(default)]
	pub flag_data: Option<String>,
}

/// Error envelope returned by every API handler.
///
/// `NotFound` covers unknown receipts and terminal-state violations; any
/// other failure maps to a 400 carrying the error message, never a stack
/// trace.
#[derive(Debug)]
pub enum ApiError {
	NotFound(String),
	BadRequest(String),
}

impl ApiError {
	pub fn message(&self) -> &str {
		match self {
			ApiError::NotFound(m) | ApiError::BadRequest(m) => m,
		}
	}
}

impl std::fmt::Display for ApiError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.message())
	}
}

impl axum::response::IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = match &self {
			ApiError::NotFound(_) => StatusCode::NOT_FOUND,
			ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
		};
		let body = Json(serde_json::json!({ "message": self.message() }));
		(status, body).into_response()
	}
}
