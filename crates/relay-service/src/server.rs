//! HTTP server for the bridge backend API.

use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	response::Json,
	routing::{get, post},
	Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use relay_config::ApiConfig;
use relay_price::fees::FeeCalculator;
use relay_store::lifecycle::LifecycleManager;
use relay_types::{
	ApiError, FeesQuery, FeesResponse, ReceiptQuery, ReceiptWithMeta, SendSignatureQuery,
	SignatureRecord, SubmitSignatureRequest, SubmitSignatureResponse,
};

use crate::apis;
use crate::apis::send::{SendSignatureResponse, SendSignatureService};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	pub lifecycle: Arc<LifecycleManager>,
	pub fees: Arc<FeeCalculator>,
	pub send: Arc<SendSignatureService>,
}

/// Starts the HTTP server for the backend API.
pub async fn start_server(
	api_config: ApiConfig,
	state: AppState,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = Router::new()
		.route("/relay/{family}/unsigned/{address}", get(handle_unsigned))
		.route("/relay/{receipt_id}", post(handle_submit_signature))
		.route("/receipts", get(handle_list_receipts))
		.route("/receipts/{receipt_id}", get(handle_get_receipt))
		.route(
			"/receipts/{receipt_id}/signatures",
			get(handle_receipt_signatures),
		)
		.route("/fees", get(handle_fees))
		.route("/send-signature", get(handle_send_signature))
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(state);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;
	tracing::info!("backend API server listening on {}", bind_address);
	axum::serve(listener, app).await?;
	Ok(())
}

/// Handles `GET /relay/{family}/unsigned/{address}`.
async fn handle_unsigned(
	Path((family, address)): Path<(String, String)>,
	State(state): State<AppState>,
) -> Result<Json<Vec<ReceiptWithMeta>>, ApiError> {
	apis::relay::list_unsigned(&state.lifecycle, &family, &address)
		.await
		.map(Json)
}

/// Handles `POST /relay/{receiptId}`.
async fn handle_submit_signature(
	Path(receipt_id): Path<String>,
	State(state): State<AppState>,
	Json(request): Json<SubmitSignatureRequest>,
) -> Result<(StatusCode, Json<SubmitSignatureResponse>), ApiError> {
	apis::relay::submit_signature(&state.lifecycle, &receipt_id, &request)
		.await
		.map(|response| (StatusCode::CREATED, Json(response)))
}

/// Handles `GET /receipts`.
async fn handle_list_receipts(
	Query(query): Query<ReceiptQuery>,
	State(state): State<AppState>,
) -> Result<Json<Vec<ReceiptWithMeta>>, ApiError> {
	apis::receipts::list(&state.lifecycle, &query).await.map(Json)
}

/// Handles `GET /receipts/{receiptId}`.
async fn handle_get_receipt(
	Path(receipt_id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<ReceiptWithMeta>, ApiError> {
	apis::receipts::get(&state.lifecycle, &receipt_id).await.map(Json)
}

/// Handles `GET /receipts/{receiptId}/signatures`.
async fn handle_receipt_signatures(
	Path(receipt_id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<Vec<SignatureRecord>>, ApiError> {
	apis::receipts::signatures(&state.lifecycle, &receipt_id)
		.await
		.map(Json)
}

/// Handles `GET /fees`.
async fn handle_fees(
	Query(query): Query<FeesQuery>,
	State(state): State<AppState>,
) -> Result<Json<FeesResponse>, ApiError> {
	let amount = alloy_primitives::U256::from_str_radix(&query.amount, 10)
		.map_err(|_| ApiError::BadRequest(format!("invalid decimal amount '{}'", query.amount)))?;
	let fees = state
		.fees
		.quote(
			query.network_from,
			query.network_to,
			&query.token_address,
			amount,
			query.is_max_amount,
		)
		.await
		.map_err(|e| ApiError::BadRequest(e.to_string()))?;
	Ok(Json(FeesResponse {
		fee_amount: fees.fee_amount.to_string(),
		amount_to_send: fees.amount_to_send.to_string(),
	}))
}

/// Handles `GET /send-signature`.
async fn handle_send_signature(
	Query(query): Query<SendSignatureQuery>,
	State(state): State<AppState>,
) -> Result<Json<SendSignatureResponse>, ApiError> {
	state.send.sign_send(&query).await.map(Json)
}
