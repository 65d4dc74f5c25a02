// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 GameBridge Contributors

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::{
    error::{ApiError, ErrorCode},
    models::{ExchangeResultRequest, SimpleResponse},
    settlement::SettlementError,
    state::AppState,
};

impl From<SettlementError> for ApiError {
    fn from(err: SettlementError) -> Self {
        match err {
            SettlementError::UnknownCorrelation(_) => {
                ApiError::bad_request(ErrorCode::UuidMappingFailed)
            }
            SettlementError::Ledger(_) => ApiError::internal(ErrorCode::DbError),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/result",
    request_body = ExchangeResultRequest,
    params(
        ("X-HMAC-Signature" = String, Header, description = "HMAC tag over the raw request body")
    ),
    tag = "Settlement",
    responses(
        (status = 200, body = SimpleResponse),
        (status = 400, description = "Correlation id was never validated"),
        (status = 401, description = "HMAC tag missing or invalid")
    )
)]
pub async fn exchange_result(
    State(state): State<AppState>,
    payload: Result<Json<ExchangeResultRequest>, JsonRejection>,
) -> Result<Json<SimpleResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|_| ApiError::bad_request(ErrorCode::InvalidRequest))?;

    tracing::info!(
        uuid = %request.uuid,
        tx_hash = %request.tx_hash,
        receipt_status = request.receipt_status,
        "processing exchange result"
    );

    state
        .reconciler
        .process_settlement(&request.uuid, request.receipt_status, &request.outputs)
        .await?;

    Ok(Json(SimpleResponse { success: true }))
}
