// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 GameBridge Contributors

use axum::{extract::State, http::HeaderMap, Json};

use crate::{
    error::{ApiError, ErrorCode},
    ledger::LedgerError,
    models::{Asset, AssetsData, AssetsResponse, PlayerAssets, SessionId, SessionInfo},
    state::AppState,
};

use super::session_id;

#[utoipa::path(
    get,
    path = "/api/assets",
    params(
        ("X-Dapp-SessionID" = String, Header, description = "Session scoping the balances")
    ),
    tag = "Assets",
    responses(
        (status = 200, body = AssetsResponse),
        (status = 400, description = "Missing or empty session id")
    )
)]
pub async fn get_assets(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AssetsResponse>, ApiError> {
    let session_id =
        session_id(&headers).ok_or_else(|| ApiError::bad_request(ErrorCode::InvalidSessionId))?;

    let snapshot = state
        .ledger
        .get_or_create(&session_id)
        .await
        .map_err(|err| match err {
            LedgerError::EmptySessionId => ApiError::bad_request(ErrorCode::InvalidSessionId),
            _ => ApiError::internal(ErrorCode::DbError),
        })?;

    let mut assets: Vec<Asset> = snapshot
        .balances
        .iter()
        .map(|(id, balance)| Asset {
            id: id.clone(),
            balance: *balance,
        })
        .collect();
    assets.sort_by(|a, b| a.id.cmp(&b.id));

    Ok(Json(AssetsResponse {
        success: true,
        data: AssetsData {
            v1: PlayerAssets {
                name: format!("playerName_{session_id}"),
                player_id: SessionId::from(session_id),
                wallet_address: "0xaaaa".to_string(),
                server: "test".to_string(),
                assets,
            },
            session_info: SessionInfo {
                created_at: snapshot.created_at,
                updated_at: snapshot.updated_at,
            },
        },
    }))
}
