// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 GameBridge Contributors

//! HTTP boundary: routing, CORS, request tracing, and the HMAC gate.
//!
//! The boundary feeds well-formed structured calls into the core services
//! and relays structured results outward. Mutating routes pass through the
//! HMAC gate before any core state is touched; the read-only assets query
//! and the health probe do not.

use axum::{
    http::HeaderMap,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        Asset, AssetsData, AssetsResponse, ExchangeResultRequest, Intent, PairAsset,
        PlayerAssets, SessionId, SessionInfo, SimpleResponse, ValidateData, ValidateRequest,
        ValidateResponse,
    },
    state::AppState,
};

pub mod assets;
pub mod health;
pub mod hmac_gate;
pub mod result;
pub mod validate;

pub use hmac_gate::HMAC_HEADER;

/// Header carrying the opaque session identifier.
pub const SESSION_HEADER: &str = "X-Dapp-SessionID";

/// Extract a non-empty session id from the request headers.
pub(crate) fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

pub fn router(state: AppState) -> Router {
    let gated = Router::new()
        .route("/api/validate", post(validate::validate_user_action))
        .route("/api/result", post(result::exchange_result))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            hmac_gate::require_hmac,
        ));

    Router::new()
        .route("/api/assets", get(assets::get_assets))
        .route("/health", get(health::health))
        .merge(gated)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        assets::get_assets,
        validate::validate_user_action,
        result::exchange_result,
        health::health
    ),
    components(
        schemas(
            health::HealthResponse,
            Asset,
            AssetsData,
            AssetsResponse,
            ExchangeResultRequest,
            Intent,
            PairAsset,
            PlayerAssets,
            SessionId,
            SessionInfo,
            SimpleResponse,
            ValidateData,
            ValidateRequest,
            ValidateResponse
        )
    ),
    tags(
        (name = "Assets", description = "Per-session balance queries"),
        (name = "Validation", description = "Intent validation and countersigning"),
        (name = "Settlement", description = "Exchange result reconciliation"),
        (name = "Health", description = "Liveness probe")
    )
)]
struct ApiDoc;
