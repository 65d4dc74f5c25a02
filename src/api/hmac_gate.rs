// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 GameBridge Contributors

//! HMAC gate middleware for mutating routes.
//!
//! Buffers the raw request body, checks the `X-HMAC-Signature` tag against
//! it, and only then hands the request on. On failure the response is
//! produced here and no downstream handler or core service runs.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::{ApiError, ErrorCode};
use crate::state::AppState;

/// Header carrying the HMAC tag over the raw request body.
pub const HMAC_HEADER: &str = "X-HMAC-Signature";

/// Upper bound on buffered request bodies.
const MAX_BODY_BYTES: usize = 1024 * 1024;

pub async fn require_hmac(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    // Read-only queries are not gated.
    if request.method() == Method::GET {
        return next.run(request).await;
    }

    let presented = request
        .headers()
        .get(HMAC_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned();

    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => return ApiError::bad_request(ErrorCode::InvalidRequest).into_response(),
    };

    if !state.authenticator.validate_tag(&bytes, &presented) {
        tracing::warn!(path = %parts.uri.path(), "rejected request with invalid HMAC tag");
        return ApiError::unauthorized(ErrorCode::InvalidHmacSignature).into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
