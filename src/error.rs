// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 GameBridge Contributors

//! API error type and canonical error codes.
//!
//! Every failed request is rendered as `{"success": false, "errorCode": ...}`
//! with an appropriate HTTP status, matching the envelope the game client and
//! the exchange frontend expect.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Canonical error codes surfaced in the `errorCode` response field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Request body failed to parse or carried malformed fields.
    InvalidRequest,
    /// Missing or empty `X-Dapp-SessionID` header.
    InvalidSessionId,
    /// Ledger lookup or mutation failed unexpectedly.
    DbError,
    /// Intent failed the method allow-list or shape rules.
    InvalidIntent,
    /// Correlation id could not be mapped to the session.
    UuidMappingFailed,
    /// Batch deduction was rejected by the ledger.
    InsufficientBalance,
    /// Validator signature could not be produced.
    SignatureGenerationFailed,
    /// HMAC tag missing or did not match the request body.
    InvalidHmacSignature,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidRequest => "INVALID_REQUEST",
            ErrorCode::InvalidSessionId => "INVALID_SESSION_ID",
            ErrorCode::DbError => "DB_ERROR",
            ErrorCode::InvalidIntent => "INVALID_INTENT",
            ErrorCode::UuidMappingFailed => "UUID_MAPPING_FAILED",
            ErrorCode::InsufficientBalance => "INSUFFICIENT_BALANCE",
            ErrorCode::SignatureGenerationFailed => "SIGNATURE_GENERATION_FAILED",
            ErrorCode::InvalidHmacSignature => "INVALID_HMAC_SIGNATURE",
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: ErrorCode,
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    #[serde(rename = "errorCode")]
    error_code: &'static str,
}

impl ApiError {
    pub fn new(status: StatusCode, code: ErrorCode) -> Self {
        Self { status, code }
    }

    pub fn bad_request(code: ErrorCode) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code)
    }

    pub fn unauthorized(code: ErrorCode) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code)
    }

    pub fn internal(code: ErrorCode) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, code)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            success: false,
            error_code: self.code.as_str(),
        });
        (self.status, body).into_response()
    }
}
