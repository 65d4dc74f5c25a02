// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 GameBridge Contributors

//! # API Data Models
//!
//! Request and response structures used by the REST API. All types derive
//! `Serialize`/`Deserialize` and `ToSchema` for JSON handling and OpenAPI
//! documentation.
//!
//! ## Session Id Type
//!
//! The [`SessionId`] newtype wraps the opaque client identifier carried in
//! the `X-Dapp-SessionID` header. It scopes a player's in-memory balances.
//!
//! ## Model Categories
//!
//! - **Intents**: declared economic actions (mint/transfer/burn/burn-permit)
//! - **Validation**: countersigning request/response for the exchange
//! - **Settlement**: exchange result callbacks carrying a receipt status
//! - **Assets**: per-session balance views

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Session Id Type
// =============================================================================

/// Opaque client-supplied session identifier.
///
/// Scopes a player's balances in the in-memory ledger. The server never
/// interprets its contents beyond rejecting the empty string.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        SessionId(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        SessionId(value.to_string())
    }
}

impl From<SessionId> for String {
    fn from(value: SessionId) -> Self {
        value.0
    }
}

// =============================================================================
// Intent Models
// =============================================================================

/// One `(type, asset id, amount)` item in an intent's from- or to-list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PairAsset {
    /// Item kind as declared by the client (`"asset"` for fungible assets).
    #[serde(rename = "type")]
    pub kind: String,
    /// Asset identifier, e.g. `asset_money`.
    pub id: String,
    /// Non-negative amount.
    pub amount: u64,
}

impl PairAsset {
    pub fn asset(id: impl Into<String>, amount: u64) -> Self {
        Self {
            kind: "asset".to_string(),
            id: id.into(),
            amount,
        }
    }
}

/// A declared economic action with the assets it consumes and produces.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Intent {
    /// One of `mint`, `transfer`, `burn`, `burn-permit`.
    pub method: String,
    /// Assets consumed by the action.
    #[serde(default)]
    pub from: Vec<PairAsset>,
    /// Assets produced by the action.
    #[serde(default)]
    pub to: Vec<PairAsset>,
}

// =============================================================================
// Validation Models
// =============================================================================

/// Request to validate and countersign a user action.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ValidateRequest {
    /// Client-generated correlation id tying this intent to its settlement.
    pub uuid: String,
    /// User's signature over the digest, echoed back on success.
    pub user_sig: String,
    /// User's wallet address.
    pub user_address: String,
    /// 0x-prefixed 32-byte hex digest the validator countersigns.
    pub digest: String,
    /// The declared action being validated.
    pub intent: Intent,
}

/// Payload of a successful validation: both signatures over the digest.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ValidateData {
    #[serde(rename = "userSig")]
    pub user_sig: String,
    #[serde(rename = "validatorSig")]
    pub validator_sig: String,
}

/// Successful validation response envelope.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ValidateResponse {
    pub success: bool,
    pub data: ValidateData,
}

// =============================================================================
// Settlement Models
// =============================================================================

/// Exchange result callback delivered once a transaction settles on-chain.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExchangeResultRequest {
    /// Correlation id from the earlier validation.
    pub uuid: String,
    /// Hash of the settlement transaction.
    pub tx_hash: String,
    /// Receipt outcome code; `1` denotes success.
    pub receipt_status: u64,
    /// Assets to credit to the session on success.
    #[serde(default)]
    pub outputs: Vec<PairAsset>,
}

/// Minimal success envelope for settlement callbacks.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SimpleResponse {
    pub success: bool,
}

// =============================================================================
// Asset Models
// =============================================================================

/// A single asset balance as presented to the client.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Asset {
    pub id: String,
    pub balance: u64,
}

/// Player-facing view of a session's assets.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlayerAssets {
    pub player_id: SessionId,
    pub name: String,
    pub wallet_address: String,
    pub server: String,
    pub assets: Vec<Asset>,
}

/// Ledger entry timestamps for the session.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionInfo {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload of a successful assets query.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssetsData {
    pub v1: PlayerAssets,
    pub session_info: SessionInfo,
}

/// Successful assets response envelope.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssetsResponse {
    pub success: bool,
    pub data: AssetsData,
}
