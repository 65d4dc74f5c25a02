// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 GameBridge Contributors

//! # Intent Validator
//!
//! Enforces the method allow-list and shape rules on client-declared
//! intents, reserves the consumed amounts in the ledger, records the
//! correlation mapping, and countersigns the digest with the keystore key.
//!
//! ## Deduction policy
//!
//! Which methods reserve their `from` amounts at validation time is an
//! explicit per-method table rather than control flow. The default reserves
//! for `mint` and `transfer` before any external settlement happens, so a
//! delayed or absent settlement cannot be used to double-spend. `burn` and
//! `burn-permit` settle without an upfront reservation.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use crate::correlation::{CorrelationError, CorrelationStore};
use crate::keystore::{KeystoreError, KeystoreSigner};
use crate::ledger::{AssetLedger, LedgerError};
use crate::models::{Intent, ValidateData, ValidateRequest};

/// Methods a client may declare.
pub const ALLOWED_METHODS: [&str; 4] = ["mint", "transfer", "burn", "burn-permit"];

/// Item kind required for every `from` item of a mint intent.
const ASSET_KIND: &str = "asset";

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("session id must not be empty")]
    InvalidSessionId,
    #[error("intent failed method or shape validation")]
    InvalidIntent,
    #[error("failed to store correlation mapping: {0}")]
    UuidMapping(#[source] CorrelationError),
    #[error("balance reservation rejected: {0}")]
    InsufficientBalance(#[source] LedgerError),
    #[error("failed to produce validator signature: {0}")]
    Signature(#[source] KeystoreError),
}

/// Per-method table of which intents reserve balances at validation.
#[derive(Debug, Clone)]
pub struct DeductionPolicy {
    deducting_methods: HashSet<&'static str>,
}

impl DeductionPolicy {
    /// Policy over an explicit set of deducting methods.
    pub fn new(deducting_methods: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            deducting_methods: deducting_methods.into_iter().collect(),
        }
    }

    /// Whether `method` reserves its `from` amounts during validation.
    pub fn deducts_at_validation(&self, method: &str) -> bool {
        self.deducting_methods.contains(method)
    }
}

impl Default for DeductionPolicy {
    fn default() -> Self {
        Self::new(["mint", "transfer"])
    }
}

/// Check an intent against the allow-list and shape rules.
///
/// `mint` additionally requires a non-empty `from` list whose items are all
/// of kind `"asset"`.
pub fn validate_intent(intent: &Intent) -> bool {
    if !ALLOWED_METHODS.contains(&intent.method.as_str()) {
        return false;
    }

    if intent.method == "mint" {
        if intent.from.is_empty() {
            return false;
        }
        if intent.from.iter().any(|item| item.kind != ASSET_KIND) {
            return false;
        }
    }

    true
}

/// Orchestrates validation of user actions against ledger and keystore.
pub struct IntentValidator {
    ledger: Arc<AssetLedger>,
    correlations: Arc<CorrelationStore>,
    signer: Arc<KeystoreSigner>,
    policy: DeductionPolicy,
}

impl IntentValidator {
    pub fn new(
        ledger: Arc<AssetLedger>,
        correlations: Arc<CorrelationStore>,
        signer: Arc<KeystoreSigner>,
        policy: DeductionPolicy,
    ) -> Self {
        Self {
            ledger,
            correlations,
            signer,
            policy,
        }
    }

    /// Validate a user action and countersign its digest.
    ///
    /// Pipeline: session check, intent check, correlation mapping,
    /// policy-driven balance reservation, signature. Failures before the
    /// reservation step leave the ledger untouched; the correlation entry
    /// is written before the reservation so the settlement callback can
    /// always find the session of a reserved intent.
    pub async fn validate_user_action(
        &self,
        session_id: &str,
        request: &ValidateRequest,
        digest: &[u8; 32],
    ) -> Result<ValidateData, ValidationError> {
        if session_id.is_empty() {
            return Err(ValidationError::InvalidSessionId);
        }

        if !validate_intent(&request.intent) {
            tracing::warn!(
                session_id,
                method = %request.intent.method,
                "rejected invalid intent"
            );
            return Err(ValidationError::InvalidIntent);
        }

        self.correlations
            .put(&request.uuid, session_id)
            .await
            .map_err(ValidationError::UuidMapping)?;

        if self.policy.deducts_at_validation(&request.intent.method) {
            self.ledger
                .check_and_deduct(session_id, &request.intent.from)
                .await
                .map_err(ValidationError::InsufficientBalance)?;
        }

        let validator_sig = self
            .signer
            .sign_hex(digest)
            .map_err(ValidationError::Signature)?;

        tracing::info!(
            session_id,
            uuid = %request.uuid,
            method = %request.intent.method,
            "validated user action"
        );

        Ok(ValidateData {
            user_sig: request.user_sig.clone(),
            validator_sig,
        })
    }
}
