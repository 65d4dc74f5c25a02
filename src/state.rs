// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 GameBridge Contributors

//! Shared application state.
//!
//! Core services are constructed once at startup and injected here rather
//! than living behind global singletons, so tests can spin up isolated
//! instances.

use std::sync::Arc;

use crate::correlation::CorrelationStore;
use crate::hmac_auth::RequestAuthenticator;
use crate::keystore::KeystoreSigner;
use crate::ledger::AssetLedger;
use crate::settlement::SettlementReconciler;
use crate::validation::{DeductionPolicy, IntentValidator};

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<AssetLedger>,
    pub correlations: Arc<CorrelationStore>,
    pub validator: Arc<IntentValidator>,
    pub reconciler: Arc<SettlementReconciler>,
    pub authenticator: Arc<RequestAuthenticator>,
}

impl AppState {
    /// Wire up the core services around a decrypted signer and the HMAC
    /// authenticator, using the default deduction policy.
    pub fn new(signer: KeystoreSigner, authenticator: RequestAuthenticator) -> Self {
        Self::with_policy(signer, authenticator, DeductionPolicy::default())
    }

    pub fn with_policy(
        signer: KeystoreSigner,
        authenticator: RequestAuthenticator,
        policy: DeductionPolicy,
    ) -> Self {
        let ledger = Arc::new(AssetLedger::new());
        let correlations = Arc::new(CorrelationStore::new());
        let signer = Arc::new(signer);

        let validator = Arc::new(IntentValidator::new(
            ledger.clone(),
            correlations.clone(),
            signer,
            policy,
        ));
        let reconciler = Arc::new(SettlementReconciler::new(
            ledger.clone(),
            correlations.clone(),
        ));

        Self {
            ledger,
            correlations,
            validator,
            reconciler,
            authenticator: Arc::new(authenticator),
        }
    }
}
