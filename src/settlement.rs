// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 GameBridge Contributors

//! # Settlement Reconciler
//!
//! Applies ledger credits once the external transaction layer reports a
//! settlement receipt. The correlation store resolves which session the
//! settled intent was validated under; a receipt for an intent that was
//! never validated is rejected outright.
//!
//! Non-success receipts apply nothing and succeed as no-ops. The
//! reservation taken at validation time is not reversed here.

use std::sync::Arc;

use thiserror::Error;

use crate::correlation::CorrelationStore;
use crate::ledger::{AssetLedger, LedgerError};
use crate::models::PairAsset;

/// Receipt status code denoting a successful on-chain transaction.
pub const RECEIPT_STATUS_SUCCESS: u64 = 1;

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("correlation id {0} was never validated")]
    UnknownCorrelation(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Credits settled outputs back to the originating session.
pub struct SettlementReconciler {
    ledger: Arc<AssetLedger>,
    correlations: Arc<CorrelationStore>,
}

impl SettlementReconciler {
    pub fn new(ledger: Arc<AssetLedger>, correlations: Arc<CorrelationStore>) -> Self {
        Self {
            ledger,
            correlations,
        }
    }

    /// Process one settlement receipt.
    ///
    /// Empty outputs succeed without touching anything. The correlation id
    /// must resolve to a validated session. Receipts with a non-success
    /// status succeed as no-ops; only status `1` credits the outputs.
    pub async fn process_settlement(
        &self,
        uuid: &str,
        receipt_status: u64,
        outputs: &[PairAsset],
    ) -> Result<(), SettlementError> {
        if outputs.is_empty() {
            tracing::info!(uuid, "settlement carried no outputs, skipping");
            return Ok(());
        }

        let session_id = self
            .correlations
            .get(uuid)
            .await
            .ok_or_else(|| SettlementError::UnknownCorrelation(uuid.to_string()))?;

        if receipt_status != RECEIPT_STATUS_SUCCESS {
            tracing::info!(
                uuid,
                session_id,
                receipt_status,
                "non-success receipt, skipping credit"
            );
            return Ok(());
        }

        self.ledger.credit(&session_id, outputs).await?;
        tracing::info!(
            uuid,
            session_id,
            outputs = outputs.len(),
            "credited settlement outputs"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_reconciler() -> (Arc<AssetLedger>, Arc<CorrelationStore>, SettlementReconciler) {
        let ledger = Arc::new(AssetLedger::new());
        let correlations = Arc::new(CorrelationStore::new());
        let reconciler = SettlementReconciler::new(ledger.clone(), correlations.clone());
        (ledger, correlations, reconciler)
    }

    #[tokio::test]
    async fn empty_outputs_are_a_no_op_success() {
        let (_, _, reconciler) = test_reconciler();
        // Succeeds even for a uuid that was never validated.
        reconciler
            .process_settlement("never-validated", RECEIPT_STATUS_SUCCESS, &[])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unknown_uuid_is_rejected_with_ledger_unchanged() {
        let (ledger, _, reconciler) = test_reconciler();
        let before = ledger.get_or_create("s1").await.unwrap();

        let err = reconciler
            .process_settlement(
                "never-validated",
                RECEIPT_STATUS_SUCCESS,
                &[PairAsset::asset("asset_gold", 50)],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SettlementError::UnknownCorrelation(_)));

        let after = ledger.get_or_create("s1").await.unwrap();
        assert_eq!(before.balances, after.balances);
    }

    #[tokio::test]
    async fn non_success_receipt_is_a_no_op_success() {
        let (ledger, correlations, reconciler) = test_reconciler();
        ledger.get_or_create("s1").await.unwrap();
        correlations.put("u1", "s1").await.unwrap();
        let before = ledger.get_or_create("s1").await.unwrap();

        reconciler
            .process_settlement("u1", 0, &[PairAsset::asset("asset_gold", 50)])
            .await
            .unwrap();

        let after = ledger.get_or_create("s1").await.unwrap();
        assert_eq!(before.balances, after.balances);
    }

    #[tokio::test]
    async fn success_receipt_credits_outputs() {
        let (ledger, correlations, reconciler) = test_reconciler();
        let before = ledger.get_or_create("s1").await.unwrap();
        correlations.put("u1", "s1").await.unwrap();

        reconciler
            .process_settlement(
                "u1",
                RECEIPT_STATUS_SUCCESS,
                &[PairAsset::asset("asset_gold", 50)],
            )
            .await
            .unwrap();

        let after = ledger.get_or_create("s1").await.unwrap();
        assert_eq!(
            after.balances["asset_gold"],
            before.balances["asset_gold"] + 50
        );
    }

    #[tokio::test]
    async fn ledger_failure_propagates() {
        let (_, correlations, reconciler) = test_reconciler();
        // Correlation exists but the session never touched the ledger.
        correlations.put("u1", "ghost-session").await.unwrap();

        let err = reconciler
            .process_settlement(
                "u1",
                RECEIPT_STATUS_SUCCESS,
                &[PairAsset::asset("asset_gold", 1)],
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SettlementError::Ledger(LedgerError::UnknownSession(_))
        ));
    }
}
