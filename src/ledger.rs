// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 GameBridge Contributors

//! # Session Asset Ledger
//!
//! Memory-resident per-session balance table. Entries are created lazily on
//! first access with balances sampled from a fixed whitelist of asset ids,
//! mutated by the validator (deduct) and the settlement reconciler (credit),
//! and never deleted. State is lost on restart by design.
//!
//! ## Concurrency
//!
//! The outer map is behind an `RwLock` held only long enough to find or
//! insert an entry. Each entry carries its own `Mutex`, so operations on the
//! same session never interleave while distinct sessions proceed in
//! parallel. No caller holds a ledger lock while touching the correlation
//! store.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use crate::models::PairAsset;

/// Asset ids every new session is seeded with.
pub const ASSET_WHITELIST: [&str; 10] = [
    "asset_money",
    "asset_gold",
    "asset_silver",
    "item_gem",
    "item_banana",
    "item_apple",
    "item_fish",
    "item_branch",
    "item_horn",
    "item_maple",
];

/// Initial balance range for `asset_money`.
pub const MONEY_RANGE: std::ops::RangeInclusive<u64> = 1000..=5000;

/// Initial balance range for every other whitelisted asset.
pub const ITEM_RANGE: std::ops::RangeInclusive<u64> = 500..=3000;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("session id must not be empty")]
    EmptySessionId,
    #[error("unknown session {0}")]
    UnknownSession(String),
    #[error("asset {0} not found in session")]
    UnknownAsset(String),
    #[error("insufficient balance for asset {id}: requested {requested}, available {available}")]
    InsufficientBalance {
        id: String,
        requested: u64,
        available: u64,
    },
    #[error("balance for asset {0} would overflow")]
    BalanceOverflow(String),
}

/// One session's balances with bookkeeping timestamps.
#[derive(Debug, Clone)]
struct LedgerEntry {
    balances: HashMap<String, u64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LedgerEntry {
    fn sampled() -> Self {
        let mut rng = rand::thread_rng();
        let mut balances = HashMap::with_capacity(ASSET_WHITELIST.len());
        for id in ASSET_WHITELIST {
            let range = if id == "asset_money" {
                MONEY_RANGE
            } else {
                ITEM_RANGE
            };
            balances.insert(id.to_string(), rng.gen_range(range));
        }

        let now = Utc::now();
        Self {
            balances,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Immutable copy of a ledger entry handed to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub balances: HashMap<String, u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&LedgerEntry> for LedgerSnapshot {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            balances: entry.balances.clone(),
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

/// In-memory per-session asset balance table.
#[derive(Default)]
pub struct AssetLedger {
    entries: RwLock<HashMap<String, Arc<Mutex<LedgerEntry>>>>,
}

impl AssetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the session's entry, creating it with sampled balances on
    /// first access.
    pub async fn get_or_create(&self, session_id: &str) -> Result<LedgerSnapshot, LedgerError> {
        let entry = self.entry_or_create(session_id).await?;
        let entry = entry.lock().await;
        Ok(LedgerSnapshot::from(&*entry))
    }

    /// Deduct every item from the session's balances, or nothing at all.
    ///
    /// Requested amounts are aggregated per asset id so a batch naming the
    /// same asset more than once is checked against its combined total. An
    /// unknown asset or a total exceeding the balance rejects the call with
    /// the ledger unchanged.
    pub async fn check_and_deduct(
        &self,
        session_id: &str,
        items: &[PairAsset],
    ) -> Result<(), LedgerError> {
        let entry = self.entry_or_create(session_id).await?;
        let mut entry = entry.lock().await;

        let mut requested: HashMap<&str, u64> = HashMap::new();
        for item in items {
            let total = requested.entry(item.id.as_str()).or_insert(0);
            *total = total
                .checked_add(item.amount)
                .ok_or_else(|| LedgerError::BalanceOverflow(item.id.clone()))?;
        }

        for (id, total) in &requested {
            let available = *entry
                .balances
                .get(*id)
                .ok_or_else(|| LedgerError::UnknownAsset(id.to_string()))?;
            if available < *total {
                return Err(LedgerError::InsufficientBalance {
                    id: id.to_string(),
                    requested: *total,
                    available,
                });
            }
        }

        for (id, total) in requested {
            if let Some(balance) = entry.balances.get_mut(id) {
                *balance -= total;
            }
        }
        entry.updated_at = Utc::now();

        tracing::debug!(session_id, items = items.len(), "deducted assets");
        Ok(())
    }

    /// Credit the session with every item, initializing unknown asset ids.
    ///
    /// Unlike deduction this never creates the session: crediting an unknown
    /// session means the settlement pipeline skipped validation.
    pub async fn credit(&self, session_id: &str, items: &[PairAsset]) -> Result<(), LedgerError> {
        if session_id.is_empty() {
            return Err(LedgerError::EmptySessionId);
        }

        let entry = {
            let entries = self.entries.read().await;
            entries
                .get(session_id)
                .cloned()
                .ok_or_else(|| LedgerError::UnknownSession(session_id.to_string()))?
        };
        let mut entry = entry.lock().await;

        let mut credited: HashMap<&str, u64> = HashMap::new();
        for item in items {
            let current = credited
                .get(item.id.as_str())
                .copied()
                .unwrap_or_else(|| entry.balances.get(&item.id).copied().unwrap_or(0));
            let next = current
                .checked_add(item.amount)
                .ok_or_else(|| LedgerError::BalanceOverflow(item.id.clone()))?;
            credited.insert(item.id.as_str(), next);
        }

        for (id, balance) in credited {
            entry.balances.insert(id.to_string(), balance);
        }
        entry.updated_at = Utc::now();

        tracing::debug!(session_id, items = items.len(), "credited assets");
        Ok(())
    }

    async fn entry_or_create(
        &self,
        session_id: &str,
    ) -> Result<Arc<Mutex<LedgerEntry>>, LedgerError> {
        if session_id.is_empty() {
            return Err(LedgerError::EmptySessionId);
        }

        if let Some(entry) = self.entries.read().await.get(session_id) {
            return Ok(entry.clone());
        }

        let mut entries = self.entries.write().await;
        let entry = entries
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(LedgerEntry::sampled())));
        Ok(entry.clone())
    }
}
