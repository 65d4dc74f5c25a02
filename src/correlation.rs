// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 GameBridge Contributors

//! Correlation store tying a validated intent to its later settlement.
//!
//! Written once at validation time, read non-destructively when the
//! exchange result arrives. Re-using a correlation id is rejected so a
//! captured validation request cannot be replayed; entries are never
//! deleted.

use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum CorrelationError {
    #[error("correlation id {0} is already mapped to a session")]
    DuplicateUuid(String),
}

/// Map from client-generated correlation id to session id.
#[derive(Default)]
pub struct CorrelationStore {
    mappings: RwLock<HashMap<String, String>>,
}

impl CorrelationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `uuid` with `session_id`, rejecting duplicates.
    pub async fn put(&self, uuid: &str, session_id: &str) -> Result<(), CorrelationError> {
        let mut mappings = self.mappings.write().await;
        if mappings.contains_key(uuid) {
            return Err(CorrelationError::DuplicateUuid(uuid.to_string()));
        }
        mappings.insert(uuid.to_string(), session_id.to_string());
        tracing::debug!(uuid, session_id, "stored correlation mapping");
        Ok(())
    }

    /// Look up the session a correlation id was validated under.
    pub async fn get(&self, uuid: &str) -> Option<String> {
        self.mappings.read().await.get(uuid).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn put_then_get_returns_session() {
        let store = CorrelationStore::new();
        let uuid = Uuid::new_v4().to_string();

        store.put(&uuid, "s1").await.unwrap();
        assert_eq!(store.get(&uuid).await.as_deref(), Some("s1"));
    }

    #[tokio::test]
    async fn get_unknown_uuid_returns_none() {
        let store = CorrelationStore::new();
        assert!(store.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn duplicate_put_is_rejected_and_keeps_original() {
        let store = CorrelationStore::new();
        let uuid = Uuid::new_v4().to_string();

        store.put(&uuid, "s1").await.unwrap();
        let err = store.put(&uuid, "s2").await.unwrap_err();
        assert!(matches!(err, CorrelationError::DuplicateUuid(_)));
        assert_eq!(store.get(&uuid).await.as_deref(), Some("s1"));
    }

    #[tokio::test]
    async fn get_is_non_destructive() {
        let store = CorrelationStore::new();
        store.put("u1", "s1").await.unwrap();
        assert_eq!(store.get("u1").await.as_deref(), Some("s1"));
        assert_eq!(store.get("u1").await.as_deref(), Some("s1"));
    }
}
