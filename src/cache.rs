//! Memoized PnL breakdowns.
//!
//! Entries stay valid until a caller invalidates them; there is no TTL.
//! Concurrent recomputation of the same position is harmless, the last
//! `put` wins.

use crate::domain::{PnlBreakdown, PositionId};
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A stored breakdown and whether it may still be served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub breakdown: PnlBreakdown,
    pub valid: bool,
}

#[async_trait]
pub trait PnlCache: Send + Sync {
    /// The cached breakdown, if present and valid.
    async fn get(&self, id: PositionId) -> Result<Option<PnlBreakdown>, CacheError>;

    /// Insert or replace the entry for `breakdown.position_id`, marked valid.
    async fn put(&self, breakdown: &PnlBreakdown) -> Result<(), CacheError>;

    /// Mark the entry invalid. Missing entries are not an error.
    async fn invalidate(&self, id: PositionId) -> Result<(), CacheError>;
}

/// Process-local cache store.
#[derive(Debug, Default)]
pub struct InMemoryPnlCache {
    entries: RwLock<HashMap<PositionId, CacheEntry>>,
}

impl InMemoryPnlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw entry including invalidated ones.
    pub async fn entry(&self, id: PositionId) -> Option<CacheEntry> {
        self.entries.read().await.get(&id).cloned()
    }
}

#[async_trait]
impl PnlCache for InMemoryPnlCache {
    async fn get(&self, id: PositionId) -> Result<Option<PnlBreakdown>, CacheError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(&id)
            .filter(|entry| entry.valid)
            .map(|entry| entry.breakdown.clone()))
    }

    async fn put(&self, breakdown: &PnlBreakdown) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;
        entries.insert(
            breakdown.position_id,
            CacheEntry {
                breakdown: breakdown.clone(),
                valid: true,
            },
        );
        Ok(())
    }

    async fn invalidate(&self, id: PositionId) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(&id) {
            entry.valid = false;
            debug!(position = %id, "Invalidated cached PnL");
        }
        Ok(())
    }
}
