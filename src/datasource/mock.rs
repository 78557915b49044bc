//! Mock collaborators for testing without a node.

use super::{LedgerSource, PoolStateSource, PositionSource, SourceError};
use crate::domain::{LedgerEvent, NftCheckpoint, PoolState, PositionDescriptor, PositionId};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mock data source that returns predefined test data and counts the calls
/// that would hit the chain.
#[derive(Debug, Default)]
pub struct MockDataSource {
    positions: HashMap<PositionId, PositionDescriptor>,
    pool_states: HashMap<PositionId, PoolState>,
    checkpoints: HashMap<PositionId, NftCheckpoint>,
    burned: HashSet<PositionId>,
    events: HashMap<PositionId, Vec<LedgerEvent>>,
    unconfigured_chains: HashSet<u64>,
    pool_refresh_failure: Option<String>,
    refresh_calls: AtomicUsize,
    sync_calls: AtomicUsize,
    checkpoint_calls: AtomicUsize,
}

impl MockDataSource {
    /// Create a new mock data source with empty data.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(mut self, position: PositionDescriptor) -> Self {
        self.positions.insert(position.id, position);
        self
    }

    pub fn with_pool_state(mut self, id: PositionId, state: PoolState) -> Self {
        self.pool_states.insert(id, state);
        self
    }

    pub fn with_checkpoint(mut self, id: PositionId, checkpoint: NftCheckpoint) -> Self {
        self.checkpoints.insert(id, checkpoint);
        self
    }

    /// Make the NFT lookup fail with `InvalidNftId`.
    pub fn with_burned_nft(mut self, id: PositionId) -> Self {
        self.burned.insert(id);
        self
    }

    pub fn with_events(mut self, id: PositionId, events: Vec<LedgerEvent>) -> Self {
        self.events.insert(id, events);
        self
    }

    /// Every call for this chain fails with `NoRpcClient`.
    pub fn with_unconfigured_chain(mut self, chain_id: u64) -> Self {
        self.unconfigured_chains.insert(chain_id);
        self
    }

    /// Every pool refresh fails with a network error.
    pub fn with_pool_refresh_failure(mut self, message: impl Into<String>) -> Self {
        self.pool_refresh_failure = Some(message.into());
        self
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn sync_calls(&self) -> usize {
        self.sync_calls.load(Ordering::SeqCst)
    }

    pub fn checkpoint_calls(&self) -> usize {
        self.checkpoint_calls.load(Ordering::SeqCst)
    }

    fn check_chain(&self, id: PositionId) -> Result<(), SourceError> {
        if self.unconfigured_chains.contains(&id.chain_id) {
            return Err(SourceError::NoRpcClient {
                chain_id: id.chain_id,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PositionSource for MockDataSource {
    async fn load_position(&self, id: PositionId) -> Result<PositionDescriptor, SourceError> {
        self.check_chain(id)?;
        self.positions
            .get(&id)
            .cloned()
            .ok_or(SourceError::PositionNotFound)
    }

    async fn load_nft_checkpoint(&self, id: PositionId) -> Result<NftCheckpoint, SourceError> {
        self.checkpoint_calls.fetch_add(1, Ordering::SeqCst);
        self.check_chain(id)?;
        if self.burned.contains(&id) {
            return Err(SourceError::InvalidNftId);
        }
        self.checkpoints
            .get(&id)
            .copied()
            .ok_or(SourceError::PositionNotFound)
    }
}

#[async_trait]
impl PoolStateSource for MockDataSource {
    async fn refresh_pool_state(
        &self,
        position: &PositionDescriptor,
    ) -> Result<PoolState, SourceError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.check_chain(position.id)?;
        if let Some(message) = &self.pool_refresh_failure {
            return Err(SourceError::Network(message.clone()));
        }
        self.pool_states
            .get(&position.id)
            .cloned()
            .ok_or_else(|| SourceError::Other(format!("no pool state for {}", position.id)))
    }
}

#[async_trait]
impl LedgerSource for MockDataSource {
    async fn sync_ledger(&self, id: PositionId) -> Result<Vec<LedgerEvent>, SourceError> {
        self.sync_calls.fetch_add(1, Ordering::SeqCst);
        self.load_events(id).await
    }

    async fn load_events(&self, id: PositionId) -> Result<Vec<LedgerEvent>, SourceError> {
        self.check_chain(id)?;
        Ok(self.events.get(&id).cloned().unwrap_or_default())
    }
}
