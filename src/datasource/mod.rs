//! Collaborator interfaces that supply chain facts and ledger rows.
//!
//! The engine never talks to a node or subgraph itself. Implementations own
//! fetching, pagination and retries; they hand back already-decoded values.

use crate::domain::{LedgerEvent, NftCheckpoint, PoolState, PositionDescriptor, PositionId};
use async_trait::async_trait;
use std::fmt;

pub mod file;
pub mod mock;

pub use file::{FileDataSource, Snapshot, SnapshotPosition};
pub use mock::MockDataSource;

/// Static position data and the position-manager NFT record.
#[async_trait]
pub trait PositionSource: Send + Sync + fmt::Debug {
    async fn load_position(&self, id: PositionId) -> Result<PositionDescriptor, SourceError>;

    /// Read the NFT's on-chain position record.
    ///
    /// Returns `SourceError::InvalidNftId` once the NFT has been burned.
    async fn load_nft_checkpoint(&self, id: PositionId) -> Result<NftCheckpoint, SourceError>;
}

/// Pool state as of the latest block.
#[async_trait]
pub trait PoolStateSource: Send + Sync + fmt::Debug {
    /// Re-read the pool and the position's two boundary ticks.
    async fn refresh_pool_state(
        &self,
        position: &PositionDescriptor,
    ) -> Result<PoolState, SourceError>;
}

/// The position's event ledger.
#[async_trait]
pub trait LedgerSource: Send + Sync + fmt::Debug {
    /// Bring the ledger up to date with the chain, then return all events.
    async fn sync_ledger(&self, id: PositionId) -> Result<Vec<LedgerEvent>, SourceError>;

    /// Return the stored events without syncing.
    async fn load_events(&self, id: PositionId) -> Result<Vec<LedgerEvent>, SourceError>;
}

/// Error type for collaborator operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// No RPC client is configured for the chain.
    NoRpcClient { chain_id: u64 },
    /// The position is unknown to the source.
    PositionNotFound,
    /// The NFT id does not exist (burned).
    InvalidNftId,
    /// Network error (e.g., connection timeout, RPC failure)
    Network(String),
    /// Parsing error (invalid JSON or malformed response)
    Parse(String),
    /// Other error
    Other(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::NoRpcClient { chain_id } => {
                write!(f, "No RPC client for chain {}", chain_id)
            }
            SourceError::PositionNotFound => write!(f, "Position not found"),
            SourceError::InvalidNftId => write!(f, "Invalid token ID"),
            SourceError::Network(msg) => write!(f, "Network error: {}", msg),
            SourceError::Parse(msg) => write!(f, "Parse error: {}", msg),
            SourceError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for SourceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_display() {
        let err = SourceError::Network("connection timeout".to_string());
        assert_eq!(err.to_string(), "Network error: connection timeout");

        let err = SourceError::NoRpcClient { chain_id: 8453 };
        assert_eq!(err.to_string(), "No RPC client for chain 8453");

        let err = SourceError::Parse("invalid JSON".to_string());
        assert_eq!(err.to_string(), "Parse error: invalid JSON");

        assert_eq!(SourceError::InvalidNftId.to_string(), "Invalid token ID");
    }
}
