use crate::datasource::SourceError;
use crate::domain::PositionId;
use thiserror::Error;

/// Failures of the pure fixed-point and liquidity math.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("tick {0} is outside the protocol tick bounds")]
    OutOfBoundsTick(i32),
    #[error("invalid tick range [{lower}, {upper}) for spacing {spacing}")]
    InvalidTickRange { lower: i32, upper: i32, spacing: i32 },
    #[error("invalid price: {0}")]
    InvalidPrice(String),
    #[error("division by zero in {0}")]
    DivisionByZero(&'static str),
    /// An intermediate no longer fits its target width. Wrap-safe subtraction
    /// is used for every fee-growth delta, so hitting this is a bug.
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),
}

/// Errors surfaced by the PnL and APR engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Math(#[from] MathError),
    #[error("pool data unavailable for position {position_id}: missing {field}")]
    PoolDataUnavailable {
        position_id: PositionId,
        field: &'static str,
    },
    #[error("position not found: {0}")]
    PositionNotFound(PositionId),
    #[error("no RPC client configured for chain {chain_id}")]
    NoRpcClient { chain_id: u64 },
    #[error("data source failure for position {position_id}: {source}")]
    Source {
        position_id: PositionId,
        #[source]
        source: SourceError,
    },
    #[error(transparent)]
    Cache(#[from] crate::cache::CacheError),
}

impl EngineError {
    /// Map a collaborator failure, keeping caller-level kinds unchanged.
    pub fn from_source(position_id: PositionId, err: SourceError) -> Self {
        match err {
            SourceError::NoRpcClient { chain_id } => EngineError::NoRpcClient { chain_id },
            SourceError::PositionNotFound => EngineError::PositionNotFound(position_id),
            other => EngineError::Source {
                position_id,
                source: other,
            },
        }
    }
}
