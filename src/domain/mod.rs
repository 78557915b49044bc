//! Domain types for position accounting.
//!
//! This module provides:
//! - Domain primitives: TimeMs, PositionId, TokenInfo
//! - Lossless Decimal wrapper for human-facing figures
//! - Position, pool and tick state supplied by collaborators
//! - Ledger events and their deterministic ordering
//! - PnL and APR result types

pub mod decimal;
pub mod ledger;
pub mod ordering;
pub mod pnl;
pub mod position;
pub mod primitives;

pub use decimal::Decimal;
pub use ledger::{LedgerEvent, LedgerEventKind};
pub use ordering::{latest_event, sort_events_deterministic, EventOrderingKey};
pub use pnl::{AprBreakdown, CapitalPeriod, PnlBreakdown};
pub use position::{
    NftCheckpoint, PoolSnapshot, PoolState, PositionBounds, PositionDescriptor, TickSnapshot,
};
pub use primitives::{PositionId, TimeMs, TokenInfo};
