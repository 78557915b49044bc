//! Position lifecycle events as written by the ledger sync.

use crate::domain::TimeMs;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// What happened to the position, with the fields that only make sense for
/// that kind of event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEventKind {
    /// Mint of the position NFT with its initial liquidity.
    #[serde(rename_all = "camelCase")]
    Create {
        liquidity: U256,
        amount0: U256,
        amount1: U256,
    },
    #[serde(rename_all = "camelCase")]
    Increase {
        liquidity: U256,
        amount0: U256,
        amount1: U256,
    },
    /// Liquidity removal. The withdrawn amounts stay in `tokensOwed` until collected.
    #[serde(rename_all = "camelCase")]
    Decrease {
        liquidity: U256,
        amount0: U256,
        amount1: U256,
    },
    /// Withdrawal from `tokensOwed`; `fee0`/`fee1` are the fee share of it.
    #[serde(rename_all = "camelCase")]
    Collect {
        amount0: U256,
        amount1: U256,
        fee0: U256,
        fee1: U256,
        fee_value_in_quote: U256,
    },
    /// NFT burned.
    Close,
}

impl LedgerEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            LedgerEventKind::Create { .. } => "CREATE",
            LedgerEventKind::Increase { .. } => "INCREASE",
            LedgerEventKind::Decrease { .. } => "DECREASE",
            LedgerEventKind::Collect { .. } => "COLLECT",
            LedgerEventKind::Close => "CLOSE",
        }
    }

    /// True for events that change the capital committed to the position.
    pub fn is_capital_change(&self) -> bool {
        matches!(
            self,
            LedgerEventKind::Create { .. }
                | LedgerEventKind::Increase { .. }
                | LedgerEventKind::Decrease { .. }
        )
    }
}

/// An immutable ledger row for one position.
///
/// The `*_after` fields are the ledger's running state once this event has
/// been applied; all values are in smallest token units, PnL and cost basis
/// in the quote token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEvent {
    pub block_number: u64,
    pub tx_index: u32,
    pub log_index: u32,
    pub timestamp: TimeMs,
    pub kind: LedgerEventKind,
    pub uncollected_principal0_after: U256,
    pub uncollected_principal1_after: U256,
    pub cost_basis_after: U256,
    pub realized_pnl_after: i128,
}

impl LedgerEvent {
    pub fn new(
        block_number: u64,
        tx_index: u32,
        log_index: u32,
        timestamp: TimeMs,
        kind: LedgerEventKind,
    ) -> Self {
        Self {
            block_number,
            tx_index,
            log_index,
            timestamp,
            kind,
            uncollected_principal0_after: U256::ZERO,
            uncollected_principal1_after: U256::ZERO,
            cost_basis_after: U256::ZERO,
            realized_pnl_after: 0,
        }
    }

    pub fn with_cost_basis(mut self, cost_basis_after: U256) -> Self {
        self.cost_basis_after = cost_basis_after;
        self
    }

    pub fn with_realized_pnl(mut self, realized_pnl_after: i128) -> Self {
        self.realized_pnl_after = realized_pnl_after;
        self
    }

    pub fn with_uncollected_principal(mut self, principal0: U256, principal1: U256) -> Self {
        self.uncollected_principal0_after = principal0;
        self.uncollected_principal1_after = principal1;
        self
    }
}
