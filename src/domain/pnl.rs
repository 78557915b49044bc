//! Computed results: the PnL breakdown and the APR breakdown.

use crate::domain::{Decimal, PositionId, TimeMs};
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// PnL of one position, all values in smallest quote-token units.
///
/// Signed figures are `i128`; unsigned value figures stay `U256`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PnlBreakdown {
    pub position_id: PositionId,
    pub current_value: U256,
    pub base_amount: U256,
    pub quote_amount: U256,
    pub current_cost_basis: U256,
    pub collected_fees: U256,
    pub unclaimed_fees: U256,
    pub unclaimed_fee0: U256,
    pub unclaimed_fee1: U256,
    pub realized_pnl: i128,
    pub unrealized_pnl: i128,
    /// unrealized + collected fees + unclaimed fees.
    pub total_pnl: i128,
    /// The NFT no longer exists on chain; unclaimed fees were taken as zero.
    pub nft_burned: bool,
    pub computed_at: TimeMs,
}

/// A span of constant cost basis. `end` is `None` for the open period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalPeriod {
    pub start: TimeMs,
    pub end: Option<TimeMs>,
    pub cost_basis: U256,
    pub allocated_fees: U256,
}

impl CapitalPeriod {
    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Duration in milliseconds, open periods measured up to `as_of`.
    pub fn duration_ms(&self, as_of: TimeMs) -> i64 {
        self.end.unwrap_or(as_of).elapsed_since(self.start)
    }

    /// Zero-length or zero-capital periods carry no APR weight.
    pub fn is_weighted(&self, as_of: TimeMs) -> bool {
        self.duration_ms(as_of) > 0 && !self.cost_basis.is_zero()
    }
}

/// Yield of one position. APR values are percentages (12.5 = 12.5%).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AprBreakdown {
    pub position_id: PositionId,
    pub realized_apr: Decimal,
    pub unrealized_apr: Decimal,
    pub total_apr: Decimal,
    pub realized_active_days: Decimal,
    pub unrealized_active_days: Decimal,
    pub total_active_days: Decimal,
    pub realized_fees: U256,
    pub unrealized_fees: U256,
    pub periods: Vec<CapitalPeriod>,
    pub as_of: TimeMs,
}
