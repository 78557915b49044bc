//! Pure computation for position accounting.
//!
//! Nothing in here performs I/O: inputs are already-fetched chain facts and
//! ledger rows, outputs are integer amounts in smallest token units (plus
//! `Decimal` for human-facing ratios).

pub mod apr;
pub mod cost_basis;
pub mod estimate;
pub mod fee_growth;
pub mod fixed_point;
pub mod liquidity;
pub mod price;
pub mod tick_math;
pub mod valuation;

pub use apr::{allocate_fees, capital_periods, compute_apr};
pub use cost_basis::{CostBasisLedger, LedgerSummary};
pub use estimate::{liquidity_for_value, LiquidityEstimate};
pub use fee_growth::{
    fee_growth_inside, incremental_fees, pure_checkpointed_fees, unclaimed_fees, FeeGrowthInside,
    UnclaimedFees,
};
pub use fixed_point::{mul_div, to_signed, wrapped_sub, Q128, Q192, Q96};
pub use liquidity::{
    amounts_for_liquidity, amounts_for_liquidity_at_sqrt_price, liquidity_for_amounts,
    TokenAmounts,
};
pub use price::{price_to_tick, sqrt_price_x96_to_price, tick_to_price, FixedPointPrice};
pub use tick_math::{
    sqrt_price_x96_to_tick, tick_to_sqrt_price_x96, MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO,
    MIN_TICK,
};
pub use valuation::{current_value, quote_value_of, PositionValue};
