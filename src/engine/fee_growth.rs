//! Fee-growth accounting: how much fee a position has earned but not yet
//! collected.
//!
//! All growth values are Q128 accumulators that wrap modulo 2^256; every
//! difference between two of them goes through [`wrapped_sub`].

use crate::domain::{NftCheckpoint, TickSnapshot};
use crate::engine::fixed_point::{mul_shr, wrapped_sub};
use crate::error::MathError;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Per-token fee growth inside a position's range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeGrowthInside {
    pub inside0_x128: U256,
    pub inside1_x128: U256,
}

/// Fees owed to a position, in smallest units of each token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnclaimedFees {
    pub fee0: U256,
    pub fee1: U256,
    /// The NFT no longer exists; fees are reported as zero.
    pub nft_burned: bool,
}

impl UnclaimedFees {
    /// Zero fees for a position whose NFT has been burned.
    pub fn burned() -> Self {
        Self {
            fee0: U256::ZERO,
            fee1: U256::ZERO,
            nft_burned: true,
        }
    }
}

fn inside_for_token(
    current_tick: i32,
    tick_lower: i32,
    tick_upper: i32,
    global: U256,
    lower_outside: U256,
    upper_outside: U256,
) -> U256 {
    let below = if current_tick >= tick_lower {
        lower_outside
    } else {
        wrapped_sub(global, lower_outside)
    };
    let above = if current_tick < tick_upper {
        upper_outside
    } else {
        wrapped_sub(global, upper_outside)
    };
    wrapped_sub(wrapped_sub(global, below), above)
}

/// Fee growth inside `[tick_lower, tick_upper)` from the pool globals and the
/// boundary ticks' outside values.
pub fn fee_growth_inside(
    current_tick: i32,
    tick_lower: i32,
    tick_upper: i32,
    global0_x128: U256,
    global1_x128: U256,
    lower: &TickSnapshot,
    upper: &TickSnapshot,
) -> FeeGrowthInside {
    let (lower0, lower1) = lower.effective_outside();
    let (upper0, upper1) = upper.effective_outside();
    FeeGrowthInside {
        inside0_x128: inside_for_token(
            current_tick,
            tick_lower,
            tick_upper,
            global0_x128,
            lower0,
            upper0,
        ),
        inside1_x128: inside_for_token(
            current_tick,
            tick_lower,
            tick_upper,
            global1_x128,
            lower1,
            upper1,
        ),
    }
}

/// Fees accrued since the checkpoint: `(now - last) * liquidity / 2^128`.
pub fn incremental_fees(
    inside_now_x128: U256,
    inside_last_x128: U256,
    liquidity: U256,
) -> Result<U256, MathError> {
    if liquidity.is_zero() {
        return Ok(U256::ZERO);
    }
    mul_shr(
        wrapped_sub(inside_now_x128, inside_last_x128),
        liquidity,
        128,
    )
}

/// The fee part of `tokensOwed`: whatever exceeds principal withdrawn by a
/// decrease and not yet collected.
pub fn pure_checkpointed_fees(tokens_owed: U256, uncollected_principal: U256) -> U256 {
    tokens_owed.saturating_sub(uncollected_principal)
}

/// Checkpointed fees plus fees accrued since the checkpoint, per token.
pub fn unclaimed_fees(
    checkpoint: &NftCheckpoint,
    inside_now: FeeGrowthInside,
    uncollected_principal: (U256, U256),
) -> Result<UnclaimedFees, MathError> {
    let accrued0 = incremental_fees(
        inside_now.inside0_x128,
        checkpoint.fee_growth_inside0_last_x128,
        checkpoint.liquidity,
    )?;
    let accrued1 = incremental_fees(
        inside_now.inside1_x128,
        checkpoint.fee_growth_inside1_last_x128,
        checkpoint.liquidity,
    )?;
    let owed0 = pure_checkpointed_fees(checkpoint.tokens_owed0, uncollected_principal.0);
    let owed1 = pure_checkpointed_fees(checkpoint.tokens_owed1, uncollected_principal.1);

    Ok(UnclaimedFees {
        fee0: owed0
            .checked_add(accrued0)
            .ok_or(MathError::Overflow("unclaimed_fees"))?,
        fee1: owed1
            .checked_add(accrued1)
            .ok_or(MathError::Overflow("unclaimed_fees"))?,
        nft_burned: false,
    })
}
