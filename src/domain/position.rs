//! Position, pool and tick state as supplied by the chain-reading collaborators.

use crate::domain::primitives::is_token0;
use crate::domain::{PositionId, TokenInfo};
use crate::engine::tick_math::{MAX_TICK, MIN_TICK};
use crate::error::{EngineError, MathError};
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Tick range of a position. Construct through [`PositionBounds::new`] to get
/// the range invariants checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionBounds {
    pub tick_lower: i32,
    pub tick_upper: i32,
}

impl PositionBounds {
    pub fn new(tick_lower: i32, tick_upper: i32, tick_spacing: i32) -> Result<Self, MathError> {
        let invalid = MathError::InvalidTickRange {
            lower: tick_lower,
            upper: tick_upper,
            spacing: tick_spacing,
        };
        if tick_spacing <= 0 || tick_lower >= tick_upper {
            return Err(invalid);
        }
        if tick_lower % tick_spacing != 0 || tick_upper % tick_spacing != 0 {
            return Err(invalid);
        }
        if tick_lower < MIN_TICK {
            return Err(MathError::OutOfBoundsTick(tick_lower));
        }
        if tick_upper > MAX_TICK {
            return Err(MathError::OutOfBoundsTick(tick_upper));
        }
        Ok(Self {
            tick_lower,
            tick_upper,
        })
    }

    pub fn contains(&self, tick: i32) -> bool {
        self.tick_lower <= tick && tick < self.tick_upper
    }
}

/// Fee-growth-outside values stored on a boundary tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickSnapshot {
    pub fee_growth_outside0_x128: U256,
    pub fee_growth_outside1_x128: U256,
    pub initialized: bool,
}

impl TickSnapshot {
    pub fn new(outside0: U256, outside1: U256) -> Self {
        Self {
            fee_growth_outside0_x128: outside0,
            fee_growth_outside1_x128: outside1,
            initialized: true,
        }
    }

    /// Outside growth as the pool sees it: an uninitialized tick stores zero.
    pub fn effective_outside(&self) -> (U256, U256) {
        if self.initialized {
            (self.fee_growth_outside0_x128, self.fee_growth_outside1_x128)
        } else {
            (U256::ZERO, U256::ZERO)
        }
    }
}

/// Position-manager record for the NFT, as of the last read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftCheckpoint {
    pub liquidity: U256,
    pub fee_growth_inside0_last_x128: U256,
    pub fee_growth_inside1_last_x128: U256,
    /// Withdrawable buffer: checkpointed fees plus principal not yet collected.
    pub tokens_owed0: U256,
    pub tokens_owed1: U256,
}

/// Pool-level state read right after a refresh.
///
/// Valuation reads `current_tick` and `current_price`. `sqrt_price_x96` and
/// the two token decimals are carried as read so callers can rebuild a
/// [`FixedPointPrice`](crate::engine::FixedPointPrice) with
/// [`sqrt_price_x96_to_price`](crate::engine::sqrt_price_x96_to_price); the
/// engine does not consume them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSnapshot {
    pub current_tick: Option<i32>,
    pub sqrt_price_x96: U256,
    /// Quote smallest units per one whole base token.
    pub current_price: Option<U256>,
    pub fee_growth_global0_x128: U256,
    pub fee_growth_global1_x128: U256,
    pub token0_decimals: u8,
    pub token1_decimals: u8,
}

impl PoolSnapshot {
    /// Current tick, or `PoolDataUnavailable` for `position_id`.
    pub fn require_tick(&self, position_id: PositionId) -> Result<i32, EngineError> {
        self.current_tick
            .ok_or(EngineError::PoolDataUnavailable {
                position_id,
                field: "currentTick",
            })
    }

    /// Current base/quote price, or `PoolDataUnavailable` for `position_id`.
    pub fn require_price(&self, position_id: PositionId) -> Result<U256, EngineError> {
        self.current_price
            .ok_or(EngineError::PoolDataUnavailable {
                position_id,
                field: "currentPrice",
            })
    }
}

/// A pool snapshot together with the boundary ticks of one position, all
/// read against the same block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolState {
    pub snapshot: PoolSnapshot,
    pub lower: TickSnapshot,
    pub upper: TickSnapshot,
}

/// Static description of a position: identity, range and which token is
/// the base and which the quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionDescriptor {
    pub id: PositionId,
    pub base: TokenInfo,
    pub quote: TokenInfo,
    pub bounds: PositionBounds,
    pub tick_spacing: i32,
}

impl PositionDescriptor {
    /// Whether the quote token sorts first in the pool.
    pub fn token0_is_quote(&self) -> bool {
        is_token0(&self.quote.address, &self.base.address)
    }

    pub fn token0_is_base(&self) -> bool {
        !self.token0_is_quote()
    }

    /// (token0, token1) of the underlying pool.
    pub fn sorted_tokens(&self) -> (&TokenInfo, &TokenInfo) {
        if self.token0_is_quote() {
            (&self.quote, &self.base)
        } else {
            (&self.base, &self.quote)
        }
    }
}
