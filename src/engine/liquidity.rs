//! Token amounts <-> liquidity for a tick range.
//!
//! Exact integer math only, truncating like the periphery contracts. Float
//! estimation lives in [`crate::engine::estimate`].

use crate::engine::fixed_point::{mul_div, to_u128, Q96};
use crate::engine::tick_math::tick_to_sqrt_price_x96;
use crate::error::MathError;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Amounts of token0 and token1 in smallest units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAmounts {
    pub amount0: U256,
    pub amount1: U256,
}

impl TokenAmounts {
    pub fn new(amount0: U256, amount1: U256) -> Self {
        Self { amount0, amount1 }
    }

    pub fn is_zero(&self) -> bool {
        self.amount0.is_zero() && self.amount1.is_zero()
    }
}

fn ordered(a: U256, b: U256) -> (U256, U256) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}

/// `L * 2^96 * (sqrtB - sqrtA) / sqrtB / sqrtA`.
pub fn amount0_delta(sqrt_a: U256, sqrt_b: U256, liquidity: U256) -> Result<U256, MathError> {
    let (sqrt_a, sqrt_b) = ordered(sqrt_a, sqrt_b);
    if sqrt_a.is_zero() {
        return Err(MathError::DivisionByZero("amount0_delta"));
    }
    to_u128(liquidity, "amount0_delta")?;
    let numerator = liquidity << 96usize;
    Ok(mul_div(numerator, sqrt_b - sqrt_a, sqrt_b)? / sqrt_a)
}

/// `L * (sqrtB - sqrtA) / 2^96`.
pub fn amount1_delta(sqrt_a: U256, sqrt_b: U256, liquidity: U256) -> Result<U256, MathError> {
    let (sqrt_a, sqrt_b) = ordered(sqrt_a, sqrt_b);
    mul_div(liquidity, sqrt_b - sqrt_a, Q96)
}

/// Amounts held by `liquidity` over `[sqrt_a, sqrt_b)` at an exact sqrt price.
pub fn amounts_for_liquidity_at_sqrt_price(
    liquidity: U256,
    sqrt_price_x96: U256,
    sqrt_a: U256,
    sqrt_b: U256,
) -> Result<TokenAmounts, MathError> {
    let (sqrt_a, sqrt_b) = ordered(sqrt_a, sqrt_b);
    if liquidity.is_zero() {
        return Ok(TokenAmounts::default());
    }

    if sqrt_price_x96 <= sqrt_a {
        Ok(TokenAmounts::new(
            amount0_delta(sqrt_a, sqrt_b, liquidity)?,
            U256::ZERO,
        ))
    } else if sqrt_price_x96 < sqrt_b {
        Ok(TokenAmounts::new(
            amount0_delta(sqrt_price_x96, sqrt_b, liquidity)?,
            amount1_delta(sqrt_a, sqrt_price_x96, liquidity)?,
        ))
    } else {
        Ok(TokenAmounts::new(
            U256::ZERO,
            amount1_delta(sqrt_a, sqrt_b, liquidity)?,
        ))
    }
}

/// Amounts held by `liquidity` over `[tick_lower, tick_upper)` with the pool
/// at `current_tick`.
///
/// Below the range everything is token0, at or above the upper tick
/// everything is token1, otherwise the sqrt price of the current tick splits
/// the range.
pub fn amounts_for_liquidity(
    liquidity: U256,
    current_tick: i32,
    tick_lower: i32,
    tick_upper: i32,
) -> Result<TokenAmounts, MathError> {
    if tick_lower >= tick_upper {
        return Err(MathError::InvalidTickRange {
            lower: tick_lower,
            upper: tick_upper,
            spacing: 1,
        });
    }
    let sqrt_a = tick_to_sqrt_price_x96(tick_lower)?;
    let sqrt_b = tick_to_sqrt_price_x96(tick_upper)?;

    if current_tick < tick_lower {
        Ok(TokenAmounts::new(
            amount0_delta(sqrt_a, sqrt_b, liquidity)?,
            U256::ZERO,
        ))
    } else if current_tick < tick_upper {
        let sqrt_price = tick_to_sqrt_price_x96(current_tick)?;
        Ok(TokenAmounts::new(
            amount0_delta(sqrt_price, sqrt_b, liquidity)?,
            amount1_delta(sqrt_a, sqrt_price, liquidity)?,
        ))
    } else {
        Ok(TokenAmounts::new(
            U256::ZERO,
            amount1_delta(sqrt_a, sqrt_b, liquidity)?,
        ))
    }
}

fn liquidity_for_amount0(sqrt_a: U256, sqrt_b: U256, amount0: U256) -> Result<U256, MathError> {
    let (sqrt_a, sqrt_b) = ordered(sqrt_a, sqrt_b);
    let intermediate = mul_div(sqrt_a, sqrt_b, Q96)?;
    mul_div(amount0, intermediate, sqrt_b - sqrt_a)
}

fn liquidity_for_amount1(sqrt_a: U256, sqrt_b: U256, amount1: U256) -> Result<U256, MathError> {
    let (sqrt_a, sqrt_b) = ordered(sqrt_a, sqrt_b);
    mul_div(amount1, Q96, sqrt_b - sqrt_a)
}

/// Largest liquidity that `amounts` can fund over `[sqrt_a, sqrt_b)`.
///
/// In range, the scarcer side decides.
pub fn liquidity_for_amounts(
    sqrt_price_x96: U256,
    sqrt_a: U256,
    sqrt_b: U256,
    amounts: TokenAmounts,
) -> Result<U256, MathError> {
    let (sqrt_a, sqrt_b) = ordered(sqrt_a, sqrt_b);
    if sqrt_a == sqrt_b {
        return Err(MathError::DivisionByZero("liquidity_for_amounts"));
    }

    let liquidity = if sqrt_price_x96 <= sqrt_a {
        liquidity_for_amount0(sqrt_a, sqrt_b, amounts.amount0)?
    } else if sqrt_price_x96 < sqrt_b {
        let from0 = liquidity_for_amount0(sqrt_price_x96, sqrt_b, amounts.amount0)?;
        let from1 = liquidity_for_amount1(sqrt_a, sqrt_price_x96, amounts.amount1)?;
        from0.min(from1)
    } else {
        liquidity_for_amount1(sqrt_a, sqrt_b, amounts.amount1)?
    };

    to_u128(liquidity, "liquidity_for_amounts")?;
    Ok(liquidity)
}
