//! Current value of a position in quote-token units.

use crate::engine::fixed_point::{mul_div, ten_pow};
use crate::engine::liquidity::{amounts_for_liquidity, TokenAmounts};
use crate::error::MathError;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Holdings of a position split into base and quote, plus their combined
/// value in smallest quote units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionValue {
    pub base_amount: U256,
    pub quote_amount: U256,
    pub value: U256,
}

/// Map token0/token1 amounts onto (base, quote).
pub fn base_and_quote(amounts: TokenAmounts, token0_is_quote: bool) -> (U256, U256) {
    if token0_is_quote {
        (amounts.amount1, amounts.amount0)
    } else {
        (amounts.amount0, amounts.amount1)
    }
}

/// `quote + base * price / 10^base_decimals`, with `price` in smallest quote
/// units per whole base token.
pub fn quote_value_of(
    amounts: TokenAmounts,
    price: U256,
    base_decimals: u8,
    token0_is_quote: bool,
) -> Result<U256, MathError> {
    let (base, quote) = base_and_quote(amounts, token0_is_quote);
    let base_in_quote = mul_div(base, price, ten_pow(base_decimals)?)?;
    quote
        .checked_add(base_in_quote)
        .ok_or(MathError::Overflow("quote_value_of"))
}

pub fn current_value(
    liquidity: U256,
    current_tick: i32,
    tick_lower: i32,
    tick_upper: i32,
    current_price: U256,
    base_decimals: u8,
    token0_is_quote: bool,
) -> Result<PositionValue, MathError> {
    let amounts = amounts_for_liquidity(liquidity, current_tick, tick_lower, tick_upper)?;
    let (base_amount, quote_amount) = base_and_quote(amounts, token0_is_quote);
    Ok(PositionValue {
        base_amount,
        quote_amount,
        value: quote_value_of(amounts, current_price, base_decimals, token0_is_quote)?,
    })
}
