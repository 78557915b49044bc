//! sqrt price <-> base/quote price, and price -> tick snapping.
//!
//! A [`FixedPointPrice`] counts the quote token's smallest units per one whole
//! base token as a Q192 fixed-point number, e.g. 4336.759547 USDC per WETH is
//! 4336759547 units plus a fraction. The fraction keeps neighbouring ticks
//! apart at the far ends of the tick domain, where a whole-unit price would
//! collapse to a handful of values or to zero.
//!
//! Whether the base token is token0 or token1 of the pool decides whether the
//! pool ratio is used as is or inverted; it is resolved from the token
//! addresses.

use crate::domain::primitives::is_token0;
use crate::domain::{Decimal, TokenInfo};
use crate::engine::fixed_point::{narrow, ten_pow, widen};
use crate::engine::tick_math::{greatest_tick_where, tick_to_sqrt_price_x96, MIN_TICK};
use crate::error::MathError;
use alloy_primitives::ruint::aliases::U512;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedPointPrice {
    /// Quote smallest units per one whole base token, scaled by 2^192.
    x192: U512,
    quote_decimals: u8,
}

impl FixedPointPrice {
    pub fn from_x192(x192: U512, quote_decimals: u8) -> Self {
        Self {
            x192,
            quote_decimals,
        }
    }

    /// A price given in whole quote units, e.g. one read off a pool snapshot.
    pub fn from_units(units: U256, quote_decimals: u8) -> Self {
        Self::from_x192(widen(units) << 192usize, quote_decimals)
    }

    pub fn x192(&self) -> U512 {
        self.x192
    }

    pub fn quote_decimals(&self) -> u8 {
        self.quote_decimals
    }

    /// Whole quote units, fraction dropped.
    pub fn units(&self) -> Result<U256, MathError> {
        narrow(self.x192 >> 192usize, "fixed point price units")
    }

    /// Human price, e.g. 4336.759547.
    pub fn to_decimal(&self) -> Result<Decimal, MathError> {
        Decimal::from_units(self.units()?, self.quote_decimals)
    }
}

/// Whether `base` sorts as token0 against `quote`.
fn base_is_token0(base: &TokenInfo, quote: &TokenInfo) -> Result<bool, MathError> {
    if base.address == quote.address {
        return Err(MathError::InvalidPrice(format!(
            "base and quote are the same token {}",
            base.address
        )));
    }
    Ok(is_token0(&base.address, &quote.address))
}

/// token0 base: `sqrtP^2 * 10^base_decimals` (already Q192);
/// token1 base: `2^384 * 10^base_decimals / sqrtP^2`.
fn price_x192(
    sqrt_price_x96: U256,
    base_decimals: u8,
    token0_is_base: bool,
) -> Result<U512, MathError> {
    if sqrt_price_x96.is_zero() {
        return Err(MathError::InvalidPrice("sqrtPriceX96 is zero".to_string()));
    }
    let squared = widen(sqrt_price_x96) * widen(sqrt_price_x96);
    let base_unit = widen(ten_pow(base_decimals)?);
    let overflow = MathError::Overflow("sqrt_price_x96_to_price");

    if token0_is_base {
        squared.checked_mul(base_unit).ok_or(overflow)
    } else {
        let numerator = (U512::from(1u64) << 384usize)
            .checked_mul(base_unit)
            .ok_or(overflow)?;
        Ok(numerator / squared)
    }
}

/// Convert a pool `sqrtPriceX96` into the base/quote price.
pub fn sqrt_price_x96_to_price(
    sqrt_price_x96: U256,
    base: &TokenInfo,
    quote: &TokenInfo,
) -> Result<FixedPointPrice, MathError> {
    let token0_is_base = base_is_token0(base, quote)?;
    Ok(FixedPointPrice::from_x192(
        price_x192(sqrt_price_x96, base.decimals, token0_is_base)?,
        quote.decimals,
    ))
}

/// Base/quote price at the lower edge of `tick`.
pub fn tick_to_price(
    tick: i32,
    base: &TokenInfo,
    quote: &TokenInfo,
) -> Result<FixedPointPrice, MathError> {
    sqrt_price_x96_to_price(tick_to_sqrt_price_x96(tick)?, base, quote)
}

/// Map a price to the initializable tick at or below it.
///
/// Finds the greatest tick whose price does not pass `price` in the pool's
/// token1/token0 direction, comparing at full Q192 precision, then floors to
/// a multiple of `tick_spacing` (toward negative infinity). A floor that
/// lands below `MIN_TICK` moves up one spacing to the lowest usable tick.
pub fn price_to_tick(
    price: FixedPointPrice,
    base: &TokenInfo,
    quote: &TokenInfo,
    tick_spacing: i32,
) -> Result<i32, MathError> {
    if tick_spacing <= 0 {
        return Err(MathError::InvalidTickRange {
            lower: MIN_TICK,
            upper: MIN_TICK,
            spacing: tick_spacing,
        });
    }
    if price.x192.is_zero() {
        return Err(MathError::InvalidPrice("price is zero".to_string()));
    }
    let token0_is_base = base_is_token0(base, quote)?;

    let tick = greatest_tick_where(|tick| {
        let at_tick = price_x192(tick_to_sqrt_price_x96(tick)?, base.decimals, token0_is_base)?;
        Ok(if token0_is_base {
            at_tick <= price.x192
        } else {
            at_tick >= price.x192
        })
    })?;

    let floored = tick.div_euclid(tick_spacing) * tick_spacing;
    Ok(if floored < MIN_TICK {
        floored + tick_spacing
    } else {
        floored
    })
}
