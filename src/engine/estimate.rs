//! Float liquidity estimation for display (e.g. "how much liquidity would
//! this deposit buy"). Nothing here feeds stored or cached figures:
//! [`LiquidityEstimate`] has no conversion into `U256`.

use std::fmt;

/// Approximate liquidity. Display only.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct LiquidityEstimate(f64);

impl LiquidityEstimate {
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for LiquidityEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "~{:.0}", self.0)
    }
}

fn sqrt_price_at(tick: i32) -> f64 {
    1.0001f64.powf(tick as f64 / 2.0)
}

/// Liquidity that `value_in_quote` (smallest quote units) would provide over
/// `[tick_lower, tick_upper)` with the pool at `current_tick`.
///
/// Returns `None` for an empty range or a non-finite result.
pub fn liquidity_for_value(
    value_in_quote: f64,
    current_tick: i32,
    tick_lower: i32,
    tick_upper: i32,
    token0_is_base: bool,
) -> Option<LiquidityEstimate> {
    if tick_lower >= tick_upper || !value_in_quote.is_finite() || value_in_quote < 0.0 {
        return None;
    }
    let sqrt_a = sqrt_price_at(tick_lower);
    let sqrt_b = sqrt_price_at(tick_upper);
    let sqrt_p = sqrt_price_at(current_tick).clamp(sqrt_a, sqrt_b);

    // Raw token amounts held per unit of liquidity.
    let amount0 = 1.0 / sqrt_p - 1.0 / sqrt_b;
    let amount1 = sqrt_p - sqrt_a;
    let pool_price = sqrt_p * sqrt_p;

    let value_per_unit = if token0_is_base {
        amount1 + amount0 * pool_price
    } else {
        amount0 + amount1 / pool_price
    };
    if value_per_unit <= 0.0 {
        return None;
    }

    let liquidity = value_in_quote / value_per_unit;
    liquidity.is_finite().then_some(LiquidityEstimate(liquidity))
}
