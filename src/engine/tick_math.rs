//! Tick <-> sqrt price conversion, bit-exact with the pool contract.

use crate::error::MathError;
use alloy_primitives::U256;

pub const MIN_TICK: i32 = -887272;
pub const MAX_TICK: i32 = 887272;

/// `tick_to_sqrt_price_x96(MIN_TICK)`.
pub const MIN_SQRT_RATIO: U256 = U256::from_limbs([4295128739, 0, 0, 0]);
/// `tick_to_sqrt_price_x96(MAX_TICK)`.
pub const MAX_SQRT_RATIO: U256 = U256::from_limbs([
    0x5d951d5263988d26,
    0xefd1fc6a50648849,
    0xfffd8963,
    0,
]);

// 2^128 / sqrt(1.0001)^(2^i) for i = 1..19, as Q128.
const RATIO_MULTIPLIERS: [u128; 19] = [
    0xfff97272373d413259a46990580e213a,
    0xfff2e50f5f656932ef12357cf3c7fdcc,
    0xffe5caca7e10e4e61c3624eaa0941cd0,
    0xffcb9843d60f6159c9db58835c926644,
    0xff973b41fa98c081472e6896dfb254c0,
    0xff2ea16466c96a3843ec78b326b52861,
    0xfe5dee046a99a2a811c461f1969c3053,
    0xfcbe86c7900a88aedcffc83b479aa3a4,
    0xf987a7253ac413176f2b074cf7815e54,
    0xf3392b0822b70005940c7a398e4b70f3,
    0xe7159475a2c29b7443b29c7fa6e889d9,
    0xd097f3bdfd2022b8845ad8f792aa5825,
    0xa9f746462d870fdf8a65dc1f90e061e5,
    0x70d869a156d2a1b890bb3df62baf32f7,
    0x31be135f97d08fd981231505542fcfa6,
    0x9aa508b5b7a84e1c677de54f3e99bc9,
    0x5d6af8dedb81196699c329225ee604,
    0x2216e584f5fa1ea926041bedfe98,
    0x48a170391f7dc42444e8fa2,
];

const RATIO_TICK_ONE: u128 = 0xfffcb933bd6fad37aa2d162d1a594001;

/// `sqrt(1.0001^tick) * 2^96`, rounded up like the contract.
pub fn tick_to_sqrt_price_x96(tick: i32) -> Result<U256, MathError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(MathError::OutOfBoundsTick(tick));
    }
    let abs_tick = tick.unsigned_abs();

    let mut ratio = if abs_tick & 0x1 != 0 {
        U256::from(RATIO_TICK_ONE)
    } else {
        U256::from(1u64) << 128
    };
    for (bit, multiplier) in RATIO_MULTIPLIERS.iter().enumerate() {
        if abs_tick & (0x2 << bit) != 0 {
            ratio = (ratio * U256::from(*multiplier)) >> 128;
        }
    }

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128.128 -> Q64.96, rounding up so that the inverse lookup is exact.
    let remainder_mask = (U256::from(1u64) << 32) - U256::from(1u64);
    let masked: U256 = ratio & remainder_mask;
    let round_up = if masked.is_zero() {
        U256::ZERO
    } else {
        U256::from(1u64)
    };
    Ok((ratio >> 32) + round_up)
}

/// Greatest tick whose sqrt ratio is at or below `sqrt_price_x96`.
pub fn sqrt_price_x96_to_tick(sqrt_price_x96: U256) -> Result<i32, MathError> {
    if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 > MAX_SQRT_RATIO {
        return Err(MathError::InvalidPrice(format!(
            "sqrtPriceX96 {sqrt_price_x96} outside the protocol range"
        )));
    }
    greatest_tick_where(|tick| Ok(tick_to_sqrt_price_x96(tick)? <= sqrt_price_x96))
}

/// Binary search for the greatest tick satisfying a predicate that holds for
/// every tick up to some point and for none after it.
pub(crate) fn greatest_tick_where<F>(mut holds: F) -> Result<i32, MathError>
where
    F: FnMut(i32) -> Result<bool, MathError>,
{
    if !holds(MIN_TICK)? {
        return Err(MathError::InvalidPrice(
            "price below the lowest representable tick".to_string(),
        ));
    }
    let (mut lo, mut hi) = (MIN_TICK, MAX_TICK);
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if holds(mid)? {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    Ok(lo)
}
