//! Q-format constants and the widening integer helpers every other piece of
//! the engine builds on.
//!
//! Products of two 256-bit values are taken in 512 bits and narrowed back
//! with an explicit overflow check; divisions always come after the
//! multiplications they belong to.

use crate::error::MathError;
use alloy_primitives::ruint::aliases::U512;
use alloy_primitives::ruint::Uint;
use alloy_primitives::U256;

/// 2^96, the scale of `sqrtPriceX96`.
pub const Q96: U256 = U256::from_limbs([0, 1 << 32, 0, 0]);
/// 2^128, the scale of fee growth accumulators.
pub const Q128: U256 = U256::from_limbs([0, 0, 1, 0]);
/// 2^192, the scale of a squared `sqrtPriceX96`.
pub const Q192: U256 = U256::from_limbs([0, 0, 0, 1]);

/// `(a - b) mod 2^BITS`.
///
/// Fee growth counters wrap on chain, so a later reading can be numerically
/// smaller than an earlier one; the modular difference is still the growth.
pub fn wrapped_sub<const BITS: usize, const LIMBS: usize>(
    a: Uint<BITS, LIMBS>,
    b: Uint<BITS, LIMBS>,
) -> Uint<BITS, LIMBS> {
    a.wrapping_sub(b)
}

pub fn widen(value: U256) -> U512 {
    let l = value.as_limbs();
    U512::from_limbs([l[0], l[1], l[2], l[3], 0, 0, 0, 0])
}

/// Narrow a 512-bit intermediate back to 256 bits.
pub fn narrow(value: U512, context: &'static str) -> Result<U256, MathError> {
    let l = value.as_limbs();
    if l[4..].iter().any(|&limb| limb != 0) {
        return Err(MathError::Overflow(context));
    }
    Ok(U256::from_limbs([l[0], l[1], l[2], l[3]]))
}

/// `a * b / denominator` with a 512-bit product, truncating.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero("mul_div"));
    }
    narrow(widen(a) * widen(b) / widen(denominator), "mul_div")
}

/// `a * b >> shift` with a 512-bit product, truncating.
pub fn mul_shr(a: U256, b: U256, shift: usize) -> Result<U256, MathError> {
    narrow((widen(a) * widen(b)) >> shift, "mul_shr")
}

/// `10^exp`; fails past 10^77, the largest power that fits.
pub fn ten_pow(exp: u8) -> Result<U256, MathError> {
    let ten = U256::from(10u64);
    let mut result = U256::from(1u64);
    for _ in 0..exp {
        result = result
            .checked_mul(ten)
            .ok_or(MathError::Overflow("ten_pow"))?;
    }
    Ok(result)
}

pub fn to_u128(value: U256, context: &'static str) -> Result<u128, MathError> {
    if value.bit_len() > 128 {
        return Err(MathError::Overflow(context));
    }
    let l = value.as_limbs();
    Ok(((l[1] as u128) << 64) | l[0] as u128)
}

/// Convert an unsigned quote amount into the signed domain used for PnL.
pub fn to_signed(value: U256, context: &'static str) -> Result<i128, MathError> {
    let unsigned = to_u128(value, context)?;
    i128::try_from(unsigned).map_err(|_| MathError::Overflow(context))
}
