//! Lossless decimal numeric type backed by rust_decimal.
//!
//! Used for human-facing figures only (display prices, day counts, APR
//! percentages). Token amounts and protocol values stay in `U256`.

use crate::error::MathError;
use alloy_primitives::U256;
use rust_decimal::Decimal as RustDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest mantissa rust_decimal can hold (2^96 - 1).
const MAX_MANTISSA: u128 = 79_228_162_514_264_337_593_543_950_335;
const MAX_SCALE: u32 = 28;

/// Lossless decimal numeric type for financial calculations.
///
/// Serializes to JSON number (not string).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Decimal(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl Decimal {
    /// Parse a Decimal from a string losslessly.
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        RustDecimal::from_str(s).map(Decimal)
    }

    /// Interpret `units` as a fixed-point number with `decimals` fractional
    /// digits (e.g. 1_500_000 USDC units with 6 decimals is 1.5).
    ///
    /// Low-order digits are truncated when the value needs more than 28
    /// significant digits.
    pub fn from_units(units: U256, decimals: u8) -> Result<Self, MathError> {
        let mut scale = decimals as u32;
        let mut value = units;
        while scale > MAX_SCALE {
            value /= U256::from(10u64);
            scale -= 1;
        }
        let max = U256::from(MAX_MANTISSA);
        while value > max && scale > 0 {
            value /= U256::from(10u64);
            scale -= 1;
        }
        if value > max {
            return Err(MathError::Overflow("decimal conversion"));
        }
        let limbs = value.as_limbs();
        let mantissa = ((limbs[1] as i128) << 64) | limbs[0] as i128;
        RustDecimal::try_from_i128_with_scale(mantissa, scale)
            .map(Decimal)
            .map_err(|_| MathError::Overflow("decimal conversion"))
    }

    pub fn from_i64(value: i64) -> Self {
        Decimal(RustDecimal::from(value))
    }

    /// Format the Decimal as a canonical string (no exponent notation).
    pub fn to_canonical_string(&self) -> String {
        let normalized = self.0.normalize();
        format!("{}", normalized)
    }

    pub fn zero() -> Self {
        Decimal(RustDecimal::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, rhs: Decimal) -> Result<Decimal, MathError> {
        self.0
            .checked_add(rhs.0)
            .map(Decimal)
            .ok_or(MathError::Overflow("decimal add"))
    }

    pub fn checked_mul(self, rhs: Decimal) -> Result<Decimal, MathError> {
        self.0
            .checked_mul(rhs.0)
            .map(Decimal)
            .ok_or(MathError::Overflow("decimal mul"))
    }

    /// Division that yields zero for a zero divisor instead of panicking.
    pub fn div_or_zero(self, rhs: Decimal) -> Result<Decimal, MathError> {
        if rhs.is_zero() {
            return Ok(Decimal::zero());
        }
        self.0
            .checked_div(rhs.0)
            .map(Decimal)
            .ok_or(MathError::Overflow("decimal div"))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Decimal {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    #[test]
    fn test_from_units_applies_token_decimals() {
        let usdc = Decimal::from_units(U256::from(4_336_759_547u64), 6).unwrap();
        assert_eq!(usdc, d("4336.759547"));

        let weth = Decimal::from_units(U256::from(1_500_000_000_000_000_000u128), 18).unwrap();
        assert_eq!(weth, d("1.5"));
    }

    #[test]
    fn test_from_units_truncates_excess_precision() {
        // 40 significant digits cannot be represented; low digits are dropped.
        let units = U256::from_str_radix("1234567890123456789012345678901234567890", 10).unwrap();
        let value = Decimal::from_units(units, 18).unwrap();
        assert_eq!(value.to_canonical_string(), "1234567890123456789012.3456789");
    }

    #[test]
    fn test_from_units_overflow() {
        let err = Decimal::from_units(U256::MAX, 0).unwrap_err();
        assert_eq!(err, MathError::Overflow("decimal conversion"));
    }

    #[test]
    fn test_div_or_zero() {
        assert_eq!(d("10").div_or_zero(d("4")).unwrap(), d("2.5"));
        assert_eq!(d("10").div_or_zero(Decimal::zero()).unwrap(), Decimal::zero());
    }

    #[test]
    fn test_decimal_json_serialization() {
        let json = serde_json::to_value(d("12.5")).unwrap();
        assert!(json.is_number());
        assert_eq!(json.to_string(), "12.5");
    }
}
