//! Domain primitives: TimeMs, PositionId, TokenInfo.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

const MS_PER_DAY: i64 = 86_400_000;

/// Time in milliseconds since Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeMs(pub i64);

impl TimeMs {
    /// Create a TimeMs from milliseconds.
    pub fn new(ms: i64) -> Self {
        TimeMs(ms)
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        TimeMs(chrono::Utc::now().timestamp_millis())
    }

    /// Get the underlying milliseconds value.
    pub fn as_ms(&self) -> i64 {
        self.0
    }

    /// Milliseconds elapsed from `earlier` to `self`, floored at zero.
    pub fn elapsed_since(&self, earlier: TimeMs) -> i64 {
        (self.0 - earlier.0).max(0)
    }

    /// Build a TimeMs from whole days, mostly useful in tests and fixtures.
    pub fn from_days(days: i64) -> Self {
        TimeMs(days * MS_PER_DAY)
    }

    pub fn ms_per_day() -> i64 {
        MS_PER_DAY
    }
}

/// Identity of a liquidity position: the chain and the position-manager NFT id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionId {
    pub chain_id: u64,
    pub token_id: u64,
}

impl PositionId {
    pub fn new(chain_id: u64, token_id: u64) -> Self {
        Self { chain_id, token_id }
    }

    /// Stable key used by cache stores.
    pub fn cache_key(&self) -> String {
        format!("{}:{}", self.chain_id, self.token_id)
    }
}

impl std::fmt::Display for PositionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.chain_id, self.token_id)
    }
}

/// ERC-20 token metadata needed by the accounting math.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: Address,
    pub decimals: u8,
    pub symbol: String,
}

impl TokenInfo {
    pub fn new(address: Address, decimals: u8, symbol: impl Into<String>) -> Self {
        Self {
            address,
            decimals,
            symbol: symbol.into(),
        }
    }
}

/// Returns true when `a` sorts as token0 against `b`.
///
/// Addresses compare as 160-bit big-endian integers, which is what the
/// byte-wise ordering of `Address` gives.
pub fn is_token0(a: &Address, b: &Address) -> bool {
    a < b
}

/// Order two addresses as (token0, token1).
pub fn sort_tokens(a: Address, b: Address) -> (Address, Address) {
    if is_token0(&a, &b) {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_position_id_display_and_key() {
        let id = PositionId::new(42161, 123456);
        assert_eq!(id.to_string(), "42161:123456");
        assert_eq!(id.cache_key(), "42161:123456");
    }

    #[test]
    fn test_position_id_serialization() {
        let id = PositionId::new(1, 7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#"{"chainId":1,"tokenId":7}"#);
    }

    #[test]
    fn test_timems_elapsed_floors_at_zero() {
        let t1 = TimeMs::new(1000);
        let t2 = TimeMs::new(4000);
        assert_eq!(t2.elapsed_since(t1), 3000);
        assert_eq!(t1.elapsed_since(t2), 0);
    }

    #[test]
    fn test_token_ordering_is_numeric() {
        let usdc = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
        let weth = address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
        assert!(is_token0(&usdc, &weth));
        assert!(!is_token0(&weth, &usdc));
        assert_eq!(sort_tokens(weth, usdc), (usdc, weth));
        assert_eq!(sort_tokens(usdc, weth), (usdc, weth));
    }

    #[test]
    fn test_timems_ordering() {
        let t1 = TimeMs::new(1000);
        let t2 = TimeMs::new(2000);
        assert!(t1 < t2);
    }
}
