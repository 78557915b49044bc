//! JSON snapshot data source, used by the binary to run the engine over
//! facts captured elsewhere.

use super::{LedgerSource, PoolStateSource, PositionSource, SourceError};
use crate::domain::{
    sort_events_deterministic, LedgerEvent, NftCheckpoint, PoolState, PositionDescriptor,
    PositionId,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One position as captured in a snapshot file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPosition {
    pub descriptor: PositionDescriptor,
    pub pool_state: PoolState,
    /// `null` when the NFT has been burned.
    pub checkpoint: Option<NftCheckpoint>,
    #[serde(default)]
    pub events: Vec<LedgerEvent>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub positions: Vec<SnapshotPosition>,
}

#[derive(Debug, Clone, Default)]
pub struct FileDataSource {
    positions: BTreeMap<PositionId, SnapshotPosition>,
}

impl FileDataSource {
    /// Events are served in chain order whatever their order in the file.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            positions: snapshot
                .positions
                .into_iter()
                .map(|mut p| {
                    sort_events_deterministic(&mut p.events);
                    (p.descriptor.id, p)
                })
                .collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        let snapshot: Snapshot =
            serde_json::from_str(json).map_err(|e| SourceError::Parse(e.to_string()))?;
        Ok(Self::from_snapshot(snapshot))
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let json = tokio::fs::read_to_string(path.as_ref())
            .await
            .map_err(|e| SourceError::Other(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::from_json(&json)
    }

    /// Position ids in the snapshot, in (chain, token id) order.
    pub fn position_ids(&self) -> Vec<PositionId> {
        self.positions.keys().copied().collect()
    }

    fn get(&self, id: PositionId) -> Result<&SnapshotPosition, SourceError> {
        self.positions.get(&id).ok_or(SourceError::PositionNotFound)
    }
}

#[async_trait]
impl PositionSource for FileDataSource {
    async fn load_position(&self, id: PositionId) -> Result<PositionDescriptor, SourceError> {
        Ok(self.get(id)?.descriptor.clone())
    }

    async fn load_nft_checkpoint(&self, id: PositionId) -> Result<NftCheckpoint, SourceError> {
        self.get(id)?.checkpoint.ok_or(SourceError::InvalidNftId)
    }
}

#[async_trait]
impl PoolStateSource for FileDataSource {
    async fn refresh_pool_state(
        &self,
        position: &PositionDescriptor,
    ) -> Result<PoolState, SourceError> {
        Ok(self.get(position.id)?.pool_state.clone())
    }
}

#[async_trait]
impl LedgerSource for FileDataSource {
    async fn sync_ledger(&self, id: PositionId) -> Result<Vec<LedgerEvent>, SourceError> {
        self.load_events(id).await
    }

    async fn load_events(&self, id: PositionId) -> Result<Vec<LedgerEvent>, SourceError> {
        Ok(self.get(id)?.events.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "positions": [{
            "descriptor": {
                "id": { "chainId": 1, "tokenId": 42 },
                "base": { "address": "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", "decimals": 18, "symbol": "WETH" },
                "quote": { "address": "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", "decimals": 6, "symbol": "USDC" },
                "bounds": { "tickLower": -600, "tickUpper": 600 },
                "tickSpacing": 60
            },
            "poolState": {
                "snapshot": {
                    "currentTick": 0,
                    "sqrtPriceX96": "0x1000000000000000000000000",
                    "currentPrice": "0x3b9aca00",
                    "feeGrowthGlobal0X128": "0x0",
                    "feeGrowthGlobal1X128": "0x0",
                    "token0Decimals": 6,
                    "token1Decimals": 18
                },
                "lower": { "feeGrowthOutside0X128": "0x0", "feeGrowthOutside1X128": "0x0", "initialized": true },
                "upper": { "feeGrowthOutside0X128": "0x0", "feeGrowthOutside1X128": "0x0", "initialized": true }
            },
            "checkpoint": null
        }]
    }"#;

    #[tokio::test]
    async fn test_snapshot_parses_and_serves() {
        let source = FileDataSource::from_json(SNAPSHOT).unwrap();
        let id = PositionId::new(1, 42);
        assert_eq!(source.position_ids(), vec![id]);

        let descriptor = source.load_position(id).await.unwrap();
        assert_eq!(descriptor.quote.symbol, "USDC");
        assert!(descriptor.token0_is_quote());

        let state = source.refresh_pool_state(&descriptor).await.unwrap();
        assert_eq!(state.snapshot.current_tick, Some(0));
        assert_eq!(
            state.snapshot.current_price,
            Some(alloy_primitives::U256::from(1_000_000_000u64))
        );

        assert_eq!(
            source.load_nft_checkpoint(id).await,
            Err(SourceError::InvalidNftId)
        );
        assert!(source.sync_ledger(id).await.unwrap().is_empty());
    }

    #[test]
    fn test_malformed_snapshot_is_parse_error() {
        assert!(matches!(
            FileDataSource::from_json("{"),
            Err(SourceError::Parse(_))
        ));
    }
}
