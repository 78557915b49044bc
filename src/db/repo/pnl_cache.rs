//! `PnlCache` backed by the `pnl_cache` table.

use crate::cache::{CacheError, PnlCache};
use crate::domain::{PnlBreakdown, PositionId};
use async_trait::async_trait;
use sqlx::Row;
use tracing::debug;

use super::Repository;

#[async_trait]
impl PnlCache for Repository {
    async fn get(&self, id: PositionId) -> Result<Option<PnlBreakdown>, CacheError> {
        let row = sqlx::query(
            r#"
            SELECT breakdown_json FROM pnl_cache
            WHERE position_key = ? AND is_valid = 1
            "#,
        )
        .bind(id.cache_key())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let json: String = row.get("breakdown_json");
                Ok(Some(serde_json::from_str(&json)?))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, breakdown: &PnlBreakdown) -> Result<(), CacheError> {
        let id = breakdown.position_id;
        let json = serde_json::to_string(breakdown)?;
        sqlx::query(
            r#"
            INSERT INTO pnl_cache (position_key, chain_id, token_id, breakdown_json, is_valid, updated_at_ms)
            VALUES (?, ?, ?, ?, 1, ?)
            ON CONFLICT(position_key) DO UPDATE SET
                breakdown_json = excluded.breakdown_json,
                is_valid = 1,
                updated_at_ms = excluded.updated_at_ms
            "#,
        )
        .bind(id.cache_key())
        .bind(id.chain_id as i64)
        .bind(id.token_id as i64)
        .bind(json)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn invalidate(&self, id: PositionId) -> Result<(), CacheError> {
        let result = sqlx::query("UPDATE pnl_cache SET is_valid = 0 WHERE position_key = ?")
            .bind(id.cache_key())
            .execute(&self.pool)
            .await?;
        debug!(
            position = %id,
            rows = result.rows_affected(),
            "Invalidated cached PnL"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use crate::domain::TimeMs;
    use alloy_primitives::U256;
    use tempfile::TempDir;

    async fn repo(dir: &TempDir) -> Repository {
        let path = dir.path().join("cache.db").to_string_lossy().to_string();
        Repository::new(init_db(&path).await.expect("init_db failed"))
    }

    fn breakdown(id: PositionId, value: u64) -> PnlBreakdown {
        PnlBreakdown {
            position_id: id,
            current_value: U256::from(value),
            base_amount: U256::from(10u64).pow(U256::from(18u64)),
            quote_amount: U256::from(2_500_000u64),
            current_cost_basis: U256::from(900u64),
            collected_fees: U256::from(10u64),
            unclaimed_fees: U256::from(5u64),
            unclaimed_fee0: U256::from(5u64),
            unclaimed_fee1: U256::ZERO,
            realized_pnl: -123_456_789_012_345_678_901_234,
            unrealized_pnl: -100,
            total_pnl: -85,
            nft_burned: false,
            computed_at: TimeMs::new(1_700_000_000_000),
        }
    }

    #[tokio::test]
    async fn test_roundtrip_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir).await;
        let id = PositionId::new(42161, 7);
        let stored = breakdown(id, 1_000);

        repo.put(&stored).await.unwrap();
        let loaded = repo.get(id).await.unwrap().expect("entry missing");
        assert_eq!(loaded, stored);
        assert_eq!(
            serde_json::to_string(&loaded).unwrap(),
            serde_json::to_string(&stored).unwrap()
        );
    }

    #[tokio::test]
    async fn test_invalidate_then_upsert_revalidates() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir).await;
        let id = PositionId::new(1, 1);

        repo.put(&breakdown(id, 1_000)).await.unwrap();
        repo.invalidate(id).await.unwrap();
        assert_eq!(repo.get(id).await.unwrap(), None);

        repo.put(&breakdown(id, 2_000)).await.unwrap();
        let loaded = repo.get(id).await.unwrap().unwrap();
        assert_eq!(loaded.current_value, U256::from(2_000u64));

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pnl_cache")
            .fetch_one(repo.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_missing_entry() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir).await;
        assert_eq!(repo.get(PositionId::new(1, 404)).await.unwrap(), None);
        repo.invalidate(PositionId::new(1, 404)).await.unwrap();
    }
}
