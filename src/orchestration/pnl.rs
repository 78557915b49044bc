use crate::cache::PnlCache;
use crate::datasource::{LedgerSource, PoolStateSource, PositionSource, SourceError};
use crate::domain::{
    AprBreakdown, PnlBreakdown, PoolState, PositionDescriptor, PositionId, TimeMs,
};
use crate::engine::{
    compute_apr, current_value, fee_growth_inside, quote_value_of, to_signed, unclaimed_fees,
    CostBasisLedger, LedgerSummary, PositionValue, TokenAmounts, UnclaimedFees,
};
use crate::error::{EngineError, MathError};
use alloy_primitives::U256;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Computes and memoizes PnL and APR for liquidity positions.
///
/// Collaborators are injected; the engine itself holds no chain or ledger
/// state beyond what the cache store keeps.
#[derive(Clone)]
pub struct PnlEngine {
    positions: Arc<dyn PositionSource>,
    pools: Arc<dyn PoolStateSource>,
    ledger: Arc<dyn LedgerSource>,
    cache: Arc<dyn PnlCache>,
}

impl PnlEngine {
    pub fn new(
        positions: Arc<dyn PositionSource>,
        pools: Arc<dyn PoolStateSource>,
        ledger: Arc<dyn LedgerSource>,
        cache: Arc<dyn PnlCache>,
    ) -> Self {
        Self {
            positions,
            pools,
            ledger,
            cache,
        }
    }

    /// PnL of a position, served from the cache while the entry is valid.
    pub async fn get_pnl_breakdown(&self, id: PositionId) -> Result<PnlBreakdown, EngineError> {
        if let Some(cached) = self.cache.get(id).await? {
            debug!(position = %id, "PnL cache hit");
            return Ok(cached);
        }
        debug!(position = %id, "PnL cache miss, recomputing");

        let source_err = |e: SourceError| EngineError::from_source(id, e);
        let position = self.positions.load_position(id).await.map_err(source_err)?;
        let pool = self
            .pools
            .refresh_pool_state(&position)
            .await
            .map_err(source_err)?;
        debug!(
            position = %id,
            current_tick = ?pool.snapshot.current_tick,
            "Pool state refreshed"
        );
        let events = self.ledger.sync_ledger(id).await.map_err(source_err)?;
        let ledger = CostBasisLedger::new(&events);

        let (value, summary, fees) = futures::join!(
            self.position_value(&position, &pool, &ledger),
            async { ledger.summary().map_err(EngineError::from) },
            self.unclaimed_fees(&position, &pool, &ledger),
        );
        let (value, summary, fees) = (value?, summary?, fees?);

        let breakdown = assemble(id, value, &summary, fees)?;
        self.cache.put(&breakdown).await?;
        info!(
            position = %id,
            total_pnl = breakdown.total_pnl,
            nft_burned = breakdown.nft_burned,
            "Computed PnL"
        );
        Ok(breakdown)
    }

    /// Drop the memoized breakdown so the next read recomputes it.
    pub async fn invalidate_cache(&self, id: PositionId) -> Result<(), EngineError> {
        self.cache.invalidate(id).await?;
        info!(position = %id, "PnL cache invalidated");
        Ok(())
    }

    /// APR as of now. `unclaimed_override` (smallest quote units) replaces the
    /// unclaimed fee value otherwise taken from the PnL breakdown.
    pub async fn get_apr_breakdown(
        &self,
        id: PositionId,
        unclaimed_override: Option<U256>,
    ) -> Result<AprBreakdown, EngineError> {
        self.get_apr_breakdown_at(id, unclaimed_override, TimeMs::now())
            .await
    }

    pub async fn get_apr_breakdown_at(
        &self,
        id: PositionId,
        unclaimed_override: Option<U256>,
        as_of: TimeMs,
    ) -> Result<AprBreakdown, EngineError> {
        let source_err = |e: SourceError| EngineError::from_source(id, e);
        let position = self.positions.load_position(id).await.map_err(source_err)?;
        let unclaimed = match unclaimed_override {
            Some(value) => value,
            None => self.get_pnl_breakdown(id).await?.unclaimed_fees,
        };
        let events = self.ledger.load_events(id).await.map_err(source_err)?;

        Ok(compute_apr(
            id,
            &events,
            unclaimed,
            position.quote.decimals,
            as_of,
        )?)
    }

    async fn position_value(
        &self,
        position: &PositionDescriptor,
        pool: &PoolState,
        ledger: &CostBasisLedger<'_>,
    ) -> Result<PositionValue, EngineError> {
        let tick = pool.snapshot.require_tick(position.id)?;
        let price = pool.snapshot.require_price(position.id)?;
        Ok(current_value(
            ledger.current_liquidity()?,
            tick,
            position.bounds.tick_lower,
            position.bounds.tick_upper,
            price,
            position.base.decimals,
            position.token0_is_quote(),
        )?)
    }

    async fn unclaimed_fees(
        &self,
        position: &PositionDescriptor,
        pool: &PoolState,
        ledger: &CostBasisLedger<'_>,
    ) -> Result<(UnclaimedFees, U256), EngineError> {
        let checkpoint = match self.positions.load_nft_checkpoint(position.id).await {
            Ok(checkpoint) => checkpoint,
            Err(SourceError::InvalidNftId) => {
                warn!(
                    position = %position.id,
                    "NFT no longer exists, reporting zero unclaimed fees"
                );
                return Ok((UnclaimedFees::burned(), U256::ZERO));
            }
            Err(e) => return Err(EngineError::from_source(position.id, e)),
        };

        let tick = pool.snapshot.require_tick(position.id)?;
        let price = pool.snapshot.require_price(position.id)?;
        let inside = fee_growth_inside(
            tick,
            position.bounds.tick_lower,
            position.bounds.tick_upper,
            pool.snapshot.fee_growth_global0_x128,
            pool.snapshot.fee_growth_global1_x128,
            &pool.lower,
            &pool.upper,
        );
        let fees = unclaimed_fees(&checkpoint, inside, ledger.latest_uncollected_principal())?;
        let value = quote_value_of(
            TokenAmounts::new(fees.fee0, fees.fee1),
            price,
            position.base.decimals,
            position.token0_is_quote(),
        )?;
        Ok((fees, value))
    }
}

fn assemble(
    id: PositionId,
    value: PositionValue,
    summary: &LedgerSummary,
    (fees, fee_value): (UnclaimedFees, U256),
) -> Result<PnlBreakdown, EngineError> {
    let overflow = || MathError::Overflow("pnl");
    let unrealized_pnl = to_signed(value.value, "current value")?
        .checked_sub(to_signed(summary.cost_basis, "cost basis")?)
        .ok_or_else(overflow)?;
    let collected = to_signed(summary.collected_fees, "collected fees")?;
    let unclaimed = to_signed(fee_value, "unclaimed fees")?;
    let total_pnl = unrealized_pnl
        .checked_add(collected)
        .and_then(|sum| sum.checked_add(unclaimed))
        .ok_or_else(overflow)?;

    Ok(PnlBreakdown {
        position_id: id,
        current_value: value.value,
        base_amount: value.base_amount,
        quote_amount: value.quote_amount,
        current_cost_basis: summary.cost_basis,
        collected_fees: summary.collected_fees,
        unclaimed_fees: fee_value,
        unclaimed_fee0: fees.fee0,
        unclaimed_fee1: fees.fee1,
        realized_pnl: summary.realized_pnl,
        unrealized_pnl,
        total_pnl,
        nft_burned: fees.nft_burned,
        computed_at: TimeMs::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(cost_basis: u64, collected: u64) -> LedgerSummary {
        LedgerSummary {
            cost_basis: U256::from(cost_basis),
            collected_fees: U256::from(collected),
            realized_pnl: 7,
            ..Default::default()
        }
    }

    fn value(v: u64) -> PositionValue {
        PositionValue {
            base_amount: U256::ZERO,
            quote_amount: U256::from(v),
            value: U256::from(v),
        }
    }

    #[test]
    fn test_total_includes_collected_and_unclaimed() {
        let fees = UnclaimedFees {
            fee0: U256::from(30u64),
            fee1: U256::ZERO,
            nft_burned: false,
        };
        let breakdown = assemble(
            PositionId::new(1, 1),
            value(900),
            &summary(1_000, 50),
            (fees, U256::from(30u64)),
        )
        .unwrap();
        assert_eq!(breakdown.unrealized_pnl, -100);
        assert_eq!(breakdown.total_pnl, -100 + 50 + 30);
        assert_eq!(breakdown.realized_pnl, 7);
        assert!(!breakdown.nft_burned);
    }

    #[test]
    fn test_burned_fees_flagged() {
        let breakdown = assemble(
            PositionId::new(1, 1),
            value(1_000),
            &summary(1_000, 0),
            (UnclaimedFees::burned(), U256::ZERO),
        )
        .unwrap();
        assert!(breakdown.nft_burned);
        assert_eq!(breakdown.total_pnl, 0);
    }

    #[test]
    fn test_oversized_value_is_overflow() {
        let huge = PositionValue {
            value: U256::MAX,
            ..Default::default()
        };
        let err = assemble(
            PositionId::new(1, 1),
            huge,
            &summary(0, 0),
            (UnclaimedFees::default(), U256::ZERO),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Math(MathError::Overflow("current value"))
        ));
    }
}
