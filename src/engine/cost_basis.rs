//! Read-only fold over a position's ledger.
//!
//! The ledger carries running totals on every event, so "current" figures are
//! read off the latest event in chain order rather than recomputed.

use crate::domain::{latest_event, EventOrderingKey, LedgerEvent, LedgerEventKind, TimeMs};
use crate::error::MathError;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Everything the PnL engine needs from the ledger in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub cost_basis: U256,
    pub realized_pnl: i128,
    pub uncollected_principal0: U256,
    pub uncollected_principal1: U256,
    pub collected_fees: U256,
    pub liquidity: U256,
    pub closed: bool,
    pub first_event_time: Option<TimeMs>,
}

#[derive(Debug, Clone, Copy)]
pub struct CostBasisLedger<'a> {
    events: &'a [LedgerEvent],
}

impl<'a> CostBasisLedger<'a> {
    /// Events may be in any order; chain order is derived from their keys.
    pub fn new(events: &'a [LedgerEvent]) -> Self {
        Self { events }
    }

    fn latest(&self) -> Option<&'a LedgerEvent> {
        latest_event(self.events)
    }

    fn in_chain_order(&self) -> Vec<&'a LedgerEvent> {
        let mut ordered: Vec<&LedgerEvent> = self.events.iter().collect();
        ordered.sort_by_key(|e| EventOrderingKey::from_event(e));
        ordered
    }

    pub fn latest_cost_basis(&self) -> U256 {
        self.latest()
            .map(|e| e.cost_basis_after)
            .unwrap_or(U256::ZERO)
    }

    pub fn latest_realized_pnl(&self) -> i128 {
        self.latest().map(|e| e.realized_pnl_after).unwrap_or(0)
    }

    /// Principal removed by decreases and still sitting in `tokensOwed`.
    pub fn latest_uncollected_principal(&self) -> (U256, U256) {
        self.latest()
            .map(|e| (e.uncollected_principal0_after, e.uncollected_principal1_after))
            .unwrap_or((U256::ZERO, U256::ZERO))
    }

    /// Sum of `feeValueInQuote` over all collects.
    pub fn total_collected_fee_value(&self) -> Result<U256, MathError> {
        self.events
            .iter()
            .filter_map(|e| match &e.kind {
                LedgerEventKind::Collect {
                    fee_value_in_quote, ..
                } => Some(*fee_value_in_quote),
                _ => None,
            })
            .try_fold(U256::ZERO, |acc, fee| {
                acc.checked_add(fee)
                    .ok_or(MathError::Overflow("total_collected_fee_value"))
            })
    }

    /// Liquidity after replaying the ledger; zero once closed.
    pub fn current_liquidity(&self) -> Result<U256, MathError> {
        let mut liquidity = U256::ZERO;
        for event in self.in_chain_order() {
            match &event.kind {
                LedgerEventKind::Create { liquidity: added, .. }
                | LedgerEventKind::Increase { liquidity: added, .. } => {
                    liquidity = liquidity
                        .checked_add(*added)
                        .ok_or(MathError::Overflow("current_liquidity"))?;
                }
                LedgerEventKind::Decrease { liquidity: removed, .. } => {
                    liquidity = liquidity.saturating_sub(*removed);
                }
                LedgerEventKind::Close => liquidity = U256::ZERO,
                LedgerEventKind::Collect { .. } => {}
            }
        }
        Ok(liquidity)
    }

    pub fn is_closed(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e.kind, LedgerEventKind::Close))
    }

    pub fn first_event_time(&self) -> Option<TimeMs> {
        self.events
            .iter()
            .min_by_key(|e| EventOrderingKey::from_event(e))
            .map(|e| e.timestamp)
    }

    pub fn summary(&self) -> Result<LedgerSummary, MathError> {
        let (uncollected_principal0, uncollected_principal1) = self.latest_uncollected_principal();
        Ok(LedgerSummary {
            cost_basis: self.latest_cost_basis(),
            realized_pnl: self.latest_realized_pnl(),
            uncollected_principal0,
            uncollected_principal1,
            collected_fees: self.total_collected_fee_value()?,
            liquidity: self.current_liquidity()?,
            closed: self.is_closed(),
            first_event_time: self.first_event_time(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(v: u64) -> U256 {
        U256::from(v)
    }

    fn create(block: u64, liquidity: u64, cost_basis: u64) -> LedgerEvent {
        LedgerEvent::new(
            block,
            0,
            0,
            TimeMs::from_days(block as i64),
            LedgerEventKind::Create {
                liquidity: u(liquidity),
                amount0: u(0),
                amount1: u(0),
            },
        )
        .with_cost_basis(u(cost_basis))
    }

    fn collect(block: u64, fee_value: u64, cost_basis: u64) -> LedgerEvent {
        LedgerEvent::new(
            block,
            0,
            0,
            TimeMs::from_days(block as i64),
            LedgerEventKind::Collect {
                amount0: u(0),
                amount1: u(0),
                fee0: u(0),
                fee1: u(0),
                fee_value_in_quote: u(fee_value),
            },
        )
        .with_cost_basis(u(cost_basis))
    }

    fn decrease(block: u64, liquidity: u64, cost_basis: u64, pnl: i128) -> LedgerEvent {
        LedgerEvent::new(
            block,
            0,
            0,
            TimeMs::from_days(block as i64),
            LedgerEventKind::Decrease {
                liquidity: u(liquidity),
                amount0: u(0),
                amount1: u(0),
            },
        )
        .with_cost_basis(u(cost_basis))
        .with_realized_pnl(pnl)
        .with_uncollected_principal(u(400), u(7))
    }

    #[test]
    fn test_empty_ledger_is_zero() {
        let ledger = CostBasisLedger::new(&[]);
        assert_eq!(ledger.latest_cost_basis(), U256::ZERO);
        assert_eq!(ledger.latest_realized_pnl(), 0);
        assert_eq!(ledger.latest_uncollected_principal(), (U256::ZERO, U256::ZERO));
        assert_eq!(ledger.total_collected_fee_value().unwrap(), U256::ZERO);
        assert_eq!(ledger.first_event_time(), None);
        assert!(!ledger.is_closed());
    }

    #[test]
    fn test_latest_follows_chain_order_not_slice_order() {
        let events = vec![
            decrease(30, 400, 600, -25),
            create(10, 1_000, 1_000),
            collect(20, 50, 1_000),
        ];
        let ledger = CostBasisLedger::new(&events);
        assert_eq!(ledger.latest_cost_basis(), u(600));
        assert_eq!(ledger.latest_realized_pnl(), -25);
        assert_eq!(ledger.latest_uncollected_principal(), (u(400), u(7)));
        assert_eq!(ledger.first_event_time(), Some(TimeMs::from_days(10)));
        assert_eq!(ledger.current_liquidity().unwrap(), u(600));
    }

    #[test]
    fn test_same_block_ordered_by_log_index() {
        let mut later = create(10, 1, 111);
        later.log_index = 3;
        let mut earlier = create(10, 1, 222);
        earlier.log_index = 1;
        let events = vec![later, earlier];
        assert_eq!(CostBasisLedger::new(&events).latest_cost_basis(), u(111));
    }

    #[test]
    fn test_collected_fees_sum_only_collects() {
        let events = vec![
            create(1, 1_000, 1_000),
            collect(2, 50, 1_000),
            collect(3, 70, 1_000),
        ];
        assert_eq!(
            CostBasisLedger::new(&events).total_collected_fee_value().unwrap(),
            u(120)
        );
    }

    #[test]
    fn test_close_zeroes_liquidity() {
        let events = vec![
            create(1, 1_000, 1_000),
            LedgerEvent::new(2, 0, 0, TimeMs::from_days(2), LedgerEventKind::Close),
        ];
        let ledger = CostBasisLedger::new(&events);
        let summary = ledger.summary().unwrap();
        assert!(summary.closed);
        assert_eq!(summary.liquidity, U256::ZERO);
        assert_eq!(summary.cost_basis, U256::ZERO);
    }
}
