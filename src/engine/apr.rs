//! Time-weighted APR over capital periods.
//!
//! The ledger is cut into periods of constant cost basis. Each collect's fee
//! value is spread over the periods its accrual span overlaps, weighted by
//! `overlap_ms * cost_basis`. APR per group of periods is then
//! `fees / (cost_basis * days) * 365 * 100`.

use crate::domain::{AprBreakdown, CapitalPeriod, EventOrderingKey, LedgerEvent, LedgerEventKind};
use crate::domain::{Decimal, PositionId, TimeMs};
use crate::engine::fixed_point::mul_div;
use crate::error::MathError;
use alloy_primitives::U256;

const DAYS_PER_YEAR_PERCENT: i64 = 36_500;

fn in_chain_order(events: &[LedgerEvent]) -> Vec<&LedgerEvent> {
    let mut ordered: Vec<&LedgerEvent> = events.iter().collect();
    ordered.sort_by_key(|e| EventOrderingKey::from_event(e));
    ordered
}

/// Cut the ledger into capital periods.
///
/// CREATE, INCREASE and DECREASE each end the running period at their
/// timestamp and open a new one at their `costBasisAfter`. CLOSE ends the
/// running period without opening another.
pub fn capital_periods(events: &[LedgerEvent]) -> Vec<CapitalPeriod> {
    let mut periods: Vec<CapitalPeriod> = Vec::new();
    for event in in_chain_order(events) {
        if event.kind.is_capital_change() || matches!(event.kind, LedgerEventKind::Close) {
            if let Some(open) = periods.last_mut().filter(|p| p.is_open()) {
                open.end = Some(event.timestamp);
            }
        }
        if event.kind.is_capital_change() {
            periods.push(CapitalPeriod {
                start: event.timestamp,
                end: None,
                cost_basis: event.cost_basis_after,
                allocated_fees: U256::ZERO,
            });
        }
    }
    periods
}

fn overlap_ms(period: &CapitalPeriod, from: TimeMs, to: TimeMs) -> i64 {
    let start = period.start.max(from);
    let end = period.end.map_or(to, |end| end.min(to));
    end.elapsed_since(start)
}

/// Index of the period a timestamp falls into, or the nearest earlier one.
fn containing_period(periods: &[CapitalPeriod], at: TimeMs) -> Option<usize> {
    periods
        .iter()
        .rposition(|p| p.start <= at)
        .or((!periods.is_empty()).then_some(0))
}

fn credit(period: &mut CapitalPeriod, fee: U256) -> Result<(), MathError> {
    period.allocated_fees = period
        .allocated_fees
        .checked_add(fee)
        .ok_or(MathError::Overflow("allocate_fees"))?;
    Ok(())
}

/// Spread every collect's `feeValueInQuote` over `periods`.
pub fn allocate_fees(
    periods: &mut [CapitalPeriod],
    events: &[LedgerEvent],
) -> Result<(), MathError> {
    let ordered = in_chain_order(events);
    let Some(first) = ordered.first() else {
        return Ok(());
    };
    let mut span_start = first.timestamp;

    for event in ordered {
        let LedgerEventKind::Collect {
            fee_value_in_quote, ..
        } = &event.kind
        else {
            continue;
        };
        let fee = *fee_value_in_quote;
        let span_end = event.timestamp;

        let weights: Vec<U256> = periods
            .iter()
            .map(|p| {
                let overlap = overlap_ms(p, span_start, span_end);
                p.cost_basis
                    .checked_mul(U256::from(overlap as u64))
                    .ok_or(MathError::Overflow("allocate_fees"))
            })
            .collect::<Result<_, _>>()?;
        let total = weights
            .iter()
            .try_fold(U256::ZERO, |acc, w| acc.checked_add(*w))
            .ok_or(MathError::Overflow("allocate_fees"))?;

        if total.is_zero() {
            if let Some(index) = containing_period(periods, span_end) {
                credit(&mut periods[index], fee)?;
            }
        } else {
            let mut distributed = U256::ZERO;
            let mut last_weighted = 0;
            for (index, weight) in weights.iter().enumerate() {
                if weight.is_zero() {
                    continue;
                }
                let share = mul_div(fee, *weight, total)?;
                credit(&mut periods[index], share)?;
                distributed = distributed
                    .checked_add(share)
                    .ok_or(MathError::Overflow("allocate_fees"))?;
                last_weighted = index;
            }
            // Shares are floored, so they never sum past `fee`.
            credit(&mut periods[last_weighted], fee.saturating_sub(distributed))?;
        }

        span_start = span_end;
    }
    Ok(())
}

fn days(ms: i64) -> Result<Decimal, MathError> {
    Decimal::from_i64(ms).div_or_zero(Decimal::from_i64(TimeMs::ms_per_day()))
}

/// `fees / (cost_basis * days) * 365 * 100`, with `weight` the sum of
/// `cost_basis * duration_ms` in smallest quote units.
///
/// Multiplies out the day length and the annualisation first so whole
/// results stay exact.
fn annualized(fees: U256, weight: U256, quote_decimals: u8) -> Result<Decimal, MathError> {
    if weight.is_zero() {
        return Ok(Decimal::zero());
    }
    let numerator = Decimal::from_units(fees, quote_decimals)?
        .checked_mul(Decimal::from_i64(DAYS_PER_YEAR_PERCENT))?
        .checked_mul(Decimal::from_i64(TimeMs::ms_per_day()))?;
    numerator.div_or_zero(Decimal::from_units(weight, quote_decimals)?)
}

#[derive(Default)]
struct Bucket {
    fees: U256,
    weight: U256,
    ms: i64,
}

impl Bucket {
    fn add(&mut self, period: &CapitalPeriod, as_of: TimeMs) -> Result<(), MathError> {
        self.fees = self
            .fees
            .checked_add(period.allocated_fees)
            .ok_or(MathError::Overflow("apr fees"))?;
        if period.is_weighted(as_of) {
            let duration = period.duration_ms(as_of);
            let weight = period
                .cost_basis
                .checked_mul(U256::from(duration as u64))
                .ok_or(MathError::Overflow("apr weight"))?;
            self.weight = self
                .weight
                .checked_add(weight)
                .ok_or(MathError::Overflow("apr weight"))?;
            self.ms = self
                .ms
                .checked_add(duration)
                .ok_or(MathError::Overflow("apr duration"))?;
        }
        Ok(())
    }
}

/// APR breakdown of one position as of `as_of`.
///
/// `unclaimed_fees` (smallest quote units) is credited to the open period.
/// A closed position has no open period, so its total APR is its realized
/// APR.
pub fn compute_apr(
    position_id: PositionId,
    events: &[LedgerEvent],
    unclaimed_fees: U256,
    quote_decimals: u8,
    as_of: TimeMs,
) -> Result<AprBreakdown, MathError> {
    let mut periods = capital_periods(events);
    allocate_fees(&mut periods, events)?;

    let mut realized = Bucket::default();
    let mut unrealized = Bucket {
        fees: unclaimed_fees,
        ..Bucket::default()
    };
    for period in &periods {
        if period.is_open() {
            unrealized.add(period, as_of)?;
        } else {
            realized.add(period, as_of)?;
        }
    }

    let realized_apr = annualized(realized.fees, realized.weight, quote_decimals)?;
    let unrealized_apr = annualized(unrealized.fees, unrealized.weight, quote_decimals)?;
    let realized_active_days = days(realized.ms)?;
    let unrealized_active_days = days(unrealized.ms)?;
    let total_ms = realized
        .ms
        .checked_add(unrealized.ms)
        .ok_or(MathError::Overflow("apr duration"))?;
    let total_active_days = days(total_ms)?;

    let total_apr = if unrealized.ms == 0 {
        realized_apr
    } else if realized.ms == 0 {
        unrealized_apr
    } else {
        realized_apr
            .checked_mul(realized_active_days)?
            .checked_add(unrealized_apr.checked_mul(unrealized_active_days)?)?
            .div_or_zero(total_active_days)?
    };

    Ok(AprBreakdown {
        position_id,
        realized_apr,
        unrealized_apr,
        total_apr,
        realized_active_days,
        unrealized_active_days,
        total_active_days,
        realized_fees: realized.fees,
        unrealized_fees: unrealized.fees,
        periods,
        as_of,
    })
}
