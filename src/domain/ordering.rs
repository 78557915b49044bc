//! Stable ledger event ordering for deterministic processing.

use crate::domain::LedgerEvent;

/// Stable ordering key for ledger events.
///
/// Ordering: block_number -> tx_index -> log_index, i.e. chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventOrderingKey {
    pub block_number: u64,
    pub tx_index: u32,
    pub log_index: u32,
}

impl EventOrderingKey {
    pub fn from_event(event: &LedgerEvent) -> Self {
        EventOrderingKey {
            block_number: event.block_number,
            tx_index: event.tx_index,
            log_index: event.log_index,
        }
    }

    /// Returns true if `event_a` happened before `event_b` on chain.
    pub fn should_come_before(event_a: &LedgerEvent, event_b: &LedgerEvent) -> bool {
        Self::from_event(event_a) < Self::from_event(event_b)
    }
}

/// Sort events into chain order.
pub fn sort_events_deterministic(events: &mut [LedgerEvent]) {
    events.sort_by_key(EventOrderingKey::from_event);
}

/// The event with the greatest ordering key, regardless of slice order.
pub fn latest_event(events: &[LedgerEvent]) -> Option<&LedgerEvent> {
    events.iter().max_by_key(|e| EventOrderingKey::from_event(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LedgerEventKind, TimeMs};

    fn make_event(block: u64, tx: u32, log: u32) -> LedgerEvent {
        LedgerEvent::new(block, tx, log, TimeMs::new(block as i64 * 12_000), LedgerEventKind::Close)
    }

    #[test]
    fn test_event_ordering_by_block() {
        let a = make_event(10, 5, 5);
        let b = make_event(11, 0, 0);
        assert!(EventOrderingKey::should_come_before(&a, &b));
        assert!(!EventOrderingKey::should_come_before(&b, &a));
    }

    #[test]
    fn test_event_ordering_same_block_by_tx_then_log() {
        let a = make_event(10, 1, 9);
        let b = make_event(10, 2, 0);
        let c = make_event(10, 2, 1);
        assert!(EventOrderingKey::should_come_before(&a, &b));
        assert!(EventOrderingKey::should_come_before(&b, &c));
    }

    #[test]
    fn test_sort_events_deterministic() {
        let mut events = vec![make_event(12, 0, 0), make_event(10, 3, 1), make_event(10, 3, 0)];
        sort_events_deterministic(&mut events);

        let keys: Vec<_> = events.iter().map(EventOrderingKey::from_event).collect();
        assert_eq!(
            keys,
            vec![
                EventOrderingKey { block_number: 10, tx_index: 3, log_index: 0 },
                EventOrderingKey { block_number: 10, tx_index: 3, log_index: 1 },
                EventOrderingKey { block_number: 12, tx_index: 0, log_index: 0 },
            ]
        );
    }

    #[test]
    fn test_latest_event_ignores_slice_order() {
        let events = vec![make_event(12, 0, 0), make_event(15, 1, 2), make_event(13, 0, 0)];
        let latest = latest_event(&events).unwrap();
        assert_eq!(latest.block_number, 15);
        assert!(latest_event(&[]).is_none());
    }
}
