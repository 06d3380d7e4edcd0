//! Guard against acting twice on the same matched pair.

use crate::correlation::PairKey;
use fnv::FnvHashSet;

/// Set of pairs that already produced an executed opportunity.
///
/// Entries live for the lifetime of the process; nothing is evicted.
#[derive(Debug, Clone, Default)]
pub struct DedupGuard {
    seen: FnvHashSet<PairKey>,
}

impl DedupGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` has already been handed to execution.
    pub fn seen(&self, key: &PairKey) -> bool {
        self.seen.contains(key)
    }

    /// Record `key` as handed to execution. Returns `false` if it was already present.
    pub fn mark(&mut self, key: PairKey) -> bool {
        self.seen.insert(key)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::MarketEvent;
    use rust_decimal_macros::dec;

    fn key(id_a: &str, id_b: &str) -> PairKey {
        let a = MarketEvent::new(id_a, "azuro", "A vs B", "football", 0, vec![dec!(2)]);
        let b = MarketEvent::new(id_b, "overtime", "A vs B", "football", 0, vec![dec!(2)]);
        PairKey::new(&a, &b)
    }

    #[test]
    fn test_mark_then_seen() {
        let mut guard = DedupGuard::new();
        assert!(guard.is_empty());
        assert!(!guard.seen(&key("1", "2")));

        assert!(guard.mark(key("1", "2")));
        assert!(guard.seen(&key("1", "2")));
        assert_eq!(guard.len(), 1);
    }

    #[test]
    fn test_mark_is_idempotent() {
        let mut guard = DedupGuard::new();
        assert!(guard.mark(key("1", "2")));
        assert!(!guard.mark(key("1", "2")));
        assert_eq!(guard.len(), 1);
    }

    #[test]
    fn test_keys_are_composite() {
        let mut guard = DedupGuard::new();
        guard.mark(key("1", "2"));

        assert!(!guard.seen(&key("1", "3")));
        assert!(!guard.seen(&key("2", "1")));
    }
}
