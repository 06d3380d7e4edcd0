//! Per-sport partitioning of one venue's event list.
//!
//! Matching only compares events that share a sport key, cutting the search
//! space from `A × B` to roughly `A × B / S` for `S` distinct sports.

use crate::event::{sport_key, MarketEvent};
use indexmap::IndexMap;
use smol_str::SmolStr;

/// Events of one venue grouped by lower-cased sport label.
///
/// Buckets appear in first-seen order and keep the input order of their
/// events. The index is rebuilt from scratch every cycle.
#[derive(Debug, Clone, Default)]
pub struct SportBucketIndex {
    buckets: IndexMap<SmolStr, Vec<MarketEvent>>,
}

impl SportBucketIndex {
    /// Partition `events` by [`MarketEvent::sport_key`].
    pub fn build(events: impl IntoIterator<Item = MarketEvent>) -> Self {
        let mut buckets: IndexMap<SmolStr, Vec<MarketEvent>> = IndexMap::new();
        for event in events {
            buckets.entry(event.sport_key()).or_default().push(event);
        }
        Self { buckets }
    }

    /// Events listed under `sport` (any casing), empty if the sport is absent.
    pub fn bucket(&self, sport: &str) -> &[MarketEvent] {
        self.buckets
            .get(sport_key(sport).as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Sport keys in first-seen order.
    pub fn sports(&self) -> impl Iterator<Item = &SmolStr> {
        self.buckets.keys()
    }

    /// Number of distinct sports.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of indexed events.
    pub fn event_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn event(id: &str, sport: &str) -> MarketEvent {
        MarketEvent::new(id, "overtime", format!("event {id}"), sport, 0, vec![dec!(2)])
    }

    #[test]
    fn test_build_groups_case_insensitively() {
        let index = SportBucketIndex::build(vec![
            event("1", "Football"),
            event("2", "basketball"),
            event("3", "FOOTBALL"),
        ]);

        assert_eq!(index.len(), 2);
        assert_eq!(index.event_count(), 3);

        let ids: Vec<_> = index.bucket("football").iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_bucket_lookup_uses_same_key_rules() {
        let index = SportBucketIndex::build(vec![event("1", "Tennis")]);
        assert_eq!(index.bucket(" TENNIS ").len(), 1);
        assert!(index.bucket("hockey").is_empty());
    }

    #[test]
    fn test_blank_sport_lands_in_unknown() {
        let index = SportBucketIndex::build(vec![event("1", ""), event("2", "  ")]);
        assert_eq!(index.bucket("unknown").len(), 2);
        assert_eq!(index.bucket("").len(), 2);
    }

    #[test]
    fn test_sports_in_first_seen_order() {
        let index = SportBucketIndex::build(vec![
            event("1", "mma"),
            event("2", "cricket"),
            event("3", "mma"),
        ]);
        let sports: Vec<_> = index.sports().map(SmolStr::as_str).collect();
        assert_eq!(sports, vec!["mma", "cricket"]);
    }

    #[test]
    fn test_empty_index() {
        let index = SportBucketIndex::default();
        assert!(index.is_empty());
        assert!(index.bucket("football").is_empty());
    }
}
