//! Cross-venue event pairs produced by the matcher.

use crate::event::{MarketEvent, Venue};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Two listings, on different venues, accepted as the same real-world event.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct MatchedPair {
    /// Event from the source venue.
    pub event_a: MarketEvent,
    /// Event from the target venue, carrying `event_a`'s display name.
    pub event_b: MarketEvent,
    /// Name the target venue originally published for `event_b`.
    pub target_name: String,
    /// Similarity score at acceptance time, in `[0, 1]`.
    pub confidence: f64,
}

impl MatchedPair {
    /// Build a pair from the accepted target `candidate`.
    ///
    /// The candidate is copied with the source name backfilled; the
    /// venue-supplied record is left untouched.
    pub fn new(source: &MarketEvent, candidate: &MarketEvent, confidence: f64) -> Self {
        Self {
            event_a: source.clone(),
            event_b: candidate.with_name(source.name.clone()),
            target_name: candidate.name.clone(),
            confidence,
        }
    }

    /// Composite key identifying this pair across cycles.
    pub fn key(&self) -> PairKey {
        PairKey::new(&self.event_a, &self.event_b)
    }
}

/// Stable identifier of a matched pair built from both venues' event ids.
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Debug, Deserialize, Serialize)]
pub struct PairKey {
    pub venue_a: Venue,
    pub id_a: SmolStr,
    pub venue_b: Venue,
    pub id_b: SmolStr,
}

impl PairKey {
    pub fn new(event_a: &MarketEvent, event_b: &MarketEvent) -> Self {
        Self {
            venue_a: event_a.venue.clone(),
            id_a: event_a.id.clone(),
            venue_b: event_b.venue.clone(),
            id_b: event_b.id.clone(),
        }
    }
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}|{}:{}",
            self.venue_a, self.id_a, self.venue_b, self.id_b
        )
    }
}
