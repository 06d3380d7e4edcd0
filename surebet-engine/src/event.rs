//! Venue-scoped market events as delivered by the discovery fetchers.

use chrono::{DateTime, Utc};
use derive_more::{Display, From};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Bucket key used for events that carry no sport label.
pub const UNKNOWN_SPORT: &str = "unknown";

/// Tag identifying the venue an event or quote came from (e.g. "azuro", "overtime").
#[derive(
    Clone, Debug, Display, From, Hash, Eq, PartialEq, Ord, PartialOrd, Deserialize, Serialize,
)]
pub struct Venue(pub SmolStr);

impl From<&str> for Venue {
    fn from(name: &str) -> Self {
        Self(SmolStr::new(name))
    }
}

impl From<String> for Venue {
    fn from(name: String) -> Self {
        Self(SmolStr::from(name))
    }
}

impl Venue {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// One tradeable event listed at one venue.
///
/// Created fresh every discovery cycle. The core never mutates a received
/// record; the matcher emits corrected copies instead.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct MarketEvent {
    /// Venue-scoped opaque identifier, never parsed by the engine.
    pub id: SmolStr,
    /// Venue that listed the event.
    pub venue: Venue,
    /// Venue-supplied display name (e.g. "Team A vs Team B").
    pub name: String,
    /// Free-text sport label, compared case-insensitively.
    pub sport: SmolStr,
    /// Event start. `None` means the venue delivered a malformed record.
    pub start_time: Option<DateTime<Utc>>,
    /// Decimal odds, one per outcome, in the venue's outcome order.
    pub odds: Vec<Decimal>,
}

impl MarketEvent {
    /// Create an event from a Unix `start_timestamp` in seconds.
    ///
    /// An out-of-range timestamp leaves `start_time` empty.
    pub fn new(
        id: impl Into<SmolStr>,
        venue: impl Into<Venue>,
        name: impl Into<String>,
        sport: impl Into<SmolStr>,
        start_timestamp: i64,
        odds: Vec<Decimal>,
    ) -> Self {
        Self {
            id: id.into(),
            venue: venue.into(),
            name: name.into(),
            sport: sport.into(),
            start_time: DateTime::from_timestamp(start_timestamp, 0),
            odds,
        }
    }

    /// Lower-cased sport label used as the bucket key, `"unknown"` when blank.
    pub fn sport_key(&self) -> SmolStr {
        sport_key(&self.sport)
    }

    /// Number of outcomes this event prices.
    pub fn outcome_count(&self) -> usize {
        self.odds.len()
    }

    /// Copy of this event carrying a different display name.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }
}

/// Canonical bucket key for a raw sport label.
pub fn sport_key(sport: &str) -> SmolStr {
    let trimmed = sport.trim();
    if trimmed.is_empty() {
        SmolStr::new_static(UNKNOWN_SPORT)
    } else {
        SmolStr::new(trimmed.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_market_event_creation() {
        let event = MarketEvent::new(
            "0x01",
            "azuro",
            "Arsenal vs Chelsea",
            "Football",
            1_738_368_000,
            vec![dec!(2.1), dec!(3.4), dec!(3.2)],
        );

        assert_eq!(event.venue, Venue::new("azuro"));
        assert_eq!(event.outcome_count(), 3);
        assert_eq!(
            event.start_time,
            DateTime::from_timestamp(1_738_368_000, 0)
        );
    }

    #[test]
    fn test_sport_key_defaults_to_unknown() {
        assert_eq!(sport_key("  Football "), "football");
        assert_eq!(sport_key(""), UNKNOWN_SPORT);
        assert_eq!(sport_key("   "), UNKNOWN_SPORT);
    }

    #[test]
    fn test_with_name_leaves_original_untouched() {
        let event = MarketEvent::new("1", "overtime", "ARS - CHE", "soccer", 0, vec![dec!(2)]);
        let renamed = event.with_name("Arsenal vs Chelsea");

        assert_eq!(event.name, "ARS - CHE");
        assert_eq!(renamed.name, "Arsenal vs Chelsea");
        assert_eq!(renamed.id, event.id);
    }

    #[test]
    fn test_venue_display() {
        assert_eq!(Venue::from("azuro").to_string(), "azuro");
    }
}
