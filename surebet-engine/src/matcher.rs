//! Cross-venue fuzzy event matching.
//!
//! For every source event the matcher looks only at the target events in the
//! same sport bucket, scores their normalised names with a bigram Dice
//! coefficient, and accepts the single best candidate when it clears both the
//! similarity floor and the start-time ceiling.

use crate::{
    bucket::SportBucketIndex,
    config::MatcherConfig,
    correlation::MatchedPair,
    event::MarketEvent,
    normalize::{is_matchable, normalize},
};
use chrono::{DateTime, Utc};
use fnv::FnvHashMap;
use smol_str::SmolStr;
use thiserror::Error;
use tracing::{debug, warn};

const MICROS_PER_HOUR: f64 = 3_600_000_000.0;

/// Malformed event fields encountered while matching one source event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("event {id} has no start time")]
    MissingStartTime { id: SmolStr },
}

/// Bigram (Dice coefficient) similarity of two strings, in `[0, 1]`.
///
/// Bigrams are counted as a multiset so each occurrence is matched at most
/// once. Strings shorter than two characters score 0.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.len() < 2 || b.len() < 2 {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let mut counts: FnvHashMap<(char, char), usize> = FnvHashMap::default();
    for window in a.windows(2) {
        *counts.entry((window[0], window[1])).or_insert(0) += 1;
    }

    let mut intersection = 0usize;
    for window in b.windows(2) {
        if let Some(count) = counts.get_mut(&(window[0], window[1])) {
            if *count > 0 {
                *count -= 1;
                intersection += 1;
            }
        }
    }

    (2 * intersection) as f64 / ((a.len() - 1) + (b.len() - 1)) as f64
}

/// Absolute start-time gap in hours, `None` if it overflows.
fn gap_hours(a: DateTime<Utc>, b: DateTime<Utc>) -> Option<f64> {
    (a - b)
        .abs()
        .num_microseconds()
        .map(|micros| micros as f64 / MICROS_PER_HOUR)
}

/// Matches source-venue events against a target venue's [`SportBucketIndex`].
#[derive(Debug, Clone, Default)]
pub struct FuzzyMatcher {
    pub config: MatcherConfig,
}

impl FuzzyMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    /// Match every source event, in source order.
    ///
    /// A source event yields at most one pair. Several source events may
    /// pair with the same target event. Events with malformed fields are
    /// logged and skipped.
    pub fn match_events(
        &self,
        sources: &[MarketEvent],
        targets: &SportBucketIndex,
    ) -> Vec<MatchedPair> {
        sources
            .iter()
            .filter_map(|event| match self.match_event(event, targets) {
                Ok(pair) => pair,
                Err(error) => {
                    warn!(
                        venue = %event.venue,
                        id = %event.id,
                        %error,
                        "Skipping event with malformed fields"
                    );
                    None
                }
            })
            .collect()
    }

    /// Find the accepted match for a single source event, if any.
    pub fn match_event(
        &self,
        event: &MarketEvent,
        targets: &SportBucketIndex,
    ) -> Result<Option<MatchedPair>, MatchError> {
        let bucket = targets.bucket(&event.sport);
        if bucket.is_empty() {
            return Ok(None);
        }

        let name = normalize(&event.name);
        if !is_matchable(&name) {
            return Ok(None);
        }

        let mut best: Option<(&MarketEvent, f64)> = None;
        for candidate in bucket {
            let candidate_name = normalize(&candidate.name);
            if !is_matchable(&candidate_name) {
                continue;
            }

            let score = similarity(&name, &candidate_name);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((candidate, score)),
            }
        }

        let Some((candidate, score)) = best else {
            return Ok(None);
        };

        if score <= self.config.min_similarity {
            return Ok(None);
        }

        let source_start = event.start_time.ok_or_else(|| MatchError::MissingStartTime {
            id: event.id.clone(),
        })?;
        let candidate_start = candidate
            .start_time
            .ok_or_else(|| MatchError::MissingStartTime {
                id: candidate.id.clone(),
            })?;

        let within_window = gap_hours(source_start, candidate_start)
            .is_some_and(|hours| hours <= self.config.max_time_gap_hours);
        if !within_window {
            debug!(
                source = %event.id,
                candidate = %candidate.id,
                score,
                "Best candidate outside start-time window"
            );
            return Ok(None);
        }

        debug!(
            source = %event.id,
            candidate = %candidate.id,
            name = %event.name,
            target_name = %candidate.name,
            score,
            "Events matched"
        );

        Ok(Some(MatchedPair::new(event, candidate, score)))
    }
}
