//! Configuration types for the reconciliation engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("Out of range: {0}")]
    OutOfRange(String),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Acceptance thresholds for cross-venue matching.
    pub matcher: MatcherConfig,
    /// Total stake split across the legs of one opportunity.
    pub total_investment: Decimal,
    /// Settings for the source venue (side A of every pair).
    pub source: VenueSettings,
    /// Settings for the target venue (side B of every pair).
    pub target: VenueSettings,
    /// Seconds between scheduled discovery cycles.
    pub cycle_interval_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            matcher: MatcherConfig::default(),
            total_investment: Decimal::ONE_HUNDRED,
            source: VenueSettings::new("polygon", Decimal::ZERO),
            target: VenueSettings::new("optimism", Decimal::ZERO),
            cycle_interval_secs: 60,
        }
    }
}

/// Matching thresholds.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Best score must be strictly greater than this.
    pub min_similarity: f64,
    /// Start times may differ by at most this many hours (inclusive).
    pub max_time_gap_hours: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            min_similarity: 0.45,
            max_time_gap_hours: 36.0,
        }
    }
}

/// Per-venue cost settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VenueSettings {
    /// Chain key handed to the gas oracle.
    pub chain: SmolStr,
    /// Commission rate deducted from payouts (0.05 = 5%).
    pub commission: Decimal,
}

impl VenueSettings {
    pub fn new(chain: impl Into<SmolStr>, commission: Decimal) -> Self {
        Self {
            chain: chain.into(),
            commission,
        }
    }
}

impl EngineConfig {
    /// Load from environment variables over the defaults.
    ///
    /// Recognised keys:
    /// - `SUREBET_MIN_SIMILARITY` (default: 0.45)
    /// - `SUREBET_MAX_TIME_GAP_HOURS` (default: 36)
    /// - `SUREBET_TOTAL_INVESTMENT` (default: 100)
    /// - `SUREBET_SOURCE_CHAIN` / `SUREBET_TARGET_CHAIN`
    /// - `SUREBET_SOURCE_COMMISSION` / `SUREBET_TARGET_COMMISSION` (default: 0)
    /// - `SUREBET_CYCLE_INTERVAL_SECS` (default: 60)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup, falling back to defaults for missing keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            matcher: MatcherConfig {
                min_similarity: parse_or(
                    &lookup,
                    "SUREBET_MIN_SIMILARITY",
                    defaults.matcher.min_similarity,
                )?,
                max_time_gap_hours: parse_or(
                    &lookup,
                    "SUREBET_MAX_TIME_GAP_HOURS",
                    defaults.matcher.max_time_gap_hours,
                )?,
            },
            total_investment: parse_or(
                &lookup,
                "SUREBET_TOTAL_INVESTMENT",
                defaults.total_investment,
            )?,
            source: VenueSettings {
                chain: lookup("SUREBET_SOURCE_CHAIN")
                    .map(SmolStr::from)
                    .unwrap_or(defaults.source.chain),
                commission: parse_or(
                    &lookup,
                    "SUREBET_SOURCE_COMMISSION",
                    defaults.source.commission,
                )?,
            },
            target: VenueSettings {
                chain: lookup("SUREBET_TARGET_CHAIN")
                    .map(SmolStr::from)
                    .unwrap_or(defaults.target.chain),
                commission: parse_or(
                    &lookup,
                    "SUREBET_TARGET_COMMISSION",
                    defaults.target.commission,
                )?,
            },
            cycle_interval_secs: parse_or(
                &lookup,
                "SUREBET_CYCLE_INTERVAL_SECS",
                defaults.cycle_interval_secs,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every threshold is inside its meaningful range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let similarity = self.matcher.min_similarity;
        if !(0.0..=1.0).contains(&similarity) {
            return Err(ConfigError::OutOfRange(format!(
                "min_similarity {similarity} not in [0, 1]"
            )));
        }

        let gap = self.matcher.max_time_gap_hours;
        if !gap.is_finite() || gap < 0.0 {
            return Err(ConfigError::OutOfRange(format!(
                "max_time_gap_hours {gap} must be a non-negative number"
            )));
        }

        if self.total_investment <= Decimal::ZERO {
            return Err(ConfigError::OutOfRange(format!(
                "total_investment {} must be positive",
                self.total_investment
            )));
        }

        if self.cycle_interval_secs == 0 {
            return Err(ConfigError::OutOfRange(
                "cycle_interval_secs must be at least 1".to_string(),
            ));
        }

        for (side, venue) in [("source", &self.source), ("target", &self.target)] {
            if venue.commission < Decimal::ZERO || venue.commission >= Decimal::ONE {
                return Err(ConfigError::OutOfRange(format!(
                    "{side} commission {} not in [0, 1)",
                    venue.commission
                )));
            }
        }

        Ok(())
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
