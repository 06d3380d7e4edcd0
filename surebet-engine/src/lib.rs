//! Cross-venue surebet reconciliation engine.
//!
//! This crate discovers the same real-world sporting event listed on two
//! betting venues, refines the odds of every matched pair, and reports
//! **surebets**: stake allocations across venues whose combined payout is
//! positive on every outcome after commissions and transaction costs.
//!
//! # Architecture
//!
//! A [`CycleCoordinator`] drives periodic discovery cycles. Each cycle:
//!
//! 1. fetches active events from both venues concurrently,
//! 2. buckets the target venue's events by sport ([`SportBucketIndex`]),
//! 3. pairs source events with target events ([`FuzzyMatcher`]),
//! 4. refines live odds and gas costs for each pair,
//! 5. evaluates the pair ([`OpportunityCalculator`]) and hands arbitrage to
//!    the execution collaborator, at most once per pair ([`DedupGuard`]).
//!
//! Venues, the gas oracle and execution are injected through the traits in
//! [`collaborator`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use surebet_engine::{CycleCoordinator, CycleOutcome, EngineConfig};
//!
//! let config = EngineConfig::from_env()?;
//! let engine = Arc::new(CycleCoordinator::new(
//!     config,
//!     Arc::new(azuro_fetcher),
//!     Arc::new(overtime_fetcher),
//!     Arc::new(gas_oracle),
//!     Arc::new(executor),
//! ));
//!
//! if let CycleOutcome::Completed(report) = engine.run_cycle().await {
//!     println!("{} surebets", report.arbitrage);
//! }
//! ```
//!
//! # Surebet Model
//!
//! For each outcome the venue with the best effective odds
//! (`raw * (1 - commission)`) is chosen. With `e_i` the chosen odds:
//!
//! ```text
//! margin  = sum(1 / e_i)
//! stake_i = T * (1 / e_i) / margin
//! net     = T / margin - T - gas
//! ```
//!
//! A pair is an opportunity when `margin < 1` and `net > 0`.

pub mod bucket;
pub mod collaborator;
pub mod config;
pub mod coordinator;
pub mod correlation;
pub mod dedup;
pub mod error;
pub mod event;
pub mod fees;
pub mod matcher;
pub mod normalize;
pub mod opportunity;
pub mod state;

// Re-exports for convenience
pub use bucket::SportBucketIndex;
pub use collaborator::{CollaboratorError, EventFetcher, ExecutionCollaborator, GasOracle, LiveQuote};
pub use config::{ConfigError, EngineConfig, MatcherConfig, VenueSettings};
pub use coordinator::{CycleCoordinator, CycleOutcome, CycleReport};
pub use correlation::{MatchedPair, PairKey};
pub use dedup::DedupGuard;
pub use error::EngineError;
pub use event::{MarketEvent, Venue};
pub use fees::FeeCalculator;
pub use matcher::{FuzzyMatcher, MatchError, similarity};
pub use normalize::normalize;
pub use opportunity::{OpportunityCalculator, OpportunityLeg, OpportunityResult, SkipReason, VenueQuote};
pub use state::{CycleMemory, CycleState, IdentifierDiff};
