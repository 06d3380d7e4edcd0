//! Boundaries to the venues, the gas oracle and the execution layer.
//!
//! The engine only talks to the outside world through these traits. All
//! implementations are injected into the [`CycleCoordinator`](crate::coordinator::CycleCoordinator)
//! at construction.

use crate::{event::{MarketEvent, Venue}, opportunity::OpportunityResult};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

/// Errors reported by a collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error("Event fetch failed on {venue}: {message}")]
    Fetch { venue: Venue, message: String },

    #[error("Odds refinement failed for {id}: {message}")]
    Quote { id: SmolStr, message: String },

    #[error("Gas lookup failed for {chain}: {message}")]
    Gas { chain: SmolStr, message: String },

    #[error("Execution failed: {0}")]
    Execution(String),
}

/// Fresh odds for one event, fetched right before evaluation.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct LiveQuote {
    pub is_frozen: bool,
    /// Decimal odds per outcome. Empty means the market cannot be priced.
    pub odds: Vec<Decimal>,
}

impl LiveQuote {
    pub fn live(odds: Vec<Decimal>) -> Self {
        Self {
            is_frozen: false,
            odds,
        }
    }

    /// Quote that can never produce an opportunity.
    pub fn frozen() -> Self {
        Self {
            is_frozen: true,
            odds: Vec::new(),
        }
    }
}

/// Discovery and refinement for one venue.
#[async_trait]
pub trait EventFetcher: Send + Sync {
    /// Venue this fetcher serves.
    fn venue(&self) -> Venue;

    /// All events currently open at the venue.
    async fn fetch_active_events(&self) -> Result<Vec<MarketEvent>, CollaboratorError>;

    /// Latest odds for event `id`, priced for a stake of roughly `stake_hint`.
    async fn latest_odds(
        &self,
        id: &SmolStr,
        stake_hint: Decimal,
    ) -> Result<LiveQuote, CollaboratorError>;
}

/// Per-chain transaction cost in USD.
#[async_trait]
pub trait GasOracle: Send + Sync {
    async fn gas_cost_usd(&self, chain: &str) -> Result<Decimal, CollaboratorError>;
}

/// Receives every arbitrage opportunity the engine finds.
#[async_trait]
pub trait ExecutionCollaborator: Send + Sync {
    /// Returns whether the opportunity was acted upon.
    async fn evaluate_and_execute(
        &self,
        opportunity: &OpportunityResult,
    ) -> Result<bool, CollaboratorError>;
}
