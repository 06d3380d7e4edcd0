//! Runs discovery cycles against two in-memory venues.
//!
//! The venues reprice on every refinement, so the same pairs drift into and
//! out of surebet territory. Every opportunity is executed at most once.
//!
//! Usage:
//!   SUREBET_CYCLE_INTERVAL_SECS=2 RUST_LOG=surebet_engine=debug cargo run -p surebet-engine --example run_cycles

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use smol_str::SmolStr;
use std::{sync::Arc, time::Duration};
use surebet_engine::{
    CollaboratorError, CycleCoordinator, EngineConfig, EventFetcher, ExecutionCollaborator,
    GasOracle, LiveQuote, MarketEvent, OpportunityResult, Venue,
};
use tracing::{error, info};

const KICKOFF: i64 = 1_767_182_400;

/// Venue that nudges its odds by `drift` on every refinement.
struct SimulatedVenue {
    venue: &'static str,
    events: Vec<MarketEvent>,
    drift: Decimal,
    refinements: Mutex<u32>,
}

#[async_trait]
impl EventFetcher for SimulatedVenue {
    fn venue(&self) -> Venue {
        Venue::from(self.venue)
    }

    async fn fetch_active_events(&self) -> Result<Vec<MarketEvent>, CollaboratorError> {
        Ok(self.events.clone())
    }

    async fn latest_odds(
        &self,
        id: &SmolStr,
        _stake_hint: Decimal,
    ) -> Result<LiveQuote, CollaboratorError> {
        let step = {
            let mut refinements = self.refinements.lock();
            *refinements += 1;
            Decimal::from(*refinements % 3)
        };

        let event = self
            .events
            .iter()
            .find(|event| &event.id == id)
            .ok_or_else(|| CollaboratorError::Quote {
                id: id.clone(),
                message: "event closed".to_string(),
            })?;

        Ok(LiveQuote::live(
            event.odds.iter().map(|odds| *odds + self.drift * step).collect(),
        ))
    }
}

struct FixedGas;

#[async_trait]
impl GasOracle for FixedGas {
    async fn gas_cost_usd(&self, chain: &str) -> Result<Decimal, CollaboratorError> {
        match chain {
            "polygon" => Ok(dec!(0.02)),
            "optimism" => Ok(dec!(0.15)),
            other => Err(CollaboratorError::Gas {
                chain: SmolStr::new(other),
                message: "no price feed".to_string(),
            }),
        }
    }
}

struct LoggingExecutor;

#[async_trait]
impl ExecutionCollaborator for LoggingExecutor {
    async fn evaluate_and_execute(
        &self,
        opportunity: &OpportunityResult,
    ) -> Result<bool, CollaboratorError> {
        for leg in &opportunity.legs {
            info!(
                pair = %opportunity.match_id,
                outcome = leg.outcome_index,
                venue = %leg.venue,
                odds = %leg.raw_odds,
                stake = %leg.stake.round_dp(2),
                "Placing leg"
            );
        }
        Ok(true)
    }
}

#[tokio::main]
async fn main() {
    init_logging();

    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            error!(%error, "Invalid configuration");
            return;
        }
    };

    let azuro = SimulatedVenue {
        venue: "azuro",
        events: vec![
            MarketEvent::new("0x1a", "azuro", "Arsenal vs Chelsea", "Football", KICKOFF, vec![dec!(2.10), dec!(3.40), dec!(3.60)]),
            MarketEvent::new("0x2b", "azuro", "Lakers vs Celtics", "Basketball", KICKOFF, vec![dec!(1.85), dec!(1.95)]),
            MarketEvent::new("0x3c", "azuro", "Nadal vs Djokovic", "Tennis", KICKOFF, vec![dec!(2.40), dec!(1.55)]),
        ],
        drift: dec!(0.05),
        refinements: Mutex::new(0),
    };
    let overtime = SimulatedVenue {
        venue: "overtime",
        events: vec![
            MarketEvent::new("1001", "overtime", "Arsenal FC - Chelsea FC", "football", KICKOFF + 1800, vec![dec!(1.95), dec!(3.90), dec!(3.80)]),
            MarketEvent::new("1002", "overtime", "LA Lakers vs Boston Celtics", "basketball", KICKOFF, vec![dec!(2.20), dec!(1.70)]),
            MarketEvent::new("1003", "overtime", "Swiatek vs Sabalenka", "tennis", KICKOFF, vec![dec!(1.70), dec!(2.10)]),
        ],
        drift: dec!(-0.03),
        refinements: Mutex::new(0),
    };

    let period = Duration::from_secs(config.cycle_interval_secs);
    let engine = Arc::new(CycleCoordinator::new(
        config,
        Arc::new(azuro),
        Arc::new(overtime),
        Arc::new(FixedGas),
        Arc::new(LoggingExecutor),
    ));

    info!(?period, "Starting discovery cycles, Ctrl+C to stop");
    tokio::select! {
        _ = Arc::clone(&engine).run_periodic(period) => {}
        _ = tokio::signal::ctrl_c() => info!("Shutdown requested"),
    }

    info!(executed_pairs = engine.executed_pairs(), "Stopped");
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_ansi(cfg!(debug_assertions))
        .init()
}
