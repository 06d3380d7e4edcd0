//! Discovery cycle driver.
//!
//! One cycle fetches both venues, matches their events, refines the odds of
//! every matched pair, evaluates it and hands arbitrage opportunities to the
//! execution collaborator. Cycles never overlap.

use crate::{
    bucket::SportBucketIndex,
    collaborator::{EventFetcher, ExecutionCollaborator, GasOracle, LiveQuote},
    config::EngineConfig,
    correlation::{MatchedPair, PairKey},
    error::EngineError,
    event::{MarketEvent, Venue},
    matcher::FuzzyMatcher,
    opportunity::{OpportunityCalculator, OpportunityResult, VenueQuote},
    state::{CycleGate, CycleMemory, CycleState, IdentifierDiff},
};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::{sync::Arc, time::Duration};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Counters for one completed cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub source_events: usize,
    pub target_events: usize,
    pub matched: usize,
    /// Pairs skipped because they were already handed to execution.
    pub deduped: usize,
    pub evaluated: usize,
    pub arbitrage: usize,
    /// Hand-offs the execution collaborator reported as acted upon.
    pub executed: usize,
}

#[derive(Debug)]
pub enum CycleOutcome {
    /// Another cycle was running; nothing was done.
    Skipped,
    Completed(CycleReport),
    /// The cycle aborted. The engine is idle again and the next cycle runs normally.
    Failed(EngineError),
}

/// Runs discovery cycles against a source and a target venue.
pub struct CycleCoordinator {
    config: EngineConfig,
    matcher: FuzzyMatcher,
    source: Arc<dyn EventFetcher>,
    target: Arc<dyn EventFetcher>,
    gas: Arc<dyn GasOracle>,
    executor: Arc<dyn ExecutionCollaborator>,
    gate: CycleGate,
    memory: Mutex<CycleMemory>,
}

impl std::fmt::Debug for CycleCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CycleCoordinator")
            .field("config", &self.config)
            .field("source", &self.source.venue())
            .field("target", &self.target.venue())
            .field("state", &self.gate.state())
            .finish_non_exhaustive()
    }
}

impl CycleCoordinator {
    pub fn new(
        config: EngineConfig,
        source: Arc<dyn EventFetcher>,
        target: Arc<dyn EventFetcher>,
        gas: Arc<dyn GasOracle>,
        executor: Arc<dyn ExecutionCollaborator>,
    ) -> Self {
        Self {
            matcher: FuzzyMatcher::new(config.matcher.clone()),
            config,
            source,
            target,
            gas,
            executor,
            gate: CycleGate::default(),
            memory: Mutex::new(CycleMemory::default()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> CycleState {
        self.gate.state()
    }

    /// Number of pairs that will never be handed to execution again.
    pub fn executed_pairs(&self) -> usize {
        self.memory.lock().dedup.len()
    }

    /// Run one discovery cycle, or return [`CycleOutcome::Skipped`] if one is in progress.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let Some(_permit) = self.gate.try_enter() else {
            debug!("Cycle already running, skipping");
            return CycleOutcome::Skipped;
        };

        match self.execute_cycle().await {
            Ok(report) => {
                info!(
                    source_events = report.source_events,
                    target_events = report.target_events,
                    matched = report.matched,
                    deduped = report.deduped,
                    evaluated = report.evaluated,
                    arbitrage = report.arbitrage,
                    executed = report.executed,
                    "Cycle completed"
                );
                CycleOutcome::Completed(report)
            }
            Err(error) => {
                error!(%error, "Cycle aborted");
                CycleOutcome::Failed(error)
            }
        }
    }

    /// Start a cycle every `period` until the returned future is dropped.
    ///
    /// Each tick spawns its cycle, so a slow cycle makes later ticks skip
    /// instead of queueing behind it.
    pub async fn run_periodic(self: Arc<Self>, period: Duration) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let coordinator = Arc::clone(&self);
            tokio::spawn(async move {
                coordinator.run_cycle().await;
            });
        }
    }

    async fn execute_cycle(&self) -> Result<CycleReport, EngineError> {
        let (source_events, target_events) = tokio::join!(
            fetch_events(self.source.as_ref()),
            fetch_events(self.target.as_ref()),
        );

        let mut report = CycleReport {
            source_events: source_events.len(),
            target_events: target_events.len(),
            ..CycleReport::default()
        };

        let (source_diff, target_diff) = {
            let mut memory = self.memory.lock();
            (
                memory.previous_source.replace(&source_events),
                memory.previous_target.replace(&target_events),
            )
        };
        log_identifier_diff(&self.source.venue(), &source_diff);
        log_identifier_diff(&self.target.venue(), &target_diff);

        let index = SportBucketIndex::build(target_events);
        let pairs = self.matcher.match_events(&source_events, &index);
        report.matched = pairs.len();

        for pair in &pairs {
            let key = pair.key();
            let seen = self.memory.lock().dedup.seen(&key);
            if seen {
                debug!(pair = %key, "Pair already executed, skipping");
                report.deduped += 1;
                continue;
            }

            let Some(result) = self.evaluate_pair(pair, &key).await else {
                continue;
            };
            report.evaluated += 1;

            if !result.is_arbitrage {
                debug!(
                    pair = %key,
                    margin = ?result.margin,
                    reason = ?result.reason,
                    "No arbitrage"
                );
                continue;
            }
            report.arbitrage += 1;

            info!(
                pair = %key,
                name = %pair.event_a.name,
                confidence = pair.confidence,
                margin = ?result.margin,
                net_profit = %result.net_profit,
                profit_percentage = %result.profit_percentage,
                "Surebet found"
            );

            let executed = self
                .executor
                .evaluate_and_execute(&result)
                .await
                .map_err(|source| EngineError::Execution {
                    match_id: result.match_id.clone(),
                    source,
                })?;

            self.memory.lock().dedup.mark(key);
            if executed {
                report.executed += 1;
            }
        }

        Ok(report)
    }

    /// Refine, price and evaluate one pair. `None` if the pair cannot be costed.
    async fn evaluate_pair(&self, pair: &MatchedPair, key: &PairKey) -> Option<OpportunityResult> {
        let stake_hint = self.config.total_investment;
        let (live_a, live_b) = tokio::join!(
            refine(self.source.as_ref(), &pair.event_a, stake_hint),
            refine(self.target.as_ref(), &pair.event_b, stake_hint),
        );

        let (gas_a, gas_b) = tokio::join!(
            self.gas.gas_cost_usd(&self.config.source.chain),
            self.gas.gas_cost_usd(&self.config.target.chain),
        );
        let (fee_a, fee_b) = match (gas_a, gas_b) {
            (Ok(fee_a), Ok(fee_b)) => (fee_a, fee_b),
            (Err(error), _) | (_, Err(error)) => {
                warn!(pair = %key, %error, "Gas cost unavailable, skipping pair");
                return None;
            }
        };

        let quote_a = VenueQuote::new(pair.event_a.venue.clone(), live_a.odds)
            .with_fee(fee_a)
            .with_commission(self.config.source.commission)
            .with_frozen(live_a.is_frozen);
        let quote_b = VenueQuote::new(pair.event_b.venue.clone(), live_b.odds)
            .with_fee(fee_b)
            .with_commission(self.config.target.commission)
            .with_frozen(live_b.is_frozen);

        Some(OpportunityCalculator::evaluate(
            &key.to_string(),
            &quote_a,
            &quote_b,
            self.config.total_investment,
        ))
    }
}

async fn fetch_events(fetcher: &dyn EventFetcher) -> Vec<MarketEvent> {
    match fetcher.fetch_active_events().await {
        Ok(events) => events,
        Err(error) => {
            warn!(venue = %fetcher.venue(), %error, "Event fetch failed, continuing without events");
            Vec::new()
        }
    }
}

/// Latest odds for `event`. Failures and unpriced markets come back frozen.
async fn refine(fetcher: &dyn EventFetcher, event: &MarketEvent, stake_hint: Decimal) -> LiveQuote {
    match fetcher.latest_odds(&event.id, stake_hint).await {
        Ok(quote) if quote.odds.is_empty() => LiveQuote::frozen(),
        Ok(quote) => quote,
        Err(error) => {
            warn!(venue = %event.venue, id = %event.id, %error, "Odds refinement failed, treating as frozen");
            LiveQuote::frozen()
        }
    }
}

fn log_identifier_diff(venue: &Venue, diff: &IdentifierDiff) {
    if diff.is_unchanged() {
        debug!(%venue, "Active events unchanged");
        return;
    }
    info!(
        %venue,
        added = diff.added.len(),
        removed = diff.removed.len(),
        "Active events changed"
    );
    debug!(%venue, added = ?diff.added, removed = ?diff.removed, "Active event ids");
}
