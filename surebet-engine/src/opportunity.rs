//! Surebet detection and stake allocation.
//!
//! Given aligned odds vectors for the same outcome set on several venues, the
//! calculator picks the best effective odds per outcome, sums their implied
//! probabilities into the book margin, and, when the margin is below one,
//! splits the investment so every outcome pays the same amount.

use crate::{event::Venue, fees::FeeCalculator};
use derive_more::Display;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Why an evaluation stopped before computing a margin.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum SkipReason {
    #[display("Market Suspended")]
    MarketSuspended,
    #[display("Odds missing")]
    OddsMissing,
    #[display("Odds array length mismatch")]
    LengthMismatch,
    #[display("Zero odds on an outcome")]
    ZeroOddsOnOutcome,
    #[display("Zero odds on best outcome")]
    ZeroOddsOnBestOutcome,
}

/// Live pricing of one side of a matched pair.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VenueQuote {
    pub venue: Venue,
    /// Raw decimal odds per outcome, in the pair's shared outcome order.
    pub odds: Vec<Decimal>,
    /// Transaction cost paid once if any leg is placed on this venue.
    pub fee: Decimal,
    /// Commission rate taken from payouts (0.05 = 5%).
    pub commission: Decimal,
    /// Venue reports the market as suspended.
    pub frozen: bool,
}

impl VenueQuote {
    pub fn new(venue: impl Into<Venue>, odds: Vec<Decimal>) -> Self {
        Self {
            venue: venue.into(),
            odds,
            fee: Decimal::ZERO,
            commission: Decimal::ZERO,
            frozen: false,
        }
    }

    pub fn with_fee(self, fee: Decimal) -> Self {
        Self { fee, ..self }
    }

    pub fn with_commission(self, commission: Decimal) -> Self {
        Self { commission, ..self }
    }

    pub fn with_frozen(self, frozen: bool) -> Self {
        Self { frozen, ..self }
    }
}

/// Best-priced venue for one outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub outcome_index: usize,
    /// Index into the quotes passed to the calculator.
    pub quote_index: usize,
    pub raw_odds: Decimal,
    pub effective_odds: Decimal,
}

/// One stake of an opportunity.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OpportunityLeg {
    pub outcome_index: usize,
    pub venue: Venue,
    pub effective_odds: Decimal,
    pub raw_odds: Decimal,
    pub stake: Decimal,
}

impl OpportunityLeg {
    /// Payout if this leg's outcome occurs.
    pub fn payout(&self) -> Decimal {
        self.stake * self.effective_odds
    }
}

/// Outcome of evaluating one matched pair.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OpportunityResult {
    /// Identifier of the matched pair this result belongs to.
    pub match_id: String,
    /// Net profit is positive after commissions and gas.
    pub is_arbitrage: bool,
    /// Sum of best implied probabilities, `None` if the evaluation short-circuited.
    pub margin: Option<Decimal>,
    /// One leg per outcome when stakes were allocated, empty otherwise.
    pub legs: Vec<OpportunityLeg>,
    pub total_investment: Decimal,
    pub total_gas_cost: Decimal,
    /// Equalised payout across outcomes (`total_investment / margin`).
    pub payout: Decimal,
    pub net_profit: Decimal,
    pub profit_percentage: Decimal,
    /// Present iff the evaluation short-circuited.
    pub reason: Option<SkipReason>,
}

impl OpportunityResult {
    fn rejected(
        match_id: &str,
        total_investment: Decimal,
        margin: Option<Decimal>,
        reason: Option<SkipReason>,
    ) -> Self {
        Self {
            match_id: match_id.to_string(),
            is_arbitrage: false,
            margin,
            legs: Vec::new(),
            total_investment,
            total_gas_cost: Decimal::ZERO,
            payout: Decimal::ZERO,
            net_profit: Decimal::ZERO,
            profit_percentage: Decimal::ZERO,
            reason,
        }
    }

    fn skipped(match_id: &str, total_investment: Decimal, reason: SkipReason) -> Self {
        Self::rejected(match_id, total_investment, None, Some(reason))
    }

    fn no_edge(match_id: &str, total_investment: Decimal, margin: Decimal) -> Self {
        Self::rejected(match_id, total_investment, Some(margin), None)
    }

    /// Sum of all leg stakes.
    pub fn total_stake(&self) -> Decimal {
        self.legs.iter().map(|leg| leg.stake).sum()
    }

    /// Payout if outcome `outcome_index` occurs.
    pub fn payout_for(&self, outcome_index: usize) -> Option<Decimal> {
        self.legs
            .iter()
            .find(|leg| leg.outcome_index == outcome_index)
            .map(OpportunityLeg::payout)
    }
}

/// Pure calculator turning venue quotes into an [`OpportunityResult`].
pub struct OpportunityCalculator;

impl OpportunityCalculator {
    /// Evaluate a two-venue matched pair.
    pub fn evaluate(
        match_id: &str,
        quote_a: &VenueQuote,
        quote_b: &VenueQuote,
        total_investment: Decimal,
    ) -> OpportunityResult {
        Self::evaluate_many(match_id, &[quote_a, quote_b], total_investment)
    }

    /// Evaluate quotes from any number of venues for the same outcome set.
    ///
    /// Never fails: every input problem becomes a non-arbitrage result with a
    /// [`SkipReason`].
    pub fn evaluate_many(
        match_id: &str,
        quotes: &[&VenueQuote],
        total_investment: Decimal,
    ) -> OpportunityResult {
        let selections = match Self::select_best(quotes) {
            Ok(selections) => selections,
            Err(reason) => {
                debug!(%match_id, %reason, "Evaluation short-circuited");
                return OpportunityResult::skipped(match_id, total_investment, reason);
            }
        };

        let implied: Option<Vec<Decimal>> = selections
            .iter()
            .map(|selection| FeeCalculator::implied_probability(selection.effective_odds))
            .collect();
        let margin = implied.as_ref().and_then(|implied| {
            implied
                .iter()
                .try_fold(Decimal::ZERO, |acc, p| acc.checked_add(*p))
        });
        let (Some(implied), Some(margin)) = (implied, margin) else {
            return OpportunityResult::skipped(
                match_id,
                total_investment,
                SkipReason::ZeroOddsOnBestOutcome,
            );
        };

        if margin >= Decimal::ONE {
            debug!(%match_id, %margin, "No edge across venues");
            return OpportunityResult::no_edge(match_id, total_investment, margin);
        }

        // Every outcome pays total_investment / margin
        let Some(payout) = total_investment.checked_div(margin) else {
            return OpportunityResult::skipped(
                match_id,
                total_investment,
                SkipReason::ZeroOddsOnBestOutcome,
            );
        };

        let legs: Vec<OpportunityLeg> = selections
            .iter()
            .zip(&implied)
            .map(|(selection, probability)| OpportunityLeg {
                outcome_index: selection.outcome_index,
                venue: quotes[selection.quote_index].venue.clone(),
                effective_odds: selection.effective_odds,
                raw_odds: selection.raw_odds,
                stake: *probability * payout,
            })
            .collect();

        let total_gas_cost = FeeCalculator::total_gas_cost(quotes.iter().enumerate().map(
            |(index, quote)| {
                let used = selections.iter().any(|s| s.quote_index == index);
                (quote.fee, used)
            },
        ));

        let net_profit = payout - total_investment - total_gas_cost;
        let profit_percentage = (net_profit * Decimal::ONE_HUNDRED)
            .checked_div(total_investment)
            .unwrap_or(Decimal::ZERO);

        OpportunityResult {
            match_id: match_id.to_string(),
            is_arbitrage: net_profit > Decimal::ZERO,
            margin: Some(margin),
            legs,
            total_investment,
            total_gas_cost,
            payout,
            net_profit,
            profit_percentage,
            reason: None,
        }
    }

    /// Validate quote shapes and choose the best effective odds per outcome.
    ///
    /// Checks run in a fixed order: suspension, missing odds, length
    /// mismatch, all-zero outcome, then non-positive best odds. Ties keep the
    /// earlier quote.
    pub fn select_best(quotes: &[&VenueQuote]) -> Result<Vec<Selection>, SkipReason> {
        if quotes.iter().any(|quote| quote.frozen) {
            return Err(SkipReason::MarketSuspended);
        }

        let Some(first) = quotes.first() else {
            return Err(SkipReason::OddsMissing);
        };
        if first.odds.is_empty() {
            return Err(SkipReason::OddsMissing);
        }

        let outcomes = first.odds.len();
        if quotes.iter().any(|quote| quote.odds.len() != outcomes) {
            return Err(SkipReason::LengthMismatch);
        }

        let dead_outcome = (0..outcomes)
            .any(|i| quotes.iter().all(|quote| quote.odds[i] <= Decimal::ZERO));
        if dead_outcome {
            return Err(SkipReason::ZeroOddsOnOutcome);
        }

        (0..outcomes)
            .map(|outcome_index| {
                let mut best: Option<Selection> = None;
                for (quote_index, quote) in quotes.iter().enumerate() {
                    let raw_odds = quote.odds[outcome_index];
                    let effective_odds = FeeCalculator::effective_odds(raw_odds, quote.commission);
                    if best.map_or(true, |b| effective_odds > b.effective_odds) {
                        best = Some(Selection {
                            outcome_index,
                            quote_index,
                            raw_odds,
                            effective_odds,
                        });
                    }
                }

                match best {
                    Some(selection) if selection.effective_odds > Decimal::ZERO => Ok(selection),
                    _ => Err(SkipReason::ZeroOddsOnBestOutcome),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn quote(venue: &str, odds: Vec<Decimal>) -> VenueQuote {
        VenueQuote::new(venue, odds)
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(SkipReason::MarketSuspended.to_string(), "Market Suspended");
        assert_eq!(SkipReason::OddsMissing.to_string(), "Odds missing");
        assert_eq!(SkipReason::LengthMismatch.to_string(), "Odds array length mismatch");
        assert_eq!(SkipReason::ZeroOddsOnOutcome.to_string(), "Zero odds on an outcome");
        assert_eq!(SkipReason::ZeroOddsOnBestOutcome.to_string(), "Zero odds on best outcome");
    }

    #[test]
    fn test_frozen_checked_before_everything() {
        let a = quote("a", vec![]).with_frozen(true);
        let b = quote("b", vec![dec!(2.0)]);
        let result = OpportunityCalculator::evaluate("m", &a, &b, dec!(100));

        assert!(!result.is_arbitrage);
        assert_eq!(result.reason, Some(SkipReason::MarketSuspended));
        assert_eq!(result.margin, None);
    }

    #[test]
    fn test_empty_source_odds() {
        let a = quote("a", vec![]);
        let b = quote("b", vec![]);
        let result = OpportunityCalculator::evaluate("m", &a, &b, dec!(100));
        assert_eq!(result.reason, Some(SkipReason::OddsMissing));
    }

    #[test]
    fn test_length_mismatch_never_padded() {
        let a = quote("a", vec![dec!(3.0), dec!(3.0)]);
        let b = quote("b", vec![dec!(3.0), dec!(3.0), dec!(3.0)]);
        let result = OpportunityCalculator::evaluate("m", &a, &b, dec!(100));

        assert!(!result.is_arbitrage);
        assert_eq!(result.reason, Some(SkipReason::LengthMismatch));
        assert!(result.legs.is_empty());
    }

    #[test]
    fn test_outcome_dead_on_both_venues() {
        let a = quote("a", vec![dec!(2.0), Decimal::ZERO]);
        let b = quote("b", vec![dec!(2.1), dec!(-1)]);
        let result = OpportunityCalculator::evaluate("m", &a, &b, dec!(100));
        assert_eq!(result.reason, Some(SkipReason::ZeroOddsOnOutcome));
    }

    #[test]
    fn test_zero_on_one_venue_routes_to_other() {
        let a = quote("a", vec![dec!(2.2), Decimal::ZERO]);
        let b = quote("b", vec![dec!(1.5), dec!(2.2)]);
        let selections = OpportunityCalculator::select_best(&[&a, &b]).unwrap();

        assert_eq!(selections[0].quote_index, 0);
        assert_eq!(selections[1].quote_index, 1);
    }

    #[test]
    fn test_full_commission_zeroes_best_outcome() {
        let a = quote("a", vec![dec!(2.0), dec!(2.0)]).with_commission(Decimal::ONE);
        let b = quote("b", vec![dec!(2.0), Decimal::ZERO]).with_commission(Decimal::ONE);
        let result = OpportunityCalculator::evaluate("m", &a, &b, dec!(100));
        assert_eq!(result.reason, Some(SkipReason::ZeroOddsOnBestOutcome));
    }

    #[test]
    fn test_selection_ties_keep_first_venue() {
        let a = quote("a", vec![dec!(2.0)]);
        let b = quote("b", vec![dec!(2.0)]);
        let selections = OpportunityCalculator::select_best(&[&a, &b]).unwrap();
        assert_eq!(selections[0].quote_index, 0);
    }

    #[test]
    fn test_three_way_with_commission_has_no_edge() {
        let a = quote("a", vec![dec!(2.0), dec!(3.5), dec!(4.0)]).with_commission(dec!(0.05));
        let b = quote("b", vec![dec!(2.1), dec!(3.0), dec!(3.8)]).with_commission(dec!(0.03));

        let selections = OpportunityCalculator::select_best(&[&a, &b]).unwrap();
        let picks: Vec<_> = selections.iter().map(|s| (s.quote_index, s.effective_odds)).collect();
        assert_eq!(picks, vec![(1, dec!(2.037)), (0, dec!(3.325)), (0, dec!(3.8))]);

        let result = OpportunityCalculator::evaluate("m", &a, &b, dec!(100));
        let margin = result.margin.unwrap();
        assert!(margin >= Decimal::ONE);
        assert!((margin - dec!(1.0549)).abs() < dec!(0.0001));
        assert!(!result.is_arbitrage);
        assert_eq!(result.reason, None);
        assert!(result.legs.is_empty());
    }

    #[test]
    fn test_two_way_surebet_across_venues() {
        let a = quote("a", vec![dec!(2.10), dec!(2.00)]);
        let b = quote("b", vec![dec!(1.80), dec!(2.30)]);
        let result = OpportunityCalculator::evaluate("pair-1", &a, &b, dec!(100));

        assert!(result.is_arbitrage);
        assert_eq!(result.match_id, "pair-1");
        assert!((result.margin.unwrap() - dec!(0.9110)).abs() < dec!(0.0001));

        assert_eq!(result.legs.len(), 2);
        assert_eq!(result.legs[0].venue, Venue::from("a"));
        assert_eq!(result.legs[1].venue, Venue::from("b"));
        assert!((result.legs[0].stake - dec!(52.27)).abs() < dec!(0.01));
        assert!((result.legs[1].stake - dec!(47.73)).abs() < dec!(0.01));

        assert!((result.payout - dec!(109.77)).abs() < dec!(0.01));
        assert!((result.net_profit - dec!(9.77)).abs() < dec!(0.01));
        assert!((result.profit_percentage - dec!(9.77)).abs() < dec!(0.01));
    }

    #[test]
    fn test_stakes_sum_and_equal_payouts() {
        let a = quote("a", vec![dec!(2.60), dec!(3.90), dec!(3.10)]).with_commission(dec!(0.02));
        let b = quote("b", vec![dec!(2.30), dec!(4.40), dec!(3.60)]).with_commission(dec!(0.01));
        let result = OpportunityCalculator::evaluate("m", &a, &b, dec!(250));

        let margin = result.margin.unwrap();
        assert!(margin < Decimal::ONE);
        assert!((result.total_stake() - dec!(250)).abs() < dec!(0.000001));

        let expected = dec!(250) / margin;
        for i in 0..3 {
            let payout = result.payout_for(i).unwrap();
            assert!((payout - expected).abs() < dec!(0.000001), "outcome {i}");
        }
    }

    #[test]
    fn test_gas_only_charged_for_used_venues() {
        // Venue a wins every outcome, so b's fee is never paid
        let a = quote("a", vec![dec!(2.2), dec!(2.2)]).with_fee(dec!(1));
        let b = quote("b", vec![dec!(1.5), dec!(1.5)]).with_fee(dec!(50));
        let result = OpportunityCalculator::evaluate("m", &a, &b, dec!(100));

        assert_eq!(result.total_gas_cost, dec!(1));
        assert!(result.is_arbitrage);
    }

    #[test]
    fn test_gas_can_eat_the_edge() {
        let a = quote("a", vec![dec!(2.10), dec!(2.00)]).with_fee(dec!(5));
        let b = quote("b", vec![dec!(1.80), dec!(2.30)]).with_fee(dec!(5));
        let result = OpportunityCalculator::evaluate("m", &a, &b, dec!(100));

        assert!(result.margin.unwrap() < Decimal::ONE);
        assert_eq!(result.total_gas_cost, dec!(10));
        assert!(!result.is_arbitrage);
        assert!(result.net_profit < Decimal::ZERO);
        assert_eq!(result.reason, None);
        assert_eq!(result.legs.len(), 2);
    }

    #[test]
    fn test_evaluate_many_spans_three_venues() {
        let a = quote("a", vec![dec!(3.5), dec!(2.0), dec!(2.0)]);
        let b = quote("b", vec![dec!(2.0), dec!(3.5), dec!(2.0)]);
        let c = quote("c", vec![dec!(2.0), dec!(2.0), dec!(3.5)]);
        let result = OpportunityCalculator::evaluate_many("m", &[&a, &b, &c], dec!(90));

        assert!(result.is_arbitrage);
        let venues: Vec<_> = result.legs.iter().map(|l| l.venue.as_str()).collect();
        assert_eq!(venues, vec!["a", "b", "c"]);
        assert!((result.total_stake() - dec!(90)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_margin_above_one_never_arbitrage() {
        let a = quote("a", vec![dec!(1.5), dec!(1.5)]);
        let b = quote("b", vec![dec!(1.9), dec!(1.9)]);
        for investment in [dec!(1), dec!(100), dec!(1000000)] {
            let result = OpportunityCalculator::evaluate("m", &a, &b, investment);
            assert!(result.margin.unwrap() >= Decimal::ONE);
            assert!(!result.is_arbitrage);
        }
    }
}
