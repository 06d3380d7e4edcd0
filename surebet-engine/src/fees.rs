//! Commission and transaction-cost arithmetic.
//!
//! Uses rust_decimal for exact precision in financial calculations.

use rust_decimal::Decimal;

/// Fee calculator for decimal-odds venues.
pub struct FeeCalculator;

impl FeeCalculator {
    /// Odds after the venue's commission is taken from the payout.
    ///
    /// Formula: raw_odds * (1 - commission)
    ///
    /// # Arguments
    /// * `raw_odds` - Venue-quoted decimal odds
    /// * `commission` - Commission rate (e.g., 0.05 = 5%)
    pub fn effective_odds(raw_odds: Decimal, commission: Decimal) -> Decimal {
        raw_odds * (Decimal::ONE - commission)
    }

    /// Implied probability of decimal odds (`1 / odds`), `None` for non-positive odds.
    pub fn implied_probability(odds: Decimal) -> Option<Decimal> {
        if odds <= Decimal::ZERO {
            return None;
        }
        Decimal::ONE.checked_div(odds)
    }

    /// Total transaction cost of an opportunity.
    ///
    /// A venue's fee is paid once if at least one leg is routed to it.
    ///
    /// # Arguments
    /// * `fees` - `(fee, carries_a_leg)` per venue
    pub fn total_gas_cost(fees: impl IntoIterator<Item = (Decimal, bool)>) -> Decimal {
        fees.into_iter()
            .filter(|(_, used)| *used)
            .map(|(fee, _)| fee)
            .sum()
    }

    /// Net profit of a surebet after costs.
    ///
    /// Formula: total_investment / margin - total_investment - gas_cost
    ///
    /// Returns `None` when `margin` is not positive.
    pub fn net_profit(total_investment: Decimal, margin: Decimal, gas_cost: Decimal) -> Option<Decimal> {
        if margin <= Decimal::ZERO {
            return None;
        }
        let payout = total_investment.checked_div(margin)?;
        Some(payout - total_investment - gas_cost)
    }
}
