//! Options structure lifecycle rules: chain revaluation and exit checks.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use swing_trade_core::{CloseReason, LegAction, OptionLeg, OptionsChain, OptionsRisk};

use crate::equity::CloseDecision;

fn leg_value(premium: Decimal, quantity: u32, action: LegAction) -> Decimal {
    let gross = premium * Decimal::ONE_HUNDRED * Decimal::from(quantity);
    match action {
        LegAction::Sell => gross,
        LegAction::Buy => -gross,
    }
}

/// Net signed value of the structure at its entry premiums
/// (sell legs positive, buy legs negative).
#[must_use]
pub fn entry_value(legs: &[OptionLeg]) -> Decimal {
    legs.iter()
        .map(|leg| leg_value(leg.premium, leg.quantity, leg.action))
        .sum()
}

/// Net signed value of the structure priced from the live chain. Any leg
/// without a current quote makes the whole valuation unavailable.
#[must_use]
pub fn structure_value(
    legs: &[OptionLeg],
    expiry: NaiveDate,
    chain: &OptionsChain,
) -> Option<Decimal> {
    let mut total = Decimal::ZERO;
    for leg in legs {
        let row = chain.quote(leg.strike, leg.right, expiry)?;
        total += leg_value(row.last_price, leg.quantity, leg.action);
    }
    Some(total)
}

/// Unrealized P&L: current structure value minus entry value. `None` when a
/// leg quote is missing — the position stays open and is retried next cycle.
#[must_use]
pub fn unrealized_pnl(
    legs: &[OptionLeg],
    expiry: NaiveDate,
    chain: &OptionsChain,
) -> Option<Decimal> {
    Some(structure_value(legs, expiry, chain)? - entry_value(legs))
}

/// Exit check against the dollar-P&L risk bands.
#[must_use]
pub fn options_exit(risk: &OptionsRisk, unrealized: Decimal) -> Option<CloseDecision> {
    let reason = if unrealized <= -risk.stop_loss_usd {
        CloseReason::StopLoss
    } else if unrealized >= risk.take_profit_usd {
        CloseReason::TakeProfit
    } else {
        return None;
    };
    Some(CloseDecision {
        exit_value: unrealized,
        profit: unrealized,
        reason,
    })
}
