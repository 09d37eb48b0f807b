//! Equity lifecycle rules: trailing-stop ratchet and exit checks.
//!
//! Pure functions over position fields — the engine applies the returned
//! actions through the ledger.

use rust_decimal::Decimal;

use swing_trade_core::{CloseReason, EquityRisk};

/// Terminal decision produced by an exit rule.
#[derive(Debug, Clone)]
pub struct CloseDecision {
    /// Exit price for equities; realized structure P&L for options.
    pub exit_value: Decimal,
    pub profit: Decimal,
    pub reason: CloseReason,
}

/// Trailing-stop parameters.
#[derive(Debug, Clone, Copy)]
pub struct TrailingRule {
    /// P&L percentage above which the stop starts trailing.
    pub trigger_pct: Decimal,
    /// Trail the stop to this fraction of current price.
    pub stop_factor: Decimal,
}

/// Propose a raised stop once the position is sufficiently in profit.
/// The stop only ever moves up; `None` means leave it where it is.
#[must_use]
pub fn trailing_stop(
    entry_price: Decimal,
    current_stop: Decimal,
    current_price: Decimal,
    rule: TrailingRule,
) -> Option<Decimal> {
    if entry_price <= Decimal::ZERO {
        return None;
    }
    let pnl_pct = (current_price - entry_price) / entry_price * Decimal::ONE_HUNDRED;
    if pnl_pct > rule.trigger_pct {
        let candidate = current_price * rule.stop_factor;
        if candidate > current_stop {
            return Some(candidate);
        }
    }
    None
}

/// Exit check: stop hit, target hit, or max-loss breach (in that order).
#[must_use]
pub fn equity_exit(
    entry_price: Decimal,
    quantity: u32,
    risk: &EquityRisk,
    current_price: Decimal,
    max_loss_pct: Decimal,
) -> Option<CloseDecision> {
    let pnl_pct = if entry_price.is_zero() {
        Decimal::ZERO
    } else {
        (current_price - entry_price) / entry_price * Decimal::ONE_HUNDRED
    };

    let reason = if current_price <= risk.stop_price {
        CloseReason::StopLoss
    } else if current_price >= risk.target_price {
        CloseReason::TakeProfit
    } else if pnl_pct <= -(max_loss_pct * Decimal::ONE_HUNDRED) {
        CloseReason::MaxLossBreach
    } else {
        return None;
    };

    Some(CloseDecision {
        exit_value: current_price,
        profit: (current_price - entry_price) * Decimal::from(quantity),
        reason,
    })
}
