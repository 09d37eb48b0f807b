//! Position records and their lifecycle transitions.
//!
//! A position is created once by the trade factory, owned by the portfolio
//! ledger, and mutated only through the lifecycle manager: trailing-stop
//! ratchets while open, then one terminal close. `exit` being populated IS
//! the closed state — the two cannot drift apart.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chain::{OptionLeg, StrategyKind};
use crate::signal::SignalSnapshot;

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    StopLoss,
    TakeProfit,
    MaxLossBreach,
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StopLoss => write!(f, "stop_loss"),
            Self::TakeProfit => write!(f, "take_profit"),
            Self::MaxLossBreach => write!(f, "max_loss_breach"),
        }
    }
}

/// Derived position status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionStatus {
    Open,
    Closed,
}

/// Equity risk parameters, denominated in underlying price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquityRisk {
    pub stop_price: Decimal,
    pub target_price: Decimal,
}

/// Options risk parameters, denominated in structure P&L dollars.
///
/// Deliberately a distinct type from [`EquityRisk`] so price-unit stops and
/// dollar-P&L stops cannot be confused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsRisk {
    pub stop_loss_usd: Decimal,
    pub take_profit_usd: Decimal,
}

/// Instrument-specific half of a position.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PositionDetail {
    Equity {
        entry_price: Decimal,
        quantity: u32,
        risk: EquityRisk,
    },
    Options {
        strategy: StrategyKind,
        expiry: NaiveDate,
        legs: Vec<OptionLeg>,
        max_loss: Decimal,
        max_profit: Decimal,
        risk: OptionsRisk,
    },
}

/// Terminal exit metadata, written exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitRecord {
    pub closed_at: DateTime<Utc>,
    /// Exit price for equities; realized structure P&L for options.
    pub exit_value: Decimal,
    pub profit: Decimal,
    pub reason: CloseReason,
}

/// A tracked trade, equity or multi-leg options structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: Uuid,
    pub symbol: String,
    pub opened_at: DateTime<Utc>,
    pub detail: PositionDetail,
    /// Frozen copy of the snapshot that justified the entry.
    pub signals: SignalSnapshot,
    pub exit: Option<ExitRecord>,
}

impl Position {
    #[must_use]
    pub fn new(symbol: String, detail: PositionDetail, signals: SignalSnapshot) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol,
            opened_at: Utc::now(),
            detail,
            signals,
            exit: None,
        }
    }

    #[must_use]
    pub fn status(&self) -> PositionStatus {
        if self.exit.is_some() {
            PositionStatus::Closed
        } else {
            PositionStatus::Open
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.exit.is_none()
    }

    /// Capital the ledger must reserve to carry this position: entry cost
    /// for equities, max loss (margin) for options structures.
    #[must_use]
    pub fn reserved_capital(&self) -> Decimal {
        match &self.detail {
            PositionDetail::Equity {
                entry_price,
                quantity,
                ..
            } => *entry_price * Decimal::from(*quantity),
            PositionDetail::Options { max_loss, .. } => *max_loss,
        }
    }

    /// Transition to closed. Returns `false` (and leaves the record
    /// untouched) if the position is already closed — closing is idempotent.
    pub fn close(&mut self, exit: ExitRecord) -> bool {
        if self.exit.is_some() {
            return false;
        }
        self.exit = Some(exit);
        true
    }

    /// Ratchet the equity stop upward. The stop never moves down, and closed
    /// or options positions are never touched. Returns `true` if raised.
    pub fn raise_stop(&mut self, new_stop: Decimal) -> bool {
        if self.exit.is_some() {
            return false;
        }
        match &mut self.detail {
            PositionDetail::Equity { risk, .. } if new_stop > risk.stop_price => {
                risk.stop_price = new_stop;
                true
            }
            _ => false,
        }
    }

    /// Realized profit, if closed.
    #[must_use]
    pub fn realized_profit(&self) -> Option<Decimal> {
        self.exit.as_ref().map(|e| e.profit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{
        AnalystSignals, FlowSignals, Recommendation, SignalSnapshot, TechnicalSignals,
    };
    use rust_decimal_macros::dec;

    fn make_snapshot(symbol: &str, price: Decimal) -> SignalSnapshot {
        SignalSnapshot {
            symbol: symbol.to_string(),
            as_of: Utc::now(),
            technical: TechnicalSignals {
                price,
                rsi: 35.0,
                oversold: false,
                overbought: false,
                sma_20: price,
                sma_50: price,
                uptrend: true,
                support: price,
                resistance: price,
                near_support: true,
                near_resistance: false,
                macd: 0.5,
                macd_signal: 0.3,
                macd_bullish: true,
                bollinger_upper: price,
                bollinger_lower: price,
                bollinger_width: 0.05,
                below_bollinger: false,
                above_bollinger: false,
                atr: dec!(2),
                atr_percent: 2.0,
            },
            flow: FlowSignals {
                call_volume: 900,
                put_volume: 400,
                put_call_ratio: 0.44,
                net_money_flow: dec!(50000),
                money_flow_ratio: 0.4,
                bullish_flow: true,
                strong_flow: true,
                high_activity: true,
            },
            analyst: AnalystSignals {
                recommendation: Recommendation::Buy,
                mean_rating: 1.8,
                target_price: price * dec!(1.2),
                bullish: true,
                bearish: false,
            },
        }
    }

    fn make_equity_position() -> Position {
        Position::new(
            "AAPL".to_string(),
            PositionDetail::Equity {
                entry_price: dec!(100),
                quantity: 10,
                risk: EquityRisk {
                    stop_price: dec!(95),
                    target_price: dec!(115),
                },
            },
            make_snapshot("AAPL", dec!(100)),
        )
    }

    fn make_exit(profit: Decimal) -> ExitRecord {
        ExitRecord {
            closed_at: Utc::now(),
            exit_value: dec!(106),
            profit,
            reason: CloseReason::TakeProfit,
        }
    }

    #[test]
    fn close_is_idempotent() {
        let mut pos = make_equity_position();
        assert!(pos.close(make_exit(dec!(60))));
        assert_eq!(pos.status(), PositionStatus::Closed);

        // Second close is rejected and the original exit survives
        assert!(!pos.close(make_exit(dec!(-999))));
        assert_eq!(pos.realized_profit(), Some(dec!(60)));
    }

    #[test]
    fn closed_implies_exit_populated() {
        let mut pos = make_equity_position();
        assert_eq!(pos.status(), PositionStatus::Open);
        assert!(pos.exit.is_none());

        pos.close(make_exit(dec!(10)));
        assert_eq!(pos.status(), PositionStatus::Closed);
        assert!(pos.exit.is_some());
    }

    #[test]
    fn raise_stop_never_moves_down() {
        let mut pos = make_equity_position();
        assert!(pos.raise_stop(dec!(106.4)));
        assert!(!pos.raise_stop(dec!(100)));

        match &pos.detail {
            PositionDetail::Equity { risk, .. } => assert_eq!(risk.stop_price, dec!(106.4)),
            PositionDetail::Options { .. } => unreachable!(),
        }
    }

    #[test]
    fn raise_stop_rejected_after_close() {
        let mut pos = make_equity_position();
        pos.close(make_exit(dec!(0)));
        assert!(!pos.raise_stop(dec!(200)));
    }

    #[test]
    fn reserved_capital_is_entry_cost_for_equity() {
        let pos = make_equity_position();
        assert_eq!(pos.reserved_capital(), dec!(1000));
    }

    #[test]
    fn position_round_trips_through_json() {
        let pos = make_equity_position();
        let json = serde_json::to_string(&pos).unwrap();
        let back: Position = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, pos.id);
        assert_eq!(back.symbol, pos.symbol);
        assert!(back.is_open());
    }
}
