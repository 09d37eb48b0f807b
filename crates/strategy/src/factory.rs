//! Entry gating and position creation.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use swing_trade_core::{
    EquityRisk, OptionsRisk, Position, PositionDetail, SignalSnapshot, StrategyPlan, TradeError,
};

const EQUITY_RSI_RELAXED: f64 = 40.0;
const OPTIONS_RSI_RELAXED: f64 = 45.0;
const RELAXED_PCR: f64 = 0.8;
const VOLATILE_BOLLINGER_WIDTH: f64 = 0.10;

/// Which kind of trade a snapshot qualifies for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeKind {
    Equity,
    Options,
}

/// Entry gate. Equity conditions are checked first; a snapshot that passes
/// neither gate produces no trade.
#[must_use]
pub fn entry_signal(snapshot: &SignalSnapshot) -> Option<TradeKind> {
    let tech = &snapshot.technical;
    let flow = &snapshot.flow;
    let analyst = &snapshot.analyst;

    let equity_conditions = (tech.oversold || tech.rsi < EQUITY_RSI_RELAXED)
        && (tech.near_support || tech.price <= tech.support * Decimal::new(105, 2))
        && (tech.uptrend || tech.price > tech.sma_20)
        && analyst.bullish;
    if equity_conditions {
        tracing::info!(symbol = %snapshot.symbol, "Equity entry signal");
        return Some(TradeKind::Equity);
    }

    let options_conditions = (tech.oversold || tech.rsi < OPTIONS_RSI_RELAXED)
        && flow.bullish_flow
        && (flow.strong_flow || flow.put_call_ratio < RELAXED_PCR)
        && flow.high_activity
        && analyst.bullish;
    if options_conditions {
        tracing::info!(symbol = %snapshot.symbol, "Options entry signal");
        return Some(TradeKind::Options);
    }

    None
}

/// Builds position records with initial risk parameters.
pub struct TradeFactory {
    risk_per_trade_pct: Decimal,
}

impl TradeFactory {
    #[must_use]
    pub fn new(risk_per_trade_pct: Decimal) -> Self {
        Self { risk_per_trade_pct }
    }

    /// Size and create an equity position.
    ///
    /// # Errors
    ///
    /// Returns [`TradeError::InsufficientSize`] when 2% of capital buys less
    /// than one share.
    pub fn build_equity_trade(
        &self,
        snapshot: &SignalSnapshot,
        total_capital: Decimal,
    ) -> Result<Position, TradeError> {
        let price = snapshot.price();
        if price <= Decimal::ZERO {
            return Err(TradeError::InsufficientSize { price });
        }

        let risk_amount = total_capital * self.risk_per_trade_pct;
        let quantity = (risk_amount / price).floor().to_u32().unwrap_or(0);
        if quantity < 1 {
            return Err(TradeError::InsufficientSize { price });
        }

        let atr = snapshot.technical.atr;
        let risk = if atr > Decimal::ZERO {
            EquityRisk {
                stop_price: price - Decimal::new(15, 1) * atr,
                target_price: price + Decimal::from(3) * atr,
            }
        } else {
            EquityRisk {
                stop_price: price * Decimal::new(95, 2),
                target_price: price * Decimal::new(115, 2),
            }
        };

        tracing::info!(
            symbol = %snapshot.symbol,
            quantity,
            entry = %price,
            stop = %risk.stop_price,
            target = %risk.target_price,
            "Built equity trade"
        );

        Ok(Position::new(
            snapshot.symbol.clone(),
            PositionDetail::Equity {
                entry_price: price,
                quantity,
                risk,
            },
            snapshot.clone(),
        ))
    }

    /// Wrap a constructed structure into a position with regime-based risk
    /// bands.
    #[must_use]
    pub fn build_options_trade(&self, plan: StrategyPlan, snapshot: &SignalSnapshot) -> Position {
        let risk = options_risk_bands(snapshot, plan.max_loss, plan.max_profit);

        tracing::info!(
            symbol = %plan.symbol,
            strategy = %plan.strategy,
            stop_loss = %risk.stop_loss_usd,
            take_profit = %risk.take_profit_usd,
            "Built options trade"
        );

        Position::new(
            plan.symbol,
            PositionDetail::Options {
                strategy: plan.strategy,
                expiry: plan.expiry,
                legs: plan.legs,
                max_loss: plan.max_loss,
                max_profit: plan.max_profit,
                risk,
            },
            snapshot.clone(),
        )
    }
}

/// Stop/target in structure P&L dollars, picked by regime. The branches are
/// mutually exclusive and evaluated in order: confident bullish trend, then
/// wide-band volatility, then the normal case.
fn options_risk_bands(
    snapshot: &SignalSnapshot,
    max_loss: Decimal,
    max_profit: Decimal,
) -> OptionsRisk {
    let tech = &snapshot.technical;
    if tech.uptrend && snapshot.flow.bullish_flow {
        OptionsRisk {
            stop_loss_usd: max_loss,
            take_profit_usd: max_profit * Decimal::new(7, 1),
        }
    } else if tech.bollinger_width > VOLATILE_BOLLINGER_WIDTH {
        OptionsRisk {
            stop_loss_usd: max_loss * Decimal::new(7, 1),
            take_profit_usd: max_profit * Decimal::new(4, 1),
        }
    } else {
        OptionsRisk {
            stop_loss_usd: max_loss * Decimal::new(8, 1),
            take_profit_usd: max_profit * Decimal::new(5, 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use swing_trade_core::{
        AnalystSignals, FlowSignals, Recommendation, StrategyKind, TechnicalSignals,
    };

    fn make_snapshot(price: Decimal) -> SignalSnapshot {
        SignalSnapshot {
            symbol: "AAPL".to_string(),
            as_of: Utc::now(),
            technical: TechnicalSignals {
                price,
                rsi: 35.0,
                oversold: false,
                overbought: false,
                sma_20: price - dec!(1),
                sma_50: price - dec!(3),
                uptrend: true,
                support: price - dec!(1),
                resistance: price + dec!(10),
                near_support: true,
                near_resistance: false,
                macd: 0.4,
                macd_signal: 0.2,
                macd_bullish: true,
                bollinger_upper: price + dec!(5),
                bollinger_lower: price - dec!(5),
                bollinger_width: 0.05,
                below_bollinger: false,
                above_bollinger: false,
                atr: dec!(2),
                atr_percent: 2.0,
            },
            flow: FlowSignals {
                call_volume: 900,
                put_volume: 300,
                put_call_ratio: 0.33,
                net_money_flow: dec!(60000),
                money_flow_ratio: 0.5,
                bullish_flow: true,
                strong_flow: true,
                high_activity: true,
            },
            analyst: AnalystSignals {
                recommendation: Recommendation::Buy,
                mean_rating: 2.0,
                target_price: price * dec!(1.2),
                bullish: true,
                bearish: false,
            },
        }
    }

    fn make_plan() -> StrategyPlan {
        StrategyPlan {
            symbol: "AAPL".to_string(),
            strategy: StrategyKind::BullCallSpread,
            expiry: NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(),
            legs: vec![],
            max_loss: dec!(250),
            max_profit: dec!(150),
            break_evens: vec![dec!(100.5)],
        }
    }

    #[test]
    fn equity_sizing_floors_share_count() {
        let factory = TradeFactory::new(dec!(0.02));
        let position = factory
            .build_equity_trade(&make_snapshot(dec!(135)), dec!(100000))
            .unwrap();

        // 2% of 100k = 2000 → floor(2000 / 135) = 14 shares
        match position.detail {
            PositionDetail::Equity { quantity, .. } => assert_eq!(quantity, 14),
            PositionDetail::Options { .. } => unreachable!(),
        }
    }

    #[test]
    fn equity_sizing_rejects_sub_share_budget() {
        let factory = TradeFactory::new(dec!(0.02));
        let result = factory.build_equity_trade(&make_snapshot(dec!(3000)), dec!(100000));
        assert!(matches!(result, Err(TradeError::InsufficientSize { .. })));
    }

    #[test]
    fn equity_risk_bands_use_atr_when_available() {
        let factory = TradeFactory::new(dec!(0.02));
        let position = factory
            .build_equity_trade(&make_snapshot(dec!(100)), dec!(100000))
            .unwrap();

        match position.detail {
            PositionDetail::Equity { risk, .. } => {
                assert_eq!(risk.stop_price, dec!(97)); // 100 - 1.5×2
                assert_eq!(risk.target_price, dec!(106)); // 100 + 3×2
            }
            PositionDetail::Options { .. } => unreachable!(),
        }
    }

    #[test]
    fn equity_risk_bands_fall_back_without_atr() {
        let factory = TradeFactory::new(dec!(0.02));
        let mut snapshot = make_snapshot(dec!(100));
        snapshot.technical.atr = Decimal::ZERO;
        let position = factory.build_equity_trade(&snapshot, dec!(100000)).unwrap();

        match position.detail {
            PositionDetail::Equity { risk, .. } => {
                assert_eq!(risk.stop_price, dec!(95));
                assert_eq!(risk.target_price, dec!(115));
            }
            PositionDetail::Options { .. } => unreachable!(),
        }
    }

    #[test]
    fn options_bands_confident_bullish_regime() {
        let factory = TradeFactory::new(dec!(0.02));
        let snapshot = make_snapshot(dec!(100)); // uptrend + bullish flow
        let position = factory.build_options_trade(make_plan(), &snapshot);

        match position.detail {
            PositionDetail::Options { risk, .. } => {
                assert_eq!(risk.stop_loss_usd, dec!(250));
                assert_eq!(risk.take_profit_usd, dec!(105)); // 150 × 0.7
            }
            PositionDetail::Equity { .. } => unreachable!(),
        }
    }

    #[test]
    fn options_bands_volatile_regime() {
        let factory = TradeFactory::new(dec!(0.02));
        let mut snapshot = make_snapshot(dec!(100));
        snapshot.technical.uptrend = false;
        snapshot.technical.bollinger_width = 0.15;
        let position = factory.build_options_trade(make_plan(), &snapshot);

        match position.detail {
            PositionDetail::Options { risk, .. } => {
                assert_eq!(risk.stop_loss_usd, dec!(175.0)); // 250 × 0.7
                assert_eq!(risk.take_profit_usd, dec!(60.0)); // 150 × 0.4
            }
            PositionDetail::Equity { .. } => unreachable!(),
        }
    }

    #[test]
    fn options_bands_normal_regime() {
        let factory = TradeFactory::new(dec!(0.02));
        let mut snapshot = make_snapshot(dec!(100));
        snapshot.technical.uptrend = false;
        snapshot.technical.bollinger_width = 0.05;
        let position = factory.build_options_trade(make_plan(), &snapshot);

        match position.detail {
            PositionDetail::Options { risk, .. } => {
                assert_eq!(risk.stop_loss_usd, dec!(200.0)); // 250 × 0.8
                assert_eq!(risk.take_profit_usd, dec!(75.0)); // 150 × 0.5
            }
            PositionDetail::Equity { .. } => unreachable!(),
        }
    }

    #[test]
    fn entry_gate_prefers_equity() {
        let snapshot = make_snapshot(dec!(100));
        assert_eq!(entry_signal(&snapshot), Some(TradeKind::Equity));
    }

    #[test]
    fn entry_gate_falls_through_to_options() {
        // Break the equity trend condition only: downtrend and price below
        // the 20-period average. Flow conditions still qualify.
        let mut snapshot = make_snapshot(dec!(100));
        snapshot.technical.uptrend = false;
        snapshot.technical.sma_20 = dec!(110);
        assert_eq!(entry_signal(&snapshot), Some(TradeKind::Options));
    }

    #[test]
    fn entry_gate_requires_analyst_backing() {
        let mut snapshot = make_snapshot(dec!(100));
        snapshot.analyst.bullish = false;
        assert_eq!(entry_signal(&snapshot), None);
    }

    #[test]
    fn entry_gate_rejects_quiet_chains() {
        let mut snapshot = make_snapshot(dec!(100));
        snapshot.technical.uptrend = false;
        snapshot.technical.sma_20 = dec!(110);
        snapshot.flow.high_activity = false;
        assert_eq!(entry_signal(&snapshot), None);
    }

    #[test]
    fn frozen_snapshot_travels_with_position() {
        let factory = TradeFactory::new(dec!(0.02));
        let snapshot = make_snapshot(dec!(135));
        let position = factory.build_equity_trade(&snapshot, dec!(100000)).unwrap();
        assert_eq!(position.signals.technical.price, dec!(135));
        assert_eq!(position.signals.symbol, "AAPL");
    }
}
