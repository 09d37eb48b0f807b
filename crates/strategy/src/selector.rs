//! Regime-based strategy selection.
//!
//! Exactly one structure family is attempted per call, chosen by the first
//! matching market regime. If that structure cannot be constructed there is
//! no fallback to another family — the cycle simply yields no options trade.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use swing_trade_core::{EngineConfig, OptionsChain, SignalSnapshot, StrategyPlan};

use crate::spreads;

const VOLATILE_RSI_LOW: f64 = 30.0;
const VOLATILE_RSI_HIGH: f64 = 70.0;

pub struct StrategySelector {
    expiry_min_days: i64,
    expiry_max_days: i64,
    strike_width: Decimal,
}

impl StrategySelector {
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            expiry_min_days: config.expiry_min_days,
            expiry_max_days: config.expiry_max_days,
            strike_width: config.strike_width_pct,
        }
    }

    /// Pick and construct the structure for the current regime.
    ///
    /// Returns `None` when no expiry falls inside the eligible window, no
    /// regime matches, or the selected structure cannot be priced.
    #[must_use]
    pub fn select(
        &self,
        snapshot: &SignalSnapshot,
        chain: &OptionsChain,
        today: NaiveDate,
    ) -> Option<StrategyPlan> {
        let symbol = snapshot.symbol.as_str();
        let price = snapshot.price();

        let Some(expiry) = chain.expirations().into_iter().find(|e| {
            let dte = (*e - today).num_days();
            dte >= self.expiry_min_days && dte <= self.expiry_max_days
        }) else {
            tracing::debug!(symbol, "No expiry inside the eligible window");
            return None;
        };

        let strikes = chain.strikes_near(expiry, price, self.strike_width);

        let tech = &snapshot.technical;
        let flow = &snapshot.flow;
        let is_volatile = tech.rsi > VOLATILE_RSI_HIGH || tech.rsi < VOLATILE_RSI_LOW;
        let is_trending = tech.uptrend || tech.near_support || tech.near_resistance;
        let is_bullish = tech.uptrend && tech.near_support && flow.bullish_flow;
        let is_bearish = !tech.uptrend && tech.near_resistance && !flow.bullish_flow;

        let attempt = if is_bullish && !is_volatile {
            spreads::bull_call_spread(symbol, chain, expiry, &strikes)
        } else if is_bearish && !is_volatile {
            spreads::bear_put_spread(symbol, chain, expiry, &strikes)
        } else if is_volatile {
            spreads::butterfly(symbol, chain, expiry, &strikes)
        } else if !is_trending {
            spreads::iron_condor(symbol, chain, expiry, &strikes)
        } else {
            tracing::debug!(symbol, "No strategy regime matched");
            return None;
        };

        let mut candidates = Vec::new();
        match attempt {
            Ok(plan) => candidates.push(plan),
            Err(e) => {
                // No fallback to another structure family
                tracing::debug!(symbol, error = %e, "Structure construction failed");
                return None;
            }
        }

        let best = candidates
            .into_iter()
            .max_by(|a, b| a.risk_reward_score().total_cmp(&b.risk_reward_score()))?;
        tracing::info!(
            symbol,
            strategy = %best.strategy,
            expiry = %best.expiry,
            max_loss = %best.max_loss,
            max_profit = %best.max_profit,
            "Selected options structure"
        );
        Some(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use swing_trade_core::{
        AnalystSignals, ChainRow, FlowSignals, OptionRight, Recommendation, StrategyKind,
        TechnicalSignals,
    };

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
    }

    fn eligible_expiry() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap() // 45 days out
    }

    fn make_snapshot(rsi: f64, uptrend: bool, near_support: bool, near_resistance: bool, bullish_flow: bool) -> SignalSnapshot {
        let price = dec!(100);
        SignalSnapshot {
            symbol: "AAPL".to_string(),
            as_of: Utc::now(),
            technical: TechnicalSignals {
                price,
                rsi,
                oversold: rsi < 30.0,
                overbought: rsi > 70.0,
                sma_20: dec!(101),
                sma_50: dec!(99),
                uptrend,
                support: dec!(99),
                resistance: dec!(110),
                near_support,
                near_resistance,
                macd: 0.2,
                macd_signal: 0.1,
                macd_bullish: true,
                bollinger_upper: dec!(106),
                bollinger_lower: dec!(94),
                bollinger_width: 0.12,
                below_bollinger: false,
                above_bollinger: false,
                atr: dec!(2),
                atr_percent: 2.0,
            },
            flow: FlowSignals {
                call_volume: 900,
                put_volume: 300,
                put_call_ratio: 0.33,
                net_money_flow: if bullish_flow { dec!(60000) } else { dec!(-60000) },
                money_flow_ratio: if bullish_flow { 0.5 } else { -0.5 },
                bullish_flow,
                strong_flow: true,
                high_activity: true,
            },
            analyst: AnalystSignals {
                recommendation: Recommendation::Buy,
                mean_rating: 2.0,
                target_price: dec!(120),
                bullish: true,
                bearish: false,
            },
        }
    }

    fn row(strike: Decimal, right: OptionRight, last_price: Decimal) -> ChainRow {
        ChainRow {
            strike,
            right,
            expiration: eligible_expiry(),
            last_price,
            volume: 500,
            open_interest: 1000,
        }
    }

    /// Calls and puts quoted at four strikes around 100.
    fn full_chain() -> OptionsChain {
        let mut rows = Vec::new();
        for (strike, call, put) in [
            (dec!(95), dec!(6.0), dec!(0.6)),
            (dec!(97), dec!(4.5), dec!(1.2)),
            (dec!(103), dec!(1.1), dec!(4.0)),
            (dec!(105), dec!(0.5), dec!(5.5)),
        ] {
            rows.push(row(strike, OptionRight::Call, call));
            rows.push(row(strike, OptionRight::Put, put));
        }
        OptionsChain {
            underlying: "AAPL".to_string(),
            rows,
        }
    }

    #[test]
    fn bullish_calm_regime_builds_bull_call_spread() {
        let snapshot = make_snapshot(45.0, true, true, false, true);
        let plan = StrategySelector::new(&EngineConfig::default())
            .select(&snapshot, &full_chain(), today())
            .unwrap();
        assert_eq!(plan.strategy, StrategyKind::BullCallSpread);
        assert_eq!(plan.expiry, eligible_expiry());
    }

    #[test]
    fn bearish_calm_regime_builds_bear_put_spread() {
        let snapshot = make_snapshot(50.0, false, false, true, false);
        let plan = StrategySelector::new(&EngineConfig::default())
            .select(&snapshot, &full_chain(), today())
            .unwrap();
        assert_eq!(plan.strategy, StrategyKind::BearPutSpread);
    }

    #[test]
    fn volatile_regime_builds_butterfly() {
        let snapshot = make_snapshot(25.0, true, true, false, true);
        let plan = StrategySelector::new(&EngineConfig::default())
            .select(&snapshot, &full_chain(), today())
            .unwrap();
        assert_eq!(plan.strategy, StrategyKind::Butterfly);
    }

    #[test]
    fn range_bound_regime_builds_iron_condor() {
        let snapshot = make_snapshot(50.0, false, false, false, true);
        let plan = StrategySelector::new(&EngineConfig::default())
            .select(&snapshot, &full_chain(), today())
            .unwrap();
        assert_eq!(plan.strategy, StrategyKind::IronCondor);
        // Net credit 1.2 + 1.1 - 0.6 - 0.5 = 1.2 over 2-wide wings
        assert_eq!(plan.max_profit, dec!(120.0));
        assert_eq!(plan.max_loss, dec!(80.0));
        assert_eq!(plan.break_evens, vec![dec!(95.8), dec!(104.2)]);
    }

    #[test]
    fn no_eligible_expiry_yields_none() {
        let snapshot = make_snapshot(45.0, true, true, false, true);
        // Viewed from March the only expiry is 106 days out
        let early = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert!(StrategySelector::new(&EngineConfig::default())
            .select(&snapshot, &full_chain(), early)
            .is_none());
    }

    #[test]
    fn construction_failure_has_no_fallback() {
        // Bullish regime selected, but the chain quotes puts only: the bull
        // call spread fails and nothing else is attempted.
        let snapshot = make_snapshot(45.0, true, true, false, true);
        let rows = vec![
            row(dec!(97), OptionRight::Put, dec!(1.2)),
            row(dec!(103), OptionRight::Put, dec!(4.0)),
        ];
        let chain = OptionsChain {
            underlying: "AAPL".to_string(),
            rows,
        };
        assert!(StrategySelector::new(&EngineConfig::default())
            .select(&snapshot, &chain, today())
            .is_none());
    }

    #[test]
    fn uptrend_without_setup_matches_no_regime() {
        // Trending (uptrend) but neither bullish setup nor volatile nor
        // range-bound: nothing to build.
        let snapshot = make_snapshot(50.0, true, false, false, true);
        assert!(StrategySelector::new(&EngineConfig::default())
            .select(&snapshot, &full_chain(), today())
            .is_none());
    }
}
