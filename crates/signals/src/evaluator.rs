//! Per-instrument signal evaluation.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use swing_trade_core::{
    AnalystRatings, OhlcvBar, OptionsChain, SignalSnapshot, TechnicalSignals,
};

use crate::analyst::analyst_signals;
use crate::flow::flow_signals;
use crate::indicators;

/// Minimum history bars for a reliable evaluation.
pub const MIN_HISTORY_BARS: usize = 50;

const RSI_PERIOD: usize = 14;
const SMA_FAST: usize = 20;
const SMA_SLOW: usize = 50;
const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;
const MACD_SIGNAL: usize = 9;
const BOLLINGER_WINDOW: usize = 20;
const BOLLINGER_STD: f64 = 2.0;
const ATR_PERIOD: usize = 14;
const LEVEL_WINDOW: usize = 20;

const OVERSOLD_RSI: f64 = 30.0;
const OVERBOUGHT_RSI: f64 = 70.0;

/// Evaluate one instrument into a signal snapshot.
///
/// Pure function of its inputs. Returns `None` when the history is shorter
/// than [`MIN_HISTORY_BARS`], when any indicator's latest value is still
/// undefined, or when the chain carries no flow information — never a
/// partial snapshot.
#[must_use]
pub fn evaluate(
    symbol: &str,
    bars: &[OhlcvBar],
    chain: &OptionsChain,
    ratings: &AnalystRatings,
    as_of: DateTime<Utc>,
) -> Option<SignalSnapshot> {
    if bars.len() < MIN_HISTORY_BARS {
        tracing::debug!(
            symbol,
            bars = bars.len(),
            required = MIN_HISTORY_BARS,
            "Insufficient history for signal evaluation"
        );
        return None;
    }

    let closes: Vec<Decimal> = bars.iter().map(|b| b.close).collect();
    let price = *closes.last()?;
    let rsi = indicators::rsi(&closes, RSI_PERIOD)?;
    let sma_20 = indicators::sma(&closes, SMA_FAST)?;
    let sma_50 = indicators::sma(&closes, SMA_SLOW)?;
    let (support, resistance) = indicators::support_resistance(bars, LEVEL_WINDOW)?;
    let (macd, macd_signal) = indicators::macd(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL)?;
    let bands = indicators::bollinger(&closes, BOLLINGER_WINDOW, BOLLINGER_STD)?;
    let atr = indicators::atr(bars, ATR_PERIOD)?;

    let atr_percent = if price.is_zero() {
        0.0
    } else {
        (atr / price * Decimal::ONE_HUNDRED).to_f64().unwrap_or(0.0)
    };

    let technical = TechnicalSignals {
        price,
        rsi,
        oversold: rsi < OVERSOLD_RSI,
        overbought: rsi > OVERBOUGHT_RSI,
        sma_20,
        sma_50,
        uptrend: sma_20 > sma_50,
        support,
        resistance,
        near_support: price <= support * Decimal::new(102, 2),
        near_resistance: price >= resistance * Decimal::new(98, 2),
        macd,
        macd_signal,
        macd_bullish: macd > macd_signal,
        bollinger_upper: bands.upper,
        bollinger_lower: bands.lower,
        bollinger_width: bands.width,
        below_bollinger: price < bands.lower,
        above_bollinger: price > bands.upper,
        atr,
        atr_percent,
    };

    let flow = flow_signals(chain)?;
    let analyst = analyst_signals(ratings);

    tracing::debug!(
        symbol,
        price = %price,
        rsi,
        uptrend = technical.uptrend,
        bullish_flow = flow.bullish_flow,
        recommendation = %analyst.recommendation,
        "Signal snapshot evaluated"
    );

    Some(SignalSnapshot {
        symbol: symbol.to_string(),
        as_of,
        technical,
        flow,
        analyst,
    })
}
