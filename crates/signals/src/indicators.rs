//! Rolling technical indicators over OHLCV history.
//!
//! Each function returns only the latest value of the rolling series, and
//! `None` while the window is not yet filled. The evaluator turns any `None`
//! into a no-signal outcome instead of acting on partial data.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use swing_trade_core::OhlcvBar;

/// Simple moving average of the last `window` values.
#[must_use]
pub fn sma(values: &[Decimal], window: usize) -> Option<Decimal> {
    if window == 0 || values.len() < window {
        return None;
    }
    let tail = &values[values.len() - window..];
    let sum: Decimal = tail.iter().copied().sum();
    Some(sum / Decimal::from(window))
}

/// Relative Strength Index over rolling means of gains and losses.
///
/// Needs `period + 1` closes for `period` deltas. A window with no movement
/// at all has an undefined RSI (0/0) and returns `None`; a window with gains
/// only saturates at 100.
#[must_use]
pub fn rsi(closes: &[Decimal], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }
    let deltas = &closes[closes.len() - period - 1..];
    let mut gains = Decimal::ZERO;
    let mut losses = Decimal::ZERO;
    for pair in deltas.windows(2) {
        let delta = pair[1] - pair[0];
        if delta > Decimal::ZERO {
            gains += delta;
        } else {
            losses -= delta;
        }
    }

    let avg_gain = gains / Decimal::from(period);
    let avg_loss = losses / Decimal::from(period);
    if avg_loss.is_zero() {
        if avg_gain.is_zero() {
            return None;
        }
        return Some(100.0);
    }

    let rs = (avg_gain / avg_loss).to_f64()?;
    Some(100.0 - 100.0 / (1.0 + rs))
}

/// Exponentially-weighted series seeded with the first value
/// (`alpha = 2 / (span + 1)`).
fn ema_series(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let Some(first) = values.first() else {
        return out;
    };
    let mut prev = *first;
    out.push(prev);
    for value in &values[1..] {
        prev = alpha * value + (1.0 - alpha) * prev;
        out.push(prev);
    }
    out
}

/// MACD line and its signal line: `EMA(fast) − EMA(slow)`, smoothed by
/// `EMA(signal)`.
#[must_use]
pub fn macd(closes: &[Decimal], fast: usize, slow: usize, signal: usize) -> Option<(f64, f64)> {
    if closes.len() < slow {
        return None;
    }
    let series: Vec<f64> = closes
        .iter()
        .map(|c| c.to_f64().unwrap_or(0.0))
        .collect();
    let fast_ema = ema_series(&series, fast);
    let slow_ema = ema_series(&series, slow);
    let macd_line: Vec<f64> = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema_series(&macd_line, signal);
    Some((*macd_line.last()?, *signal_line.last()?))
}

/// Bollinger band bounds for the latest window.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    pub middle: Decimal,
    pub upper: Decimal,
    pub lower: Decimal,
    /// `(upper − lower) / middle`, 0 when the middle band is zero.
    pub width: f64,
}

/// Bollinger bands: `SMA(window) ± num_std × sample std-dev`.
#[must_use]
pub fn bollinger(closes: &[Decimal], window: usize, num_std: f64) -> Option<BollingerBands> {
    if window < 2 || closes.len() < window {
        return None;
    }
    let middle = sma(closes, window)?;
    let mean = middle.to_f64()?;
    let tail = &closes[closes.len() - window..];
    let variance = tail
        .iter()
        .map(|c| {
            let d = c.to_f64().unwrap_or(0.0) - mean;
            d * d
        })
        .sum::<f64>()
        / (window as f64 - 1.0);
    let band = Decimal::try_from(num_std * variance.sqrt()).ok()?;

    let upper = middle + band;
    let lower = middle - band;
    let width = if middle.is_zero() {
        0.0
    } else {
        ((upper - lower) / middle).to_f64().unwrap_or(0.0)
    };
    Some(BollingerBands {
        middle,
        upper,
        lower,
        width,
    })
}

/// Average True Range over the last `period` bars. The first bar's true
/// range has no previous close and falls back to its high-low span.
#[must_use]
pub fn atr(bars: &[OhlcvBar], period: usize) -> Option<Decimal> {
    if period == 0 || bars.len() < period {
        return None;
    }
    let mut true_ranges = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        let tr = if i == 0 {
            bar.range()
        } else {
            let prev_close = bars[i - 1].close;
            bar.range()
                .max((bar.high - prev_close).abs())
                .max((bar.low - prev_close).abs())
        };
        true_ranges.push(tr);
    }
    let tail = &true_ranges[true_ranges.len() - period..];
    let sum: Decimal = tail.iter().copied().sum();
    Some(sum / Decimal::from(period))
}

/// Rolling support/resistance: min of lows and max of highs over the last
/// `window` bars.
#[must_use]
pub fn support_resistance(bars: &[OhlcvBar], window: usize) -> Option<(Decimal, Decimal)> {
    if window == 0 || bars.len() < window {
        return None;
    }
    let tail = &bars[bars.len() - window..];
    let support = tail.iter().map(|b| b.low).min()?;
    let resistance = tail.iter().map(|b| b.high).max()?;
    Some((support, resistance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn make_bar(open: i64, high: i64, low: i64, close: i64) -> OhlcvBar {
        OhlcvBar {
            timestamp: Utc::now(),
            open: Decimal::from(open),
            high: Decimal::from(high),
            low: Decimal::from(low),
            close: Decimal::from(close),
            volume: dec!(1000),
        }
    }

    fn closes_from(values: &[i64]) -> Vec<Decimal> {
        values.iter().map(|v| Decimal::from(*v)).collect()
    }

    #[test]
    fn sma_averages_last_window() {
        let closes = closes_from(&[1, 2, 3, 4, 5]);
        assert_eq!(sma(&closes, 3), Some(dec!(4))); // (3+4+5)/3
        assert_eq!(sma(&closes, 5), Some(dec!(3)));
    }

    #[test]
    fn sma_none_until_window_filled() {
        let closes = closes_from(&[1, 2]);
        assert_eq!(sma(&closes, 3), None);
    }

    #[test]
    fn rsi_is_50_for_balanced_moves() {
        // Seven +1 deltas then seven -1 deltas: avg gain == avg loss
        let mut values = vec![100i64];
        for i in 1..=7 {
            values.push(100 + i);
        }
        for i in (100..107).rev() {
            values.push(i);
        }
        let closes = closes_from(&values);
        let value = rsi(&closes, 14).unwrap();
        assert!((value - 50.0).abs() < 1e-9, "rsi was {value}");
    }

    #[test]
    fn rsi_saturates_at_100_on_gains_only() {
        let values: Vec<i64> = (100..120).collect();
        let closes = closes_from(&values);
        assert_eq!(rsi(&closes, 14), Some(100.0));
    }

    #[test]
    fn rsi_undefined_for_flat_window() {
        let closes = vec![dec!(100); 20];
        assert_eq!(rsi(&closes, 14), None);
    }

    #[test]
    fn rsi_low_when_losses_dominate() {
        let mut values: Vec<i64> = vec![200; 10];
        values.extend((180..200).rev());
        let closes = closes_from(&values);
        let value = rsi(&closes, 14).unwrap();
        assert!(value < 30.0, "rsi was {value}");
    }

    #[test]
    fn macd_bullish_in_rising_market() {
        let values: Vec<i64> = (100..160).collect();
        let closes = closes_from(&values);
        let (macd_line, signal_line) = macd(&closes, 12, 26, 9).unwrap();
        assert!(macd_line > 0.0);
        assert!(macd_line > signal_line);
    }

    #[test]
    fn macd_bearish_in_falling_market() {
        let values: Vec<i64> = (100..160).rev().collect();
        let closes = closes_from(&values);
        let (macd_line, signal_line) = macd(&closes, 12, 26, 9).unwrap();
        assert!(macd_line < 0.0);
        assert!(macd_line < signal_line);
    }

    #[test]
    fn macd_none_below_slow_window() {
        let closes = closes_from(&[1; 10]);
        assert_eq!(macd(&closes, 12, 26, 9), None);
    }

    #[test]
    fn bollinger_width_zero_for_constant_series() {
        let closes = vec![dec!(50); 25];
        let bands = bollinger(&closes, 20, 2.0).unwrap();
        assert_eq!(bands.upper, bands.lower);
        assert!((bands.width - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bollinger_sample_std_dev() {
        // Window [1, 2, 3]: mean 2, sample variance 1, std-dev 1
        let closes = closes_from(&[1, 2, 3]);
        let bands = bollinger(&closes, 3, 2.0).unwrap();
        assert_eq!(bands.middle, dec!(2));
        assert_eq!(bands.upper, dec!(4));
        assert_eq!(bands.lower, dec!(0));
        assert!((bands.width - 2.0).abs() < 1e-9);
    }

    #[test]
    fn atr_equals_range_without_gaps() {
        let bars: Vec<OhlcvBar> = (0..20)
            .map(|i| make_bar(100 + i, 101 + i, 99 + i, 100 + i))
            .collect();
        assert_eq!(atr(&bars, 14), Some(dec!(2)));
    }

    #[test]
    fn atr_captures_gap_over_previous_close() {
        // Second bar gaps up: TR = |high - prev_close| = 10
        let bars = vec![make_bar(100, 101, 99, 100), make_bar(109, 110, 108, 109)];
        assert_eq!(atr(&bars, 2), Some(dec!(6))); // (2 + 10) / 2
    }

    #[test]
    fn support_resistance_spans_window_extremes() {
        let mut bars: Vec<OhlcvBar> = (0..30).map(|_| make_bar(100, 105, 95, 100)).collect();
        bars.push(make_bar(100, 120, 90, 100));
        let (support, resistance) = support_resistance(&bars, 20).unwrap();
        assert_eq!(support, dec!(90));
        assert_eq!(resistance, dec!(120));
    }

    #[test]
    fn indicators_none_on_short_history() {
        let bars: Vec<OhlcvBar> = (0..5).map(|i| make_bar(100, 101, 99, 100 + i)).collect();
        let closes: Vec<Decimal> = bars.iter().map(|b| b.close).collect();
        assert!(rsi(&closes, 14).is_none());
        assert!(atr(&bars, 14).is_none());
        assert!(support_resistance(&bars, 20).is_none());
        assert!(bollinger(&closes, 20, 2.0).is_none());
    }
}
