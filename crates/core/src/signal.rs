//! Signal snapshot types — the immutable per-instrument evaluation record.
//!
//! A [`SignalSnapshot`] is produced once per instrument per evaluation cycle
//! and never mutated afterwards. Every opened position embeds a frozen copy
//! of the snapshot that justified it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single OHLCV history bar, oldest-first in a series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OhlcvBar {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl OhlcvBar {
    /// High-to-low range of the bar.
    #[must_use]
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }
}

/// Consensus analyst recommendation, normalized from upstream strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl Recommendation {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StrongBuy => "strong_buy",
            Self::Buy => "buy",
            Self::Hold => "hold",
            Self::Sell => "sell",
            Self::StrongSell => "strong_sell",
        }
    }

    /// Parses from upstream representations ("BUY", "strong_buy", ...).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "strong_buy" | "strongbuy" => Some(Self::StrongBuy),
            "buy" => Some(Self::Buy),
            "hold" => Some(Self::Hold),
            "sell" => Some(Self::Sell),
            "strong_sell" | "strongsell" => Some(Self::StrongSell),
            _ => None,
        }
    }

    /// True for recommendations in the buy set.
    #[must_use]
    pub const fn is_bullish(self) -> bool {
        matches!(self, Self::Buy | Self::StrongBuy)
    }

    /// True for recommendations in the sell set.
    #[must_use]
    pub const fn is_bearish(self) -> bool {
        matches!(self, Self::Sell | Self::StrongSell)
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw analyst data as returned by the market-data collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalystRatings {
    pub recommendation: Recommendation,
    pub mean_rating: f64,
    pub target_price: Decimal,
}

/// Technical-indicator section of a snapshot.
///
/// Price-denominated values are `Decimal`; oscillators and ratios are `f64`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalSignals {
    pub price: Decimal,
    pub rsi: f64,
    pub oversold: bool,
    pub overbought: bool,
    pub sma_20: Decimal,
    pub sma_50: Decimal,
    pub uptrend: bool,
    pub support: Decimal,
    pub resistance: Decimal,
    pub near_support: bool,
    pub near_resistance: bool,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_bullish: bool,
    pub bollinger_upper: Decimal,
    pub bollinger_lower: Decimal,
    pub bollinger_width: f64,
    pub below_bollinger: bool,
    pub above_bollinger: bool,
    pub atr: Decimal,
    pub atr_percent: f64,
}

/// Options-flow section of a snapshot, aggregated over the fetched chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowSignals {
    pub call_volume: u64,
    pub put_volume: u64,
    pub put_call_ratio: f64,
    pub net_money_flow: Decimal,
    pub money_flow_ratio: f64,
    pub bullish_flow: bool,
    pub strong_flow: bool,
    pub high_activity: bool,
}

/// Analyst section of a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalystSignals {
    pub recommendation: Recommendation,
    pub mean_rating: f64,
    pub target_price: Decimal,
    pub bullish: bool,
    pub bearish: bool,
}

/// Complete per-instrument signal snapshot for one evaluation cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalSnapshot {
    pub symbol: String,
    pub as_of: DateTime<Utc>,
    pub technical: TechnicalSignals,
    pub flow: FlowSignals,
    pub analyst: AnalystSignals,
}

impl SignalSnapshot {
    /// Latest close price the snapshot was evaluated at.
    #[must_use]
    pub fn price(&self) -> Decimal {
        self.technical.price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommendation_parses_upstream_strings() {
        assert_eq!(Recommendation::parse("BUY"), Some(Recommendation::Buy));
        assert_eq!(
            Recommendation::parse("STRONG_BUY"),
            Some(Recommendation::StrongBuy)
        );
        assert_eq!(Recommendation::parse("hold"), Some(Recommendation::Hold));
        assert_eq!(Recommendation::parse("garbage"), None);
    }

    #[test]
    fn recommendation_buy_and_sell_sets_are_disjoint() {
        for rec in [
            Recommendation::StrongBuy,
            Recommendation::Buy,
            Recommendation::Hold,
            Recommendation::Sell,
            Recommendation::StrongSell,
        ] {
            assert!(!(rec.is_bullish() && rec.is_bearish()));
        }
        assert!(Recommendation::StrongBuy.is_bullish());
        assert!(!Recommendation::Hold.is_bullish());
        assert!(Recommendation::StrongSell.is_bearish());
    }
}
