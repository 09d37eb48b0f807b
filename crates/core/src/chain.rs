//! Options chain and multi-leg structure types.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Options contract right (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionRight {
    Call,
    Put,
}

impl std::fmt::Display for OptionRight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "C"),
            Self::Put => write!(f, "P"),
        }
    }
}

/// One quoted row of an options chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainRow {
    pub strike: Decimal,
    pub right: OptionRight,
    pub expiration: NaiveDate,
    pub last_price: Decimal,
    pub volume: u64,
    pub open_interest: u64,
}

impl ChainRow {
    /// Traded notional of the row (volume × premium × contract multiplier).
    #[must_use]
    pub fn notional(&self) -> Decimal {
        Decimal::from(self.volume) * self.last_price * Decimal::ONE_HUNDRED
    }
}

/// Options chain for a single underlying.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsChain {
    pub underlying: String,
    pub rows: Vec<ChainRow>,
}

impl OptionsChain {
    /// Look up the quote row for an exact strike + right + expiration.
    #[must_use]
    pub fn quote(
        &self,
        strike: Decimal,
        right: OptionRight,
        expiration: NaiveDate,
    ) -> Option<&ChainRow> {
        self.rows
            .iter()
            .find(|r| r.strike == strike && r.right == right && r.expiration == expiration)
    }

    /// Distinct expirations in the chain, ascending.
    #[must_use]
    pub fn expirations(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.rows.iter().map(|r| r.expiration).collect();
        dates.sort_unstable();
        dates.dedup();
        dates
    }

    /// Distinct strikes for one expiration within ±`width` of `price`,
    /// ascending. `width` is a fraction (0.05 = ±5%).
    #[must_use]
    pub fn strikes_near(
        &self,
        expiration: NaiveDate,
        price: Decimal,
        width: Decimal,
    ) -> Vec<Decimal> {
        let lower = price * (Decimal::ONE - width);
        let upper = price * (Decimal::ONE + width);
        let mut strikes: Vec<Decimal> = self
            .rows
            .iter()
            .filter(|r| r.expiration == expiration && r.strike >= lower && r.strike <= upper)
            .map(|r| r.strike)
            .collect();
        strikes.sort_unstable();
        strikes.dedup();
        strikes
    }
}

/// Side of a leg within a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegAction {
    Buy,
    Sell,
}

impl std::fmt::Display for LegAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

fn default_leg_quantity() -> u32 {
    1
}

/// One option contract within a multi-leg structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionLeg {
    pub right: OptionRight,
    pub action: LegAction,
    pub strike: Decimal,
    pub premium: Decimal,
    #[serde(default = "default_leg_quantity")]
    pub quantity: u32,
}

impl OptionLeg {
    /// Single-contract leg.
    #[must_use]
    pub fn new(right: OptionRight, action: LegAction, strike: Decimal, premium: Decimal) -> Self {
        Self {
            right,
            action,
            strike,
            premium,
            quantity: 1,
        }
    }

    #[must_use]
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }
}

/// Multi-leg structure families the builder can construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    BullCallSpread,
    BearPutSpread,
    IronCondor,
    Butterfly,
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BullCallSpread => write!(f, "bull_call_spread"),
            Self::BearPutSpread => write!(f, "bear_put_spread"),
            Self::IronCondor => write!(f, "iron_condor"),
            Self::Butterfly => write!(f, "butterfly"),
        }
    }
}

/// A fully-priced candidate structure produced by the strategy builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyPlan {
    pub symbol: String,
    pub strategy: StrategyKind,
    pub expiry: NaiveDate,
    pub legs: Vec<OptionLeg>,
    /// Worst-case payoff at expiry, in dollars per structure.
    pub max_loss: Decimal,
    /// Best-case payoff at expiry, in dollars per structure.
    pub max_profit: Decimal,
    /// One break-even for verticals, two for condors and butterflies.
    pub break_evens: Vec<Decimal>,
}

impl StrategyPlan {
    /// Risk/reward score used to rank candidates. Zero max loss scores 0
    /// rather than dividing by zero.
    #[must_use]
    pub fn risk_reward_score(&self) -> f64 {
        if self.max_loss.is_zero() {
            return 0.0;
        }
        (self.max_profit / self.max_loss)
            .abs()
            .to_f64()
            .unwrap_or(0.0)
    }
}
