//! Application configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub portfolio: PortfolioConfig,
    pub engine: EngineConfig,
    pub data: DataConfig,
}

/// Capital pool and sizing policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioConfig {
    /// Starting capital for the pool.
    pub initial_capital: Decimal,
    /// Fraction of total capital a single position may command (0.02 = 2%).
    pub position_size_pct: Decimal,
    /// Fraction of total capital risked when sizing an equity entry.
    pub risk_per_trade_pct: Decimal,
    /// Equity max-loss breach threshold (0.20 = close at -20% P&L).
    pub max_loss_pct: Decimal,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            initial_capital: Decimal::from(100_000),
            position_size_pct: Decimal::new(2, 2),
            risk_per_trade_pct: Decimal::new(2, 2),
            max_loss_pct: Decimal::new(20, 2),
        }
    }
}

/// Evaluation-cycle and strategy-construction parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How often to poll (seconds).
    pub poll_interval_secs: u64,
    /// Symbols evaluated each cycle.
    pub universe: Vec<String>,
    /// Equity P&L% above which the trailing stop starts ratcheting.
    pub trailing_trigger_pct: Decimal,
    /// Trail the stop to this fraction of current price (0.95 = 5% below).
    pub trailing_stop_factor: Decimal,
    /// Eligible options expiries: days-to-expiry lower bound.
    pub expiry_min_days: i64,
    /// Eligible options expiries: days-to-expiry upper bound.
    pub expiry_max_days: i64,
    /// Candidate strikes within ±this fraction of current price.
    pub strike_width_pct: Decimal,
    /// How many expirations to request from the chain provider.
    pub expiry_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 300,
            universe: Vec::new(),
            trailing_trigger_pct: Decimal::from(10),
            trailing_stop_factor: Decimal::new(95, 2),
            expiry_min_days: 30,
            expiry_max_days: 60,
            strike_width_pct: Decimal::new(5, 2),
            expiry_count: 3,
        }
    }
}

/// Persistence and collaborator-retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// JSON journal of all positions, open and closed.
    pub trades_file: String,
    /// Market-data fixture file for the replay provider.
    pub fixtures_file: Option<String>,
    /// Upstream fetch retry attempts before degrading to unavailable.
    pub max_retries: u32,
    /// Base delay for exponential backoff between retries (milliseconds).
    pub retry_base_ms: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            trades_file: "data/paper_trades.json".to_string(),
            fixtures_file: None,
            max_retries: 3,
            retry_base_ms: 500,
        }
    }
}
