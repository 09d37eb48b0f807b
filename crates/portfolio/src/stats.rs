//! Aggregate portfolio statistics.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Snapshot of portfolio performance, reported once per cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioStats {
    /// Initial capital + realized profit + unrealized P&L.
    pub total_capital: Decimal,
    /// Capital not reserved by open positions.
    pub available_capital: Decimal,
    /// All positions ever taken, open and closed.
    pub total_trades: usize,
    pub open_positions: usize,
    /// Closed winners / closed total × 100.
    pub win_rate: f64,
    /// Sum of realized profits.
    pub total_profit: Decimal,
    /// Mark-to-market P&L over open positions.
    pub unrealized_pnl: Decimal,
}
