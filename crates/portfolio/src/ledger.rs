//! Capital accounting and position ownership.

use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use swing_trade_core::{ExitRecord, LedgerError, Position, PortfolioConfig};

use crate::stats::PortfolioStats;

/// Owns the capital pool and every position, open or closed.
///
/// Invariants:
/// - capital is reserved before a position is stored and released exactly
///   once when it closes (the reservation map makes a second release
///   unrepresentable);
/// - `available_capital` never goes negative: admission rejects what the
///   pool cannot fund, and a release is floored at zero.
pub struct PortfolioLedger {
    initial_capital: Decimal,
    available_capital: Decimal,
    total_capital: Decimal,
    max_position_size: Decimal,
    position_size_pct: Decimal,
    positions: Vec<Position>,
    reserved: HashMap<Uuid, Decimal>,
}

impl PortfolioLedger {
    #[must_use]
    pub fn new(config: &PortfolioConfig) -> Self {
        Self::with_positions(config, Vec::new())
    }

    /// Rebuild the ledger from a persisted position journal: reservations
    /// are re-derived from open positions and the pool replays realized
    /// profits.
    #[must_use]
    pub fn with_positions(config: &PortfolioConfig, positions: Vec<Position>) -> Self {
        let mut reserved = HashMap::new();
        let mut available = config.initial_capital;
        let mut realized = Decimal::ZERO;
        for position in &positions {
            if position.is_open() {
                let amount = position.reserved_capital();
                available -= amount;
                reserved.insert(position.id, amount);
            } else if let Some(profit) = position.realized_profit() {
                realized += profit;
            }
        }
        available += realized;

        let total_capital = config.initial_capital + realized;
        let mut ledger = Self {
            initial_capital: config.initial_capital,
            available_capital: available.max(Decimal::ZERO),
            total_capital,
            max_position_size: Decimal::ZERO,
            position_size_pct: config.position_size_pct,
            positions,
            reserved,
        };
        ledger.refresh_sizing(Decimal::ZERO);
        ledger
    }

    /// Admission check: one open position per symbol, and the pool must
    /// still fund a full-sized position.
    ///
    /// # Errors
    ///
    /// Returns the rejection reason; callers log and skip.
    pub fn admit(&self, symbol: &str) -> Result<(), LedgerError> {
        if self.has_open(symbol) {
            return Err(LedgerError::DuplicateSymbol {
                symbol: symbol.to_string(),
            });
        }
        if self.available_capital < self.max_position_size {
            return Err(LedgerError::InsufficientCapital {
                available: self.available_capital,
                required: self.max_position_size,
            });
        }
        Ok(())
    }

    /// Atomic admit + reserve + store. The position is only persisted when
    /// the full reservation fits the pool.
    ///
    /// # Errors
    ///
    /// Rejects duplicates and reservations the pool cannot fund.
    pub fn open_position(&mut self, position: Position) -> Result<(), LedgerError> {
        self.admit(&position.symbol)?;

        let amount = position.reserved_capital();
        if amount > self.available_capital {
            return Err(LedgerError::InsufficientCapital {
                available: self.available_capital,
                required: amount,
            });
        }

        self.available_capital -= amount;
        self.reserved.insert(position.id, amount);
        tracing::info!(
            symbol = position.symbol,
            id = %position.id,
            reserved = %amount,
            available = %self.available_capital,
            "Opened position"
        );
        self.positions.push(position);
        Ok(())
    }

    /// Close a position and release its capital: the reserved amount plus
    /// realized profit comes back to the pool (for equities that is exactly
    /// `exit_price × quantity`). A loss beyond the reserved margin floors
    /// the release at zero rather than draining the pool below zero.
    ///
    /// # Errors
    ///
    /// Rejects unknown ids, already-closed positions, and double releases.
    pub fn close_position(&mut self, id: Uuid, exit: ExitRecord) -> Result<(), LedgerError> {
        let index = self
            .positions
            .iter()
            .position(|p| p.id == id)
            .ok_or(LedgerError::UnknownPosition { id })?;
        if !self.positions[index].is_open() {
            return Err(LedgerError::AlreadyClosed { id });
        }
        let reserved = self
            .reserved
            .remove(&id)
            .ok_or(LedgerError::DoubleRelease { id })?;

        let profit = exit.profit;
        let mut release = reserved + profit;
        if release < Decimal::ZERO {
            tracing::warn!(
                id = %id,
                reserved = %reserved,
                profit = %profit,
                "Loss exceeded reserved margin; flooring release at zero"
            );
            release = Decimal::ZERO;
        }

        let reason = exit.reason;
        let symbol = {
            let position = &mut self.positions[index];
            position.close(exit);
            position.symbol.clone()
        };
        self.available_capital += release;
        self.total_capital = self.initial_capital + self.realized_profit();
        tracing::info!(
            symbol,
            id = %id,
            profit = %profit,
            reason = %reason,
            available = %self.available_capital,
            "Closed position"
        );
        Ok(())
    }

    /// Ratchet an open equity position's stop. Returns `true` if raised.
    pub fn raise_stop(&mut self, id: Uuid, new_stop: Decimal) -> bool {
        self.positions
            .iter_mut()
            .find(|p| p.id == id)
            .is_some_and(|p| p.raise_stop(new_stop))
    }

    /// Recompute `max_position_size` as a fixed fraction of total capital
    /// (initial + realized + unrealized), called once per cycle so sizing
    /// adapts to growth and drawdown.
    pub fn refresh_sizing(&mut self, unrealized_pnl: Decimal) {
        self.total_capital = self.initial_capital + self.realized_profit() + unrealized_pnl;
        self.max_position_size = self.total_capital * self.position_size_pct;
    }

    #[must_use]
    pub fn has_open(&self, symbol: &str) -> bool {
        self.positions
            .iter()
            .any(|p| p.symbol == symbol && p.is_open())
    }

    #[must_use]
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    #[must_use]
    pub fn open_positions(&self) -> Vec<&Position> {
        self.positions.iter().filter(|p| p.is_open()).collect()
    }

    #[must_use]
    pub fn available_capital(&self) -> Decimal {
        self.available_capital
    }

    #[must_use]
    pub fn total_capital(&self) -> Decimal {
        self.total_capital
    }

    #[must_use]
    pub fn max_position_size(&self) -> Decimal {
        self.max_position_size
    }

    /// Sum of realized profits over closed positions.
    #[must_use]
    pub fn realized_profit(&self) -> Decimal {
        self.positions
            .iter()
            .filter_map(Position::realized_profit)
            .sum()
    }

    /// Sum of capital currently reserved by open positions.
    #[must_use]
    pub fn reserved_total(&self) -> Decimal {
        self.reserved.values().copied().sum()
    }

    /// Aggregate statistics with the caller-supplied mark-to-market total.
    #[must_use]
    pub fn stats(&self, unrealized_pnl: Decimal) -> PortfolioStats {
        let closed: Vec<&Position> = self.positions.iter().filter(|p| !p.is_open()).collect();
        let winners = closed
            .iter()
            .filter(|p| p.realized_profit().unwrap_or_default() > Decimal::ZERO)
            .count();
        let win_rate = if closed.is_empty() {
            0.0
        } else {
            winners as f64 / closed.len() as f64 * 100.0
        };

        PortfolioStats {
            total_capital: self.initial_capital + self.realized_profit() + unrealized_pnl,
            available_capital: self.available_capital,
            total_trades: self.positions.len(),
            open_positions: self.open_positions().len(),
            win_rate,
            total_profit: self.realized_profit(),
            unrealized_pnl,
        }
    }
}
