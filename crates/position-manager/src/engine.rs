//! The evaluation-cycle engine.
//!
//! One engine instance owns the market-data provider, the (mutex-guarded)
//! capital ledger, and the position journal. Instruments are evaluated
//! without holding the ledger lock; admission + reservation happens as one
//! atomic call, so a cycle can be abandoned between instruments without
//! corrupting ledger state.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use swing_trade_core::{
    AppConfig, EquityRisk, ExitRecord, MarketDataProvider, Position, PositionDetail, Scorer,
};
use swing_trade_data::TradeStore;
use swing_trade_portfolio::{PortfolioLedger, PortfolioStats};
use swing_trade_signals::evaluate;
use swing_trade_strategy::{entry_signal, StrategySelector, TradeFactory, TradeKind};

use crate::equity::{self, CloseDecision, TrailingRule};
use crate::options;

/// Predicted success probability below which the scorer vetoes a signal.
const SCORER_VETO_THRESHOLD: f64 = 0.5;

/// Open/closed split reported by a monitoring pass.
#[derive(Debug, Clone)]
pub struct MonitorReport {
    pub open: Vec<Position>,
    /// Positions that transitioned to closed this cycle.
    pub closed: Vec<Position>,
}

pub struct TradeEngine<P: MarketDataProvider> {
    provider: P,
    scorer: Arc<dyn Scorer>,
    ledger: Arc<Mutex<PortfolioLedger>>,
    store: TradeStore,
    selector: StrategySelector,
    factory: TradeFactory,
    config: AppConfig,
}

impl<P: MarketDataProvider> TradeEngine<P> {
    /// Build the engine, restoring any persisted position journal.
    #[must_use]
    pub fn new(provider: P, scorer: Arc<dyn Scorer>, config: AppConfig) -> Self {
        let store = TradeStore::new(&config.data.trades_file);
        let positions = store.load();
        if !positions.is_empty() {
            info!(count = positions.len(), "Restored position journal");
        }
        let ledger = PortfolioLedger::with_positions(&config.portfolio, positions);

        Self {
            selector: StrategySelector::new(&config.engine),
            factory: TradeFactory::new(config.portfolio.risk_per_trade_pct),
            provider,
            scorer,
            ledger: Arc::new(Mutex::new(ledger)),
            store,
            config,
        }
    }

    #[must_use]
    pub fn poll_interval_secs(&self) -> u64 {
        self.config.engine.poll_interval_secs
    }

    /// Symbols configured for evaluation.
    #[must_use]
    pub fn universe(&self) -> &[String] {
        &self.config.engine.universe
    }

    /// Evaluate a universe of symbols and open qualifying positions.
    /// Returns the positions newly opened this cycle.
    ///
    /// # Errors
    ///
    /// Only journal-persistence failures propagate; per-symbol data gaps
    /// and business rejections are logged and skipped.
    pub async fn evaluate_universe(&self, symbols: &[String]) -> Result<Vec<Position>> {
        let unrealized = self.mark_open_positions().await;
        self.ledger.lock().await.refresh_sizing(unrealized);

        let mut opened = Vec::new();
        for symbol in symbols {
            {
                let ledger = self.ledger.lock().await;
                if ledger.has_open(symbol) {
                    info!(symbol, "Skipping symbol — already an open position");
                    continue;
                }
                if ledger.available_capital() < ledger.max_position_size() {
                    info!(
                        available = %ledger.available_capital(),
                        required = %ledger.max_position_size(),
                        "Insufficient available capital for new positions; stopping signal check"
                    );
                    break;
                }
            }

            let Some(position) = self.evaluate_symbol(symbol).await else {
                continue;
            };

            let mut ledger = self.ledger.lock().await;
            match ledger.open_position(position.clone()) {
                Ok(()) => opened.push(position),
                Err(e) => info!(symbol, reason = %e, "Admission rejected trade"),
            }
            self.persist(&ledger)?;
        }
        Ok(opened)
    }

    /// Fetch, evaluate, gate, and build a candidate position for one symbol.
    async fn evaluate_symbol(&self, symbol: &str) -> Option<Position> {
        let Some(bars) = self.provider.history(symbol).await else {
            debug!(symbol, "History unavailable; skipping this cycle");
            return None;
        };
        let expiry_count = self.config.engine.expiry_count;
        let Some(chain) = self.provider.options_chain(symbol, expiry_count).await else {
            debug!(symbol, "Options chain unavailable; skipping this cycle");
            return None;
        };
        let Some(ratings) = self.provider.analyst_ratings(symbol).await else {
            debug!(symbol, "Analyst ratings unavailable; skipping this cycle");
            return None;
        };

        let snapshot = evaluate(symbol, &bars, &chain, &ratings, Utc::now())?;

        if let Some(probability) = self.scorer.predict_success(&snapshot) {
            if probability < SCORER_VETO_THRESHOLD {
                info!(symbol, probability, "Scorer vetoed trade signal");
                return None;
            }
        }

        match entry_signal(&snapshot)? {
            TradeKind::Equity => {
                let total_capital = self.ledger.lock().await.total_capital();
                match self.factory.build_equity_trade(&snapshot, total_capital) {
                    Ok(position) => Some(position),
                    Err(e) => {
                        debug!(symbol, reason = %e, "No equity trade");
                        None
                    }
                }
            }
            TradeKind::Options => {
                let today = Utc::now().date_naive();
                let plan = self.selector.select(&snapshot, &chain, today)?;
                Some(self.factory.build_options_trade(plan, &snapshot))
            }
        }
    }

    /// Run exit rules for every open position. Trailing updates and closes
    /// go through the ledger; closed positions are never revisited.
    ///
    /// # Errors
    ///
    /// Only journal-persistence failures propagate.
    pub async fn monitor(&self) -> Result<MonitorReport> {
        let open: Vec<Position> = {
            let ledger = self.ledger.lock().await;
            ledger.open_positions().into_iter().cloned().collect()
        };

        let mut closed = Vec::new();
        for position in open {
            match &position.detail {
                PositionDetail::Equity {
                    entry_price,
                    quantity,
                    risk,
                } => {
                    let Some(price) = self.latest_price(&position.symbol).await else {
                        debug!(
                            symbol = position.symbol,
                            "No current price; leaving position open"
                        );
                        continue;
                    };

                    let rule = TrailingRule {
                        trigger_pct: self.config.engine.trailing_trigger_pct,
                        stop_factor: self.config.engine.trailing_stop_factor,
                    };
                    let mut stop = risk.stop_price;
                    if let Some(new_stop) = equity::trailing_stop(*entry_price, stop, price, rule)
                    {
                        if self.ledger.lock().await.raise_stop(position.id, new_stop) {
                            info!(
                                symbol = position.symbol,
                                stop = %new_stop,
                                "Trailing stop raised"
                            );
                            stop = new_stop;
                        }
                    }

                    let current_risk = EquityRisk {
                        stop_price: stop,
                        target_price: risk.target_price,
                    };
                    if let Some(decision) = equity::equity_exit(
                        *entry_price,
                        *quantity,
                        &current_risk,
                        price,
                        self.config.portfolio.max_loss_pct,
                    ) {
                        self.close(&position, decision, &mut closed).await;
                    }
                }
                PositionDetail::Options {
                    expiry, legs, risk, ..
                } => {
                    let Some(chain) = self.provider.options_chain(&position.symbol, 1).await
                    else {
                        debug!(
                            symbol = position.symbol,
                            "Chain unavailable; leaving position open"
                        );
                        continue;
                    };
                    let Some(unrealized) = options::unrealized_pnl(legs, *expiry, &chain) else {
                        debug!(
                            symbol = position.symbol,
                            "Leg quote unavailable; retrying next cycle"
                        );
                        continue;
                    };
                    if let Some(decision) = options::options_exit(risk, unrealized) {
                        self.close(&position, decision, &mut closed).await;
                    }
                }
            }
        }

        let ledger = self.ledger.lock().await;
        self.persist(&ledger)?;
        let open = ledger.open_positions().into_iter().cloned().collect();
        Ok(MonitorReport { open, closed })
    }

    /// All tracked positions, open and closed.
    pub async fn positions(&self) -> Vec<Position> {
        self.ledger.lock().await.positions().to_vec()
    }

    /// Portfolio statistics with fresh mark-to-market, also refreshing the
    /// per-cycle position sizing.
    pub async fn stats(&self) -> PortfolioStats {
        let unrealized = self.mark_open_positions().await;
        let mut ledger = self.ledger.lock().await;
        ledger.refresh_sizing(unrealized);
        ledger.stats(unrealized)
    }

    async fn close(
        &self,
        position: &Position,
        decision: CloseDecision,
        closed: &mut Vec<Position>,
    ) {
        let exit = ExitRecord {
            closed_at: Utc::now(),
            exit_value: decision.exit_value,
            profit: decision.profit,
            reason: decision.reason,
        };
        let mut ledger = self.ledger.lock().await;
        match ledger.close_position(position.id, exit) {
            Ok(()) => {
                if let Some(p) = ledger.positions().iter().find(|p| p.id == position.id) {
                    closed.push(p.clone());
                }
            }
            Err(e) => warn!(id = %position.id, error = %e, "Close rejected"),
        }
    }

    async fn latest_price(&self, symbol: &str) -> Option<Decimal> {
        let bars = self.provider.history(symbol).await?;
        bars.last().map(|b| b.close)
    }

    /// Mark-to-market total over open positions. A position whose data is
    /// unavailable this cycle contributes nothing.
    async fn mark_open_positions(&self) -> Decimal {
        let open: Vec<Position> = {
            let ledger = self.ledger.lock().await;
            ledger.open_positions().into_iter().cloned().collect()
        };

        let mut total = Decimal::ZERO;
        for position in open {
            match &position.detail {
                PositionDetail::Equity {
                    entry_price,
                    quantity,
                    ..
                } => {
                    if let Some(price) = self.latest_price(&position.symbol).await {
                        total += (price - entry_price) * Decimal::from(*quantity);
                    }
                }
                PositionDetail::Options { expiry, legs, .. } => {
                    if let Some(chain) = self.provider.options_chain(&position.symbol, 1).await {
                        if let Some(unrealized) = options::unrealized_pnl(legs, *expiry, &chain) {
                            total += unrealized;
                        }
                    }
                }
            }
        }
        total
    }

    fn persist(&self, ledger: &PortfolioLedger) -> Result<()> {
        self.store.save(ledger.positions())
    }
}
