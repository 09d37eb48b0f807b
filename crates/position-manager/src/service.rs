//! Main service loop — evaluate, monitor, report, sleep.

use std::time::Duration;

use anyhow::Result;
use tracing::{error, info};

use swing_trade_core::{MarketDataProvider, PositionDetail};

use crate::engine::TradeEngine;

/// Run the engine on its poll interval until the process is stopped.
///
/// Each tick:
/// 1. Evaluate the universe and open qualifying positions
/// 2. Run exit rules over open positions
/// 3. Log portfolio status
///
/// # Errors
///
/// Never returns under normal operation; cycle failures are logged and the
/// loop continues.
pub async fn run<P: MarketDataProvider>(engine: TradeEngine<P>) -> Result<()> {
    let poll_secs = engine.poll_interval_secs();
    info!(poll_secs, "Trading engine started");

    let mut interval = tokio::time::interval(Duration::from_secs(poll_secs));
    let universe = engine.universe().to_vec();
    loop {
        interval.tick().await;

        match engine.evaluate_universe(&universe).await {
            Ok(opened) if !opened.is_empty() => {
                info!(count = opened.len(), "Found new trading opportunities");
                for position in &opened {
                    match &position.detail {
                        PositionDetail::Equity {
                            entry_price,
                            quantity,
                            ..
                        } => info!(
                            symbol = position.symbol,
                            entry = %entry_price,
                            quantity,
                            "New equity position"
                        ),
                        PositionDetail::Options {
                            strategy,
                            expiry,
                            max_loss,
                            max_profit,
                            ..
                        } => info!(
                            symbol = position.symbol,
                            strategy = %strategy,
                            expiry = %expiry,
                            max_loss = %max_loss,
                            max_profit = %max_profit,
                            "New options position"
                        ),
                    }
                }
            }
            Ok(_) => {}
            Err(e) => error!(error = %e, "Evaluation cycle failed"),
        }

        match engine.monitor().await {
            Ok(report) => {
                for position in &report.closed {
                    if let Some(exit) = &position.exit {
                        info!(
                            symbol = position.symbol,
                            profit = %exit.profit,
                            reason = %exit.reason,
                            "Position closed"
                        );
                    }
                }
            }
            Err(e) => error!(error = %e, "Monitoring cycle failed"),
        }

        let stats = engine.stats().await;
        info!(
            total_capital = %stats.total_capital,
            available_capital = %stats.available_capital,
            win_rate = stats.win_rate,
            total_trades = stats.total_trades,
            unrealized_pnl = %stats.unrealized_pnl,
            "Portfolio status"
        );
    }
}
