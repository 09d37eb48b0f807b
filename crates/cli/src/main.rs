use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use swing_trade_core::{ConfigLoader, NoopScorer, PositionDetail};
use swing_trade_data::ReplayProvider;
use swing_trade_position_manager::{service, TradeEngine};

#[derive(Parser)]
#[command(name = "swing-trade")]
#[command(about = "Automated equity and options paper-trading engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the trading engine poll loop
    Run {
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
    },
    /// Print portfolio statistics
    Stats {
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
    },
    /// List all tracked positions
    Positions {
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run { config } => {
            let engine = build_engine(&config)?;
            service::run(engine).await
        }
        Commands::Stats { config } => {
            let engine = build_engine(&config)?;
            let stats = engine.stats().await;
            println!("Total capital:     {}", stats.total_capital);
            println!("Available capital: {}", stats.available_capital);
            println!("Total trades:      {}", stats.total_trades);
            println!("Open positions:    {}", stats.open_positions);
            println!("Win rate:          {:.1}%", stats.win_rate);
            println!("Total profit:      {}", stats.total_profit);
            println!("Unrealized P&L:    {}", stats.unrealized_pnl);
            Ok(())
        }
        Commands::Positions { config } => {
            let engine = build_engine(&config)?;
            let positions = engine.positions().await;
            if positions.is_empty() {
                println!("No positions tracked");
                return Ok(());
            }
            for position in positions {
                let status = if position.is_open() { "open" } else { "closed" };
                match &position.detail {
                    PositionDetail::Equity {
                        entry_price,
                        quantity,
                        ..
                    } => println!(
                        "{}  {:<6} equity   {} × {} [{}]",
                        position.id, position.symbol, quantity, entry_price, status
                    ),
                    PositionDetail::Options {
                        strategy, expiry, ..
                    } => println!(
                        "{}  {:<6} {} expiring {} [{}]",
                        position.id, position.symbol, strategy, expiry, status
                    ),
                }
            }
            Ok(())
        }
    }
}

fn build_engine(config_path: &str) -> Result<TradeEngine<ReplayProvider>> {
    let config = ConfigLoader::load_from(config_path)?;
    let provider = match &config.data.fixtures_file {
        Some(path) => ReplayProvider::from_file(path)?,
        None => bail!("no market data source configured; set data.fixtures_file"),
    };
    Ok(TradeEngine::new(provider, Arc::new(NoopScorer), config))
}
