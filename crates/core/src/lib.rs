pub mod chain;
pub mod config;
pub mod config_loader;
pub mod error;
pub mod position;
pub mod signal;
pub mod traits;

pub use chain::{
    ChainRow, LegAction, OptionLeg, OptionRight, OptionsChain, StrategyKind, StrategyPlan,
};
pub use config::{AppConfig, DataConfig, EngineConfig, PortfolioConfig};
pub use config_loader::ConfigLoader;
pub use error::{LedgerError, TradeError};
pub use position::{
    CloseReason, EquityRisk, ExitRecord, OptionsRisk, Position, PositionDetail, PositionStatus,
};
pub use signal::{
    AnalystRatings, AnalystSignals, FlowSignals, OhlcvBar, Recommendation, SignalSnapshot,
    TechnicalSignals,
};
pub use traits::{MarketDataProvider, NoopScorer, Scorer};
