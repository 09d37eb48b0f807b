use crate::chain::OptionsChain;
use crate::signal::{AnalystRatings, OhlcvBar, SignalSnapshot};
use async_trait::async_trait;

/// Market-data collaborator boundary.
///
/// Implementations are expected to apply their own retry/backoff and never
/// raise: every method returns `None` for "unavailable after exhausting
/// retries", which the engine treats as skip-this-cycle, not as an error.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// OHLCV history for `symbol`, oldest bar first.
    async fn history(&self, symbol: &str) -> Option<Vec<OhlcvBar>>;

    /// Options chain covering the nearest `expiry_count` expirations.
    async fn options_chain(&self, symbol: &str, expiry_count: usize) -> Option<OptionsChain>;

    /// Consensus analyst ratings.
    async fn analyst_ratings(&self, symbol: &str) -> Option<AnalystRatings>;
}

/// Optional trade-scoring capability.
///
/// Injected where a trained model is available; [`NoopScorer`] otherwise.
/// Returning `None` disables the veto entirely — absence of a model is not
/// an error.
pub trait Scorer: Send + Sync {
    /// Predicted probability in [0, 1] that a trade taken on this snapshot
    /// succeeds.
    fn predict_success(&self, snapshot: &SignalSnapshot) -> Option<f64>;
}

/// Default scorer used when no model is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopScorer;

impl Scorer for NoopScorer {
    fn predict_success(&self, _snapshot: &SignalSnapshot) -> Option<f64> {
        None
    }
}
