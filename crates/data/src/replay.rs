//! Fixture-backed market data for simulation runs and tests.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use swing_trade_core::{AnalystRatings, MarketDataProvider, OhlcvBar, OptionsChain};

/// Canned market data for one symbol.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SymbolFixture {
    #[serde(default)]
    pub history: Vec<OhlcvBar>,
    #[serde(default)]
    pub chain: Option<OptionsChain>,
    #[serde(default)]
    pub ratings: Option<AnalystRatings>,
}

/// A [`MarketDataProvider`] serving static fixtures. Symbols without data
/// report unavailable, exactly like an upstream source that has exhausted
/// its retries.
#[derive(Debug, Clone, Default)]
pub struct ReplayProvider {
    fixtures: HashMap<String, SymbolFixture>,
}

impl ReplayProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load fixtures from a JSON file mapping symbol → fixture.
    ///
    /// # Errors
    ///
    /// Unlike the trade journal, a fixture file the operator points at must
    /// parse; errors propagate.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading fixtures {}", path.display()))?;
        let fixtures: HashMap<String, SymbolFixture> = serde_json::from_str(&contents)
            .with_context(|| format!("parsing fixtures {}", path.display()))?;
        Ok(Self { fixtures })
    }

    #[must_use]
    pub fn with_history(mut self, symbol: &str, history: Vec<OhlcvBar>) -> Self {
        self.fixtures.entry(symbol.to_string()).or_default().history = history;
        self
    }

    #[must_use]
    pub fn with_chain(mut self, symbol: &str, chain: OptionsChain) -> Self {
        self.fixtures.entry(symbol.to_string()).or_default().chain = Some(chain);
        self
    }

    #[must_use]
    pub fn with_ratings(mut self, symbol: &str, ratings: AnalystRatings) -> Self {
        self.fixtures.entry(symbol.to_string()).or_default().ratings = Some(ratings);
        self
    }
}

#[async_trait]
impl MarketDataProvider for ReplayProvider {
    async fn history(&self, symbol: &str) -> Option<Vec<OhlcvBar>> {
        self.fixtures
            .get(symbol)
            .map(|f| f.history.clone())
            .filter(|h| !h.is_empty())
    }

    async fn options_chain(&self, symbol: &str, _expiry_count: usize) -> Option<OptionsChain> {
        self.fixtures.get(symbol)?.chain.clone()
    }

    async fn analyst_ratings(&self, symbol: &str) -> Option<AnalystRatings> {
        self.fixtures.get(symbol)?.ratings.clone()
    }
}
