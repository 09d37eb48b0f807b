//! JSON journal of all positions, open and closed.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use swing_trade_core::Position;

pub struct TradeStore {
    path: PathBuf,
}

impl TradeStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the journal. A missing or malformed file yields an empty
    /// collection — startup never fails on persistence.
    #[must_use]
    pub fn load(&self) -> Vec<Position> {
        if !self.path.exists() {
            return Vec::new();
        }
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Could not read trade journal; starting empty"
                );
                return Vec::new();
            }
        };
        match serde_json::from_str(&contents) {
            Ok(positions) => positions,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Malformed trade journal; starting empty"
                );
                Vec::new()
            }
        }
    }

    /// Rewrite the journal with the full position collection.
    ///
    /// # Errors
    ///
    /// Returns an error when the file or its parent directory cannot be
    /// written.
    pub fn save(&self, positions: &[Position]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let json = serde_json::to_vec_pretty(positions)?;
        fs::write(&self.path, json)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }
}
