//! Error taxonomy for the decision engine.
//!
//! Business-rule rejections (no trade, no structure) are ordinary values in
//! this codebase; the enums here carry the reason so callers can log and
//! skip. Ledger violations are the exception — those indicate a broken
//! invariant and are surfaced loudly.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Rejections raised while turning a signal into a trade.
#[derive(Debug, Error)]
pub enum TradeError {
    /// Upstream data was missing or insufficient; skip the instrument this
    /// cycle.
    #[error("market data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Sized quantity came out below one share.
    #[error("position size below one share at price {price}")]
    InsufficientSize { price: Decimal },

    /// An options structure could not be priced from the chain.
    #[error("could not construct {strategy}: {reason}")]
    ConstructionFailure { strategy: String, reason: String },
}

/// Violations of the capital ledger's admission and release rules.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("available capital {available} below required {required}")]
    InsufficientCapital {
        available: Decimal,
        required: Decimal,
    },

    #[error("open position already exists for {symbol}")]
    DuplicateSymbol { symbol: String },

    #[error("unknown position {id}")]
    UnknownPosition { id: Uuid },

    #[error("position {id} is already closed")]
    AlreadyClosed { id: Uuid },

    /// No reservation recorded for the position — a second release attempt.
    #[error("no reserved capital recorded for position {id}")]
    DoubleRelease { id: Uuid },
}
