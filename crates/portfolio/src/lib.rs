//! Portfolio ledger: the shared capital pool.
//!
//! All admission, reservation, and release flows through one
//! [`PortfolioLedger`] value. Callers that evaluate instruments concurrently
//! must serialize access (the engine wraps the ledger in an async mutex), so
//! every check-then-commit here is atomic by construction.

pub mod ledger;
pub mod stats;

pub use ledger::PortfolioLedger;
pub use stats::PortfolioStats;
