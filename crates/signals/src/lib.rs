//! Signal evaluation for the swing trading engine.
//!
//! Converts raw OHLCV history, an options chain, and analyst ratings into an
//! immutable [`swing_trade_core::SignalSnapshot`]. Evaluation is a pure
//! function of its inputs: insufficient or missing data yields `None`
//! (a legitimate no-signal outcome), never an error and never a partial
//! snapshot.

pub mod analyst;
pub mod evaluator;
pub mod flow;
pub mod indicators;

pub use analyst::analyst_signals;
pub use evaluator::{evaluate, MIN_HISTORY_BARS};
pub use flow::flow_signals;
