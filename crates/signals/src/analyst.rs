//! Analyst-rating normalization.

use swing_trade_core::{AnalystRatings, AnalystSignals};

/// Derive the bullish/bearish flags from recommendation set membership.
#[must_use]
pub fn analyst_signals(ratings: &AnalystRatings) -> AnalystSignals {
    AnalystSignals {
        recommendation: ratings.recommendation,
        mean_rating: ratings.mean_rating,
        target_price: ratings.target_price,
        bullish: ratings.recommendation.is_bullish(),
        bearish: ratings.recommendation.is_bearish(),
    }
}
