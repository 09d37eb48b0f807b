//! Multi-leg structure construction.
//!
//! Each builder validates every leg against an exact strike + right +
//! expiration row of the chain; a missing quote fails the whole structure
//! (construction is all-or-nothing).

use chrono::NaiveDate;
use rust_decimal::Decimal;

use swing_trade_core::{
    ChainRow, LegAction, OptionLeg, OptionRight, OptionsChain, StrategyKind, StrategyPlan,
    TradeError,
};

fn quote<'a>(
    chain: &'a OptionsChain,
    strike: Decimal,
    right: OptionRight,
    expiry: NaiveDate,
    strategy: StrategyKind,
) -> Result<&'a ChainRow, TradeError> {
    chain
        .quote(strike, right, expiry)
        .ok_or_else(|| TradeError::ConstructionFailure {
            strategy: strategy.to_string(),
            reason: format!("no {right} quote at strike {strike} expiring {expiry}"),
        })
}

fn insufficient_strikes(strategy: StrategyKind, needed: usize, got: usize) -> TradeError {
    TradeError::ConstructionFailure {
        strategy: strategy.to_string(),
        reason: format!("needs {needed} candidate strikes, got {got}"),
    }
}

/// Buy the lowest candidate strike call, sell the highest.
pub fn bull_call_spread(
    symbol: &str,
    chain: &OptionsChain,
    expiry: NaiveDate,
    strikes: &[Decimal],
) -> Result<StrategyPlan, TradeError> {
    let kind = StrategyKind::BullCallSpread;
    if strikes.len() < 2 {
        return Err(insufficient_strikes(kind, 2, strikes.len()));
    }
    let long_strike = strikes[0];
    let short_strike = strikes[strikes.len() - 1];
    let long = quote(chain, long_strike, OptionRight::Call, expiry, kind)?;
    let short = quote(chain, short_strike, OptionRight::Call, expiry, kind)?;

    let max_loss = (long.last_price - short.last_price) * Decimal::ONE_HUNDRED;
    let max_profit = (short_strike - long_strike) * Decimal::ONE_HUNDRED - max_loss;
    let break_even = long_strike + max_loss / Decimal::ONE_HUNDRED;

    Ok(StrategyPlan {
        symbol: symbol.to_string(),
        strategy: kind,
        expiry,
        legs: vec![
            OptionLeg::new(
                OptionRight::Call,
                LegAction::Buy,
                long_strike,
                long.last_price,
            ),
            OptionLeg::new(
                OptionRight::Call,
                LegAction::Sell,
                short_strike,
                short.last_price,
            ),
        ],
        max_loss,
        max_profit,
        break_evens: vec![break_even],
    })
}

/// Buy the highest candidate strike put, sell the lowest.
pub fn bear_put_spread(
    symbol: &str,
    chain: &OptionsChain,
    expiry: NaiveDate,
    strikes: &[Decimal],
) -> Result<StrategyPlan, TradeError> {
    let kind = StrategyKind::BearPutSpread;
    if strikes.len() < 2 {
        return Err(insufficient_strikes(kind, 2, strikes.len()));
    }
    let long_strike = strikes[strikes.len() - 1];
    let short_strike = strikes[0];
    let long = quote(chain, long_strike, OptionRight::Put, expiry, kind)?;
    let short = quote(chain, short_strike, OptionRight::Put, expiry, kind)?;

    let max_loss = (long.last_price - short.last_price) * Decimal::ONE_HUNDRED;
    let max_profit = (long_strike - short_strike) * Decimal::ONE_HUNDRED - max_loss;
    let break_even = long_strike - max_loss / Decimal::ONE_HUNDRED;

    Ok(StrategyPlan {
        symbol: symbol.to_string(),
        strategy: kind,
        expiry,
        legs: vec![
            OptionLeg::new(
                OptionRight::Put,
                LegAction::Buy,
                long_strike,
                long.last_price,
            ),
            OptionLeg::new(
                OptionRight::Put,
                LegAction::Sell,
                short_strike,
                short.last_price,
            ),
        ],
        max_loss,
        max_profit,
        break_evens: vec![break_even],
    })
}

/// Put spread below, call spread above: the lowest two candidate strikes
/// form the put side (buy lower, sell upper), the highest two form the call
/// side (sell lower, buy upper).
pub fn iron_condor(
    symbol: &str,
    chain: &OptionsChain,
    expiry: NaiveDate,
    strikes: &[Decimal],
) -> Result<StrategyPlan, TradeError> {
    let kind = StrategyKind::IronCondor;
    if strikes.len() < 4 {
        return Err(insufficient_strikes(kind, 4, strikes.len()));
    }
    let (put_low, put_high) = (strikes[0], strikes[1]);
    let (call_low, call_high) = (strikes[strikes.len() - 2], strikes[strikes.len() - 1]);

    let long_put = quote(chain, put_low, OptionRight::Put, expiry, kind)?;
    let short_put = quote(chain, put_high, OptionRight::Put, expiry, kind)?;
    let short_call = quote(chain, call_low, OptionRight::Call, expiry, kind)?;
    let long_call = quote(chain, call_high, OptionRight::Call, expiry, kind)?;

    let net_credit = short_put.last_price + short_call.last_price
        - long_put.last_price
        - long_call.last_price;
    let max_profit = net_credit * Decimal::ONE_HUNDRED;
    let width = (call_high - call_low).min(put_high - put_low);
    let max_loss = width * Decimal::ONE_HUNDRED - max_profit;

    Ok(StrategyPlan {
        symbol: symbol.to_string(),
        strategy: kind,
        expiry,
        legs: vec![
            OptionLeg::new(
                OptionRight::Put,
                LegAction::Buy,
                put_low,
                long_put.last_price,
            ),
            OptionLeg::new(
                OptionRight::Put,
                LegAction::Sell,
                put_high,
                short_put.last_price,
            ),
            OptionLeg::new(
                OptionRight::Call,
                LegAction::Sell,
                call_low,
                short_call.last_price,
            ),
            OptionLeg::new(
                OptionRight::Call,
                LegAction::Buy,
                call_high,
                long_call.last_price,
            ),
        ],
        max_loss,
        max_profit,
        break_evens: vec![put_high - net_credit, call_low + net_credit],
    })
}

/// Call butterfly: buy the lowest and highest candidate strikes, sell two of
/// the middle.
pub fn butterfly(
    symbol: &str,
    chain: &OptionsChain,
    expiry: NaiveDate,
    strikes: &[Decimal],
) -> Result<StrategyPlan, TradeError> {
    let kind = StrategyKind::Butterfly;
    if strikes.len() < 3 {
        return Err(insufficient_strikes(kind, 3, strikes.len()));
    }
    let lower = strikes[0];
    let middle = strikes[strikes.len() / 2];
    let upper = strikes[strikes.len() - 1];

    let lower_call = quote(chain, lower, OptionRight::Call, expiry, kind)?;
    let middle_call = quote(chain, middle, OptionRight::Call, expiry, kind)?;
    let upper_call = quote(chain, upper, OptionRight::Call, expiry, kind)?;

    let net_debit = lower_call.last_price - Decimal::TWO * middle_call.last_price
        + upper_call.last_price;
    let max_loss = net_debit * Decimal::ONE_HUNDRED;
    let max_profit = (middle - lower) * Decimal::ONE_HUNDRED - max_loss;

    Ok(StrategyPlan {
        symbol: symbol.to_string(),
        strategy: kind,
        expiry,
        legs: vec![
            OptionLeg::new(
                OptionRight::Call,
                LegAction::Buy,
                lower,
                lower_call.last_price,
            ),
            OptionLeg::new(
                OptionRight::Call,
                LegAction::Sell,
                middle,
                middle_call.last_price,
            )
            .with_quantity(2),
            OptionLeg::new(
                OptionRight::Call,
                LegAction::Buy,
                upper,
                upper_call.last_price,
            ),
        ],
        max_loss,
        max_profit,
        break_evens: vec![lower + net_debit, upper - net_debit],
    })
}
