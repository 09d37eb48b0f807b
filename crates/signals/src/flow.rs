//! Options-flow aggregation over a fetched chain.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use swing_trade_core::{FlowSignals, OptionRight, OptionsChain};

/// Money-flow ratio above which flow counts as a strong directional bias.
const STRONG_FLOW_THRESHOLD: f64 = 0.3;
/// Combined call+put volume above which the chain counts as actively traded.
const HIGH_ACTIVITY_VOLUME: u64 = 1_000;

/// Aggregate the chain into flow signals. An empty chain carries no
/// information and yields `None`.
#[must_use]
pub fn flow_signals(chain: &OptionsChain) -> Option<FlowSignals> {
    if chain.rows.is_empty() {
        return None;
    }

    let mut call_volume = 0u64;
    let mut put_volume = 0u64;
    let mut call_value = Decimal::ZERO;
    let mut put_value = Decimal::ZERO;
    for row in &chain.rows {
        match row.right {
            OptionRight::Call => {
                call_volume += row.volume;
                call_value += row.notional();
            }
            OptionRight::Put => {
                put_volume += row.volume;
                put_value += row.notional();
            }
        }
    }

    let put_call_ratio = put_volume as f64 / call_volume.max(1) as f64;
    let net_money_flow = call_value - put_value;
    let total_value = call_value + put_value;
    let money_flow_ratio = if total_value > Decimal::ZERO {
        (net_money_flow / total_value).to_f64().unwrap_or(0.0)
    } else {
        0.0
    };

    Some(FlowSignals {
        call_volume,
        put_volume,
        put_call_ratio,
        net_money_flow,
        money_flow_ratio,
        bullish_flow: net_money_flow > Decimal::ZERO,
        strong_flow: money_flow_ratio.abs() > STRONG_FLOW_THRESHOLD,
        high_activity: call_volume + put_volume > HIGH_ACTIVITY_VOLUME,
    })
}
