//! Round-trip (wash trade) detection over per-trader flow stacks.
//!
//! Every trade's inbound leg is pushed onto the stack for
//! `(trader, chain, quote_token)`. When the trader later sends that token
//! out again (it becomes the base leg of a new trade), the most recent
//! inbound flows are popped and, if they were acquired at approximately the
//! same USD price, the matching amount is classified as wash volume.
//!
//! Matching rules:
//! - strict LIFO, at most `max_lookback` pops per trade;
//! - an entry matches when `|1 - entry_price / trade_price| <= tolerance`;
//! - the first non-matching entry stops the walk and is discarded, not
//!   re-pushed;
//! - an entry larger than the outstanding amount is split and the remainder
//!   pushed back at the entry's original price.

use std::collections::BTreeMap;

use alloy_primitives::U256;
use rust_decimal::Decimal;
use tracing::trace;

use crate::config::DetectionConfig;

type FlowKey = (String, u64, String);

/// An unconsumed inbound flow of one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowEntry {
    /// Raw (un-normalised) token amount.
    pub amount: U256,
    /// USD price of the trade's base token when the flow arrived.
    pub usd_price: Decimal,
}

/// Both legs of one trade as seen by the detector.
#[derive(Debug, Clone, Copy)]
pub struct SwapLegs<'a> {
    pub trader: &'a str,
    pub chain: u64,
    /// Token leaving the trader's wallet.
    pub base_token: &'a str,
    pub base_amount: U256,
    /// Token arriving in the trader's wallet.
    pub quote_token: &'a str,
    pub quote_amount: U256,
    pub base_usd_price: Decimal,
}

/// Outcome of classifying one trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WashClassification {
    /// Raw base-token amount matched against earlier inbound flows.
    /// Never exceeds the trade's base amount.
    pub wash_amount: U256,
    pub is_wash: bool,
}

/// Owns every flow stack for one aggregation run.
#[derive(Debug)]
pub struct WashDetector {
    stacks: BTreeMap<FlowKey, Vec<FlowEntry>>,
    tolerance: Decimal,
    max_lookback: usize,
}

impl WashDetector {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            stacks: BTreeMap::new(),
            tolerance: config.price_tolerance,
            max_lookback: config.max_lookback,
        }
    }

    /// Classify the base leg of a trade, then record its quote leg as a new
    /// inbound flow.
    pub fn classify(&mut self, legs: &SwapLegs<'_>) -> WashClassification {
        let wash_amount = self.match_outflow(legs);

        self.record_inflow(
            legs.trader,
            legs.chain,
            legs.quote_token,
            FlowEntry {
                amount: legs.quote_amount,
                usd_price: legs.base_usd_price,
            },
        );

        WashClassification {
            wash_amount,
            is_wash: wash_amount > U256::ZERO,
        }
    }

    /// Push an inbound flow onto the `(trader, chain, token)` stack.
    pub fn record_inflow(&mut self, trader: &str, chain: u64, token: &str, entry: FlowEntry) {
        self.stacks
            .entry((trader.to_string(), chain, token.to_string()))
            .or_default()
            .push(entry);
    }

    /// Current stack contents, oldest first. Empty if never touched.
    pub fn stack(&self, trader: &str, chain: u64, token: &str) -> &[FlowEntry] {
        self.stacks
            .get(&(trader.to_string(), chain, token.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn match_outflow(&mut self, legs: &SwapLegs<'_>) -> U256 {
        let stack = self
            .stacks
            .entry((legs.trader.to_string(), legs.chain, legs.base_token.to_string()))
            .or_default();

        let mut wash_amount = U256::ZERO;
        let mut steps = 0;

        while steps < self.max_lookback && wash_amount < legs.base_amount {
            let Some(entry) = stack.pop() else {
                break;
            };
            steps += 1;

            if !within_tolerance(entry.usd_price, legs.base_usd_price, self.tolerance) {
                trace!(
                    trader = legs.trader,
                    token = legs.base_token,
                    entry_price = %entry.usd_price,
                    trade_price = %legs.base_usd_price,
                    "flow price outside tolerance, walk stopped"
                );
                break;
            }

            wash_amount = wash_amount.saturating_add(entry.amount);
            if wash_amount > legs.base_amount {
                stack.push(FlowEntry {
                    amount: wash_amount - legs.base_amount,
                    usd_price: entry.usd_price,
                });
                wash_amount = legs.base_amount;
                break;
            }
        }

        wash_amount
    }
}

/// `|1 - a / b| <= tolerance`. A zero reference price never matches.
pub fn within_tolerance(a: Decimal, b: Decimal, tolerance: Decimal) -> bool {
    if b.is_zero() {
        return false;
    }
    match a.checked_div(b) {
        Some(ratio) => (Decimal::ONE - ratio).abs() <= tolerance,
        None => false,
    }
}
