use alloy_primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One settled RFQ trade as exported from the trades table.
///
/// Amounts are raw on-chain integers (not yet divided by token decimals)
/// and may exceed the `Decimal` range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    #[serde(alias = "network_id")]
    pub chain_id: u64,
    #[serde(alias = "block_timestamp", deserialize_with = "super::timestamp::deserialize")]
    pub timestamp: i64,
    pub trader: String,
    #[serde(default)]
    pub rfq_source: Option<String>,
    pub base_token_name: String,
    pub quote_token_name: String,
    #[serde(with = "super::amount")]
    pub base_token_amount: U256,
    #[serde(with = "super::amount")]
    pub quote_token_amount: U256,
    /// Price captured at execution time. Zero or absent means "resolve from
    /// the price series".
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub base_token_price_usd: Option<Decimal>,
}

impl TradeRecord {
    /// Inline execution price, if one was recorded and is positive.
    pub fn inline_price(&self) -> Option<Decimal> {
        self.base_token_price_usd.filter(|p| *p > Decimal::ZERO)
    }
}

/// Token registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    #[serde(alias = "network_id")]
    pub chain_id: u64,
    pub name: String,
    pub decimals: u32,
}

/// A step in a token's USD price series. The price holds from `start_time`
/// until the next sample's `start_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub token_name: String,
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub start_time: i64,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
}
