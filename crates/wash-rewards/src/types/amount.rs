//! Raw on-chain token amounts.
//!
//! Ledger exports carry integer amounts in the token's smallest unit, which
//! routinely exceed the 96-bit `Decimal` mantissa (2e12 units of an
//! 18-decimal token is already 2e30). They stay in `U256` until they are
//! scaled down by `10^decimals`.

use std::fmt;

use alloy_primitives::U256;
use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};

/// Parse a base-10 integer string into a raw amount.
pub fn parse_raw_amount(text: &str) -> Result<U256, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid raw token amount '{text}'"));
    }
    U256::from_str_radix(trimmed, 10).map_err(|e| format!("invalid raw token amount '{text}': {e}"))
}

/// Serialise as a base-10 string.
pub fn serialize<S>(amount: &U256, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(amount)
}

/// Accept either a base-10 string or a non-negative JSON integer.
pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    struct RawAmountVisitor;

    impl Visitor<'_> for RawAmountVisitor {
        type Value = U256;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative integer token amount")
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<U256, E> {
            Ok(U256::from(value))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<U256, E> {
            u64::try_from(value)
                .map(U256::from)
                .map_err(|_| E::custom(format!("negative raw token amount {value}")))
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<U256, E> {
            parse_raw_amount(value).map_err(E::custom)
        }
    }

    deserializer.deserialize_any(RawAmountVisitor)
}
