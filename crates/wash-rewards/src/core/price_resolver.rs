//! Forward-only USD price lookup over per-token step series.
//!
//! Each token keeps a cursor into its ascending sample list. Because the
//! ledger is processed in timestamp order the cursor only ever moves forward,
//! so a full pass costs O(trades + samples).

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::errors::AuditError;
use crate::types::PriceSample;

#[derive(Debug, Clone, Copy)]
struct Cursor {
    index: usize,
    last_query: i64,
}

/// Resolves the USD price effective at a given timestamp.
#[derive(Debug, Default)]
pub struct PriceResolver {
    series: BTreeMap<String, Vec<(i64, Decimal)>>,
    cursors: BTreeMap<String, Cursor>,
}

impl PriceResolver {
    /// Index samples by token name, each series sorted by start time.
    pub fn new(samples: impl IntoIterator<Item = PriceSample>) -> Self {
        let mut series: BTreeMap<String, Vec<(i64, Decimal)>> = BTreeMap::new();
        for sample in samples {
            series
                .entry(sample.token_name)
                .or_default()
                .push((sample.start_time, sample.price));
        }
        for points in series.values_mut() {
            points.sort_by_key(|(start, _)| *start);
        }
        Self {
            series,
            cursors: BTreeMap::new(),
        }
    }

    /// Price of `token` at `timestamp`.
    ///
    /// Advances the token's cursor past every sample that starts at or before
    /// `timestamp`. A query earlier than the first sample resolves to the
    /// first sample. Queries must be non-decreasing per token; going
    /// backwards fails with [`AuditError::NonMonotonicTimestamp`].
    pub fn resolve(&mut self, chain: u64, token: &str, timestamp: i64) -> Result<Decimal, AuditError> {
        let points = match self.series.get(token) {
            Some(points) if !points.is_empty() => points,
            _ => {
                return Err(AuditError::PriceSeriesMissing {
                    chain,
                    token: token.to_string(),
                })
            }
        };

        let cursor = self.cursors.entry(token.to_string()).or_insert(Cursor {
            index: 0,
            last_query: i64::MIN,
        });

        if timestamp < cursor.last_query {
            return Err(AuditError::NonMonotonicTimestamp {
                token: token.to_string(),
                previous: cursor.last_query,
                requested: timestamp,
            });
        }

        while cursor.index + 1 < points.len() && points[cursor.index + 1].0 <= timestamp {
            cursor.index += 1;
        }
        cursor.last_query = timestamp;

        Ok(points[cursor.index].1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample(token: &str, start_time: i64, price: Decimal) -> PriceSample {
        PriceSample {
            token_name: token.into(),
            start_time,
            price,
        }
    }

    fn eth_resolver() -> PriceResolver {
        PriceResolver::new(vec![
            sample("ETH", 100, dec!(2500)),
            sample("ETH", 200, dec!(2600)),
            sample("ETH", 300, dec!(2700)),
        ])
    }

    #[test]
    fn test_step_function_lookup() {
        let mut resolver = eth_resolver();
        assert_eq!(resolver.resolve(1, "ETH", 150).unwrap(), dec!(2500));
        assert_eq!(resolver.resolve(1, "ETH", 199).unwrap(), dec!(2500));
        assert_eq!(resolver.resolve(1, "ETH", 250).unwrap(), dec!(2600));
        assert_eq!(resolver.resolve(1, "ETH", 10_000).unwrap(), dec!(2700));
    }

    #[test]
    fn test_sample_boundary_is_inclusive() {
        let mut resolver = eth_resolver();
        assert_eq!(resolver.resolve(1, "ETH", 200).unwrap(), dec!(2600));
    }

    #[test]
    fn test_query_before_first_sample_uses_first_price() {
        let mut resolver = eth_resolver();
        assert_eq!(resolver.resolve(1, "ETH", 5).unwrap(), dec!(2500));
    }

    #[test]
    fn test_repeated_timestamp_allowed() {
        let mut resolver = eth_resolver();
        assert_eq!(resolver.resolve(1, "ETH", 250).unwrap(), dec!(2600));
        assert_eq!(resolver.resolve(1, "ETH", 250).unwrap(), dec!(2600));
    }

    #[test]
    fn test_backwards_query_rejected() {
        let mut resolver = eth_resolver();
        resolver.resolve(1, "ETH", 250).unwrap();
        let err = resolver.resolve(1, "ETH", 150).unwrap_err();
        assert!(matches!(
            err,
            AuditError::NonMonotonicTimestamp {
                previous: 250,
                requested: 150,
                ..
            }
        ));
    }

    #[test]
    fn test_cursors_are_per_token() {
        let mut resolver = PriceResolver::new(vec![
            sample("ETH", 100, dec!(2500)),
            sample("ETH", 300, dec!(2700)),
            sample("USDC", 100, dec!(1)),
            sample("USDC", 200, dec!(0.999)),
        ]);
        assert_eq!(resolver.resolve(1, "ETH", 350).unwrap(), dec!(2700));
        // USDC is untouched by the ETH cursor.
        assert_eq!(resolver.resolve(1, "USDC", 150).unwrap(), dec!(1));
        assert_eq!(resolver.resolve(1, "USDC", 250).unwrap(), dec!(0.999));
    }

    #[test]
    fn test_unsorted_input_is_ordered_on_construction() {
        let mut resolver = PriceResolver::new(vec![
            sample("ETH", 300, dec!(2700)),
            sample("ETH", 100, dec!(2500)),
        ]);
        assert_eq!(resolver.resolve(1, "ETH", 150).unwrap(), dec!(2500));
        assert_eq!(resolver.resolve(1, "ETH", 300).unwrap(), dec!(2700));
    }

    #[test]
    fn test_missing_series_identifies_chain_and_token() {
        let mut resolver = eth_resolver();
        let err = resolver.resolve(137, "WMATIC", 100).unwrap_err();
        assert!(matches!(
            &err,
            AuditError::PriceSeriesMissing { chain: 137, token } if token == "WMATIC"
        ));
        assert_eq!(err.to_string(), "could not find prices for token 137:WMATIC");
    }
}
