//! Legit / wash USD volume accumulation per trader and per chain.

use std::collections::BTreeMap;

use alloy_primitives::U256;
use rust_decimal::Decimal;

use crate::constants::MAX_TOKEN_DECIMALS;
use crate::errors::AuditError;
use crate::types::{Category, TradeDetail, VolumeBucket};

/// Volume buckets keyed by trader and by chain, each split by category.
///
/// The first trade a trader makes on a chain opens buckets for both
/// categories, so every active trader takes part in every category's
/// allocation on that chain (possibly with a zero share).
#[derive(Debug, Default)]
pub struct VolumeAggregator {
    per_trader: BTreeMap<(String, u64, Category), VolumeBucket>,
    per_chain: BTreeMap<(u64, Category), VolumeBucket>,
    trader_totals: BTreeMap<String, VolumeBucket>,
    trades: BTreeMap<String, Vec<TradeDetail>>,
    totals: VolumeBucket,
}

impl VolumeAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one trade's split volume into the trader and chain buckets.
    pub fn record(
        &mut self,
        trader: &str,
        chain: u64,
        category: Category,
        legit_usd: Decimal,
        wash_usd: Decimal,
    ) {
        for cat in Category::ALL {
            self.per_trader
                .entry((trader.to_string(), chain, cat))
                .or_default();
            self.per_chain.entry((chain, cat)).or_default();
        }

        if let Some(bucket) = self.per_trader.get_mut(&(trader.to_string(), chain, category)) {
            bucket.add(legit_usd, wash_usd);
        }
        if let Some(bucket) = self.per_chain.get_mut(&(chain, category)) {
            bucket.add(legit_usd, wash_usd);
        }

        self.trader_totals
            .entry(trader.to_string())
            .or_default()
            .add(legit_usd, wash_usd);
        self.totals.add(legit_usd, wash_usd);
    }

    /// Append a trade to the trader's detail log.
    pub fn record_trade(&mut self, trader: &str, detail: TradeDetail) {
        self.trades.entry(trader.to_string()).or_default().push(detail);
    }

    pub fn chain_bucket(&self, chain: u64, category: Category) -> Option<&VolumeBucket> {
        self.per_chain.get(&(chain, category))
    }

    /// Chains with at least one recorded trade, ascending.
    pub fn chains(&self) -> Vec<u64> {
        let mut chains: Vec<u64> = self.per_chain.keys().map(|(chain, _)| *chain).collect();
        chains.dedup();
        chains
    }

    /// Traders with buckets on `(chain, category)`, ascending by trader id.
    pub fn traders_on(
        &self,
        chain: u64,
        category: Category,
    ) -> impl Iterator<Item = (&str, &VolumeBucket)> + '_ {
        self.per_trader
            .iter()
            .filter(move |((_, c, cat), _)| *c == chain && *cat == category)
            .map(|((trader, _, _), bucket)| (trader.as_str(), bucket))
    }

    /// A trader's volume across all chains and categories.
    pub fn trader_total(&self, trader: &str) -> VolumeBucket {
        self.trader_totals.get(trader).copied().unwrap_or_default()
    }

    pub fn trader_count(&self) -> usize {
        self.trader_totals.len()
    }

    /// Volume across the whole run.
    pub fn totals(&self) -> VolumeBucket {
        self.totals
    }

    pub fn trades_for(&self, trader: &str) -> &[TradeDetail] {
        self.trades.get(trader).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Divide a raw on-chain amount by `10^decimals`.
///
/// The whole and fractional parts are split in `U256` first, so only the
/// scaled value has to fit in `Decimal`. Fractional digits beyond the 28
/// significant digits `Decimal` carries are rounded.
pub fn normalize_amount(raw: U256, decimals: u32) -> Result<Decimal, AuditError> {
    if decimals > MAX_TOKEN_DECIMALS {
        return Err(AuditError::InvalidRecord {
            reason: format!("token precision {decimals} exceeds {MAX_TOKEN_DECIMALS}"),
        });
    }
    let out_of_range = || AuditError::Arithmetic {
        reason: format!("{raw} / 10^{decimals} exceeds the decimal range"),
    };

    let scale = U256::from(10u128.pow(decimals));
    let whole = i128::try_from(raw / scale)
        .ok()
        .and_then(|w| Decimal::try_from_i128_with_scale(w, 0).ok())
        .ok_or_else(out_of_range)?;
    // The remainder is below 10^28, inside the 96-bit mantissa.
    let fraction = i128::try_from(raw % scale)
        .ok()
        .and_then(|f| Decimal::try_from_i128_with_scale(f, decimals).ok())
        .ok_or_else(out_of_range)?;

    whole.checked_add(fraction).ok_or_else(out_of_range)
}

/// USD value of a raw amount at `usd_price`.
pub fn usd_volume(raw: U256, decimals: u32, usd_price: Decimal) -> Result<Decimal, AuditError> {
    let amount = normalize_amount(raw, decimals)?;
    amount
        .checked_mul(usd_price)
        .ok_or_else(|| AuditError::Arithmetic {
            reason: format!("{amount} x {usd_price} overflows"),
        })
}
