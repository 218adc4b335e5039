//! Volume-proportional reward attribution.
//!
//! Each `(chain, category)` pair receives
//! `total_reward_tokens × chain_weight × category_split`, divided among the
//! traders active on that chain in proportion to their volume. Shares are
//! computed twice: on legit volume only and on legit + wash volume, so the
//! corrected distribution can be compared with the naive one.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::info;

use crate::config::RewardsConfig;
use crate::core::volume_aggregator::VolumeAggregator;
use crate::errors::AuditError;
use crate::types::{Category, TraderScore};

/// Allocation summary for one `(chain, category)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryAllocation {
    pub chain_id: u64,
    pub category: Category,
    #[serde(with = "rust_decimal::serde::str")]
    pub category_reward: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub legit_volume: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub inclusive_volume: Decimal,
    /// Display-only diminishing-returns yield on legit volume.
    #[serde(with = "rust_decimal::serde::str")]
    pub legit_yield: Decimal,
    /// Display-only diminishing-returns yield on wash-inclusive volume.
    #[serde(with = "rust_decimal::serde::str")]
    pub inclusive_yield: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct Allocation {
    pub scores: BTreeMap<String, TraderScore>,
    pub categories: Vec<CategoryAllocation>,
}

pub struct RewardAllocator<'a> {
    config: &'a RewardsConfig,
}

impl<'a> RewardAllocator<'a> {
    pub fn new(config: &'a RewardsConfig) -> Self {
        Self { config }
    }

    /// Reward budget of one `(chain, category)` pair.
    ///
    /// A chain without a configured weight is a fatal configuration error,
    /// never a zero weight.
    pub fn category_reward(&self, chain: u64, category: Category) -> Result<Decimal, AuditError> {
        let weight = self
            .config
            .chain_weights
            .get(&chain)
            .copied()
            .ok_or(AuditError::ChainWeightMissing { chain })?;

        Ok(self.config.total_reward_tokens * weight * self.config.category_split.weight(category))
    }

    /// Compute both score variants for every trader from final buckets.
    pub fn allocate(&self, volumes: &VolumeAggregator) -> Result<Allocation, AuditError> {
        let mut allocation = Allocation::default();

        for chain in volumes.chains() {
            for category in Category::ALL {
                let category_reward = self.category_reward(chain, category)?;

                let (chain_legit, chain_inclusive) = match volumes.chain_bucket(chain, category) {
                    Some(bucket) => (bucket.legit_usd, bucket.inclusive_usd()),
                    None => (Decimal::ZERO, Decimal::ZERO),
                };

                for (trader, bucket) in volumes.traders_on(chain, category) {
                    let score = allocation.scores.entry(trader.to_string()).or_default();
                    score.legit += share(bucket.legit_usd, chain_legit, category_reward);
                    score.wash_inclusive +=
                        share(bucket.inclusive_usd(), chain_inclusive, category_reward);
                }

                let price = self.config.reward_token_price_usd;
                let summary = CategoryAllocation {
                    chain_id: chain,
                    category,
                    category_reward,
                    legit_volume: chain_legit,
                    inclusive_volume: chain_inclusive,
                    legit_yield: diminishing_yield(chain_legit, category_reward, price),
                    inclusive_yield: diminishing_yield(chain_inclusive, category_reward, price),
                };

                info!(
                    chain,
                    %category,
                    reward = %summary.category_reward,
                    legit_volume = %summary.legit_volume,
                    inclusive_volume = %summary.inclusive_volume,
                    "category allocated"
                );
                allocation.categories.push(summary);
            }
        }

        Ok(allocation)
    }
}

/// `trader_volume / total_volume × category_reward`, or zero when either
/// volume is not positive.
pub fn share(trader_volume: Decimal, total_volume: Decimal, category_reward: Decimal) -> Decimal {
    if trader_volume > Decimal::ZERO && total_volume > Decimal::ZERO {
        trader_volume / total_volume * category_reward
    } else {
        Decimal::ZERO
    }
}

/// `1 / (1 + volume) × category_reward × reward_price × 100`.
pub fn diminishing_yield(volume: Decimal, category_reward: Decimal, reward_price: Decimal) -> Decimal {
    Decimal::ONE / (Decimal::ONE + volume) * category_reward * reward_price * dec!(100)
}
