//! One aggregation run: price → classify → accumulate over a sorted ledger,
//! then allocate and rank from the final buckets.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::config::{AuditConfig, DetectionConfig};
use crate::core::price_resolver::PriceResolver;
use crate::core::ranking::compare_rankings;
use crate::core::reward_allocator::{Allocation, RewardAllocator};
use crate::core::volume_aggregator::{normalize_amount, usd_volume, VolumeAggregator};
use crate::core::wash_detector::{SwapLegs, WashDetector};
use crate::errors::AuditError;
use crate::ledger::{LedgerSnapshot, TokenRegistry};
use crate::types::{Category, RankingComparison, TradeDetail, TradeRecord};

/// Per-trade result of [`AggregationRun::process`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeOutcome {
    pub category: Category,
    pub base_usd_price: Decimal,
    pub total_usd: Decimal,
    pub legit_usd: Decimal,
    pub wash_usd: Decimal,
}

/// Owns all mutable state of a single forward pass.
pub struct AggregationRun {
    registry: TokenRegistry,
    blue_chips: BTreeSet<String>,
    prices: PriceResolver,
    detector: WashDetector,
    volumes: VolumeAggregator,
    last_timestamp: Option<i64>,
    processed: usize,
}

impl AggregationRun {
    pub fn new(
        registry: TokenRegistry,
        prices: PriceResolver,
        detection: &DetectionConfig,
        blue_chips: BTreeSet<String>,
    ) -> Self {
        Self {
            registry,
            blue_chips,
            prices,
            detector: WashDetector::new(detection),
            volumes: VolumeAggregator::new(),
            last_timestamp: None,
            processed: 0,
        }
    }

    /// Process the next trade. Trades must arrive in non-decreasing
    /// timestamp order.
    pub fn process(&mut self, trade: &TradeRecord) -> Result<TradeOutcome, AuditError> {
        if let Some(previous) = self.last_timestamp {
            if trade.timestamp < previous {
                return Err(AuditError::UnorderedLedger {
                    index: self.processed,
                    previous,
                    timestamp: trade.timestamp,
                });
            }
        }

        let chain = trade.chain_id;
        let base_decimals = self.registry.lookup(chain, &trade.base_token_name)?.decimals;
        let quote_decimals = self.registry.lookup(chain, &trade.quote_token_name)?.decimals;

        let base_usd_price = match trade.inline_price() {
            Some(price) => price,
            None => self
                .prices
                .resolve(chain, &trade.base_token_name, trade.timestamp)?,
        };

        let total_usd = usd_volume(trade.base_token_amount, base_decimals, base_usd_price)?;

        let classification = self.detector.classify(&SwapLegs {
            trader: &trade.trader,
            chain,
            base_token: &trade.base_token_name,
            base_amount: trade.base_token_amount,
            quote_token: &trade.quote_token_name,
            quote_amount: trade.quote_token_amount,
            base_usd_price,
        });

        let wash_usd = if classification.wash_amount == trade.base_token_amount {
            total_usd
        } else {
            usd_volume(classification.wash_amount, base_decimals, base_usd_price)?
        };
        let legit_usd = total_usd - wash_usd;

        let category = Category::classify(
            &trade.base_token_name,
            &trade.quote_token_name,
            &self.blue_chips,
        );

        self.volumes
            .record(&trade.trader, chain, category, legit_usd, wash_usd);
        self.volumes.record_trade(
            &trade.trader,
            TradeDetail {
                chain_id: chain,
                timestamp: trade.timestamp,
                base_token: trade.base_token_name.clone(),
                quote_token: trade.quote_token_name.clone(),
                base_amount: normalize_amount(trade.base_token_amount, base_decimals)?,
                quote_amount: normalize_amount(trade.quote_token_amount, quote_decimals)?,
                legit_usd,
                wash_usd,
                is_wash: classification.is_wash,
            },
        );

        if classification.is_wash {
            debug!(
                trader = %trade.trader,
                chain,
                base = %trade.base_token_name,
                quote = %trade.quote_token_name,
                wash_usd = %wash_usd,
                legit_usd = %legit_usd,
                "wash volume detected"
            );
        }

        self.last_timestamp = Some(trade.timestamp);
        self.processed += 1;

        Ok(TradeOutcome {
            category,
            base_usd_price,
            total_usd,
            legit_usd,
            wash_usd,
        })
    }

    pub fn process_all<'t>(
        &mut self,
        trades: impl IntoIterator<Item = &'t TradeRecord>,
    ) -> Result<(), AuditError> {
        for trade in trades {
            self.process(trade)?;
        }
        Ok(())
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn volumes(&self) -> &VolumeAggregator {
        &self.volumes
    }

    /// End the pass and hand over the final buckets.
    pub fn finish(self) -> VolumeAggregator {
        self.volumes
    }
}

/// Everything the report needs from one run.
#[derive(Debug)]
pub struct AuditOutcome {
    pub volumes: VolumeAggregator,
    pub allocation: Allocation,
    pub comparison: RankingComparison,
}

/// Run the full pipeline over a prepared snapshot.
pub fn run_audit(snapshot: LedgerSnapshot, config: &AuditConfig) -> Result<AuditOutcome, AuditError> {
    let LedgerSnapshot {
        trades,
        tokens,
        prices,
    } = snapshot;

    info!(
        trades = trades.len(),
        tolerance = %config.detection.price_tolerance,
        max_lookback = config.detection.max_lookback,
        "aggregation run starting"
    );

    let mut run = AggregationRun::new(
        tokens,
        PriceResolver::new(prices),
        &config.detection,
        config.rewards.blue_chips.clone(),
    );
    run.process_all(&trades)?;
    let processed = run.processed();
    let volumes = run.finish();

    let totals = volumes.totals();
    info!(
        processed,
        traders = volumes.trader_count(),
        legit_usd = %totals.legit_usd,
        wash_usd = %totals.wash_usd,
        "aggregation run complete"
    );

    let allocation = RewardAllocator::new(&config.rewards).allocate(&volumes)?;
    let comparison = compare_rankings(&allocation.scores, config.report.top_n);

    Ok(AuditOutcome {
        volumes,
        allocation,
        comparison,
    })
}
