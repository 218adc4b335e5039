//! Ledger source: trades, token registry and price series.
//!
//! Reads the three JSON exports from the configured data directory, applies
//! the window/source/chain filters and orders everything by time. Anything
//! malformed is rejected here so the aggregation pass never sees it.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tracing::info;

use crate::config::LedgerConfig;
use crate::constants::MAX_TOKEN_DECIMALS;
use crate::errors::AuditError;
use crate::types::{PriceSample, TokenInfo, TradeRecord};

const TRADES_FILE: &str = "trades.json";
const TOKENS_FILE: &str = "tokens.json";
const PRICES_FILE: &str = "token_prices.json";

/// Token lookup by `(chain, name)`.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    tokens: BTreeMap<(u64, String), TokenInfo>,
}

impl TokenRegistry {
    pub fn new(tokens: impl IntoIterator<Item = TokenInfo>) -> Self {
        Self {
            tokens: tokens
                .into_iter()
                .map(|t| ((t.chain_id, t.name.clone()), t))
                .collect(),
        }
    }

    pub fn lookup(&self, chain: u64, name: &str) -> Result<&TokenInfo, AuditError> {
        self.tokens
            .get(&(chain, name.to_string()))
            .ok_or_else(|| AuditError::TokenNotFound {
                chain,
                token: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Everything one aggregation run consumes.
#[derive(Debug, Clone, Default)]
pub struct LedgerSnapshot {
    /// Trades in non-decreasing timestamp order.
    pub trades: Vec<TradeRecord>,
    pub tokens: TokenRegistry,
    /// Samples in non-decreasing `start_time` order.
    pub prices: Vec<PriceSample>,
}

/// Load and prepare a snapshot from `config.data_dir`.
pub async fn load_snapshot(config: &LedgerConfig) -> Result<LedgerSnapshot> {
    let dir = Path::new(&config.data_dir);

    let (trades, tokens, prices) = tokio::try_join!(
        read_json::<TradeRecord>(dir, TRADES_FILE),
        read_json::<TokenInfo>(dir, TOKENS_FILE),
        read_json::<PriceSample>(dir, PRICES_FILE),
    )?;

    let snapshot = prepare_snapshot(config, trades, tokens, prices)
        .context("ledger snapshot rejected")?;

    info!(
        trades = snapshot.trades.len(),
        tokens = snapshot.tokens.len(),
        price_samples = snapshot.prices.len(),
        data_dir = %config.data_dir,
        "ledger snapshot loaded"
    );

    Ok(snapshot)
}

async fn read_json<T: serde::de::DeserializeOwned>(dir: &Path, name: &str) -> Result<Vec<T>> {
    let path = dir.join(name);
    let contents = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read ledger file: {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

/// Filter, validate and order raw ledger rows.
pub fn prepare_snapshot(
    config: &LedgerConfig,
    trades: Vec<TradeRecord>,
    tokens: Vec<TokenInfo>,
    prices: Vec<PriceSample>,
) -> Result<LedgerSnapshot, AuditError> {
    let chains: BTreeSet<u64> = config.chains.iter().copied().collect();

    let mut trades: Vec<TradeRecord> = trades
        .into_iter()
        .filter(|t| chains.contains(&t.chain_id))
        .filter(|t| t.timestamp >= config.window_start && t.timestamp < config.window_end)
        .filter(|t| match &config.rfq_source {
            Some(source) => t.rfq_source.as_deref() == Some(source.as_str()),
            None => true,
        })
        .collect();

    for trade in &trades {
        validate_trade(trade)?;
    }
    // Stable: equal timestamps keep export order.
    trades.sort_by_key(|t| t.timestamp);

    let tokens: Vec<TokenInfo> = tokens
        .into_iter()
        .filter(|t| chains.contains(&t.chain_id))
        .collect();
    for token in &tokens {
        if token.decimals > MAX_TOKEN_DECIMALS {
            return Err(AuditError::InvalidRecord {
                reason: format!(
                    "token {}:{} has {} decimals (max {MAX_TOKEN_DECIMALS})",
                    token.chain_id, token.name, token.decimals
                ),
            });
        }
    }

    let mut prices: Vec<PriceSample> = prices
        .into_iter()
        .filter(|p| match config.price_series_start {
            Some(start) => p.start_time >= start,
            None => true,
        })
        .collect();
    for sample in &prices {
        if sample.price < Decimal::ZERO {
            return Err(AuditError::InvalidRecord {
                reason: format!(
                    "negative price {} for {} at {}",
                    sample.price, sample.token_name, sample.start_time
                ),
            });
        }
    }
    prices.sort_by_key(|p| p.start_time);

    Ok(LedgerSnapshot {
        trades,
        tokens: TokenRegistry::new(tokens),
        prices,
    })
}

fn validate_trade(trade: &TradeRecord) -> Result<(), AuditError> {
    if trade.trader.is_empty() {
        return Err(AuditError::InvalidRecord {
            reason: format!("trade at {} has no trader", trade.timestamp),
        });
    }
    if trade.base_token_price_usd.is_some_and(|p| p < Decimal::ZERO) {
        return Err(AuditError::InvalidRecord {
            reason: format!(
                "trade by {} at {} has a negative price",
                trade.trader, trade.timestamp
            ),
        });
    }
    Ok(())
}
