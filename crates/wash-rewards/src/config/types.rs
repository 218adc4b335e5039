use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::constants::{
    BLUE_CHIP_SPLIT, DEFAULT_BLUE_CHIPS, MAX_LOOKBACK, NON_BLUE_CHIP_SPLIT, WASH_PRICE_TOLERANCE,
};
use crate::types::Category;

// ---------------------------------------------------------------------------
// Top-level aggregate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    pub app: AppConfig,
    pub rewards: RewardsConfig,
    pub detection: DetectionConfig,
    pub ledger: LedgerConfig,
    pub report: ReportConfig,
}

// ---------------------------------------------------------------------------
// app.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    /// File name prefix for the rolling JSON log.
    #[serde(default = "default_log_file")]
    pub file_name: String,
    #[serde(default)]
    pub rotation: LogRotation,
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    #[serde(default)]
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            file_name: default_log_file(),
            rotation: LogRotation::default(),
            filter: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    Never,
}

fn default_log_dir() -> String {
    "logs".into()
}

fn default_log_file() -> String {
    "audit.log".into()
}

// ---------------------------------------------------------------------------
// rewards.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RewardsConfig {
    /// Reward tokens distributed over the whole window.
    pub total_reward_tokens: Decimal,
    pub reward_token_price_usd: Decimal,
    #[serde(default = "default_reward_symbol")]
    pub reward_token_symbol: String,
    /// Fraction of the budget assigned to each chain id.
    pub chain_weights: BTreeMap<u64, Decimal>,
    #[serde(default)]
    pub category_split: CategorySplit,
    #[serde(default = "default_blue_chips")]
    pub blue_chips: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CategorySplit {
    pub blue_chip: Decimal,
    pub non_blue_chip: Decimal,
}

impl CategorySplit {
    pub fn weight(&self, category: Category) -> Decimal {
        match category {
            Category::BlueChip => self.blue_chip,
            Category::NonBlueChip => self.non_blue_chip,
        }
    }
}

impl Default for CategorySplit {
    fn default() -> Self {
        Self {
            blue_chip: BLUE_CHIP_SPLIT,
            non_blue_chip: NON_BLUE_CHIP_SPLIT,
        }
    }
}

fn default_reward_symbol() -> String {
    "HFT".into()
}

fn default_blue_chips() -> BTreeSet<String> {
    DEFAULT_BLUE_CHIPS.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// detection.json (optional)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DetectionConfig {
    #[serde(default = "default_price_tolerance")]
    pub price_tolerance: Decimal,
    #[serde(default = "default_max_lookback")]
    pub max_lookback: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            price_tolerance: WASH_PRICE_TOLERANCE,
            max_lookback: MAX_LOOKBACK,
        }
    }
}

fn default_price_tolerance() -> Decimal {
    WASH_PRICE_TOLERANCE
}

fn default_max_lookback() -> usize {
    MAX_LOOKBACK
}

// ---------------------------------------------------------------------------
// ledger.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Directory holding `trades.json`, `tokens.json`, `token_prices.json`.
    pub data_dir: String,
    /// Only trades quoted through this RFQ source are counted.
    #[serde(default)]
    pub rfq_source: Option<String>,
    pub chains: Vec<u64>,
    /// Inclusive lower bound on trade timestamps.
    #[serde(deserialize_with = "crate::types::timestamp::deserialize")]
    pub window_start: i64,
    /// Exclusive upper bound on trade timestamps.
    #[serde(deserialize_with = "crate::types::timestamp::deserialize")]
    pub window_end: i64,
    #[serde(default, deserialize_with = "crate::types::timestamp::deserialize_option")]
    pub price_series_start: Option<i64>,
}

// ---------------------------------------------------------------------------
// report.json (optional)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_detail_traders")]
    pub detail_traders: usize,
    #[serde(default)]
    pub chart_output: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            detail_traders: default_detail_traders(),
            chart_output: None,
        }
    }
}

fn default_top_n() -> usize {
    99
}

fn default_detail_traders() -> usize {
    2
}
