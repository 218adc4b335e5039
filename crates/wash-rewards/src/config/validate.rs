use anyhow::{bail, Result};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

use super::types::AuditConfig;

/// Validate invariants across the merged config that serde alone cannot enforce.
///
/// Called automatically by [`super::load_config`]. All problems are collected
/// and reported together.
pub fn validate_config(config: &AuditConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    validate_app_config(config, &mut errors);
    validate_rewards_config(config, &mut errors);
    validate_detection_config(config, &mut errors);
    validate_ledger_config(config, &mut errors);
    validate_report_config(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        let msg = format!(
            "Configuration validation failed ({} error{}):\n  - {}",
            errors.len(),
            if errors.len() == 1 { "" } else { "s" },
            errors.join("\n  - ")
        );
        bail!("{msg}");
    }
}

// ---------------------------------------------------------------------------
// App config
// ---------------------------------------------------------------------------

fn validate_app_config(config: &AuditConfig, errors: &mut Vec<String>) {
    let logging = &config.app.logging;

    if logging.log_dir.is_empty() {
        errors.push("app.logging: log_dir is empty".into());
    }

    if logging.file_name.is_empty() || logging.file_name.contains(['/', '\\']) {
        errors.push(format!(
            "app.logging: file_name must be a bare file name, got '{}'",
            logging.file_name
        ));
    }

    if let Some(filter) = &logging.filter {
        if let Err(e) = EnvFilter::try_new(filter) {
            errors.push(format!("app.logging: invalid filter '{filter}': {e}"));
        }
    }
}

// ---------------------------------------------------------------------------
// Rewards config
// ---------------------------------------------------------------------------

fn validate_rewards_config(config: &AuditConfig, errors: &mut Vec<String>) {
    let rewards = &config.rewards;

    if rewards.total_reward_tokens <= Decimal::ZERO {
        errors.push(format!(
            "rewards: total_reward_tokens must be > 0, got {}",
            rewards.total_reward_tokens
        ));
    }

    if rewards.reward_token_price_usd <= Decimal::ZERO {
        errors.push(format!(
            "rewards: reward_token_price_usd must be > 0, got {}",
            rewards.reward_token_price_usd
        ));
    }

    if rewards.chain_weights.is_empty() {
        errors.push("rewards.chain_weights: must have at least one chain".into());
    }

    for (chain, weight) in &rewards.chain_weights {
        if *weight < Decimal::ZERO {
            errors.push(format!("rewards.chain_weights.{chain}: must be >= 0, got {weight}"));
        }
    }

    let weight_sum: Decimal = rewards.chain_weights.values().copied().sum();
    if !rewards.chain_weights.is_empty() && weight_sum != Decimal::ONE {
        errors.push(format!("rewards.chain_weights: must sum to 1, got {weight_sum}"));
    }

    let split = &rewards.category_split;
    if split.blue_chip < Decimal::ZERO || split.non_blue_chip < Decimal::ZERO {
        errors.push("rewards.category_split: shares must be >= 0".into());
    }
    if split.blue_chip + split.non_blue_chip != Decimal::ONE {
        errors.push(format!(
            "rewards.category_split: blue_chip + non_blue_chip must equal 1, got {}",
            split.blue_chip + split.non_blue_chip
        ));
    }
}

// ---------------------------------------------------------------------------
// Detection config
// ---------------------------------------------------------------------------

fn validate_detection_config(config: &AuditConfig, errors: &mut Vec<String>) {
    let detection = &config.detection;

    if detection.price_tolerance < Decimal::ZERO || detection.price_tolerance >= Decimal::ONE {
        errors.push(format!(
            "detection: price_tolerance must be in [0, 1), got {}",
            detection.price_tolerance
        ));
    }

    if detection.max_lookback == 0 {
        errors.push("detection: max_lookback must be >= 1".into());
    }
}

// ---------------------------------------------------------------------------
// Ledger config
// ---------------------------------------------------------------------------

fn validate_ledger_config(config: &AuditConfig, errors: &mut Vec<String>) {
    let ledger = &config.ledger;

    if ledger.data_dir.is_empty() {
        errors.push("ledger: data_dir is empty".into());
    }

    if ledger.chains.is_empty() {
        errors.push("ledger.chains: must have at least one chain".into());
    }

    // Every chain that can appear in the ledger needs an explicit weight.
    for chain in &ledger.chains {
        if !config.rewards.chain_weights.contains_key(chain) {
            errors.push(format!(
                "ledger.chains: chain {chain} has no entry in rewards.chain_weights"
            ));
        }
    }

    if ledger.window_start >= ledger.window_end {
        errors.push(format!(
            "ledger: window_start ({}) must be < window_end ({})",
            ledger.window_start, ledger.window_end
        ));
    }
}

// ---------------------------------------------------------------------------
// Report config
// ---------------------------------------------------------------------------

fn validate_report_config(config: &AuditConfig, errors: &mut Vec<String>) {
    if config.report.top_n == 0 {
        errors.push("report: top_n must be >= 1".into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        AppConfig, CategorySplit, DetectionConfig, LedgerConfig, LoggingConfig, ReportConfig,
        RewardsConfig,
    };
    use rust_decimal_macros::dec;
    use std::collections::{BTreeMap, BTreeSet};

    fn valid_config() -> AuditConfig {
        AuditConfig {
            app: AppConfig {
                logging: LoggingConfig::default(),
            },
            rewards: RewardsConfig {
                total_reward_tokens: dec!(625000),
                reward_token_price_usd: dec!(0.7),
                reward_token_symbol: "HFT".into(),
                chain_weights: BTreeMap::from([(1, dec!(0.6)), (137, dec!(0.4))]),
                category_split: CategorySplit::default(),
                blue_chips: BTreeSet::new(),
            },
            detection: DetectionConfig::default(),
            ledger: LedgerConfig {
                data_dir: "data".into(),
                rfq_source: None,
                chains: vec![1, 137],
                window_start: 0,
                window_end: 100,
                price_series_start: None,
            },
            report: ReportConfig::default(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let mut config = valid_config();
        config.rewards.chain_weights.insert(137, dec!(0.3));
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("must sum to 1"));
    }

    #[test]
    fn test_ledger_chain_without_weight_rejected() {
        let mut config = valid_config();
        config.ledger.chains.push(56);
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("chain 56 has no entry"));
    }

    #[test]
    fn test_category_split_must_sum_to_one() {
        let mut config = valid_config();
        config.rewards.category_split.non_blue_chip = dec!(0.5);
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("category_split"));
    }

    #[test]
    fn test_errors_are_collected() {
        let mut config = valid_config();
        config.rewards.total_reward_tokens = Decimal::ZERO;
        config.detection.max_lookback = 0;
        config.report.top_n = 0;
        let msg = validate_config(&config).unwrap_err().to_string();
        assert!(msg.contains("3 errors"), "got: {msg}");
    }

    #[test]
    fn test_log_file_name_must_be_bare() {
        let mut config = valid_config();
        config.app.logging.file_name = "nested/audit.log".into();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("file_name"));
    }

    #[test]
    fn test_malformed_log_filter_rejected() {
        let mut config = valid_config();
        config.app.logging.filter = Some("wash_rewards=loud".into());
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("invalid filter"));
    }

    #[test]
    fn test_empty_window_rejected() {
        let mut config = valid_config();
        config.ledger.window_end = config.ledger.window_start;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("window_start"));
    }
}
