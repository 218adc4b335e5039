pub mod types;
pub mod validate;

pub use types::*;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Load and merge all config JSON files into a single [`AuditConfig`],
/// then apply environment variable overrides and validate.
///
/// Expected directory layout:
/// ```text
/// config/
///   app.json
///   rewards.json
///   ledger.json
///   detection.json   (optional)
///   report.json      (optional)
/// ```
///
/// # Environment variable overrides
///
/// | Env Var                   | Config Field                      |
/// |---------------------------|-----------------------------------|
/// | `REWARD_TOTAL_TOKENS`     | `rewards.total_reward_tokens`     |
/// | `REWARD_TOKEN_PRICE_USD`  | `rewards.reward_token_price_usd`  |
/// | `WASH_PRICE_TOLERANCE`    | `detection.price_tolerance`       |
/// | `LEDGER_DATA_DIR`         | `ledger.data_dir`                 |
/// | `REPORT_TOP_N`            | `report.top_n`                    |
pub fn load_config(config_dir: &Path) -> Result<AuditConfig> {
    let read = |name: &str| -> Result<String> {
        let path = config_dir.join(name);
        std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.display()))
    };

    let app: AppConfig = serde_json::from_str(&read("app.json")?).context("parsing app.json")?;

    let rewards: RewardsConfig =
        serde_json::from_str(&read("rewards.json")?).context("parsing rewards.json")?;

    let ledger: LedgerConfig =
        serde_json::from_str(&read("ledger.json")?).context("parsing ledger.json")?;

    // Detection and report settings fall back to built-in defaults.
    let detection: DetectionConfig = match read("detection.json") {
        Ok(contents) => serde_json::from_str(&contents).context("parsing detection.json")?,
        Err(_) => DetectionConfig::default(),
    };

    let report: ReportConfig = match read("report.json") {
        Ok(contents) => serde_json::from_str(&contents).context("parsing report.json")?,
        Err(_) => ReportConfig::default(),
    };

    let mut config = AuditConfig {
        app,
        rewards,
        detection,
        ledger,
        report,
    };

    apply_env_overrides(&mut config);
    validate::validate_config(&config)?;

    Ok(config)
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides to the loaded config.
///
/// Only non-empty env vars take effect. Parse failures are skipped and the
/// JSON value remains.
fn apply_env_overrides(config: &mut AuditConfig) {
    if let Some(val) = env_decimal("REWARD_TOTAL_TOKENS") {
        info!(%val, "env override: REWARD_TOTAL_TOKENS");
        config.rewards.total_reward_tokens = val;
    }

    if let Some(val) = env_decimal("REWARD_TOKEN_PRICE_USD") {
        info!(%val, "env override: REWARD_TOKEN_PRICE_USD");
        config.rewards.reward_token_price_usd = val;
    }

    if let Some(val) = env_decimal("WASH_PRICE_TOLERANCE") {
        info!(%val, "env override: WASH_PRICE_TOLERANCE");
        config.detection.price_tolerance = val;
    }

    if let Some(val) = env_string("LEDGER_DATA_DIR") {
        info!(data_dir = %val, "env override: LEDGER_DATA_DIR");
        config.ledger.data_dir = val;
    }

    if let Some(val) = env_parse::<usize>("REPORT_TOP_N") {
        info!(val, "env override: REPORT_TOP_N");
        config.report.top_n = val;
    }
}

/// Read a non-empty env var as a `String`.
fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Read a non-empty env var and parse it as `T`.
fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|v| v.parse().ok())
}

/// Read a non-empty env var and parse it as `Decimal`.
fn env_decimal(key: &str) -> Option<Decimal> {
    env_string(key).and_then(|v| Decimal::from_str(&v).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serial_test::serial;

    const ENV_KEYS: [&str; 5] = [
        "REWARD_TOTAL_TOKENS",
        "REWARD_TOKEN_PRICE_USD",
        "WASH_PRICE_TOLERANCE",
        "LEDGER_DATA_DIR",
        "REPORT_TOP_N",
    ];

    fn clean_audit_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    // -----------------------------------------------------------------------
    // Helper: write a minimal set of config JSON files to a temp dir.
    // -----------------------------------------------------------------------

    fn write_test_configs(dir: &Path) {
        std::fs::write(dir.join("app.json"), r#"{"logging": {"log_dir": "logs"}}"#).unwrap();

        std::fs::write(
            dir.join("rewards.json"),
            r#"{
                "total_reward_tokens": "625000",
                "reward_token_price_usd": "0.7",
                "chain_weights": {
                    "1": "0.26",
                    "43114": "0.26",
                    "56": "0.16",
                    "137": "0.16",
                    "42161": "0.16"
                }
            }"#,
        )
        .unwrap();

        std::fs::write(
            dir.join("ledger.json"),
            r#"{
                "data_dir": "data",
                "rfq_source": "hashflow",
                "chains": [1, 137, 56, 42161, 43114],
                "window_start": "2022-03-14 00:00:00",
                "window_end": "2022-03-21 00:00:00",
                "price_series_start": "2022-03-13 00:00:00"
            }"#,
        )
        .unwrap();
    }

    #[test]
    #[serial]
    fn test_load_minimal_config_uses_defaults() {
        clean_audit_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.rewards.total_reward_tokens, dec!(625000));
        assert_eq!(config.rewards.chain_weights.get(&43114), Some(&dec!(0.26)));
        assert_eq!(config.rewards.category_split, CategorySplit::default());
        assert_eq!(config.rewards.reward_token_symbol, "HFT");
        assert!(config.rewards.blue_chips.contains("USDC.e"));
        assert_eq!(config.detection, DetectionConfig::default());
        assert_eq!(config.report, ReportConfig::default());
        assert_eq!(config.app.logging, LoggingConfig::default());
        assert_eq!(config.ledger.window_start, 1_647_216_000);
        assert_eq!(config.ledger.price_series_start, Some(1_647_129_600));
    }

    #[test]
    #[serial]
    fn test_optional_files_are_parsed_when_present() {
        clean_audit_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());
        std::fs::write(
            tmp.path().join("detection.json"),
            r#"{"price_tolerance": "0.01", "max_lookback": 3}"#,
        )
        .unwrap();
        std::fs::write(
            tmp.path().join("report.json"),
            r#"{"top_n": 10, "chart_output": "out/chart.json"}"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.detection.price_tolerance, dec!(0.01));
        assert_eq!(config.detection.max_lookback, 3);
        assert_eq!(config.report.top_n, 10);
        assert_eq!(config.report.detail_traders, 2);
        assert_eq!(config.report.chart_output.as_deref(), Some("out/chart.json"));
    }

    #[test]
    #[serial]
    fn test_logging_section_overrides() {
        clean_audit_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());
        std::fs::write(
            tmp.path().join("app.json"),
            r#"{"logging": {
                "log_dir": "/var/log/rewards",
                "file_name": "wash.log",
                "rotation": "hourly",
                "filter": "wash_rewards::core=trace,warn"
            }}"#,
        )
        .unwrap();

        let logging = load_config(tmp.path()).unwrap().app.logging;
        assert_eq!(logging.log_dir, "/var/log/rewards");
        assert_eq!(logging.file_name, "wash.log");
        assert_eq!(logging.rotation, LogRotation::Hourly);
        assert_eq!(logging.filter.as_deref(), Some("wash_rewards::core=trace,warn"));
    }

    #[test]
    #[serial]
    fn test_missing_required_file_fails() {
        clean_audit_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());
        std::fs::remove_file(tmp.path().join("rewards.json")).unwrap();

        let err = load_config(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("rewards.json"), "got: {err}");
    }

    #[test]
    #[serial]
    fn test_env_override_reward_budget() {
        clean_audit_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());

        std::env::set_var("REWARD_TOTAL_TOKENS", "1000000");
        std::env::set_var("REPORT_TOP_N", "25");
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.rewards.total_reward_tokens, dec!(1000000));
        assert_eq!(config.report.top_n, 25);
        clean_audit_env();
    }

    #[test]
    #[serial]
    fn test_env_override_invalid_parse_ignored() {
        clean_audit_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());

        std::env::set_var("REWARD_TOKEN_PRICE_USD", "not_a_number");
        std::env::set_var("LEDGER_DATA_DIR", "");
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.rewards.reward_token_price_usd, dec!(0.7));
        assert_eq!(config.ledger.data_dir, "data");
        clean_audit_env();
    }

    #[test]
    #[serial]
    fn test_invalid_override_is_caught_by_validation() {
        clean_audit_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());

        std::env::set_var("WASH_PRICE_TOLERANCE", "1.5");
        let err = load_config(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("price_tolerance"), "got: {err}");
        clean_audit_env();
    }
}
