use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use wash_rewards::config;
use wash_rewards::core::pipeline::run_audit;
use wash_rewards::ledger::load_snapshot;
use wash_rewards::logging;
use wash_rewards::report;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignore if missing).
    let _ = dotenvy::dotenv();

    let config_dir = std::env::var("REWARDS_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));

    let config = config::load_config(&config_dir)?;

    // Hold the guard for the process lifetime.
    let _guard = logging::init_tracing(&config.app.logging)?;

    info!(
        config_dir = %config_dir.display(),
        chains = ?config.ledger.chains,
        window_start = config.ledger.window_start,
        window_end = config.ledger.window_end,
        total_reward = %config.rewards.total_reward_tokens,
        "reward audit starting"
    );

    let snapshot = load_snapshot(&config.ledger).await?;

    let outcome = run_audit(snapshot, &config).context("aggregation run aborted")?;

    println!("{}", report::render_report(&outcome, &config));

    if let Some(chart_path) = &config.report.chart_output {
        let series = report::bar_series(&outcome);
        report::write_chart(Path::new(chart_path), &series).await?;
        info!(path = %chart_path, "bar series written");
    }

    info!(
        ranked = outcome.comparison.entries.len(),
        "reward audit complete"
    );

    Ok(())
}
