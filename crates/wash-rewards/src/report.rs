//! Plain-text rendering of an audit run and the chart bar series.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::AuditConfig;
use crate::constants::network_name;
use crate::core::pipeline::AuditOutcome;
use crate::core::reward_allocator::CategoryAllocation;
use crate::core::volume_aggregator::VolumeAggregator;
use crate::types::timestamp::format_timestamp;
use crate::types::{BarPoint, BarSeries, RankingComparison, TradeDetail, VolumeBucket};

/// Full console report: category summary, totals, ranking table and trade
/// detail for the leading traders.
pub fn render_report(outcome: &AuditOutcome, config: &AuditConfig) -> String {
    let symbol = &config.rewards.reward_token_symbol;
    let mut out = String::new();

    for line in render_category_summary(&outcome.allocation.categories) {
        out.push_str(&line);
        out.push('\n');
    }

    let _ = writeln!(out, "\n\n{}", render_totals(&outcome.volumes.totals()));

    out.push_str("\n\nNew ranking\n");
    for line in render_ranking(&outcome.comparison, &outcome.volumes, symbol) {
        out.push_str(&line);
        out.push('\n');
    }

    out.push_str("\n\nTrades for top traders\n");
    out.push_str(&render_trade_details(
        &outcome.comparison,
        &outcome.volumes,
        config.report.detail_traders,
    ));

    out
}

pub fn render_totals(totals: &VolumeBucket) -> String {
    format!(
        "Total volume: ${} L, ${} W",
        format_usd(totals.legit_usd),
        format_usd(totals.wash_usd)
    )
}

/// Two lines per `(chain, category)`: wash-inclusive then legit.
pub fn render_category_summary(categories: &[CategoryAllocation]) -> Vec<String> {
    let mut lines = Vec::with_capacity(categories.len() * 2);
    for c in categories {
        let network = network_label(c.chain_id);
        lines.push(format!(
            "{network} {} (old) Yield: {}, Vol: {}",
            c.category,
            fixed(c.inclusive_yield, 4),
            format_usd(c.inclusive_volume)
        ));
        lines.push(format!(
            "{network} {} (legit) Yield: {} Vol: {}",
            c.category,
            fixed(c.legit_yield, 4),
            format_usd(c.legit_volume)
        ));
    }
    lines
}

/// One line per trader of the new ranking.
pub fn render_ranking(
    comparison: &RankingComparison,
    volumes: &VolumeAggregator,
    symbol: &str,
) -> Vec<String> {
    comparison
        .entries
        .iter()
        .map(|entry| {
            let totals = volumes.trader_total(&entry.trader);
            let old = entry
                .old_index
                .map(index_label)
                .unwrap_or_else(|| "--".to_string());

            let sign = if entry.score_diff >= Decimal::ZERO { '+' } else { '-' };
            let pct = match entry.percent_change {
                Some(pct) => format!("{sign} {}%", fixed(pct, 2)),
                None => "n/a".to_string(),
            };

            format!(
                "{} [{old}]: {},  Vol: (${} L, ${} W)\t{} {symbol}{} ({sign} {} {symbol}, {pct})",
                index_label(entry.new_index),
                abbreviate_trader(&entry.trader),
                format_usd(totals.legit_usd),
                format_usd(totals.wash_usd),
                fixed(entry.legit_score, 2),
                " ".repeat(score_padding(entry.legit_score)),
                fixed(entry.score_diff.abs(), 2),
            )
        })
        .collect()
}

/// Trade listing for the first `count` traders of the new ranking.
pub fn render_trade_details(
    comparison: &RankingComparison,
    volumes: &VolumeAggregator,
    count: usize,
) -> String {
    let mut out = String::new();
    for (i, trader) in comparison.new_ranking.iter().take(count).enumerate() {
        let totals = volumes.trader_total(trader);
        let _ = writeln!(
            out,
            "{}: {trader} - Total volume: ${} Legit, ${} Wash",
            index_label(i),
            format_usd(totals.legit_usd),
            format_usd(totals.wash_usd)
        );
        for trade in volumes.trades_for(trader) {
            let _ = writeln!(out, "    {}", render_trade(trade));
        }
        out.push('\n');
    }
    out
}

pub fn render_trade(trade: &TradeDetail) -> String {
    format!(
        "[{}] {} {}: ${} Legit, ${} Wash - {} {} for {} {}",
        if trade.is_wash { 'W' } else { 'L' },
        format_timestamp(trade.timestamp),
        network_label(trade.chain_id),
        format_usd(trade.legit_usd),
        format_usd(trade.wash_usd),
        format_usd(trade.base_amount),
        trade.base_token,
        format_usd(trade.quote_amount),
        trade.quote_token
    )
}

/// `New` (legit scores over the new ranking), `Old` (inclusive scores over
/// the old ranking) and `Change` (legit − inclusive over the old ranking).
pub fn bar_series(outcome: &AuditOutcome) -> Vec<BarSeries> {
    let scores = &outcome.allocation.scores;
    let comparison = &outcome.comparison;

    let series = |name: &str, ranking: &[String], value: &dyn Fn(&str) -> Decimal| BarSeries {
        name: name.to_string(),
        points: ranking
            .iter()
            .enumerate()
            .map(|(index, trader)| BarPoint {
                index,
                value: value(trader.as_str()),
            })
            .collect(),
    };

    let legit = |t: &str| scores.get(t).map(|s| s.legit).unwrap_or_default();
    let inclusive = |t: &str| scores.get(t).map(|s| s.wash_inclusive).unwrap_or_default();

    vec![
        series("New", &comparison.new_ranking, &legit),
        series("Old", &comparison.old_ranking, &inclusive),
        series("Change", &comparison.old_ranking, &|t| legit(t) - inclusive(t)),
    ]
}

pub async fn write_chart(path: &Path, series: &[BarSeries]) -> Result<()> {
    let json = serde_json::to_string_pretty(series).context("failed to serialise bar series")?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("failed to write chart: {}", path.display()))
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Two decimals with thousands separators: `1234567.891` → `1,234,567.89`.
pub fn format_usd(value: Decimal) -> String {
    let text = fixed(value.abs(), 2);
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value.is_sign_negative() && !value.round_dp(2).is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{frac_part}")
}

/// `0x1234567890abcdef` → `0x1234...cdef`.
pub fn abbreviate_trader(trader: &str) -> String {
    let chars: Vec<char> = trader.chars().collect();
    if chars.len() <= 10 {
        return trader.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

fn index_label(index: usize) -> String {
    format!("{:02}", index + 1)
}

fn network_label(chain_id: u64) -> String {
    network_name(chain_id)
        .map(str::to_string)
        .unwrap_or_else(|| chain_id.to_string())
}

fn fixed(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", dp as usize, rounded)
}

/// Keeps score columns aligned up to five integer digits.
fn score_padding(score: Decimal) -> usize {
    let digits = score.abs().trunc().to_string().len();
    5usize.saturating_sub(digits)
}
