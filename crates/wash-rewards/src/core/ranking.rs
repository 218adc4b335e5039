//! Trader rankings under both score variants and their comparison.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{RankingComparison, RankingEntry, TraderScore};

/// Top `top_n` traders by `selector`, highest first. Equal scores are
/// ordered by ascending trader id.
pub fn rank<F>(scores: &BTreeMap<String, TraderScore>, selector: F, top_n: usize) -> Vec<String>
where
    F: Fn(&TraderScore) -> Decimal,
{
    let mut ranked: Vec<(&String, Decimal)> = scores
        .iter()
        .map(|(trader, score)| (trader, selector(score)))
        .collect();

    ranked.sort_by(|(ta, sa), (tb, sb)| sb.cmp(sa).then_with(|| ta.cmp(tb)));

    ranked
        .into_iter()
        .take(top_n)
        .map(|(trader, _)| trader.clone())
        .collect()
}

/// `|new - old| / old × 100`, undefined when `old` is zero.
pub fn percent_change(new: Decimal, old: Decimal) -> Option<Decimal> {
    if old.is_zero() {
        return None;
    }
    Some((new - old).abs() / old.abs() * dec!(100))
}

/// Rank by legit score ("new") and by wash-inclusive score ("old") and
/// describe how each trader in the new ranking moved.
pub fn compare_rankings(scores: &BTreeMap<String, TraderScore>, top_n: usize) -> RankingComparison {
    let new_ranking = rank(scores, |s| s.legit, top_n);
    let old_ranking = rank(scores, |s| s.wash_inclusive, top_n);

    let entries = new_ranking
        .iter()
        .enumerate()
        .map(|(new_index, trader)| {
            let score = scores.get(trader).copied().unwrap_or_default();
            let old_index = old_ranking.iter().position(|t| t == trader);
            RankingEntry {
                trader: trader.clone(),
                new_index,
                old_index,
                rank_delta: old_index.map(|old| old as i64 - new_index as i64),
                legit_score: score.legit,
                wash_inclusive_score: score.wash_inclusive,
                score_diff: score.legit - score.wash_inclusive,
                percent_change: percent_change(score.legit, score.wash_inclusive),
            }
        })
        .collect();

    RankingComparison {
        new_ranking,
        old_ranking,
        entries,
    }
}
