use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of the new-vs-old ranking comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub trader: String,
    /// Zero-based position in the legit-score ranking.
    pub new_index: usize,
    /// Zero-based position in the wash-inclusive ranking, if within its top-N.
    pub old_index: Option<usize>,
    /// `old_index - new_index`; positive means the trader moved up.
    pub rank_delta: Option<i64>,
    #[serde(with = "rust_decimal::serde::str")]
    pub legit_score: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub wash_inclusive_score: Decimal,
    /// `legit_score - wash_inclusive_score`.
    #[serde(with = "rust_decimal::serde::str")]
    pub score_diff: Decimal,
    /// `|diff| / old * 100`; `None` when the old score is zero.
    #[serde(with = "rust_decimal::serde::str_option")]
    pub percent_change: Option<Decimal>,
}

/// Both orderings plus the per-trader comparison over the new one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingComparison {
    /// Traders ordered by legit score.
    pub new_ranking: Vec<String>,
    /// Traders ordered by wash-inclusive score.
    pub old_ranking: Vec<String>,
    pub entries: Vec<RankingEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarPoint {
    pub index: usize,
    #[serde(with = "rust_decimal::serde::str")]
    pub value: Decimal,
}

/// Named `(index, value)` series for charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    pub name: String,
    pub points: Vec<BarPoint>,
}
