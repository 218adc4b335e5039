use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Reward category of a trade's pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Both legs are on the blue-chip allow-list.
    BlueChip,
    /// At least one leg is outside the allow-list.
    NonBlueChip,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::BlueChip, Category::NonBlueChip];

    /// Classify a pair: blue-chip iff both token names are allow-listed.
    pub fn classify(base_token: &str, quote_token: &str, blue_chips: &BTreeSet<String>) -> Self {
        if blue_chips.contains(base_token) && blue_chips.contains(quote_token) {
            Self::BlueChip
        } else {
            Self::NonBlueChip
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlueChip => "blue-chip",
            Self::NonBlueChip => "non-blue-chip",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Running legit / wash USD totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeBucket {
    #[serde(with = "rust_decimal::serde::str")]
    pub legit_usd: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub wash_usd: Decimal,
}

impl VolumeBucket {
    pub fn add(&mut self, legit_usd: Decimal, wash_usd: Decimal) {
        self.legit_usd += legit_usd;
        self.wash_usd += wash_usd;
    }

    /// Legit plus wash volume, the basis of the wash-inclusive score.
    pub fn inclusive_usd(&self) -> Decimal {
        self.legit_usd + self.wash_usd
    }
}

/// A trader's accumulated reward under both scoring variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraderScore {
    /// Reward earned on legit volume only (the corrected formula).
    #[serde(with = "rust_decimal::serde::str")]
    pub legit: Decimal,
    /// Reward earned when wash volume is counted (the naive formula).
    #[serde(with = "rust_decimal::serde::str")]
    pub wash_inclusive: Decimal,
}

/// Per-trade record kept for the trade-detail report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeDetail {
    pub chain_id: u64,
    pub timestamp: i64,
    pub base_token: String,
    pub quote_token: String,
    /// Decimal-normalised base amount.
    #[serde(with = "rust_decimal::serde::str")]
    pub base_amount: Decimal,
    /// Decimal-normalised quote amount.
    #[serde(with = "rust_decimal::serde::str")]
    pub quote_amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub legit_usd: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub wash_usd: Decimal,
    pub is_wash: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn blue_chips() -> BTreeSet<String> {
        ["WETH", "USDC"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_classify_requires_both_legs() {
        let chips = blue_chips();
        assert_eq!(Category::classify("WETH", "USDC", &chips), Category::BlueChip);
        assert_eq!(Category::classify("WETH", "SHIB", &chips), Category::NonBlueChip);
        assert_eq!(Category::classify("SHIB", "USDC", &chips), Category::NonBlueChip);
    }

    #[test]
    fn test_classify_is_case_sensitive() {
        assert_eq!(
            Category::classify("weth", "USDC", &blue_chips()),
            Category::NonBlueChip
        );
    }

    #[test]
    fn test_bucket_accumulates() {
        let mut bucket = VolumeBucket::default();
        bucket.add(dec!(10), dec!(2.5));
        bucket.add(dec!(5), dec!(0));
        assert_eq!(bucket.legit_usd, dec!(15));
        assert_eq!(bucket.wash_usd, dec!(2.5));
        assert_eq!(bucket.inclusive_usd(), dec!(17.5));
    }

    #[test]
    fn test_category_serde_names() {
        assert_eq!(
            serde_json::to_string(&Category::NonBlueChip).unwrap(),
            "\"non-blue-chip\""
        );
        assert_eq!(Category::BlueChip.to_string(), "blue-chip");
    }
}
