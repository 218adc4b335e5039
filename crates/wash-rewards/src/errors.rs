use thiserror::Error;

/// Typed error hierarchy for the reward audit.
///
/// Library-internal errors use specific variants; application code wraps with
/// `anyhow::Context` for propagation. Every variant is fatal for the run:
/// reward shares are only meaningful once the whole ledger has been processed.
#[derive(Error, Debug)]
pub enum AuditError {
    // -- Pricing ------------------------------------------------------------
    #[error("could not find prices for token {chain}:{token}")]
    PriceSeriesMissing { chain: u64, token: String },

    #[error("price query for {token} went backwards: {requested} < {previous}")]
    NonMonotonicTimestamp {
        token: String,
        previous: i64,
        requested: i64,
    },

    // -- Registry -----------------------------------------------------------
    #[error("could not find token {chain}:{token}")]
    TokenNotFound { chain: u64, token: String },

    // -- Ledger -------------------------------------------------------------
    #[error("ledger out of order at trade #{index}: {timestamp} < {previous}")]
    UnorderedLedger {
        index: usize,
        previous: i64,
        timestamp: i64,
    },

    #[error("invalid ledger record: {reason}")]
    InvalidRecord { reason: String },

    // -- Rewards ------------------------------------------------------------
    #[error("no reward weight configured for chain {chain}")]
    ChainWeightMissing { chain: u64 },

    #[error("decimal arithmetic failed: {reason}")]
    Arithmetic { reason: String },
}
