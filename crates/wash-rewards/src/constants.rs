use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ---------------------------------------------------------------------------
// Wash detection
// ---------------------------------------------------------------------------

/// Maximum relative price difference `|1 - entry/trade|` for two legs to be
/// considered the same round trip.
pub const WASH_PRICE_TOLERANCE: Decimal = dec!(0.02);

/// Maximum number of flow-stack entries popped per trade.
pub const MAX_LOOKBACK: usize = 5;

// ---------------------------------------------------------------------------
// Rewards
// ---------------------------------------------------------------------------

/// Share of a chain's allotment paid to blue-chip pairs.
pub const BLUE_CHIP_SPLIT: Decimal = dec!(0.75);

/// Share of a chain's allotment paid to every other pair.
pub const NON_BLUE_CHIP_SPLIT: Decimal = dec!(0.25);

/// Largest token precision representable as a `Decimal` scale.
pub const MAX_TOKEN_DECIMALS: u32 = 28;

/// Tokens whose pairs (both legs) count as blue-chip volume.
pub const DEFAULT_BLUE_CHIPS: &[&str] = &[
    "ETH", "WETH", "WBTC", "MATIC", "WMATIC", "AVAX", "WAVAX", "BNB", "WBNB", "AETH", "USDC",
    "USDT", "DAI", "USDC.e", "USDT.e", "BUSD",
];

// ---------------------------------------------------------------------------
// Networks
// ---------------------------------------------------------------------------

pub const CHAIN_MAINNET: u64 = 1;
pub const CHAIN_KOVAN: u64 = 42;
pub const CHAIN_POLYGON: u64 = 137;
pub const CHAIN_MUMBAI: u64 = 80001;
pub const CHAIN_BSC: u64 = 56;
pub const CHAIN_BSC_TESTNET: u64 = 97;
pub const CHAIN_ARBITRUM: u64 = 42161;
pub const CHAIN_AVALANCHE: u64 = 43114;

/// Human-readable network name, if the chain id is known.
pub fn network_name(chain_id: u64) -> Option<&'static str> {
    match chain_id {
        CHAIN_MAINNET => Some("mainnet"),
        CHAIN_KOVAN => Some("kovan"),
        CHAIN_POLYGON => Some("polygon"),
        CHAIN_MUMBAI => Some("mumbai"),
        CHAIN_BSC => Some("bsc"),
        CHAIN_BSC_TESTNET => Some("bsctestnet"),
        CHAIN_ARBITRUM => Some("arbitrum"),
        CHAIN_AVALANCHE => Some("avalanche"),
        _ => None,
    }
}
