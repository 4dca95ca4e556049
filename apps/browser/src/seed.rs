//! Offline asset dataset, ordered by market cap rank.

use std::time::Duration;

use list_core::StaticPageFetcher;
use shared::domain::Asset;

const ASSETS: &[(&str, &str, &str, f64, f64)] = &[
    ("bitcoin", "BTC", "Bitcoin", 67_245.12, 1.84),
    ("ethereum", "ETH", "Ethereum", 3_512.40, 2.31),
    ("tether", "USDT", "Tether", 1.0, 0.01),
    ("binancecoin", "BNB", "BNB", 584.77, -0.42),
    ("solana", "SOL", "Solana", 171.93, 4.12),
    ("usd-coin", "USDC", "USDC", 1.0, 0.0),
    ("ripple", "XRP", "XRP", 0.52, -1.07),
    ("staked-ether", "STETH", "Lido Staked Ether", 3_509.88, 2.29),
    ("dogecoin", "DOGE", "Dogecoin", 0.16, 3.55),
    ("the-open-network", "TON", "Toncoin", 7.21, -2.18),
    ("cardano", "ADA", "Cardano", 0.45, 0.73),
    ("shiba-inu", "SHIB", "Shiba Inu", 0.000_024, 5.02),
    ("avalanche-2", "AVAX", "Avalanche", 35.66, 1.12),
    ("tron", "TRX", "TRON", 0.12, 0.34),
    ("wrapped-bitcoin", "WBTC", "Wrapped Bitcoin", 67_190.05, 1.80),
    ("polkadot", "DOT", "Polkadot", 7.03, -0.96),
    ("chainlink", "LINK", "Chainlink", 16.48, 2.65),
    ("bitcoin-cash", "BCH", "Bitcoin Cash", 478.31, 0.58),
    ("near", "NEAR", "NEAR Protocol", 7.12, 6.40),
    ("matic-network", "MATIC", "Polygon", 0.71, -1.33),
    ("litecoin", "LTC", "Litecoin", 83.94, 0.21),
    ("internet-computer", "ICP", "Internet Computer", 12.06, -3.47),
    ("uniswap", "UNI", "Uniswap", 10.12, 1.98),
    ("ethereum-classic", "ETC", "Ethereum Classic", 27.45, 0.87),
    ("aptos", "APT", "Aptos", 9.03, -0.55),
    ("stellar", "XLM", "Stellar", 0.11, 0.12),
    ("monero", "XMR", "Monero", 126.70, -0.31),
    ("cosmos", "ATOM", "Cosmos Hub", 8.44, 1.46),
    ("filecoin", "FIL", "Filecoin", 5.91, -2.04),
    ("arbitrum", "ARB", "Arbitrum", 1.07, 3.11),
    ("hedera-hashgraph", "HBAR", "Hedera", 0.10, -0.78),
    ("vechain", "VET", "VeChain", 0.036, 0.95),
    ("optimism", "OP", "Optimism", 2.48, 2.72),
    ("maker", "MKR", "Maker", 2_821.55, -1.26),
    ("terra-luna", "LUNC", "Terra Luna Classic", 0.000_09, -4.80),
];

/// Assets whose trading is halted in the dataset.
const INACTIVE: &[&str] = &["terra-luna"];

pub fn assets() -> Vec<Asset> {
    ASSETS
        .iter()
        .zip(1..)
        .map(|(&(id, symbol, name, price, change), rank)| {
            let asset = Asset::new(id, symbol, name)
                .with_rank(rank)
                .with_price(price, change);
            if INACTIVE.contains(&id) {
                asset.inactive()
            } else {
                asset
            }
        })
        .collect()
}

pub fn fetcher(latency: Duration) -> StaticPageFetcher<Asset> {
    StaticPageFetcher::new(assets()).with_latency(latency)
}
