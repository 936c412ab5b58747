//! Admission filtering for candidate pairs.
//!
//! An ordered sequence of checks, short-circuiting on the first failure.
//! Each rejection carries the token symbol and enough numbers to read the
//! decision straight out of the logs.

use thiserror::Error;

use super::chain;
use super::coerce::or_zero;
use super::pair::Pair;

/// Fixed minimum 24h volume in USD.
pub const MIN_VOLUME_24H_USD: f64 = 100.0;
/// Fixed minimum pool liquidity in USD, only enforced when reported.
pub const MIN_LIQUIDITY_USD: f64 = 1000.0;
/// Minimum 1h buy+sell count when the 5m window shows nothing.
pub const MIN_FALLBACK_H1_TXNS: u64 = 5;

/// Configurable admission thresholds.
#[derive(Debug, Clone)]
pub struct FilterParams {
    pub target_chain: String,
    pub min_market_cap: f64,
    pub max_market_cap: f64,
    pub max_age_minutes: f64,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            target_chain: "solana".to_string(),
            min_market_cap: 5_000.0,
            max_market_cap: 50_000.0,
            max_age_minutes: 30.0,
        }
    }
}

/// Why a pair was turned away.
#[derive(Debug, Clone, Error)]
pub enum Rejection {
    #[error("Missing base token data")]
    MissingBaseToken,

    #[error("{symbol}: Not a {chain} pair")]
    WrongChain { symbol: String, chain: String },

    #[error("{symbol}: No market cap or price data")]
    NoMarketData { symbol: String },

    #[error("{symbol}: Market cap ${market_cap:.0} outside range (${min:.0}-${max:.0})")]
    MarketCapOutOfRange {
        symbol: String,
        market_cap: f64,
        min: f64,
        max: f64,
    },

    #[error("{symbol}: Too old ({age_minutes:.1} minutes, max {max_minutes:.0})")]
    TooOld {
        symbol: String,
        age_minutes: f64,
        max_minutes: f64,
    },

    #[error("{symbol}: Invalid timestamp")]
    InvalidTimestamp { symbol: String },

    #[error("{symbol}: Low volume ${volume_24h:.0}")]
    LowVolume { symbol: String, volume_24h: f64 },

    #[error("{symbol}: No valid price data")]
    InvalidPrice { symbol: String },

    #[error("{symbol}: Low liquidity ${liquidity_usd:.0}")]
    LowLiquidity { symbol: String, liquidity_usd: f64 },

    #[error("{symbol}: Very low activity")]
    LowActivity { symbol: String },
}

impl Rejection {
    /// Stable key for the per-cycle rejection histogram.
    pub fn category(&self) -> &'static str {
        match self {
            Rejection::MissingBaseToken => "missing base token",
            Rejection::WrongChain { .. } => "wrong chain",
            Rejection::NoMarketData { .. } => "no market data",
            Rejection::MarketCapOutOfRange { .. } => "market cap out of range",
            Rejection::TooOld { .. } => "too old",
            Rejection::InvalidTimestamp { .. } => "invalid timestamp",
            Rejection::LowVolume { .. } => "low volume",
            Rejection::InvalidPrice { .. } => "invalid price",
            Rejection::LowLiquidity { .. } => "low liquidity",
            Rejection::LowActivity { .. } => "low activity",
        }
    }
}

/// Applies the admission checks in order.
#[derive(Debug, Clone)]
pub struct FilterEngine {
    params: FilterParams,
}

impl FilterEngine {
    pub fn new(params: FilterParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    /// Evaluate one pair against all checks. `now_ms` is injected so the
    /// age checks are deterministic under test.
    pub fn evaluate(&self, pair: &Pair, now_ms: i64) -> Result<(), Rejection> {
        if pair.base_token.address.is_empty() {
            return Err(Rejection::MissingBaseToken);
        }
        let symbol = pair.display_symbol().to_string();

        if !chain::is_target_pair(pair, &self.params.target_chain) {
            return Err(Rejection::WrongChain {
                symbol,
                chain: self.params.target_chain.clone(),
            });
        }

        let market_cap = pair.market_cap_usd();
        if market_cap == 0.0 && or_zero(pair.price_usd) <= 0.0 {
            return Err(Rejection::NoMarketData { symbol });
        }
        if market_cap > 0.0
            && !(self.params.min_market_cap..=self.params.max_market_cap).contains(&market_cap)
        {
            return Err(Rejection::MarketCapOutOfRange {
                symbol,
                market_cap,
                min: self.params.min_market_cap,
                max: self.params.max_market_cap,
            });
        }

        if let Some(age_minutes) = pair.age_minutes(now_ms) {
            if age_minutes > self.params.max_age_minutes {
                return Err(Rejection::TooOld {
                    symbol,
                    age_minutes,
                    max_minutes: self.params.max_age_minutes,
                });
            }
            if age_minutes < 0.0 {
                return Err(Rejection::InvalidTimestamp { symbol });
            }
        }

        let volume_24h = or_zero(pair.volume.h24);
        if volume_24h < MIN_VOLUME_24H_USD {
            return Err(Rejection::LowVolume { symbol, volume_24h });
        }

        if or_zero(pair.price_usd) <= 0.0 {
            return Err(Rejection::InvalidPrice { symbol });
        }

        // Soft check: absent liquidity passes.
        if let Some(liquidity_usd) = pair.liquidity_usd() {
            if liquidity_usd < MIN_LIQUIDITY_USD {
                return Err(Rejection::LowLiquidity {
                    symbol,
                    liquidity_usd,
                });
            }
        }

        // Soft check: absent txn windows pass.
        let txns_5m = pair.txns.m5.map(|w| w.total()).unwrap_or(0);
        if txns_5m == 0 {
            if let Some(h1) = pair.txns.h1 {
                if h1.total() < MIN_FALLBACK_H1_TXNS {
                    return Err(Rejection::LowActivity { symbol });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pair::{Liquidity, TokenRef, TxnWindow};

    const NOW_MS: i64 = 1_700_000_000_000;

    /// A pair that passes every check with room to spare.
    fn good_pair() -> Pair {
        let mut pair = Pair {
            chain_id: "solana".to_string(),
            dex_id: "raydium".to_string(),
            pair_address: "PAIRaddr111111111111111111111111111111111".to_string(),
            base_token: TokenRef {
                address: "BASEaddr11111111111111111111111111111111".to_string(),
                name: "Moon Cat".to_string(),
                symbol: "MCAT".to_string(),
            },
            quote_token: TokenRef {
                address: "So11111111111111111111111111111111111111112".to_string(),
                name: "Wrapped SOL".to_string(),
                symbol: "SOL".to_string(),
            },
            price_usd: Some(0.001),
            fdv: Some(20_000.0),
            pair_created_at: Some(NOW_MS - 10 * 60_000),
            ..Default::default()
        };
        pair.volume.h24 = Some(5_000.0);
        pair.liquidity = Some(Liquidity {
            usd: Some(8_000.0),
            ..Default::default()
        });
        pair.txns.m5 = Some(TxnWindow { buys: 10, sells: 8 });
        pair
    }

    fn engine() -> FilterEngine {
        FilterEngine::new(FilterParams::default())
    }

    #[test]
    fn test_good_pair_passes() {
        assert!(engine().evaluate(&good_pair(), NOW_MS).is_ok());
    }

    #[test]
    fn test_missing_base_token() {
        let mut pair = good_pair();
        pair.base_token.address.clear();
        let rej = engine().evaluate(&pair, NOW_MS).unwrap_err();
        assert!(matches!(rej, Rejection::MissingBaseToken));
    }

    #[test]
    fn test_wrong_chain() {
        let mut pair = good_pair();
        pair.chain_id = "ethereum".to_string();
        pair.dex_id = "uniswap".to_string();
        pair.base_token.address = "0xdead00000000000000000000000000000000beef".to_string();
        pair.quote_token.address = "0xdead00000000000000000000000000000000cafe".to_string();
        let rej = engine().evaluate(&pair, NOW_MS).unwrap_err();
        assert!(matches!(rej, Rejection::WrongChain { .. }));
        assert!(rej.to_string().contains("MCAT"));
    }

    #[test]
    fn test_market_cap_band_is_inclusive() {
        let mut pair = good_pair();

        pair.fdv = Some(5_000.0);
        assert!(engine().evaluate(&pair, NOW_MS).is_ok());

        pair.fdv = Some(50_000.0);
        assert!(engine().evaluate(&pair, NOW_MS).is_ok());

        pair.fdv = Some(4_999.0);
        assert!(matches!(
            engine().evaluate(&pair, NOW_MS).unwrap_err(),
            Rejection::MarketCapOutOfRange { .. }
        ));

        pair.fdv = Some(50_001.0);
        assert!(matches!(
            engine().evaluate(&pair, NOW_MS).unwrap_err(),
            Rejection::MarketCapOutOfRange { .. }
        ));
    }

    #[test]
    fn test_zero_cap_falls_back_to_price() {
        let mut pair = good_pair();
        pair.fdv = None;
        pair.market_cap = None;
        // price present: passes the market-data check
        assert!(engine().evaluate(&pair, NOW_MS).is_ok());

        pair.price_usd = None;
        let rej = engine().evaluate(&pair, NOW_MS).unwrap_err();
        assert!(matches!(rej, Rejection::NoMarketData { .. }));
    }

    #[test]
    fn test_age_boundaries() {
        let mut pair = good_pair();

        // exactly max age passes
        pair.pair_created_at = Some(NOW_MS - 30 * 60_000);
        assert!(engine().evaluate(&pair, NOW_MS).is_ok());

        // a hair over is rejected
        pair.pair_created_at = Some(NOW_MS - 30 * 60_000 - 1_000);
        let rej = engine().evaluate(&pair, NOW_MS).unwrap_err();
        assert!(matches!(rej, Rejection::TooOld { .. }));
        assert!(rej.to_string().contains("Too old"));

        // negative age means a bad upstream timestamp
        pair.pair_created_at = Some(NOW_MS + 60_000);
        assert!(matches!(
            engine().evaluate(&pair, NOW_MS).unwrap_err(),
            Rejection::InvalidTimestamp { .. }
        ));

        // unknown age passes
        pair.pair_created_at = None;
        assert!(engine().evaluate(&pair, NOW_MS).is_ok());
    }

    #[test]
    fn test_low_volume() {
        let mut pair = good_pair();
        pair.volume.h24 = Some(99.0);
        assert!(matches!(
            engine().evaluate(&pair, NOW_MS).unwrap_err(),
            Rejection::LowVolume { .. }
        ));

        pair.volume.h24 = None;
        assert!(matches!(
            engine().evaluate(&pair, NOW_MS).unwrap_err(),
            Rejection::LowVolume { .. }
        ));

        pair.volume.h24 = Some(100.0);
        assert!(engine().evaluate(&pair, NOW_MS).is_ok());
    }

    #[test]
    fn test_liquidity_is_soft() {
        let mut pair = good_pair();
        pair.liquidity = None;
        // absent liquidity is not a rejection
        assert!(engine().evaluate(&pair, NOW_MS).is_ok());

        let mut pair = good_pair();
        pair.liquidity = Some(Liquidity {
            usd: Some(999.0),
            ..Default::default()
        });
        assert!(matches!(
            engine().evaluate(&pair, NOW_MS).unwrap_err(),
            Rejection::LowLiquidity { .. }
        ));
    }

    #[test]
    fn test_activity_fallback() {
        // dead 5m window falls back to the 1h window
        let mut pair = good_pair();
        pair.txns.m5 = Some(TxnWindow { buys: 0, sells: 0 });
        pair.txns.h1 = Some(TxnWindow { buys: 2, sells: 1 });
        assert!(matches!(
            engine().evaluate(&pair, NOW_MS).unwrap_err(),
            Rejection::LowActivity { .. }
        ));

        pair.txns.h1 = Some(TxnWindow { buys: 3, sells: 2 });
        assert!(engine().evaluate(&pair, NOW_MS).is_ok());

        // both windows absent: soft pass
        pair.txns.m5 = None;
        pair.txns.h1 = None;
        assert!(engine().evaluate(&pair, NOW_MS).is_ok());
    }

    #[test]
    fn test_rejection_categories_are_stable() {
        let rej = Rejection::LowVolume {
            symbol: "X".to_string(),
            volume_24h: 5.0,
        };
        assert_eq!(rej.category(), "low volume");
        assert_eq!(Rejection::MissingBaseToken.category(), "missing base token");
    }
}
