//! Pair record as observed from the market-data API.
//!
//! Mirrors the DexScreener wire shape (camelCase) but deserializes through
//! the lenient coercion helpers, so partially populated or dirty records
//! still come through with defaults instead of erroring out.

use serde::Deserialize;

use super::coerce::{
    lenient_count, lenient_f64, lenient_millis, lenient_opt_str, lenient_str, non_zero,
};

/// One tradable base/quote token combination observed on a DEX venue.
///
/// Identity is the (pair address, base address, quote address) triple;
/// everything else is a mutable market snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pair {
    #[serde(deserialize_with = "lenient_str")]
    pub chain_id: String,
    #[serde(deserialize_with = "lenient_str")]
    pub dex_id: String,
    #[serde(deserialize_with = "lenient_str")]
    pub url: String,
    #[serde(deserialize_with = "lenient_str")]
    pub pair_address: String,
    pub base_token: TokenRef,
    pub quote_token: TokenRef,
    #[serde(deserialize_with = "lenient_opt_str")]
    pub price_native: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub price_usd: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub fdv: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub market_cap: Option<f64>,
    #[serde(deserialize_with = "lenient_millis")]
    pub pair_created_at: Option<i64>,
    pub volume: TimeframeValues,
    pub price_change: TimeframeValues,
    pub liquidity: Option<Liquidity>,
    pub txns: TxnStats,
    pub info: Option<PairInfo>,
    pub boosts: Option<Boosts>,
}

/// Token identity within a pair.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenRef {
    #[serde(deserialize_with = "lenient_str")]
    pub address: String,
    #[serde(deserialize_with = "lenient_str")]
    pub name: String,
    #[serde(deserialize_with = "lenient_str")]
    pub symbol: String,
}

/// A metric sampled per timeframe (volume, price change).
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct TimeframeValues {
    #[serde(deserialize_with = "lenient_f64")]
    pub m5: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub h1: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub h6: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub h24: Option<f64>,
}

/// Pool liquidity breakdown.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct Liquidity {
    #[serde(deserialize_with = "lenient_f64")]
    pub usd: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub base: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub quote: Option<f64>,
}

/// Buy/sell counts per timeframe.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct TxnStats {
    pub m5: Option<TxnWindow>,
    pub h1: Option<TxnWindow>,
    pub h6: Option<TxnWindow>,
    pub h24: Option<TxnWindow>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct TxnWindow {
    #[serde(deserialize_with = "lenient_count")]
    pub buys: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub sells: u64,
}

impl TxnWindow {
    pub fn total(&self) -> u64 {
        self.buys + self.sells
    }
}

/// Optional profile metadata attached to a pair.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PairInfo {
    #[serde(deserialize_with = "lenient_opt_str")]
    pub image_url: Option<String>,
    pub websites: Vec<Website>,
    pub socials: Vec<Social>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Website {
    #[serde(deserialize_with = "lenient_opt_str")]
    pub label: Option<String>,
    #[serde(deserialize_with = "lenient_str")]
    pub url: String,
}

/// Social link; the API has used both `platform`+`handle` and `type`+`url`
/// shapes over time, so both are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Social {
    #[serde(alias = "type", deserialize_with = "lenient_str")]
    pub platform: String,
    #[serde(deserialize_with = "lenient_opt_str")]
    pub handle: Option<String>,
    #[serde(deserialize_with = "lenient_opt_str")]
    pub url: Option<String>,
}

/// Paid-promotion counters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct Boosts {
    #[serde(deserialize_with = "lenient_count")]
    pub active: u64,
}

impl Pair {
    /// Market cap proxy: FDV when present and non-zero, then marketCap,
    /// else zero.
    pub fn market_cap_usd(&self) -> f64 {
        non_zero(self.fdv)
            .or_else(|| non_zero(self.market_cap))
            .unwrap_or(0.0)
    }

    /// Age in minutes relative to `now_ms`, if a creation timestamp is
    /// known. Negative ages are returned as-is so callers can flag clock
    /// skew.
    pub fn age_minutes(&self, now_ms: i64) -> Option<f64> {
        let created = self.pair_created_at.filter(|ms| *ms != 0)?;
        Some((now_ms - created) as f64 / 60_000.0)
    }

    /// Symbol for display, never empty.
    pub fn display_symbol(&self) -> &str {
        if self.base_token.symbol.is_empty() {
            "UNKNOWN"
        } else {
            &self.base_token.symbol
        }
    }

    /// Token name for display, never empty.
    pub fn display_name(&self) -> &str {
        if self.base_token.name.is_empty() {
            "Unknown Token"
        } else {
            &self.base_token.name
        }
    }

    /// Active boost count, zero when absent.
    pub fn active_boosts(&self) -> u64 {
        self.boosts.map(|b| b.active).unwrap_or(0)
    }

    /// Liquidity in USD, if reported.
    pub fn liquidity_usd(&self) -> Option<f64> {
        self.liquidity.and_then(|l| l.usd)
    }
}
