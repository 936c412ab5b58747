//! Composite risk scoring for accepted pairs.
//!
//! Additive point system over market cap, age, volume, liquidity, recent
//! activity, DEX tier, social presence, and volatility. Every input goes
//! through lenient coercion, so the scorer is total: dirty upstream data
//! shifts the score toward the risky end instead of failing.

use std::fmt;

use super::chain::{self, MAJOR_DEXES, TRUSTED_DEXES};
use super::coerce::or_zero;
use super::pair::Pair;

/// Score assigned by [`RiskAssessment::analysis_failed`].
const FALLBACK_SCORE: u32 = 10;

/// Categorical risk bucket derived from the additive score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
    Extreme,
    Unknown,
}

impl RiskLevel {
    /// Fixed score-to-level thresholds.
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=2 => RiskLevel::Low,
            3..=5 => RiskLevel::Medium,
            6..=8 => RiskLevel::High,
            9..=12 => RiskLevel::VeryHigh,
            _ => RiskLevel::Extreme,
        }
    }

    /// Marker used in the notification text.
    pub fn emoji(&self) -> &'static str {
        match self {
            RiskLevel::Low => "\u{1F7E2}",      // green circle
            RiskLevel::Medium => "\u{1F7E1}",   // yellow circle
            RiskLevel::High => "\u{1F7E0}",     // orange circle
            RiskLevel::VeryHigh => "\u{1F534}", // red circle
            RiskLevel::Extreme => "\u{26AB}",   // black circle
            RiskLevel::Unknown => "\u{26AA}",   // white circle
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::VeryHigh => "VERY HIGH",
            RiskLevel::Extreme => "EXTREME",
            RiskLevel::Unknown => "UNKNOWN",
        };
        f.write_str(label)
    }
}

/// Outcome of scoring one pair.
#[derive(Debug, Clone)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub factors: Vec<String>,
    pub score: u32,
}

impl RiskAssessment {
    /// Pessimistic sentinel for any path where scoring input is unusable.
    pub fn analysis_failed() -> Self {
        Self {
            level: RiskLevel::Unknown,
            factors: vec!["Analysis Failed".to_string()],
            score: FALLBACK_SCORE,
        }
    }
}

/// Score a pair. `now_ms` drives the age heuristic.
pub fn assess(pair: &Pair, now_ms: i64) -> RiskAssessment {
    let mut score = 0u32;
    let mut factors: Vec<String> = Vec::new();
    let mut tally = |points: u32, label: &str| {
        factors.push(label.to_string());
        points
    };

    // Market cap
    let market_cap = pair.market_cap_usd();
    score += if market_cap < 10_000.0 {
        tally(3, "Very Low Market Cap (<$10K)")
    } else if market_cap < 25_000.0 {
        tally(2, "Low Market Cap (<$25K)")
    } else if market_cap < 50_000.0 {
        tally(1, "Small Market Cap (<$50K)")
    } else {
        0
    };

    // Age
    score += match pair.age_minutes(now_ms) {
        Some(age) if age < 2.0 => tally(4, "Extremely New (<2min)"),
        Some(age) if age < 5.0 => tally(3, "Very New (<5min)"),
        Some(age) if age < 15.0 => tally(2, "New (<15min)"),
        Some(age) if age < 30.0 => tally(1, "Recent (<30min)"),
        Some(_) => 0,
        None => tally(2, "Unknown Age"),
    };

    // 24h volume
    let volume_24h = or_zero(pair.volume.h24);
    score += if volume_24h < 500.0 {
        tally(3, "Very Low Volume (<$500)")
    } else if volume_24h < 2_000.0 {
        tally(2, "Low Volume (<$2K)")
    } else if volume_24h < 5_000.0 {
        tally(1, "Moderate Volume (<$5K)")
    } else {
        0
    };

    // Liquidity
    let liquidity_usd = or_zero(pair.liquidity_usd());
    score += if liquidity_usd < 2_000.0 {
        tally(3, "Very Low Liquidity (<$2K)")
    } else if liquidity_usd < 5_000.0 {
        tally(2, "Low Liquidity (<$5K)")
    } else if liquidity_usd < 10_000.0 {
        tally(1, "Moderate Liquidity (<$10K)")
    } else {
        0
    };

    // 5-minute activity
    let txns_5m = pair.txns.m5.map(|w| w.total()).unwrap_or(0);
    score += if txns_5m == 0 {
        tally(3, "No Recent Activity")
    } else if txns_5m < 5 {
        tally(2, "Very Low Activity (<5 txns/5m)")
    } else if txns_5m < 20 {
        tally(1, "Low Activity (<20 txns/5m)")
    } else {
        0
    };

    // DEX tier
    let trusted = chain::dex_matches(&pair.dex_id, TRUSTED_DEXES);
    let major = chain::dex_matches(&pair.dex_id, MAJOR_DEXES);
    score += if !trusted && !major {
        tally(2, "Unknown/Minor DEX")
    } else if major {
        tally(1, "Major DEX (Non-Traditional)")
    } else {
        0
    };

    // Social presence
    let has_links = pair
        .info
        .as_ref()
        .map(|info| !info.websites.is_empty() || !info.socials.is_empty())
        .unwrap_or(false);
    if !has_links {
        score += tally(2, "No website or social links");
    }

    // 24h volatility
    let change_24h = or_zero(pair.price_change.h24);
    score += if change_24h.abs() > 200.0 {
        tally(2, "Extreme Volatility (>200%)")
    } else if change_24h.abs() > 100.0 {
        tally(1, "High Volatility (>100%)")
    } else {
        0
    };

    RiskAssessment {
        level: RiskLevel::from_score(score),
        factors,
        score,
    }
}
