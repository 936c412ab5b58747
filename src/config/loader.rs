//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching the
//! config.toml shipped at the repo root. Every section is optional and
//! falls back to documented defaults; secrets (Telegram and Axiom
//! credentials) are overridable from the environment.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::adapters::axiom::AxiomConfig;
use crate::adapters::dexscreener::{DexScreenerConfig, RateLimits};
use crate::adapters::telegram::TelegramConfig;
use crate::application::fetcher::FetcherConfig;
use crate::application::orchestrator::ScanSettings;
use crate::domain::filter::FilterParams;

/// Main configuration structure matching config.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scan: ScanSection,
    pub filter: FilterSection,
    pub dexscreener: DexScreenerSection,
    pub telegram: TelegramSection,
    pub axiom: AxiomSection,
    pub logging: LoggingSection,
}

/// Cycle pacing section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanSection {
    /// Seconds between polling cycles
    pub interval_secs: u64,
    /// Accepted pairs processed per cycle, at most
    pub max_pairs_per_cycle: usize,
    /// Seconds between consecutive notification sends
    pub notify_delay_secs: u64,
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            interval_secs: 7,
            max_pairs_per_cycle: 7,
            notify_delay_secs: 5,
        }
    }
}

/// Admission threshold section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterSection {
    /// Target chain identifier
    pub chain: String,
    /// Market cap band, inclusive on both ends (USD)
    pub min_market_cap: f64,
    pub max_market_cap: f64,
    /// Maximum pair age in minutes
    pub max_age_minutes: f64,
}

impl Default for FilterSection {
    fn default() -> Self {
        Self {
            chain: "solana".to_string(),
            min_market_cap: 5_000.0,
            max_market_cap: 50_000.0,
            max_age_minutes: 30.0,
        }
    }
}

/// Market-data API section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DexScreenerSection {
    pub base_url: String,
    pub profiles_path: String,
    pub boosts_latest_path: String,
    pub boosts_top_path: String,
    pub search_path: String,
    pub tokens_path: String,
    /// Search terms fed to the free-text endpoint
    pub search_terms: Vec<String>,
    pub timeout_secs: u64,
    /// Delay between calls inside one multi-call fetch
    pub source_delay_ms: u64,
    /// Cooldown after a server-side 429
    pub cooldown_secs: u64,
    /// Per-minute ceilings per endpoint class
    pub profiles_per_minute: u32,
    pub boosts_per_minute: u32,
    pub search_per_minute: u32,
    pub tokens_per_minute: u32,
}

impl Default for DexScreenerSection {
    fn default() -> Self {
        let dex = DexScreenerConfig::default();
        let limits = RateLimits::default();
        Self {
            base_url: dex.base_url,
            profiles_path: dex.profiles_path,
            boosts_latest_path: dex.boosts_latest_path,
            boosts_top_path: dex.boosts_top_path,
            search_path: dex.search_path,
            tokens_path: dex.tokens_path,
            search_terms: FetcherConfig::default().search_terms,
            timeout_secs: 15,
            source_delay_ms: 1000,
            cooldown_secs: 5,
            profiles_per_minute: limits.token_profiles,
            boosts_per_minute: limits.token_boosts,
            search_per_minute: limits.search,
            tokens_per_minute: limits.tokens,
        }
    }
}

/// Notification channel section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramSection {
    pub api_base_url: String,
    /// Bot token; prefer the TELEGRAM_BOT_TOKEN env var
    pub bot_token: String,
    /// Destination chat; prefer the TELEGRAM_CHAT_ID env var
    pub chat_id: String,
    /// Seconds between chunks of one oversized message
    pub chunk_delay_secs: u64,
    /// Answer /start, /stats and /health commands
    pub commands_enabled: bool,
}

impl Default for TelegramSection {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.telegram.org".to_string(),
            bot_token: String::new(),
            chat_id: String::new(),
            chunk_delay_secs: 1,
            commands_enabled: true,
        }
    }
}

impl TelegramSection {
    /// Bot token with environment variable override.
    /// Checks TELEGRAM_BOT_TOKEN first, falls back to the config value.
    pub fn get_bot_token(&self) -> String {
        std::env::var("TELEGRAM_BOT_TOKEN").unwrap_or_else(|_| self.bot_token.clone())
    }

    /// Chat id with environment variable override.
    /// Checks TELEGRAM_CHAT_ID first, falls back to the config value.
    pub fn get_chat_id(&self) -> String {
        std::env::var("TELEGRAM_CHAT_ID").unwrap_or_else(|_| self.chat_id.clone())
    }
}

/// Analytics backend section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AxiomSection {
    pub ingest_base_url: String,
    pub query_base_url: String,
    /// Dataset name; prefer the AXIOM_DATASET env var
    pub dataset: String,
    /// API token; prefer the AXIOM_TOKEN env var
    pub token: String,
    pub timeout_secs: u64,
    /// Delivery attempts per ingest batch
    pub max_attempts: u32,
    /// First retry delay; doubles per attempt
    pub base_delay_ms: u64,
    /// Optional APL query used as a supplementary pair source
    pub supplementary_query: String,
}

impl Default for AxiomSection {
    fn default() -> Self {
        let axiom = AxiomConfig::default();
        Self {
            ingest_base_url: axiom.ingest_base_url,
            query_base_url: axiom.query_base_url,
            dataset: String::new(),
            token: String::new(),
            timeout_secs: 15,
            max_attempts: 3,
            base_delay_ms: 1000,
            supplementary_query: String::new(),
        }
    }
}

impl AxiomSection {
    /// API token with environment variable override.
    pub fn get_token(&self) -> String {
        std::env::var("AXIOM_TOKEN").unwrap_or_else(|_| self.token.clone())
    }

    /// Dataset with environment variable override.
    pub fn get_dataset(&self) -> String {
        std::env::var("AXIOM_DATASET").unwrap_or_else(|_| self.dataset.clone())
    }
}

/// Logging section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan.interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "interval_secs must be > 0".to_string(),
            ));
        }
        if self.scan.max_pairs_per_cycle == 0 {
            return Err(ConfigError::ValidationError(
                "max_pairs_per_cycle must be > 0".to_string(),
            ));
        }

        if self.filter.chain.is_empty() {
            return Err(ConfigError::ValidationError(
                "chain cannot be empty".to_string(),
            ));
        }
        if self.filter.min_market_cap < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "min_market_cap must be >= 0, got {}",
                self.filter.min_market_cap
            )));
        }
        if self.filter.max_market_cap < self.filter.min_market_cap {
            return Err(ConfigError::ValidationError(format!(
                "max_market_cap {} is below min_market_cap {}",
                self.filter.max_market_cap, self.filter.min_market_cap
            )));
        }
        if self.filter.max_age_minutes < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "max_age_minutes must be >= 0, got {}",
                self.filter.max_age_minutes
            )));
        }

        if self.dexscreener.base_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "base_url cannot be empty".to_string(),
            ));
        }
        if self.dexscreener.search_terms.is_empty() {
            return Err(ConfigError::ValidationError(
                "search_terms cannot be empty".to_string(),
            ));
        }
        for (name, limit) in [
            ("profiles_per_minute", self.dexscreener.profiles_per_minute),
            ("boosts_per_minute", self.dexscreener.boosts_per_minute),
            ("search_per_minute", self.dexscreener.search_per_minute),
            ("tokens_per_minute", self.dexscreener.tokens_per_minute),
        ] {
            if limit == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be > 0"
                )));
            }
        }

        if self.axiom.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "max_attempts must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn filter_params(&self) -> FilterParams {
        FilterParams {
            target_chain: self.filter.chain.clone(),
            min_market_cap: self.filter.min_market_cap,
            max_market_cap: self.filter.max_market_cap,
            max_age_minutes: self.filter.max_age_minutes,
        }
    }

    pub fn scan_settings(&self) -> ScanSettings {
        ScanSettings {
            interval: Duration::from_secs(self.scan.interval_secs),
            max_pairs_per_cycle: self.scan.max_pairs_per_cycle,
            notify_delay: Duration::from_secs(self.scan.notify_delay_secs),
        }
    }

    pub fn dexscreener_config(&self) -> DexScreenerConfig {
        DexScreenerConfig {
            base_url: self.dexscreener.base_url.clone(),
            profiles_path: self.dexscreener.profiles_path.clone(),
            boosts_latest_path: self.dexscreener.boosts_latest_path.clone(),
            boosts_top_path: self.dexscreener.boosts_top_path.clone(),
            search_path: self.dexscreener.search_path.clone(),
            tokens_path: self.dexscreener.tokens_path.clone(),
            target_chain: self.filter.chain.clone(),
            timeout: Duration::from_secs(self.dexscreener.timeout_secs),
            source_delay: Duration::from_millis(self.dexscreener.source_delay_ms),
            rate_limit_cooldown: Duration::from_secs(self.dexscreener.cooldown_secs),
            rate_limits: RateLimits {
                token_profiles: self.dexscreener.profiles_per_minute,
                token_boosts: self.dexscreener.boosts_per_minute,
                search: self.dexscreener.search_per_minute,
                tokens: self.dexscreener.tokens_per_minute,
            },
        }
    }

    pub fn fetcher_config(&self) -> FetcherConfig {
        let query = self.axiom.supplementary_query.trim();
        FetcherConfig {
            search_terms: self.dexscreener.search_terms.clone(),
            supplementary_query: if query.is_empty() {
                None
            } else {
                Some(query.to_string())
            },
            source_delay: Duration::from_millis(self.dexscreener.source_delay_ms),
        }
    }

    pub fn telegram_config(&self) -> TelegramConfig {
        TelegramConfig {
            api_base_url: self.telegram.api_base_url.clone(),
            bot_token: self.telegram.get_bot_token(),
            chat_id: self.telegram.get_chat_id(),
            timeout: Duration::from_secs(10),
            chunk_delay: Duration::from_secs(self.telegram.chunk_delay_secs),
        }
    }

    pub fn axiom_config(&self) -> AxiomConfig {
        AxiomConfig {
            ingest_base_url: self.axiom.ingest_base_url.clone(),
            query_base_url: self.axiom.query_base_url.clone(),
            dataset: self.axiom.get_dataset(),
            token: self.axiom.get_token(),
            timeout: Duration::from_secs(self.axiom.timeout_secs),
            max_attempts: self.axiom.max_attempts,
            base_delay: Duration::from_millis(self.axiom.base_delay_ms),
        }
    }

    /// Settings block shown by /start and /health.
    pub fn settings_summary(&self) -> String {
        format!(
            "\u{2022} Min Market Cap: ${:.0}\n\
             \u{2022} Max Market Cap: ${:.0}\n\
             \u{2022} Max Pair Age: {:.0} minutes\n\
             \u{2022} Check Interval: {} seconds\n\
             \u{2022} Query Limit: {} pairs per scan",
            self.filter.min_market_cap,
            self.filter.max_market_cap,
            self.filter.max_age_minutes,
            self.scan.interval_secs,
            self.scan.max_pairs_per_cycle,
        )
    }
}
