//! DexScreener API Client
//!
//! HTTP client for the public DexScreener listing, search, and bulk token
//! endpoints. Every call goes through the per-class rate limiter first and
//! degrades to "no data" on any transport or decode problem; a 429 from
//! the server additionally triggers a fixed cooldown sleep.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::rate_limit::{EndpointClass, RateLimiter, RateLimits};
use super::types::{ListingResponse, TokenListing};
use crate::domain::chain;
use crate::domain::pair::Pair;

/// Bulk token endpoint accepts at most this many addresses per call.
pub const MAX_ADDRESSES_PER_CALL: usize = 30;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/91.0.4472.124 Safari/537.36";

/// DexScreener client configuration
#[derive(Debug, Clone)]
pub struct DexScreenerConfig {
    pub base_url: String,
    pub profiles_path: String,
    pub boosts_latest_path: String,
    pub boosts_top_path: String,
    pub search_path: String,
    pub tokens_path: String,
    /// Chain used for the bulk token endpoint and listing filters.
    pub target_chain: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Fixed delay between calls inside one multi-call fetch.
    pub source_delay: Duration,
    /// Sleep after the server answers 429.
    pub rate_limit_cooldown: Duration,
    pub rate_limits: RateLimits,
}

impl Default for DexScreenerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.dexscreener.com".to_string(),
            profiles_path: "/token-profiles/latest/v1".to_string(),
            boosts_latest_path: "/token-boosts/latest/v1".to_string(),
            boosts_top_path: "/token-boosts/top/v1".to_string(),
            search_path: "/latest/dex/search".to_string(),
            tokens_path: "/tokens/v1".to_string(),
            target_chain: "solana".to_string(),
            timeout: Duration::from_secs(15),
            source_delay: Duration::from_secs(1),
            rate_limit_cooldown: Duration::from_secs(5),
            rate_limits: RateLimits::default(),
        }
    }
}

/// DexScreener client errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Http(String),
}

/// Rate-limited DexScreener HTTP client.
#[derive(Debug)]
pub struct DexScreenerClient {
    config: DexScreenerConfig,
    http: Client,
    limiter: Mutex<RateLimiter>,
    api_calls: AtomicU64,
}

impl DexScreenerClient {
    pub fn new(config: DexScreenerConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Http(e.to_string()))?;
        let limiter = Mutex::new(RateLimiter::new(config.rate_limits.clone()));

        Ok(Self {
            config,
            http,
            limiter,
            api_calls: AtomicU64::new(0),
        })
    }

    /// Total requests actually issued by this client.
    pub fn api_calls(&self) -> u64 {
        self.api_calls.load(Ordering::Relaxed)
    }

    pub fn target_chain(&self) -> &str {
        &self.config.target_chain
    }

    /// Latest token profiles on the target chain.
    pub async fn latest_token_profiles(&self) -> Vec<TokenListing> {
        let url = format!("{}{}", self.config.base_url, self.config.profiles_path);
        let Some(value) = self.get_json(&url, EndpointClass::TokenProfiles).await else {
            return Vec::new();
        };
        self.parse_listings(value)
    }

    /// Boosted tokens from both the "latest" and "top" listings.
    pub async fn boosted_tokens(&self) -> Vec<TokenListing> {
        let urls = [
            format!("{}{}", self.config.base_url, self.config.boosts_latest_path),
            format!("{}{}", self.config.base_url, self.config.boosts_top_path),
        ];

        let mut all = Vec::new();
        for (i, url) in urls.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.source_delay).await;
            }
            if let Some(value) = self.get_json(url, EndpointClass::TokenBoosts).await {
                all.extend(self.parse_listings(value));
            }
        }
        all
    }

    /// Free-text pair search, filtered to the target chain.
    pub async fn search_pairs(&self, term: &str) -> Vec<Pair> {
        let url = format!(
            "{}{}?q={}",
            self.config.base_url, self.config.search_path, term
        );
        let Some(value) = self.get_json(&url, EndpointClass::Search).await else {
            return Vec::new();
        };

        let pairs = value
            .get("pairs")
            .and_then(Value::as_array)
            .map(|items| parse_pairs(items))
            .unwrap_or_default();
        let on_chain: Vec<Pair> = pairs
            .into_iter()
            .filter(|pair| chain::is_target_pair(pair, &self.config.target_chain))
            .collect();

        info!(term, count = on_chain.len(), "search returned pairs");
        on_chain
    }

    /// Pairs for specific token addresses, batched per the API limit.
    pub async fn pairs_for_tokens(&self, addresses: &[String]) -> Vec<Pair> {
        let mut all = Vec::new();
        for (i, batch) in addresses.chunks(MAX_ADDRESSES_PER_CALL).enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.source_delay).await;
            }
            let url = format!(
                "{}{}/{}/{}",
                self.config.base_url,
                self.config.tokens_path,
                self.config.target_chain,
                batch.join(",")
            );
            if let Some(value) = self.get_json(&url, EndpointClass::Tokens).await {
                if let Some(items) = value.as_array() {
                    all.extend(parse_pairs(items));
                }
            }
        }
        all
    }

    fn parse_listings(&self, value: Value) -> Vec<TokenListing> {
        match serde_json::from_value::<ListingResponse>(value) {
            Ok(response) => response
                .into_vec()
                .into_iter()
                .filter(|listing| listing.is_on_chain(&self.config.target_chain))
                .collect(),
            Err(e) => {
                warn!(error = %e, "unexpected listing response shape");
                Vec::new()
            }
        }
    }

    /// One rate-limited GET. Any failure degrades to `None`.
    async fn get_json(&self, url: &str, class: EndpointClass) -> Option<Value> {
        if !self.limiter.lock().await.try_acquire(class) {
            warn!(%class, "rate limit reached, skipping request");
            return None;
        }

        let response = match self.http.get(url).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                warn!(url, "request timed out");
                return None;
            }
            Err(e) => {
                warn!(url, error = %e, "request failed");
                return None;
            }
        };
        self.api_calls.fetch_add(1, Ordering::Relaxed);

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(url, "rate limited by server, cooling down");
            tokio::time::sleep(self.config.rate_limit_cooldown).await;
            return None;
        }
        if status == StatusCode::NOT_FOUND {
            warn!(url, "endpoint not found");
            return None;
        }
        if !status.is_success() {
            warn!(url, %status, "unexpected status");
            return None;
        }

        match response.json::<Value>().await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(url, error = %e, "failed to decode response body");
                None
            }
        }
    }
}

/// Parse pair records one by one so a single malformed entry cannot drop
/// the whole batch.
fn parse_pairs(items: &[Value]) -> Vec<Pair> {
    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<Pair>(item.clone()) {
            Ok(pair) => Some(pair),
            Err(e) => {
                debug!(error = %e, "skipping unparseable pair record");
                None
            }
        })
        .collect()
}
