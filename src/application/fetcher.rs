//! Multi-source pair aggregation.
//!
//! One fetch pass walks four sources in a fixed order: free-text DEX
//! search, the supplementary analytics query, latest token profiles, and
//! boosted tokens (the last two resolved to pairs through the bulk token
//! endpoint). Each source is wrapped individually so one failure cannot
//! abort the others; partial results accumulate.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use crate::adapters::dexscreener::{DexScreenerClient, TokenListing};
use crate::domain::pair::{Pair, TokenRef};
use crate::ports::analytics::AnalyticsSink;

/// Fetch-stage tuning.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// DEX names fed to the search endpoint.
    pub search_terms: Vec<String>,
    /// Optional APL query pulled from the analytics backend.
    pub supplementary_query: Option<String>,
    /// Delay between the top-level sources.
    pub source_delay: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            search_terms: ["raydium", "orca", "jupiter", "pumpfun", "moonshot"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            supplementary_query: None,
            source_delay: Duration::from_secs(1),
        }
    }
}

/// Aggregates raw pairs across sources.
pub struct PairFetcher<A: AnalyticsSink> {
    dex: DexScreenerClient,
    analytics: Arc<A>,
    config: FetcherConfig,
}

impl<A: AnalyticsSink> PairFetcher<A> {
    pub fn new(dex: DexScreenerClient, analytics: Arc<A>, config: FetcherConfig) -> Self {
        Self {
            dex,
            analytics,
            config,
        }
    }

    /// Total API calls issued by the underlying market-data client.
    pub fn api_calls(&self) -> u64 {
        self.dex.api_calls()
    }

    /// Run all sources and return the combined raw (undeduplicated) haul.
    pub async fn fetch_all(&self) -> Vec<Pair> {
        let mut all = Vec::new();

        info!("fetching pairs from all sources");

        // 1. free-text search per DEX term
        let mut search_count = 0;
        for (i, term) in self.config.search_terms.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.source_delay).await;
            }
            let pairs = self.dex.search_pairs(term).await;
            search_count += pairs.len();
            all.extend(pairs);
        }
        info!(count = search_count, "search sources done");

        // 2. supplementary analytics query
        if let Some(apl) = &self.config.supplementary_query {
            match self.analytics.query(apl).await {
                Ok(tables) => {
                    let pairs = pairs_from_tables(&tables);
                    info!(count = pairs.len(), "supplementary analytics source done");
                    all.extend(pairs);
                }
                Err(e) => warn!(error = %e, "supplementary analytics query failed"),
            }
        }

        // 3. latest token profiles, resolved to pairs in bulk
        tokio::time::sleep(self.config.source_delay).await;
        let profiles = self.dex.latest_token_profiles().await;
        let addresses = listing_addresses(&profiles);
        if !addresses.is_empty() {
            let pairs = self.dex.pairs_for_tokens(&addresses).await;
            info!(count = pairs.len(), "token-profile source done");
            all.extend(pairs);
        }

        // 4. boosted tokens, same resolution
        tokio::time::sleep(self.config.source_delay).await;
        let boosted = self.dex.boosted_tokens().await;
        let addresses = listing_addresses(&boosted);
        if !addresses.is_empty() {
            let pairs = self.dex.pairs_for_tokens(&addresses).await;
            info!(count = pairs.len(), "boosted-token source done");
            all.extend(pairs);
        }

        if all.is_empty() {
            warn!("no pairs received from any source");
        }
        all
    }
}

/// Non-empty token addresses from a listing batch.
fn listing_addresses(listings: &[TokenListing]) -> Vec<String> {
    listings
        .iter()
        .filter(|listing| !listing.token_address.is_empty())
        .map(|listing| listing.token_address.clone())
        .collect()
}

/// Map tabular analytics rows into minimal pair records. Only the first
/// two columns (base and quote address) are meaningful; everything else
/// stays default and is filled in by later enrichment or filtered out.
fn pairs_from_tables(tables: &[Value]) -> Vec<Pair> {
    let mut pairs = Vec::new();
    for table in tables {
        let Some(rows) = table.get("columns").and_then(Value::as_array) else {
            continue;
        };
        for row in rows {
            let Some(cells) = row.as_array() else { continue };
            let base = cells.first().and_then(Value::as_str).unwrap_or_default();
            let quote = cells.get(1).and_then(Value::as_str).unwrap_or_default();
            if base.is_empty() {
                continue;
            }
            pairs.push(Pair {
                base_token: TokenRef {
                    address: base.to_string(),
                    ..Default::default()
                },
                quote_token: TokenRef {
                    address: quote.to_string(),
                    ..Default::default()
                },
                ..Default::default()
            });
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_search_terms() {
        let config = FetcherConfig::default();
        assert_eq!(config.search_terms.len(), 5);
        assert!(config.search_terms.contains(&"raydium".to_string()));
        assert!(config.supplementary_query.is_none());
    }

    #[test]
    fn test_listing_addresses_skips_empty() {
        let listings = vec![
            TokenListing {
                token_address: "addr1".to_string(),
                ..Default::default()
            },
            TokenListing::default(),
            TokenListing {
                token_address: "addr2".to_string(),
                ..Default::default()
            },
        ];
        assert_eq!(listing_addresses(&listings), vec!["addr1", "addr2"]);
    }

    #[test]
    fn test_pairs_from_tables() {
        let tables = vec![json!({
            "columns": [
                ["base1", "quote1"],
                ["base2"],
                ["", "quoteX"],
                "not a row"
            ]
        })];
        let pairs = pairs_from_tables(&tables);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].base_token.address, "base1");
        assert_eq!(pairs[0].quote_token.address, "quote1");
        assert_eq!(pairs[1].base_token.address, "base2");
        assert_eq!(pairs[1].quote_token.address, "");
    }

    #[test]
    fn test_pairs_from_malformed_tables() {
        let tables = vec![json!({"no_columns": true}), json!(42)];
        assert!(pairs_from_tables(&tables).is_empty());
    }
}
