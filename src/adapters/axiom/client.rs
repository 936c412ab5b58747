//! Axiom analytics client.
//!
//! Bearer-authenticated ingest with bounded exponential-backoff retries,
//! and an APL query endpoint used only as a supplementary data source.
//! With no token or dataset configured the client degrades to a no-op so
//! the rest of the pipeline is unaffected.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::ports::analytics::{AnalyticsError, AnalyticsSink};

/// Axiom client configuration
#[derive(Debug, Clone)]
pub struct AxiomConfig {
    /// Base URL for the ingest API.
    pub ingest_base_url: String,
    /// Base URL for the APL query API.
    pub query_base_url: String,
    pub dataset: String,
    pub token: String,
    pub timeout: Duration,
    /// Total delivery attempts per ingest batch.
    pub max_attempts: u32,
    /// First retry delay; doubles per attempt.
    pub base_delay: Duration,
}

impl Default for AxiomConfig {
    fn default() -> Self {
        Self {
            ingest_base_url: "https://api.axiom.co/v1".to_string(),
            query_base_url: "https://lar.axiom.ai/api/v3".to_string(),
            dataset: String::new(),
            token: String::new(),
            timeout: Duration::from_secs(15),
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// Axiom-backed analytics sink.
#[derive(Debug, Clone)]
pub struct AxiomClient {
    config: AxiomConfig,
    http: Client,
}

impl AxiomClient {
    pub fn new(config: AxiomConfig) -> Result<Self, AnalyticsError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AnalyticsError::Client(e.to_string()))?;
        Ok(Self { config, http })
    }

    /// Without credentials the client silently drops everything.
    pub fn is_enabled(&self) -> bool {
        !self.config.token.is_empty() && !self.config.dataset.is_empty()
    }
}

#[async_trait]
impl AnalyticsSink for AxiomClient {
    async fn ingest(&self, events: Vec<Value>) -> Result<(), AnalyticsError> {
        if !self.is_enabled() {
            debug!("analytics disabled, dropping {} event(s)", events.len());
            return Ok(());
        }

        let url = format!(
            "{}/datasets/{}/ingest",
            self.config.ingest_base_url, self.config.dataset
        );

        let mut delay = self.config.base_delay;
        for attempt in 1..=self.config.max_attempts {
            // stamp the delivery attempt into each record
            let payload: Vec<Value> = events
                .iter()
                .cloned()
                .map(|mut event| {
                    if let Some(obj) = event.as_object_mut() {
                        obj.insert("attempt".to_string(), json!(attempt));
                    }
                    event
                })
                .collect();

            match self
                .http
                .post(&url)
                .bearer_auth(&self.config.token)
                .json(&payload)
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => {
                    info!(count = payload.len(), "events ingested");
                    return Ok(());
                }
                Ok(response) => {
                    warn!(
                        attempt,
                        status = %response.status(),
                        "ingest attempt rejected"
                    );
                }
                Err(e) => {
                    warn!(attempt, error = %e, "ingest attempt failed");
                }
            }

            if attempt < self.config.max_attempts {
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
        }

        Err(AnalyticsError::IngestFailed {
            attempts: self.config.max_attempts,
        })
    }

    async fn query(&self, apl: &str) -> Result<Vec<Value>, AnalyticsError> {
        if !self.is_enabled() {
            return Ok(Vec::new());
        }

        let url = format!("{}/datasets/_apl?format=tabular", self.config.query_base_url);
        let body = json!({ "apl": apl });

        let response = match self
            .http
            .post(&url)
            .bearer_auth(&self.config.token)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "analytics query failed");
                return Ok(Vec::new());
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), apl, "analytics query rejected");
            return Ok(Vec::new());
        }

        let value: Value = match response.json().await {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "failed to decode query response");
                return Ok(Vec::new());
            }
        };

        let tables = value
            .get("tables")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AxiomConfig::default();
        assert_eq!(config.ingest_base_url, "https://api.axiom.co/v1");
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.base_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_enabled_requires_token_and_dataset() {
        let disabled = AxiomClient::new(AxiomConfig::default()).unwrap();
        assert!(!disabled.is_enabled());

        let enabled = AxiomClient::new(AxiomConfig {
            token: "secret".to_string(),
            dataset: "crypto-logs".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert!(enabled.is_enabled());
    }

    #[tokio::test]
    async fn test_disabled_client_is_noop() {
        let client = AxiomClient::new(AxiomConfig::default()).unwrap();
        // no network access happens; both calls short-circuit
        assert!(client.ingest(vec![json!({"a": 1})]).await.is_ok());
        assert_eq!(client.query("['x'] | count").await.unwrap(), Vec::<Value>::new());
    }
}
