//! Analytics backend port.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Analytics error type
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Failed to build analytics client: {0}")]
    Client(String),

    #[error("Ingest failed after {attempts} attempts")]
    IngestFailed { attempts: u32 },
}

/// Structured-record mirror and supplementary query source.
///
/// `ingest` is best-effort from the caller's perspective: a returned error
/// is logged, never fatal to a cycle. `query` degrades to an empty result
/// set on any failure, so it only errors on local misuse.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    /// Push a batch of structured records.
    async fn ingest(&self, events: Vec<Value>) -> Result<(), AnalyticsError>;

    /// Run a query-language request and return its result tables.
    async fn query(&self, apl: &str) -> Result<Vec<Value>, AnalyticsError>;
}
