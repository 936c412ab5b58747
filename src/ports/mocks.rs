//! Recording test doubles for the ports.
//!
//! Used by unit and integration tests to drive the orchestrator without
//! network access. Kept out of `#[cfg(test)]` so the `tests/` suite can
//! reach them through the library crate.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use super::analytics::{AnalyticsError, AnalyticsSink};
use super::notifier::{Notifier, NotifyError};

/// Mock notifier that records every message and can fail on demand.
/// Clones share state, so a handle kept outside the orchestrator sees
/// everything the orchestrator sends.
#[derive(Debug, Clone, Default)]
pub struct CollectingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
    fail_next: Arc<Mutex<u32>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: make the next `n` sends fail.
    pub fn with_failures(self, n: u32) -> Self {
        *self.fail_next.lock().unwrap() = n;
        self
    }

    /// All successfully delivered messages, in order.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for CollectingNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let mut fail_next = self.fail_next.lock().unwrap();
        if *fail_next > 0 {
            *fail_next -= 1;
            return Err(NotifyError::Transport("simulated failure".to_string()));
        }
        self.messages.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Mock analytics sink that records ingested events and serves canned
/// query rows. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct RecordingAnalytics {
    events: Arc<Mutex<Vec<Value>>>,
    queries: Arc<Mutex<Vec<String>>>,
    query_rows: Arc<Mutex<Vec<Value>>>,
}

impl RecordingAnalytics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: rows returned by every `query` call.
    pub fn with_query_rows(self, rows: Vec<Value>) -> Self {
        *self.query_rows.lock().unwrap() = rows;
        self
    }

    pub fn events(&self) -> Vec<Value> {
        self.events.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalyticsSink for RecordingAnalytics {
    async fn ingest(&self, events: Vec<Value>) -> Result<(), AnalyticsError> {
        self.events.lock().unwrap().extend(events);
        Ok(())
    }

    async fn query(&self, apl: &str) -> Result<Vec<Value>, AnalyticsError> {
        self.queries.lock().unwrap().push(apl.to_string());
        Ok(self.query_rows.lock().unwrap().clone())
    }
}
