//! Cross-cycle scan counters.
//!
//! Written only by the cycle worker; the status surface reads snapshots
//! through a shared handle. Counters accumulate for the process lifetime
//! and reset only on restart.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ScanStats {
    /// Unique pairs that went through filtering.
    pub pairs_processed: u64,
    /// Pairs that passed every filter and the dedup ledger.
    pub pairs_found: u64,
    pub notifications_sent: u64,
    pub errors: u64,
    pub api_calls_made: u64,
    /// Current dedup ledger size.
    pub ledger_size: u64,
    pub last_scan: Option<DateTime<Utc>>,
    pub started_at: DateTime<Utc>,
}

impl ScanStats {
    pub fn new() -> Self {
        Self {
            pairs_processed: 0,
            pairs_found: 0,
            notifications_sent: 0,
            errors: 0,
            api_calls_made: 0,
            ledger_size: 0,
            last_scan: None,
            started_at: Utc::now(),
        }
    }

    pub fn uptime(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.started_at
    }

    /// Notifications sent per pair found, as a percentage.
    pub fn success_rate(&self) -> f64 {
        self.notifications_sent as f64 / self.pairs_found.max(1) as f64 * 100.0
    }
}

impl Default for ScanStats {
    fn default() -> Self {
        Self::new()
    }
}
