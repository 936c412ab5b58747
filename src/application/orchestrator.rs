//! Scan Orchestrator
//!
//! Drives the polling cycle end to end: fetch -> dedup -> filter -> score
//! -> format -> deliver, then sleep. One cycle runs to completion before
//! the next begins; any cycle error is absorbed at this boundary (error
//! counter plus best-effort notification) so the loop never dies.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::fetcher::PairFetcher;
use super::formatter::{format_alert, AlertRecord};
use crate::domain::dedup::{merge_unique, PairLedger};
use crate::domain::filter::FilterEngine;
use crate::domain::pair::Pair;
use crate::domain::risk;
use crate::domain::stats::ScanStats;
use crate::ports::analytics::AnalyticsSink;
use crate::ports::notifier::Notifier;

/// Simplified message sent when the full alert fails to deliver.
const FALLBACK_MESSAGE: &str =
    "\u{26A0} Error sending full message. Check logs for details.";

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Cycle pacing and caps.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Sleep between cycles.
    pub interval: Duration,
    /// Accepted pairs processed per cycle, at most.
    pub max_pairs_per_cycle: usize,
    /// Delay between consecutive notification sends.
    pub notify_delay: Duration,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(7),
            max_pairs_per_cycle: 7,
            notify_delay: Duration::from_secs(5),
        }
    }
}

/// What one cycle did, for logs and tests.
#[derive(Debug, Default, Clone)]
pub struct CycleReport {
    /// Unique candidates after the merge dedup.
    pub processed: usize,
    /// Pairs that passed filters and the notified ledger.
    pub accepted: usize,
    /// Alerts actually delivered.
    pub notified: usize,
    /// Rejection-reason histogram.
    pub rejections: BTreeMap<&'static str, u64>,
}

/// Owns all mutable scan state; no globals anywhere.
pub struct ScanOrchestrator<N: Notifier, A: AnalyticsSink> {
    fetcher: PairFetcher<A>,
    filter: FilterEngine,
    ledger: PairLedger,
    notifier: N,
    analytics: Arc<A>,
    settings: ScanSettings,
    /// Active-settings block attached to every analytics record.
    settings_record: Value,
    stats: Arc<RwLock<ScanStats>>,
    is_running: Arc<RwLock<bool>>,
}

impl<N: Notifier, A: AnalyticsSink> ScanOrchestrator<N, A> {
    pub fn new(
        fetcher: PairFetcher<A>,
        filter: FilterEngine,
        notifier: N,
        analytics: Arc<A>,
        settings: ScanSettings,
    ) -> Result<Self, OrchestratorError> {
        if settings.max_pairs_per_cycle == 0 {
            return Err(OrchestratorError::Config(
                "max_pairs_per_cycle must be > 0".to_string(),
            ));
        }

        let params = filter.params();
        let settings_record = json!({
            "min_market_cap": params.min_market_cap,
            "max_market_cap": params.max_market_cap,
            "max_age_minutes": params.max_age_minutes,
            "chain": params.target_chain,
            "check_interval_secs": settings.interval.as_secs(),
            "query_limit": settings.max_pairs_per_cycle,
        });

        Ok(Self {
            fetcher,
            filter,
            ledger: PairLedger::new(),
            notifier,
            analytics,
            settings,
            settings_record,
            stats: Arc::new(RwLock::new(ScanStats::new())),
            is_running: Arc::new(RwLock::new(false)),
        })
    }

    /// Shared stats handle for the read-only status surface.
    pub fn stats_handle(&self) -> Arc<RwLock<ScanStats>> {
        Arc::clone(&self.stats)
    }

    /// Shared running flag; flipping it to false stops the loop at the
    /// next checkpoint.
    pub fn running_handle(&self) -> Arc<RwLock<bool>> {
        Arc::clone(&self.is_running)
    }

    /// Run the polling loop until the running flag is cleared.
    ///
    /// Each cycle runs behind an unwind boundary: a panic anywhere in
    /// cycle logic is converted into an error-counter increment and a
    /// best-effort error notification, then the loop proceeds to sleep.
    pub async fn run(&mut self) {
        *self.is_running.write().await = true;
        info!(
            interval = ?self.settings.interval,
            max_per_cycle = self.settings.max_pairs_per_cycle,
            "scan orchestrator started"
        );

        while *self.is_running.read().await {
            let cycle = std::panic::AssertUnwindSafe(self.run_cycle()).catch_unwind();
            if let Err(panic) = cycle.await {
                let detail = panic_message(&panic);
                error!(error = %detail, "scan cycle panicked");
                self.report_error(&detail).await;
            }
            debug!("sleeping for {:?}", self.settings.interval);
            tokio::time::sleep(self.settings.interval).await;
        }

        info!("scan orchestrator stopped");
    }

    /// Stop the loop at the next checkpoint.
    pub async fn stop(&self) {
        *self.is_running.write().await = false;
    }

    /// One full cycle. Never propagates an error; anything unexpected is
    /// counted and reported best-effort.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let started = Instant::now();
        let now = Utc::now();
        {
            let mut stats = self.stats.write().await;
            stats.last_scan = Some(now);
        }

        info!("starting pair scan");

        // Fetching: per-source failures already degrade to empty inside
        let raw = self.fetcher.fetch_all().await;
        self.sync_api_calls().await;
        if raw.is_empty() {
            warn!("no pairs received from any source");
            return CycleReport::default();
        }

        // Deduplicating: collapse the multi-source haul by fingerprint
        let candidates = merge_unique(raw);
        info!(count = candidates.len(), "unique candidate pairs");

        // Filtering + Scoring&Notifying
        let report = self.process_candidates(candidates, now).await;

        let elapsed = started.elapsed();
        let stats = self.stats.read().await.clone();
        info!(
            duration_secs = elapsed.as_secs_f64(),
            processed = report.processed,
            accepted = report.accepted,
            notified = report.notified,
            api_calls = stats.api_calls_made,
            total_notifications = stats.notifications_sent,
            errors = stats.errors,
            ledger_size = stats.ledger_size,
            "scan summary"
        );
        report
    }

    /// Filter, score, format, and deliver a batch of candidates. Public
    /// so tests can drive the pipeline without network fetches.
    pub async fn process_candidates(
        &mut self,
        candidates: Vec<Pair>,
        now: DateTime<Utc>,
    ) -> CycleReport {
        let now_ms = now.timestamp_millis();
        let mut report = CycleReport {
            processed: candidates.len(),
            ..Default::default()
        };

        let mut accepted = Vec::new();
        for pair in candidates {
            match self.filter.evaluate(&pair, now_ms) {
                Err(rejection) => {
                    *report.rejections.entry(rejection.category()).or_default() += 1;
                    debug!("pair rejected: {rejection}");
                }
                Ok(()) => {
                    if self.ledger.is_new(&pair) {
                        accepted.push(pair);
                    }
                }
            }
        }

        if !report.rejections.is_empty() {
            let mut sorted: Vec<_> = report.rejections.iter().collect();
            sorted.sort_by(|a, b| b.1.cmp(a.1));
            for (reason, count) in sorted {
                info!(reason, count, "rejections");
            }
        }

        report.accepted = accepted.len();
        {
            let mut stats = self.stats.write().await;
            stats.pairs_processed += report.processed as u64;
            stats.pairs_found += accepted.len() as u64;
            stats.ledger_size = self.ledger.len() as u64;
        }

        if accepted.is_empty() {
            info!("no pairs met the filtering criteria this cycle");
            return report;
        }

        if accepted.len() > self.settings.max_pairs_per_cycle {
            info!(
                found = accepted.len(),
                limit = self.settings.max_pairs_per_cycle,
                "truncating accepted set"
            );
            accepted.truncate(self.settings.max_pairs_per_cycle);
        }

        let total = accepted.len();
        for (i, pair) in accepted.iter().enumerate() {
            info!(n = i + 1, total, symbol = pair.display_symbol(), "processing alert");

            let assessment = risk::assess(pair, now_ms);
            let (text, record) = format_alert(pair, &assessment, now);

            match self.notifier.send(&text).await {
                Ok(()) => {
                    report.notified += 1;
                    {
                        let mut stats = self.stats.write().await;
                        stats.notifications_sent += 1;
                    }
                    // analytics mirror is best-effort
                    let event = self.enrich_record(record).await;
                    if let Err(e) = self.analytics.ingest(vec![event]).await {
                        warn!(error = %e, "failed to mirror record to analytics");
                    }
                }
                Err(e) => {
                    error!(error = %e, "failed to deliver alert");
                    {
                        let mut stats = self.stats.write().await;
                        stats.errors += 1;
                    }
                    // one simplified fallback, then abandon this pair
                    if let Err(e) = self.notifier.send(FALLBACK_MESSAGE).await {
                        warn!(error = %e, "fallback notification failed too");
                    }
                }
            }

            if i + 1 < total {
                tokio::time::sleep(self.settings.notify_delay).await;
            }
        }

        report
    }

    /// Wrap an alert record with a stats snapshot and the active settings.
    async fn enrich_record(&self, record: AlertRecord) -> Value {
        let stats = self.stats.read().await.clone();
        let mut event = serde_json::to_value(&record).unwrap_or_else(|_| json!({}));
        if let Some(obj) = event.as_object_mut() {
            obj.insert(
                "bot_stats".to_string(),
                serde_json::to_value(&stats).unwrap_or(Value::Null),
            );
            obj.insert("settings".to_string(), self.settings_record.clone());
        }
        event
    }

    async fn sync_api_calls(&self) {
        let mut stats = self.stats.write().await;
        stats.api_calls_made = self.fetcher.api_calls();
    }

    /// Best-effort error report to the notification channel.
    pub async fn report_error(&self, context: &str) {
        {
            let mut stats = self.stats.write().await;
            stats.errors += 1;
        }
        let text = format!(
            "\u{1F6A8} *BOT ERROR* \u{1F6A8}\n\nTime: {}\nError: {context}",
            Utc::now().format("%Y-%m-%d %H:%M:%S")
        );
        if let Err(e) = self.notifier.send(&text).await {
            error!(error = %e, "failed to send error notification");
        }
    }
}

/// Human-readable text out of a panic payload.
fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::dexscreener::{DexScreenerClient, DexScreenerConfig};
    use crate::application::fetcher::FetcherConfig;
    use crate::domain::filter::FilterParams;
    use crate::domain::pair::{Liquidity, TokenRef, TxnWindow};
    use crate::ports::analytics::MockAnalyticsSink;
    use crate::ports::mocks::CollectingNotifier;

    fn test_pair(pair_addr: &str) -> Pair {
        let now_ms = Utc::now().timestamp_millis();
        let mut pair = Pair {
            chain_id: "solana".to_string(),
            dex_id: "raydium".to_string(),
            pair_address: pair_addr.to_string(),
            base_token: TokenRef {
                address: "BASEaddr11111111111111111111111111111111".to_string(),
                name: "Moon Cat".to_string(),
                symbol: "MCAT".to_string(),
            },
            quote_token: TokenRef {
                address: "So11111111111111111111111111111111111111112".to_string(),
                ..Default::default()
            },
            price_usd: Some(0.001),
            fdv: Some(20_000.0),
            pair_created_at: Some(now_ms - 10 * 60_000),
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

    fn orchestrator_with(
        notifier: CollectingNotifier,
        analytics: MockAnalyticsSink,
    ) -> ScanOrchestrator<CollectingNotifier, MockAnalyticsSink> {
        let analytics = Arc::new(analytics);
        let dex = DexScreenerClient::new(DexScreenerConfig::default()).unwrap();
        let fetcher = PairFetcher::new(dex, Arc::clone(&analytics), FetcherConfig::default());
        let settings = ScanSettings {
            notify_delay: Duration::ZERO,
            ..Default::default()
        };
        ScanOrchestrator::new(
            fetcher,
            FilterEngine::new(FilterParams::default()),
            notifier,
            analytics,
            settings,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_accepted_pair_is_notified_and_mirrored() {
        let mut analytics = MockAnalyticsSink::new();
        analytics
            .expect_ingest()
            .times(1)
            .withf(|events| {
                events.len() == 1
                    && events[0]["contract_address"] == "BASEaddr11111111111111111111111111111111"
                    && events[0].get("bot_stats").is_some()
                    && events[0].get("settings").is_some()
            })
            .returning(|_| Ok(()));

        let mut orch = orchestrator_with(CollectingNotifier::new(), analytics);
        let report = orch
            .process_candidates(vec![test_pair("p1")], Utc::now())
            .await;

        assert_eq!(report.processed, 1);
        assert_eq!(report.accepted, 1);
        assert_eq!(report.notified, 1);

        let stats = orch.stats_handle();
        let stats = stats.read().await;
        assert_eq!(stats.notifications_sent, 1);
        assert_eq!(stats.pairs_found, 1);
    }

    #[tokio::test]
    async fn test_cross_cycle_dedup() {
        let mut analytics = MockAnalyticsSink::new();
        analytics.expect_ingest().times(1).returning(|_| Ok(()));

        let mut orch = orchestrator_with(CollectingNotifier::new(), analytics);
        let first = orch
            .process_candidates(vec![test_pair("p1")], Utc::now())
            .await;
        assert_eq!(first.notified, 1);

        // same identity next cycle: suppressed by the ledger
        let second = orch
            .process_candidates(vec![test_pair("p1")], Utc::now())
            .await;
        assert_eq!(second.accepted, 0);
        assert_eq!(second.notified, 0);
    }

    #[tokio::test]
    async fn test_rejection_histogram() {
        let analytics = MockAnalyticsSink::new();
        let mut orch = orchestrator_with(CollectingNotifier::new(), analytics);

        let mut stale = test_pair("p2");
        stale.pair_created_at = Some(Utc::now().timestamp_millis() - 45 * 60_000);
        let mut no_base = test_pair("p3");
        no_base.base_token.address.clear();

        let report = orch
            .process_candidates(vec![stale, no_base], Utc::now())
            .await;
        assert_eq!(report.accepted, 0);
        assert_eq!(report.rejections.get("too old"), Some(&1));
        assert_eq!(report.rejections.get("missing base token"), Some(&1));
    }

    #[tokio::test]
    async fn test_per_cycle_cap() {
        let mut analytics = MockAnalyticsSink::new();
        analytics.expect_ingest().returning(|_| Ok(()));

        let mut orch = orchestrator_with(CollectingNotifier::new(), analytics);
        let candidates: Vec<Pair> = (0..10).map(|i| test_pair(&format!("p{i}"))).collect();
        let report = orch.process_candidates(candidates, Utc::now()).await;

        assert_eq!(report.accepted, 10);
        assert_eq!(report.notified, ScanSettings::default().max_pairs_per_cycle);
    }

    #[tokio::test]
    async fn test_delivery_failure_sends_fallback() {
        let analytics = MockAnalyticsSink::new();
        let notifier = CollectingNotifier::new().with_failures(1);
        let mut orch = orchestrator_with(notifier, analytics);

        let report = orch
            .process_candidates(vec![test_pair("p1")], Utc::now())
            .await;
        assert_eq!(report.notified, 0);

        // the full alert failed; the simplified fallback got through
        let messages = orch.notifier.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("Error sending full message"));

        let stats = orch.stats_handle();
        let stats = stats.read().await;
        assert_eq!(stats.notifications_sent, 0);
        assert_eq!(stats.errors, 1);
    }

    #[tokio::test]
    async fn test_analytics_failure_is_not_fatal() {
        let mut analytics = MockAnalyticsSink::new();
        analytics
            .expect_ingest()
            .returning(|_| Err(crate::ports::analytics::AnalyticsError::IngestFailed { attempts: 3 }));

        let mut orch = orchestrator_with(CollectingNotifier::new(), analytics);
        let report = orch
            .process_candidates(vec![test_pair("p1")], Utc::now())
            .await;
        // delivery still counts even though the mirror failed
        assert_eq!(report.notified, 1);
    }

    #[tokio::test]
    async fn test_zero_cap_is_a_config_error() {
        let analytics = Arc::new(MockAnalyticsSink::new());
        let dex = DexScreenerClient::new(DexScreenerConfig::default()).unwrap();
        let fetcher = PairFetcher::new(dex, Arc::clone(&analytics), FetcherConfig::default());
        let result = ScanOrchestrator::new(
            fetcher,
            FilterEngine::new(FilterParams::default()),
            CollectingNotifier::new(),
            analytics,
            ScanSettings {
                max_pairs_per_cycle: 0,
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(OrchestratorError::Config(_))));
    }

    #[tokio::test]
    async fn test_stop_clears_running_flag() {
        let analytics = MockAnalyticsSink::new();
        let orch = orchestrator_with(CollectingNotifier::new(), analytics);
        *orch.running_handle().write().await = true;
        orch.stop().await;
        assert!(!*orch.running_handle().read().await);
    }
}
