//! Scan Pipeline Integration Tests
//!
//! Drives the filter -> risk -> format -> deliver pipeline end to end
//! through the orchestrator, using recording test doubles in place of the
//! Telegram and Axiom adapters. All tests are deterministic; no network
//! calls are made.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use pairscout::adapters::dexscreener::{DexScreenerClient, DexScreenerConfig};
use pairscout::application::fetcher::{FetcherConfig, PairFetcher};
use pairscout::application::orchestrator::{ScanOrchestrator, ScanSettings};
use pairscout::domain::filter::{FilterEngine, FilterParams};
use pairscout::domain::pair::{Liquidity, Pair, TokenRef, TxnWindow};
use pairscout::domain::{dedup, risk};
use pairscout::ports::mocks::{CollectingNotifier, RecordingAnalytics};

// ============================================================================
// Test Fixtures
// ============================================================================

const BASE_ADDRESS: &str = "BASEaddr11111111111111111111111111111111";
const WSOL: &str = "So11111111111111111111111111111111111111112";

/// The end-to-end accept scenario: chain match, fdv 20k, price 0.001,
/// created 10 minutes ago, 24h volume 5000, liquidity 8000, active 5m
/// window, trusted DEX.
fn promising_pair(pair_address: &str) -> Pair {
    let now_ms = Utc::now().timestamp_millis();
    let mut pair = Pair {
        chain_id: "solana".to_string(),
        dex_id: "raydium".to_string(),
        url: format!("https://dexscreener.com/solana/{pair_address}"),
        pair_address: pair_address.to_string(),
        base_token: TokenRef {
            address: BASE_ADDRESS.to_string(),
            name: "Moon Cat".to_string(),
            symbol: "MCAT".to_string(),
        },
        quote_token: TokenRef {
            address: WSOL.to_string(),
            name: "Wrapped SOL".to_string(),
            symbol: "SOL".to_string(),
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

struct Harness {
    orchestrator: ScanOrchestrator<CollectingNotifier, RecordingAnalytics>,
    /// Shares state with the notifier the orchestrator owns.
    notifier: CollectingNotifier,
    analytics: Arc<RecordingAnalytics>,
}

impl Harness {
    fn messages(&self) -> Vec<String> {
        self.notifier.messages()
    }
}

fn harness(notifier: CollectingNotifier) -> Harness {
    let analytics = Arc::new(RecordingAnalytics::new());
    let dex = DexScreenerClient::new(DexScreenerConfig::default()).unwrap();
    let fetcher = PairFetcher::new(dex, Arc::clone(&analytics), FetcherConfig::default());
    let orchestrator = ScanOrchestrator::new(
        fetcher,
        FilterEngine::new(FilterParams::default()),
        notifier.clone(),
        Arc::clone(&analytics),
        ScanSettings {
            notify_delay: Duration::ZERO,
            ..Default::default()
        },
    )
    .unwrap();
    Harness {
        orchestrator,
        notifier,
        analytics,
    }
}

// ============================================================================
// End-to-end scenarios
// ============================================================================

#[tokio::test]
async fn test_promising_pair_flows_to_alert_and_analytics() {
    let notifier = CollectingNotifier::new();
    let mut h = harness(notifier);

    let pair = promising_pair("PAIRaddr111111111111111111111111111111111");
    let report = h
        .orchestrator
        .process_candidates(vec![pair.clone()], Utc::now())
        .await;

    assert_eq!(report.processed, 1);
    assert_eq!(report.accepted, 1);
    assert_eq!(report.notified, 1);
    assert!(report.rejections.is_empty());

    // the alert text carries symbol and contract address
    let messages = h.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("MCAT"));
    assert!(messages[0].contains(BASE_ADDRESS));

    // the mirrored record round-trips the contract address and carries
    // the stats/settings envelope
    let events = h.analytics.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["contract_address"], BASE_ADDRESS);
    assert_eq!(events[0]["symbol"], "MCAT");
    assert!(events[0]["bot_stats"].is_object());
    assert_eq!(events[0]["settings"]["query_limit"], 7);

    // reference scenario score: cap 20k +2, age 10m +2, liquidity 8k +1,
    // 18 txns +1, no links +2
    let score = events[0]["risk_score"].as_u64().unwrap();
    assert_eq!(score, 8);
    assert_eq!(events[0]["risk_level"], "HIGH");
}

#[tokio::test]
async fn test_stale_pair_is_rejected_as_too_old() {
    let mut h = harness(CollectingNotifier::new());

    // same pair but created 45 minutes ago with a 30 minute cap
    let mut pair = promising_pair("PAIRaddr211111111111111111111111111111111");
    pair.pair_created_at = Some(Utc::now().timestamp_millis() - 45 * 60_000);

    let report = h
        .orchestrator
        .process_candidates(vec![pair], Utc::now())
        .await;

    assert_eq!(report.accepted, 0);
    assert_eq!(report.notified, 0);
    assert_eq!(report.rejections.get("too old"), Some(&1));
    assert!(h.messages().is_empty());
}

#[tokio::test]
async fn test_repeat_observation_is_suppressed_across_cycles() {
    let mut h = harness(CollectingNotifier::new());
    let pair = promising_pair("PAIRaddr311111111111111111111111111111111");

    let first = h
        .orchestrator
        .process_candidates(vec![pair.clone()], Utc::now())
        .await;
    assert_eq!(first.notified, 1);

    // mutate non-identity fields; identity is unchanged so the ledger
    // suppresses it
    let mut again = pair;
    again.price_usd = Some(0.002);
    again.volume.h24 = Some(9_999.0);
    let second = h
        .orchestrator
        .process_candidates(vec![again], Utc::now())
        .await;
    assert_eq!(second.accepted, 0);
    assert_eq!(second.notified, 0);
    assert_eq!(h.messages().len(), 1);
}

#[tokio::test]
async fn test_multi_source_duplicates_collapse_before_filtering() {
    let mut h = harness(CollectingNotifier::new());

    // the same identity arrives from two sources with different
    // snapshots; merge keeps one
    let from_search = promising_pair("PAIRaddr411111111111111111111111111111111");
    let mut from_bulk = from_search.clone();
    from_bulk.volume.h24 = Some(6_000.0);

    let candidates = dedup::merge_unique(vec![from_search, from_bulk]);
    assert_eq!(candidates.len(), 1);

    let report = h
        .orchestrator
        .process_candidates(candidates, Utc::now())
        .await;
    assert_eq!(report.processed, 1);
    assert_eq!(report.notified, 1);
}

#[tokio::test]
async fn test_accepted_set_is_truncated_to_cycle_cap() {
    let mut h = harness(CollectingNotifier::new());

    let candidates: Vec<Pair> = (0..12)
        .map(|i| promising_pair(&format!("PAIRaddr5{i:02}1111111111111111111111111111")))
        .collect();
    let report = h
        .orchestrator
        .process_candidates(candidates, Utc::now())
        .await;

    assert_eq!(report.accepted, 12);
    assert_eq!(report.notified, 7);
    assert_eq!(h.messages().len(), 7);
    assert_eq!(h.analytics.events().len(), 7);
}

#[tokio::test]
async fn test_delivery_failure_degrades_to_fallback_and_continues() {
    // first send fails, everything after succeeds
    let mut h = harness(CollectingNotifier::new().with_failures(1));

    let candidates = vec![
        promising_pair("PAIRaddr611111111111111111111111111111111"),
        promising_pair("PAIRaddr711111111111111111111111111111111"),
    ];
    let report = h
        .orchestrator
        .process_candidates(candidates, Utc::now())
        .await;

    // pair 1: full alert failed, fallback delivered, no mirror
    // pair 2: delivered and mirrored
    assert_eq!(report.notified, 1);
    let messages = h.messages();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].contains("Error sending full message"));
    assert!(messages[1].contains("MCAT"));
    assert_eq!(h.analytics.events().len(), 1);
}

#[tokio::test]
async fn test_mixed_batch_produces_histogram_and_alerts() {
    let mut h = harness(CollectingNotifier::new());
    let now = Utc::now();
    let now_ms = now.timestamp_millis();

    let good = promising_pair("PAIRaddr811111111111111111111111111111111");

    let mut too_big = promising_pair("PAIRaddr911111111111111111111111111111111");
    too_big.fdv = Some(120_000.0);

    let mut illiquid = promising_pair("PAIRaddrA11111111111111111111111111111111");
    illiquid.liquidity = Some(Liquidity {
        usd: Some(500.0),
        ..Default::default()
    });

    let mut future_listed = promising_pair("PAIRaddrB11111111111111111111111111111111");
    future_listed.pair_created_at = Some(now_ms + 5 * 60_000);

    let report = h
        .orchestrator
        .process_candidates(vec![good, too_big, illiquid, future_listed], now)
        .await;

    assert_eq!(report.processed, 4);
    assert_eq!(report.accepted, 1);
    assert_eq!(report.notified, 1);
    assert_eq!(report.rejections.get("market cap out of range"), Some(&1));
    assert_eq!(report.rejections.get("low liquidity"), Some(&1));
    assert_eq!(report.rejections.get("invalid timestamp"), Some(&1));
}

// ============================================================================
// Cross-component properties
// ============================================================================

#[test]
fn test_risk_band_for_reference_scenario() {
    let pair = promising_pair("PAIRaddrC11111111111111111111111111111111");
    let assessment = risk::assess(&pair, Utc::now().timestamp_millis());
    // 20k cap (+2), 10min age (+2), 5k volume (+0, boundary is >= 5000),
    // 8k liquidity (+1), 18 txns (+1), trusted dex (+0), no links (+2)
    assert_eq!(assessment.score, 8);

    // social links present removes exactly the no-links factor
    let mut with_links = pair;
    with_links.info = Some(pairscout::domain::pair::PairInfo {
        websites: vec![pairscout::domain::pair::Website {
            label: None,
            url: "https://mooncat.example".to_string(),
        }],
        ..Default::default()
    });
    let assessment = risk::assess(&with_links, Utc::now().timestamp_millis());
    assert_eq!(assessment.score, 6);
}

#[test]
fn test_fingerprint_stability_across_observations() {
    let a = promising_pair("PAIRaddrD11111111111111111111111111111111");
    let mut b = a.clone();
    b.price_usd = Some(0.5);
    b.volume.h24 = Some(1.0);
    assert_eq!(dedup::fingerprint(&a), dedup::fingerprint(&b));
}
