//! Application Layer - cycle orchestration and alert shaping
//!
//! - `fetcher`: multi-source pair aggregation with per-source isolation
//! - `formatter`: pure pair + risk -> (display text, analytics record)
//! - `orchestrator`: the polling cycle state machine and scan stats

pub mod fetcher;
pub mod formatter;
pub mod orchestrator;

pub use fetcher::{FetcherConfig, PairFetcher};
pub use formatter::{format_alert, AlertRecord, QuoteTokenRecord};
pub use orchestrator::{CycleReport, OrchestratorError, ScanOrchestrator, ScanSettings};
