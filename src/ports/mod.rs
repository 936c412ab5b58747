//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - Notification delivery (Telegram)
//! - Analytics ingest and supplementary queries (Axiom)

pub mod analytics;
pub mod mocks;
pub mod notifier;

pub use analytics::{AnalyticsError, AnalyticsSink};
pub use notifier::{Notifier, NotifyError};
