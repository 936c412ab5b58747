//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits and the
//! outbound HTTP clients:
//! - DexScreener: rate-limited market-data API client
//! - Telegram: notification delivery and the command surface
//! - Axiom: analytics ingest and APL queries
//! - CLI: command-line interface

pub mod axiom;
pub mod cli;
pub mod dexscreener;
pub mod telegram;

pub use axiom::AxiomClient;
pub use cli::CliApp;
pub use dexscreener::DexScreenerClient;
pub use telegram::TelegramNotifier;
