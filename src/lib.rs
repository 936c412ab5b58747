//! Pairscout - Solana New-Pair Scanner
//!
//! Polls public DexScreener endpoints for freshly listed pairs, filters
//! them against configurable thresholds, scores the survivors for risk,
//! and delivers formatted alerts to Telegram while mirroring structured
//! records to an Axiom dataset.
//!
//! # Modules
//!
//! - `domain`: pair records, filtering, risk scoring, deduplication
//! - `ports`: trait abstractions (Notifier, AnalyticsSink)
//! - `adapters`: external implementations (DexScreener, Telegram, Axiom, CLI)
//! - `application`: fetch aggregation, alert formatting, the scan cycle
//! - `config`: configuration loading and validation

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
