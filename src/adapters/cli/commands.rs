//! CLI command definitions.

use std::path::PathBuf;

use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};

use crate::ports::notifier::{Notifier, NotifyError};

/// Solana new-pair scanner with risk scoring and Telegram alerts
#[derive(Debug, Parser)]
#[command(name = "pairscout", version, about)]
pub struct CliApp {
    /// Increase log verbosity to info
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the polling loop with Telegram delivery
    Run(RunCmd),
    /// Run a single diagnostic cycle, printing alerts to stdout
    Scan(ScanCmd),
}

#[derive(Debug, Args)]
pub struct RunCmd {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}

#[derive(Debug, Args)]
pub struct ScanCmd {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}

/// Notifier that prints to stdout; used by the `scan` subcommand so a
/// diagnostic cycle needs no channel credentials.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        println!("{text}\n{}", "-".repeat(60));
        Ok(())
    }
}
