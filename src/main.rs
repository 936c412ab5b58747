//! Pairscout - Solana new-pair scanner with risk scoring and Telegram alerts.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use pairscout::adapters::axiom::AxiomClient;
use pairscout::adapters::cli::{CliApp, Command, ConsoleNotifier, RunCmd, ScanCmd};
use pairscout::adapters::dexscreener::DexScreenerClient;
use pairscout::adapters::telegram::{CommandListener, TelegramNotifier};
use pairscout::application::fetcher::PairFetcher;
use pairscout::application::orchestrator::ScanOrchestrator;
use pairscout::config::{load_config, Config};
use pairscout::domain::filter::FilterEngine;
use pairscout::ports::notifier::Notifier;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present (secrets go there, not in config.toml)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();
    match app.command {
        Command::Run(cmd) => run_command(cmd, app.verbose, app.debug).await,
        Command::Scan(cmd) => scan_command(cmd, app.verbose, app.debug).await,
    }
}

fn init_logging(verbose: bool, debug: bool, config_level: &str) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new(config_level)
    };

    fmt().with_env_filter(filter).init();
    Ok(())
}

async fn run_command(cmd: RunCmd, verbose: bool, debug: bool) -> Result<()> {
    let config = load_config(&cmd.config).context("Failed to load configuration")?;
    init_logging(verbose, debug, &config.logging.level)?;

    tracing::info!("Starting pairscout...");

    // Fatal startup class: channel credentials are required before the
    // cycle loop starts.
    let telegram_config = config.telegram_config();
    if telegram_config.bot_token.is_empty() {
        bail!("TELEGRAM_BOT_TOKEN is required (env var or [telegram].bot_token)");
    }
    if telegram_config.chat_id.is_empty() {
        bail!("TELEGRAM_CHAT_ID is required (env var or [telegram].chat_id)");
    }

    let notifier = TelegramNotifier::new(telegram_config.clone())
        .context("Failed to create Telegram notifier")?;
    let analytics = Arc::new(
        AxiomClient::new(config.axiom_config()).context("Failed to create analytics client")?,
    );
    if !analytics.is_enabled() {
        tracing::warn!("analytics mirroring disabled (no AXIOM_TOKEN / AXIOM_DATASET)");
    }

    let dex = DexScreenerClient::new(config.dexscreener_config())
        .context("Failed to create market-data client")?;
    let fetcher = PairFetcher::new(dex, Arc::clone(&analytics), config.fetcher_config());
    let filter = FilterEngine::new(config.filter_params());

    let mut orchestrator = ScanOrchestrator::new(
        fetcher,
        filter,
        notifier.clone(),
        analytics,
        config.scan_settings(),
    )
    .context("Failed to create orchestrator")?;

    // Read-only command surface over the published stats snapshots
    if config.telegram.commands_enabled {
        let listener = CommandListener::new(
            &telegram_config,
            orchestrator.stats_handle(),
            config.settings_summary(),
        )
        .context("Failed to create command listener")?;
        tokio::spawn(listener.run());
    }

    // Shutdown at the next cycle/sleep checkpoint
    let running = orchestrator.running_handle();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
        *running.write().await = false;
    });

    send_startup_message(&notifier, &config).await;

    orchestrator.run().await;
    tracing::info!("pairscout stopped");
    Ok(())
}

async fn scan_command(cmd: ScanCmd, verbose: bool, debug: bool) -> Result<()> {
    let config = load_config(&cmd.config).context("Failed to load configuration")?;
    init_logging(verbose, debug, &config.logging.level)?;

    let analytics = Arc::new(
        AxiomClient::new(config.axiom_config()).context("Failed to create analytics client")?,
    );
    let dex = DexScreenerClient::new(config.dexscreener_config())
        .context("Failed to create market-data client")?;
    let fetcher = PairFetcher::new(dex, Arc::clone(&analytics), config.fetcher_config());
    let filter = FilterEngine::new(config.filter_params());

    // one diagnostic pass: alerts to stdout, no pacing between them
    let mut settings = config.scan_settings();
    settings.notify_delay = Duration::ZERO;

    let mut orchestrator =
        ScanOrchestrator::new(fetcher, filter, ConsoleNotifier, analytics, settings)
            .context("Failed to create orchestrator")?;

    let report = orchestrator.run_cycle().await;
    println!(
        "scan done: {} candidates, {} accepted, {} alerts",
        report.processed, report.accepted, report.notified
    );
    if !report.rejections.is_empty() {
        println!("rejections:");
        for (reason, count) in &report.rejections {
            println!("  - {reason}: {count}");
        }
    }
    Ok(())
}

/// Best-effort startup banner; a failure here is logged, not fatal.
async fn send_startup_message(notifier: &TelegramNotifier, config: &Config) {
    let text = format!(
        "\u{1F680} *BOT STARTED SUCCESSFULLY* \u{1F680}\n\n\
         \u{2699} *Settings:*\n{}\n\n\
         \u{2705} Ready to monitor {} pairs!",
        config.settings_summary(),
        config.filter.chain
    );
    if let Err(e) = notifier.send(&text).await {
        tracing::warn!(error = %e, "failed to send startup message");
    }
}
