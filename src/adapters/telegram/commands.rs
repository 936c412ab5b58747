//! Telegram command surface.
//!
//! Long-polls `getUpdates` and answers `/start`, `/stats`, and `/health`.
//! Strictly read-only: it consumes published stats snapshots and never
//! touches scanner state.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::client::TelegramConfig;
use crate::domain::stats::ScanStats;
use crate::ports::notifier::NotifyError;

/// Long-poll window passed to getUpdates.
const POLL_TIMEOUT_SECS: u64 = 30;
/// Backoff after a failed poll.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct UpdatesResponse {
    #[serde(default)]
    result: Vec<Update>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

/// Read-only command responder.
pub struct CommandListener {
    http: Client,
    api_base_url: String,
    bot_token: String,
    stats: Arc<RwLock<ScanStats>>,
    /// Preformatted settings block shown by /start and /health.
    settings_summary: String,
}

impl CommandListener {
    pub fn new(
        config: &TelegramConfig,
        stats: Arc<RwLock<ScanStats>>,
        settings_summary: String,
    ) -> Result<Self, NotifyError> {
        if config.bot_token.is_empty() {
            return Err(NotifyError::Config("bot token is empty".to_string()));
        }
        let http = Client::builder()
            // longer than the getUpdates hold so long polls don't time out locally
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 10))
            .build()
            .map_err(|e| NotifyError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base_url: config.api_base_url.clone(),
            bot_token: config.bot_token.clone(),
            stats,
            settings_summary,
        })
    }

    /// Poll forever. Intended to be spawned; dies with the process.
    pub async fn run(self) {
        let mut offset: i64 = 0;
        loop {
            match self.poll_updates(offset).await {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        let Some(message) = update.message else { continue };
                        let Some(text) = message.text else { continue };
                        self.dispatch(message.chat.id, text.trim()).await;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "getUpdates poll failed");
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                }
            }
        }
    }

    async fn poll_updates(&self, offset: i64) -> Result<Vec<Update>, NotifyError> {
        let url = format!("{}/bot{}/getUpdates", self.api_base_url, self.bot_token);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("timeout", POLL_TIMEOUT_SECS.to_string()),
                ("offset", offset.to_string()),
            ])
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotifyError::Rejected(response.status().to_string()));
        }

        let updates: UpdatesResponse = response
            .json()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        Ok(updates.result)
    }

    async fn dispatch(&self, chat_id: i64, text: &str) {
        let command = text.split_whitespace().next().unwrap_or("");
        // tolerate the "/cmd@botname" form used in group chats
        let command = command.split('@').next().unwrap_or(command);

        let reply = match command {
            "/start" => self.start_text(),
            "/stats" => self.stats_text().await,
            "/health" => self.health_text().await,
            _ => {
                debug!(chat_id, text, "ignoring non-command message");
                return;
            }
        };

        if let Err(e) = self.reply(chat_id, &reply).await {
            warn!(chat_id, error = %e, "failed to answer command");
        }
    }

    async fn reply(&self, chat_id: i64, text: &str) -> Result<(), NotifyError> {
        let url = format!("{}/bot{}/sendMessage", self.api_base_url, self.bot_token);
        let body = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "Markdown",
            "disable_web_page_preview": true,
        });
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(NotifyError::Rejected(response.status().to_string()));
        }
        Ok(())
    }

    fn start_text(&self) -> String {
        format!(
            "\u{1F916} *PAIRSCOUT*\n\n\
             \u{1F527} *Current Settings:*\n{}\n\n\
             \u{1F4CA} *Features:*\n\
             \u{2022} Multi-source pair discovery\n\
             \u{2022} Risk scoring with factor breakdown\n\
             \u{2022} Threshold filtering\n\
             \u{2022} Real-time Telegram alerts\n\
             \u{2022} Analytics mirroring\n\n\
             \u{26A1} Monitoring is active.",
            self.settings_summary
        )
    }

    async fn stats_text(&self) -> String {
        let stats = self.stats.read().await.clone();
        let now = Utc::now();
        format!(
            "\u{1F4CA} *BOT STATISTICS*\n\n\
             \u{23F1} Uptime: {}\n\
             \u{1F504} API Calls: {}\n\
             \u{1F4CA} Pairs Processed: {}\n\
             \u{2705} Pairs Found: {}\n\
             \u{1F4E4} Notifications Sent: {}\n\
             \u{274C} Errors: {}\n\
             \u{1F4BE} Cache Size: {}\n\
             \u{1F550} Last Check: {}\n\n\
             \u{1F3AF} Success Rate: {:.1}%",
            format_duration(stats.uptime(now)),
            stats.api_calls_made,
            stats.pairs_processed,
            stats.pairs_found,
            stats.notifications_sent,
            stats.errors,
            stats.ledger_size,
            stats
                .last_scan
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "Never".to_string()),
            stats.success_rate(),
        )
    }

    async fn health_text(&self) -> String {
        let stats = self.stats.read().await.clone();
        format!(
            "\u{1F3E5} *BOT HEALTH CHECK*\n\n\
             \u{2705} Status: Running\n\
             \u{1F517} Telegram: Connected\n\
             \u{274C} Errors so far: {}\n\n\
             \u{2699} *Settings:*\n{}",
            stats.errors, self.settings_summary
        )
    }
}

/// Render a duration as "1h 02m 03s".
fn format_duration(duration: chrono::Duration) -> String {
    let secs = duration.num_seconds().max(0);
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{hours}h {minutes:02}m {seconds:02}s")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(chrono::Duration::seconds(0)), "0h 00m 00s");
        assert_eq!(format_duration(chrono::Duration::seconds(3723)), "1h 02m 03s");
        assert_eq!(format_duration(chrono::Duration::seconds(-5)), "0h 00m 00s");
    }

    #[test]
    fn test_listener_requires_token() {
        let stats = Arc::new(RwLock::new(ScanStats::new()));
        let result = CommandListener::new(&TelegramConfig::default(), stats, String::new());
        assert!(matches!(result, Err(NotifyError::Config(_))));
    }

    #[tokio::test]
    async fn test_stats_text_reflects_counters() {
        let stats = Arc::new(RwLock::new(ScanStats::new()));
        {
            let mut s = stats.write().await;
            s.pairs_found = 8;
            s.notifications_sent = 6;
            s.api_calls_made = 42;
        }
        let listener = CommandListener::new(
            &TelegramConfig {
                bot_token: "token".to_string(),
                ..Default::default()
            },
            stats,
            "settings".to_string(),
        )
        .unwrap();

        let text = listener.stats_text().await;
        assert!(text.contains("API Calls: 42"));
        assert!(text.contains("Pairs Found: 8"));
        assert!(text.contains("75.0%"));
    }

    #[test]
    fn test_update_response_parsing() {
        let json = r#"{"ok": true, "result": [
            {"update_id": 7, "message": {"chat": {"id": 99}, "text": "/stats"}},
            {"update_id": 8, "message": null}
        ]}"#;
        let parsed: UpdatesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.result.len(), 2);
        assert_eq!(parsed.result[0].update_id, 7);
        assert_eq!(
            parsed.result[0].message.as_ref().unwrap().text.as_deref(),
            Some("/stats")
        );
        assert!(parsed.result[1].message.is_none());
    }
}
