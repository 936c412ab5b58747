//! Telegram Bot API notifier.
//!
//! Talks to the Bot API over plain HTTPS. Messages longer than the
//! Telegram limit are split into sequential chunks with a short delay
//! between sends.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use crate::ports::notifier::{Notifier, NotifyError};

/// Chunk size for outbound messages; the hard API limit is 4096, this
/// leaves headroom for markup expansion.
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// Telegram notifier configuration
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub api_base_url: String,
    pub bot_token: String,
    pub chat_id: String,
    pub timeout: Duration,
    /// Delay between chunks of one oversized message.
    pub chunk_delay: Duration,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.telegram.org".to_string(),
            bot_token: String::new(),
            chat_id: String::new(),
            timeout: Duration::from_secs(10),
            chunk_delay: Duration::from_secs(1),
        }
    }
}

/// Notifier backed by the Telegram `sendMessage` endpoint.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    config: TelegramConfig,
    http: Client,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Result<Self, NotifyError> {
        if config.bot_token.is_empty() {
            return Err(NotifyError::Config("bot token is empty".to_string()));
        }
        if config.chat_id.is_empty() {
            return Err(NotifyError::Config("chat id is empty".to_string()));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NotifyError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, http })
    }

    async fn send_chunk(&self, text: &str) -> Result<(), NotifyError> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.api_base_url, self.config.bot_token
        );
        let body = json!({
            "chat_id": self.config.chat_id,
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

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected(format!("{status}: {detail}")));
        }

        debug!(length = text.chars().count(), "sent telegram message chunk");
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let chunks = split_message(text, MAX_MESSAGE_CHARS);
        let total = chunks.len();
        for (i, chunk) in chunks.iter().enumerate() {
            self.send_chunk(chunk).await?;
            if i + 1 < total {
                tokio::time::sleep(self.config.chunk_delay).await;
            }
        }
        Ok(())
    }
}

/// Split `text` into chunks of at most `max_chars` characters, never
/// cutting inside a UTF-8 code point.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    if max_chars == 0 {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;
    for ch in text.chars() {
        if count == max_chars {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }
    if !current.is_empty() || chunks.is_empty() {
        chunks.push(current);
    }
    chunks
}
