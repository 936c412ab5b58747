//! Notification channel port.

use async_trait::async_trait;
use thiserror::Error;

/// Notification delivery error type
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notifier misconfigured: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Channel rejected message: {0}")]
    Rejected(String),
}

/// Outbound notification channel. Implementations own chunking and any
/// transport-level pacing; callers hand over the full display text.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}
