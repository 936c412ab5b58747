//! Telegram Adapter
//!
//! Notification delivery plus the read-only command surface, both over the
//! plain Bot HTTP API.

mod client;
mod commands;

pub use client::{split_message, TelegramConfig, TelegramNotifier, MAX_MESSAGE_CHARS};
pub use commands::CommandListener;
