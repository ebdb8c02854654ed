//! # prazo channels
//!
//! Outbound side of the sync run: the Telegram Bot API client, MarkdownV2
//! rendering of task reminders, and the delete-then-send dispatcher that
//! keeps at most one live reminder per day.

pub mod dispatch;
pub mod format;
pub mod telegram;

pub use telegram::TelegramChannel;
