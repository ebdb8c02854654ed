//! Reminder dispatch — at most one live reminder message per day.
//!
//! Before sending, the previous message is deleted if it was sent today;
//! after a successful send the new message's identity is persisted so the
//! next run can replace it. Every failure here is logged and survived.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use prazo_core::cache::FileCache;

use crate::format;
use crate::telegram::TelegramChannel;

/// Identity of the last dispatched reminder, persisted between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastDispatch {
    pub message_id: i64,
    /// `YYYY-MM-DD` of the send. Only a same-day record triggers deletion.
    pub date: String,
}

/// Read the persisted record, if any.
pub fn load_last_dispatch(state: &FileCache) -> Option<LastDispatch> {
    let message_id = state.get("message_id")?.as_i64()?;
    let date = state.get("date")?.as_str()?.to_string();
    Some(LastDispatch { message_id, date })
}

fn record_dispatch(state: &FileCache, message_id: i64, date: &str) {
    state.insert("message_id", message_id.into());
    state.insert("date", date.into());
    state.save();
}

/// Send the combined reminder to the primary chat, replacing a same-day
/// predecessor. Returns the new message id, or `None` if the send failed
/// (non-fatal — the caller still attempts the secondary broadcast).
pub async fn dispatch_reminder(
    channel: &TelegramChannel,
    chat_id: &str,
    state: &FileCache,
    body: &str,
    today: NaiveDate,
) -> Option<i64> {
    let today_str = today.format("%Y-%m-%d").to_string();

    if let Some(prev) = load_last_dispatch(state)
        && prev.date == today_str
    {
        match channel.delete_message(chat_id, prev.message_id).await {
            Ok(()) => tracing::info!("previous reminder {} deleted", prev.message_id),
            Err(e) => tracing::error!("could not delete previous reminder: {e}"),
        }
    }

    match channel.send_message(chat_id, body, Some("MarkdownV2")).await {
        Ok(message_id) => {
            tracing::info!("reminder sent to chat {chat_id} (message {message_id})");
            record_dispatch(state, message_id, &today_str);
            Some(message_id)
        }
        Err(e) => {
            tracing::error!("chat {chat_id}: {e}");
            None
        }
    }
}

/// Send the plain-text variant to the secondary chat. Independent of the
/// primary send's outcome.
pub async fn broadcast_plain(channel: &TelegramChannel, chat_id: &str, body: &str) {
    let text = format::plain_markdown(body);
    match channel.send_message(chat_id, &text, Some("Markdown")).await {
        Ok(_) => tracing::debug!("plain broadcast sent to chat {chat_id}"),
        Err(e) => tracing::error!("chat {chat_id}: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn state(dir: &std::path::Path) -> FileCache {
        FileCache::open(&dir.join("last_message.json"), "last_message", None)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 6).unwrap()
    }

    async fn mock_send(server: &MockServer, message_id: i64) {
        Mock::given(method("POST"))
            .and(path("/botT/sendMessage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": {"message_id": message_id}
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_first_send_records_identity() {
        let server = MockServer::start().await;
        mock_send(&server, 100).await;

        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());
        let channel = TelegramChannel::new("T").with_base_url(&server.uri());

        let id = dispatch_reminder(&channel, "42", &state, "body", today()).await;
        assert_eq!(id, Some(100));
        assert_eq!(
            load_last_dispatch(&state),
            Some(LastDispatch { message_id: 100, date: "2025-03-06".into() })
        );
    }

    #[tokio::test]
    async fn test_same_day_predecessor_is_deleted_first() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botT/deleteMessage"))
            .and(body_partial_json(json!({"message_id": 100})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": true})))
            .expect(1)
            .mount(&server)
            .await;
        mock_send(&server, 101).await;

        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());
        record_dispatch(&state, 100, "2025-03-06");
        let channel = TelegramChannel::new("T").with_base_url(&server.uri());

        let id = dispatch_reminder(&channel, "42", &state, "body", today()).await;
        assert_eq!(id, Some(101));
        assert_eq!(load_last_dispatch(&state).unwrap().message_id, 101);
    }

    #[tokio::test]
    async fn test_stale_record_is_not_deleted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botT/deleteMessage"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        mock_send(&server, 102).await;

        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());
        record_dispatch(&state, 100, "2025-03-05");
        let channel = TelegramChannel::new("T").with_base_url(&server.uri());

        dispatch_reminder(&channel, "42", &state, "body", today()).await;
    }

    #[tokio::test]
    async fn test_failed_delete_does_not_block_send() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botT/deleteMessage"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;
        mock_send(&server, 103).await;

        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());
        record_dispatch(&state, 100, "2025-03-06");
        let channel = TelegramChannel::new("T").with_base_url(&server.uri());

        let id = dispatch_reminder(&channel, "42", &state, "body", today()).await;
        assert_eq!(id, Some(103));
    }

    #[tokio::test]
    async fn test_failed_send_keeps_previous_record() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botT/sendMessage"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());
        record_dispatch(&state, 100, "2025-03-05");
        let channel = TelegramChannel::new("T").with_base_url(&server.uri());

        let id = dispatch_reminder(&channel, "42", &state, "body", today()).await;
        assert_eq!(id, None);
        assert_eq!(load_last_dispatch(&state).unwrap().message_id, 100);
    }

    #[tokio::test]
    async fn test_broadcast_plain_wraps_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botT/sendMessage"))
            .and(body_partial_json(json!({
                "chat_id": "99",
                "parse_mode": "Markdown",
                "text": "```md\n*A - B*```"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": {"message_id": 1}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let channel = TelegramChannel::new("T").with_base_url(&server.uri());
        broadcast_plain(&channel, "99", "*A \\- B*").await;
    }
}
