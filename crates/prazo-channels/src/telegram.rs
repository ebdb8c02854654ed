//! Telegram Bot API channel — message sending and deletion.

use std::time::Duration;

use serde::Deserialize;

use prazo_core::error::{PrazoError, Result};

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

/// Thin client over the Bot API methods the dispatcher needs.
pub struct TelegramChannel {
    http: reqwest::Client,
    base_url: String,
    bot_token: String,
}

#[derive(Debug, Deserialize)]
pub struct TelegramApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SentMessage {
    pub message_id: i64,
}

impl TelegramChannel {
    pub fn new(bot_token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            bot_token: bot_token.to_string(),
        }
    }

    /// Point the channel at a different API host (tests).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn api_url(&self, api_method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.bot_token, api_method)
    }

    /// Send a text message, returning the new message's id.
    pub async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        parse_mode: Option<&str>,
    ) -> Result<i64> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(mode) = parse_mode {
            body["parse_mode"] = mode.into();
        }

        let resp = self
            .http
            .post(self.api_url("sendMessage"))
            .json(&body)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| PrazoError::Channel(format!("sendMessage failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(PrazoError::Channel(format!("sendMessage: status {status} - {body}")));
        }

        let reply: TelegramApiResponse<SentMessage> = resp
            .json()
            .await
            .map_err(|e| PrazoError::Channel(format!("invalid sendMessage response: {e}")))?;

        match reply.result {
            Some(sent) if reply.ok => Ok(sent.message_id),
            _ => Err(PrazoError::Channel(format!(
                "sendMessage rejected: {}",
                reply.description.unwrap_or_default()
            ))),
        }
    }

    /// Delete a previously sent message. Best-effort at the call sites —
    /// the dispatcher logs failures and carries on.
    pub async fn delete_message(&self, chat_id: &str, message_id: i64) -> Result<()> {
        let resp = self
            .http
            .post(self.api_url("deleteMessage"))
            .json(&serde_json::json!({
                "chat_id": chat_id,
                "message_id": message_id,
            }))
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| PrazoError::Channel(format!("deleteMessage failed: {e}")))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            Err(PrazoError::Channel(format!("deleteMessage: status {status} - {body}")))
        }
    }
}
