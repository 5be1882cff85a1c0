//! Telegram Bot API client
//!
//! Implements [`MessagingGateway`] over `sendMessage` and exposes the
//! long-poll `getUpdates` intake used by the server loop. Only the
//! fields this service reads are modeled.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::MessagingGateway;
use crate::utils::{AppError, AppResult};

/// Bounded per-send timeout; a stalled transport counts as a failed
/// attempt, the retry contract is unchanged
const SEND_TIMEOUT: Duration = Duration::from_secs(15);

// ========== Incoming update DTOs (Bot API subset) ==========

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<Sender>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sender {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

/// HTTP client for the Telegram Bot API
pub struct TelegramGateway {
    client: Client,
    base_url: String,
}

impl TelegramGateway {
    pub fn new(token: &str) -> AppResult<Self> {
        Self::with_base_url(format!("https://api.telegram.org/bot{token}"))
    }

    /// Point at a different endpoint (local bot-api server, test stub)
    pub fn with_base_url(base_url: impl Into<String>) -> AppResult<Self> {
        // No client-wide timeout: long polls outlive any sane default,
        // so each request sets its own
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Long-poll for updates with id >= `offset`
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> AppResult<Vec<Update>> {
        let response = self
            .client
            .post(format!("{}/getUpdates", self.base_url))
            .timeout(Duration::from_secs(timeout_secs + 10))
            .json(&json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message"],
            }))
            .send()
            .await
            .map_err(|e| AppError::source_unavailable(format!("getUpdates failed: {e}")))?;

        let body: ApiResponse<Vec<Update>> = response
            .json()
            .await
            .map_err(|e| AppError::source_unavailable(format!("getUpdates response invalid: {e}")))?;
        if !body.ok {
            return Err(AppError::source_unavailable(format!(
                "getUpdates rejected: {}",
                body.description.unwrap_or_default()
            )));
        }
        Ok(body.result.unwrap_or_default())
    }
}

#[async_trait]
impl MessagingGateway for TelegramGateway {
    async fn send_message(&self, recipient_id: i64, text: &str) -> AppResult<()> {
        let response = self
            .client
            .post(format!("{}/sendMessage", self.base_url))
            .timeout(SEND_TIMEOUT)
            .json(&json!({
                "chat_id": recipient_id,
                "text": text,
            }))
            .send()
            .await
            .map_err(|e| AppError::delivery(format!("send to {recipient_id} failed: {e}")))?;

        let body: ApiResponse<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| AppError::delivery(format!("send to {recipient_id}: bad response: {e}")))?;
        if !body.ok {
            return Err(AppError::delivery(format!(
                "send to {recipient_id} rejected: {}",
                body.description.unwrap_or_default()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_deserializes_with_missing_optionals() {
        let update: Update = serde_json::from_value(serde_json::json!({
            "update_id": 10,
            "message": {
                "chat": {"id": 55},
                "text": "/orders"
            }
        }))
        .unwrap();
        let message = update.message.unwrap();
        assert_eq!(message.chat.id, 55);
        assert_eq!(message.text.as_deref(), Some("/orders"));
        assert!(message.from.is_none());
    }

    #[test]
    fn non_message_update_is_tolerated() {
        let update: Update = serde_json::from_value(serde_json::json!({
            "update_id": 11
        }))
        .unwrap();
        assert!(update.message.is_none());
    }
}
