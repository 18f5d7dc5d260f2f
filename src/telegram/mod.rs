// src/telegram/mod.rs
//! Minimal Telegram Bot API surface: the DTOs we read and the four calls we make.

pub mod handler;

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::TelegramError;

pub use handler::BotHandler;

pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub date: i64,
    #[serde(default)]
    pub text: Option<String>,
}

impl Message {
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.date, 0).single()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub username: Option<String>,
}

/// `{"ok": bool, "result": T, "description": "...", "error_code": n}`
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}

impl<T> ApiResponse<T> {
    fn into_result(self) -> Result<T, TelegramError> {
        match (self.ok, self.result) {
            (true, Some(r)) => Ok(r),
            _ => Err(TelegramError::Api {
                code: self.error_code.unwrap_or_default(),
                description: self
                    .description
                    .unwrap_or_else(|| "empty result".to_string()),
            }),
        }
    }
}

/// Outbound side of the transport. Implemented by `TelegramClient`; tests use a recorder.
#[async_trait::async_trait]
pub trait ReplySink: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError>;
}

#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    base: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Self {
        Self::with_api_base(DEFAULT_TELEGRAM_API, token)
    }

    /// Optional builder for tests/tools
    pub fn with_api_base(api_base: &str, token: &str) -> Self {
        Self {
            client: Client::new(),
            base: format!("{}/bot{token}", api_base.trim_end_matches('/')),
        }
    }

    async fn call<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<T, TelegramError> {
        // Telegram answers errors with a JSON envelope too, so decode regardless of status.
        let resp: ApiResponse<T> = self
            .client
            .post(format!("{}/{method}", self.base))
            .timeout(timeout)
            .json(body)
            .send()
            .await?
            .json()
            .await?;
        resp.into_result()
    }

    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call("getMe", &serde_json::json!({}), Duration::from_secs(10))
            .await
    }

    /// Long poll. `timeout_secs` is passed to Telegram; the HTTP timeout is a bit longer.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let body = serde_json::json!({
            "offset": offset,
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        self.call(
            "getUpdates",
            &body,
            Duration::from_secs(timeout_secs + 10),
        )
        .await
    }

    pub async fn set_webhook(&self, url: &str, secret: &str) -> Result<bool, TelegramError> {
        let mut body = serde_json::json!({ "url": url, "allowed_updates": ["message"] });
        if !secret.is_empty() {
            body["secret_token"] = serde_json::Value::from(secret);
        }
        self.call("setWebhook", &body, Duration::from_secs(10)).await
    }
}

#[async_trait::async_trait]
impl ReplySink for TelegramClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        let body = serde_json::json!({ "chat_id": chat_id, "text": text });
        let _sent: Message = self
            .call("sendMessage", &body, Duration::from_secs(10))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_without_message_parses() {
        let u: Update =
            serde_json::from_str(r#"{"update_id": 7, "edited_message": {}}"#).unwrap();
        assert_eq!(u.update_id, 7);
        assert!(u.message.is_none());
    }

    #[test]
    fn message_fields_and_timestamp() {
        let raw = r#"{"update_id": 1, "message": {"message_id": 3, "date": 1700000000,
            "chat": {"id": 42, "type": "private"}, "from": {"id": 9, "is_bot": false},
            "text": "hi"}}"#;
        let u: Update = serde_json::from_str(raw).unwrap();
        let m = u.message.unwrap();
        assert_eq!(m.chat.id, 42);
        assert_eq!(m.text.as_deref(), Some("hi"));
        assert_eq!(m.sent_at().unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn api_error_envelope() {
        let r: ApiResponse<User> = serde_json::from_str(
            r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#,
        )
        .unwrap();
        match r.into_result() {
            Err(TelegramError::Api { code, description }) => {
                assert_eq!(code, 401);
                assert_eq!(description, "Unauthorized");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
