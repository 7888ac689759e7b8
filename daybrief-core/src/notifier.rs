use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, time::Duration};
use tracing::{debug, instrument};

use crate::provider::{error_chain, truncate_body};

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of a single delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub success: bool,
    pub message: String,
}

impl Delivery {
    pub fn sent() -> Self {
        Self { success: true, message: "message sent".to_string() }
    }

    pub fn failed(err: &NotifyError) -> Self {
        Self { success: false, message: format!("send failed: {err}") }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("request timed out")]
    Timeout,

    #[error("status {status}: {detail}")]
    Rejected { status: StatusCode, detail: String },

    // without_url() is applied first; the bot token lives in the path.
    #[error("{}", error_chain(.0))]
    Transport(#[source] reqwest::Error),
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { NotifyError::Timeout } else { NotifyError::Transport(err.without_url()) }
    }
}

/// Delivers a finished message somewhere. One attempt, never fails loudly.
#[async_trait]
pub trait Notifier: Send + Sync + Debug {
    async fn send(&self, text: &str) -> Delivery;
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Debug, Deserialize)]
struct TelegramReply {
    description: Option<String>,
}

/// Telegram Bot API `sendMessage` in HTML parse mode.
#[derive(Clone)]
pub struct TelegramNotifier {
    api_base: String,
    bot_token: String,
    chat_id: String,
    http: Client,
}

// Hand-written so the token never ends up in logs.
impl Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("api_base", &self.api_base)
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

impl TelegramNotifier {
    pub fn new(
        api_base: impl Into<String>,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for Telegram")?;

        Ok(Self {
            api_base: api_base.into(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            http,
        })
    }

    async fn post(&self, text: &str) -> Result<(), NotifyError> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.bot_token
        );
        let payload = SendMessage { chat_id: &self.chat_id, text, parse_mode: "HTML" };

        debug!(chat_id = %self.chat_id, chars = text.chars().count(), "posting message");

        let res = self.http.post(url).json(&payload).send().await?;

        let status = res.status();
        if status.is_success() {
            return Ok(());
        }

        let body = res.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<TelegramReply>(&body)
            .ok()
            .and_then(|reply| reply.description)
            .unwrap_or_else(|| truncate_body(&body));

        Err(NotifyError::Rejected { status, detail })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    #[instrument(skip_all, level = "debug")]
    async fn send(&self, text: &str) -> Delivery {
        match self.post(text).await {
            Ok(()) => Delivery::sent(),
            Err(err) => Delivery::failed(&err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_token() {
        let notifier =
            TelegramNotifier::new(DEFAULT_API_BASE, "123:SECRET", "42", DEFAULT_TIMEOUT)
                .expect("client builds");

        let dbg = format!("{notifier:?}");
        assert!(!dbg.contains("SECRET"));
        assert!(dbg.contains("42"));
    }

    #[test]
    fn failed_delivery_carries_detail() {
        let err = NotifyError::Rejected {
            status: StatusCode::BAD_REQUEST,
            detail: "Bad Request: chat not found".into(),
        };

        let delivery = Delivery::failed(&err);

        assert!(!delivery.success);
        assert!(delivery.message.contains("400"));
        assert!(delivery.message.contains("chat not found"));
    }

    #[test]
    fn payload_uses_html_mode() {
        let payload = SendMessage { chat_id: "42", text: "<b>hi</b>", parse_mode: "HTML" };

        let json = serde_json::to_value(&payload).expect("serializes");

        assert_eq!(json, serde_json::json!({"chat_id": "42", "text": "<b>hi</b>", "parse_mode": "HTML"}));
    }
}
