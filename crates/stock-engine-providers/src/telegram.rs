use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::NotifyError;

const TELEGRAM_BASE_URL: &str = "https://api.telegram.org";

/// Trait for pushing a formatted report to a chat sink.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Notifier name (for logging/display).
    fn name(&self) -> &str;

    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Telegram bot notifier. Sends Markdown messages to a single chat via the
/// sendMessage endpoint.
pub struct TelegramNotifier {
    client: Client,
    token: String,
    chat_id: String,
    base_url: String,
}

impl TelegramNotifier {
    /// Create from the `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID`
    /// environment variables.
    pub fn from_env() -> Result<Self, NotifyError> {
        let token = std::env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| NotifyError::Config("TELEGRAM_BOT_TOKEN not set".into()))?;
        let chat_id = std::env::var("TELEGRAM_CHAT_ID")
            .map_err(|_| NotifyError::Config("TELEGRAM_CHAT_ID not set".into()))?;
        Ok(Self::new(token, chat_id, None))
    }

    /// Create with explicit credentials and an optional base URL override
    /// (for testing).
    pub fn new(token: String, chat_id: String, base_url: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("failed to build reqwest client"),
            token,
            chat_id,
            base_url: base_url.unwrap_or_else(|| TELEGRAM_BASE_URL.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    description: Option<String>,
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
            parse_mode: "Markdown",
            disable_web_page_preview: true,
        };

        let response = self
            .client
            .post(format!(
                "{}/bot{}/sendMessage",
                self.base_url, self.token
            ))
            .json(&request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body: SendMessageResponse = response.json().await.map_err(|e| NotifyError::Api {
            status,
            message: format!("unreadable response: {e}"),
        })?;

        if !body.ok {
            return Err(NotifyError::Api {
                status,
                message: body.description.unwrap_or_else(|| "unknown error".into()),
            });
        }

        debug!("telegram: delivered {} char(s)", text.len());
        Ok(())
    }
}
