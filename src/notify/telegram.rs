use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use super::Notifier;
use crate::config::TelegramConfig;
use crate::error::NotifyError;

const TELEGRAM_API: &str = "https://api.telegram.org";

#[derive(Clone)]
pub struct TelegramNotifier {
    endpoint: String,
    chat_id: String,
    client: Client,
    timeout: Duration,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

impl TelegramNotifier {
    pub fn new(cfg: &TelegramConfig) -> Self {
        Self::with_api_base(cfg, TELEGRAM_API)
    }

    /// Point at a different Bot API host (self-hosted server, tests).
    pub fn with_api_base(cfg: &TelegramConfig, base: &str) -> Self {
        Self {
            endpoint: format!(
                "{}/bot{}/sendMessage",
                base.trim_end_matches('/'),
                cfg.bot_token
            ),
            chat_id: cfg.chat_id.clone(),
            client: Client::new(),
            timeout: Duration::from_secs(20),
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        // The endpoint embeds the bot token; keep it out of error messages
        let resp = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Request {
                sink: "telegram",
                message: e.without_url().to_string(),
            })?;
        if !resp.status().is_success() {
            return Err(NotifyError::Status {
                sink: "telegram",
                status: resp.status().as_u16(),
            });
        }
        Ok(())
    }
}
