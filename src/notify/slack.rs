use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;

use super::Notifier;
use crate::error::NotifyError;

static RE_BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"<b>(.*?)</b>").expect("bold regex"));
static RE_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<a href='([^']*)'>(.*?)</a>").expect("link regex"));

pub struct SlackNotifier {
    webhook_url: String,
    client: Client,
    timeout: Duration,
}

impl SlackNotifier {
    pub fn new(url: String) -> Self {
        Self {
            webhook_url: url,
            client: Client::new(),
            timeout: Duration::from_secs(20),
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }
}

/// Telegram HTML → Slack mrkdwn. Entities (`&amp;`, `&lt;`, `&gt;`) are valid in both.
fn to_mrkdwn(html: &str) -> String {
    let out = RE_BOLD.replace_all(html, "*$1*");
    RE_LINK.replace_all(&out, "<$1|$2>").into_owned()
}

#[async_trait::async_trait]
impl Notifier for SlackNotifier {
    fn name(&self) -> &'static str {
        "slack"
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let body = serde_json::json!({ "text": to_mrkdwn(text) });

        let resp = self
            .client
            .post(&self.webhook_url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Request {
                sink: "slack",
                message: e.without_url().to_string(),
            })?;
        if !resp.status().is_success() {
            return Err(NotifyError::Status {
                sink: "slack",
                status: resp.status().as_u16(),
            });
        }
        Ok(())
    }
}
