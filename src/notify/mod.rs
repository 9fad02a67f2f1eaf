// src/notify/mod.rs
pub mod rules;
pub mod slack;
pub mod telegram;

use html_escape::{encode_single_quoted_attribute, encode_text};
use metrics::counter;

use crate::config::NotifyConfig;
use crate::error::NotifyError;
use crate::event::ChangeEvent;

pub use rules::recommend;
pub use slack::SlackNotifier;
pub use telegram::TelegramNotifier;

/// At most this many events are listed in one message.
pub const MESSAGE_EVENTS: usize = 10;
/// Telegram rejects longer messages.
pub const MESSAGE_MAX_CHARS: usize = 4096;

const MESSAGE_HEADER: &str = "<b>Change Radar: new changes</b>";

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Build the per-run message (Telegram HTML). `None` when there is nothing to say.
pub fn build_message(events: &[ChangeEvent]) -> Option<String> {
    if events.is_empty() {
        return None;
    }
    let mut lines = vec![MESSAGE_HEADER.to_string()];
    for ev in events.iter().take(MESSAGE_EVENTS) {
        lines.push(format!(
            "• <b>{}</b> - <a href='{}'>link</a>",
            encode_text(&ev.title),
            encode_single_quoted_attribute(&ev.url)
        ));
        let hint = recommend(&ev.tags, &ev.title, &ev.summary);
        lines.push(encode_text(&hint).into_owned());
    }

    // Cut at a line boundary so no HTML tag is split
    let mut out = String::new();
    let mut used = 0usize;
    for line in lines {
        let cost = line.chars().count() + usize::from(!out.is_empty());
        if used + cost > MESSAGE_MAX_CHARS {
            break;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&line);
        used += cost;
    }
    Some(out)
}

/// Fan-out to every configured sink. Delivery is attempted once per sink and
/// failures are logged, never propagated.
#[derive(Default)]
pub struct NotifierMux {
    sinks: Vec<Box<dyn Notifier>>,
}

impl NotifierMux {
    pub fn from_config(cfg: &NotifyConfig) -> Self {
        let mut sinks: Vec<Box<dyn Notifier>> = Vec::new();
        if let Some(tg) = &cfg.telegram {
            sinks.push(Box::new(TelegramNotifier::new(tg)));
        }
        if let Some(url) = &cfg.slack_webhook {
            sinks.push(Box::new(SlackNotifier::new(url.clone())));
        }
        Self { sinks }
    }

    pub fn with_sinks(sinks: Vec<Box<dyn Notifier>>) -> Self {
        Self { sinks }
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn sink_names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// Returns how many sinks accepted the message.
    pub async fn deliver(&self, text: &str) -> usize {
        if self.sinks.is_empty() {
            tracing::debug!("notifications disabled (no sinks configured)");
            return 0;
        }
        let mut ok = 0;
        for sink in &self.sinks {
            match sink.send(text).await {
                Ok(()) => {
                    ok += 1;
                    counter!(
                        "monitor_notifications_total",
                        "sink" => sink.name(),
                        "outcome" => "ok"
                    )
                    .increment(1);
                    tracing::info!(sink = sink.name(), "notification sent");
                }
                Err(e) => {
                    counter!(
                        "monitor_notifications_total",
                        "sink" => sink.name(),
                        "outcome" => "error"
                    )
                    .increment(1);
                    tracing::warn!(sink = sink.name(), error = %e, "notification failed");
                }
            }
        }
        ok
    }

    /// Build and deliver the per-run summary for `events`. No-op when empty.
    pub async fn notify_changes(&self, events: &[ChangeEvent]) -> usize {
        match build_message(events) {
            Some(text) => self.deliver(&text).await,
            None => 0,
        }
    }
}
