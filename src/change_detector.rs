// src/change_detector.rs
//! One polling pass over the configured sources: fetch, compare with stored
//! state, emit change events, update state in place.

use metrics::{counter, gauge};
use tokio::time;

use crate::config::{DetectorSettings, SourceConfig, SourceKind};
use crate::diff::unified_diff;
use crate::error::Result;
use crate::event::{now_str, ChangeEvent};
use crate::fingerprint::content_hash;
use crate::ingest::{
    normalize_content, normalize_text, parse_feed, truncate_chars, FeedEntry, Fetcher,
    SUMMARY_MAX_CHARS,
};
use crate::state::{FeedState, MonitorState, PageSnapshot, PageState};

/// Only the first N entries of a feed are considered each run.
pub const FEED_WINDOW: usize = 20;
/// Page summaries use this many leading non-empty lines.
pub const PAGE_SUMMARY_LINES: usize = 6;

const DEFAULT_FEED_TITLE: &str = "RSS item";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    /// `n` events emitted, state updated.
    Emitted(usize),
    /// Nothing new; state untouched (feeds may have gained an empty entry).
    Unchanged,
    /// First observation of a page; snapshot stored without an event.
    Seeded,
    /// Page normalized to blank text; ignored this run.
    Blank,
    /// Fetch or parse failure; no state mutation.
    Skipped(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOutcome {
    pub source_id: String,
    pub status: SourceStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// In source configuration order.
    pub events: Vec<ChangeEvent>,
    pub outcomes: Vec<SourceOutcome>,
}

impl RunReport {
    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, SourceStatus::Skipped(_)))
            .count()
    }
}

pub struct ChangeDetector<F: Fetcher> {
    fetcher: F,
    settings: DetectorSettings,
}

impl<F: Fetcher> ChangeDetector<F> {
    pub fn new(fetcher: F, settings: DetectorSettings) -> Self {
        Self { fetcher, settings }
    }

    /// Poll every source sequentially, with a courtesy pause between polls.
    /// A failing source is logged and skipped; it never aborts the pass.
    pub async fn run(&self, sources: &[SourceConfig], state: &mut MonitorState) -> RunReport {
        crate::metrics::ensure_metrics_described();

        let mut report = RunReport::default();
        for (i, src) in sources.iter().enumerate() {
            let kind = src.kind.as_str();
            counter!("monitor_sources_polled_total", "kind" => kind).increment(1);

            let result = match src.kind {
                SourceKind::Feed => {
                    self.poll_feed(src, &mut state.feeds, &mut report.events)
                        .await
                }
                SourceKind::Page => {
                    self.poll_page(src, &mut state.pages, &mut report.events)
                        .await
                }
            };

            let status = match result {
                Ok(status) => status,
                Err(e) => {
                    tracing::warn!(
                        source_id = %src.id,
                        url = %src.url,
                        error = %e,
                        "source skipped"
                    );
                    counter!(
                        "monitor_source_errors_total",
                        "kind" => kind,
                        "error" => e.kind()
                    )
                    .increment(1);
                    SourceStatus::Skipped(e.to_string())
                }
            };

            match &status {
                SourceStatus::Emitted(n) => {
                    tracing::info!(source_id = %src.id, kind, events = n, "changes detected");
                    counter!("monitor_events_total", "kind" => kind).increment(*n as u64);
                }
                SourceStatus::Seeded => {
                    tracing::info!(source_id = %src.id, "page baseline stored");
                }
                SourceStatus::Blank => {
                    tracing::warn!(source_id = %src.id, url = %src.url, "page text is blank");
                }
                SourceStatus::Unchanged | SourceStatus::Skipped(_) => {
                    tracing::debug!(source_id = %src.id, ?status, "no event");
                }
            }
            report.outcomes.push(SourceOutcome {
                source_id: src.id.clone(),
                status,
            });

            if i + 1 < sources.len() {
                let pause = match src.kind {
                    SourceKind::Feed => self.settings.feed_delay,
                    SourceKind::Page => self.settings.page_delay,
                };
                if !pause.is_zero() {
                    time::sleep(pause).await;
                }
            }
        }

        gauge!("monitor_last_run_ts").set(chrono::Utc::now().timestamp() as f64);
        report
    }

    async fn poll_feed(
        &self,
        src: &SourceConfig,
        feeds: &mut FeedState,
        events: &mut Vec<ChangeEvent>,
    ) -> Result<SourceStatus> {
        let fetched = self.fetcher.fetch(&src.url, self.settings.feed_timeout).await?;
        let entries = parse_feed(&src.id, &fetched.body)?;

        let seen = feeds.entry(src.id.clone()).or_default();
        let mut emitted = 0usize;
        for entry in entries.into_iter().take(FEED_WINDOW) {
            let id = entry.identifier();
            // Ids pushed earlier in this loop also count as seen
            if id.is_empty() || seen.contains(&id) {
                continue;
            }
            events.push(feed_event(src, entry));
            seen.push(id);
            emitted += 1;
        }

        Ok(if emitted == 0 {
            SourceStatus::Unchanged
        } else {
            SourceStatus::Emitted(emitted)
        })
    }

    async fn poll_page(
        &self,
        src: &SourceConfig,
        pages: &mut PageState,
        events: &mut Vec<ChangeEvent>,
    ) -> Result<SourceStatus> {
        let fetched = self.fetcher.fetch(&src.url, self.settings.page_timeout).await?;
        let text = normalize_content(&fetched);
        if text.trim().is_empty() {
            return Ok(SourceStatus::Blank);
        }
        let hash = content_hash(&text);

        let previous = pages.get(&src.id);
        if previous.is_some_and(|p| p.hash == hash) {
            return Ok(SourceStatus::Unchanged);
        }
        if previous.is_none() && !self.settings.report_first_observation {
            pages.insert(src.id.clone(), PageSnapshot { hash, text });
            return Ok(SourceStatus::Seeded);
        }

        let diff = unified_diff(previous.map_or("", |p| p.text.as_str()), &text);
        events.push(ChangeEvent {
            source_id: src.id.clone(),
            title: src.title().to_string(),
            url: src.url.clone(),
            tags: src.tags.clone(),
            date: now_str(),
            summary: page_summary(&text),
            diff: Some(diff),
        });
        pages.insert(src.id.clone(), PageSnapshot { hash, text });
        Ok(SourceStatus::Emitted(1))
    }
}

fn feed_event(src: &SourceConfig, entry: FeedEntry) -> ChangeEvent {
    let summary = normalize_text(entry.summary.as_deref().unwrap_or_default());
    ChangeEvent {
        source_id: src.id.clone(),
        title: entry.title.unwrap_or_else(|| DEFAULT_FEED_TITLE.to_string()),
        url: entry.link.unwrap_or_else(|| src.url.clone()),
        tags: src.tags.clone(),
        date: entry.published.unwrap_or_else(now_str),
        summary: truncate_chars(&summary, SUMMARY_MAX_CHARS),
        diff: None,
    }
}

fn page_summary(text: &str) -> String {
    let joined = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(PAGE_SUMMARY_LINES)
        .collect::<Vec<_>>()
        .join(" ");
    truncate_chars(&joined, SUMMARY_MAX_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_summary_takes_six_lines_and_caps_length() {
        let text = "a\n\nb\nc\nd\ne\nf\ng";
        assert_eq!(page_summary(text), "a b c d e f");

        let long = vec!["x".repeat(300); 6].join("\n");
        assert_eq!(page_summary(&long).chars().count(), SUMMARY_MAX_CHARS);
    }

    #[test]
    fn feed_event_defaults() {
        let src = SourceConfig {
            id: "f".into(),
            kind: SourceKind::Feed,
            url: "https://f.test/rss".into(),
            name: None,
            tags: vec!["t".into()],
        };
        let ev = feed_event(
            &src,
            FeedEntry {
                id: Some("1".into()),
                summary: Some(format!("<p>{}</p>", "y".repeat(900))),
                ..Default::default()
            },
        );
        assert_eq!(ev.title, "RSS item");
        assert_eq!(ev.url, "https://f.test/rss");
        assert_eq!(ev.tags, vec!["t".to_string()]);
        assert!(ev.date.ends_with("UTC"));
        assert_eq!(ev.summary.chars().count(), 500);
        assert!(ev.diff.is_none());
    }
}
