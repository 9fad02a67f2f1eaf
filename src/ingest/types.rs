// src/ingest/types.rs
use std::time::Duration;

use crate::error::FetchError;

/// Raw response body plus its declared content type (may be empty).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub body: String,
    pub content_type: String,
}

impl Fetched {
    pub fn new(body: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_type: content_type.into(),
        }
    }
}

/// One feed entry, already lifted out of RSS/Atom specifics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub published: Option<String>,
    pub summary: Option<String>,
}

impl FeedEntry {
    /// Dedup identifier: native id if non-empty, else link. Empty means "untrackable".
    pub fn identifier(&self) -> String {
        [self.id.as_deref(), self.link.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or_default()
            .to_string()
    }
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Fetched, FetchError>;
}
