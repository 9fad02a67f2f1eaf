// src/error.rs
//! Error taxonomy for the monitor. Everything except `Config` is recovered at
//! source granularity (or by substituting defaults) and never aborts a run.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MonitorError>;

/// Failure to retrieve a source over HTTP.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            Self::Status { url, .. } | Self::Timeout { url } | Self::Transport { url, .. } => url,
        }
    }

    /// Short label used as a metrics dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::Timeout { .. } => "timeout",
            Self::Transport { .. } => "transport",
        }
    }

    pub(crate) fn from_reqwest(url: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout { url: url.to_string() }
        } else if let Some(status) = e.status() {
            Self::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else {
            Self::Transport {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Malformed feed or page content.
    #[error("could not parse content of {source_id}: {message}")]
    Parse { source_id: String, message: String },

    /// Unreadable or invalid persisted state; callers fall back to defaults.
    #[error("state file {} is corrupt: {message}", path.display())]
    StateCorruption { path: PathBuf, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MonitorError {
    pub fn parse(source_id: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Parse {
            source_id: source_id.into(),
            message: message.to_string(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn corruption(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        Self::StateCorruption {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// `error` label on `monitor_source_errors_total`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch(e) => e.kind(),
            Self::Parse { .. } => "parse",
            Self::StateCorruption { .. } => "state",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
        }
    }
}

/// Failure to deliver a notification. Always swallowed by `NotifierMux`.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("{sink} request failed: {message}")]
    Request { sink: &'static str, message: String },

    #[error("{sink} returned HTTP {status}")]
    Status { sink: &'static str, status: u16 },
}
