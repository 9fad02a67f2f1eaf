// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod app;
pub mod archive;
pub mod change_detector;
pub mod config;
pub mod dashboard;
pub mod diff;
pub mod error;
pub mod event;
pub mod fingerprint;
pub mod ingest;
pub mod metrics;
pub mod notify;
pub mod state;

// ---- Re-exports for stable public API ----
pub use crate::change_detector::{ChangeDetector, RunReport, SourceOutcome, SourceStatus};
pub use crate::config::{Settings, SourceConfig, SourceKind};
pub use crate::error::{FetchError, MonitorError};
pub use crate::event::ChangeEvent;
pub use crate::notify::{Notifier, NotifierMux};
