// src/metrics.rs
use std::path::{Path, PathBuf};

use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

use crate::error::Result;

/// One-time metrics registration (so series carry descriptions when exported).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("monitor_sources_polled_total", "Sources polled, by kind.");
        describe_counter!(
            "monitor_source_errors_total",
            "Sources skipped after fetch/parse errors, by kind."
        );
        describe_counter!("monitor_events_total", "Change events emitted, by kind.");
        describe_counter!("monitor_feed_entries_total", "Entries parsed from feeds.");
        describe_counter!(
            "monitor_notifications_total",
            "Notification attempts, by sink and outcome."
        );
        describe_histogram!("monitor_fetch_ms", "Successful fetch time in milliseconds.");
        describe_histogram!("monitor_feed_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!("monitor_last_run_ts", "Unix ts when the last pass finished.");
        describe_gauge!("monitor_archive_len", "Events currently kept in the archive.");
    });
}

/// Prometheus recorder whose output is written as a text file at the end of a
/// run (for a node_exporter textfile collector).
pub struct MetricsExport {
    handle: PrometheusHandle,
    path: PathBuf,
}

impl MetricsExport {
    /// Install the global recorder. Returns `None` if one is already installed.
    pub fn install(path: impl Into<PathBuf>) -> Option<Self> {
        match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                ensure_metrics_described();
                Some(Self {
                    handle,
                    path: path.into(),
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "prometheus recorder not installed");
                None
            }
        }
    }

    pub fn render(&self) -> String {
        self.handle.render()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self) -> Result<()> {
        crate::state::write_atomic(&self.path, self.render().as_bytes())
    }
}
