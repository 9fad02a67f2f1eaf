// src/app.rs
//! One full invocation: load state, poll, persist, archive, render, notify.

use std::path::PathBuf;

use crate::archive::Archive;
use crate::change_detector::{ChangeDetector, RunReport};
use crate::config::{SourceConfig, Settings};
use crate::dashboard::write_dashboard;
use crate::error::Result;
use crate::event::now_str;
use crate::ingest::Fetcher;
use crate::notify::NotifierMux;
use crate::state::StateStore;

#[derive(Debug)]
pub struct RunSummary {
    pub report: RunReport,
    pub archive_len: usize,
    pub dashboard: PathBuf,
    /// Sinks that accepted the notification.
    pub delivered: usize,
}

/// State is saved before the archive is touched; notification comes last so a
/// delivery failure can never cost archived events.
pub async fn run_once<F: Fetcher>(
    settings: &Settings,
    sources: &[SourceConfig],
    fetcher: F,
    mux: &NotifierMux,
) -> Result<RunSummary> {
    let store = StateStore::new(&settings.state_dir);
    let mut state = store.load();

    let detector = ChangeDetector::new(fetcher, settings.detector.clone());
    let report = detector.run(sources, &mut state).await;
    store.save(&state)?;

    let history = Archive::in_dir(&settings.docs_dir).append(report.events.clone())?;
    let dashboard = write_dashboard(&settings.docs_dir, &history, &now_str())?;
    let delivered = mux.notify_changes(&report.events).await;

    tracing::info!(
        sources = sources.len(),
        events = report.events.len(),
        skipped = report.skipped(),
        archive = history.len(),
        delivered,
        "run finished"
    );
    Ok(RunSummary {
        report,
        archive_len: history.len(),
        dashboard,
        delivered,
    })
}

/// Rebuild the dashboard from the persisted archive without polling.
pub fn render_from_archive(settings: &Settings) -> Result<PathBuf> {
    let history = Archive::in_dir(&settings.docs_dir).load();
    write_dashboard(&settings.docs_dir, &history, &now_str())
}
