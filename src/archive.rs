// src/archive.rs
//! archive.rs: durable, newest-first, bounded log of emitted change events.

use std::path::{Path, PathBuf};

use metrics::gauge;

use crate::error::Result;
use crate::event::ChangeEvent;
use crate::state::{load_json_or_default, write_json_atomic};

pub const ARCHIVE_CAPACITY: usize = 500;
pub const ARCHIVE_FILE: &str = "archive.json";

#[derive(Debug, Clone)]
pub struct Archive {
    path: PathBuf,
    cap: usize,
}

impl Archive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_capacity(path, ARCHIVE_CAPACITY)
    }

    pub fn with_capacity(path: impl Into<PathBuf>, cap: usize) -> Self {
        Self {
            path: path.into(),
            cap,
        }
    }

    /// `<docs_dir>/archive.json`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(ARCHIVE_FILE))
    }

    /// Missing or corrupt history reads as empty.
    pub fn load(&self) -> Vec<ChangeEvent> {
        let mut v: Vec<ChangeEvent> = load_json_or_default(&self.path);
        v.truncate(self.cap);
        v
    }

    /// Prepend `batch` (keeping its order), cap, persist, and return the full history.
    /// No deduplication: appending the same batch twice stores it twice.
    pub fn append(&self, batch: Vec<ChangeEvent>) -> Result<Vec<ChangeEvent>> {
        let mut history = batch;
        history.extend(self.load());
        history.truncate(self.cap);

        write_json_atomic(&self.path, &history)?;
        gauge!("monitor_archive_len").set(history.len() as f64);
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(id: &str) -> ChangeEvent {
        ChangeEvent {
            source_id: id.into(),
            title: id.into(),
            url: format!("https://{id}.test"),
            tags: vec![],
            date: "2025-07-01 00:00 UTC".into(),
            summary: String::new(),
            diff: None,
        }
    }

    #[test]
    fn prepends_and_caps() {
        let dir = tempfile::tempdir().unwrap();
        let a = Archive::with_capacity(dir.path().join("archive.json"), 3);
        a.append(vec![ev("1"), ev("2")]).unwrap();
        let h = a.append(vec![ev("3"), ev("4")]).unwrap();
        let ids: Vec<_> = h.iter().map(|e| e.source_id.as_str()).collect();
        assert_eq!(ids, vec!["3", "4", "1"]);
        assert_eq!(a.load(), h);
    }

    #[test]
    fn corrupt_file_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("archive.json");
        std::fs::write(&p, "[{]").unwrap();
        let a = Archive::new(&p);
        assert!(a.load().is_empty());
        assert_eq!(a.append(vec![ev("x")]).unwrap().len(), 1);
    }
}
