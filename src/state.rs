// src/state.rs
//! Per-source state persisted between runs: recently seen feed entry ids and the
//! last page snapshot. Loaded once at run start, saved once at run end.

use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{MonitorError, Result};

/// How many feed entry ids are retained per source.
pub const SEEN_IDS_CAPACITY: usize = 100;

pub const FEED_STATE_FILE: &str = "rss_state.json";
pub const PAGE_STATE_FILE: &str = "page_state.json";

/// Insertion-ordered FIFO of entry ids with a fixed capacity. Pushing into a
/// full set evicts the oldest insertion first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenIds {
    ids: VecDeque<String>,
    capacity: usize,
}

impl Default for SeenIds {
    fn default() -> Self {
        Self::with_capacity(SEEN_IDS_CAPACITY)
    }
}

impl SeenIds {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
        }
    }

    /// Build from a persisted list, keeping only its most recent `capacity` ids.
    pub fn from_vec(ids: Vec<String>, capacity: usize) -> Self {
        let mut out = Self::with_capacity(capacity);
        let skip = ids.len().saturating_sub(out.capacity);
        out.ids.extend(ids.into_iter().skip(skip));
        out
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|s| s == id)
    }

    /// Append `id`, returning the evicted id when the set was full.
    pub fn push(&mut self, id: impl Into<String>) -> Option<String> {
        self.ids.push_back(id.into());
        if self.ids.len() > self.capacity {
            self.ids.pop_front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

impl Serialize for SeenIds {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.ids.iter())
    }
}

impl<'de> Deserialize<'de> for SeenIds {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let ids = Vec::<String>::deserialize(deserializer)?;
        Ok(SeenIds::from_vec(ids, SEEN_IDS_CAPACITY))
    }
}

/// Last observed fingerprint and full normalized text of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub hash: String,
    pub text: String,
}

pub type FeedState = BTreeMap<String, SeenIds>;
pub type PageState = BTreeMap<String, PageSnapshot>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorState {
    pub feeds: FeedState,
    pub pages: PageState,
}

/// JSON-file backed store: one file for feed state and one for page state.
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn feed_path(&self) -> PathBuf {
        self.dir.join(FEED_STATE_FILE)
    }

    pub fn page_path(&self) -> PathBuf {
        self.dir.join(PAGE_STATE_FILE)
    }

    /// Never fails: missing files give empty state, corrupt ones are logged and reset.
    pub fn load(&self) -> MonitorState {
        MonitorState {
            feeds: load_json_or_default(&self.feed_path()),
            pages: load_json_or_default(&self.page_path()),
        }
    }

    /// Full overwrite of both files.
    pub fn save(&self, state: &MonitorState) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        write_json_atomic(&self.feed_path(), &state.feeds)?;
        write_json_atomic(&self.page_path(), &state.pages)?;
        tracing::debug!(
            dir = %self.dir.display(),
            feeds = state.feeds.len(),
            pages = state.pages.len(),
            "state saved"
        );
        Ok(())
    }
}

/// Read a JSON file; missing → default, unreadable/invalid → logged default.
pub(crate) fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    let raw = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return T::default(),
        Err(e) => {
            let err = MonitorError::corruption(path, e);
            tracing::warn!(error = %err, "starting fresh");
            return T::default();
        }
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        let err = MonitorError::corruption(path, e);
        tracing::warn!(error = %err, "starting fresh");
        T::default()
    })
}

/// Pretty JSON written to a temp file, then renamed over the target.
pub(crate) fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    write_atomic(path, &bytes)
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seen_ids_evicts_oldest_first() {
        let mut s = SeenIds::with_capacity(3);
        for id in ["a", "b", "c"] {
            assert_eq!(s.push(id), None);
        }
        assert_eq!(s.push("d"), Some("a".to_string()));
        assert_eq!(s.iter().collect::<Vec<_>>(), vec!["b", "c", "d"]);
        assert!(!s.contains("a"));
        assert!(s.contains("d"));
    }

    #[test]
    fn oversized_persisted_list_keeps_the_tail() {
        let ids: Vec<String> = (0..150).map(|i| format!("id-{i}")).collect();
        let s = SeenIds::from_vec(ids, SEEN_IDS_CAPACITY);
        assert_eq!(s.len(), 100);
        assert_eq!(s.iter().next(), Some("id-50"));
    }

    #[test]
    fn seen_ids_serializes_as_plain_array() {
        let mut s = SeenIds::default();
        s.push("x");
        s.push("y");
        assert_eq!(serde_json::to_string(&s).unwrap(), r#"["x","y"]"#);
        let back: SeenIds = serde_json::from_str(r#"["x","y"]"#).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn store_roundtrip_and_isolated_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("state"));
        assert_eq!(store.load(), MonitorState::default());

        let mut st = MonitorState::default();
        st.feeds.entry("f".into()).or_default().push("e1");
        st.pages.insert(
            "p".into(),
            PageSnapshot {
                hash: "h".into(),
                text: "t".into(),
            },
        );
        store.save(&st).unwrap();
        assert_eq!(store.load(), st);

        std::fs::write(store.page_path(), "{ not json").unwrap();
        let loaded = store.load();
        assert!(loaded.pages.is_empty());
        assert_eq!(loaded.feeds, st.feeds);
    }
}
