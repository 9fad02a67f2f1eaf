// src/config/sources.rs
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{MonitorError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[serde(rename = "rss", alias = "feed", alias = "atom")]
    Feed,
    Page,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Feed => "feed",
            SourceKind::Page => "page",
        }
    }
}

/// One configured feed or page to monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SourceConfig {
    /// Display title: configured name, else URL.
    pub fn title(&self) -> &str {
        match self.name.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => n,
            _ => &self.url,
        }
    }
}

#[derive(Deserialize)]
struct SourcesFile {
    #[serde(default)]
    sources: Vec<SourceConfig>,
}

/// Load and validate the source list. Any failure here is fatal for the run.
pub fn load_sources_from(path: &Path) -> Result<Vec<SourceConfig>> {
    let content = fs::read_to_string(path).map_err(|e| {
        MonitorError::config(format!("reading sources from {}: {e}", path.display()))
    })?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let sources = parse_sources(&content, ext.as_str())?;
    validate(&sources)?;
    Ok(sources)
}

fn parse_sources(s: &str, hint_ext: &str) -> Result<Vec<SourceConfig>> {
    let try_toml_first = hint_ext == "toml" || (hint_ext != "json" && s.contains("[[sources]]"));
    if try_toml_first {
        return parse_toml(s).or_else(|toml_err| parse_json(s).map_err(|_| toml_err));
    }
    parse_json(s).or_else(|json_err| parse_toml(s).map_err(|_| json_err))
}

fn parse_toml(s: &str) -> Result<Vec<SourceConfig>> {
    let v: SourcesFile =
        toml::from_str(s).map_err(|e| MonitorError::config(format!("sources TOML: {e}")))?;
    Ok(v.sources)
}

fn parse_json(s: &str) -> Result<Vec<SourceConfig>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum JsonSources {
        Wrapped(SourcesFile),
        Bare(Vec<SourceConfig>),
    }
    let v: JsonSources =
        serde_json::from_str(s).map_err(|e| MonitorError::config(format!("sources JSON: {e}")))?;
    Ok(match v {
        JsonSources::Wrapped(f) => f.sources,
        JsonSources::Bare(list) => list,
    })
}

fn validate(sources: &[SourceConfig]) -> Result<()> {
    let mut seen = HashSet::new();
    for s in sources {
        if s.id.trim().is_empty() {
            return Err(MonitorError::config("source with empty id"));
        }
        if s.url.trim().is_empty() {
            return Err(MonitorError::config(format!("source {} has empty url", s.id)));
        }
        if !seen.insert(s.id.as_str()) {
            return Err(MonitorError::config(format!("duplicate source id {}", s.id)));
        }
    }
    Ok(())
}
