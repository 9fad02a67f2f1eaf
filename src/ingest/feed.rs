// src/ingest/feed.rs
//! RSS 2.0 / RSS 1.0 (RDF) / Atom parsing into `FeedEntry` values, in document order.

use metrics::{counter, histogram};
use once_cell::sync::Lazy;
use quick_xml::de::from_str;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::{Captures, Regex};
use serde::Deserialize;

use crate::error::{MonitorError, Result};
use crate::ingest::types::FeedEntry;

/// Element text that may carry attributes (`<guid isPermaLink="false">`, `<title type="html">`).
#[derive(Debug, Deserialize)]
struct Text {
    #[serde(rename = "$text", default)]
    value: Option<String>,
}

// --- RSS 2.0 / 1.0 ---

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

/// RSS 1.0 puts `<item>` next to `<channel>`, directly under `<rdf:RDF>`.
#[derive(Debug, Deserialize)]
struct Rdf {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<Text>,
    link: Option<String>,
    guid: Option<Text>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

impl From<RssItem> for FeedEntry {
    fn from(it: RssItem) -> Self {
        FeedEntry {
            id: it.guid.and_then(|g| clean(g.value)),
            title: it.title.and_then(|t| clean(t.value)),
            link: clean(it.link),
            published: clean(it.pub_date),
            summary: clean(it.description),
        }
    }
}

// --- Atom ---

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    id: Option<String>,
    title: Option<Text>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    published: Option<String>,
    updated: Option<String>,
    summary: Option<Text>,
    content: Option<Text>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

impl From<AtomEntry> for FeedEntry {
    fn from(e: AtomEntry) -> Self {
        // rel="alternate" is the default when rel is absent
        let link = e
            .links
            .iter()
            .find(|l| l.rel.as_deref().map_or(true, |r| r == "alternate"))
            .or_else(|| e.links.first())
            .and_then(|l| clean(l.href.clone()));
        FeedEntry {
            id: clean(e.id),
            title: e.title.and_then(|t| clean(t.value)),
            link,
            published: clean(e.published).or_else(|| clean(e.updated)),
            summary: e
                .summary
                .and_then(|t| clean(t.value))
                .or_else(|| e.content.and_then(|t| clean(t.value))),
        }
    }
}

fn clean(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Local name of the document's root element, lowercased.
fn root_name(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Some(String::from_utf8_lossy(e.local_name().as_ref()).to_ascii_lowercase())
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}

/// Parse a feed document. Entries keep the feed's own order (newest-first for most feeds).
pub fn parse_feed(source_id: &str, xml: &str) -> Result<Vec<FeedEntry>> {
    let t0 = std::time::Instant::now();
    let xml = scrub_html_entities_for_xml(xml);

    let entries: Vec<FeedEntry> = match root_name(&xml).as_deref() {
        Some("rss") => from_str::<Rss>(&xml)
            .map(|r| r.channel.items.into_iter().map(FeedEntry::from).collect())
            .map_err(|e| MonitorError::parse(source_id, e))?,
        Some("rdf") => from_str::<Rdf>(&xml)
            .map(|r| r.items.into_iter().map(FeedEntry::from).collect())
            .map_err(|e| MonitorError::parse(source_id, e))?,
        Some("feed") => from_str::<AtomFeed>(&xml)
            .map(|f| f.entries.into_iter().map(FeedEntry::from).collect())
            .map_err(|e| MonitorError::parse(source_id, e))?,
        Some(other) => {
            return Err(MonitorError::parse(
                source_id,
                format!("unsupported feed root element <{other}>"),
            ))
        }
        None => return Err(MonitorError::parse(source_id, "no XML root element")),
    };

    histogram!("monitor_feed_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    counter!("monitor_feed_entries_total").increment(entries.len() as u64);
    Ok(entries)
}

static RE_NAMED_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&([A-Za-z][A-Za-z0-9]{1,31});").expect("entity regex"));

const XML_ENTITIES: &[&str] = &["amp", "lt", "gt", "quot", "apos"];

/// HTML named entities are not valid XML and would make the parser bail.
/// Known ones become numeric references; unknown ones are kept as literal text.
fn scrub_html_entities_for_xml(s: &str) -> String {
    RE_NAMED_ENTITY
        .replace_all(s, |caps: &Captures<'_>| {
            let (whole, name) = (&caps[0], &caps[1]);
            if XML_ENTITIES.contains(&name) {
                return whole.to_string();
            }
            let decoded = html_escape::decode_html_entities(whole);
            if decoded == whole {
                return format!("&amp;{name};");
            }
            decoded.chars().map(|c| format!("&#{};", c as u32)).collect()
        })
        .into_owned()
}
