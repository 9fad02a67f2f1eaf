// src/ingest/mod.rs
pub mod extract;
pub mod feed;
pub mod fetch;
pub mod types;

use once_cell::sync::OnceCell;
use regex::Regex;

pub use extract::{extract_main_text, normalize_content};
pub use feed::parse_feed;
pub use fetch::HttpFetcher;
pub use types::{FeedEntry, Fetched, Fetcher};

/// Maximum length (in chars) of an event summary.
pub const SUMMARY_MAX_CHARS: usize = 500;

/// Normalize inline feed HTML: decode entities, strip tags, collapse whitespace, trim.
pub fn normalize_text(s: &str) -> String {
    // 1) Strip HTML tags (before decoding, so `&lt;b&gt;` survives as text)
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)<[^>]*>").expect("tag regex"));
    let out = re_tags.replace_all(s, " ");

    // 2) HTML entity decode
    let out = html_escape::decode_html_entities(&out);

    // 3) Collapse whitespace (incl. NBSP)
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"[\s\u{00A0}]+").expect("ws regex"));
    re_ws.replace_all(&out, " ").trim().to_string()
}

/// Truncate to at most `max` chars, never splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
