// src/dashboard.rs
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

use crate::error::Result;
use crate::event::ChangeEvent;

/// The dashboard shows at most this many of the newest events.
pub const DASHBOARD_EVENTS: usize = 40;
pub const DASHBOARD_FILE: &str = "index.html";

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:960px;margin:2rem auto;padding:0 1rem;color:#222}\
article{border-bottom:1px solid #ddd;padding:.8rem 0}\
.meta{color:#666;font-size:.85rem}\
.tag{background:#eef;border-radius:3px;padding:0 .35rem;margin-right:.3rem}\
pre{background:#f7f7f7;overflow-x:auto;font-size:.8rem;padding:.5rem}";

/// Render a static page from the newest events (input is newest-first).
pub fn render_dashboard(events: &[ChangeEvent], generated_at: &str) -> String {
    let mut html = String::with_capacity(8 * 1024);
    html.push_str("<!doctype html>\n<html><head><meta charset=\"utf-8\">");
    html.push_str("<title>Change Radar</title>");
    let _ = write!(html, "<style>{STYLE}</style></head>\n<body>\n<h1>Change Radar</h1>\n");
    let _ = writeln!(
        html,
        "<p class=\"meta\">Generated at {}</p>",
        text(generated_at)
    );

    let shown = &events[..events.len().min(DASHBOARD_EVENTS)];
    if shown.is_empty() {
        html.push_str("<p>No changes recorded yet.</p>\n");
    }
    for ev in shown {
        html.push_str("<article>\n");
        let _ = writeln!(
            html,
            "<h3><a href=\"{}\">{}</a></h3>",
            attr(&ev.url),
            text(&ev.title)
        );
        let _ = write!(
            html,
            "<div class=\"meta\">{} · {}",
            text(&ev.date),
            text(&ev.source_id)
        );
        for tag in &ev.tags {
            let _ = write!(html, " <span class=\"tag\">{}</span>", text(tag));
        }
        html.push_str("</div>\n");
        if !ev.summary.is_empty() {
            let _ = writeln!(html, "<p>{}</p>", text(&ev.summary));
        }
        if let Some(diff) = ev.diff.as_deref().filter(|d| !d.is_empty()) {
            let _ = writeln!(
                html,
                "<details><summary>Diff</summary><pre>{}</pre></details>",
                text(diff)
            );
        }
        html.push_str("</article>\n");
    }

    html.push_str("</body></html>\n");
    html
}

/// Write `<dir>/index.html` and return its path.
pub fn write_dashboard(dir: &Path, events: &[ChangeEvent], generated_at: &str) -> Result<PathBuf> {
    let path = dir.join(DASHBOARD_FILE);
    crate::state::write_atomic(&path, render_dashboard(events, generated_at).as_bytes())?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(i: usize) -> ChangeEvent {
        ChangeEvent {
            source_id: format!("s{i}"),
            title: format!("Event <{i}>"),
            url: format!("https://e.test/{i}?a=1&b=\"2\""),
            tags: vec!["meta".into()],
            date: "2025-07-01 00:00 UTC".into(),
            summary: "a & b".into(),
            diff: Some("-old\n+<new>".into()),
        }
    }

    #[test]
    fn escapes_dynamic_text() {
        let html = render_dashboard(&[ev(1)], "now");
        assert!(html.contains("Event &lt;1&gt;"));
        assert!(html.contains("a &amp; b"));
        assert!(html.contains("+&lt;new&gt;"));
        assert!(!html.contains("b=\"2\""));
    }

    #[test]
    fn shows_at_most_forty_events() {
        let events: Vec<_> = (0..50).map(ev).collect();
        let html = render_dashboard(&events, "now");
        assert_eq!(html.matches("<article>").count(), DASHBOARD_EVENTS);
        assert!(html.contains("s39"));
        assert!(!html.contains("e.test/40?"));
    }

    #[test]
    fn empty_history_renders_placeholder() {
        assert!(render_dashboard(&[], "now").contains("No changes recorded yet."));
    }
}
