// src/ingest/extract.rs
//! Deterministic HTML → plain text: one line per visible text node, blank lines dropped.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::ingest::types::Fetched;

/// Never rendered; skipped in every mode.
const NON_RENDERED: &[&str] = &["script", "style", "noscript", "template"];

/// Additionally skipped inside a main-content container.
const CHROME: &[&str] = &[
    "script", "style", "noscript", "template", "nav", "header", "footer", "aside", "form",
];

static MAIN_CANDIDATES: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["article", "main", r#"[role="main"]"#]
        .iter()
        .map(|s| Selector::parse(s).expect("main-content selector"))
        .collect()
});

static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").expect("body selector"));

/// Extract the main readable text of a page, falling back to the whole body.
pub fn extract_main_text(html: &str) -> String {
    let doc = Html::parse_document(html);

    for sel in MAIN_CANDIDATES.iter() {
        for el in doc.select(sel) {
            let lines = lines_of(el, CHROME);
            if !lines.is_empty() {
                return lines.join("\n");
            }
        }
    }

    let root = doc.select(&BODY).next().unwrap_or_else(|| doc.root_element());
    lines_of(root, NON_RENDERED).join("\n")
}

/// Normalize a fetched page: HTML goes through extraction, anything else only
/// gets line-level whitespace compaction.
pub fn normalize_content(fetched: &Fetched) -> String {
    let ct = fetched.content_type.to_ascii_lowercase();
    if ct.is_empty() || ct.contains("html") {
        extract_main_text(&fetched.body)
    } else {
        let mut out = Vec::new();
        for line in fetched.body.lines() {
            push_line(line, &mut out);
        }
        out.join("\n")
    }
}

fn lines_of(el: ElementRef<'_>, skip: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    collect_lines(el, skip, &mut out);
    out
}

fn collect_lines(el: ElementRef<'_>, skip: &[&str], out: &mut Vec<String>) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            for line in text.lines() {
                push_line(line, out);
            }
        } else if let Some(child_el) = ElementRef::wrap(child) {
            if !skip.contains(&child_el.value().name()) {
                collect_lines(child_el, skip, out);
            }
        }
    }
}

fn push_line(raw: &str, out: &mut Vec<String>) {
    let line = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if !line.is_empty() {
        out.push(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_scripts_and_blank_lines() {
        let html = r#"<html><head><style>p{}</style></head><body>
            <p>Hello</p>
            <script>var x = 1;</script>
            <noscript>enable js</noscript>
            <p>   World   again </p>
        </body></html>"#;
        assert_eq!(extract_main_text(html), "Hello\nWorld again");
    }

    #[test]
    fn prefers_article_and_skips_chrome_inside_it() {
        let html = r#"<body>
            <nav>Home | About</nav>
            <article><header>Byline</header><h1>Title</h1><p>Body text</p></article>
            <footer>(c) 2025</footer>
        </body>"#;
        assert_eq!(extract_main_text(html), "Title\nBody text");
    }

    #[test]
    fn empty_main_falls_back_to_body() {
        let html = "<body><main><script>x()</script></main><div>Only this</div></body>";
        assert_eq!(extract_main_text(html), "Only this");
    }

    #[test]
    fn extraction_is_deterministic() {
        let html = "<body><div>a</div><div>b <i>c</i></div></body>";
        assert_eq!(extract_main_text(html), extract_main_text(html));
        assert_eq!(extract_main_text(html), "a\nb\nc");
    }

    #[test]
    fn plain_text_is_only_compacted() {
        let f = Fetched::new("  one \n\n\t two  three \n", "text/plain; charset=utf-8");
        assert_eq!(normalize_content(&f), "one\ntwo three");
    }
}
