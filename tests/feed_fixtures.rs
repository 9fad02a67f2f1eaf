// tests/feed_fixtures.rs
use change_radar::ingest::parse_feed;

const BLOG_RSS: &str = include_str!("fixtures/blog_rss.xml");
const CHANGELOG_ATOM: &str = include_str!("fixtures/changelog_atom.xml");

#[test]
fn rss_fixture_parses_in_document_order() {
    let entries = parse_feed("dev-blog", BLOG_RSS).expect("rss parse ok");
    assert_eq!(entries.len(), 3);

    let first = &entries[0];
    assert_eq!(first.identifier(), "post-3003");
    assert_eq!(first.title.as_deref(), Some("Marketing API v202507 released"));
    assert_eq!(first.link.as_deref(), Some("https://dev.example.com/blog/v202507"));
    assert_eq!(first.published.as_deref(), Some("Tue, 01 Jul 2025 09:00:00 GMT"));
    assert!(first.summary.as_deref().unwrap().contains("<b>carousel</b>"));

    assert!(entries[1].summary.as_deref().unwrap().ends_with('\u{2026}'));
    // No guid: the link identifies the entry
    assert_eq!(entries[2].identifier(), "https://dev.example.com/blog/rate-limits");
}

#[test]
fn atom_fixture_uses_alternate_links() {
    let entries = parse_feed("ads-changelog", CHANGELOG_ATOM).expect("atom parse ok");
    assert_eq!(entries.len(), 2);

    assert_eq!(entries[0].identifier(), "tag:ads.example.com,2025:v19-1");
    assert_eq!(entries[0].published.as_deref(), Some("2025-07-02T10:00:00Z"));
    assert!(entries[0].summary.as_deref().unwrap().contains("Performance Max"));

    let sunset = &entries[1];
    assert_eq!(sunset.link.as_deref(), Some("https://ads.example.com/changelog/v16-sunset"));
    assert_eq!(sunset.published.as_deref(), Some("2025-06-20T12:00:00Z"));
    assert_eq!(sunset.summary.as_deref(), Some("v16 stops serving on 2025-09-30."));
}

#[test]
fn rss_one_dot_oh_items_sit_beside_the_channel() {
    let xml = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns="http://purl.org/rss/1.0/">
  <channel><title>Old school</title></channel>
  <item><title>One</title><link>https://old.test/1</link><description>first</description></item>
  <item><title>Two</title><link>https://old.test/2</link></item>
</rdf:RDF>"#;
    let entries = parse_feed("old", xml).expect("rdf parse ok");
    let links: Vec<String> = entries.iter().map(|e| e.identifier()).collect();
    assert_eq!(links, vec!["https://old.test/1", "https://old.test/2"]);
}

#[test]
fn truncated_document_is_a_parse_error() {
    let cut = &BLOG_RSS[..BLOG_RSS.len() / 2];
    let err = parse_feed("dev-blog", cut).unwrap_err();
    assert!(err.to_string().contains("dev-blog"), "{err}");
}
