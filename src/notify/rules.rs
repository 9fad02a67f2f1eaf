// src/notify/rules.rs
//! Lightweight heuristics that turn a change event into next-step hints.

const HINT_LINKEDIN_API: &str =
    "• Check which LinkedIn Marketing API version is in use; plan a migration if a sunset date is announced.";
const HINT_INSTAGRAM_VIEWS: &str =
    "• Update internal dashboards to use 'Views' instead of 'Impressions/Plays' where available.";
const HINT_PRODUCT_UPDATES: &str =
    "• Review new features that may affect the content mix (Reels, Live, Carousels, Thought Leader Ads…).";
const HINT_DEFAULT: &str =
    "• Assess the impact on reach/engagement over the 7-14 days after the change.";

fn has_tag(tags: &[String], want: &str) -> bool {
    tags.iter().any(|t| t.trim().eq_ignore_ascii_case(want))
}

/// One hint per line; never empty.
pub fn recommend(tags: &[String], title: &str, summary: &str) -> String {
    let mut out = Vec::new();
    let summary_lc = summary.to_lowercase();

    if has_tag(tags, "linkedin") && title.to_uppercase().contains("API") {
        out.push(HINT_LINKEDIN_API);
    }
    if has_tag(tags, "instagram")
        && (summary_lc.contains("metric") || summary_lc.contains("views"))
    {
        out.push(HINT_INSTAGRAM_VIEWS);
    }
    if title.to_lowercase().contains("product updates") {
        out.push(HINT_PRODUCT_UPDATES);
    }
    if out.is_empty() {
        out.push(HINT_DEFAULT);
    }
    out.join("\n")
}
