//! Generic blog listings.
//!
//! The first anchor inside an `<article>` is taken as the newest post. When
//! the theme does not use `<article>`, any link with a `/YYYY/` path segment
//! is the next best guess. Links resolve against the listing page URL.

use super::{LatestLink, structural_then_pattern};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;
use url::Url;

static ARTICLE_LINKS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article a[href]").expect("valid selector"));
static ARTICLE_ANCHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<article\b.*?<a\b[^>]*?\bhref="([^"]+)""#).expect("valid regex")
});
static YEAR_HREF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)href="([^"]*/(?:19|20)\d{2}/[^"]*)""#).expect("valid regex")
});

/// First article link on a blog listing, resolved against `page_url`.
pub fn latest_link(content: &str, page_url: &Url) -> Option<LatestLink> {
    structural_then_pattern(
        content,
        &ARTICLE_LINKS,
        &[&ARTICLE_ANCHOR, &YEAR_HREF],
        page_url,
        canonical,
    )
}

/// Any real link; in-page anchors are skipped.
fn canonical(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    Some(href.to_string())
}
