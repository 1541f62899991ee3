//! "Latest post" link extraction, one module per platform.
//!
//! Every platform follows the same two-step pattern:
//!
//! 1. **Structural**: parse the page and take the first anchor inside the
//!    container the platform renders posts into.
//! 2. **Pattern**: if the DOM lookup finds nothing (the feed did not render,
//!    or the markup changed), regex-search the raw content for the URL shape.
//!
//! Whatever matched is mapped onto the platform's canonical post URL and
//! returned absolute, with the query string stripped.
//!
//! | Type | Module | Canonical form |
//! |------|--------|----------------|
//! | `x` | [`x`] | `https://x.com/<user>/status/<id>` |
//! | `instagram` | [`instagram`] | `https://www.instagram.com/p/<id>/` |
//! | `tiktok` | [`tiktok`] | `https://www.tiktok.com/@<user>/video/<id>` |
//! | `linkedin` | [`linkedin`] | `https://www.linkedin.com/feed/update/urn:li:activity:<id>/` |
//! | `youtube_shorts` | [`youtube`] | `https://www.youtube.com/shorts/<id>` |
//! | `blog` | [`blog`] | first article link, resolved against the listing page |

pub mod blog;
pub mod instagram;
pub mod linkedin;
pub mod tiktok;
pub mod x;
pub mod youtube;

use crate::models::SourceType;
use regex::Regex;
use scraper::{Html, Selector};
use std::fmt;
use url::Url;

/// How a link was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOrigin {
    Structural,
    Pattern,
}

impl fmt::Display for LinkOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkOrigin::Structural => f.write_str("structural"),
            LinkOrigin::Pattern => f.write_str("pattern"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestLink {
    pub url: String,
    pub origin: LinkOrigin,
}

/// Locate the most recent post on a profile or listing page.
///
/// `page_url` is the address the content was loaded from; blogs resolve
/// relative links against it.
pub fn latest_link(kind: SourceType, content: &str, page_url: &Url) -> Option<LatestLink> {
    match kind {
        SourceType::X => x::latest_link(content),
        SourceType::Instagram => instagram::latest_link(content),
        SourceType::TikTok => tiktok::latest_link(content),
        SourceType::LinkedIn => linkedin::latest_link(content),
        SourceType::YoutubeShorts => youtube::latest_link(content),
        SourceType::Blog => blog::latest_link(content, page_url),
    }
}

/// Maps a raw href onto the platform's canonical post reference.
pub(crate) type Canon = fn(&str) -> Option<String>;

/// Structural lookup first, then each raw pattern in turn.
pub(crate) fn structural_then_pattern(
    content: &str,
    container: &Selector,
    patterns: &[&Regex],
    base: &Url,
    canon: Canon,
) -> Option<LatestLink> {
    if let Some(url) = first_structural(content, container, base, canon) {
        return Some(LatestLink {
            url,
            origin: LinkOrigin::Structural,
        });
    }
    patterns
        .iter()
        .find_map(|re| first_pattern(content, re, base, canon))
        .map(|url| LatestLink {
            url,
            origin: LinkOrigin::Pattern,
        })
}

fn first_structural(
    content: &str,
    container: &Selector,
    base: &Url,
    canon: Canon,
) -> Option<String> {
    let document = Html::parse_document(content);
    document
        .select(container)
        .filter_map(|el| el.value().attr("href"))
        .find_map(|href| absolutize(base, &canon(href)?))
}

/// Capture group 1 of `pattern` carries the href.
fn first_pattern(content: &str, pattern: &Regex, base: &Url, canon: Canon) -> Option<String> {
    pattern
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .find_map(|m| {
            let href = m.as_str().replace("&amp;", "&");
            absolutize(base, &canon(&href)?)
        })
}

/// Resolve against `base`, keep only http(s), drop the query string.
pub(crate) fn absolutize(base: &Url, href: &str) -> Option<String> {
    let mut url = base.join(href.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_query(None);
    Some(url.into())
}

/// First match of `shape` inside `href`.
pub(crate) fn shape(re: &Regex, href: &str) -> Option<String> {
    re.find(href).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(url: &str) -> Url {
        Url::parse(url).unwrap()
    }

    #[test]
    fn test_dispatch_x_spec_example() {
        let content = r#"<div><a href="/utradetoken/status/12345?s=20">tweet</a></div>"#;
        let link = latest_link(SourceType::X, content, &page("https://x.com/utradetoken")).unwrap();
        assert_eq!(link.url, "https://x.com/utradetoken/status/12345");
        assert_eq!(link.origin, LinkOrigin::Pattern);
    }

    #[test]
    fn test_dispatch_returns_none_on_empty_page() {
        let base = page("https://example.com/");
        for kind in [
            SourceType::X,
            SourceType::Instagram,
            SourceType::TikTok,
            SourceType::LinkedIn,
            SourceType::YoutubeShorts,
            SourceType::Blog,
        ] {
            assert!(latest_link(kind, "<html><body><p>nothing</p></body></html>", &base).is_none());
        }
    }

    #[test]
    fn test_absolutize_strips_query_and_rejects_other_schemes() {
        let base = page("https://blog.example/posts/");
        assert_eq!(
            absolutize(&base, "2024/05/hello?utm_source=x").as_deref(),
            Some("https://blog.example/posts/2024/05/hello")
        );
        assert_eq!(absolutize(&base, "mailto:someone@example.com"), None);
        assert_eq!(absolutize(&base, "javascript:void(0)"), None);
    }
}
