//! Instagram profile grids: posts under `/p/<code>/`, reels under `/reel/<code>/`.

use super::{LatestLink, shape, structural_then_pattern};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;
use url::Url;

static BASE: Lazy<Url> =
    Lazy::new(|| Url::parse("https://www.instagram.com/").expect("valid base url"));
static POST_LINKS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"a[href*="/p/"], a[href*="/reel/"]"#).expect("valid selector")
});
static POST_HREF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)href="(/(?:p|reel)/[^"/]+/?)""#).expect("valid regex"));
static POST_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/(?:p|reel)/[A-Za-z0-9_-]+").expect("valid regex"));

/// Latest post or reel on an Instagram profile.
pub fn latest_link(content: &str) -> Option<LatestLink> {
    structural_then_pattern(content, &POST_LINKS, &[&POST_HREF], &BASE, canonical)
}

fn canonical(href: &str) -> Option<String> {
    shape(&POST_SHAPE, href).map(|path| format!("{path}/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::LinkOrigin;

    #[test]
    fn test_grid_link() {
        let html = r#"<main><div><a href="/utradetoken/">profile</a>
            <a href="/reel/C6abc_12-x/?img_index=1">reel</a>
            <a href="/p/C5zzz/">post</a></div></main>"#;
        let link = latest_link(html).unwrap();
        assert_eq!(link.url, "https://www.instagram.com/reel/C6abc_12-x/");
        assert_eq!(link.origin, LinkOrigin::Structural);
    }

    #[test]
    fn test_username_prefixed_paths() {
        let html = r#"<a href="/utradetoken/p/C7xyz/">post</a>"#;
        assert_eq!(latest_link(html).unwrap().url, "https://www.instagram.com/p/C7xyz/");
    }

    #[test]
    fn test_pattern_fallback() {
        // custom elements are invisible to the anchor selector
        let html = r#"<template><x-a href="/p/C9qrs/"></x-a></template>"#;
        let link = latest_link(html).unwrap();
        assert_eq!(link.url, "https://www.instagram.com/p/C9qrs/");
        assert_eq!(link.origin, LinkOrigin::Pattern);
    }
}
