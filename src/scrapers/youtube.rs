//! YouTube Shorts tabs (`/@channel/shorts`).
//!
//! The mobile site server-renders little markup; the shorts list mostly
//! lives in the embedded `ytInitialData` JSON, so the pattern step also looks
//! for quoted `"/shorts/<id>"` strings.

use super::{LatestLink, shape, structural_then_pattern};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;
use url::Url;

static BASE: Lazy<Url> =
    Lazy::new(|| Url::parse("https://www.youtube.com/").expect("valid base url"));
static SHORTS_LINKS: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href^="/shorts/"]"#).expect("valid selector"));
static SHORTS_HREF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)href="(/shorts/[^"?]+)"#).expect("valid regex"));
static SHORTS_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""(/shorts/[A-Za-z0-9_-]+)""#).expect("valid regex"));
static SHORTS_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/shorts/[A-Za-z0-9_-]+").expect("valid regex"));

/// Latest short on a YouTube channel's shorts tab.
pub fn latest_link(content: &str) -> Option<LatestLink> {
    structural_then_pattern(
        content,
        &SHORTS_LINKS,
        &[&SHORTS_HREF, &SHORTS_JSON],
        &BASE,
        canonical,
    )
}

fn canonical(href: &str) -> Option<String> {
    shape(&SHORTS_SHAPE, href)
}
