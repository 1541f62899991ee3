//! LinkedIn company pages.
//!
//! Posts are identified by an activity URN, which shows up in feed-update
//! links either plain or percent-encoded (`urn%3Ali%3Aactivity%3A…`).

use super::{LatestLink, structural_then_pattern};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;
use url::Url;

static BASE: Lazy<Url> =
    Lazy::new(|| Url::parse("https://www.linkedin.com/").expect("valid base url"));
static ACTIVITY_LINKS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"a[href*="urn:li:activity"], a[href*="/feed/update/"]"#)
        .expect("valid selector")
});
static ACTIVITY_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(https://www\.linkedin\.com/feed/update/urn:li:activity:\d+)")
        .expect("valid regex")
});
static ACTIVITY_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)urn:li:activity:(\d+)").expect("valid regex"));

/// Latest activity on a LinkedIn company page.
pub fn latest_link(content: &str) -> Option<LatestLink> {
    structural_then_pattern(content, &ACTIVITY_LINKS, &[&ACTIVITY_URL], &BASE, canonical)
}

fn canonical(href: &str) -> Option<String> {
    let decoded = urlencoding::decode(href).ok()?;
    let id = ACTIVITY_ID.captures(&decoded)?.get(1)?.as_str().to_string();
    Some(format!("/feed/update/urn:li:activity:{id}/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::LinkOrigin;

    #[test]
    fn test_feed_update_link() {
        let html =
            r#"<a href="https://www.linkedin.com/feed/update/urn:li:activity:7190000000000000000/?trk=x">p</a>"#;
        let link = latest_link(html).unwrap();
        assert_eq!(
            link.url,
            "https://www.linkedin.com/feed/update/urn:li:activity:7190000000000000000/"
        );
        assert_eq!(link.origin, LinkOrigin::Structural);
    }

    #[test]
    fn test_percent_encoded_urn() {
        let html = r#"<a href="/feed/update/urn%3Ali%3Aactivity%3A123456/">p</a>"#;
        assert_eq!(
            latest_link(html).unwrap().url,
            "https://www.linkedin.com/feed/update/urn:li:activity:123456/"
        );
    }

    #[test]
    fn test_pattern_fallback_in_embedded_json() {
        let html =
            r#"<code>{"permalink":"https://www.linkedin.com/feed/update/urn:li:activity:99"}</code>"#;
        let link = latest_link(html).unwrap();
        assert_eq!(link.url, "https://www.linkedin.com/feed/update/urn:li:activity:99/");
        assert_eq!(link.origin, LinkOrigin::Pattern);
    }
}
