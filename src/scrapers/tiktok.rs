//! TikTok profiles: videos live at `/@<user>/video/<id>`.

use super::{LatestLink, shape, structural_then_pattern};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;
use url::Url;

static BASE: Lazy<Url> =
    Lazy::new(|| Url::parse("https://www.tiktok.com/").expect("valid base url"));
static VIDEO_LINKS: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href*="/video/"]"#).expect("valid selector"));
static VIDEO_HREF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)href="((?:https://www\.tiktok\.com)?/@[^"/]+/video/\d+)"#)
        .expect("valid regex")
});
static VIDEO_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/@[A-Za-z0-9_.-]+/video/\d+").expect("valid regex"));

/// Latest video on a TikTok profile.
pub fn latest_link(content: &str) -> Option<LatestLink> {
    structural_then_pattern(content, &VIDEO_LINKS, &[&VIDEO_HREF], &BASE, canonical)
}

fn canonical(href: &str) -> Option<String> {
    shape(&VIDEO_SHAPE, href)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::LinkOrigin;

    #[test]
    fn test_absolute_video_link() {
        let html = r#"<div data-e2e="user-post-item">
            <a href="https://www.tiktok.com/@utradetoken/video/7360000000000000001?lang=de">v</a></div>"#;
        let link = latest_link(html).unwrap();
        assert_eq!(link.url, "https://www.tiktok.com/@utradetoken/video/7360000000000000001");
        assert_eq!(link.origin, LinkOrigin::Structural);
    }

    #[test]
    fn test_relative_video_link() {
        let html = r#"<a href="/@u.trade_token/video/42">v</a>"#;
        assert_eq!(
            latest_link(html).unwrap().url,
            "https://www.tiktok.com/@u.trade_token/video/42"
        );
    }

    #[test]
    fn test_non_video_links_are_ignored() {
        let html = r#"<a href="/@utradetoken/video/">empty id</a><a href="/music/abc">m</a>"#;
        assert!(latest_link(html).is_none());
    }
}
