//! X (Twitter) profile pages.
//!
//! Tweets render as `article[data-testid="tweet"]`; the permalink is the
//! anchor pointing at `/<user>/status/<id>`. Photo and analytics sub-links
//! share the prefix and are cut back to the status URL.

use super::{LatestLink, shape, structural_then_pattern};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;
use url::Url;

static BASE: Lazy<Url> = Lazy::new(|| Url::parse("https://x.com/").expect("valid base url"));
static TWEET_LINKS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"article[data-testid="tweet"] a[href*="/status/"]"#).expect("valid selector")
});
static STATUS_HREF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)href="(/[^"/]+/status/\d+)"#).expect("valid regex"));
static STATUS_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/[A-Za-z0-9_]+/status/\d+").expect("valid regex"));

/// Latest status on an X profile timeline.
pub fn latest_link(content: &str) -> Option<LatestLink> {
    structural_then_pattern(content, &TWEET_LINKS, &[&STATUS_HREF], &BASE, canonical)
}

fn canonical(href: &str) -> Option<String> {
    shape(&STATUS_SHAPE, href)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::LinkOrigin;

    #[test]
    fn test_first_tweet_article_wins() {
        let html = r#"<html><body>
            <article data-testid="tweet">
              <a href="/utradetoken">@utradetoken</a>
              <a href="/utradetoken/status/222/photo/1">photo</a>
            </article>
            <article data-testid="tweet"><a href="/utradetoken/status/111">older</a></article>
        </body></html>"#;
        let link = latest_link(html).unwrap();
        assert_eq!(link.url, "https://x.com/utradetoken/status/222");
        assert_eq!(link.origin, LinkOrigin::Structural);
    }

    #[test]
    fn test_twitter_host_is_canonicalized() {
        let html = r#"<article data-testid="tweet">
            <a href="https://twitter.com/utradetoken/status/333?ref=abc">t</a></article>"#;
        assert_eq!(latest_link(html).unwrap().url, "https://x.com/utradetoken/status/333");
    }

    #[test]
    fn test_pattern_fallback_outside_articles() {
        let html =
            r#"<script>var x = 1;</script><a class="css-1" href="/utradetoken/status/12345?s=20">x</a>"#;
        let link = latest_link(html).unwrap();
        assert_eq!(link.url, "https://x.com/utradetoken/status/12345");
        assert_eq!(link.origin, LinkOrigin::Pattern);
    }

    #[test]
    fn test_login_wall_has_no_link() {
        let html = r#"<a href="/i/flow/login">Log in</a><a href="/signup">Sign up</a>"#;
        assert!(latest_link(html).is_none());
    }
}
