//! Publication timestamp extraction from post pages.
//!
//! Candidates are collected from every signal the page offers:
//!
//! - `<time datetime="…">`
//! - `<meta property="article:published_time" content="…">`
//! - `itemprop="datePublished"` (`content` or `datetime`)
//! - `datePublished` in JSON-LD, plus the same key in any other inline JSON
//!
//! Each candidate is parsed on its own; unparseable ones are dropped. Values
//! without an offset are read as wall-clock time in the target zone, values
//! with one are converted. The latest valid instant wins, since pages often
//! carry an original publish time next to a modified or "now" time.

use crate::window::localize;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::trace;

static TIME_ELEMENTS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("time[datetime]").expect("valid selector"));
static PUBLISHED_META: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        r#"meta[property="article:published_time"], meta[name="article:published_time"]"#,
    )
    .expect("valid selector")
});
static ITEMPROP_PUBLISHED: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"[itemprop="datePublished"]"#).expect("valid selector"));
static JSON_LD: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).expect("valid selector"));
static INLINE_DATE_PUBLISHED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""datePublished"\s*:\s*"([^"]+)""#).expect("valid regex"));

const ZONED_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S %z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Latest valid publication instant on the page, in `tz`.
pub fn extract(content: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    candidates(content)
        .iter()
        .filter_map(|raw| {
            let parsed = parse(raw, tz);
            if parsed.is_none() {
                trace!(candidate = %raw, "Discarding unparseable timestamp");
            }
            parsed
        })
        .max()
}

/// Every raw timestamp string the page exposes, deduplicated, in document order.
pub fn candidates(content: &str) -> Vec<String> {
    let document = Html::parse_document(content);
    let mut found = Vec::new();

    found.extend(
        document
            .select(&TIME_ELEMENTS)
            .filter_map(|el| el.value().attr("datetime"))
            .map(str::to_string),
    );
    found.extend(
        document
            .select(&PUBLISHED_META)
            .filter_map(|el| el.value().attr("content"))
            .map(str::to_string),
    );
    found.extend(
        document
            .select(&ITEMPROP_PUBLISHED)
            .filter_map(|el| {
                el.value()
                    .attr("content")
                    .or_else(|| el.value().attr("datetime"))
            })
            .map(str::to_string),
    );
    for script in document.select(&JSON_LD) {
        let raw = script.text().collect::<String>();
        if let Ok(value) = serde_json::from_str::<Value>(raw.trim()) {
            collect_date_published(&value, &mut found);
        }
    }
    found.extend(
        INLINE_DATE_PUBLISHED
            .captures_iter(content)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string()),
    );

    found
        .into_iter()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .unique()
        .collect()
}

/// Walk a JSON-LD document, including `@graph` arrays and nested nodes.
fn collect_date_published(value: &Value, found: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, inner) in map {
                if key == "datePublished" {
                    if let Value::String(s) = inner {
                        found.push(s.clone());
                    }
                } else {
                    collect_date_published(inner, found);
                }
            }
        }
        Value::Array(items) => items
            .iter()
            .for_each(|item| collect_date_published(item, found)),
        _ => {}
    }
}

/// Parse one candidate into the target zone.
pub fn parse(raw: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(tz));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(tz));
    }

    let zulu = raw
        .strip_suffix('Z')
        .or_else(|| raw.strip_suffix('z'))
        .map(|rest| format!("{rest}+00:00"));
    let offset_form = zulu.as_deref().unwrap_or(raw);
    if let Some(dt) = ZONED_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(offset_form, fmt).ok())
    {
        return Some(dt.with_timezone(tz));
    }

    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return localize(tz, &naive);
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| localize(tz, &date.and_time(NaiveTime::default())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Berlin;

    #[test]
    fn test_latest_candidate_wins() {
        let html = r#"<article>
            <time datetime="2024-05-01T10:00:00+02:00">10:00</time>
            <time datetime="2024-05-01T18:30:00+02:00">18:30</time>
        </article>"#;
        assert_eq!(
            extract(html, &Berlin),
            Some(Berlin.with_ymd_and_hms(2024, 5, 1, 18, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let html = r#"<meta property="article:published_time" content="2024-05-01T08:15:00Z">"#;
        let first = extract(html, &Berlin);
        assert_eq!(first, extract(html, &Berlin));
        assert_eq!(first, Some(Berlin.with_ymd_and_hms(2024, 5, 1, 10, 15, 0).unwrap()));
    }

    #[test]
    fn test_signals_are_combined() {
        let html = r#"<html><head>
            <meta property="article:published_time" content="2024-05-01T09:00:00+02:00">
            <script type="application/ld+json">
              {"@context":"https://schema.org","@graph":[
                {"@type":"WebPage","name":"x"},
                {"@type":"BlogPosting","datePublished":"2024-05-01T19:45:00+02:00"}]}
            </script></head>
            <body><span itemprop="datePublished" content="2024-05-01T12:00:00+02:00"></span></body></html>"#;
        assert_eq!(
            candidates(html),
            vec![
                "2024-05-01T09:00:00+02:00".to_string(),
                "2024-05-01T12:00:00+02:00".to_string(),
                "2024-05-01T19:45:00+02:00".to_string(),
            ]
        );
        assert_eq!(
            extract(html, &Berlin),
            Some(Berlin.with_ymd_and_hms(2024, 5, 1, 19, 45, 0).unwrap())
        );
    }

    #[test]
    fn test_inline_json_outside_json_ld() {
        let html =
            r#"<script>var ytInitialPlayerResponse = {"microformat":{"datePublished":"2024-05-01T17:02:11-07:00"}};</script>"#;
        assert_eq!(
            extract(html, &Berlin),
            Some(Berlin.with_ymd_and_hms(2024, 5, 2, 2, 2, 11).unwrap())
        );
    }

    #[test]
    fn test_unparseable_candidates_are_dropped() {
        let html =
            r#"<time datetime="yesterday">y</time><time datetime="2024-05-01 07:30">ok</time>"#;
        assert_eq!(
            extract(html, &Berlin),
            Some(Berlin.with_ymd_and_hms(2024, 5, 1, 7, 30, 0).unwrap())
        );
        assert_eq!(extract(r#"<time datetime="soon">s</time>"#, &Berlin), None);
    }

    #[test]
    fn test_no_candidates() {
        assert_eq!(extract("<html><body><p>Hello</p></body></html>", &Berlin), None);
    }

    #[test]
    fn test_naive_values_are_local() {
        assert_eq!(
            parse("2024-05-01T18:30:00", &Berlin),
            Some(Berlin.with_ymd_and_hms(2024, 5, 1, 18, 30, 0).unwrap())
        );
        assert_eq!(
            parse("2024-05-01", &Berlin),
            Some(Berlin.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_zoned_values_are_converted() {
        let expected = Berlin.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap();
        assert_eq!(parse("2024-05-01T16:00:00.000Z", &Berlin), Some(expected));
        assert_eq!(parse("2024-05-01T16:00Z", &Berlin), Some(expected));
        assert_eq!(parse("2024-05-01T18:00:00+0200", &Berlin), Some(expected));
        assert_eq!(parse("Wed, 01 May 2024 16:00:00 +0000", &Berlin), Some(expected));
    }
}
