//! Data models shared by the checker and the report writer.
//!
//! - [`SourceType`] / [`SourceSpec`]: the configured accounts to monitor
//! - [`CheckStatus`] / [`CheckResult`]: the outcome of checking one source
//! - [`StatusReport`] / [`SourceEntry`]: the serialized status snapshot
//!
//! A [`CheckResult`] can only become [`CheckStatus::OnTime`] through
//! [`CheckResult::published`], which runs the window classification, so an
//! on-time result always carries both a post URL and a publish instant.

use crate::window::TimeWindow;
use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of platform a source lives on. Selects the link extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    X,
    Instagram,
    #[serde(rename = "tiktok")]
    TikTok,
    #[serde(rename = "linkedin")]
    LinkedIn,
    YoutubeShorts,
    Blog,
}

impl SourceType {
    /// Wire name as it appears in configuration and in the report.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::X => "x",
            SourceType::Instagram => "instagram",
            SourceType::TikTok => "tiktok",
            SourceType::LinkedIn => "linkedin",
            SourceType::YoutubeShorts => "youtube_shorts",
            SourceType::Blog => "blog",
        }
    }

    /// Alternate post URL to try when the first post page yields no timestamp.
    ///
    /// Only short-form video has one: `/shorts/<id>` pages often render
    /// without any date, while the regular watch page for the same video id
    /// carries `datePublished`.
    pub fn alternate_post_url(&self, post_url: &str) -> Option<String> {
        match self {
            SourceType::YoutubeShorts => shorts_to_watch(post_url),
            _ => None,
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn shorts_to_watch(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("/shorts/")?;
    let id = rest.split(['?', '&', '/', '#']).next().unwrap_or_default();
    if id.is_empty() {
        return None;
    }
    Some(format!("https://www.youtube.com/watch?v={id}"))
}

/// One monitored account, feed or blog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceSpec {
    /// Short unique token, also used to name diagnostic snapshots.
    pub id: String,
    /// Display name for the report.
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SourceType,
    /// Profile or listing page that links to the latest post.
    pub url: String,
}

/// Classification of a single source for today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckStatus {
    #[serde(rename = "ok")]
    OnTime,
    #[serde(rename = "missing")]
    MissingOrLate,
    #[serde(rename = "warn")]
    Ambiguous,
}

impl CheckStatus {
    /// Report value: `ok`, `missing` or `warn`.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::OnTime => "ok",
            CheckStatus::MissingOrLate => "missing",
            CheckStatus::Ambiguous => "warn",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of checking one source.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    status: CheckStatus,
    post_url: Option<String>,
    published_at: Option<DateTime<Tz>>,
    note: String,
    attempts: u32,
}

impl CheckResult {
    /// A publish instant was found; classify it against today's window.
    pub fn published(
        post_url: String,
        published_at: DateTime<Tz>,
        window: &TimeWindow,
        attempts: u32,
    ) -> Self {
        let status = if window.is_on_time(&published_at) {
            CheckStatus::OnTime
        } else {
            CheckStatus::MissingOrLate
        };
        Self {
            status,
            post_url: Some(post_url),
            published_at: Some(published_at),
            note: "published time found".to_string(),
            attempts,
        }
    }

    /// The profile page exposed no post link and did not look blocked.
    pub fn no_link(attempts: u32) -> Self {
        Self {
            status: CheckStatus::MissingOrLate,
            post_url: None,
            published_at: None,
            note: "no latest link found".to_string(),
            attempts,
        }
    }

    /// The post link was found but its page carried no usable timestamp.
    pub fn no_timestamp(post_url: String, attempts: u32) -> Self {
        Self {
            status: CheckStatus::Ambiguous,
            post_url: Some(post_url),
            published_at: None,
            note: "latest link found, no timestamp".to_string(),
            attempts,
        }
    }

    /// Every attempt ended in a retryable condition.
    pub fn exhausted(last_note: Option<String>, attempts: u32) -> Self {
        Self {
            status: CheckStatus::Ambiguous,
            post_url: None,
            published_at: None,
            note: last_note
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "warn".to_string()),
            attempts,
        }
    }

    /// The classification.
    pub fn status(&self) -> CheckStatus {
        self.status
    }

    /// URL of the post the result refers to, if one was found.
    pub fn post_url(&self) -> Option<&str> {
        self.post_url.as_deref()
    }

    /// When the post claims to have been published, in the configured timezone.
    pub fn published_at(&self) -> Option<&DateTime<Tz>> {
        self.published_at.as_ref()
    }

    /// Human-readable reason for the status.
    pub fn note(&self) -> &str {
        &self.note
    }

    /// Number of attempts consumed, counting the successful one.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

/// Top-level status snapshot written after every run.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    /// Calendar date of the run in the configured timezone (`YYYY-MM-DD`).
    pub day: String,
    /// IANA name of the configured timezone.
    pub timezone: String,
    /// When the check ran (`YYYY-MM-DD HH:MM:SS`).
    pub checked_at: String,
    /// Expected publish time today (`YYYY-MM-DD HH:MM`).
    pub expected_time: String,
    pub window_start: String,
    pub window_end: String,
    /// One entry per configured source, in configuration order.
    pub sources: Vec<SourceEntry>,
}

/// Per-source line of the [`StatusReport`].
#[derive(Debug, Serialize)]
pub struct SourceEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SourceType,
    pub url: String,
    pub status: CheckStatus,
    pub latest_url: Option<String>,
    /// Publish time in the configured timezone (`YYYY-MM-DD HH:MM`).
    pub published_at: Option<String>,
    pub note: String,
}
