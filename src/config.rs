//! Monitor configuration loaded from YAML.
//!
//! The whole run is driven by one immutable [`MonitorConfig`]: the ordered
//! source list, the daily schedule, the retry budget and the browsing
//! session's timings. It is validated once at startup; an invalid file aborts
//! before any source is checked.
//!
//! ```yaml
//! timezone: Europe/Berlin
//! expected_hour: 18
//! expected_minute: 0
//! tolerance_minutes: 240
//! retries: 2
//! sources:
//!   - { id: x, name: "X @utradetoken", type: x, url: "https://x.com/utradetoken" }
//! ```

use crate::detect::{BlockDetector, DEFAULT_BLOCK_TERMS};
use crate::models::SourceSpec;
use chrono_tz::Tz;
use itertools::Itertools;
use serde::Deserialize;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("expected_hour must be 0-23, got {0}")]
    InvalidHour(u32),

    #[error("expected_minute must be 0-59, got {0}")]
    InvalidMinute(u32),

    #[error("no sources configured")]
    NoSources,

    #[error("duplicate source id: {0}")]
    DuplicateId(String),

    #[error("source {id} has an invalid url: {url}")]
    InvalidUrl { id: String, url: String },

    #[error("block_terms do not compile: {0}")]
    InvalidBlockTerms(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfig {
    /// Timezone the schedule and the report are expressed in.
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
    #[serde(default = "default_expected_hour")]
    pub expected_hour: u32,
    #[serde(default)]
    pub expected_minute: u32,
    #[serde(default = "default_tolerance_minutes")]
    pub tolerance_minutes: u32,
    /// Extra attempts after the first one.
    #[serde(default = "default_retries")]
    pub retries: u32,
    /// Replaces the built-in block vocabulary when set.
    #[serde(default)]
    pub block_terms: Option<Vec<String>>,
    #[serde(default)]
    pub browser: BrowserConfig,
    pub sources: Vec<SourceSpec>,
}

/// Browsing session identity and timings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrowserConfig {
    /// Desktop browser user agent sent with every request.
    pub user_agent: String,
    pub accept_language: String,
    /// Upper bound for one navigation, including the response body.
    pub navigation_timeout_ms: u64,
    /// Wait after every navigation and again after the consent step.
    pub settle_ms: u64,
    /// Per-button timeout while looking for a consent control.
    pub consent_timeout_ms: u64,
    /// Wait after a consent control was activated.
    pub consent_settle_ms: u64,
    /// Scroll steps after each load. Only sessions that render pages act on
    /// this; the HTTP session ignores it.
    pub scroll_steps: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            user_agent: DESKTOP_UA.to_string(),
            accept_language: "de-DE,de;q=0.9,en;q=0.8".to_string(),
            navigation_timeout_ms: 45_000,
            settle_ms: 1_500,
            consent_timeout_ms: 1_500,
            consent_settle_ms: 1_200,
            scroll_steps: 2,
        }
    }
}

impl BrowserConfig {
    /// [`navigation_timeout_ms`](Self::navigation_timeout_ms) as a [`Duration`].
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    /// [`settle_ms`](Self::settle_ms) as a [`Duration`].
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// [`consent_timeout_ms`](Self::consent_timeout_ms) as a [`Duration`].
    pub fn consent_timeout(&self) -> Duration {
        Duration::from_millis(self.consent_timeout_ms)
    }

    /// [`consent_settle_ms`](Self::consent_settle_ms) as a [`Duration`].
    pub fn consent_settle(&self) -> Duration {
        Duration::from_millis(self.consent_settle_ms)
    }
}

fn default_timezone() -> Tz {
    chrono_tz::Europe::Berlin
}

fn default_expected_hour() -> u32 {
    18
}

fn default_tolerance_minutes() -> u32 {
    240
}

fn default_retries() -> u32 {
    2
}

impl MonitorConfig {
    /// Read, parse and validate a YAML configuration file.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let raw = fs::read_to_string(path.as_ref()).await?;
        let config = Self::from_yaml(&raw)?;
        info!(
            sources = config.sources.len(),
            timezone = %config.timezone,
            expected_hour = config.expected_hour,
            expected_minute = config.expected_minute,
            tolerance_minutes = config.tolerance_minutes,
            retries = config.retries,
            "Loaded monitor configuration"
        );
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed YAML, unknown keys or source types, and
    /// any [`ConfigError`] raised by [`validate`](Self::validate).
    pub fn from_yaml(raw: &str) -> Result<Self, Box<dyn Error>> {
        let config: MonitorConfig = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the schedule, the source list and the block vocabulary.
    ///
    /// Hours must be below 24 and minutes below 60. There must be at least
    /// one source, ids must be unique, and every URL must be absolute
    /// `http(s)` with a host.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.expected_hour > 23 {
            return Err(ConfigError::InvalidHour(self.expected_hour));
        }
        if self.expected_minute > 59 {
            return Err(ConfigError::InvalidMinute(self.expected_minute));
        }
        if self.sources.is_empty() {
            return Err(ConfigError::NoSources);
        }
        if let Some(id) = self.sources.iter().map(|s| &s.id).duplicates().next() {
            return Err(ConfigError::DuplicateId(id.clone()));
        }
        for source in &self.sources {
            let valid = Url::parse(&source.url)
                .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
                .unwrap_or(false);
            if !valid {
                return Err(ConfigError::InvalidUrl {
                    id: source.id.clone(),
                    url: source.url.clone(),
                });
            }
        }
        self.block_detector()?;
        Ok(())
    }

    /// Detector for the configured vocabulary, or the built-in one.
    pub fn block_detector(&self) -> Result<BlockDetector, ConfigError> {
        let detector = match &self.block_terms {
            Some(terms) => BlockDetector::new(terms),
            None => BlockDetector::new(DEFAULT_BLOCK_TERMS),
        };
        detector.map_err(|e| ConfigError::InvalidBlockTerms(e.to_string()))
    }
}
