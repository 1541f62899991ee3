//! Per-source check: profile page → latest link → post page → timestamp →
//! classification, inside a flat retry loop.
//!
//! # Retry policy
//!
//! Each attempt ends in one of two ways:
//!
//! - [`Attempt::Done`]: a conclusive outcome. A timestamp was found (on time
//!   or late), the profile plainly has no post link, or the post page has no
//!   timestamp. Retrying cannot change these.
//! - [`Attempt::Retry`]: the page looked like a bot wall, consent gate or
//!   login wall, or navigation failed. The next attempt starts over from the
//!   profile page with no extra delay.
//!
//! When every attempt asks for a retry, the source is reported as `warn` with
//! the last note. A source is never reported `missing` because it could not
//! be read.

use crate::browser::{Page, PageError, pause};
use crate::config::MonitorConfig;
use crate::consent;
use crate::detect::BlockDetector;
use crate::models::{CheckResult, SourceSpec};
use crate::outputs::snapshot::SnapshotWriter;
use crate::scrapers;
use crate::timestamps;
use crate::utils::truncate_for_log;
use crate::window::{Clock, TimeWindow};
use chrono::DateTime;
use chrono_tz::Tz;
use tracing::{debug, info, instrument, warn};
use url::Url;

const BLOCKED_NOTE: &str = "blocked/consent suspected";

/// Outcome of one attempt.
#[derive(Debug)]
enum Attempt {
    Done(CheckResult),
    Retry(String),
}

/// What a loaded post page yielded.
#[derive(Debug)]
enum PostPage {
    Blocked,
    Read(Option<DateTime<Tz>>),
}

/// Runs the per-source check against a shared [`Page`].
///
/// Holds the run configuration, the block detector, the snapshot writer and
/// the clock that decides what "today" is.
pub struct SourceChecker<'a, C> {
    config: &'a MonitorConfig,
    detector: BlockDetector,
    snapshots: SnapshotWriter,
    clock: C,
}

impl<'a, C: Clock> SourceChecker<'a, C> {
    /// Create a checker.
    ///
    /// # Arguments
    ///
    /// * `config` - Schedule, retry count and session timings
    /// * `detector` - Judges whether loaded content is an interstitial
    /// * `snapshots` - Receives page dumps of sources that could not be read
    /// * `clock` - Source of "now" in the configured timezone
    pub fn new(
        config: &'a MonitorConfig,
        detector: BlockDetector,
        snapshots: SnapshotWriter,
        clock: C,
    ) -> Self {
        Self {
            config,
            detector,
            snapshots,
            clock,
        }
    }

    /// Today's window, as of now.
    pub fn window(&self) -> TimeWindow {
        let now = self.clock.now(&self.config.timezone);
        TimeWindow::compute(
            &now,
            self.config.expected_hour,
            self.config.expected_minute,
            self.config.tolerance_minutes,
        )
    }

    /// Check one source. Never fails; page errors are folded into the result.
    #[instrument(level = "info", skip_all, fields(source = %source.id, kind = %source.kind))]
    pub async fn check<P: Page>(&self, page: &mut P, source: &SourceSpec) -> CheckResult {
        let attempts = self.config.retries.saturating_add(1);
        let mut last_note = None;

        for attempt in 0..attempts {
            match self.attempt(page, source, attempt + 1).await {
                Ok(Attempt::Done(result)) => return result,
                Ok(Attempt::Retry(note)) => {
                    warn!(attempt, %note, "Attempt inconclusive");
                    last_note = Some(note);
                }
                Err(e) => {
                    let note = e.note();
                    warn!(attempt, error = %e, %note, "Attempt failed");
                    let phase = if e.is_timeout() {
                        format!("timeout_{attempt}")
                    } else {
                        format!("error_{attempt}")
                    };
                    self.snapshots.capture(page, &source.id, &phase).await;
                    last_note = Some(note);
                }
            }
        }

        CheckResult::exhausted(last_note, attempts)
    }

    async fn attempt<P: Page>(
        &self,
        page: &mut P,
        source: &SourceSpec,
        number: u32,
    ) -> Result<Attempt, PageError> {
        let profile_url = self.open(page, &source.url).await?;
        let content = page.content().await?;

        let Some(link) = scrapers::latest_link(source.kind, &content, &profile_url) else {
            self.snapshots.capture(page, &source.id, "profile").await;
            if self.detector.looks_blocked(&content) {
                debug!(preview = %truncate_for_log(&content, 200), "Profile looks blocked");
                return Ok(Attempt::Retry(BLOCKED_NOTE.to_string()));
            }
            return Ok(Attempt::Done(CheckResult::no_link(number)));
        };
        info!(url = %link.url, origin = %link.origin, "Found latest post link");

        let mut post_url = link.url;
        let mut published = match self.read_post(page, source, &post_url).await? {
            PostPage::Blocked => return Ok(Attempt::Retry(BLOCKED_NOTE.to_string())),
            PostPage::Read(published) => published,
        };

        if published.is_none() {
            if let Some(alternate) = source.kind.alternate_post_url(&post_url) {
                debug!(%alternate, "No timestamp on post page; trying alternate URL");
                match self.read_post(page, source, &alternate).await? {
                    PostPage::Blocked => return Ok(Attempt::Retry(BLOCKED_NOTE.to_string())),
                    PostPage::Read(Some(at)) => {
                        post_url = alternate;
                        published = Some(at);
                    }
                    PostPage::Read(None) => {}
                }
            }
        }

        let result = match published {
            Some(at) => CheckResult::published(post_url, at, &self.window(), number),
            None => CheckResult::no_timestamp(post_url, number),
        };
        Ok(Attempt::Done(result))
    }

    /// Load a post page and pull its timestamp, unless it looks blocked.
    async fn read_post<P: Page>(
        &self,
        page: &mut P,
        source: &SourceSpec,
        url: &str,
    ) -> Result<PostPage, PageError> {
        self.open(page, url).await?;
        let content = page.content().await?;

        if self.detector.looks_blocked(&content) {
            debug!(%url, preview = %truncate_for_log(&content, 200), "Post page looks blocked");
            self.snapshots.capture(page, &source.id, "post").await;
            return Ok(PostPage::Blocked);
        }

        let published = timestamps::extract(&content, &self.config.timezone);
        debug!(%url, published = ?published, "Read post page");
        Ok(PostPage::Read(published))
    }

    /// Navigate, let the page settle, dismiss consent, settle again.
    ///
    /// Returns the URL the page ended up on.
    async fn open<P: Page>(&self, page: &mut P, url: &str) -> Result<Url, PageError> {
        let browser = &self.config.browser;

        page.goto(url, browser.navigation_timeout()).await?;
        pause(browser.settle()).await;
        if consent::dismiss(page, browser.consent_timeout(), browser.consent_settle()).await {
            info!(%url, "Dismissed consent overlay");
        }
        pause(browser.settle()).await;
        page.scroll(browser.scroll_steps).await?;

        let current = page.current_url().unwrap_or(url);
        Url::parse(current).map_err(|_| PageError::InvalidUrl(current.to_string()))
    }
}
