//! Status report assembly and JSON output.
//!
//! The report is a snapshot: one file, overwritten on every run, with one
//! entry per configured source in configuration order.
//!
//! ```json
//! {
//!   "day": "2024-05-01",
//!   "timezone": "Europe/Berlin",
//!   "checked_at": "2024-05-01 20:00:00",
//!   "expected_time": "2024-05-01 18:00",
//!   "window_start": "2024-05-01 14:00",
//!   "window_end": "2024-05-01 22:00",
//!   "sources": [
//!     { "id": "x", "status": "ok", "published_at": "2024-05-01 17:58", "...": "..." }
//!   ]
//! }
//! ```

use crate::models::{CheckResult, SourceEntry, SourceSpec, StatusReport};
use crate::window::TimeWindow;
use chrono::DateTime;
use chrono_tz::Tz;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

const MINUTE_FORMAT: &str = "%Y-%m-%d %H:%M";
const SECOND_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Collects per-source results into a [`StatusReport`].
#[derive(Debug)]
pub struct ReportBuilder {
    tz: Tz,
    report: StatusReport,
}

impl ReportBuilder {
    /// Start a report for the run.
    ///
    /// # Arguments
    ///
    /// * `now` - When the run started; also fixes the report's timezone
    /// * `window` - Today's window, written into the header
    pub fn new(now: &DateTime<Tz>, window: &TimeWindow) -> Self {
        let tz = now.timezone();
        Self {
            tz,
            report: StatusReport {
                day: now.date_naive().to_string(),
                timezone: tz.name().to_string(),
                checked_at: now.format(SECOND_FORMAT).to_string(),
                expected_time: window.expected.format(MINUTE_FORMAT).to_string(),
                window_start: window.start.format(MINUTE_FORMAT).to_string(),
                window_end: window.end.format(MINUTE_FORMAT).to_string(),
                sources: Vec::new(),
            },
        }
    }

    /// Append one source's result. Entries keep the order they are pushed in.
    ///
    /// `published_at` is rendered in the report's timezone, whatever zone the
    /// result carries.
    pub fn push(&mut self, source: &SourceSpec, result: &CheckResult) {
        let published_at = result
            .published_at()
            .map(|at| at.with_timezone(&self.tz).format(MINUTE_FORMAT).to_string());

        self.report.sources.push(SourceEntry {
            id: source.id.clone(),
            name: source.name.clone(),
            kind: source.kind,
            url: source.url.clone(),
            status: result.status(),
            latest_url: result.post_url().map(str::to_string),
            published_at,
            note: result.note().to_string(),
        });
    }

    /// # Returns
    ///
    /// The completed report, ready for [`write_report`].
    pub fn finish(self) -> StatusReport {
        self.report
    }
}

/// Write the report as pretty-printed UTF-8 JSON, creating parent directories.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_report(report: &StatusReport, path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(report)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create report dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(sources = report.sources.len(), "Wrote status report");
    Ok(())
}
