//! # Daily Post Check
//!
//! Verifies that a fixed set of social-media accounts and blogs published a
//! post inside today's expected time window, and writes a JSON status
//! snapshot for a dashboard to pick up.
//!
//! ## Usage
//!
//! ```sh
//! daily_post_check -c monitor.yaml -o docs/status.json
//! ```
//!
//! ## Architecture
//!
//! For every configured source, strictly in order and on one shared page:
//! 1. **Profile**: load the profile or listing page, dismiss consent overlays
//! 2. **Link**: locate the most recent post with the platform's strategy
//! 3. **Post**: load the post page and collect every timestamp signal
//! 4. **Classify**: `ok` / `missing` / `warn` against today's window, with
//!    flat retries on blocked pages and navigation failures
//!
//! The results are written as one report. Only a bad configuration, a
//! session that cannot start, or an unwritable report aborts the run.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod browser;
mod checker;
mod cli;
mod config;
mod consent;
mod detect;
mod models;
mod outputs;
mod scrapers;
mod timestamps;
mod utils;
mod window;

use browser::http::HttpPage;
use checker::SourceChecker;
use cli::Cli;
use config::MonitorConfig;
use models::CheckStatus;
use outputs::json::{ReportBuilder, write_report};
use outputs::snapshot::SnapshotWriter;
use utils::ensure_writable_dir;
use window::{Clock, SystemClock};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("daily_post_check starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // ---- Configuration ----
    let mut config = match MonitorConfig::load(&args.config).await {
        Ok(config) => config,
        Err(e) => {
            error!(path = %args.config.display(), error = %e, "Failed to load configuration");
            return Err(e);
        }
    };
    if let Some(retries) = args.retries {
        info!(retries, "Retry count overridden from the command line");
        config.retries = retries;
    }
    let detector = config.block_detector()?;

    // Fail before any page is fetched if the report cannot be written
    if let Some(dir) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir.display(),
                error = %e,
                "Report directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    let snapshots = if args.no_debug {
        SnapshotWriter::disabled()
    } else {
        SnapshotWriter::new(&args.debug_dir)
    };

    // ---- Browsing session ----
    let mut page = match HttpPage::new(&config.browser) {
        Ok(page) => page,
        Err(e) => {
            error!(error = %e, "Failed to start browsing session");
            return Err(e.into());
        }
    };

    // ---- Check sources, in order ----
    let clock = SystemClock;
    let started_at = clock.now(&config.timezone);
    let checker = SourceChecker::new(&config, detector, snapshots, clock);
    let window = checker.window();
    info!(
        day = %window.today,
        expected = %window.expected,
        window_start = %window.start,
        window_end = %window.end,
        "Computed today's window"
    );

    let mut report = ReportBuilder::new(&started_at, &window);
    for source in &config.sources {
        let result = checker.check(&mut page, source).await;
        info!(
            source = %source.id,
            status = %result.status(),
            latest_url = result.post_url().unwrap_or("-"),
            published_at = ?result.published_at(),
            attempts = result.attempts(),
            note = result.note(),
            "Checked source"
        );
        report.push(source, &result);
    }
    let report = report.finish();

    let count = |status: CheckStatus| report.sources.iter().filter(|s| s.status == status).count();
    let (ok, missing, warn) = (
        count(CheckStatus::OnTime),
        count(CheckStatus::MissingOrLate),
        count(CheckStatus::Ambiguous),
    );

    // ---- Output ----
    if let Err(e) = write_report(&report, &args.output).await {
        error!(path = %args.output.display(), error = %e, "Failed to write status report");
        return Err(e);
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        ok,
        missing,
        warn,
        path = %args.output.display(),
        "Execution complete"
    );

    Ok(())
}
