//! Diagnostic page dumps.
//!
//! When a source cannot be read the checker asks for a snapshot of whatever
//! the page currently shows, keyed by source id and phase label. The raw
//! content goes to `<dir>/<id>_<phase>.html`, and a rendered capture to
//! `.png` when the session can produce one. Nothing here may affect a check:
//! every failure is logged at debug level and dropped.

use crate::browser::Page;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct SnapshotWriter {
    dir: Option<PathBuf>,
}

impl SnapshotWriter {
    /// A writer that dumps into `dir`, created on first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// A writer that never touches the filesystem.
    pub fn disabled() -> Self {
        Self { dir: None }
    }

    /// Dump whatever `page` currently shows as `<source_id>_<phase>`.
    ///
    /// Never fails; problems are logged at debug level.
    pub async fn capture<P: Page>(&self, page: &mut P, source_id: &str, phase: &str) {
        let Some(dir) = &self.dir else {
            return;
        };
        if let Err(e) = fs::create_dir_all(dir).await {
            debug!(dir = %dir.display(), error = %e, "Snapshot dir unavailable");
            return;
        }

        let stem = format!("{}_{}", file_safe(source_id), file_safe(phase));

        match page.content().await {
            Ok(content) => {
                let path = dir.join(format!("{stem}.html"));
                match fs::write(&path, content).await {
                    Ok(()) => debug!(path = %path.display(), "Wrote page snapshot"),
                    Err(e) => debug!(path = %path.display(), error = %e, "Snapshot write failed"),
                }
            }
            Err(e) => debug!(error = %e, "No content to snapshot"),
        }

        if let Ok(Some(png)) = page.screenshot().await {
            let path = dir.join(format!("{stem}.png"));
            if let Err(e) = fs::write(&path, png).await {
                debug!(path = %path.display(), error = %e, "Screenshot write failed");
            }
        }
    }
}

/// Keep snapshot names inside the snapshot directory.
fn file_safe(part: &str) -> String {
    part.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
