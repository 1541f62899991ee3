//! The page seam the checker drives.
//!
//! [`Page`] is the small set of interactions the checking pipeline needs from
//! a browsing session: navigate, read the current content, activate a
//! button by its text, scroll, and optionally capture a rendered image.
//! [`http::HttpPage`] implements it on top of a cookie-persisting HTTP client.
//!
//! One page is created per run and reused for every source, so cookies set by
//! an accepted consent form carry over to later sources on the same domain.

pub mod http;

use std::time::Duration;
use thiserror::Error;

/// Failures surfaced by a [`Page`]. All of them are recoverable per source.
#[derive(Error, Debug)]
pub enum PageError {
    #[error("navigation timed out: {url}")]
    Timeout { url: String },

    #[error("request failed: {0}")]
    Request(String),

    #[error("server returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("no page loaded")]
    NoPage,

    #[error("no element matching {0}")]
    NoSuchElement(String),

    #[error("element cannot be activated: {0}")]
    NotInteractive(String),
}

impl PageError {
    /// Short note recorded on the check result for this failure.
    pub fn note(&self) -> String {
        match self {
            PageError::Timeout { .. } => "timeout".to_string(),
            PageError::Request(_) => "error: request".to_string(),
            PageError::Status { status, .. } => format!("error: status {status}"),
            PageError::InvalidUrl(_) => "error: invalid url".to_string(),
            PageError::NoPage => "error: no page".to_string(),
            PageError::NoSuchElement(_) => "error: no such element".to_string(),
            PageError::NotInteractive(_) => "error: not interactive".to_string(),
        }
    }

    /// Timeouts are logged and snapshotted apart from other failures.
    pub fn is_timeout(&self) -> bool {
        matches!(self, PageError::Timeout { .. })
    }
}

/// Which elements a text match may land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonRole {
    /// `<button>` and submit inputs.
    Button,
    /// Anything with `role="button"`.
    AriaButton,
}

/// A clickable element located by its visible text (substring, case-insensitive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonTarget {
    pub role: ButtonRole,
    pub text: &'static str,
}

impl ButtonTarget {
    /// A `<button>` or submit input whose label contains `text`.
    pub const fn button(text: &'static str) -> Self {
        Self {
            role: ButtonRole::Button,
            text,
        }
    }

    /// Any `role="button"` element whose label contains `text`.
    pub const fn aria(text: &'static str) -> Self {
        Self {
            role: ButtonRole::AriaButton,
            text,
        }
    }
}

/// An interactive page within one browsing session.
#[allow(async_fn_in_trait)]
pub trait Page {
    /// Navigate to `url`, failing with [`PageError::Timeout`] after `timeout`.
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), PageError>;

    /// Raw content of the current page.
    async fn content(&mut self) -> Result<String, PageError>;

    /// Activate the first element matching `target`.
    ///
    /// Returns [`PageError::NoSuchElement`] when nothing matches.
    async fn click(&mut self, target: &ButtonTarget, timeout: Duration) -> Result<(), PageError>;

    /// URL of the current page, after redirects.
    fn current_url(&self) -> Option<&str>;

    /// Scroll the viewport so lazy feeds load more items.
    async fn scroll(&mut self, _steps: u32) -> Result<(), PageError> {
        Ok(())
    }

    /// PNG capture of the rendered page, when the session can render.
    async fn screenshot(&mut self) -> Result<Option<Vec<u8>>, PageError> {
        Ok(None)
    }
}

/// Blocking-style wait local to the current operation.
pub async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
