//! Bot-wall, consent-gate and login-wall detection.
//!
//! A flat vocabulary check over the raw page content: any single term,
//! matched case-insensitively as a whole word, flags the page. Whole words
//! keep markup such as `<meta name="robots">` from counting as "robot".
//! Pages that merely mention cookies in a footer are flagged too; the checker
//! turns a flagged page into a retry or a `warn`, never a `missing`.

use regex::{Regex, RegexBuilder};
use tracing::debug;

/// Default block/consent/login/robot vocabulary, English and German.
pub const DEFAULT_BLOCK_TERMS: &[&str] = &[
    "captcha",
    "verify",
    "unusual traffic",
    "robot",
    "consent",
    "cookie",
    "cookies",
    "login",
    "log in",
    "sign in",
    "anmelden",
    "einloggen",
    "access denied",
    "forbidden",
    "temporarily blocked",
    "please enable javascript",
];

#[derive(Debug, Clone)]
pub struct BlockDetector {
    pattern: Option<Regex>,
}

impl BlockDetector {
    /// Build a detector from a list of indicator terms.
    ///
    /// Terms are literal text. A term that starts or ends with a word
    /// character only matches at a word boundary on that side.
    pub fn new<S: AsRef<str>>(terms: &[S]) -> Result<Self, regex::Error> {
        let alternation = terms
            .iter()
            .map(|t| t.as_ref().trim())
            .filter(|t| !t.is_empty())
            .map(whole_word)
            .collect::<Vec<_>>()
            .join("|");

        if alternation.is_empty() {
            return Ok(Self { pattern: None });
        }

        let pattern = RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .build()?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// Does this content look like an interstitial instead of real content?
    pub fn looks_blocked(&self, content: &str) -> bool {
        let Some(pattern) = &self.pattern else {
            return false;
        };
        match pattern.find(content) {
            Some(m) => {
                debug!(term = m.as_str(), offset = m.start(), "Block indicator matched");
                true
            }
            None => false,
        }
    }
}

fn whole_word(term: &str) -> String {
    let is_word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
    let lead = if is_word(term.chars().next()) { r"\b" } else { "" };
    let trail = if is_word(term.chars().last()) { r"\b" } else { "" };
    format!("{lead}{}{trail}", regex::escape(term))
}

impl Default for BlockDetector {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_TERMS).unwrap_or(Self { pattern: None })
    }
}
