//! Best-effort dismissal of cookie and consent overlays.

use crate::browser::{ButtonTarget, Page, pause};
use std::time::Duration;
use tracing::{debug, trace};

/// Accept controls in priority order. English first, then German, then
/// anything exposing `role="button"`.
pub const CONSENT_BUTTONS: &[ButtonTarget] = &[
    ButtonTarget::button("Accept all"),
    ButtonTarget::button("Accept All"),
    ButtonTarget::button("Accept"),
    ButtonTarget::button("I Agree"),
    ButtonTarget::button("Agree"),
    ButtonTarget::button("Allow all"),
    ButtonTarget::button("Alle akzeptieren"),
    ButtonTarget::button("Alles akzeptieren"),
    ButtonTarget::button("Akzeptieren"),
    ButtonTarget::button("Zustimmen"),
    ButtonTarget::button("Einverstanden"),
    ButtonTarget::aria("Accept"),
    ButtonTarget::aria("Alle akzeptieren"),
];

/// Try each consent control until one activates, then let the page settle.
///
/// Returns whether anything was clicked. Never fails: a page without any
/// matching control, or one whose control cannot be activated, is left as is.
pub async fn dismiss<P: Page>(page: &mut P, per_attempt: Duration, settle: Duration) -> bool {
    for target in CONSENT_BUTTONS {
        match page.click(target, per_attempt).await {
            Ok(()) => {
                debug!(text = target.text, "Consent control activated");
                pause(settle).await;
                return true;
            }
            Err(e) => trace!(text = target.text, error = %e, "Consent control not usable"),
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{ButtonRole, PageError};

    /// Page exposing a fixed set of clickable labels.
    struct ButtonsPage {
        clickable: Vec<(ButtonRole, &'static str)>,
        tried: Vec<&'static str>,
        fail_with_timeout: bool,
    }

    impl ButtonsPage {
        fn new(clickable: Vec<(ButtonRole, &'static str)>) -> Self {
            Self {
                clickable,
                tried: Vec::new(),
                fail_with_timeout: false,
            }
        }
    }

    impl Page for ButtonsPage {
        async fn goto(&mut self, _url: &str, _timeout: Duration) -> Result<(), PageError> {
            Ok(())
        }

        async fn content(&mut self) -> Result<String, PageError> {
            Ok(String::new())
        }

        async fn click(
            &mut self,
            target: &ButtonTarget,
            _timeout: Duration,
        ) -> Result<(), PageError> {
            self.tried.push(target.text);
            if self.fail_with_timeout {
                return Err(PageError::Timeout { url: "about:blank".into() });
            }
            if self
                .clickable
                .iter()
                .any(|(role, text)| *role == target.role && *text == target.text)
            {
                Ok(())
            } else {
                Err(PageError::NoSuchElement(target.text.to_string()))
            }
        }

        fn current_url(&self) -> Option<&str> {
            None
        }
    }

    #[tokio::test]
    async fn test_stops_at_first_activation() {
        let mut page = ButtonsPage::new(vec![
            (ButtonRole::Button, "Zustimmen"),
            (ButtonRole::Button, "Accept"),
        ]);
        assert!(dismiss(&mut page, Duration::ZERO, Duration::ZERO).await);
        assert_eq!(page.tried, vec!["Accept all", "Accept All", "Accept"]);
    }

    #[tokio::test]
    async fn test_aria_buttons_are_tried_last() {
        let mut page = ButtonsPage::new(vec![(ButtonRole::AriaButton, "Alle akzeptieren")]);
        assert!(dismiss(&mut page, Duration::ZERO, Duration::ZERO).await);
        assert_eq!(page.tried.len(), CONSENT_BUTTONS.len());
    }

    #[tokio::test]
    async fn test_no_match_is_silent() {
        let mut page = ButtonsPage::new(vec![]);
        assert!(!dismiss(&mut page, Duration::ZERO, Duration::ZERO).await);
        assert_eq!(page.tried.len(), CONSENT_BUTTONS.len());
    }

    #[tokio::test]
    async fn test_errors_never_escape() {
        let mut page = ButtonsPage::new(vec![(ButtonRole::Button, "Accept")]);
        page.fail_with_timeout = true;
        assert!(!dismiss(&mut page, Duration::ZERO, Duration::ZERO).await);
    }
}
