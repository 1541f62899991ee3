//! Browsing session backed by a cookie-persisting HTTP client.
//!
//! Pages are fetched with a desktop user agent and a German/English
//! `Accept-Language`. There is no script engine, so "clicking" a consent
//! button means submitting the `<form>` that owns it (or following the link
//! it is) and then reloading the page the overlay covered, which now carries
//! the consent cookies. [`Page::scroll`] and [`Page::screenshot`] keep their
//! no-op defaults.

use super::{ButtonRole, ButtonTarget, Page, PageError};
use crate::config::BrowserConfig;
use once_cell::sync::Lazy;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

static BUTTON_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"button, input[type="submit"], input[type="button"]"#)
        .expect("valid selector")
});
static ARIA_BUTTON_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"[role="button"]"#).expect("valid selector"));
static FORM_INPUT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("input[name]").expect("valid selector"));

/// The page currently loaded in the session.
#[derive(Debug)]
struct Loaded {
    url: Url,
    body: String,
}

/// What activating a matched element amounts to without a script engine.
#[derive(Debug, PartialEq)]
enum ClickAction {
    Submit {
        post: bool,
        action: Url,
        fields: Vec<(String, String)>,
    },
    Follow(Url),
}

#[derive(Debug)]
pub struct HttpPage {
    client: Client,
    current: Option<Loaded>,
}

impl HttpPage {
    /// Open a session. Fails only when the HTTP client cannot be built.
    pub fn new(config: &BrowserConfig) -> Result<Self, PageError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)
                .map_err(|e| PageError::Request(format!("invalid accept-language: {e}")))?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .cookie_store(true)
            .build()
            .map_err(|e| PageError::Request(e.to_string()))?;

        Ok(Self {
            client,
            current: None,
        })
    }

    /// Send `request` and make its response the current page.
    ///
    /// The current page is only replaced on success; callers that navigate
    /// away clear it first.
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn load(
        &mut self,
        request: RequestBuilder,
        url: &str,
        timeout: Duration,
    ) -> Result<(), PageError> {
        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| request_error(e, url))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(PageError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                %url,
                "Non-success status; keeping body for inspection"
            );
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| request_error(e, url))?;
        debug!(final_url = %final_url, bytes = body.len(), "Loaded page");

        self.current = Some(Loaded {
            url: final_url,
            body,
        });
        Ok(())
    }
}

impl Page for HttpPage {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), PageError> {
        let parsed = Url::parse(url).map_err(|_| PageError::InvalidUrl(url.to_string()))?;
        // A failed navigation must not leave the previous page showing
        self.current = None;
        let request = self.client.get(parsed);
        self.load(request, url, timeout).await
    }

    async fn content(&mut self) -> Result<String, PageError> {
        self.current
            .as_ref()
            .map(|loaded| loaded.body.clone())
            .ok_or(PageError::NoPage)
    }

    async fn click(&mut self, target: &ButtonTarget, timeout: Duration) -> Result<(), PageError> {
        let loaded = self.current.as_ref().ok_or(PageError::NoPage)?;
        let action = resolve_click(&loaded.body, &loaded.url, target)?;
        let origin = loaded.url.clone();

        let (request, url) = match action {
            ClickAction::Submit {
                post: true,
                action,
                fields,
            } => (self.client.post(action.clone()).form(&fields), action),
            ClickAction::Submit {
                post: false,
                mut action,
                fields,
            } => {
                let query = fields
                    .iter()
                    .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                    .collect::<Vec<_>>()
                    .join("&");
                action.set_query((!query.is_empty()).then_some(query.as_str()));
                (self.client.get(action.clone()), action)
            }
            ClickAction::Follow(url) => (self.client.get(url.clone()), url),
        };

        debug!(text = target.text, %url, "Activating element");
        self.load(request, url.as_str(), timeout).await?;

        // The response to the submission is not the page; reload what the
        // overlay was covering.
        debug!(%origin, "Reloading page after activation");
        let reload = self.client.get(origin.clone());
        let reloaded = self.load(reload, origin.as_str(), timeout).await;
        if reloaded.is_err() {
            self.current = None;
        }
        reloaded
    }

    fn current_url(&self) -> Option<&str> {
        self.current.as_ref().map(|loaded| loaded.url.as_str())
    }
}

fn request_error(e: reqwest::Error, url: &str) -> PageError {
    if e.is_timeout() {
        PageError::Timeout {
            url: url.to_string(),
        }
    } else {
        PageError::Request(e.to_string())
    }
}

/// Locate the element `target` names and work out what activating it does.
fn resolve_click(body: &str, base: &Url, target: &ButtonTarget) -> Result<ClickAction, PageError> {
    let document = Html::parse_document(body);
    let selector = match target.role {
        ButtonRole::Button => &*BUTTON_SELECTOR,
        ButtonRole::AriaButton => &*ARIA_BUTTON_SELECTOR,
    };
    let needle = target.text.to_lowercase();

    let element = document
        .select(selector)
        .find(|el| label_of(el).to_lowercase().contains(&needle))
        .ok_or_else(|| PageError::NoSuchElement(target.text.to_string()))?;

    if element.value().name() == "a" {
        if let Some(href) = element.value().attr("href") {
            let url = base
                .join(href)
                .map_err(|_| PageError::InvalidUrl(href.to_string()))?;
            return Ok(ClickAction::Follow(url));
        }
    }

    let form = element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "form")
        .ok_or_else(|| PageError::NotInteractive(target.text.to_string()))?;

    let post = form
        .value()
        .attr("method")
        .is_some_and(|m| m.eq_ignore_ascii_case("post"));
    let action = match form.value().attr("action").map(str::trim) {
        Some(action) if !action.is_empty() => base
            .join(action)
            .map_err(|_| PageError::InvalidUrl(action.to_string()))?,
        _ => base.clone(),
    };

    let mut fields: Vec<(String, String)> = form
        .select(&FORM_INPUT_SELECTOR)
        .filter(|input| is_submitted_field(input))
        .filter_map(|input| {
            let name = input.value().attr("name")?;
            let value = input.value().attr("value").unwrap_or_default();
            Some((name.to_string(), value.to_string()))
        })
        .collect();

    if let Some(name) = element.value().attr("name") {
        let value = element.value().attr("value").unwrap_or_default();
        fields.push((name.to_string(), value.to_string()));
    }

    Ok(ClickAction::Submit {
        post,
        action,
        fields,
    })
}

/// Visible label of a button: its text, or the `value` of an input.
fn label_of(element: &ElementRef<'_>) -> String {
    let text = element.text().collect::<Vec<_>>().join(" ");
    let text = text.trim();
    if text.is_empty() {
        element.value().attr("value").unwrap_or_default().to_string()
    } else {
        text.to_string()
    }
}

/// Inputs a browser would send when a *different* button submits the form.
fn is_submitted_field(input: &ElementRef<'_>) -> bool {
    let kind = input
        .value()
        .attr("type")
        .unwrap_or("text")
        .to_ascii_lowercase();
    match kind.as_str() {
        "submit" | "button" | "image" | "reset" | "file" => false,
        "checkbox" | "radio" => input.value().attr("checked").is_some(),
        _ => true,
    }
}
