//! HTML fetching with challenge detection
//!
//! One GET per call. Redirects are followed, responses are classified as
//! success, blocked (challenge page) or HTTP error, and only transport
//! failures come back as `Err`.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, COOKIE};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::FetchConfig;
use crate::error::ImportError;
use crate::types::FetchOutcome;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml";
const ACCEPT_LANGUAGE_EN: &str = "en-US,en;q=0.9";
const MAX_REDIRECTS: usize = 10;
const BLOCKED_STATUSES: [u16; 2] = [403, 503];

/// HTTP client configured for set pages
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    proxy: Option<String>,
    cookie: Option<String>,
    challenge_markers: Vec<String>,
}

impl Fetcher {
    pub fn new(config: &FetchConfig, challenge_markers: &[String]) -> Result<Self, ImportError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_EN));

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            proxy: config.proxy.clone(),
            cookie: cookie_header(config),
            challenge_markers: challenge_markers.iter().map(|m| m.to_lowercase()).collect(),
        })
    }

    /// Fetch `url` (through the proxy, if any) and classify the response
    ///
    /// Cancellation is honoured until the body has been read.
    pub async fn fetch_html(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<FetchOutcome, ImportError> {
        let target = build_fetch_url(url, self.proxy.as_deref());
        debug!(url, proxied = target != url, "fetching set page");

        let (status, body) = tokio::select! {
            _ = cancel.cancelled() => return Err(ImportError::Cancelled),
            response = self.get(&target) => response.inspect_err(|e| {
                warn!(error = %e, "set page request did not complete")
            })?,
        };

        let outcome = classify(status, body, &self.challenge_markers);
        match &outcome {
            FetchOutcome::Success { status, html } => {
                debug!(status, bytes = html.len(), "fetched set page")
            }
            FetchOutcome::Blocked { status, .. } => warn!(status, "challenge page returned"),
            FetchOutcome::HttpError { status } => warn!(status, "set page request failed"),
        }
        Ok(outcome)
    }

    async fn get(&self, target: &str) -> Result<(u16, String), reqwest::Error> {
        let mut request = self.client.get(target);
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie);
        }
        // Proxy URLs may embed credentials, so errors are stripped of the URL
        let response = request.send().await.map_err(reqwest::Error::without_url)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(reqwest::Error::without_url)?;
        Ok((status, body))
    }
}

/// Rewrite `url` through the configured proxy
///
/// A proxy containing `{url}` is a template; anything else is a prefix.
pub fn build_fetch_url(url: &str, proxy: Option<&str>) -> String {
    match proxy {
        Some(template) if template.contains("{url}") => template.replace("{url}", url),
        Some(prefix) => format!("{prefix}{url}"),
        None => url.to_string(),
    }
}

/// Cookie header to send, if any; a full cookie wins over a clearance token
pub fn cookie_header(config: &FetchConfig) -> Option<String> {
    if let Some(cookie) = &config.cookie {
        return Some(cookie.clone());
    }
    config
        .clearance
        .as_ref()
        .map(|token| format!("cf_clearance={token}"))
}

/// Classify a response by status and body
///
/// `markers` must already be lowercase.
pub fn classify(status: u16, body: String, markers: &[String]) -> FetchOutcome {
    if BLOCKED_STATUSES.contains(&status) || is_challenge_body(&body, markers) {
        return FetchOutcome::Blocked { status, html: body };
    }
    if !(200..300).contains(&status) {
        return FetchOutcome::HttpError { status };
    }
    FetchOutcome::Success { html: body, status }
}

fn is_challenge_body(body: &str, markers: &[String]) -> bool {
    let lower = body.to_lowercase();
    markers.iter().any(|marker| lower.contains(marker.as_str()))
}
