//! Station feed HTTP client
//!
//! A feed locator is either the tracklist JSON endpoint itself or a show's
//! landing page. Landing pages embed the endpoint in the
//! `data-tracklist-url` attribute of `div#playlist-entries`; we scrape that
//! and fetch the JSON from there. Which kind a locator is gets decided from
//! the body it returns.

use scraper::{Html, Selector};

use super::adapter;
use super::domain::{FeedError, FeedSnapshot};
use super::dto::FeedEntry;

/// Element holding the tracklist locator on a landing page
const TRACKLIST_SELECTOR: &str = "div#playlist-entries";
/// Attribute with the tracklist locator
const TRACKLIST_ATTR: &str = "data-tracklist-url";

/// Station feed client
pub struct FeedClient {
    http_client: reqwest::Client,
}

impl FeedClient {
    /// Create a new client
    pub fn new() -> Self {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .unwrap_or_default();

        Self { http_client }
    }

    /// Fetch a feed, following a landing page to its tracklist if needed.
    pub async fn fetch(&self, locator: &str) -> Result<FeedSnapshot, FeedError> {
        let body = self.get_text(locator).await?;

        if looks_like_json(&body) {
            let entries = parse_tracklist(locator, &body)?;
            return Ok(adapter::to_snapshot(locator, entries));
        }

        let json_url = extract_tracklist_url(locator, &body)?;
        tracing::debug!("Landing page {} points at {}", locator, json_url);

        let body = self.get_text(&json_url).await?;
        let entries = parse_tracklist(&json_url, &body)?;
        Ok(adapter::to_snapshot(json_url, entries))
    }

    async fn get_text(&self, url: &str) -> Result<String, FeedError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| FeedError::Network {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| FeedError::Network {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

impl Default for FeedClient {
    fn default() -> Self {
        Self::new()
    }
}

fn looks_like_json(body: &str) -> bool {
    matches!(body.trim_start().chars().next(), Some('[' | '{'))
}

/// Parse the tracklist JSON array.
pub fn parse_tracklist(url: &str, body: &str) -> Result<Vec<FeedEntry>, FeedError> {
    serde_json::from_str(body).map_err(|e| FeedError::Parse {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Find the tracklist locator on a landing page.
///
/// Relative locators are resolved against the page URL.
pub fn extract_tracklist_url(page_url: &str, html: &str) -> Result<String, FeedError> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(TRACKLIST_SELECTOR)
        .map_err(|_| FeedError::MissingTracklistUrl(page_url.to_string()))?;

    let locator = document
        .select(&selector)
        .find_map(|element| element.value().attr(TRACKLIST_ATTR))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| FeedError::MissingTracklistUrl(page_url.to_string()))?;

    match reqwest::Url::parse(page_url).and_then(|base| base.join(locator)) {
        Ok(resolved) => Ok(resolved.to_string()),
        Err(_) => Ok(locator.to_string()),
    }
}
