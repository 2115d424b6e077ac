//! HTTP client for the upstream advertising-metrics API.
//!
//! Wraps `reqwest` with bearer-token auth, per-request timeouts, and URL
//! construction for the page-numbered resources. Implements [`PageSource`]
//! so [`crate::fetch_all`] can drive it.

use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::Value;

use crate::error::UpstreamError;
use crate::pagination::PageSource;

/// Client for the upstream metrics API.
///
/// Holds the process-wide base URL and bearer token. Built once at startup
/// and shared read-only across requests.
pub struct UpstreamClient {
    client: Client,
    base_url: Url,
    token: String,
    max_pages: u64,
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"[redacted]")
            .field("max_pages", &self.max_pages)
            .finish_non_exhaustive()
    }
}

impl UpstreamClient {
    /// Creates a client rooted at `base_url` (e.g. `https://host/api`).
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`UpstreamError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(
        base_url: &str,
        token: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_pages: u64,
    ) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash, so `Url::join` appends resource names
        // below the API root instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| UpstreamError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url: parsed,
            token: token.to_owned(),
            max_pages: max_pages.max(1),
        })
    }

    /// Builds `{base_url}/{endpoint}?{params}&page={page}` with percent-encoded values.
    fn build_url(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
        page: u64,
    ) -> Result<Url, UpstreamError> {
        let mut url = self
            .base_url
            .join(endpoint.trim_start_matches('/'))
            .map_err(|e| UpstreamError::InvalidBaseUrl {
                base_url: format!("{}{endpoint}", self.base_url),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("page", &page.to_string());
        }
        Ok(url)
    }

    /// Sends an authenticated GET and parses the body as JSON.
    ///
    /// Account tokens travel in the query string, so only the path is ever
    /// written to errors and logs.
    ///
    /// # Errors
    ///
    /// - [`UpstreamError::Http`] on network failure or timeout.
    /// - [`UpstreamError::UnexpectedStatus`] on a non-2xx status.
    /// - [`UpstreamError::Deserialize`] if the body is not valid JSON.
    async fn request_json(&self, url: Url) -> Result<Value, UpstreamError> {
        let path = url.path().to_owned();

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| UpstreamError::Http(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(
                status = status.as_u16(),
                path = %path,
                body = %truncate(&body, 512),
                "upstream returned non-success status"
            );
            return Err(UpstreamError::UnexpectedStatus {
                status: status.as_u16(),
                url: path,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::Http(e.without_url()))?;
        serde_json::from_str(&body).map_err(|e| UpstreamError::Deserialize {
            context: path,
            source: e,
        })
    }
}

impl PageSource for UpstreamClient {
    async fn fetch_page(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
        page: u64,
    ) -> Result<Value, UpstreamError> {
        let url = self.build_url(endpoint, params, page)?;
        self.request_json(url).await
    }

    fn max_pages(&self) -> u64 {
        self.max_pages
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
