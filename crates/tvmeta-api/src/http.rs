//! `HttpFetcher` - GET requests against a provider base URL.

use std::time::Duration;

use reqwest::Client;
use tracing::instrument;
use url::Url;

use crate::error::{Result, TvError};

/// Characters of a response body kept in error messages and traces.
const BODY_PREVIEW_CHARS: usize = 500;

/// Thin GET transport shared by the provider clients.
///
/// Holds only immutable configuration; clone freely across tasks.
#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct HttpFetcher {
    /// HTTP client (reqwest, gzip enabled).
    http_client: Client,
    /// Base URL every path is joined onto.
    base_url: Url,
}

impl HttpFetcher {
    /// Creates a fetcher.
    ///
    /// # Errors
    ///
    /// Returns `TvError::Config` if the reqwest client cannot be built.
    pub fn new(base_url: Url, user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(user_agent).gzip(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| TvError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves `path` against the base URL.
    ///
    /// # Errors
    ///
    /// Returns `TvError::Config` if the path cannot be joined.
    pub fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| TvError::Config(format!("failed to join URL path {path}: {e}")))
    }

    /// Sends a GET request and returns the status code and body.
    ///
    /// # Errors
    ///
    /// Returns `TvError::Transport` on connection failure, on a body that
    /// cannot be read, or when the status is 400 or above.
    #[instrument(skip_all, fields(path = %path))]
    pub async fn fetch(&self, path: &str, query: &[(&str, String)]) -> Result<(u16, String)> {
        let url = self.url(path)?;
        self.fetch_url(url, query).await
    }

    /// Like [`Self::fetch`], for an absolute URL.
    ///
    /// # Errors
    ///
    /// See [`Self::fetch`].
    pub async fn fetch_url(&self, url: Url, query: &[(&str, String)]) -> Result<(u16, String)> {
        let request = self
            .http_client
            .get(url)
            .query(query)
            .build()
            .map_err(transport_error)?;

        tracing::debug!(url = %request.url(), "provider request");

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        tracing::debug!(%status, body_len = body.len(), "provider response");
        tracing::trace!(body_preview = %preview(&body), "provider response body");

        if status.as_u16() >= 400 {
            let message = if body.trim().is_empty() {
                String::from(status.canonical_reason().unwrap_or("unknown status"))
            } else {
                preview(&body)
            };
            return Err(TvError::Transport {
                status: Some(status.as_u16()),
                message,
            });
        }

        Ok((status.as_u16(), body))
    }
}

/// Leading part of a body for messages.
pub(crate) fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

#[allow(clippy::needless_pass_by_value)]
fn transport_error(e: reqwest::Error) -> TvError {
    TvError::Transport {
        status: e.status().map(|s| s.as_u16()),
        message: e.to_string(),
    }
}
