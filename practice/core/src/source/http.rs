//! HTTP Sequence Source
//!
//! Fetches sequences from the yogaflow REST API.
//!
//! # API
//!
//! - `GET {base_url}/sequences/{id}` - a single sequence as camelCase JSON
//!
//! A `404` maps to [`FetchError::NotFound`]. Every other failure (connect,
//! timeout, other status codes, malformed or invalid bodies) is a
//! [`FetchError::Transport`]. No retries happen here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};

use super::traits::{FetchError, SequenceSource};
use crate::sequence::{Sequence, SequenceId};

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// REST-backed sequence source
#[derive(Clone, Debug)]
pub struct HttpSequenceSource {
    /// API root, without a trailing slash
    base_url: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpSequenceSource {
    /// Create a source for the API rooted at `base_url`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a source with a custom request timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    /// API root this source talks to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of a single sequence
    ///
    /// The id is one percent-encoded path segment, so `/`, `?` and `#` in an
    /// id can never address a different resource.
    fn sequence_url(&self, id: &SequenceId) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.base_url).map_err(FetchError::transport)?;
        url.path_segments_mut()
            .map_err(|()| FetchError::Transport(format!("invalid API base URL: {}", self.base_url)))?
            .pop_if_empty()
            .push("sequences")
            .push(id.as_str());
        Ok(url)
    }
}

/// Map a non-success status to a fetch error
fn status_error(status: StatusCode, id: &SequenceId) -> FetchError {
    if status == StatusCode::NOT_FOUND {
        FetchError::NotFound(id.clone())
    } else {
        FetchError::Transport(format!("sequence API returned {status}"))
    }
}

#[async_trait]
impl SequenceSource for HttpSequenceSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self, id: &SequenceId) -> Result<Sequence, FetchError> {
        let url = self.sequence_url(id)?;
        tracing::debug!(%url, "Fetching sequence");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(FetchError::transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, id));
        }

        let body = response.bytes().await.map_err(FetchError::transport)?;
        let sequence: Sequence = serde_json::from_slice(&body).map_err(FetchError::transport)?;

        tracing::info!(
            sequence_id = %sequence.id(),
            poses = sequence.len(),
            "Fetched sequence"
        );
        Ok(sequence)
    }
}
