//! HTTP Session Recorder
//!
//! Posts completed-session summaries to the yogaflow API.

use std::time::Duration;

use async_trait::async_trait;

use super::traits::{SessionRecorder, SessionSummary};

/// Recorder that posts to `{base_url}/sessions`
#[derive(Clone, Debug)]
pub struct HttpSessionRecorder {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpSessionRecorder {
    /// Create a recorder for the API rooted at `base_url`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    fn sessions_url(&self) -> String {
        format!("{}/sessions", self.base_url)
    }
}

#[async_trait]
impl SessionRecorder for HttpSessionRecorder {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn save(&self, summary: SessionSummary) -> anyhow::Result<()> {
        let response = self
            .http_client
            .post(self.sessions_url())
            .json(&summary)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("session API returned {status}: {body}");
        }

        tracing::debug!(
            sequence_id = %summary.sequence_id,
            "Session summary saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sessions_url() {
        let recorder =
            HttpSessionRecorder::new("http://localhost:8080/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(recorder.sessions_url(), "http://localhost:8080/api/sessions");
    }
}
