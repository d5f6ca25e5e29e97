//! Classification backend client
//!
//! The backend is one request/response call per image: `POST` of
//! `{ "image": <path> }` answered with a [`Verdict`] JSON object.

use std::time::Duration;

use async_trait::async_trait;
use dfd_common::Verdict;
use serde::Serialize;
use thiserror::Error;

const USER_AGENT: &str = concat!("dfd-dash/", env!("CARGO_PKG_VERSION"));

/// Classification errors
///
/// The `Display` text is what the log console shows after
/// `"Error checking <id>: "`.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// Transport failure (connection refused, reset, DNS)
    #[error("Network error: {0}")]
    Network(String),

    /// Backend answered with a non-success status
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Response body was not a verdict
    #[error("Parse error: {0}")]
    Parse(String),

    /// Backend reported a failure in its `error` field
    #[error("Backend error: {0}")]
    Backend(String),

    /// No answer within the request timeout
    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    /// Request cancelled before completion
    #[error("Request cancelled")]
    Cancelled,
}

/// Classification backend seam
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify the image at `image_path`
    async fn classify(&self, image_path: &str) -> Result<Verdict, ClassifyError>;
}

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    image: &'a str,
}

/// Reject verdicts carrying a backend-reported failure
pub fn check_backend_error(verdict: Verdict) -> Result<Verdict, ClassifyError> {
    match verdict.error {
        Some(message) => Err(ClassifyError::Backend(message)),
        None => Ok(verdict),
    }
}

/// HTTP classifier (reqwest)
pub struct HttpClassifier {
    http_client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpClassifier {
    /// Create a client posting to `endpoint`
    ///
    /// `timeout` bounds the whole request at the transport level.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ClassifyError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ClassifyError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, image_path: &str) -> Result<Verdict, ClassifyError> {
        tracing::debug!(image = %image_path, url = %self.endpoint, "Requesting classification");

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&ClassifyRequest { image: image_path })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassifyError::Timeout(self.timeout)
                } else {
                    ClassifyError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClassifyError::Api(status.as_u16(), error_text));
        }

        let verdict: Verdict = response
            .json()
            .await
            .map_err(|e| ClassifyError::Parse(e.to_string()))?;

        let verdict = check_backend_error(verdict)?;

        tracing::debug!(
            image = %image_path,
            label = verdict.label_text(),
            "Classification received"
        );

        Ok(verdict)
    }
}
