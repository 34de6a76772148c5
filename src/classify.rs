//! Classification/tagging boundary.
//!
//! Extracted text is sent to a remote service that answers with a category
//! and a set of tags.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::ClassificationConfig;

#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("no text to classify")]
    EmptyText,
    #[error("classification endpoint is not configured")]
    NotConfigured,
    #[error("classification request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("classification service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid classification response: {0}")]
    InvalidResponse(String),
}

/// Category and tags assigned to a document's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

pub trait Classifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<Classification, ClassificationError>;
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
}

/// Posts `{"text": ...}` as JSON and expects `{"category", "tags"}` back.
pub struct HttpClassifier {
    client: Client,
    api_url: String,
}

impl HttpClassifier {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self, ClassificationError> {
        let api_url = api_url.into();
        if api_url.trim().is_empty() {
            return Err(ClassificationError::NotConfigured);
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("document-capture/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, api_url })
    }

    /// Returns `NotConfigured` when no endpoint is set.
    pub fn from_config(config: &ClassificationConfig) -> Result<Self, ClassificationError> {
        let api_url = config
            .api_url
            .as_deref()
            .ok_or(ClassificationError::NotConfigured)?;
        Self::new(api_url, Duration::from_secs(config.timeout_secs))
    }
}

impl Classifier for HttpClassifier {
    fn classify(&self, text: &str) -> Result<Classification, ClassificationError> {
        if text.trim().is_empty() {
            return Err(ClassificationError::EmptyText);
        }

        log::info!("Classifying {} characters via {}", text.len(), self.api_url);

        let response = self
            .client
            .post(&self.api_url)
            .json(&ClassifyRequest { text })
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(ClassificationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let classification = parse_classification(&body)?;
        log::info!(
            "Classified as '{}' with tags {:?}",
            classification.category,
            classification.tags
        );
        Ok(classification)
    }
}

/// Parses the service's JSON answer. A missing or blank category is invalid.
pub fn parse_classification(body: &str) -> Result<Classification, ClassificationError> {
    let classification: Classification = serde_json::from_str(body)
        .map_err(|e| ClassificationError::InvalidResponse(e.to_string()))?;
    if classification.category.trim().is_empty() {
        return Err(ClassificationError::InvalidResponse(
            "empty category".to_string(),
        ));
    }
    Ok(classification)
}
