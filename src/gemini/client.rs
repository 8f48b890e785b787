//! HTTP client for the Gemini `generateContent` endpoint

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use super::types::{GenerateContentBody, GenerateContentResponse, GenerateRequest};
use crate::config::GeminiConfig;

/// Message shown whenever a tool runs without an API key.
pub const MISSING_API_KEY_MESSAGE: &str = "GEMINI_API_KEY is not configured. Please set it in \
     your environment. Get key at: https://aistudio.google.com/app/apikey";

/// Failure talking to the model API
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("{}", MISSING_API_KEY_MESSAGE)]
    MissingApiKey,
    #[error("Gemini request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Gemini API returned {status}: {body}")]
    Status { status: reqwest::StatusCode, body: String },
    #[error("Failed to parse Gemini response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Gemini request timed out after {0:?}")]
    Timeout(Duration),
}

/// Anything that can turn a request into model text.
///
/// Tools take this as an injected handle so the HTTP client stays
/// caller-owned and tests can substitute canned responses.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Run one request and return the model's text (possibly empty).
    async fn generate(&self, request: GenerateRequest) -> Result<String, GeminiError>;

    /// Model name, for logging.
    fn model(&self) -> &str;
}

/// reqwest-backed Gemini client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    /// Build a client from config; fails when no API key is configured.
    pub fn from_config(config: &GeminiConfig) -> Result<Self, GeminiError> {
        let api_key = config.api_key().ok_or(GeminiError::MissingApiKey)?.to_string();
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.request_timeout(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    async fn send(&self, request: &GenerateRequest) -> Result<String, GeminiError> {
        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateContentBody::new(request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GeminiError::Status { status, body });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;
        Ok(parsed.text())
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate(&self, request: GenerateRequest) -> Result<String, GeminiError> {
        tracing::info!(model = %self.model, parts = request.parts.len(), "generating content");
        match tokio::time::timeout(self.timeout, self.send(&request)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(timeout = ?self.timeout, "generateContent timed out");
                Err(GeminiError::Timeout(self.timeout))
            }
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key() {
        let config = GeminiConfig::default();
        let err = GeminiClient::from_config(&config).unwrap_err();
        assert!(matches!(err, GeminiError::MissingApiKey));
        assert!(err.to_string().starts_with("GEMINI_API_KEY is not configured"));
    }

    #[test]
    fn test_endpoint() {
        let config = GeminiConfig {
            api_key: Some("k".into()),
            base_url: "http://localhost:9999/".into(),
            ..Default::default()
        };
        let client = GeminiClient::from_config(&config).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(client.model(), "gemini-2.5-flash");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_http_error() {
        let config = GeminiConfig {
            api_key: Some("k".into()),
            base_url: "http://127.0.0.1:9".into(),
            request_timeout_secs: 5,
            ..Default::default()
        };
        let client = GeminiClient::from_config(&config).unwrap();
        let err = client.generate(GenerateRequest::default()).await.unwrap_err();
        assert!(matches!(err, GeminiError::Http(_) | GeminiError::Timeout(_)));
    }
}
