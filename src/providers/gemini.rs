//! Gemini `generateContent` provider for Parley
//!
//! This module implements the Provider trait for endpoints speaking the
//! Gemini `generateContent` JSON format. The endpoint URL comes from
//! configuration; an optional API key is sent as `x-goog-api-key`.

use crate::config::EndpointConfig;
use crate::error::{ParleyError, Result};
use crate::providers::{GenerateRequest, Provider};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// HTTP provider for a `generateContent` endpoint
///
/// # Examples
///
/// ```
/// use parley::config::EndpointConfig;
/// use parley::providers::GeminiProvider;
///
/// let provider = GeminiProvider::new(EndpointConfig::default());
/// assert!(provider.is_ok());
/// ```
pub struct GeminiProvider {
    client: Client,
    config: EndpointConfig,
}

/// Successful response body
#[derive(Debug, Default, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

/// Error response body (`{"error": {"message": "..."}}`)
#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    #[serde(default)]
    error: Option<GeminiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl GeminiResponse {
    /// Text of the first part of the first candidate
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

impl GeminiProvider {
    /// Create a new provider instance
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: EndpointConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("parley/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ParleyError::Endpoint(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized Gemini provider: url={}", config.display_url());

        Ok(Self { client, config })
    }

    /// Configured endpoint URL
    pub fn url(&self) -> &str {
        &self.config.url
    }
}

/// Human-readable message for a failed response
///
/// Uses `error.message` from the body when present, otherwise synthesizes
/// one from the status code.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<GeminiErrorResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .and_then(|e| e.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()))
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn generate(&self, request: &GenerateRequest) -> Result<Option<String>> {
        tracing::debug!(
            "Sending generate request: {} turns to {}",
            request.contents.len(),
            self.config.display_url()
        );

        let mut builder = self.client.post(&self.config.url).json(request);
        if let Some(key) = &self.config.api_key {
            builder = builder.header("x-goog-api-key", key);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("Generate request failed: {}", e);
            ParleyError::Endpoint(format!("Request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Endpoint returned error {}: {}", status, error_text);
            return Err(ParleyError::Endpoint(error_message(status, &error_text)).into());
        }

        let body: GeminiResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse generate response: {}", e);
            ParleyError::Endpoint(format!("Failed to parse response: {}", e))
        })?;

        tracing::debug!(
            "Generate response: status={}, candidates={}",
            status,
            body.candidates.len()
        );

        Ok(body.first_text())
    }
}
