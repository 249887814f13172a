//! Configuration management for Parley
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{ParleyError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Parley
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote model endpoint settings
    #[serde(default)]
    pub endpoint: EndpointConfig,
}

/// Remote model endpoint configuration
///
/// Generation parameters are deliberately absent: they are fixed by the
/// client and cannot be overridden.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Full URL of the `generateContent` endpoint
    #[serde(default = "default_endpoint_url")]
    pub url: String,

    /// Optional API key, sent as the `x-goog-api-key` header
    #[serde(default)]
    pub api_key: Option<String>,

    /// HTTP request timeout (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_endpoint_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        .to_string()
}

fn default_timeout_seconds() -> u64 {
    120
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: default_endpoint_url(),
            api_key: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl EndpointConfig {
    /// Endpoint URL with any query string removed, for logs and banners
    ///
    /// # Examples
    ///
    /// ```
    /// use parley::config::EndpointConfig;
    ///
    /// let config = EndpointConfig {
    ///     url: "https://host/v1/models/m:generateContent?key=secret".to_string(),
    ///     ..Default::default()
    /// };
    /// assert_eq!(config.display_url(), "https://host/v1/models/m:generateContent");
    /// ```
    pub fn display_url(&self) -> &str {
        redact_url(&self.url)
    }
}

/// Strip the query string so API keys passed as `?key=` never reach logs
pub(crate) fn redact_url(url: &str) -> &str {
    url.split_once('?').map(|(base, _)| base).unwrap_or(url)
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ParleyError::Config(format!("Failed to read config file: {}", e)))?;

        serde_yaml::from_str(&contents)
            .map_err(|e| ParleyError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(url) = std::env::var("PARLEY_ENDPOINT_URL") {
            self.endpoint.url = url;
            tracing::debug!("Env override: PARLEY_ENDPOINT_URL");
        }

        if let Ok(api_key) = std::env::var("PARLEY_API_KEY") {
            self.endpoint.api_key = Some(api_key);
            tracing::debug!("Env override: PARLEY_API_KEY");
        }

        if let Ok(timeout) = std::env::var("PARLEY_TIMEOUT_SECONDS") {
            match timeout.parse::<u64>() {
                Ok(v) => {
                    self.endpoint.timeout_seconds = v;
                    tracing::debug!(timeout_seconds = v, "Env override: PARLEY_TIMEOUT_SECONDS");
                }
                Err(_) => {
                    tracing::warn!("Invalid PARLEY_TIMEOUT_SECONDS: {}", timeout);
                }
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(url) = &cli.endpoint {
            self.endpoint.url = url.clone();
        }

        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if the endpoint URL is missing or malformed, or the
    /// timeout is out of range
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.url.trim().is_empty() {
            return Err(ParleyError::Config("endpoint.url cannot be empty".to_string()).into());
        }

        let parsed = url::Url::parse(&self.endpoint.url).map_err(|e| {
            ParleyError::Config(format!("Invalid endpoint.url {}: {}", self.endpoint.url, e))
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ParleyError::Config(format!(
                "endpoint.url must use http or https, got: {}",
                parsed.scheme()
            ))
            .into());
        }

        if self.endpoint.timeout_seconds == 0 {
            return Err(ParleyError::Config(
                "endpoint.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.endpoint.timeout_seconds > 3600 {
            return Err(ParleyError::Config(
                "endpoint.timeout_seconds must be less than or equal to 3600".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
