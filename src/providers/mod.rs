//! Provider module for Parley
//!
//! This module contains the model endpoint abstraction, the request wire
//! types, and the Gemini `generateContent` implementation.

pub mod base;
pub mod gemini;

pub use base::{
    Content, GenerateRequest, GenerationConfig, Part, Provider, WireRole, ATTACHMENT_HEADER,
};
pub use gemini::GeminiProvider;

use crate::config::EndpointConfig;
use crate::error::Result;
use std::sync::Arc;

/// Create the provider for the configured endpoint
///
/// # Errors
///
/// Returns error if the HTTP client cannot be initialized
pub fn create_provider(config: &EndpointConfig) -> Result<Arc<dyn Provider>> {
    Ok(Arc::new(GeminiProvider::new(config.clone())?))
}
