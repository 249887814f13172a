//! Parley - multi-session chat client library
//!
//! This library provides the core of the Parley chat client: in-memory chat
//! sessions, the conversation orchestrator that talks to a remote
//! `generateContent` endpoint, PDF text extraction for attachments, and the
//! formatter that turns model replies into sanitized markup.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Session and message types and the session store
//! - `orchestrator`: Send and attach flows over shared chat state
//! - `providers`: Endpoint abstraction and the Gemini implementation
//! - `extract`: Attachments and document text extraction
//! - `formatter`: Reply formatting and the markup sanitizer
//! - `commands`: CLI command handlers and terminal rendering
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use parley::extract::PdfExtractor;
//! use parley::providers::create_provider;
//! use parley::{Config, Orchestrator};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let provider = create_provider(&config.endpoint)?;
//!     let chat = Orchestrator::new(provider, Arc::new(PdfExtractor::new()));
//!     chat.send("Hello!").await;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod extract;
pub mod formatter;
pub mod orchestrator;
pub mod providers;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use error::{ParleyError, Result};
pub use formatter::{format_response, sanitize, SafeMarkup};
pub use orchestrator::{AttachOutcome, ChatState, Orchestrator, SendOutcome};
pub use session::{Message, Role, Session, SessionId, SessionStore};

#[cfg(test)]
pub mod test_utils;
