//! Base provider trait and wire types for Parley
//!
//! This module defines the `Provider` trait implemented by model endpoints,
//! along with the request structures serialized onto the wire.

use crate::error::Result;
use crate::session::{Message, Role};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Label for text appended to a prompt from an attached document
pub const ATTACHMENT_HEADER: &str = "PDF Content:";

/// Speaker of a turn in the wire format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    /// Turn written by the user
    User,
    /// Turn written by the model
    Model,
}

/// A single text part of a turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    /// Text content
    pub text: String,
}

/// One turn of conversation history as sent to the endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    /// Speaker
    pub role: WireRole,
    /// Parts; Parley always sends exactly one text part
    pub parts: Vec<Part>,
}

impl Content {
    /// Creates a single-part text turn
    ///
    /// # Examples
    ///
    /// ```
    /// use parley::providers::{Content, WireRole};
    ///
    /// let turn = Content::text(WireRole::User, "Hello");
    /// assert_eq!(turn.parts.len(), 1);
    /// assert_eq!(turn.parts[0].text, "Hello");
    /// ```
    pub fn text(role: WireRole, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part { text: text.into() }],
        }
    }
}

/// Sampling parameters sent with every request
///
/// The values are fixed; there is no configuration surface for them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sampling temperature
    pub temperature: f64,
    /// Top-k sampling cutoff
    pub top_k: u32,
    /// Nucleus sampling cutoff
    pub top_p: f64,
    /// Upper bound on generated tokens
    pub max_output_tokens: u32,
}

impl GenerationConfig {
    /// The parameters used for every request
    pub const FIXED: Self = Self {
        temperature: 0.9,
        top_k: 1,
        top_p: 1.0,
        max_output_tokens: 2048,
    };
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::FIXED
    }
}

/// Body of a `generateContent` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Conversation history followed by the new user turn
    pub contents: Vec<Content>,
    /// Sampling parameters
    pub generation_config: GenerationConfig,
}

impl GenerateRequest {
    /// Builds a request from a session's history and a new prompt
    ///
    /// File markers are dropped from the history; user and assistant
    /// messages map to the `user` and `model` wire roles. The new turn
    /// carries `prompt`, followed by the attachment text under a
    /// `PDF Content:` header when one is supplied.
    ///
    /// # Examples
    ///
    /// ```
    /// use parley::providers::GenerateRequest;
    /// use parley::session::Message;
    ///
    /// let history = vec![Message::file_marker("a.pdf"), Message::user("hi")];
    /// let request = GenerateRequest::build(&history, "summarize", Some("page one"));
    ///
    /// assert_eq!(request.contents.len(), 2);
    /// assert_eq!(
    ///     request.contents[1].parts[0].text,
    ///     "summarize\n\nPDF Content:\npage one"
    /// );
    /// ```
    pub fn build(history: &[Message], prompt: &str, attachment: Option<&str>) -> Self {
        let mut contents: Vec<Content> = history
            .iter()
            .filter_map(|m| {
                let role = match m.role() {
                    Role::User => WireRole::User,
                    Role::Assistant => WireRole::Model,
                    Role::FileMarker => return None,
                };
                Some(Content::text(role, m.content()))
            })
            .collect();

        let turn = match attachment {
            Some(text) => format!("{}\n\n{}\n{}", prompt, ATTACHMENT_HEADER, text),
            None => prompt.to_string(),
        };
        contents.push(Content::text(WireRole::User, turn));

        Self {
            contents,
            generation_config: GenerationConfig::FIXED,
        }
    }
}

/// A model endpoint capable of answering a conversation
///
/// Implementations return the raw text of the first candidate's first part,
/// or `None` when the response carries no text. Failures (transport,
/// non-success status, malformed body) are reported as errors whose display
/// text is suitable for the transcript.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Sends a request and returns the reply text, if any
    ///
    /// # Errors
    ///
    /// Returns error if the call fails or the response cannot be read
    async fn generate(&self, request: &GenerateRequest) -> Result<Option<String>>;
}
