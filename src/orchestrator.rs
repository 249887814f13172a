//! Conversation orchestration
//!
//! The [`Orchestrator`] turns user input (plus any pending attachment text)
//! into a request, calls the model endpoint, and records the outcome in the
//! session store. All client state lives in one [`ChatState`] behind a
//! shared lock that observers (the presentation layer) can read at any
//! time. The lock is never held across an await, so the user message is
//! visible while a request is in flight.

use crate::error::{ParleyError, Result};
use crate::extract::{join_pages, Attachment, TextExtractor};
use crate::formatter::{format_response, sanitize, SafeMarkup};
use crate::providers::{GenerateRequest, Provider};
use crate::session::{Message, MessageId, SessionId, SessionStore};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Reply used when the endpoint answers without any text
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't process that request.";

/// Last-error text recorded when a document cannot be processed
pub const EXTRACTION_FAILED: &str = "Failed to process PDF file.";

/// Everything the presentation layer observes
#[derive(Debug, Default)]
pub struct ChatState {
    /// Sessions and the active session pointer
    pub store: SessionStore,
    /// Extracted document text waiting for the next send
    pub pending_attachment: Option<String>,
    /// Set while a send is awaiting the endpoint
    pub waiting: bool,
    /// Most recent failure, for an error banner
    pub last_error: Option<String>,
}

impl ChatState {
    /// State with one empty, active session
    pub fn new() -> Self {
        Self {
            store: SessionStore::with_default_session(),
            ..Self::default()
        }
    }
}

/// Shared handle to the client state
pub type SharedState = Arc<RwLock<ChatState>>;

/// Result of [`Orchestrator::send`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing to send or no active session; no request was made
    Skipped,
    /// The model answered; the reply was appended with this id
    Replied(MessageId),
    /// The request failed; an `Error: ...` message was appended
    Failed(String),
}

/// Result of [`Orchestrator::attach`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachOutcome {
    /// Not a PDF, or no active session; nothing happened
    Ignored,
    /// Text extracted and pending for the next send
    Attached {
        /// Number of pages read
        pages: usize,
    },
    /// The file marker was posted but extraction failed
    Failed(String),
}

/// Drives sends and attachments against the shared state
///
/// # Examples
///
/// ```no_run
/// use parley::config::EndpointConfig;
/// use parley::extract::PdfExtractor;
/// use parley::orchestrator::{Orchestrator, SendOutcome};
/// use parley::providers::create_provider;
/// use std::sync::Arc;
///
/// # async fn example() -> parley::error::Result<()> {
/// let provider = create_provider(&EndpointConfig::default())?;
/// let chat = Orchestrator::new(provider, Arc::new(PdfExtractor::new()));
///
/// if let SendOutcome::Replied(_) = chat.send("Hello!").await {
///     let state = chat.read();
///     let session = state.store.active().unwrap();
///     println!("{}", session.messages().last().unwrap().content());
/// }
/// # Ok(())
/// # }
/// ```
pub struct Orchestrator {
    state: SharedState,
    provider: Arc<dyn Provider>,
    extractor: Arc<dyn TextExtractor>,
}

impl Orchestrator {
    /// Creates an orchestrator over fresh state holding one default session
    ///
    /// # Arguments
    ///
    /// * `provider` - Model endpoint client
    /// * `extractor` - Text extractor used for uploaded documents
    pub fn new(provider: Arc<dyn Provider>, extractor: Arc<dyn TextExtractor>) -> Self {
        Self::with_state(
            Arc::new(RwLock::new(ChatState::new())),
            provider,
            extractor,
        )
    }

    /// Creates an orchestrator over existing shared state
    ///
    /// A default session is created if the store is empty.
    pub fn with_state(
        state: SharedState,
        provider: Arc<dyn Provider>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        let orchestrator = Self {
            state,
            provider,
            extractor,
        };
        orchestrator.write().store.ensure_session();
        orchestrator
    }

    /// Shared state handle for observers
    pub fn state(&self) -> SharedState {
        Arc::clone(&self.state)
    }

    /// Read access to the state
    pub fn read(&self) -> RwLockReadGuard<'_, ChatState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Write access to the state
    pub fn write(&self) -> RwLockWriteGuard<'_, ChatState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Sends user input to the model in the active session
    ///
    /// The user message is appended before the request is made. On success
    /// the formatted reply is appended; on failure an `Error: <message>`
    /// reply is appended and the message is recorded as the last error.
    /// The pending attachment and the waiting flag are cleared either way.
    ///
    /// # Arguments
    ///
    /// * `input` - Raw user input; surrounding whitespace is trimmed
    ///
    /// # Returns
    ///
    /// Returns [`SendOutcome::Skipped`] when the input is blank with no
    /// pending attachment, or when no session is active. Otherwise returns
    /// the id of the appended reply or the endpoint error message.
    pub async fn send(&self, input: &str) -> SendOutcome {
        let prompt = input.trim().to_string();

        let (session_id, request) = {
            let mut guard = self.write();
            let state = &mut *guard;

            if prompt.is_empty() && state.pending_attachment.is_none() {
                return SendOutcome::Skipped;
            }
            let Some(session) = state.store.active() else {
                return SendOutcome::Skipped;
            };

            let session_id = session.id();
            let attachment = state.pending_attachment.take();
            let request =
                GenerateRequest::build(session.messages(), &prompt, attachment.as_deref());

            state.store.append_message(session_id, Message::user(&prompt));
            state.waiting = true;
            state.last_error = None;

            (session_id, request)
        };

        tracing::info!(
            session_id = %session_id,
            turns = request.contents.len(),
            "Sending message"
        );

        let result = self.provider.generate(&request).await;

        let mut state = self.write();
        state.waiting = false;
        state.pending_attachment = None;

        match result {
            Ok(text) => {
                let reply = reply_markup(text.as_deref());
                let message = Message::assistant(reply);
                let id = message.id();
                state.store.append_message(session_id, message);
                tracing::debug!(session_id = %session_id, message_id = %id, "Reply recorded");
                SendOutcome::Replied(id)
            }
            Err(e) => {
                let error_msg = e.to_string();
                tracing::warn!(session_id = %session_id, "Send failed: {}", error_msg);
                let content = sanitize(&format!("Error: {}", error_msg));
                state
                    .store
                    .append_message(session_id, Message::assistant(content));
                state.last_error = Some(error_msg.clone());
                SendOutcome::Failed(error_msg)
            }
        }
    }

    /// Handles an uploaded file
    ///
    /// Non-PDF files are ignored without feedback. For a PDF, a file marker
    /// is posted to the active session first, then the text is extracted
    /// into the pending attachment slot (replacing anything already there).
    /// Extraction failures are recorded as the last error and leave the
    /// marker in place.
    ///
    /// # Returns
    ///
    /// Returns the page count on success, [`AttachOutcome::Ignored`] when
    /// nothing was posted, or the failure text recorded as the last error
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use parley::config::EndpointConfig;
    /// use parley::extract::{Attachment, PdfExtractor};
    /// use parley::orchestrator::{AttachOutcome, Orchestrator};
    /// use parley::providers::create_provider;
    /// use std::path::Path;
    /// use std::sync::Arc;
    ///
    /// # async fn example() -> parley::error::Result<()> {
    /// let provider = create_provider(&EndpointConfig::default())?;
    /// let chat = Orchestrator::new(provider, Arc::new(PdfExtractor::new()));
    ///
    /// let attachment = Attachment::from_path(Path::new("report.pdf")).await?;
    /// if let AttachOutcome::Attached { pages } = chat.attach(attachment).await {
    ///     println!("Read {} pages", pages);
    ///     chat.send("Summarize the report").await;
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn attach(&self, attachment: Attachment) -> AttachOutcome {
        if !attachment.is_pdf() {
            tracing::debug!(
                "Ignoring attachment {} with type {}",
                attachment.name,
                attachment.mime_type
            );
            return AttachOutcome::Ignored;
        }

        {
            let mut state = self.write();
            let Some(session_id) = state.store.active_id() else {
                return AttachOutcome::Ignored;
            };
            state
                .store
                .append_message(session_id, Message::file_marker(&attachment.name));
        }

        match self.extractor.extract_text(&attachment.bytes).await {
            Ok(pages) => {
                let page_count = pages.len();
                tracing::info!("Attached {} ({} pages)", attachment.name, page_count);
                self.write().pending_attachment = Some(join_pages(&pages));
                AttachOutcome::Attached { pages: page_count }
            }
            Err(e) => {
                tracing::error!("Failed to parse PDF {}: {}", attachment.name, e);
                self.write().last_error = Some(EXTRACTION_FAILED.to_string());
                AttachOutcome::Failed(EXTRACTION_FAILED.to_string())
            }
        }
    }

    /// Creates a new active session
    pub fn new_session(&self) -> SessionId {
        self.write().store.create_session()
    }

    /// Deletes a session; see [`SessionStore::delete_session`]
    pub fn delete_session(&self, id: SessionId) {
        self.write().store.delete_session(id);
    }

    /// Makes the session at `index` (in display order) active
    ///
    /// # Arguments
    ///
    /// * `index` - Zero-based position in [`SessionStore::sessions`]
    ///
    /// # Returns
    ///
    /// Returns the id of the newly active session
    ///
    /// # Errors
    ///
    /// Returns error if there is no session at that index
    pub fn select_index(&self, index: usize) -> Result<SessionId> {
        let mut state = self.write();
        let id = session_at(&state.store, index)?;
        state.store.select_session(id);
        Ok(id)
    }

    /// Id of the session at `index` (in display order)
    ///
    /// # Errors
    ///
    /// Returns error if there is no session at that index
    pub fn session_id_at(&self, index: usize) -> Result<SessionId> {
        session_at(&self.read().store, index)
    }
}

fn session_at(store: &SessionStore, index: usize) -> Result<SessionId> {
    store
        .sessions()
        .get(index)
        .map(|s| s.id())
        .ok_or_else(|| ParleyError::Command(format!("No session at index {}", index + 1)).into())
}

/// Formats endpoint text, substituting the fallback for empty replies
fn reply_markup(text: Option<&str>) -> SafeMarkup {
    let trimmed = text.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        format_response(FALLBACK_REPLY)
    } else {
        format_response(trimmed)
    }
}
