//! Session and message types

use crate::formatter::SafeMarkup;
use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// Title of a session whose log was not opened by a user message
pub const DEFAULT_TITLE: &str = "New Chat";

/// Maximum number of characters kept from the first user message as a title
pub const TITLE_MAX_CHARS: usize = 20;

/// Unique, opaque session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique, opaque message identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Typed by the user
    User,
    /// Produced by the model (or an error surfaced in the transcript)
    Assistant,
    /// Breadcrumb recording an uploaded file; never sent to the model
    FileMarker,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::FileMarker => write!(f, "file"),
        }
    }
}

/// One turn in a session
///
/// Fields are private so a message cannot change once created. Assistant
/// content can only be built from [`SafeMarkup`], which keeps unsanitized
/// model output out of the transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    id: MessageId,
    role: Role,
    content: String,
    created_at: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: String) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content,
            created_at: Utc::now(),
        }
    }

    /// Creates a user message holding plain text
    ///
    /// # Examples
    ///
    /// ```
    /// use parley::session::{Message, Role};
    ///
    /// let msg = Message::user("Hello!");
    /// assert_eq!(msg.role(), Role::User);
    /// assert_eq!(msg.content(), "Hello!");
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into())
    }

    /// Creates an assistant message from sanitized markup
    pub fn assistant(content: SafeMarkup) -> Self {
        Self::new(Role::Assistant, content.into_string())
    }

    /// Creates the file breadcrumb posted when a document is uploaded
    ///
    /// # Examples
    ///
    /// ```
    /// use parley::session::Message;
    ///
    /// let msg = Message::file_marker("paper.pdf");
    /// assert_eq!(msg.content(), "📄 File uploaded: paper.pdf");
    /// ```
    pub fn file_marker(file_name: &str) -> Self {
        Self::new(Role::FileMarker, format!("📄 File uploaded: {}", file_name))
    }

    /// Message identifier
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Message author
    pub fn role(&self) -> Role {
        self.role
    }

    /// Message text: markup for assistant messages, plain text otherwise
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Creation timestamp
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// One independent conversation thread
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    title: String,
    messages: Vec<Message>,
    created_at: DateTime<Utc>,
}

impl Session {
    pub(crate) fn new() -> Self {
        Self {
            id: SessionId::new(),
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Session identifier
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Display title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Messages in append order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Creation timestamp
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Appends a message
    ///
    /// The title is derived only when a user message opens an empty log. A
    /// session that starts with a file marker keeps [`DEFAULT_TITLE`].
    pub(crate) fn push(&mut self, message: Message) {
        if message.role == Role::User && self.messages.is_empty() {
            self.title = derive_title(&message.content);
        }

        self.messages.push(message);
    }
}

/// Builds a session title from the first user message
///
/// The content is trimmed and cut to [`TITLE_MAX_CHARS`] characters; a cut
/// that ends on a space keeps it.
///
/// # Arguments
///
/// * `content` - Text of the message that opens the session
///
/// # Returns
///
/// Returns the title, or [`DEFAULT_TITLE`] when the trimmed content is empty
///
/// # Examples
///
/// ```
/// use parley::session::derive_title;
///
/// assert_eq!(derive_title("Hello world, this is long"), "Hello world, this is");
/// assert_eq!(derive_title("   "), "New Chat");
/// ```
pub fn derive_title(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return DEFAULT_TITLE.to_string();
    }

    trimmed.chars().take(TITLE_MAX_CHARS).collect()
}
