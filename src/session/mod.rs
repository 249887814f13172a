//! Chat sessions and their message logs
//!
//! - `types`: `Message`, `Session`, identifiers, and title derivation
//! - `store`: the in-memory `SessionStore`

pub mod store;
pub mod types;

pub use store::SessionStore;
pub use types::{
    derive_title, Message, MessageId, Role, Session, SessionId, DEFAULT_TITLE, TITLE_MAX_CHARS,
};
