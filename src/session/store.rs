//! In-memory session store
//!
//! Keeps sessions most-recent-first together with the active session
//! pointer. Nothing is persisted; the store lives as long as the process.

use super::types::{Message, Session, SessionId};

/// Ordered collection of chat sessions plus the active session pointer
///
/// New sessions are prepended. Exactly one session is active unless the
/// store is empty.
///
/// # Examples
///
/// ```
/// use parley::session::{Message, SessionStore};
///
/// let mut store = SessionStore::new();
/// let first = store.create_session();
/// let second = store.create_session();
///
/// assert_eq!(store.active_id(), Some(second));
/// assert_eq!(store.sessions()[0].id(), second);
///
/// store.append_message(first, Message::user("Hello"));
/// assert_eq!(store.get(first).unwrap().title(), "Hello");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Vec<Session>,
    active: Option<SessionId>,
}

impl SessionStore {
    /// Creates an empty store with no active session
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding one fresh, active session
    pub fn with_default_session() -> Self {
        let mut store = Self::new();
        store.ensure_session();
        store
    }

    /// Creates a session if the store is empty
    ///
    /// Returns the id of the active session.
    pub fn ensure_session(&mut self) -> SessionId {
        match self.active {
            Some(id) => id,
            None => self.create_session(),
        }
    }

    /// Creates a new session, makes it active, and returns its id
    ///
    /// The session is titled "New Chat" and placed first in
    /// [`SessionStore::sessions`].
    pub fn create_session(&mut self) -> SessionId {
        let session = Session::new();
        let id = session.id();
        self.sessions.insert(0, session);
        self.active = Some(id);
        tracing::debug!(session_id = %id, "Created session");
        id
    }

    /// Removes a session
    ///
    /// When the removed session was active, the first remaining session
    /// becomes active (or none when the store is now empty). Unknown ids
    /// are ignored.
    ///
    /// # Arguments
    ///
    /// * `id` - Session to remove
    ///
    /// # Examples
    ///
    /// ```
    /// use parley::session::SessionStore;
    ///
    /// let mut store = SessionStore::new();
    /// let older = store.create_session();
    /// let newer = store.create_session();
    ///
    /// store.delete_session(newer);
    /// assert_eq!(store.active_id(), Some(older));
    ///
    /// store.delete_session(older);
    /// assert!(store.active().is_none());
    /// ```
    pub fn delete_session(&mut self, id: SessionId) {
        let Some(index) = self.sessions.iter().position(|s| s.id() == id) else {
            tracing::debug!(session_id = %id, "Delete ignored: unknown session");
            return;
        };

        self.sessions.remove(index);

        if self.active == Some(id) {
            self.active = self.sessions.first().map(Session::id);
        }

        tracing::debug!(session_id = %id, remaining = self.sessions.len(), "Deleted session");
    }

    /// Makes an existing session active
    ///
    /// # Returns
    ///
    /// Returns false (and leaves the active session unchanged) when the id
    /// is unknown
    pub fn select_session(&mut self, id: SessionId) -> bool {
        if self.get(id).is_some() {
            self.active = Some(id);
            true
        } else {
            false
        }
    }

    /// Appends a message to a session's log
    ///
    /// A user message that opens an empty log sets the session title.
    /// Unknown ids are ignored, which covers replies arriving after their
    /// session was deleted.
    ///
    /// # Arguments
    ///
    /// * `id` - Target session
    /// * `message` - Message to append at the end of the log
    pub fn append_message(&mut self, id: SessionId, message: Message) {
        match self.sessions.iter_mut().find(|s| s.id() == id) {
            Some(session) => session.push(message),
            None => {
                tracing::debug!(session_id = %id, "Append ignored: unknown session");
            }
        }
    }

    /// The active session, if any
    pub fn active(&self) -> Option<&Session> {
        self.active.and_then(|id| self.get(id))
    }

    /// Id of the active session, if any
    pub fn active_id(&self) -> Option<SessionId> {
        self.active
    }

    /// Looks up a session by id
    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id() == id)
    }

    /// Sessions, most recently created first
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Number of sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the store holds no sessions
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Role, DEFAULT_TITLE};

    #[test]
    fn test_new_store_is_empty() {
        let store = SessionStore::new();
        assert!(store.is_empty());
        assert!(store.active().is_none());
    }

    #[test]
    fn test_with_default_session() {
        let store = SessionStore::with_default_session();
        assert_eq!(store.len(), 1);
        let active = store.active().unwrap();
        assert_eq!(active.title(), DEFAULT_TITLE);
        assert!(active.messages().is_empty());
    }

    #[test]
    fn test_ensure_session_does_not_duplicate() {
        let mut store = SessionStore::with_default_session();
        let id = store.active_id().unwrap();
        assert_eq!(store.ensure_session(), id);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_create_session_prepends_and_activates() {
        let mut store = SessionStore::new();
        let mut created = Vec::new();
        for _ in 0..4 {
            let id = store.create_session();
            assert_eq!(store.active_id(), Some(id));
            assert_eq!(store.sessions()[0].id(), id);
            created.push(id);
        }

        let order: Vec<SessionId> = store.sessions().iter().map(Session::id).collect();
        created.reverse();
        assert_eq!(order, created);
    }

    #[test]
    fn test_delete_active_selects_first_remaining() {
        let mut store = SessionStore::new();
        let a = store.create_session();
        let b = store.create_session();
        let c = store.create_session();
        // ordering: c, b, a; active c

        store.delete_session(c);
        assert_eq!(store.active_id(), Some(b));

        store.select_session(a);
        store.delete_session(a);
        assert_eq!(store.active_id(), Some(b));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_inactive_keeps_active() {
        let mut store = SessionStore::new();
        let a = store.create_session();
        let b = store.create_session();

        store.delete_session(a);
        assert_eq!(store.active_id(), Some(b));
    }

    #[test]
    fn test_delete_last_session_leaves_none_active() {
        let mut store = SessionStore::with_default_session();
        let id = store.active_id().unwrap();
        store.delete_session(id);
        assert!(store.is_empty());
        assert!(store.active().is_none());
    }

    #[test]
    fn test_delete_unknown_is_noop() {
        let mut store = SessionStore::with_default_session();
        let active = store.active_id();
        store.delete_session(SessionId::new());
        assert_eq!(store.len(), 1);
        assert_eq!(store.active_id(), active);
    }

    #[test]
    fn test_select_unknown_session_is_rejected() {
        let mut store = SessionStore::with_default_session();
        let active = store.active_id();
        assert!(!store.select_session(SessionId::new()));
        assert_eq!(store.active_id(), active);
    }

    #[test]
    fn test_append_sets_title_from_first_user_message() {
        let mut store = SessionStore::with_default_session();
        let id = store.active_id().unwrap();

        store.append_message(id, Message::user("Hello world, this is long"));
        assert_eq!(store.get(id).unwrap().title(), "Hello world, this is");

        store.append_message(id, Message::user("Something else entirely"));
        assert_eq!(store.get(id).unwrap().title(), "Hello world, this is");
    }

    #[test]
    fn test_append_preserves_order() {
        let mut store = SessionStore::with_default_session();
        let id = store.active_id().unwrap();

        store.append_message(id, Message::file_marker("a.pdf"));
        store.append_message(id, Message::user("one"));
        store.append_message(id, Message::user("two"));

        let roles: Vec<Role> = store
            .get(id)
            .unwrap()
            .messages()
            .iter()
            .map(Message::role)
            .collect();
        assert_eq!(roles, vec![Role::FileMarker, Role::User, Role::User]);
        assert_eq!(store.get(id).unwrap().messages()[2].content(), "two");
    }

    #[test]
    fn test_append_after_file_marker_keeps_default_title() {
        let mut store = SessionStore::with_default_session();
        let id = store.active_id().unwrap();

        store.append_message(id, Message::file_marker("report.pdf"));
        store.append_message(id, Message::user("Summarize this report"));
        assert_eq!(store.get(id).unwrap().title(), DEFAULT_TITLE);
    }

    #[test]
    fn test_append_to_unknown_session_is_noop() {
        let mut store = SessionStore::with_default_session();
        store.append_message(SessionId::new(), Message::user("lost"));
        assert!(store.active().unwrap().messages().is_empty());
    }
}
