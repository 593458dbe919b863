//! In-memory session store, one session per user identity.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::checklist::session::Session;

/// Holds one mutable [`Session`] per user, created on first access.
///
/// The store itself does no per-user serialization of events: it assumes the
/// transport delivers at most one in-flight event per user at a time. Two
/// concurrent `update` calls for the same user would race on the
/// read-modify-write of that session.
pub struct SessionStore {
    entries: usize,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    /// Create a store for checklists of `entries` items.
    pub fn new(entries: usize) -> Self {
        Self {
            entries,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Clone of the user's session, creating an empty one on first access.
    pub async fn snapshot(&self, user_id: &str) -> Session {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(user_id.to_string())
            .or_insert_with(|| Session::new(self.entries))
            .clone()
    }

    /// Mutate the user's session in place, creating it on first access.
    pub async fn update<T>(&self, user_id: &str, f: impl FnOnce(&mut Session) -> T) -> T {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry(user_id.to_string())
            .or_insert_with(|| Session::new(self.entries));
        f(session)
    }

    /// Reset the user's session to the initial empty state.
    pub async fn clear(&self, user_id: &str) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(user_id) {
            session.reset();
        }
    }
}
