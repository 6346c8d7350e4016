//! Mock implementation of the SessionStore trait for testing

use crate::error::StoreError;
use crate::session::{Session, SessionStore};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory session store
pub struct MockSessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl MockSessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

impl Default for MockSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for MockSessionStore {
    fn insert(&self, session: &Session) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().unwrap();
        if sessions.contains_key(&session.session_id) {
            return Err(StoreError::Duplicate);
        }
        sessions.insert(session.session_id.clone(), session.clone());
        Ok(())
    }

    fn get(&self, session_id: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.lock().unwrap().get(session_id).cloned())
    }

    fn delete(&self, session_id: &str) -> Result<usize, StoreError> {
        match self.sessions.lock().unwrap().remove(session_id) {
            Some(_) => Ok(1),
            None => Ok(0),
        }
    }

    fn delete_for_user(&self, username: &str) -> Result<usize, StoreError> {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|_, s| s.username != username);
        Ok(before - sessions.len())
    }
}
