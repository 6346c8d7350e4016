//! Mock implementation of the IdentityStore trait for testing

use crate::error::StoreError;
use crate::identity::{Identity, IdentityStore};
use std::sync::Mutex;

/// In-memory identity store. Unlike the SQLite store it can be coaxed into
/// holding duplicate usernames, which lets tests exercise the integrity
/// checks above it.
pub struct MockIdentityStore {
    records: Mutex<Vec<Identity>>,
}

impl MockIdentityStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    /// Insert without the uniqueness check, for tests that need a corrupted
    /// store.
    pub fn insert_unchecked(&self, identity: Identity) {
        self.records.lock().unwrap().push(identity);
    }

    /// Number of stored identities.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

impl Default for MockIdentityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityStore for MockIdentityStore {
    fn insert(&self, identity: &Identity) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        if records.iter().any(|r| r.username == identity.username) {
            return Err(StoreError::Duplicate);
        }
        records.push(identity.clone());
        Ok(())
    }

    fn find_by_username(&self, username: &str) -> Result<Option<Identity>, StoreError> {
        let records = self.records.lock().unwrap();
        let matches: Vec<&Identity> =
            records.iter().filter(|r| r.username == username).collect();
        if matches.len() > 1 {
            return Err(StoreError::Integrity(format!(
                "{} credential records for username {}",
                matches.len(),
                username
            )));
        }
        Ok(matches.first().map(|r| (*r).clone()))
    }

    fn list_usernames(&self) -> Result<Vec<String>, StoreError> {
        let records = self.records.lock().unwrap();
        let mut usernames: Vec<String> = records.iter().map(|r| r.username.clone()).collect();
        usernames.sort();
        Ok(usernames)
    }

    fn delete(&self, username: &str) -> Result<usize, StoreError> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.username != username);
        Ok(before - records.len())
    }
}
