//! Identity Storage Layer Abstraction
//!
//! Accounts are keyed by username and carry a role, a password hash and the
//! contact details collected at sign-up. Store implementations are swappable
//! (SQLite, in-memory mock) without affecting the services above them.

pub mod mock_store;
pub mod sqlite_store;

use crate::error::StoreError;

/// Closed set of account roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }
}

/// A stored account. The password hash is opaque to everything but the
/// credential verifier.
#[derive(Debug, Clone)]
pub struct Identity {
    pub username: String,
    pub role: Role,
    pub password_hash: String,
    pub email: String,
    pub phone_number: String,
}

/// Trait defining the identity storage interface
pub trait IdentityStore: Send + Sync {
    /// Insert a new identity. Fails with `StoreError::Duplicate` when the
    /// username is already taken.
    fn insert(&self, identity: &Identity) -> Result<(), StoreError>;

    /// Look up at most one identity by username. More than one matching
    /// record is an integrity fault and must be surfaced, never resolved
    /// by picking a row.
    fn find_by_username(&self, username: &str) -> Result<Option<Identity>, StoreError>;

    /// List every known username.
    fn list_usernames(&self) -> Result<Vec<String>, StoreError>;

    /// Delete an identity, returning how many records were removed.
    fn delete(&self, username: &str) -> Result<usize, StoreError>;
}
