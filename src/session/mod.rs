//! Session Storage Layer Abstraction
//!
//! Sessions live in a durable store keyed by an unguessable identifier and
//! survive process restarts. The manager on top owns the full lifecycle:
//! issue on successful login, validate on every request (failing closed),
//! destroy on logout or administrative revocation.

pub mod mock_store;
pub mod sqlite_store;

use chrono::{DateTime, Utc};
use log::{debug, info};
use std::sync::Arc;

use crate::error::{ApiError, StoreError};
use crate::identity::{Identity, Role};

/// A server-side session. The role is copied from the identity at creation
/// time and is not refreshed afterwards, so a role change does not affect
/// sessions already in flight.
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: String,
    pub username: String,
    pub role: Role,
    pub csrf_token: String,
    pub created_at: DateTime<Utc>,
}

/// Trait defining the durable session storage interface
pub trait SessionStore: Send + Sync {
    /// Persist a new session.
    fn insert(&self, session: &Session) -> Result<(), StoreError>;

    /// Fetch a session by its identifier.
    fn get(&self, session_id: &str) -> Result<Option<Session>, StoreError>;

    /// Remove a session, returning how many records were removed.
    fn delete(&self, session_id: &str) -> Result<usize, StoreError>;

    /// Remove every session belonging to a username.
    fn delete_for_user(&self, username: &str) -> Result<usize, StoreError>;
}

/// Number of random bytes behind each session and CSRF token.
const TOKEN_BYTES: usize = 32;

/// Hex length of a well-formed token.
const TOKEN_LEN: usize = TOKEN_BYTES * 2;

fn generate_token() -> Result<String, ApiError> {
    let mut buf = [0u8; TOKEN_BYTES];
    getrandom::getrandom(&mut buf)
        .map_err(|e| ApiError::Internal(format!("random source unavailable: {}", e)))?;
    Ok(hex::encode(buf))
}

fn is_well_formed(session_id: &str) -> bool {
    session_id.len() == TOKEN_LEN && session_id.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Owns session creation, validation and destruction.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    ttl_seconds: u64,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, ttl_seconds: u64) -> Self {
        Self { store, ttl_seconds }
    }

    /// Issue a session for a verified identity. When the client presented a
    /// previous session identifier it is destroyed first, so a login always
    /// rotates the identifier instead of adopting one the client chose.
    pub fn create(&self, identity: &Identity, previous: Option<&str>) -> Result<Session, ApiError> {
        if let Some(prev) = previous {
            self.destroy(prev)?;
        }
        let session = Session {
            session_id: generate_token()?,
            username: identity.username.clone(),
            role: identity.role,
            csrf_token: generate_token()?,
            created_at: Utc::now(),
        };
        self.store.insert(&session)?;
        info!(
            "issued session {} for {}",
            &session.session_id[..8],
            identity.username
        );
        Ok(session)
    }

    /// Look up a session, failing closed. Unknown, malformed and expired
    /// identifiers all come back as `None`; expired sessions are removed
    /// when observed.
    pub fn validate(&self, session_id: &str) -> Result<Option<Session>, ApiError> {
        if !is_well_formed(session_id) {
            return Ok(None);
        }
        let Some(session) = self.store.get(session_id)? else {
            return Ok(None);
        };
        let age = Utc::now().signed_duration_since(session.created_at);
        if age >= chrono::Duration::seconds(self.ttl_seconds as i64) {
            debug!("session {} expired, removing", &session_id[..8]);
            self.store.delete(session_id)?;
            return Ok(None);
        }
        Ok(Some(session))
    }

    /// Destroy a session. Succeeds whether or not it still exists.
    pub fn destroy(&self, session_id: &str) -> Result<(), ApiError> {
        let removed = self.store.delete(session_id)?;
        if removed > 0 && session_id.len() >= 8 {
            info!("destroyed session {}", &session_id[..8]);
        }
        Ok(())
    }

    /// Destroy every session belonging to a username. Used when the
    /// underlying identity is deleted.
    pub fn destroy_all_for(&self, username: &str) -> Result<usize, ApiError> {
        let removed = self.store.delete_for_user(username)?;
        if removed > 0 {
            info!("revoked {} session(s) for {}", removed, username);
        }
        Ok(removed)
    }
}
