//! Access control guard
//!
//! Every handler funnels its session through these checks before touching a
//! domain operation. Role requirements are exact: file endpoints demand the
//! `user` role, admin endpoints demand `admin`. State-mutating requests must
//! additionally present the CSRF token bound to their session.

pub mod credentials;

use log::warn;

use crate::error::ApiError;
use crate::identity::Role;
use crate::session::Session;

/// Require any authenticated session, regardless of role.
pub fn require_session(session: Option<Session>) -> Result<Session, ApiError> {
    session.ok_or(ApiError::Session)
}

/// Require an authenticated session holding exactly the given role.
pub fn authorize(session: Option<Session>, required: Role) -> Result<Session, ApiError> {
    let session = require_session(session)?;
    if session.role != required {
        warn!(
            "access denied for {}: has role {}, needs {}",
            session.username,
            session.role.as_str(),
            required.as_str()
        );
        let message = match required {
            Role::Admin => "Access denied: Admin privileges required",
            Role::User => "Access denied",
        };
        return Err(ApiError::Authorization(message.to_string()));
    }
    Ok(session)
}

/// Check the CSRF token a state-mutating request presented against the one
/// bound to the session. A mismatch denies the request even though the
/// session itself is valid.
pub fn verify_csrf(session: &Session, token: &str) -> Result<(), ApiError> {
    if session.csrf_token != token {
        warn!("CSRF token mismatch for {}", session.username);
        return Err(ApiError::Authorization("Access denied".to_string()));
    }
    Ok(())
}
