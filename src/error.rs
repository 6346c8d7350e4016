//! Error types shared across stores, services and the HTTP boundary.
//!
//! Store implementations report `StoreError`; services translate those into
//! the request-facing `ApiError`, which maps onto HTTP statuses and the
//! `{success, errorMessage}` response envelope. Internal detail stays in the
//! log and never reaches a response body.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use log::error;
use serde::Serialize;
use thiserror::Error;

/// Public message used whenever internal detail must be masked.
pub const GENERIC_SERVER_ERROR: &str = "Something went wrong on the server..";

/// Errors produced by the persistence and filesystem backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("duplicate record")]
    Duplicate,
    /// Data that should be impossible under the store's own constraints,
    /// e.g. two credential rows for one username.
    #[error("integrity fault: {0}")]
    Integrity(String),
    #[error("backend error: {0}")]
    Backend(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(f, _)
                if f.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::Duplicate
            }
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
            _ => StoreError::Backend(e.to_string()),
        }
    }
}

/// Request-level error taxonomy.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing input, reported verbatim to the caller.
    #[error("{0}")]
    Input(String),
    /// Bad credentials. Never distinguishes unknown user from wrong password.
    #[error("Invalid username or password")]
    Credentials,
    /// Missing, malformed or expired session. Cause is never distinguished.
    #[error("Invalid or expired session")]
    Session,
    /// Valid session, insufficient privileges or CSRF mismatch.
    #[error("{0}")]
    Authorization(String),
    /// Absent resource, or one owned by someone else. Both look identical.
    #[error("{0}")]
    NotFound(String),
    #[error("integrity fault: {0}")]
    Integrity(String),
    #[error("storage fault: {0}")]
    Storage(String),
    #[error("internal fault: {0}")]
    Internal(String),
}

impl ApiError {
    /// The message that is allowed to appear in a response body.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Input(_)
            | ApiError::Credentials
            | ApiError::Session
            | ApiError::Authorization(_)
            | ApiError::NotFound(_) => self.to_string(),
            ApiError::Integrity(_) | ApiError::Storage(_) | ApiError::Internal(_) => {
                GENERIC_SERVER_ERROR.to_string()
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Integrity(msg) => ApiError::Integrity(msg),
            StoreError::Duplicate => {
                ApiError::Integrity("duplicate record where a unique row was expected".to_string())
            }
            StoreError::NotFound => ApiError::Storage("record vanished mid-operation".to_string()),
            StoreError::Backend(msg) => ApiError::Storage(msg),
            StoreError::Io(e) => ApiError::Storage(e.to_string()),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorEnvelope {
    success: bool,
    error_message: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Input(_) => StatusCode::BAD_REQUEST,
            ApiError::Credentials | ApiError::Session => StatusCode::UNAUTHORIZED,
            ApiError::Authorization(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Integrity(_) | ApiError::Storage(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code() == StatusCode::INTERNAL_SERVER_ERROR {
            error!("request failed: {}", self);
        }
        HttpResponse::build(self.status_code()).json(ErrorEnvelope {
            success: false,
            error_message: self.public_message(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_detail_is_masked() {
        let e = ApiError::Storage("disk exploded at /var/data/alice".to_string());
        assert_eq!(e.public_message(), GENERIC_SERVER_ERROR);

        let e = ApiError::Integrity("2 credential records for username bob".to_string());
        assert_eq!(e.public_message(), GENERIC_SERVER_ERROR);
    }

    #[test]
    fn test_recoverable_errors_are_verbatim() {
        let e = ApiError::Input("Missing required field: username".to_string());
        assert_eq!(e.public_message(), "Missing required field: username");
        assert_eq!(e.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Credentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Session.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Authorization("Access denied".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("User not found".into()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_store_error_conversion() {
        let api: ApiError = StoreError::Duplicate.into();
        assert!(matches!(api, ApiError::Integrity(_)));

        let api: ApiError = StoreError::Backend("locked".into()).into();
        assert!(matches!(api, ApiError::Storage(_)));
    }
}
