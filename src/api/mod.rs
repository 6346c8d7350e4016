//! HTTP request handlers
//!
//! Every endpoint is a POST taking a JSON object with an exact field set:
//! unknown fields are rejected, not ignored, and required fields must be
//! present. Responses use the `{success, errorMessage, ...}` envelope; the
//! download endpoint alone returns raw bytes on success.

pub mod account;
pub mod admin;
pub mod files;

use actix_web::web;
use bytes::BytesMut;
use futures::StreamExt;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Register all application routes.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/signup", web::post().to(account::sign_up))
        .route("/api/login", web::post().to(account::login))
        .route("/api/logout", web::post().to(account::logout))
        .route("/api/files/upload", web::post().to(files::upload))
        .route("/api/files/download", web::post().to(files::download))
        .route("/api/files/delete", web::post().to(files::delete))
        .route("/api/files/list", web::post().to(files::list))
        .route("/api/admin/accounts", web::post().to(admin::list_accounts))
        .route(
            "/api/admin/account-details",
            web::post().to(admin::account_details),
        )
        .route("/api/admin/delete-user", web::post().to(admin::delete_user))
        .route("/api/admin/health", web::post().to(admin::health));
}

/// Read the request body and parse it as a JSON object.
pub(crate) async fn read_json_object(
    mut payload: web::Payload,
    limit: usize,
) -> Result<Map<String, Value>, ApiError> {
    let mut bytes = BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk =
            chunk.map_err(|e| ApiError::Input(format!("Failed to read request body: {}", e)))?;
        if bytes.len() + chunk.len() > limit {
            return Err(ApiError::Input("Request body too large".to_string()));
        }
        bytes.extend_from_slice(&chunk);
    }

    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|_| ApiError::Input("Invalid JSON input".to_string()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::Input("Input must be a JSON object".to_string())),
    }
}

/// Enforce the exact field set of a request: every key must be declared,
/// and every required key must be present.
pub(crate) fn check_field_set(
    body: &Map<String, Value>,
    required: &[&str],
    optional: &[&str],
) -> Result<(), ApiError> {
    for key in body.keys() {
        if !required.contains(&key.as_str()) && !optional.contains(&key.as_str()) {
            return Err(ApiError::Input(format!("Unexpected field: {}", key)));
        }
    }
    for field in required {
        if !body.contains_key(*field) {
            return Err(ApiError::Input(format!("Missing required field: {}", field)));
        }
    }
    Ok(())
}

/// A required string field that must not be empty.
pub(crate) fn require_str<'a>(
    body: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a str, ApiError> {
    let value = present_str(body, field)?;
    if value.is_empty() {
        return Err(ApiError::Input(format!("Field cannot be empty: {}", field)));
    }
    Ok(value)
}

/// A required string field that may be empty.
pub(crate) fn present_str<'a>(
    body: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a str, ApiError> {
    match body.get(field) {
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(ApiError::Input(format!("Field must be a string: {}", field))),
        None => Err(ApiError::Input(format!("Missing required field: {}", field))),
    }
}

/// An optional string field. Absent and null both mean "not given".
pub(crate) fn optional_str<'a>(
    body: &'a Map<String, Value>,
    field: &str,
) -> Result<Option<&'a str>, ApiError> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(ApiError::Input(format!("Field must be a string: {}", field))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: &str) -> Map<String, Value> {
        match serde_json::from_str::<Value>(json).unwrap() {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_check_field_set() {
        let b = body(r#"{"username": "alice", "password": "pw"}"#);
        assert!(check_field_set(&b, &["username", "password"], &[]).is_ok());
        assert!(check_field_set(&b, &["username", "password"], &["sessionId"]).is_ok());

        // extra fields are rejected, not ignored
        let err = check_field_set(&b, &["username"], &[]).unwrap_err();
        assert_eq!(err.public_message(), "Unexpected field: password");

        let err = check_field_set(&b, &["username", "password", "email"], &[]).unwrap_err();
        assert_eq!(err.public_message(), "Missing required field: email");
    }

    #[test]
    fn test_string_field_extraction() {
        let b = body(r#"{"name": "alice", "empty": "", "count": 3, "gone": null}"#);

        assert_eq!(require_str(&b, "name").unwrap(), "alice");
        assert_eq!(
            require_str(&b, "empty").unwrap_err().public_message(),
            "Field cannot be empty: empty"
        );
        assert_eq!(present_str(&b, "empty").unwrap(), "");
        assert!(require_str(&b, "count").is_err());
        assert!(require_str(&b, "missing").is_err());

        assert_eq!(optional_str(&b, "name").unwrap(), Some("alice"));
        assert_eq!(optional_str(&b, "missing").unwrap(), None);
        assert_eq!(optional_str(&b, "gone").unwrap(), None);
        assert!(optional_str(&b, "count").is_err());
    }
}
