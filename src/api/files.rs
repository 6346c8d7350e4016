//! Per-user file handlers: upload, download, delete, list

use actix_web::{web, HttpResponse};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::debug;
use serde::Serialize;
use serde_json::Value;

use crate::api::{check_field_set, present_str, read_json_object, require_str};
use crate::app_state::AppState;
use crate::auth;
use crate::error::ApiError;
use crate::identity::Role;
use crate::session::Session;
use crate::validation::{self, FilePayload};

/// Validate the session and require the customer role.
fn customer_session(state: &AppState, session_id: &str) -> Result<Session, ApiError> {
    let session = auth::authorize(state.sessions.validate(session_id)?, Role::User)?;
    log_mdc::insert("user", &session.username);
    Ok(session)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileUploadResponse {
    success: bool,
    error_message: Option<String>,
    stored_file_name: Option<String>,
}

pub async fn upload(
    payload: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let body = read_json_object(payload, state.config.server.max_payload_size).await?;
    // fileName and content presence is checked here; their contents are the
    // upload validator's business
    check_field_set(&body, &["sessionId", "csrfToken", "fileName"], &["content"])?;

    let session_id = require_str(&body, "sessionId")?;
    let csrf_token = require_str(&body, "csrfToken")?;
    let file_name = present_str(&body, "fileName")?;

    let session = customer_session(&state, session_id)?;
    auth::verify_csrf(&session, csrf_token)?;

    let file = match body.get("content") {
        None | Some(Value::Null) => FilePayload::Missing,
        Some(Value::String(s)) if s.is_empty() => FilePayload::Missing,
        Some(Value::String(s)) => match BASE64.decode(s.as_bytes()) {
            Ok(bytes) => FilePayload::Bytes(bytes),
            Err(e) => {
                debug!("upload content failed to decode: {}", e);
                FilePayload::TransportError(e.to_string())
            }
        },
        Some(_) => return Err(ApiError::Input("Field must be a string: content".to_string())),
    };

    let stored_file_name = state.files.store(&session.username, &file, file_name)?;
    Ok(HttpResponse::Ok().json(FileUploadResponse {
        success: true,
        error_message: None,
        stored_file_name: Some(stored_file_name),
    }))
}

pub async fn download(
    payload: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let body = read_json_object(payload, state.config.server.max_payload_size).await?;
    check_field_set(&body, &["sessionId", "fileName"], &[])?;

    let session_id = require_str(&body, "sessionId")?;
    let file_name = require_str(&body, "fileName")?;

    let session = customer_session(&state, session_id)?;
    let (record, bytes) = state.files.download(&session.username, file_name)?;

    let content_type =
        validation::sniff_content_type(&bytes).unwrap_or("application/octet-stream");
    Ok(HttpResponse::Ok()
        .content_type(content_type)
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", record.filename),
        ))
        .body(bytes))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileDeleteResponse {
    success: bool,
    error_message: Option<String>,
}

pub async fn delete(
    payload: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let body = read_json_object(payload, state.config.server.max_payload_size).await?;
    check_field_set(&body, &["sessionId", "csrfToken", "fileName"], &[])?;

    let session_id = require_str(&body, "sessionId")?;
    let csrf_token = require_str(&body, "csrfToken")?;
    let file_name = require_str(&body, "fileName")?;

    let session = customer_session(&state, session_id)?;
    auth::verify_csrf(&session, csrf_token)?;

    state.files.delete(&session.username, file_name)?;
    Ok(HttpResponse::Ok().json(FileDeleteResponse {
        success: true,
        error_message: None,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileEntry {
    file_name: String,
    upload_time: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileListResponse {
    success: bool,
    error_message: Option<String>,
    files: Option<Vec<FileEntry>>,
}

pub async fn list(
    payload: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let body = read_json_object(payload, state.config.server.max_payload_size).await?;
    check_field_set(&body, &["sessionId"], &[])?;

    let session_id = require_str(&body, "sessionId")?;
    let session = customer_session(&state, session_id)?;

    let files = state
        .files
        .list(&session.username)?
        .into_iter()
        .map(|record| FileEntry {
            file_name: record.filename,
            upload_time: record.upload_time,
        })
        .collect();

    Ok(HttpResponse::Ok().json(FileListResponse {
        success: true,
        error_message: None,
        files: Some(files),
    }))
}
