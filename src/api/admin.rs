//! Admin handlers: account listing and detail, user deletion, health probe

use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::api::{check_field_set, read_json_object, require_str};
use crate::app_state::AppState;
use crate::auth;
use crate::error::ApiError;
use crate::identity::Role;
use crate::service::health_service::ServerStatus;
use crate::session::Session;

/// Validate the session and require the admin role.
fn admin_session(state: &AppState, session_id: &str) -> Result<Session, ApiError> {
    let session = auth::authorize(state.sessions.validate(session_id)?, Role::Admin)?;
    log_mdc::insert("user", &session.username);
    Ok(session)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountEntry {
    username: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserListResponse {
    success: bool,
    error_message: Option<String>,
    accounts: Option<Vec<AccountEntry>>,
}

pub async fn list_accounts(
    payload: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let body = read_json_object(payload, state.config.server.max_payload_size).await?;
    check_field_set(&body, &["sessionId"], &[])?;

    let session_id = require_str(&body, "sessionId")?;
    admin_session(&state, session_id)?;

    let accounts = state
        .accounts
        .list_accounts()?
        .into_iter()
        .map(|username| AccountEntry { username })
        .collect();

    Ok(HttpResponse::Ok().json(UserListResponse {
        success: true,
        error_message: None,
        accounts: Some(accounts),
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountDetailsPayload {
    username: String,
    email: String,
    phone_number: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountDetailsResponse {
    success: bool,
    error_message: Option<String>,
    details: Option<AccountDetailsPayload>,
}

pub async fn account_details(
    payload: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let body = read_json_object(payload, state.config.server.max_payload_size).await?;
    check_field_set(&body, &["sessionId", "accountUsername"], &[])?;

    let session_id = require_str(&body, "sessionId")?;
    let account_username = require_str(&body, "accountUsername")?;
    admin_session(&state, session_id)?;

    let details = state.accounts.account_details(account_username)?;
    Ok(HttpResponse::Ok().json(AccountDetailsResponse {
        success: true,
        error_message: None,
        details: Some(AccountDetailsPayload {
            username: details.username,
            email: details.email,
            phone_number: details.phone_number,
        }),
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteUserResponse {
    success: bool,
    error_message: Option<String>,
}

pub async fn delete_user(
    payload: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let body = read_json_object(payload, state.config.server.max_payload_size).await?;
    check_field_set(&body, &["sessionId", "csrfToken", "accountUsername"], &[])?;

    let session_id = require_str(&body, "sessionId")?;
    let csrf_token = require_str(&body, "csrfToken")?;
    let account_username = require_str(&body, "accountUsername")?;

    let session = admin_session(&state, session_id)?;
    auth::verify_csrf(&session, csrf_token)?;

    state
        .accounts
        .delete_account(&session.username, account_username)?;
    Ok(HttpResponse::Ok().json(DeleteUserResponse {
        success: true,
        error_message: None,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ServerHealthResponse {
    success: bool,
    error_message: Option<String>,
    status: Option<ServerStatus>,
}

pub async fn health(
    payload: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let body = read_json_object(payload, state.config.server.max_payload_size).await?;
    check_field_set(&body, &["sessionId"], &[])?;

    let session_id = require_str(&body, "sessionId")?;
    admin_session(&state, session_id)?;

    Ok(HttpResponse::Ok().json(ServerHealthResponse {
        success: true,
        error_message: None,
        status: Some(state.health.status()),
    }))
}
