//! Sign-up, login and logout handlers

use actix_web::{web, HttpResponse};
use log::info;
use serde::Serialize;

use crate::api::{check_field_set, optional_str, present_str, read_json_object, require_str};
use crate::app_state::AppState;
use crate::auth;
use crate::error::ApiError;
use crate::validation::{self, FieldErrors};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    success: bool,
    error_message: Option<String>,
    validation_error: Option<FieldErrors>,
}

pub async fn sign_up(
    payload: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let body = read_json_object(payload, state.config.server.max_payload_size).await?;
    check_field_set(&body, &["username", "password", "email", "phoneNumber"], &[])?;

    let username = present_str(&body, "username")?;
    let password = present_str(&body, "password")?;
    let email = present_str(&body, "email")?;
    let phone_number = present_str(&body, "phoneNumber")?;

    let validation = validation::validate_sign_up(username, password, email, phone_number);
    if !validation.is_empty() {
        return Ok(HttpResponse::BadRequest().json(SignUpResponse {
            success: false,
            error_message: None,
            validation_error: Some(validation),
        }));
    }

    state.accounts.sign_up(username, password, email, phone_number)?;
    Ok(HttpResponse::Ok().json(SignUpResponse {
        success: true,
        error_message: None,
        validation_error: None,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    success: bool,
    session_id: Option<String>,
    csrf_token: Option<String>,
    role: Option<String>,
    error_message: Option<String>,
    validation_error: Option<SignInValidationError>,
}

#[derive(Serialize, Default)]
struct SignInValidationError {
    username: Option<String>,
    password: Option<String>,
}

pub async fn login(
    payload: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let body = read_json_object(payload, state.config.server.max_payload_size).await?;
    // sessionId may carry the session the client already holds; logging in
    // rotates it instead of reusing it
    check_field_set(&body, &["username", "password"], &["sessionId"])?;

    let username = present_str(&body, "username")?;
    let password = present_str(&body, "password")?;

    let mut validation = SignInValidationError::default();
    if username.is_empty() {
        validation.username = Some("Username is required".to_string());
    }
    if password.is_empty() {
        validation.password = Some("Password is required".to_string());
    }
    if validation.username.is_some() || validation.password.is_some() {
        return Ok(HttpResponse::BadRequest().json(SignInResponse {
            success: false,
            session_id: None,
            csrf_token: None,
            role: None,
            error_message: None,
            validation_error: Some(validation),
        }));
    }

    let identity = state.credentials.verify(username, password)?;
    let previous = optional_str(&body, "sessionId")?;
    let session = state.sessions.create(&identity, previous)?;
    log_mdc::insert("user", &identity.username);
    info!("login for {}", identity.username);

    Ok(HttpResponse::Ok().json(SignInResponse {
        success: true,
        session_id: Some(session.session_id),
        csrf_token: Some(session.csrf_token),
        role: Some(identity.role.as_str().to_string()),
        error_message: None,
        validation_error: None,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LogoutResponse {
    success: bool,
    error_message: Option<String>,
}

pub async fn logout(
    payload: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let body = read_json_object(payload, state.config.server.max_payload_size).await?;
    check_field_set(&body, &["sessionId", "csrfToken"], &[])?;

    let session_id = require_str(&body, "sessionId")?;
    let csrf_token = require_str(&body, "csrfToken")?;

    let session = auth::require_session(state.sessions.validate(session_id)?)?;
    auth::verify_csrf(&session, csrf_token)?;
    log_mdc::insert("user", &session.username);

    state.sessions.destroy(session_id)?;
    info!("logout for {}", session.username);

    Ok(HttpResponse::Ok().json(LogoutResponse {
        success: true,
        error_message: None,
    }))
}
