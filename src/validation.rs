//! Input validation for sign-up fields and file uploads.
//!
//! Upload checks run in a fixed order and stop at the first failure. The
//! content type is always sniffed from the file bytes; whatever type the
//! client declares is ignored.

use serde::Serialize;
use thiserror::Error;

use crate::config::UploadConfig;

/// The file part of an upload request, as decoded at the HTTP boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum FilePayload {
    /// The request carried no file content.
    Missing,
    /// The content field was present but could not be decoded.
    TransportError(String),
    /// Decoded file bytes.
    Bytes(Vec<u8>),
}

/// Why an upload was rejected. Messages are caller-facing.
#[derive(Debug, Error, PartialEq)]
pub enum UploadRejection {
    #[error("No file was uploaded")]
    NoFile,
    #[error("File was only partially uploaded")]
    Partial,
    #[error("File too large (maximum 5MB allowed)")]
    TooLarge,
    #[error("File too small (minimum 1KB required)")]
    TooSmall,
    #[error("Filename cannot be empty")]
    EmptyFilename,
    #[error("Filename too long (maximum 255 characters)")]
    FilenameTooLong,
    #[error("Filename contains invalid characters")]
    InvalidFilename,
    #[error("File type not allowed")]
    TypeNotAllowed,
}

/// Validate an upload against the policy. Returns the accepted bytes.
///
/// Check order: payload presence, transport status, size bounds, filename,
/// sniffed content type. The first failing check wins.
pub fn validate_upload<'a>(
    payload: &'a FilePayload,
    filename: &str,
    policy: &UploadConfig,
) -> Result<&'a [u8], UploadRejection> {
    let bytes = match payload {
        FilePayload::Missing => return Err(UploadRejection::NoFile),
        FilePayload::TransportError(_) => return Err(UploadRejection::Partial),
        FilePayload::Bytes(bytes) if bytes.is_empty() => return Err(UploadRejection::NoFile),
        FilePayload::Bytes(bytes) => bytes.as_slice(),
    };

    let size = bytes.len() as u64;
    if size > policy.max_size {
        return Err(UploadRejection::TooLarge);
    }
    if size < policy.min_size {
        return Err(UploadRejection::TooSmall);
    }

    if filename.is_empty() {
        return Err(UploadRejection::EmptyFilename);
    }
    if filename.chars().count() > policy.max_filename_length {
        return Err(UploadRejection::FilenameTooLong);
    }
    // Reject anything outside the allow-list instead of stripping it, so a
    // smuggled character can never survive into a stored name.
    if !filename.chars().all(is_allowed_filename_char) {
        return Err(UploadRejection::InvalidFilename);
    }

    match sniff_content_type(bytes) {
        Some(kind) if policy.allowed_types.iter().any(|t| t == kind) => Ok(bytes),
        _ => Err(UploadRejection::TypeNotAllowed),
    }
}

fn is_allowed_filename_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_'
}

/// Determine a content type from the leading bytes of a file.
pub fn sniff_content_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"%PDF-") {
        return Some("application/pdf");
    }
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("image/png");
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if !bytes.contains(&0) && std::str::from_utf8(bytes).is_ok() {
        return Some("text/plain");
    }
    None
}

/// Per-field validation errors for account sign-up.
#[derive(Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrors {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password.is_none()
            && self.email.is_none()
            && self.phone_number.is_none()
    }
}

/// Validate all sign-up fields, collecting one error message per bad field.
pub fn validate_sign_up(
    username: &str,
    password: &str,
    email: &str,
    phone_number: &str,
) -> FieldErrors {
    FieldErrors {
        username: validate_username(username),
        password: validate_password(password),
        email: validate_email(email),
        phone_number: validate_phone_number(phone_number),
    }
}

fn validate_username(username: &str) -> Option<String> {
    let len = username.chars().count();
    if !(3..=20).contains(&len) {
        return Some("Username must be 3 to 20 characters".to_string());
    }
    let valid = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Some("Username may only contain letters, digits, dashes and underscores".to_string());
    }
    None
}

fn validate_password(password: &str) -> Option<String> {
    let len = password.chars().count();
    if !(8..=30).contains(&len) {
        return Some("Password must be 8 to 30 characters".to_string());
    }
    if password.chars().any(|c| c.is_whitespace()) {
        return Some("Password must not contain spaces".to_string());
    }
    let has_symbol = password.chars().any(|c| !c.is_ascii_alphanumeric());
    if !has_symbol {
        return Some("Password must contain at least one symbol".to_string());
    }
    None
}

fn validate_email(email: &str) -> Option<String> {
    let len = email.chars().count();
    if !(5..=30).contains(&len) {
        return Some("Email must be 5 to 30 characters".to_string());
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Some("Invalid email address".to_string());
    };
    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@');
    if local.is_empty() || domain.is_empty() || !domain_ok || email.chars().any(char::is_whitespace)
    {
        return Some("Invalid email address".to_string());
    }
    None
}

fn validate_phone_number(phone_number: &str) -> Option<String> {
    let len = phone_number.chars().count();
    if !(10..=20).contains(&len) {
        return Some("Phone number must be 10 to 20 characters".to_string());
    }
    let digits = phone_number.chars().filter(char::is_ascii_digit).count();
    if digits < 10 {
        return Some("Phone number must contain at least 10 digits".to_string());
    }
    None
}
