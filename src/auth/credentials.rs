//! Credential hashing and verification

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use log::error;
use password_hash::{PasswordHash, SaltString};
use std::sync::Arc;

use crate::error::{ApiError, StoreError};
use crate::identity::{Identity, IdentityStore};

/// Hash a plaintext password into a PHC string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes)
        .map_err(|e| ApiError::Internal(format!("random source unavailable: {}", e)))?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .to_string();
    Ok(phc)
}

/// Verify a plaintext password against a stored PHC string.
pub fn verify_password(hash: &str, password: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    } else {
        false
    }
}

/// Checks submitted credentials against the identity store.
pub struct CredentialVerifier {
    identities: Arc<dyn IdentityStore>,
    // Verified against when the username is unknown, so both failure paths
    // cost one argon2 verification.
    dummy_hash: String,
}

impl CredentialVerifier {
    pub fn new(identities: Arc<dyn IdentityStore>) -> Result<Self, ApiError> {
        let dummy_hash = hash_password("placeholder-for-unknown-users")?;
        Ok(Self {
            identities,
            dummy_hash,
        })
    }

    /// Verify a username/password pair. Unknown usernames and wrong
    /// passwords fail with the identical error; a username matching more
    /// than one credential record is surfaced as an integrity fault.
    pub fn verify(&self, username: &str, password: &str) -> Result<Identity, ApiError> {
        match self.identities.find_by_username(username) {
            Ok(Some(identity)) => {
                if verify_password(&identity.password_hash, password) {
                    Ok(identity)
                } else {
                    Err(ApiError::Credentials)
                }
            }
            Ok(None) => {
                let _ = verify_password(&self.dummy_hash, password);
                Err(ApiError::Credentials)
            }
            Err(StoreError::Integrity(msg)) => {
                error!("credential lookup for {} failed: {}", username, msg);
                Err(ApiError::Integrity(msg))
            }
            Err(e) => Err(e.into()),
        }
    }
}
