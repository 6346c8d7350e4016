//! Account service: sign-up and admin account management

use log::{info, warn};
use std::sync::Arc;

use crate::auth::credentials;
use crate::error::ApiError;
use crate::identity::{Identity, IdentityStore, Role};
use crate::service::file_service::FileService;
use crate::session::SessionManager;

/// Account details exposed to admins.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountDetails {
    pub username: String,
    pub email: String,
    pub phone_number: String,
}

pub struct AccountService {
    identities: Arc<dyn IdentityStore>,
    sessions: Arc<SessionManager>,
    files: Arc<FileService>,
}

impl AccountService {
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        sessions: Arc<SessionManager>,
        files: Arc<FileService>,
    ) -> Self {
        Self {
            identities,
            sessions,
            files,
        }
    }

    /// Register a new customer account. Field validation happens at the
    /// boundary; this hashes the password and persists the identity.
    pub fn sign_up(
        &self,
        username: &str,
        password: &str,
        email: &str,
        phone_number: &str,
    ) -> Result<(), ApiError> {
        let password_hash = credentials::hash_password(password)?;
        let identity = Identity {
            username: username.to_string(),
            role: Role::User,
            password_hash,
            email: email.to_string(),
            phone_number: phone_number.to_string(),
        };
        match self.identities.insert(&identity) {
            Ok(()) => {
                info!("registered account {}", username);
                Ok(())
            }
            Err(crate::error::StoreError::Duplicate) => {
                warn!("sign-up rejected, username {} taken", username);
                Err(ApiError::Input("Username already exist..".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Seed an admin account unless it already exists. Admins are not
    /// created through sign-up.
    pub fn ensure_admin(&self, username: &str, password: &str) -> Result<(), ApiError> {
        if self.identities.find_by_username(username)?.is_some() {
            return Ok(());
        }
        let identity = Identity {
            username: username.to_string(),
            role: Role::Admin,
            password_hash: credentials::hash_password(password)?,
            email: String::new(),
            phone_number: String::new(),
        };
        self.identities.insert(&identity)?;
        info!("seeded admin account {}", username);
        Ok(())
    }

    /// Admin view of one account.
    pub fn account_details(&self, username: &str) -> Result<AccountDetails, ApiError> {
        match self.identities.find_by_username(username)? {
            Some(identity) => Ok(AccountDetails {
                username: identity.username,
                email: identity.email,
                phone_number: identity.phone_number,
            }),
            None => Err(ApiError::NotFound("User not found".to_string())),
        }
    }

    /// All known usernames.
    pub fn list_accounts(&self) -> Result<Vec<String>, ApiError> {
        Ok(self.identities.list_usernames()?)
    }

    /// Delete an account and everything it owns: file records, physical
    /// files, live sessions, then the identity itself. Admins cannot delete
    /// their own account.
    pub fn delete_account(&self, acting_admin: &str, target: &str) -> Result<(), ApiError> {
        if acting_admin == target {
            warn!("admin {} attempted self-deletion", acting_admin);
            return Err(ApiError::Input("Cannot delete your own account".to_string()));
        }

        if self.identities.find_by_username(target)?.is_none() {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        let removed_files = self.files.delete_all_for(target)?;
        let revoked_sessions = self.sessions.destroy_all_for(target)?;
        let affected = self.identities.delete(target)?;
        if affected == 0 {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        info!(
            "admin {} deleted account {} ({} files, {} sessions)",
            acting_admin, target, removed_files, revoked_sessions
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::identity::mock_store::MockIdentityStore;
    use crate::metadata::mock_store::MockFileMetadataStore;
    use crate::session::mock_store::MockSessionStore;
    use crate::storage::mock_store::MockFileStorage;
    use crate::validation::FilePayload;

    struct Fixture {
        identities: Arc<MockIdentityStore>,
        sessions: Arc<SessionManager>,
        files: Arc<FileService>,
        service: AccountService,
    }

    fn fixture() -> Fixture {
        let identities = Arc::new(MockIdentityStore::new());
        let sessions = Arc::new(SessionManager::new(Arc::new(MockSessionStore::new()), 3600));
        let files = Arc::new(FileService::new(
            Arc::new(MockFileMetadataStore::new()),
            Arc::new(MockFileStorage::new()),
            AppConfig::default().upload,
        ));
        let service = AccountService::new(identities.clone(), sessions.clone(), files.clone());
        Fixture {
            identities,
            sessions,
            files,
            service,
        }
    }

    #[test]
    fn test_sign_up_creates_customer_with_hashed_password() {
        let f = fixture();
        f.service
            .sign_up("alice", "Str0ng!pass", "alice@example.com", "0123456789")
            .unwrap();

        let identity = f.identities.find_by_username("alice").unwrap().unwrap();
        assert_eq!(identity.role, Role::User);
        assert_ne!(identity.password_hash, "Str0ng!pass");
        assert!(credentials::verify_password(&identity.password_hash, "Str0ng!pass"));
    }

    #[test]
    fn test_duplicate_username_reported() {
        let f = fixture();
        f.service
            .sign_up("alice", "Str0ng!pass", "a@example.com", "0123456789")
            .unwrap();
        let err = f
            .service
            .sign_up("alice", "0ther!pass", "b@example.com", "0123456789")
            .unwrap_err();
        assert_eq!(err.public_message(), "Username already exist..");
    }

    #[test]
    fn test_ensure_admin_is_idempotent() {
        let f = fixture();
        f.service.ensure_admin("root", "Sup3r!secret").unwrap();
        f.service.ensure_admin("root", "different-password").unwrap();

        let identity = f.identities.find_by_username("root").unwrap().unwrap();
        assert_eq!(identity.role, Role::Admin);
        // second call did not rotate the password
        assert!(credentials::verify_password(&identity.password_hash, "Sup3r!secret"));
    }

    #[test]
    fn test_self_deletion_rejected_without_mutation() {
        let f = fixture();
        f.service.ensure_admin("root", "Sup3r!secret").unwrap();

        let err = f.service.delete_account("root", "root").unwrap_err();
        assert_eq!(err.public_message(), "Cannot delete your own account");
        assert!(f.identities.find_by_username("root").unwrap().is_some());
    }

    #[test]
    fn test_delete_unknown_account() {
        let f = fixture();
        let err = f.service.delete_account("root", "ghost").unwrap_err();
        assert_eq!(err.public_message(), "User not found");
    }

    #[test]
    fn test_delete_account_cascades() {
        let f = fixture();
        f.service
            .sign_up("alice", "Str0ng!pass", "a@example.com", "0123456789")
            .unwrap();
        let alice = f.identities.find_by_username("alice").unwrap().unwrap();
        let session = f.sessions.create(&alice, None).unwrap();
        f.files
            .store("alice", &FilePayload::Bytes(vec![b'x'; 2048]), "doc.txt")
            .unwrap();

        f.service.delete_account("root", "alice").unwrap();

        assert!(f.identities.find_by_username("alice").unwrap().is_none());
        assert!(f.sessions.validate(&session.session_id).unwrap().is_none());
        assert!(f.files.list("alice").unwrap().is_empty());
        assert!(f.files.resolve("alice", "doc.txt").is_err());
    }
}
