//! Application State Management
//!
//! This module provides the application state that contains all services
//! and their dependencies, following the dependency injection pattern.
//! There is no ambient session or database state anywhere: every store is
//! constructed here and handed to the services that need it.

use log::info;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::auth::credentials::CredentialVerifier;
use crate::config::{AppConfig, MetadataBackend, StorageBackend};
use crate::identity::mock_store::MockIdentityStore;
use crate::identity::sqlite_store::SqliteIdentityStore;
use crate::identity::IdentityStore;
use crate::metadata::mock_store::MockFileMetadataStore;
use crate::metadata::sqlite_store::SqliteFileMetadataStore;
use crate::metadata::FileMetadataStore;
use crate::service::account_service::AccountService;
use crate::service::file_service::FileService;
use crate::service::health_service::{HealthService, HostProbe, MockProbe, SystemProbe};
use crate::session::mock_store::MockSessionStore;
use crate::session::sqlite_store::SqliteSessionStore;
use crate::session::{SessionManager, SessionStore};
use crate::storage::local_store::LocalDiskStore;
use crate::storage::mock_store::MockFileStorage;
use crate::storage::FileStorage;

/// Application state containing all services and their dependencies
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub sessions: Arc<SessionManager>,
    pub credentials: Arc<CredentialVerifier>,
    pub accounts: Arc<AccountService>,
    pub files: Arc<FileService>,
    pub health: Arc<HealthService>,
}

struct Backends {
    identities: Arc<dyn IdentityStore>,
    sessions: Arc<dyn SessionStore>,
    metadata: Arc<dyn FileMetadataStore>,
    storage: Arc<dyn FileStorage>,
    probe: Arc<dyn SystemProbe>,
}

impl AppState {
    /// Create a new application state with services configured from YAML config
    pub fn new() -> Self {
        let config = AppConfig::load().expect("Failed to load configuration");
        Self::from_config(config)
    }

    /// Create application state from configuration
    pub fn from_config(config: AppConfig) -> Self {
        info!("Initializing application state with configuration");

        let conn = match config.metadata.backend {
            MetadataBackend::SQLite => {
                let db_path = Path::new(&config.metadata.db_path);
                if let Some(parent) = db_path.parent() {
                    std::fs::create_dir_all(parent)
                        .expect("Failed to create metadata directory");
                }
                info!("Using SQLite backend at {}", config.metadata.db_path);
                Some(Arc::new(Mutex::new(
                    Connection::open(db_path).expect("Failed to open the database"),
                )))
            }
            MetadataBackend::Mock => {
                info!("Using mock metadata backend");
                None
            }
        };

        let identities: Arc<dyn IdentityStore> = match &conn {
            Some(conn) => Arc::new(
                SqliteIdentityStore::new(conn.clone()).expect("Failed to create identity store"),
            ),
            None => Arc::new(MockIdentityStore::new()),
        };
        let sessions: Arc<dyn SessionStore> = match &conn {
            Some(conn) => Arc::new(
                SqliteSessionStore::new(conn.clone()).expect("Failed to create session store"),
            ),
            None => Arc::new(MockSessionStore::new()),
        };
        let metadata: Arc<dyn FileMetadataStore> = match &conn {
            Some(conn) => Arc::new(
                SqliteFileMetadataStore::new(conn.clone())
                    .expect("Failed to create file metadata store"),
            ),
            None => Arc::new(MockFileMetadataStore::new()),
        };

        let storage: Arc<dyn FileStorage> = match config.storage.backend {
            StorageBackend::LocalDisk => {
                info!("Using local disk storage at {}", config.storage.base_path);
                Arc::new(LocalDiskStore::new(config.storage.base_path.clone()))
            }
            StorageBackend::Mock => {
                info!("Using mock storage backend");
                Arc::new(MockFileStorage::new())
            }
        };

        Self::assemble(
            config,
            Backends {
                identities,
                sessions,
                metadata,
                storage,
                probe: Arc::new(HostProbe),
            },
        )
    }

    /// Create application state for testing with mock backends
    pub fn new_for_testing() -> Self {
        let mut config = AppConfig::default();
        config.storage.backend = StorageBackend::Mock;
        config.metadata.backend = MetadataBackend::Mock;
        Self::assemble(
            config,
            Backends {
                identities: Arc::new(MockIdentityStore::new()),
                sessions: Arc::new(MockSessionStore::new()),
                metadata: Arc::new(MockFileMetadataStore::new()),
                storage: Arc::new(MockFileStorage::new()),
                probe: Arc::new(MockProbe),
            },
        )
    }

    fn assemble(config: AppConfig, backends: Backends) -> Self {
        let sessions = Arc::new(SessionManager::new(
            backends.sessions,
            config.session.ttl_seconds,
        ));
        let credentials = Arc::new(
            CredentialVerifier::new(backends.identities.clone())
                .expect("Failed to create credential verifier"),
        );
        let files = Arc::new(FileService::new(
            backends.metadata.clone(),
            backends.storage,
            config.upload.clone(),
        ));
        let accounts = Arc::new(AccountService::new(
            backends.identities,
            sessions.clone(),
            files.clone(),
        ));
        let health = Arc::new(HealthService::new(backends.metadata, backends.probe));

        if let Some(bootstrap) = &config.bootstrap {
            accounts
                .ensure_admin(&bootstrap.admin_username, &bootstrap.admin_password)
                .expect("Failed to seed admin account");
        }

        info!("Application state initialized successfully");
        Self {
            config,
            sessions,
            credentials,
            accounts,
            files,
            health,
        }
    }
}
