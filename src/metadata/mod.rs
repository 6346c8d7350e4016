//! File Metadata Storage Layer Abstraction
//!
//! This module provides an abstraction over file-record storage backends,
//! allowing the system to use different implementations (SQLite, in-memory
//! mock) without affecting higher-level services. A file record is the
//! authoritative statement that a stored file exists and who owns it; every
//! ownership decision is made against this store, never against a path
//! built from client input.

pub mod mock_store;
pub mod sqlite_store;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Metadata for one stored file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileRecord {
    /// Username of the owning account
    pub owner: String,
    /// Stored filename, unique within the owner's directory
    pub filename: String,
    /// Storage directory relative to the storage base
    pub directory: String,
    /// Hex MD5 checksum of the stored bytes
    pub checksum: String,
    /// RFC 3339 timestamp of the upload
    pub upload_time: String,
}

/// Trait defining the file metadata storage interface
pub trait FileMetadataStore: Send + Sync {
    /// Insert a record for a newly stored file.
    fn insert(&self, record: &FileRecord) -> Result<(), StoreError>;

    /// Look up a record by owner and filename. A filename owned by someone
    /// else is indistinguishable from one that does not exist.
    fn find(&self, owner: &str, filename: &str) -> Result<Option<FileRecord>, StoreError>;

    /// List all records belonging to an owner.
    fn list_by_owner(&self, owner: &str) -> Result<Vec<FileRecord>, StoreError>;

    /// Delete a record, returning how many records were removed.
    fn delete(&self, owner: &str, filename: &str) -> Result<usize, StoreError>;

    /// Cheap liveness check against the backend.
    fn ping(&self) -> Result<(), StoreError>;
}
