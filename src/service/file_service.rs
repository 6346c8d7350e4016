//! File service: ownership-scoped storage operations
//!
//! Pairs every physical file operation with its metadata record. Bytes are
//! written before the record is inserted, and a failed insert rolls the
//! bytes back, so a record can never point at a file that does not exist.

use chrono::Utc;
use log::{error, info, warn};
use std::sync::Arc;

use crate::config::UploadConfig;
use crate::error::ApiError;
use crate::metadata::{FileMetadataStore, FileRecord};
use crate::storage::FileStorage;
use crate::validation::{self, FilePayload};

/// Caller-facing message for a file that is absent or not owned by the
/// requester. Both cases must read identically.
pub const FILE_NOT_FOUND: &str = "File not found or access denied";

pub struct FileService {
    metadata: Arc<dyn FileMetadataStore>,
    storage: Arc<dyn FileStorage>,
    policy: UploadConfig,
}

impl FileService {
    pub fn new(
        metadata: Arc<dyn FileMetadataStore>,
        storage: Arc<dyn FileStorage>,
        policy: UploadConfig,
    ) -> Self {
        Self {
            metadata,
            storage,
            policy,
        }
    }

    /// Validate and store an upload for an owner. Returns the stored name,
    /// which may carry a collision suffix when the desired name was taken.
    pub fn store(
        &self,
        owner: &str,
        payload: &FilePayload,
        desired_name: &str,
    ) -> Result<String, ApiError> {
        let bytes = validation::validate_upload(payload, desired_name, &self.policy)
            .map_err(|rejection| ApiError::Input(rejection.to_string()))?;

        let stored_name = self.storage.write_unique(owner, desired_name, bytes)?;
        let record = FileRecord {
            owner: owner.to_string(),
            filename: stored_name.clone(),
            directory: owner.to_string(),
            checksum: format!("{:x}", md5::compute(bytes)),
            upload_time: Utc::now().to_rfc3339(),
        };

        if let Err(e) = self.metadata.insert(&record) {
            error!(
                "file record insert failed for {}/{}: {}",
                owner, stored_name, e
            );
            // roll the physical write back so no unrecorded file lingers
            if let Err(rm) = self.storage.remove(owner, &stored_name) {
                error!(
                    "rollback failed, orphan file left at {}/{}: {}",
                    owner, stored_name, rm
                );
            }
            return Err(e.into());
        }

        info!("stored {}/{} ({} bytes)", owner, stored_name, bytes.len());
        Ok(stored_name)
    }

    /// Resolve a filename to its record, checking ownership in the same
    /// lookup. Someone else's file and a nonexistent file produce the
    /// identical outcome.
    pub fn resolve(&self, owner: &str, filename: &str) -> Result<FileRecord, ApiError> {
        match self.metadata.find(owner, filename)? {
            Some(record) => Ok(record),
            None => Err(ApiError::NotFound(FILE_NOT_FOUND.to_string())),
        }
    }

    /// Resolve and read a file, verifying its stored checksum.
    pub fn download(&self, owner: &str, filename: &str) -> Result<(FileRecord, Vec<u8>), ApiError> {
        let record = self.resolve(owner, filename)?;
        let bytes = match self.storage.read(&record.directory, &record.filename) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(
                    "record {}/{} points at unreadable file: {}",
                    owner, record.filename, e
                );
                return Err(e.into());
            }
        };
        let checksum = format!("{:x}", md5::compute(&bytes));
        if checksum != record.checksum {
            error!(
                "checksum mismatch for {}/{}: stored {}, computed {}",
                owner, record.filename, record.checksum, checksum
            );
            return Err(ApiError::Storage("stored file failed verification".to_string()));
        }
        Ok((record, bytes))
    }

    /// Delete a file. Ownership is resolved first, the record goes before
    /// the bytes, and a leftover physical file only costs a warning: once
    /// the record is gone the file no longer exists as far as callers are
    /// concerned.
    pub fn delete(&self, owner: &str, filename: &str) -> Result<(), ApiError> {
        let record = self.resolve(owner, filename)?;
        let affected = self.metadata.delete(owner, &record.filename)?;
        if affected == 0 {
            return Err(ApiError::NotFound(FILE_NOT_FOUND.to_string()));
        }
        if let Err(e) = self.storage.remove(&record.directory, &record.filename) {
            warn!(
                "orphan file left behind at {}/{}: {}",
                record.directory, record.filename, e
            );
        }
        info!("deleted {}/{}", owner, record.filename);
        Ok(())
    }

    /// List an owner's files.
    pub fn list(&self, owner: &str) -> Result<Vec<FileRecord>, ApiError> {
        Ok(self.metadata.list_by_owner(owner)?)
    }

    /// Remove every file and record belonging to an owner. Used when the
    /// owning account is deleted.
    pub fn delete_all_for(&self, owner: &str) -> Result<usize, ApiError> {
        let records = self.metadata.list_by_owner(owner)?;
        let mut removed = 0;
        for record in records {
            self.metadata.delete(owner, &record.filename)?;
            if let Err(e) = self.storage.remove(&record.directory, &record.filename) {
                warn!(
                    "orphan file left behind at {}/{}: {}",
                    record.directory, record.filename, e
                );
            }
            removed += 1;
        }
        if removed > 0 {
            info!("removed {} file(s) for {}", removed, owner);
        }
        Ok(removed)
    }
}
