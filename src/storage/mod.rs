//! Physical Storage Layer Abstraction
//!
//! This module provides an abstraction over physical file storage backends,
//! allowing the system to use different implementations (local disk,
//! in-memory mock) without affecting higher-level services. Each owner gets
//! a scoped subdirectory; names within it are reserved atomically at write
//! time so concurrent writers can never pick the same one.

pub mod local_store;
pub mod mock_store;

use crate::error::StoreError;

/// Trait defining the physical storage interface
pub trait FileStorage: Send + Sync {
    /// Write bytes under a name unique within the directory, derived from
    /// `desired` by suffixing (`report.txt`, `report_1.txt`, ...). An
    /// existing file is never overwritten. Returns the name actually used.
    fn write_unique(&self, directory: &str, desired: &str, bytes: &[u8])
        -> Result<String, StoreError>;

    /// Read a file's bytes.
    fn read(&self, directory: &str, filename: &str) -> Result<Vec<u8>, StoreError>;

    /// Remove a file.
    fn remove(&self, directory: &str, filename: &str) -> Result<(), StoreError>;

    /// Check whether a file exists.
    fn exists(&self, directory: &str, filename: &str) -> Result<bool, StoreError>;
}

/// Derive the i-th fallback name for a desired filename.
pub(crate) fn suffixed_name(desired: &str, i: u32) -> String {
    match desired.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}_{}.{}", stem, i, ext),
        _ => format!("{}_{}", desired, i),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffixed_name() {
        assert_eq!(suffixed_name("report.txt", 1), "report_1.txt");
        assert_eq!(suffixed_name("report.txt", 12), "report_12.txt");
        assert_eq!(suffixed_name("archive.tar.gz", 2), "archive.tar_2.gz");
        assert_eq!(suffixed_name("README", 1), "README_1");
        assert_eq!(suffixed_name(".profile", 1), ".profile_1");
    }
}
