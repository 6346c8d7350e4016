//! Mock implementation of the FileMetadataStore trait for testing

use crate::error::StoreError;
use crate::metadata::{FileMetadataStore, FileRecord};
use std::sync::Mutex;

/// In-memory file metadata store
pub struct MockFileMetadataStore {
    records: Mutex<Vec<FileRecord>>,
}

impl MockFileMetadataStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    /// Number of stored records across all owners.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

impl Default for MockFileMetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FileMetadataStore for MockFileMetadataStore {
    fn insert(&self, record: &FileRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        if records
            .iter()
            .any(|r| r.owner == record.owner && r.filename == record.filename)
        {
            return Err(StoreError::Duplicate);
        }
        records.push(record.clone());
        Ok(())
    }

    fn find(&self, owner: &str, filename: &str) -> Result<Option<FileRecord>, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .find(|r| r.owner == owner && r.filename == filename)
            .cloned())
    }

    fn list_by_owner(&self, owner: &str) -> Result<Vec<FileRecord>, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records.iter().filter(|r| r.owner == owner).cloned().collect())
    }

    fn delete(&self, owner: &str, filename: &str) -> Result<usize, StoreError> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| !(r.owner == owner && r.filename == filename));
        Ok(before - records.len())
    }

    fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(owner: &str, filename: &str) -> FileRecord {
        FileRecord {
            owner: owner.to_string(),
            filename: filename.to_string(),
            directory: owner.to_string(),
            checksum: "checksum".to_string(),
            upload_time: "2026-08-05T10:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_mock_metadata_store_basic_operations() {
        let store = MockFileMetadataStore::new();
        store.insert(&record("alice", "a.txt")).unwrap();
        store.insert(&record("alice", "b.txt")).unwrap();
        store.insert(&record("bob", "a.txt")).unwrap();

        assert!(store.find("alice", "a.txt").unwrap().is_some());
        assert!(store.find("carol", "a.txt").unwrap().is_none());
        assert_eq!(store.list_by_owner("alice").unwrap().len(), 2);

        assert!(matches!(
            store.insert(&record("alice", "a.txt")).unwrap_err(),
            StoreError::Duplicate
        ));

        assert_eq!(store.delete("alice", "a.txt").unwrap(), 1);
        assert_eq!(store.delete("alice", "a.txt").unwrap(), 0);
        assert_eq!(store.len(), 2);
    }
}
