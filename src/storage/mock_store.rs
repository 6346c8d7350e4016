//! Mock implementation of the FileStorage trait for testing

use crate::error::StoreError;
use crate::storage::{suffixed_name, FileStorage};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::sync::Mutex;

/// In-memory file storage, keyed by (directory, filename).
pub struct MockFileStorage {
    files: Mutex<HashMap<(String, String), Vec<u8>>>,
}

impl MockFileStorage {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
        }
    }

    /// Number of stored files across all directories.
    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

impl Default for MockFileStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl FileStorage for MockFileStorage {
    fn write_unique(
        &self,
        directory: &str,
        desired: &str,
        bytes: &[u8],
    ) -> Result<String, StoreError> {
        // the single lock makes reservation and write one step
        let mut files = self.files.lock().unwrap();
        let mut attempt = 0;
        loop {
            let candidate = if attempt == 0 {
                desired.to_string()
            } else {
                suffixed_name(desired, attempt)
            };
            let key = (directory.to_string(), candidate.clone());
            if !files.contains_key(&key) {
                files.insert(key, bytes.to_vec());
                return Ok(candidate);
            }
            attempt += 1;
        }
    }

    fn read(&self, directory: &str, filename: &str) -> Result<Vec<u8>, StoreError> {
        let files = self.files.lock().unwrap();
        files
            .get(&(directory.to_string(), filename.to_string()))
            .cloned()
            .ok_or_else(|| {
                StoreError::Io(std::io::Error::new(ErrorKind::NotFound, "no such file"))
            })
    }

    fn remove(&self, directory: &str, filename: &str) -> Result<(), StoreError> {
        let mut files = self.files.lock().unwrap();
        files
            .remove(&(directory.to_string(), filename.to_string()))
            .map(|_| ())
            .ok_or_else(|| {
                StoreError::Io(std::io::Error::new(ErrorKind::NotFound, "no such file"))
            })
    }

    fn exists(&self, directory: &str, filename: &str) -> Result<bool, StoreError> {
        let files = self.files.lock().unwrap();
        Ok(files.contains_key(&(directory.to_string(), filename.to_string())))
    }
}
