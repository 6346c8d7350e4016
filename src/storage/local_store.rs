//! Local disk storage implementation

use crate::error::StoreError;
use crate::storage::{suffixed_name, FileStorage};
use log::{debug, info};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

// Suffix counter bound; hitting it means something is generating collisions
// far beyond ordinary duplicate names.
const MAX_NAME_ATTEMPTS: u32 = 10_000;

/// Stores each owner's files in a subdirectory of a base path.
pub struct LocalDiskStore {
    base_path: PathBuf,
}

impl LocalDiskStore {
    pub fn new<P: Into<PathBuf>>(base_path: P) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Join a single validated component onto a path. Anything that is not
    /// exactly one normal component (separators, `..`, absolute prefixes)
    /// is refused, so a stored name can never escape the base directory.
    fn push_component(path: &Path, name: &str) -> Result<PathBuf, StoreError> {
        let candidate = Path::new(name);
        let mut components = candidate.components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(c)), None) if c == name => Ok(path.join(c)),
            _ => Err(StoreError::Backend(format!(
                "refusing unsafe path component: {}",
                name
            ))),
        }
    }

    fn directory_path(&self, directory: &str) -> Result<PathBuf, StoreError> {
        Self::push_component(&self.base_path, directory)
    }

    fn file_path(&self, directory: &str, filename: &str) -> Result<PathBuf, StoreError> {
        let dir = self.directory_path(directory)?;
        Self::push_component(&dir, filename)
    }
}

impl FileStorage for LocalDiskStore {
    fn write_unique(
        &self,
        directory: &str,
        desired: &str,
        bytes: &[u8],
    ) -> Result<String, StoreError> {
        let dir = self.directory_path(directory)?;
        std::fs::create_dir_all(&dir)?;

        // create_new reserves the name atomically, so a concurrent writer
        // racing for the same candidate loses and moves on to the next one.
        let mut attempt = 0;
        loop {
            let candidate = if attempt == 0 {
                desired.to_string()
            } else {
                suffixed_name(desired, attempt)
            };
            let path = Self::push_component(&dir, &candidate)?;
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(bytes)?;
                    file.flush()?;
                    info!(
                        "wrote {} bytes to {}/{}",
                        bytes.len(),
                        directory,
                        candidate
                    );
                    return Ok(candidate);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("{}/{} taken, trying next suffix", directory, candidate);
                    attempt += 1;
                    if attempt >= MAX_NAME_ATTEMPTS {
                        return Err(StoreError::Backend(format!(
                            "could not allocate a unique name for {}/{}",
                            directory, desired
                        )));
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn read(&self, directory: &str, filename: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.file_path(directory, filename)?;
        Ok(std::fs::read(path)?)
    }

    fn remove(&self, directory: &str, filename: &str) -> Result<(), StoreError> {
        let path = self.file_path(directory, filename)?;
        std::fs::remove_file(path)?;
        Ok(())
    }

    fn exists(&self, directory: &str, filename: &str) -> Result<bool, StoreError> {
        let path = self.file_path(directory, filename)?;
        Ok(path.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn test_write_read_remove_round_trip() {
        let dir = tempdir().unwrap();
        let store = LocalDiskStore::new(dir.path());

        let name = store.write_unique("alice", "notes.txt", b"hello").unwrap();
        assert_eq!(name, "notes.txt");
        assert!(store.exists("alice", "notes.txt").unwrap());
        assert_eq!(store.read("alice", "notes.txt").unwrap(), b"hello");

        store.remove("alice", "notes.txt").unwrap();
        assert!(!store.exists("alice", "notes.txt").unwrap());
        assert!(store.read("alice", "notes.txt").is_err());
    }

    #[test]
    fn test_colliding_names_get_suffixes() {
        let dir = tempdir().unwrap();
        let store = LocalDiskStore::new(dir.path());

        assert_eq!(store.write_unique("alice", "a.txt", b"one").unwrap(), "a.txt");
        assert_eq!(store.write_unique("alice", "a.txt", b"two").unwrap(), "a_1.txt");
        assert_eq!(store.write_unique("alice", "a.txt", b"three").unwrap(), "a_2.txt");

        // nothing was overwritten
        assert_eq!(store.read("alice", "a.txt").unwrap(), b"one");
        assert_eq!(store.read("alice", "a_1.txt").unwrap(), b"two");
        assert_eq!(store.read("alice", "a_2.txt").unwrap(), b"three");
    }

    #[test]
    fn test_owners_do_not_share_namespaces() {
        let dir = tempdir().unwrap();
        let store = LocalDiskStore::new(dir.path());

        assert_eq!(store.write_unique("alice", "a.txt", b"alice").unwrap(), "a.txt");
        assert_eq!(store.write_unique("bob", "a.txt", b"bob").unwrap(), "a.txt");
        assert_eq!(store.read("alice", "a.txt").unwrap(), b"alice");
        assert_eq!(store.read("bob", "a.txt").unwrap(), b"bob");
    }

    #[test]
    fn test_unsafe_components_refused() {
        let dir = tempdir().unwrap();
        let store = LocalDiskStore::new(dir.path());
        store.write_unique("alice", "safe.txt", b"data").unwrap();

        for bad in ["../alice", "a/b", "..", ".", "", "/etc"] {
            assert!(store.read(bad, "safe.txt").is_err(), "directory {:?}", bad);
            assert!(store.read("alice", bad).is_err(), "filename {:?}", bad);
            assert!(store.write_unique(bad, "x.txt", b"d").is_err());
        }
    }

    #[test]
    fn test_concurrent_writers_get_distinct_names() {
        let dir = tempdir().unwrap();
        let store = Arc::new(LocalDiskStore::new(dir.path()));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store
                        .write_unique("alice", "same.txt", format!("writer {}", i).as_bytes())
                        .unwrap()
                })
            })
            .collect();

        let mut names: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 4, "every writer must end up with its own file");
        for name in &names {
            assert!(store.exists("alice", name).unwrap());
        }
    }
}
