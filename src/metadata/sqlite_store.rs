//! SQLite implementation of the FileMetadataStore trait

use crate::error::StoreError;
use crate::metadata::{FileMetadataStore, FileRecord};
use log::info;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

/// SQLite-backed file metadata store
pub struct SqliteFileMetadataStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteFileMetadataStore {
    /// Create the store, ensuring its table exists.
    pub fn new(conn: Arc<Mutex<Connection>>) -> Result<Self, StoreError> {
        {
            let guard = conn.lock().unwrap();
            guard.execute(
                "CREATE TABLE IF NOT EXISTS file_records (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    owner TEXT NOT NULL,
                    filename TEXT NOT NULL,
                    directory TEXT NOT NULL,
                    checksum TEXT NOT NULL,
                    upload_time TEXT NOT NULL,
                    UNIQUE(owner, filename)
                )",
                [],
            )?;
        }
        Ok(Self { conn })
    }
}

impl FileMetadataStore for SqliteFileMetadataStore {
    fn insert(&self, record: &FileRecord) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO file_records (owner, filename, directory, checksum, upload_time)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.owner,
                record.filename,
                record.directory,
                record.checksum,
                record.upload_time
            ],
        )?;
        info!("recorded file {} for {}", record.filename, record.owner);
        Ok(())
    }

    fn find(&self, owner: &str, filename: &str) -> Result<Option<FileRecord>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT owner, filename, directory, checksum, upload_time
             FROM file_records WHERE owner = ?1 AND filename = ?2",
        )?;
        stmt.query_row(params![owner, filename], |row| {
            Ok(FileRecord {
                owner: row.get(0)?,
                filename: row.get(1)?,
                directory: row.get(2)?,
                checksum: row.get(3)?,
                upload_time: row.get(4)?,
            })
        })
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(StoreError::from(other)),
        })
    }

    fn list_by_owner(&self, owner: &str) -> Result<Vec<FileRecord>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT owner, filename, directory, checksum, upload_time
             FROM file_records WHERE owner = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![owner], |row| {
            Ok(FileRecord {
                owner: row.get(0)?,
                filename: row.get(1)?,
                directory: row.get(2)?,
                checksum: row.get(3)?,
                upload_time: row.get(4)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    fn delete(&self, owner: &str, filename: &str) -> Result<usize, StoreError> {
        let conn = self.conn.lock().unwrap();
        let affected = conn.execute(
            "DELETE FROM file_records WHERE owner = ?1 AND filename = ?2",
            params![owner, filename],
        )?;
        Ok(affected)
    }

    fn ping(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }
}
