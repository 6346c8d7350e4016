//! SQLite implementation of the IdentityStore trait

use crate::error::StoreError;
use crate::identity::{Identity, IdentityStore, Role};
use log::info;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

/// SQLite-backed identity store
pub struct SqliteIdentityStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteIdentityStore {
    /// Create the store, ensuring its table exists.
    pub fn new(conn: Arc<Mutex<Connection>>) -> Result<Self, StoreError> {
        {
            let guard = conn.lock().unwrap();
            guard.execute(
                "CREATE TABLE IF NOT EXISTS accounts (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    username TEXT NOT NULL UNIQUE,
                    role TEXT NOT NULL,
                    password_hash TEXT NOT NULL,
                    email TEXT NOT NULL,
                    phone_number TEXT NOT NULL
                )",
                [],
            )?;
        }
        Ok(Self { conn })
    }
}

impl IdentityStore for SqliteIdentityStore {
    fn insert(&self, identity: &Identity) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO accounts (username, role, password_hash, email, phone_number)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                identity.username,
                identity.role.as_str(),
                identity.password_hash,
                identity.email,
                identity.phone_number
            ],
        )?;
        info!("created account {}", identity.username);
        Ok(())
    }

    fn find_by_username(&self, username: &str) -> Result<Option<Identity>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT username, role, password_hash, email, phone_number
             FROM accounts WHERE username = ?1",
        )?;
        let rows = stmt.query_map(params![username], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut matches = Vec::new();
        for row in rows {
            matches.push(row?);
        }
        // UNIQUE should make this impossible; if it happens anyway it must
        // never be papered over by picking a row.
        if matches.len() > 1 {
            return Err(StoreError::Integrity(format!(
                "{} credential records for username {}",
                matches.len(),
                username
            )));
        }

        let Some((username, role, password_hash, email, phone_number)) = matches.pop() else {
            return Ok(None);
        };
        let role = Role::parse(&role).ok_or_else(|| {
            StoreError::Integrity(format!("unknown role stored for {}: {}", username, role))
        })?;
        Ok(Some(Identity {
            username,
            role,
            password_hash,
            email,
            phone_number,
        }))
    }

    fn list_usernames(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT username FROM accounts ORDER BY username")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut usernames = Vec::new();
        for row in rows {
            usernames.push(row?);
        }
        Ok(usernames)
    }

    fn delete(&self, username: &str) -> Result<usize, StoreError> {
        let conn = self.conn.lock().unwrap();
        let affected = conn.execute("DELETE FROM accounts WHERE username = ?1", params![username])?;
        if affected > 0 {
            info!("deleted account {}", username);
        }
        Ok(affected)
    }
}
