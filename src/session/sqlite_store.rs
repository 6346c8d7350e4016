//! SQLite implementation of the SessionStore trait

use crate::error::StoreError;
use crate::identity::Role;
use crate::session::{Session, SessionStore};
use chrono::{DateTime, Utc};
use log::warn;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

/// SQLite-backed session store. Sessions survive process restarts.
pub struct SqliteSessionStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSessionStore {
    /// Create the store, ensuring its table exists.
    pub fn new(conn: Arc<Mutex<Connection>>) -> Result<Self, StoreError> {
        {
            let guard = conn.lock().unwrap();
            guard.execute(
                "CREATE TABLE IF NOT EXISTS sessions (
                    session_id TEXT PRIMARY KEY,
                    username TEXT NOT NULL,
                    role TEXT NOT NULL,
                    csrf_token TEXT NOT NULL,
                    created_at TEXT NOT NULL
                )",
                [],
            )?;
        }
        Ok(Self { conn })
    }
}

impl SessionStore for SqliteSessionStore {
    fn insert(&self, session: &Session) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO sessions (session_id, username, role, csrf_token, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                session.session_id,
                session.username,
                session.role.as_str(),
                session.csrf_token,
                session.created_at.to_rfc3339()
            ],
        )?;
        Ok(())
    }

    fn get(&self, session_id: &str) -> Result<Option<Session>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT session_id, username, role, csrf_token, created_at
             FROM sessions WHERE session_id = ?1",
        )?;
        let row = stmt
            .query_row(params![session_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(StoreError::from(other)),
            })?;

        let Some((session_id, username, role, csrf_token, created_at)) = row else {
            return Ok(None);
        };

        // A record we cannot interpret is treated as no session at all.
        let Some(role) = Role::parse(&role) else {
            warn!("session record for {} has unknown role, ignoring", username);
            return Ok(None);
        };
        let created_at = match DateTime::parse_from_rfc3339(&created_at) {
            Ok(ts) => ts.with_timezone(&Utc),
            Err(e) => {
                warn!("session record for {} has bad timestamp: {}", username, e);
                return Ok(None);
            }
        };

        Ok(Some(Session {
            session_id,
            username,
            role,
            csrf_token,
            created_at,
        }))
    }

    fn delete(&self, session_id: &str) -> Result<usize, StoreError> {
        let conn = self.conn.lock().unwrap();
        let affected =
            conn.execute("DELETE FROM sessions WHERE session_id = ?1", params![session_id])?;
        Ok(affected)
    }

    fn delete_for_user(&self, username: &str) -> Result<usize, StoreError> {
        let conn = self.conn.lock().unwrap();
        let affected =
            conn.execute("DELETE FROM sessions WHERE username = ?1", params![username])?;
        Ok(affected)
    }
}
