//! SQLite backend for the key/value store.

use crate::store::{Backend, StoreError};
use anyhow::{Result, anyhow};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Arc, Mutex};

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Database handle wrapping a SQLite connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create the database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Enable WAL mode for concurrent access
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA busy_timeout=5000;",
        )?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.run_migrations()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.run_migrations()?;

        Ok(db)
    }

    /// Run database migrations.
    fn run_migrations(&self) -> Result<()> {
        self.with_conn_mut(|conn| {
            embedded::migrations::runner().run(conn)?;
            Ok(())
        })
    }

    /// Execute a function with exclusive access to the connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("database connection lock poisoned"))?;
        f(&conn)
    }

    /// Execute a function with mutable access to the connection (for migrations).
    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("database connection lock poisoned"))?;
        f(&mut conn)
    }
}

fn backend_err(err: anyhow::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

impl Backend for Database {
    fn read(&self, key: &str) -> std::result::Result<Option<String>, StoreError> {
        self.with_conn(|conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM kv_store WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value)
        })
        .map_err(backend_err)
    }

    fn write(&self, key: &str, value: &str) -> std::result::Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, now_ms()],
            )?;
            Ok(())
        })
        .map_err(backend_err)
    }

    fn delete(&self, key: &str) -> std::result::Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
            Ok(())
        })
        .map_err(backend_err)
    }

    fn clear(&self) -> std::result::Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM kv_store", [])?;
            Ok(())
        })
        .map_err(backend_err)
    }
}

/// Get the current timestamp in milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_replaces_value() {
        let db = Database::open_in_memory().unwrap();
        db.write("tasks", "[]").unwrap();
        db.write("tasks", "[1]").unwrap();
        assert_eq!(db.read("tasks").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn delete_and_clear() {
        let db = Database::open_in_memory().unwrap();
        db.write("tasks", "[]").unwrap();
        db.write("projects", "[]").unwrap();

        db.delete("tasks").unwrap();
        assert_eq!(db.read("tasks").unwrap(), None);
        db.delete("tasks").unwrap();

        db.clear().unwrap();
        assert_eq!(db.read("projects").unwrap(), None);
    }
}
