use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::{legacy, schema, JarStore};
use crate::errors::{JarError, Result};
use crate::models::Jar;

/// Key-value backend: the whole collection is one JSON value in a SQLite
/// `kv` table, replaced inside one transaction on every save.
pub(crate) struct KvStore {
    conn: Connection,
    location: String,
}

impl KvStore {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let store = Self {
            conn,
            location: path.display().to_string(),
        };
        store.migrate()?;
        Ok(store)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
            location: ":memory:".into(),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Create the schema on a fresh database and refuse one written by a
    /// newer build.
    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(schema::SCHEMA_V1)?;

        let version: Option<i32> = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        match version {
            None => {
                self.conn.execute(
                    "INSERT INTO schema_version (version) VALUES (?1)",
                    params![schema::CURRENT_VERSION],
                )?;
            }
            Some(found) if found > schema::CURRENT_VERSION => {
                return Err(JarError::Persistence(format!(
                    "{} has schema version {found}, newer than supported version {}",
                    self.location,
                    schema::CURRENT_VERSION
                )));
            }
            Some(_) => {}
        }
        Ok(())
    }

    fn read_value(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?)
    }

    #[cfg(test)]
    pub(crate) fn write_raw(&self, value: &str) -> Result<()> {
        write_value(&self.conn, schema::JARS_KEY, value)
    }
}

fn write_value(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value, chrono::Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

impl JarStore for KvStore {
    fn load(&self) -> Vec<Jar> {
        let raw = match self.read_value(schema::JARS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read jars from key-value store");
                return Vec::new();
            }
        };
        match legacy::decode_bytes(raw.as_bytes()) {
            Ok(decoded) => decoded.jars,
            Err(reason) => {
                tracing::warn!(%reason, "stored jars are not valid JSON, starting empty");
                Vec::new()
            }
        }
    }

    fn save(&self, jars: &[Jar]) -> Result<()> {
        let value = serde_json::to_string(jars)?;
        let tx = self.conn.unchecked_transaction()?;
        write_value(&tx, schema::JARS_KEY, &value)?;
        tx.commit()?;
        tracing::debug!(location = %self.location, count = jars.len(), "saved jars");
        Ok(())
    }

    fn location(&self) -> String {
        self.location.clone()
    }
}
