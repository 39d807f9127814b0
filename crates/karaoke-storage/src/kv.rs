use std::collections::BTreeMap;
use std::sync::Mutex;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::config::StorageConfig;
use crate::models::{KvRow, NewKvRow};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("backend error: {0}")]
  Backend(String),

  #[error("store lock poisoned")]
  Poisoned,
}

/// Minimal string key-value store: what a browser's local storage offers.
pub trait KeyValueStore: Send + Sync {
  fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
  fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
  fn keys(&self) -> Result<Vec<String>, StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
  fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
    (**self).get(key)
  }

  fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
    (**self).set(key, value)
  }

  fn keys(&self) -> Result<Vec<String>, StoreError> {
    (**self).keys()
  }
}

/// Volatile store for tests and for running without a data directory.
#[derive(Debug, Default)]
pub struct MemoryStore {
  entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl KeyValueStore for MemoryStore {
  fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
    let guard = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
    Ok(guard.get(key).cloned())
  }

  fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
    let mut guard = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
    guard.insert(key.to_string(), value.to_string());
    Ok(())
  }

  fn keys(&self) -> Result<Vec<String>, StoreError> {
    let guard = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
    Ok(guard.keys().cloned().collect())
  }
}

/// SQLite backed store: one row per key.
pub struct SqliteStore {
  conn: Mutex<SqliteConnection>,
}

impl SqliteStore {
  /// Opens (or creates) the database and applies pending migrations.
  pub fn new(database_url: &str) -> Result<Self, StoreError> {
    let mut conn = SqliteConnection::establish(database_url).map_err(|e| StoreError::Backend(e.to_string()))?;

    conn.run_pending_migrations(MIGRATIONS).map_err(|e| StoreError::Backend(e.to_string()))?;

    Ok(Self { conn: Mutex::new(conn) })
  }

  /// Opens the database configured in the `[storage]` section.
  pub fn new_from_config() -> Result<Self, StoreError> {
    let cfg = StorageConfig::load().map_err(|e| StoreError::Backend(e.to_string()))?;
    Self::with_config(&cfg)
  }

  pub fn with_config(cfg: &StorageConfig) -> Result<Self, StoreError> {
    let url = cfg.db_path.to_string_lossy();
    let store = Self::new(&url)?;

    if let Some(mode) = cfg.journal_mode.as_deref() {
      store.set_journal_mode(mode)?;
    }

    tracing::debug!(db = %url, "sqlite store ready");
    Ok(store)
  }

  fn set_journal_mode(&self, mode: &str) -> Result<(), StoreError> {
    if !mode.chars().all(|c| c.is_ascii_alphabetic()) {
      return Err(StoreError::Backend(format!("invalid journal mode: {mode}")));
    }

    let mut conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
    conn
      .batch_execute(&format!("PRAGMA journal_mode = {mode};"))
      .map_err(|e| StoreError::Backend(e.to_string()))
  }
}

impl KeyValueStore for SqliteStore {
  fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
    use crate::schema::kv_entries::dsl::*;

    let mut conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;

    let row = kv_entries
      .filter(entry_key.eq(key))
      .first::<KvRow>(&mut *conn)
      .optional()
      .map_err(|e| StoreError::Backend(e.to_string()))?;

    Ok(row.map(|r| r.entry_value))
  }

  fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
    use crate::schema::kv_entries::dsl::*;

    let new_row = NewKvRow { entry_key: key, entry_value: value };
    let mut conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;

    diesel::insert_into(kv_entries)
      .values(&new_row)
      .on_conflict(entry_key)
      .do_update()
      .set(entry_value.eq(value))
      .execute(&mut *conn)
      .map_err(|e| StoreError::Backend(e.to_string()))?;

    Ok(())
  }

  fn keys(&self) -> Result<Vec<String>, StoreError> {
    use crate::schema::kv_entries::dsl::*;

    let mut conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;

    kv_entries
      .select(entry_key)
      .order(entry_key.asc())
      .load::<String>(&mut *conn)
      .map_err(|e| StoreError::Backend(e.to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  fn exercise(store: &dyn KeyValueStore) {
    assert_eq!(store.get("a").unwrap(), None);

    store.set("b", "1").unwrap();
    store.set("a", "2").unwrap();
    store.set("b", "3").unwrap();

    assert_eq!(store.get("b").unwrap().as_deref(), Some("3"));
    assert_eq!(store.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);
  }

  #[test]
  fn memory_store_last_write_wins() {
    exercise(&MemoryStore::new());
  }

  #[test]
  fn sqlite_store_last_write_wins() {
    exercise(&SqliteStore::new(":memory:").unwrap());
  }

  #[test]
  fn sqlite_store_persists_across_connections() {
    let tmp = tempdir().unwrap();
    let cfg = StorageConfig { db_path: tmp.path().join("karaoke.db"), journal_mode: Some("WAL".into()) };

    SqliteStore::with_config(&cfg).unwrap().set("k", "v").unwrap();
    let reopened = SqliteStore::with_config(&cfg).unwrap();

    assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v"));
  }

  #[test]
  fn rejects_odd_journal_mode() {
    let tmp = tempdir().unwrap();
    let cfg = StorageConfig { db_path: tmp.path().join("x.db"), journal_mode: Some("WAL; DROP".into()) };

    assert!(SqliteStore::with_config(&cfg).is_err());
  }
}
