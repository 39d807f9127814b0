use karaoke_config::{CONFIG_BACKEND, ConfigBackend, ConfigError, PATHS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[storage]` section: where the song cache database lives.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
  pub db_path: PathBuf,
  /// Applied as `PRAGMA journal_mode` on open; letters only.
  pub journal_mode: Option<String>,
}

impl Default for StorageConfig {
  fn default() -> Self {
    let db_path = PATHS.data_dir.join("karaoke.db");
    StorageConfig { db_path, journal_mode: Some("WAL".to_string()) }
  }
}

impl StorageConfig {
  /// Reads the section, writing the defaults back so the file lists every key.
  pub fn load() -> Result<Self, ConfigError> {
    let cfg = CONFIG_BACKEND.load_section_with_default("storage")?;
    CONFIG_BACKEND.save_section("storage", &cfg)?;
    Ok(cfg)
  }

  pub fn save(&self) -> Result<(), ConfigError> {
    CONFIG_BACKEND.save_section("storage", self)
  }
}
