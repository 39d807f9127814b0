use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Overrides every platform directory with `<base>/{config,data,cache}`.
pub const BASE_DIR_ENV: &str = "KARAOKE_BASE_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
  #[error("toml error: {0}")]
  Toml(#[from] toml::de::Error),
  #[error("directories error: could not determine home directory")]
  Directories,
  #[error("other: {0}")]
  Other(String),
}

#[derive(Debug, Clone)]
pub struct KaraokePaths {
  pub base_dir: PathBuf,
  pub config_dir: PathBuf,
  pub data_dir: PathBuf,
  pub cache_dir: PathBuf,
}

impl KaraokePaths {
  /// Per-user platform directories, or the layout under `KARAOKE_BASE_DIR`
  /// when it is set. Every directory exists on return.
  pub fn new() -> Result<Self, ConfigError> {
    match std::env::var(BASE_DIR_ENV) {
      Ok(env_base) => Self::under(Path::new(&env_base)),
      Err(_) => {
        let proj_dirs = ProjectDirs::from("com", "karaoke", "karaoke").ok_or(ConfigError::Directories)?;
        Self::create(
          proj_dirs.config_dir().to_path_buf(),
          proj_dirs.config_dir().to_path_buf(),
          proj_dirs.data_dir().to_path_buf(),
          proj_dirs.cache_dir().to_path_buf(),
        )
      }
    }
  }

  /// Portable layout rooted at `base`.
  pub fn under(base: &Path) -> Result<Self, ConfigError> {
    Self::create(base.to_path_buf(), base.join("config"), base.join("data"), base.join("cache"))
  }

  fn create(base_dir: PathBuf, config_dir: PathBuf, data_dir: PathBuf, cache_dir: PathBuf) -> Result<Self, ConfigError> {
    std::fs::create_dir_all(&config_dir)?;
    std::fs::create_dir_all(&data_dir)?;
    std::fs::create_dir_all(&cache_dir)?;

    Ok(Self { base_dir, config_dir, data_dir, cache_dir })
  }

  pub fn config_file(&self) -> PathBuf {
    self.config_dir.join("karaoke.toml")
  }
}
