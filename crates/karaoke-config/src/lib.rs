mod backend;
mod paths;

pub use backend::{ConfigBackend, TomlConfigBackend};
pub use paths::{BASE_DIR_ENV, ConfigError, KaraokePaths};

use once_cell::sync::Lazy;

/// Directories resolved once per process. Creating them is the first thing the
/// binary does, so a failure here aborts startup.
pub static PATHS: Lazy<KaraokePaths> =
  Lazy::new(|| KaraokePaths::new().expect("cannot create the karaoke config, data and cache directories"));

/// Shared `karaoke.toml` every crate reads its section from.
pub static CONFIG_BACKEND: Lazy<TomlConfigBackend> = Lazy::new(|| TomlConfigBackend::new(PATHS.clone()));
