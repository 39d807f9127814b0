// crates/karaoke-core/src/errors.rs
use thiserror::Error;

/// Generic error of the karaoke core.
///
/// Upper layers (binary, UI shells) map this into user messages or logs.
/// Most catalog paths never return it: they degrade to cached or empty data.
#[derive(Debug, Error)]
pub enum CoreError {
  #[error("cache error: {0}")]
  Cache(String),
}
