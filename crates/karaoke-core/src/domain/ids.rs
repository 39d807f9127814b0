use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a song inside the catalog.
///
/// Ids are opaque strings because songs come from two places: oracle
/// results (`song-<uuid>`) and the world hits list (`world-hit-<n>`).
/// Records read back from the cache keep whatever id they were saved with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongId(String);

impl SongId {
  /// Generates a fresh id for a search result.
  pub fn new() -> Self {
    SongId(format!("song-{}", Uuid::new_v4()))
  }

  /// Positional id used for the world hits list.
  pub fn world_hit(index: usize) -> Self {
    SongId(format!("world-hit-{index}"))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl Default for SongId {
  fn default() -> Self {
    Self::new()
  }
}

impl From<String> for SongId {
  fn from(s: String) -> Self {
    SongId(s)
  }
}

impl From<&str> for SongId {
  fn from(s: &str) -> Self {
    SongId(s.to_string())
  }
}

impl fmt::Display for SongId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}
