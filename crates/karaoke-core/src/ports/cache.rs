use crate::domain::Song;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
  #[error("storage error: {0}")]
  Storage(String),

  #[error("corrupt record: {0}")]
  Corrupt(String),
}

/// Maximum number of songs kept in the offline collection.
pub const OFFLINE_CAPACITY: usize = 50;

/// Port over the local song cache.
///
/// Two independent lists live behind it: the offline collection (songs the
/// user opened, newest first, at most [`OFFLINE_CAPACITY`] and unique by
/// id) and the last world hits list. Writes are last-write-wins per list.
pub trait SongCache: Send + Sync {
  fn offline_songs(&self) -> Result<Vec<Song>, CacheError>;
  fn save_song(&self, song: &Song) -> Result<(), CacheError>;

  fn world_hits(&self) -> Result<Vec<Song>, CacheError>;
  fn save_world_hits(&self, hits: &[Song]) -> Result<(), CacheError>;
}
