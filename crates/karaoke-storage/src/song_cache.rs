use std::collections::HashSet;

use karaoke_core::domain::Song;
use karaoke_core::ports::{CacheError, OFFLINE_CAPACITY, SongCache};

use crate::kv::{KeyValueStore, StoreError};

pub const OFFLINE_SONGS_KEY: &str = "karaoke.offline_songs";
pub const WORLD_HITS_KEY: &str = "karaoke.world_hits";

/// `SongCache` adapter over any key-value store.
///
/// Each list is one JSON array under a fixed key. No versioning, no expiry.
pub struct SongCacheStore<K: KeyValueStore> {
  store: K,
}

impl<K: KeyValueStore> SongCacheStore<K> {
  pub fn new(store: K) -> Self {
    Self { store }
  }

  pub fn store(&self) -> &K {
    &self.store
  }

  fn read_list(&self, key: &str) -> Result<Vec<Song>, CacheError> {
    let Some(raw) = self.store.get(key).map_err(map_store_error)? else {
      return Ok(Vec::new());
    };

    serde_json::from_str(&raw).map_err(|e| CacheError::Corrupt(format!("{key}: {e}")))
  }

  fn write_list(&self, key: &str, songs: &[Song]) -> Result<(), CacheError> {
    let raw = serde_json::to_string(songs).map_err(|e| CacheError::Storage(e.to_string()))?;
    self.store.set(key, &raw).map_err(map_store_error)
  }
}

/// Newest first, unique by id, at most `OFFLINE_CAPACITY` entries.
fn normalize_offline(songs: Vec<Song>) -> Vec<Song> {
  let mut seen = HashSet::new();
  songs.into_iter().filter(|s| seen.insert(s.id.clone())).take(OFFLINE_CAPACITY).collect()
}

impl<K: KeyValueStore> SongCache for SongCacheStore<K> {
  fn offline_songs(&self) -> Result<Vec<Song>, CacheError> {
    self.read_list(OFFLINE_SONGS_KEY).map(normalize_offline)
  }

  fn save_song(&self, song: &Song) -> Result<(), CacheError> {
    let current = match self.read_list(OFFLINE_SONGS_KEY) {
      Ok(list) => list,
      Err(CacheError::Corrupt(e)) => {
        tracing::warn!(error = %e, "offline cache corrupt, starting a new one");
        Vec::new()
      }
      Err(e) => return Err(e),
    };

    let mut updated = Vec::with_capacity(current.len() + 1);
    updated.push(song.clone());
    updated.extend(current.into_iter().filter(|s| s.id != song.id));

    self.write_list(OFFLINE_SONGS_KEY, &normalize_offline(updated))
  }

  fn world_hits(&self) -> Result<Vec<Song>, CacheError> {
    self.read_list(WORLD_HITS_KEY)
  }

  fn save_world_hits(&self, hits: &[Song]) -> Result<(), CacheError> {
    self.write_list(WORLD_HITS_KEY, hits)
  }
}

fn map_store_error(err: StoreError) -> CacheError {
  CacheError::Storage(err.to_string())
}
