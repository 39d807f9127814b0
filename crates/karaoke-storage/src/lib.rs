pub mod config;
pub mod kv;
pub mod models;
pub mod schema;
pub mod song_cache;

pub use config::StorageConfig;
pub use kv::{KeyValueStore, MemoryStore, SqliteStore, StoreError};
pub use song_cache::{OFFLINE_SONGS_KEY, SongCacheStore, WORLD_HITS_KEY};
