use crate::domain::{Reference, Song, SongId};
use crate::errors::CoreError;
use crate::oracle_reply::{song_records, usable_references};
use crate::ports::{Connectivity, SongCache, SongOracle};
use crate::services::prompts;

/// Shown in place of lyrics when they cannot be fetched.
pub const LYRICS_OFFLINE_MESSAGE: &str = "Connect to the internet to download the lyrics.";
pub const LYRICS_NOT_FOUND_MESSAGE: &str = "Lyrics not found.";
pub const LYRICS_FAILED_MESSAGE: &str = "Lyrics could not be loaded.";

/// Grounding links attached to fetched lyrics.
const LYRICS_REFERENCE_LIMIT: usize = 3;

/// Where a lyric text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LyricsOrigin {
  Cache,
  Oracle,
  /// Placeholder message. Never persisted.
  Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lyrics {
  pub text: String,
  pub origin: LyricsOrigin,
  pub references: Vec<Reference>,
}

impl Lyrics {
  fn unavailable(message: &str) -> Self {
    Self { text: message.to_string(), origin: LyricsOrigin::Unavailable, references: Vec::new() }
  }

  /// Only real lyrics are worth writing to the cache.
  pub fn is_persistable(&self) -> bool {
    self.origin != LyricsOrigin::Unavailable
  }
}

/// Song discovery on top of the oracle, with the local cache as fallback.
///
/// None of the query methods fail: oracle errors, cache errors and offline
/// mode all degrade to cached data or an empty list, with a log line.
pub struct CatalogService<O, C, N>
where
  O: SongOracle,
  C: SongCache,
  N: Connectivity,
{
  oracle: O,
  cache: C,
  connectivity: N,
}

impl<O, C, N> CatalogService<O, C, N>
where
  O: SongOracle,
  C: SongCache,
  N: Connectivity,
{
  pub fn new(oracle: O, cache: C, connectivity: N) -> Self {
    Self { oracle, cache, connectivity }
  }

  pub fn connectivity(&self) -> &N {
    &self.connectivity
  }

  pub fn is_online(&self) -> bool {
    self.connectivity.is_online()
  }

  // -------- QUERY (read) --------

  /// Offline: cached songs whose title or artist contains `query`.
  /// Online: oracle results, or the offline answer if the oracle fails.
  pub async fn search(&self, query: &str) -> Vec<Song> {
    let query = query.trim();

    if !self.is_online() {
      return self.search_offline(query);
    }

    match self.oracle.generate(&prompts::search(query)).await {
      Ok(reply) => {
        let references = usable_references(reply.references);
        let songs: Vec<Song> = song_records(&reply.text)
          .into_iter()
          .map(|record| record.into_song(SongId::new(), references.clone()))
          .collect();
        tracing::debug!(query, results = songs.len(), "oracle search finished");
        songs
      }
      Err(e) => {
        tracing::warn!(query, error = %e, "oracle search failed, using offline songs");
        self.search_offline(query)
      }
    }
  }

  fn search_offline(&self, query: &str) -> Vec<Song> {
    self.offline_songs().into_iter().filter(|song| song.matches(query)).collect()
  }

  /// Famous songs for the home screen. A successful oracle answer replaces
  /// the cached list; offline, failure or an empty answer return the cache.
  pub async fn world_hits(&self) -> Vec<Song> {
    if !self.is_online() {
      return self.cached_world_hits();
    }

    let reply = match self.oracle.generate(&prompts::world_hits()).await {
      Ok(reply) => reply,
      Err(e) => {
        tracing::warn!(error = %e, "world hits request failed, using cache");
        return self.cached_world_hits();
      }
    };

    let hits: Vec<Song> = song_records(&reply.text)
      .into_iter()
      .enumerate()
      .map(|(idx, record)| {
        let mut song = record.into_song(SongId::world_hit(idx), Vec::new());
        if song.instruments.is_empty() {
          song.instruments.push("Full instrumental".to_string());
        }
        song
      })
      .collect();

    if hits.is_empty() {
      tracing::debug!("world hits answer was empty, keeping cached list");
      return self.cached_world_hits();
    }

    if let Err(e) = self.cache.save_world_hits(&hits) {
      tracing::warn!(error = %e, "could not cache world hits");
    }

    hits
  }

  fn cached_world_hits(&self) -> Vec<Song> {
    self.cache.world_hits().unwrap_or_else(|e| {
      tracing::warn!(error = %e, "world hits cache unreadable");
      Vec::new()
    })
  }

  /// Lyrics for a song. Cached lyrics for `cached_id` win over the oracle.
  pub async fn lyrics(&self, title: &str, artist: &str, cached_id: Option<&SongId>) -> Lyrics {
    if let Some(id) = cached_id {
      let cached = self.offline_songs().into_iter().find(|s| &s.id == id).and_then(|s| s.lyrics);
      if let Some(text) = cached.filter(|t| !t.trim().is_empty()) {
        return Lyrics { text, origin: LyricsOrigin::Cache, references: Vec::new() };
      }
    }

    if !self.is_online() {
      return Lyrics::unavailable(LYRICS_OFFLINE_MESSAGE);
    }

    match self.oracle.generate(&prompts::lyrics(title, artist)).await {
      Ok(reply) if !reply.text.trim().is_empty() => {
        let mut references = usable_references(reply.references);
        references.truncate(LYRICS_REFERENCE_LIMIT);
        Lyrics { text: reply.text, origin: LyricsOrigin::Oracle, references }
      }
      Ok(_) => Lyrics::unavailable(LYRICS_NOT_FOUND_MESSAGE),
      Err(e) => {
        tracing::warn!(title, artist, error = %e, "lyrics request failed");
        Lyrics::unavailable(LYRICS_FAILED_MESSAGE)
      }
    }
  }

  pub fn offline_songs(&self) -> Vec<Song> {
    self.cache.offline_songs().unwrap_or_else(|e| {
      tracing::warn!(error = %e, "offline cache unreadable");
      Vec::new()
    })
  }

  // -------- COMMAND (write) --------

  /// Saves (or refreshes) a song in the offline collection.
  pub fn remember(&self, song: &Song) -> Result<(), CoreError> {
    self.cache.save_song(song).map_err(|e| CoreError::Cache(e.to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{InstrumentalSource, SourceKind};
  use crate::ports::{CacheError, ConnectivitySignal, OracleError, OracleReply, OracleRequest};
  use std::collections::VecDeque;
  use std::sync::Mutex;

  #[derive(Default)]
  struct ScriptedOracle {
    replies: Mutex<VecDeque<Result<OracleReply, OracleError>>>,
    seen: Mutex<Vec<OracleRequest>>,
  }

  impl ScriptedOracle {
    fn replying(text: &str) -> Self {
      let oracle = Self::default();
      oracle.push(Ok(OracleReply { text: text.to_string(), references: Vec::new() }));
      oracle
    }

    fn push(&self, reply: Result<OracleReply, OracleError>) {
      self.replies.lock().unwrap().push_back(reply);
    }

    fn calls(&self) -> usize {
      self.seen.lock().unwrap().len()
    }
  }

  #[async_trait::async_trait]
  impl SongOracle for ScriptedOracle {
    async fn generate(&self, request: &OracleRequest) -> Result<OracleReply, OracleError> {
      self.seen.lock().unwrap().push(request.clone());
      self
        .replies
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(OracleError::Unreachable("no scripted reply".into())))
    }
  }

  #[derive(Default)]
  struct MemoryCache {
    songs: Mutex<Vec<Song>>,
    hits: Mutex<Vec<Song>>,
    read_only: bool,
  }

  impl MemoryCache {
    fn with_songs(songs: Vec<Song>) -> Self {
      Self { songs: Mutex::new(songs), ..Self::default() }
    }

    fn read_only() -> Self {
      Self { read_only: true, ..Self::default() }
    }
  }

  impl SongCache for MemoryCache {
    fn offline_songs(&self) -> Result<Vec<Song>, CacheError> {
      Ok(self.songs.lock().unwrap().clone())
    }

    fn save_song(&self, song: &Song) -> Result<(), CacheError> {
      if self.read_only {
        return Err(CacheError::Storage("disk full".into()));
      }
      let mut songs = self.songs.lock().unwrap();
      songs.retain(|s| s.id != song.id);
      songs.insert(0, song.clone());
      Ok(())
    }

    fn world_hits(&self) -> Result<Vec<Song>, CacheError> {
      Ok(self.hits.lock().unwrap().clone())
    }

    fn save_world_hits(&self, hits: &[Song]) -> Result<(), CacheError> {
      *self.hits.lock().unwrap() = hits.to_vec();
      Ok(())
    }
  }

  fn song(id: &str, title: &str, artist: &str) -> Song {
    Song::new(SongId::from(id), title, artist)
  }

  fn service(
    oracle: ScriptedOracle,
    cache: MemoryCache,
    online: bool,
  ) -> CatalogService<ScriptedOracle, MemoryCache, ConnectivitySignal> {
    CatalogService::new(oracle, cache, ConnectivitySignal::new(online))
  }

  #[tokio::test]
  async fn offline_with_empty_cache_finds_nothing() {
    let svc = service(ScriptedOracle::default(), MemoryCache::default(), false);

    assert!(svc.search("queen").await.is_empty());
    assert_eq!(svc.oracle.calls(), 0);
  }

  #[tokio::test]
  async fn offline_search_filters_cache_case_insensitively() {
    let cache = MemoryCache::with_songs(vec![
      song("1", "Love of My Life", "Queen"),
      song("2", "Somebody to Love", "QUEEN"),
      song("3", "Crazy Little Thing", "queen"),
      song("4", "Waterloo", "ABBA"),
      song("5", "Imagine", "John Lennon"),
    ]);
    let svc = service(ScriptedOracle::default(), cache, false);

    let ids: Vec<String> = svc.search("QuEeN").await.into_iter().map(|s| s.id.to_string()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);

    let lennon = svc.search("lennon").await;
    assert_eq!(lennon.len(), 1);

    let love = svc.search("love").await;
    assert_eq!(love.len(), 2);
  }

  #[tokio::test]
  async fn online_search_maps_oracle_records() {
    let oracle = ScriptedOracle::default();
    oracle.push(Ok(OracleReply {
      text: r#"Here you go ```json
      [{"title":"Hallelujah","artist":"Leonard Cohen","instrumentalSources":[
        {"title":"Karaoke","uri":"https://www.youtube.com/watch?v=abcdefghijk","type":"karaoke"}
      ]}]
      ```"#
        .to_string(),
      references: vec![
        Reference { title: "Lyrics site".into(), uri: "https://lyrics.example".into() },
        Reference { title: "empty".into(), uri: String::new() },
      ],
    }));
    let svc = service(oracle, MemoryCache::default(), true);

    let songs = svc.search("hallelujah").await;

    assert_eq!(songs.len(), 1);
    assert!(songs[0].id.as_str().starts_with("song-"));
    assert_eq!(songs[0].instrumental_sources[0].kind, SourceKind::HostedVideo);
    assert_eq!(songs[0].references.len(), 1);
  }

  #[tokio::test]
  async fn online_search_failure_falls_back_to_cache() {
    let cache = MemoryCache::with_songs(vec![song("1", "Yesterday", "The Beatles")]);
    let svc = service(ScriptedOracle::default(), cache, true);

    let songs = svc.search("beatles").await;
    assert_eq!(songs.len(), 1);
    assert_eq!(svc.oracle.calls(), 1);
  }

  #[tokio::test]
  async fn world_hits_are_cached_and_reused_offline() {
    let oracle = ScriptedOracle::replying(r#"[{"title":"A","artist":"B"},{"title":"C","artist":"D"}]"#);
    let svc = service(oracle, MemoryCache::default(), true);

    let hits = svc.world_hits().await;
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[1].id.as_str(), "world-hit-1");
    assert_eq!(hits[0].instruments, vec!["Full instrumental".to_string()]);

    svc.connectivity().set_online(false);
    assert_eq!(svc.world_hits().await, hits);
    assert_eq!(svc.oracle.calls(), 1);
  }

  #[tokio::test]
  async fn empty_world_hits_answer_keeps_cache() {
    let cache = MemoryCache::default();
    cache.save_world_hits(&[song("world-hit-0", "Old", "Hit")]).unwrap();
    let svc = service(ScriptedOracle::replying("sorry, no idea"), cache, true);

    let hits = svc.world_hits().await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Old");
  }

  #[tokio::test]
  async fn cached_lyrics_skip_the_oracle() {
    let cached = song("s1", "T", "A").with_lyrics("la la la");
    let svc = service(ScriptedOracle::default(), MemoryCache::with_songs(vec![cached]), true);

    let lyrics = svc.lyrics("T", "A", Some(&SongId::from("s1"))).await;

    assert_eq!(lyrics.text, "la la la");
    assert_eq!(lyrics.origin, LyricsOrigin::Cache);
    assert_eq!(svc.oracle.calls(), 0);
  }

  #[tokio::test]
  async fn offline_lyrics_are_not_persistable() {
    let svc = service(ScriptedOracle::default(), MemoryCache::default(), false);
    let lyrics = svc.lyrics("T", "A", None).await;

    assert_eq!(lyrics.text, LYRICS_OFFLINE_MESSAGE);
    assert!(!lyrics.is_persistable());
  }

  #[tokio::test]
  async fn oracle_lyrics_keep_three_references() {
    let oracle = ScriptedOracle::default();
    let references =
      (0..5).map(|i| Reference { title: format!("r{i}"), uri: format!("https://r/{i}") }).collect();
    oracle.push(Ok(OracleReply { text: "line one\nline two".into(), references }));
    let svc = service(oracle, MemoryCache::default(), true);

    let lyrics = svc.lyrics("T", "A", None).await;

    assert_eq!(lyrics.origin, LyricsOrigin::Oracle);
    assert_eq!(lyrics.references.len(), 3);
    assert!(lyrics.is_persistable());
  }

  #[tokio::test]
  async fn failing_lyrics_degrade_to_message() {
    let svc = service(ScriptedOracle::default(), MemoryCache::default(), true);
    let lyrics = svc.lyrics("T", "A", None).await;

    assert_eq!(lyrics.text, LYRICS_FAILED_MESSAGE);
    assert_eq!(lyrics.origin, LyricsOrigin::Unavailable);
  }

  #[test]
  fn remember_writes_to_cache() {
    let svc = service(ScriptedOracle::default(), MemoryCache::default(), true);
    let mut s = song("s1", "T", "A");
    s.instrumental_sources.push(InstrumentalSource::file(SourceKind::Karaoke, "k", "https://k"));

    svc.remember(&s).unwrap();
    assert_eq!(svc.offline_songs(), vec![s]);
  }

  #[test]
  fn remember_reports_cache_failures() {
    let svc = service(ScriptedOracle::default(), MemoryCache::read_only(), true);

    let err = svc.remember(&song("s1", "T", "A")).unwrap_err();
    assert!(matches!(err, CoreError::Cache(ref msg) if msg.contains("disk full")));
  }
}
