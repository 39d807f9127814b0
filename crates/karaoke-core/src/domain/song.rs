use serde::{Deserialize, Serialize};

use crate::domain::ids::SongId;
use crate::domain::source::InstrumentalSource;

/// A link returned by the oracle's web grounding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
  pub title: String,
  pub uri: String,
}

/// A song as the catalog knows it.
///
/// Songs are produced by a search, the world hits list or a cache read and
/// are treated as immutable afterwards. The one exception is attaching the
/// fetched lyrics, which goes through [`Song::with_lyrics`] and is followed
/// by a cache write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
  pub id: SongId,

  #[serde(default)]
  pub title: String,

  #[serde(default)]
  pub artist: String,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub album_art: Option<String>,

  /// Cached lyric text, if it was fetched once.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub lyrics: Option<String>,

  /// Free-form instrument labels shown next to the title.
  #[serde(default)]
  pub instruments: Vec<String>,

  #[serde(default)]
  pub instrumental_sources: Vec<InstrumentalSource>,

  /// Used by the player when no instrumental source is active.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub backing_track_url: Option<String>,

  /// Grounding links. Stored as `sources` for compatibility with saved records.
  #[serde(default, rename = "sources")]
  pub references: Vec<Reference>,
}

impl Song {
  pub fn new(id: SongId, title: impl Into<String>, artist: impl Into<String>) -> Self {
    Self {
      id,
      title: title.into(),
      artist: artist.into(),
      album_art: None,
      lyrics: None,
      instruments: Vec::new(),
      instrumental_sources: Vec::new(),
      backing_track_url: None,
      references: Vec::new(),
    }
  }

  pub fn with_lyrics(self, lyrics: impl Into<String>) -> Self {
    Self { lyrics: Some(lyrics.into()), ..self }
  }

  /// Case-insensitive substring match on title or artist.
  pub fn matches(&self, query: &str) -> bool {
    let needle = query.to_lowercase();
    self.title.to_lowercase().contains(&needle) || self.artist.to_lowercase().contains(&needle)
  }
}
