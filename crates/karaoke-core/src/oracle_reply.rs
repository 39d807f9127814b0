//! Lenient reading of oracle answers.
//!
//! The generative service is asked for JSON but answers with whatever it
//! likes: bare JSON, JSON inside a markdown fence, JSON surrounded by prose,
//! or prose only. Parsing is layered and never fails; the worst case is an
//! empty list.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::nullable::null_as_default;
use crate::domain::{InstrumentalSource, Reference, Song, SongId, SourceKind};

static FENCED_BLOCK: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"(?is)```(?:json)?\s*(.*?)\s*```").expect("fenced block pattern"));

static VIDEO_ID: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11})").expect("video id pattern"));

const VIDEO_HOSTS: &[&str] = &["youtube.com", "youtu.be"];

/// Best-effort JSON extraction.
///
/// 1. the whole (trimmed) text
/// 2. the first fenced code block
/// 3. the span from the first `[` to the last `]`
///
/// Anything else yields an empty array.
pub fn parse_flexible_json(text: &str) -> Value {
  let clean = text.trim();
  if clean.is_empty() {
    return Value::Array(Vec::new());
  }

  if let Ok(v) = serde_json::from_str::<Value>(clean) {
    return v;
  }

  if let Some(block) = FENCED_BLOCK.captures(clean).and_then(|c| c.get(1)) {
    if let Ok(v) = serde_json::from_str::<Value>(block.as_str().trim()) {
      return v;
    }
  }

  if let (Some(first), Some(last)) = (clean.find('['), clean.rfind(']')) {
    if last > first {
      if let Ok(v) = serde_json::from_str::<Value>(&clean[first..=last]) {
        return v;
      }
    }
  }

  tracing::debug!(len = clean.len(), "oracle reply holds no parseable JSON");
  Value::Array(Vec::new())
}

/// One song as described by the oracle, before it gets an id.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SongRecord {
  #[serde(deserialize_with = "null_as_default")]
  pub title: String,
  #[serde(deserialize_with = "null_as_default")]
  pub artist: String,
  pub album_art: Option<String>,
  #[serde(deserialize_with = "null_as_default")]
  pub instruments: Vec<String>,
  pub backing_track_url: Option<String>,
  /// Kept raw so a single malformed source does not sink the whole record.
  #[serde(deserialize_with = "null_as_default")]
  instrumental_sources: Vec<Value>,
}

impl SongRecord {
  pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
    Self { title: title.into(), artist: artist.into(), ..Default::default() }
  }

  /// Instrumental sources with video links recognised and tagged.
  pub fn sources(&self) -> Vec<InstrumentalSource> {
    self
      .instrumental_sources
      .iter()
      .filter_map(|raw| serde_json::from_value::<InstrumentalSource>(raw.clone()).ok())
      .map(normalize_source)
      .collect()
  }

  pub fn into_song(self, id: SongId, references: Vec<Reference>) -> Song {
    let instrumental_sources = self.sources();
    Song {
      id,
      title: self.title,
      artist: self.artist,
      album_art: self.album_art,
      lyrics: None,
      instruments: self.instruments,
      instrumental_sources,
      backing_track_url: self.backing_track_url,
      references,
    }
  }
}

/// Reads the song records out of an oracle answer.
///
/// Non-array JSON and array items that are not song objects are skipped.
pub fn song_records(text: &str) -> Vec<SongRecord> {
  match parse_flexible_json(text) {
    Value::Array(items) => items
      .into_iter()
      .filter_map(|item| match serde_json::from_value::<SongRecord>(item) {
        Ok(record) => Some(record),
        Err(e) => {
          tracing::debug!(error = %e, "skipping malformed song record");
          None
        }
      })
      .collect(),
    _ => Vec::new(),
  }
}

pub fn is_video_host(uri: &str) -> bool {
  VIDEO_HOSTS.iter().any(|host| uri.contains(host))
}

/// Pulls an 11 character video id out of a watch or short link.
pub fn extract_video_id(uri: &str) -> Option<String> {
  VIDEO_ID.captures(uri).and_then(|c| c.get(1)).map(|m| m.as_str().to_string())
}

/// Sources pointing at a video host are re-tagged as hosted video, keeping
/// the id the oracle gave or recovering it from the link.
pub fn normalize_source(mut source: InstrumentalSource) -> InstrumentalSource {
  if is_video_host(&source.uri) {
    source.kind = SourceKind::HostedVideo;
    let given = source.video_id.take().filter(|id| !id.trim().is_empty());
    source.video_id = given.or_else(|| extract_video_id(&source.uri));
  }
  source
}

/// Grounding links without a URI are useless and dropped.
pub fn usable_references(references: Vec<Reference>) -> Vec<Reference> {
  references
    .into_iter()
    .filter(|r| !r.uri.trim().is_empty())
    .map(|r| if r.title.trim().is_empty() { Reference { title: "Source".to_string(), ..r } } else { r })
    .collect()
}
