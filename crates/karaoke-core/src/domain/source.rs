use serde::{Deserialize, Serialize};
use std::fmt;

use super::nullable::null_as_default;

/// Kind of instrumental candidate.
///
/// The serialized names follow the records the oracle produces and the
/// cache stores, so they must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
  /// Full karaoke mix (usually with guide melody).
  Karaoke,
  /// Backing track without lead vocals.
  BackingTrack,
  /// Generic instrumental file.
  #[default]
  Instrumental,
  /// Video rendered by an embedded third-party player.
  #[serde(rename = "youtube")]
  HostedVideo,
}

impl SourceKind {
  pub fn is_file_based(&self) -> bool {
    !matches!(self, SourceKind::HostedVideo)
  }
}

impl fmt::Display for SourceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SourceKind::Karaoke => write!(f, "karaoke"),
      SourceKind::BackingTrack => write!(f, "backing-track"),
      SourceKind::Instrumental => write!(f, "instrumental"),
      SourceKind::HostedVideo => write!(f, "youtube"),
    }
  }
}

/// A playable candidate for the instrumental track of a song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentalSource {
  /// Title shown in the source list.
  #[serde(default, deserialize_with = "null_as_default")]
  pub title: String,

  /// Full URI of the file or of the video page.
  #[serde(default, deserialize_with = "null_as_default")]
  pub uri: String,

  #[serde(rename = "type", default, deserialize_with = "null_as_default")]
  pub kind: SourceKind,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,

  /// Provider video id, only meaningful for [`SourceKind::HostedVideo`].
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub video_id: Option<String>,
}

impl InstrumentalSource {
  pub fn file(kind: SourceKind, title: impl Into<String>, uri: impl Into<String>) -> Self {
    Self { title: title.into(), uri: uri.into(), kind, description: None, video_id: None }
  }

  pub fn hosted_video(title: impl Into<String>, uri: impl Into<String>, video_id: impl Into<String>) -> Self {
    Self {
      title: title.into(),
      uri: uri.into(),
      kind: SourceKind::HostedVideo,
      description: None,
      video_id: Some(video_id.into()),
    }
  }

  pub fn is_hosted_video(&self) -> bool {
    self.kind == SourceKind::HostedVideo
  }

  /// What the player attaches to: the video id for hosted video, the URI
  /// for everything else. Empty values count as missing.
  pub fn locator(&self) -> Option<&str> {
    let raw = if self.is_hosted_video() { self.video_id.as_deref() } else { Some(self.uri.as_str()) };
    raw.filter(|s| !s.trim().is_empty())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn locator_depends_on_kind() {
    let file = InstrumentalSource::file(SourceKind::Karaoke, "Karaoke", "https://cdn.example/k.mp3");
    let video = InstrumentalSource::hosted_video("Video", "https://youtu.be/dQw4w9WgXcQ", "dQw4w9WgXcQ");

    assert_eq!(file.locator(), Some("https://cdn.example/k.mp3"));
    assert_eq!(video.locator(), Some("dQw4w9WgXcQ"));
  }

  #[test]
  fn empty_locator_is_none() {
    let file = InstrumentalSource::file(SourceKind::Instrumental, "x", "  ");
    assert_eq!(file.locator(), None);
  }

  #[test]
  fn kind_uses_record_names() {
    let json = r#"{"title":"t","uri":"u","type":"backing-track"}"#;
    let src: InstrumentalSource = serde_json::from_str(json).unwrap();

    assert_eq!(src.kind, SourceKind::BackingTrack);
    assert_eq!(serde_json::to_value(SourceKind::HostedVideo).unwrap(), "youtube");
  }
}
