#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
  #[error("no media attached")]
  NoMedia,

  #[error("playback refused: {0}")]
  Refused(String),
}

/// The media element that plays file-based instrumental sources.
///
/// Volume is the master instrumental volume in `0.0..=1.0`; the vocal
/// monitoring path never goes through here.
pub trait InstrumentalOutput {
  /// Attaches a new locator, or detaches when `None`. Resets position.
  fn load(&mut self, locator: Option<&str>);
  fn play(&mut self) -> Result<(), PlaybackError>;
  fn pause(&mut self);
  fn set_volume(&mut self, volume: f32);
  /// Stops and releases the media. Called once on session teardown.
  fn stop(&mut self);
}
