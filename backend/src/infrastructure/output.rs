use std::time::Instant;

use karaoke_core::ports::{InstrumentalOutput, PlaybackError};
use tracing::info;

/// Instrumental output without a media backend: remembers the locator and
/// keeps a transport position so lyrics can be followed from a terminal.
#[derive(Debug, Default)]
pub struct HeadlessOutput {
  locator: Option<String>,
  started: Option<Instant>,
  offset: f64,
  volume: f32,
}

impl HeadlessOutput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn locator(&self) -> Option<&str> {
    self.locator.as_deref()
  }

  pub fn volume(&self) -> f32 {
    self.volume
  }

  pub fn is_playing(&self) -> bool {
    self.started.is_some()
  }

  /// Seconds played since the locator was loaded.
  pub fn position(&self) -> f64 {
    self.offset + self.started.map(|t| t.elapsed().as_secs_f64()).unwrap_or(0.0)
  }

  fn rewind(&mut self) {
    self.started = None;
    self.offset = 0.0;
  }
}

impl InstrumentalOutput for HeadlessOutput {
  fn load(&mut self, locator: Option<&str>) {
    self.rewind();
    self.locator = locator.map(str::to_string);
    if let Some(locator) = &self.locator {
      info!(locator, "Instrumental loaded");
    }
  }

  fn play(&mut self) -> Result<(), PlaybackError> {
    if self.locator.is_none() {
      return Err(PlaybackError::NoMedia);
    }
    if self.started.is_none() {
      self.started = Some(Instant::now());
    }
    Ok(())
  }

  fn pause(&mut self) {
    self.offset = self.position();
    self.started = None;
  }

  fn set_volume(&mut self, volume: f32) {
    self.volume = volume.clamp(0.0, 1.0);
  }

  fn stop(&mut self) {
    self.rewind();
    self.locator = None;
  }
}
