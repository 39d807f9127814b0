use karaoke_core::domain::{LyricSheet, format_clock};

/// Position of the file-based instrumental, as reported by the output.
///
/// Hosted videos have no clock; the session keeps this reset while one plays.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlaybackClock {
  elapsed: f64,
  duration: f64,
}

impl PlaybackClock {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn on_time_update(&mut self, elapsed: f64) {
    self.elapsed = sanitize(elapsed);
  }

  pub fn on_metadata_loaded(&mut self, duration: f64) {
    self.duration = sanitize(duration);
  }

  pub fn reset(&mut self) {
    *self = Self::default();
  }

  pub fn elapsed(&self) -> f64 {
    self.elapsed
  }

  pub fn duration(&self) -> f64 {
    self.duration
  }

  pub fn line_index(&self, sheet: &LyricSheet) -> usize {
    sheet.current_index(self.elapsed, self.duration)
  }

  /// `elapsed / duration` as `m:ss / m:ss`.
  pub fn display(&self) -> String {
    format!("{} / {}", format_clock(self.elapsed), format_clock(self.duration))
  }
}

fn sanitize(seconds: f64) -> f64 {
  if seconds.is_finite() && seconds > 0.0 { seconds } else { 0.0 }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn drives_line_index() {
    let sheet = LyricSheet::parse("one\ntwo\n\nthree\nfour");
    let mut clock = PlaybackClock::new();

    assert_eq!(clock.line_index(&sheet), 0);

    clock.on_metadata_loaded(200.0);
    clock.on_time_update(100.0);
    assert_eq!(clock.line_index(&sheet), 2);

    clock.on_time_update(250.0);
    assert_eq!(clock.line_index(&sheet), 3);
  }

  #[test]
  fn unknown_duration_stays_on_first_line() {
    let sheet = LyricSheet::parse("one\ntwo");
    let mut clock = PlaybackClock::new();
    clock.on_metadata_loaded(f64::NAN);
    clock.on_time_update(42.0);

    assert_eq!(clock.duration(), 0.0);
    assert_eq!(clock.line_index(&sheet), 0);
  }

  #[test]
  fn display_and_reset() {
    let mut clock = PlaybackClock::new();
    clock.on_metadata_loaded(185.4);
    clock.on_time_update(65.9);
    assert_eq!(clock.display(), "1:05 / 3:05");

    clock.reset();
    assert_eq!(clock.display(), "0:00 / 0:00");
  }
}
