/// Lyric text split into singable lines.
///
/// Blank lines are dropped, so the line count is what the progress based
/// sync divides by.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LyricSheet {
  lines: Vec<String>,
}

impl LyricSheet {
  pub fn parse(text: &str) -> Self {
    let lines = text.lines().filter(|l| !l.trim().is_empty()).map(str::to_string).collect();
    Self { lines }
  }

  pub fn lines(&self) -> &[String] {
    &self.lines
  }

  pub fn line_count(&self) -> usize {
    self.lines.len()
  }

  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }

  /// Index of the line to highlight at `elapsed` seconds of `duration`.
  pub fn current_index(&self, elapsed: f64, duration: f64) -> usize {
    line_index(elapsed, duration, self.lines.len())
  }

  /// The current line followed by the next one, when there is one.
  pub fn visible(&self, index: usize) -> &[String] {
    let start = index.min(self.lines.len());
    let end = (start + 2).min(self.lines.len());
    &self.lines[start..end]
  }
}

/// `floor(elapsed / duration * line_count)` clamped to `[0, line_count - 1]`.
///
/// Returns 0 when there are no lines, when the duration is not a positive
/// number, or when the elapsed time is not finite.
pub fn line_index(elapsed: f64, duration: f64, line_count: usize) -> usize {
  if line_count == 0 || !duration.is_finite() || duration <= 0.0 || !elapsed.is_finite() {
    return 0;
  }

  let progress = (elapsed / duration).max(0.0);
  let raw = (progress * line_count as f64).floor();

  (raw as usize).min(line_count - 1)
}

/// Formats seconds as `m:ss`. Negative or non-finite input shows `0:00`.
pub fn format_clock(seconds: f64) -> String {
  let total = if seconds.is_finite() && seconds > 0.0 { seconds.floor() as u64 } else { 0 };
  format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
  use super::*;

  const TEXT: &str = "first line\n\n  \nsecond line\nthird line\n\nfourth line\n";

  #[test]
  fn parse_drops_blank_lines() {
    let sheet = LyricSheet::parse(TEXT);
    assert_eq!(sheet.line_count(), 4);
    assert_eq!(sheet.lines()[1], "second line");
  }

  #[test]
  fn index_follows_progress() {
    let sheet = LyricSheet::parse(TEXT);

    assert_eq!(sheet.current_index(0.0, 100.0), 0);
    assert_eq!(sheet.current_index(24.9, 100.0), 0);
    assert_eq!(sheet.current_index(25.0, 100.0), 1);
    assert_eq!(sheet.current_index(99.0, 100.0), 3);
  }

  #[test]
  fn index_is_clamped() {
    assert_eq!(line_index(500.0, 100.0, 4), 3);
    assert_eq!(line_index(-10.0, 100.0, 4), 0);
    assert_eq!(line_index(f64::NAN, 100.0, 4), 0);
  }

  #[test]
  fn index_is_zero_without_lines_or_duration() {
    assert_eq!(line_index(10.0, 100.0, 0), 0);
    assert_eq!(line_index(10.0, 0.0, 4), 0);
    assert_eq!(line_index(10.0, f64::NAN, 4), 0);
  }

  #[test]
  fn index_is_idempotent_and_in_bounds() {
    for count in 1..20usize {
      for step in 0..200 {
        let elapsed = step as f64 * 1.7;
        let a = line_index(elapsed, 187.3, count);
        let b = line_index(elapsed, 187.3, count);
        assert_eq!(a, b);
        assert!(a < count);
      }
    }
  }

  #[test]
  fn visible_window_has_current_and_next() {
    let sheet = LyricSheet::parse(TEXT);

    assert_eq!(sheet.visible(0), &["first line".to_string(), "second line".to_string()]);
    assert_eq!(sheet.visible(3), &["fourth line".to_string()]);
    assert!(sheet.visible(10).is_empty());
  }

  #[test]
  fn clock_formatting() {
    assert_eq!(format_clock(0.0), "0:00");
    assert_eq!(format_clock(65.9), "1:05");
    assert_eq!(format_clock(-3.0), "0:00");
    assert_eq!(format_clock(3600.0), "60:00");
  }
}
