use std::time::{Duration, Instant};

/// Status lines shown while a hosted video is being launched. Purely
/// cosmetic, the video itself is not touched until the schedule ends.
pub const BOOT_MESSAGES: [&str; 6] = [
  "> Initializing video engine...",
  "> Opening secure connection to the video host...",
  "> Skipping ad overlay...",
  "> Tuning audio buffer for low latency...",
  "> Syncing 1080p video channels...",
  "> Ready. Launching stage player...",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootTiming {
  pub cadence: Duration,
  pub settle: Duration,
}

impl Default for BootTiming {
  fn default() -> Self {
    Self { cadence: Duration::from_millis(400), settle: Duration::from_millis(800) }
  }
}

/// Timeline of one launch: message `i` is due `i * cadence` after the start,
/// completion `settle` after the last message.
#[derive(Debug, Clone)]
pub struct BootSchedule {
  started: Instant,
  timing: BootTiming,
  emitted: usize,
}

impl BootSchedule {
  pub fn start(now: Instant, timing: BootTiming) -> Self {
    Self { started: now, timing, emitted: 0 }
  }

  /// Messages that became due since the last call, in order.
  pub fn due_messages(&mut self, now: Instant) -> &'static [&'static str] {
    let elapsed = now.saturating_duration_since(self.started);
    let due = BOOT_MESSAGES.iter().enumerate().take_while(|(i, _)| self.timing.cadence * *i as u32 <= elapsed).count();

    let from = self.emitted;
    self.emitted = self.emitted.max(due);
    &BOOT_MESSAGES[from..self.emitted]
  }

  /// Every message emitted so far.
  pub fn log(&self) -> &'static [&'static str] {
    &BOOT_MESSAGES[..self.emitted]
  }

  pub fn completes_at(&self) -> Instant {
    self.started + self.timing.cadence * (BOOT_MESSAGES.len() as u32 - 1) + self.timing.settle
  }

  pub fn is_complete(&self, now: Instant) -> bool {
    now >= self.completes_at()
  }
}
