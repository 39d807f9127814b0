use std::time::Instant;

use karaoke_core::domain::InstrumentalSource;
use tracing::debug;

use crate::boot::{BootSchedule, BootTiming};

#[derive(Debug, Clone, PartialEq)]
pub enum SelectorState {
  Idle,
  /// A hosted video is being launched. Switches are refused until it is active.
  Booting(InstrumentalSource),
  Active(InstrumentalSource),
}

/// Result of a switch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
  /// A file source became active right away.
  Activated,
  /// A hosted video launch started.
  Booting,
  /// Nothing is active any more.
  Cleared,
  /// A launch is in progress. The request was dropped.
  Rejected,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectorEvent {
  BootMessage(&'static str),
  Activated(InstrumentalSource),
}

/// Decides which instrumental source is active.
///
/// File sources activate immediately. Hosted videos go through a timed launch
/// sequence first, driven by [`SourceSelector::advance`].
#[derive(Debug)]
pub struct SourceSelector {
  state: SelectorState,
  boot: Option<BootSchedule>,
  timing: BootTiming,
}

impl SourceSelector {
  pub fn new(timing: BootTiming) -> Self {
    Self { state: SelectorState::Idle, boot: None, timing }
  }

  /// First hosted video, otherwise the first source.
  pub fn pick_initial(sources: &[InstrumentalSource]) -> Option<&InstrumentalSource> {
    sources.iter().find(|s| s.is_hosted_video()).or_else(|| sources.first())
  }

  pub fn state(&self) -> &SelectorState {
    &self.state
  }

  pub fn active(&self) -> Option<&InstrumentalSource> {
    match &self.state {
      SelectorState::Active(source) => Some(source),
      _ => None,
    }
  }

  pub fn is_booting(&self) -> bool {
    matches!(self.state, SelectorState::Booting(_))
  }

  /// Whether the active source is a hosted video, which has no local clock.
  pub fn video_active(&self) -> bool {
    self.active().is_some_and(InstrumentalSource::is_hosted_video)
  }

  /// Launch messages emitted so far for the current launch.
  pub fn boot_log(&self) -> &'static [&'static str] {
    self.boot.as_ref().map(BootSchedule::log).unwrap_or_default()
  }

  pub fn select(&mut self, source: Option<InstrumentalSource>, now: Instant) -> SwitchOutcome {
    if let SelectorState::Booting(pending) = &self.state {
      debug!(pending = %pending.title, "Source switch rejected while launching");
      return SwitchOutcome::Rejected;
    }

    match source {
      None => {
        self.state = SelectorState::Idle;
        SwitchOutcome::Cleared
      }
      Some(source) if source.is_hosted_video() => {
        debug!(title = %source.title, "Launching hosted video");
        self.boot = Some(BootSchedule::start(now, self.timing));
        self.state = SelectorState::Booting(source);
        SwitchOutcome::Booting
      }
      Some(source) => {
        debug!(title = %source.title, kind = %source.kind, "Source active");
        self.boot = None;
        self.state = SelectorState::Active(source);
        SwitchOutcome::Activated
      }
    }
  }

  /// Emits launch messages that are due and activates the video once the
  /// sequence is over.
  pub fn advance(&mut self, now: Instant) -> Vec<SelectorEvent> {
    let SelectorState::Booting(source) = &self.state else {
      return Vec::new();
    };
    let Some(boot) = self.boot.as_mut() else {
      return Vec::new();
    };

    let mut events: Vec<SelectorEvent> = boot.due_messages(now).iter().copied().map(SelectorEvent::BootMessage).collect();

    if boot.is_complete(now) {
      let source = source.clone();
      debug!(title = %source.title, "Hosted video active");
      self.state = SelectorState::Active(source.clone());
      events.push(SelectorEvent::Activated(source));
    }

    events
  }

  /// Drops any launch in progress. Used on teardown.
  pub fn cancel(&mut self) {
    self.boot = None;
    self.state = SelectorState::Idle;
  }
}
