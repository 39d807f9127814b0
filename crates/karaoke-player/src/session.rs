use std::time::Instant;

use karaoke_audio::{AudioHost, ReverbConfig, VocalChain};
use karaoke_core::domain::{InstrumentalSource, LyricSheet, Song, SongId};
use karaoke_core::ports::{Connectivity, ConnectivitySubscription, InstrumentalOutput};
use karaoke_core::services::Lyrics;
use tracing::{debug, info, warn};

use crate::clock::PlaybackClock;
use crate::config::PlayerConfig;
use crate::selector::{SelectorEvent, SelectorState, SourceSelector, SwitchOutcome};

/// Shown until the lyrics arrive.
pub const LYRICS_LOADING_MESSAGE: &str = "Loading the stage...";

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
  BootMessage(&'static str),
  SourceActivated(InstrumentalSource),
  ConnectivityChanged(bool),
}

/// Everything that lives while one song is open in the player: the
/// instrumental output, the vocal effects chain, the source selector and
/// the lyric clock.
///
/// Closing (or dropping) the session stops the output, the launch timer and
/// the microphone, and unsubscribes from connectivity changes.
pub struct PlayerSession<O, H>
where
  O: InstrumentalOutput,
  H: AudioHost,
{
  song: Song,
  output: O,
  vocals: VocalChain<H>,
  selector: SourceSelector,
  clock: PlaybackClock,
  lyrics: Option<Lyrics>,
  sheet: LyricSheet,
  playing: bool,
  volume: f32,
  reverb: f32,
  connectivity: Option<ConnectivitySubscription>,
  online: bool,
  closed: bool,
}

impl<O, H> PlayerSession<O, H>
where
  O: InstrumentalOutput,
  H: AudioHost,
{
  /// Opens `song`: picks the initial source, applies the default volume and
  /// starts the vocal chain. The microphone being unavailable does not
  /// prevent playback.
  pub fn open<N: Connectivity>(
    song: Song,
    output: O,
    host: H,
    connectivity: &N,
    config: &PlayerConfig,
    reverb: &ReverbConfig,
    now: Instant,
  ) -> Self {
    let subscription = connectivity.subscribe();
    let online = subscription.current();
    let sheet = song.lyrics.as_deref().map(LyricSheet::parse).unwrap_or_default();

    let mut session = Self {
      song,
      output,
      vocals: VocalChain::new(host),
      selector: SourceSelector::new(config.boot_timing()),
      clock: PlaybackClock::new(),
      lyrics: None,
      sheet,
      playing: config.autoplay,
      volume: clamp_percent(config.default_volume),
      reverb: clamp_percent(config.default_reverb),
      connectivity: Some(subscription),
      online,
      closed: false,
    };

    info!(song = %session.song.id, title = %session.song.title, "Opening player");

    session.output.set_volume(session.volume / 100.0);

    let initial = SourceSelector::pick_initial(&session.song.instrumental_sources).cloned();
    session.apply_switch(initial, now);

    if !session.vocals.acquire(reverb, session.reverb) {
      debug!("Playing without vocal effects");
    }

    session
  }

  pub fn song(&self) -> &Song {
    &self.song
  }

  pub fn output(&self) -> &O {
    &self.output
  }

  pub fn state(&self) -> &SelectorState {
    self.selector.state()
  }

  pub fn active_source(&self) -> Option<&InstrumentalSource> {
    self.selector.active()
  }

  pub fn boot_log(&self) -> &'static [&'static str] {
    self.selector.boot_log()
  }

  pub fn is_playing(&self) -> bool {
    self.playing
  }

  pub fn is_online(&self) -> bool {
    self.online
  }

  pub fn is_closed(&self) -> bool {
    self.closed
  }

  pub fn volume(&self) -> f32 {
    self.volume
  }

  pub fn reverb(&self) -> f32 {
    self.reverb
  }

  pub fn vocals_active(&self) -> bool {
    self.vocals.is_active()
  }

  pub fn clock(&self) -> &PlaybackClock {
    &self.clock
  }

  pub fn lyrics_text(&self) -> &str {
    self.lyrics.as_ref().map(|l| l.text.as_str()).or(self.song.lyrics.as_deref()).unwrap_or(LYRICS_LOADING_MESSAGE)
  }

  pub fn lyrics(&self) -> Option<&Lyrics> {
    self.lyrics.as_ref()
  }

  pub fn current_line(&self) -> usize {
    self.clock.line_index(&self.sheet)
  }

  /// Current line and the one after it.
  pub fn visible_lines(&self) -> &[String] {
    self.sheet.visible(self.current_line())
  }

  /// Requests another source. Refused while a video launch is in progress.
  pub fn switch_source(&mut self, source: Option<InstrumentalSource>, now: Instant) -> SwitchOutcome {
    if self.closed {
      return SwitchOutcome::Rejected;
    }
    self.apply_switch(source, now)
  }

  /// Switches to the song's source at `index`. Out of range clears the
  /// active source.
  pub fn switch_to(&mut self, index: usize, now: Instant) -> SwitchOutcome {
    let source = self.song.instrumental_sources.get(index).cloned();
    self.switch_source(source, now)
  }

  /// With a file playing this drives the output. With a hosted video only
  /// the flag changes, the embedded player has its own controls.
  pub fn toggle_play(&mut self) {
    if self.closed {
      return;
    }

    if self.selector.video_active() {
      self.playing = !self.playing;
      return;
    }

    if self.playing {
      self.output.pause();
      self.playing = false;
    } else {
      self.playing = true;
      self.start_output();
    }
  }

  /// Instrumental volume, 0 to 100. The vocal path is never affected.
  pub fn set_volume(&mut self, percent: f32) {
    self.volume = clamp_percent(percent);
    self.output.set_volume(self.volume / 100.0);
  }

  /// Reverb amount, 0 to 100.
  pub fn set_reverb(&mut self, percent: f32) {
    self.reverb = clamp_percent(percent);
    self.vocals.set_wet_level(self.reverb);
  }

  pub fn on_time_update(&mut self, elapsed: f64) {
    if !self.closed && !self.selector.video_active() {
      self.clock.on_time_update(elapsed);
    }
  }

  pub fn on_metadata_loaded(&mut self, duration: f64) {
    if !self.closed && !self.selector.video_active() {
      self.clock.on_metadata_loaded(duration);
    }
  }

  /// Runs the launch timer and picks up connectivity changes.
  pub fn advance(&mut self, now: Instant) -> Vec<SessionEvent> {
    if self.closed {
      return Vec::new();
    }

    let mut events = Vec::new();

    for event in self.selector.advance(now) {
      match event {
        SelectorEvent::BootMessage(message) => events.push(SessionEvent::BootMessage(message)),
        SelectorEvent::Activated(source) => {
          self.on_activated(&source);
          events.push(SessionEvent::SourceActivated(source));
        }
      }
    }

    if let Some(online) = self.connectivity.as_mut().and_then(ConnectivitySubscription::poll_change) {
      debug!(online, "Connectivity changed");
      self.online = online;
      events.push(SessionEvent::ConnectivityChanged(online));
    }

    events
  }

  /// Attaches fetched lyrics to the open song.
  ///
  /// Returns the song to write to the cache, or `None` when the lyrics are
  /// a placeholder or arrived for a song that is no longer open.
  pub fn attach_lyrics(&mut self, song_id: &SongId, lyrics: Lyrics) -> Option<Song> {
    if self.closed || song_id != &self.song.id {
      debug!(song = %song_id, "Ignoring stale lyrics");
      return None;
    }

    self.sheet = LyricSheet::parse(&lyrics.text);
    let persist = lyrics.is_persistable();
    if persist {
      self.song.lyrics = Some(lyrics.text.clone());
    }
    self.lyrics = Some(lyrics);

    persist.then(|| self.song.clone())
  }

  /// Tears the session down and returns the song, with its lyrics, for the
  /// cache. Only the first call returns it.
  pub fn close(&mut self) -> Option<Song> {
    if self.closed {
      return None;
    }
    self.teardown();
    info!(song = %self.song.id, "Player closed");
    Some(self.song.clone())
  }

  fn teardown(&mut self) {
    self.closed = true;
    self.selector.cancel();
    self.output.stop();
    self.vocals.release();
    self.connectivity = None;
    self.clock.reset();
    self.playing = false;
  }

  fn apply_switch(&mut self, source: Option<InstrumentalSource>, now: Instant) -> SwitchOutcome {
    let was_idle = *self.selector.state() == SelectorState::Idle;

    let outcome = self.selector.select(source, now);
    match outcome {
      SwitchOutcome::Activated => {
        if let Some(source) = self.selector.active().cloned() {
          self.on_activated(&source);
        }
      }
      SwitchOutcome::Cleared => self.attach_fallback(),
      // whatever was playing keeps going until the video is live
      SwitchOutcome::Booting if was_idle => self.attach_fallback(),
      SwitchOutcome::Booting | SwitchOutcome::Rejected => {}
    }
    outcome
  }

  fn on_activated(&mut self, source: &InstrumentalSource) {
    self.clock.reset();

    if source.is_hosted_video() {
      // the embedded player takes over
      self.output.stop();
      return;
    }

    self.output.load(source.locator());
    if self.playing {
      self.start_output();
    }
  }

  /// Backing track of the song, used while no source is active.
  fn attach_fallback(&mut self) {
    self.clock.reset();
    let fallback = self.song.backing_track_url.as_deref().filter(|url| !url.trim().is_empty());
    self.output.load(fallback);
    if self.playing && fallback.is_some() {
      self.start_output();
    }
  }

  fn start_output(&mut self) {
    if let Err(e) = self.output.play() {
      warn!("Instrumental playback failed: {e}");
      self.playing = false;
    }
  }
}

impl<O, H> Drop for PlayerSession<O, H>
where
  O: InstrumentalOutput,
  H: AudioHost,
{
  fn drop(&mut self) {
    if !self.closed {
      self.teardown();
    }
  }
}

fn clamp_percent(value: f32) -> f32 {
  if value.is_nan() { 0.0 } else { value.clamp(0.0, 100.0) }
}
