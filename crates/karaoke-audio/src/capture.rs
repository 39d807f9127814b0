use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ReverbConfig;
use crate::graph::{EffectsControls, EffectsGraph};
use crate::impulse::ImpulseResponse;

#[derive(Debug, Error)]
pub enum CaptureError {
  #[error("microphone access denied: {0}")]
  Denied(String),

  #[error("microphone unavailable: {0}")]
  Unavailable(String),
}

#[derive(Debug, Error)]
pub enum AudioHostError {
  #[error("audio output unavailable: {0}")]
  Unavailable(String),

  #[error("audio stream failed: {0}")]
  Stream(String),
}

/// A live microphone stream.
pub trait InputStream {
  fn sample_rate(&self) -> u32;

  /// Stops every track of the stream. Calling it twice is harmless.
  fn stop(&mut self);

  fn is_live(&self) -> bool;
}

/// Platform audio: hands out the microphone and runs an effects graph
/// between it and the speakers.
pub trait AudioHost {
  type Input: InputStream;
  /// Keeps the output running while alive.
  type Render;

  fn request_input(&mut self) -> Result<Self::Input, CaptureError>;

  fn start_render(&mut self, input: &mut Self::Input, graph: EffectsGraph) -> Result<Self::Render, AudioHostError>;
}

/// Microphone plus reverb for one player session.
///
/// The microphone is requested at most once. Any failure leaves the chain
/// inactive and is only logged, playback never sees it.
pub struct VocalChain<H: AudioHost> {
  host: H,
  requested: bool,
  input: Option<H::Input>,
  render: Option<H::Render>,
  controls: Option<EffectsControls>,
}

impl<H: AudioHost> VocalChain<H> {
  pub fn new(host: H) -> Self {
    Self { host, requested: false, input: None, render: None, controls: None }
  }

  /// Opens the microphone and starts the graph. Returns whether the chain is
  /// running afterwards. Only the first call does any work.
  pub fn acquire(&mut self, config: &ReverbConfig, wet_percent: f32) -> bool {
    if self.requested {
      return self.is_active();
    }
    self.requested = true;

    let mut input = match self.host.request_input() {
      Ok(input) => input,
      Err(e) => {
        warn!("Vocal effects disabled: {e}");
        return false;
      }
    };

    let impulse = ImpulseResponse::generate(input.sample_rate(), config.impulse_duration_secs, config.impulse_decay);
    let graph = EffectsGraph::new(&impulse, config, wet_percent);
    let controls = graph.controls();

    match self.host.start_render(&mut input, graph) {
      Ok(render) => {
        info!(sample_rate = input.sample_rate(), impulse_len = impulse.len(), "Vocal effects running");
        self.input = Some(input);
        self.render = Some(render);
        self.controls = Some(controls);
        true
      }
      Err(e) => {
        warn!("Vocal effects disabled: {e}");
        input.stop();
        false
      }
    }
  }

  pub fn is_active(&self) -> bool {
    self.render.is_some()
  }

  /// No-op while inactive.
  pub fn set_wet_level(&self, percent: f32) {
    if let Some(controls) = &self.controls {
      controls.set_wet_level(percent);
    }
  }

  pub fn wet_target(&self) -> Option<f32> {
    self.controls.as_ref().map(EffectsControls::wet_target)
  }

  /// Stops output first, then the microphone.
  pub fn release(&mut self) {
    self.controls = None;
    if self.render.take().is_some() {
      debug!("Vocal effects output stopped");
    }
    if let Some(mut input) = self.input.take() {
      input.stop();
      debug!("Microphone released");
    }
  }
}

impl<H: AudioHost> Drop for VocalChain<H> {
  fn drop(&mut self) {
    self.release();
  }
}


#[cfg(test)]
mod tests {
  use std::sync::atomic::Ordering;

  use super::fake::{FakeHost, MicBehaviour};
  use super::*;

  fn config() -> ReverbConfig {
    ReverbConfig::builder().impulse_duration_secs(0.05).block_size(64).build()
  }

  #[test]
  fn granted_microphone_starts_the_graph() {
    let mut chain = VocalChain::new(FakeHost::new(MicBehaviour::Grant));

    assert!(chain.acquire(&config(), 30.0));
    assert!(chain.is_active());
    assert!((chain.wet_target().unwrap() - 0.24).abs() < 1e-6);
  }

  #[test]
  fn acquire_is_idempotent() {
    let host = FakeHost::new(MicBehaviour::Grant);
    let stats = host.stats.clone();
    let mut chain = VocalChain::new(host);

    chain.acquire(&config(), 30.0);
    chain.acquire(&config(), 30.0);

    assert_eq!(stats.requests.load(Ordering::SeqCst), 1);
    assert_eq!(stats.renders.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn denied_microphone_leaves_chain_inactive() {
    let host = FakeHost::new(MicBehaviour::Deny);
    let stats = host.stats.clone();
    let mut chain = VocalChain::new(host);

    assert!(!chain.acquire(&config(), 30.0));
    assert!(!chain.acquire(&config(), 30.0));
    assert!(!chain.is_active());
    assert_eq!(chain.wet_target(), None);
    assert_eq!(stats.requests.load(Ordering::SeqCst), 1);

    // controls are inert
    chain.set_wet_level(100.0);
  }

  #[test]
  fn output_failure_releases_microphone() {
    let host = FakeHost::new(MicBehaviour::FailOutput);
    let stats = host.stats.clone();
    let mut chain = VocalChain::new(host);

    assert!(!chain.acquire(&config(), 30.0));
    assert_eq!(stats.stopped.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn wet_level_reaches_running_graph() {
    let mut chain = VocalChain::new(FakeHost::new(MicBehaviour::Grant));
    chain.acquire(&config(), 30.0);

    chain.set_wet_level(100.0);
    assert!((chain.wet_target().unwrap() - 0.8).abs() < 1e-6);
  }

  #[test]
  fn drop_stops_output_and_microphone() {
    let host = FakeHost::new(MicBehaviour::Grant);
    let stats = host.stats.clone();
    let running = host.running.clone();

    {
      let mut chain = VocalChain::new(host);
      chain.acquire(&config(), 30.0);
      assert!(running.load(Ordering::SeqCst));
    }

    assert!(!running.load(Ordering::SeqCst));
    assert_eq!(stats.stopped.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn release_is_repeatable() {
    let host = FakeHost::new(MicBehaviour::Grant);
    let stats = host.stats.clone();
    let mut chain = VocalChain::new(host);
    chain.acquire(&config(), 30.0);

    chain.release();
    chain.release();

    assert!(!chain.is_active());
    assert_eq!(stats.stopped.load(Ordering::SeqCst), 1);
  }
}
