use karaoke_config::{CONFIG_BACKEND, ConfigBackend, ConfigError};
use serde::{Deserialize, Serialize};

/// Settings of the vocal reverb, `[reverb]` section of karaoke.toml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReverbConfig {
  /// Length of the synthetic impulse response.
  pub impulse_duration_secs: f32,
  /// Envelope exponent. Higher means the tail dies out sooner.
  pub impulse_decay: f32,
  /// Convolution partition size in samples. Also the wet path latency.
  pub block_size: usize,
  /// Time constant of wet gain changes.
  pub smoothing_secs: f32,
  /// Gain reached at 100% reverb.
  pub wet_scale: f32,
  /// Microphone buffering between the input and output callbacks.
  pub ring_buffer_secs: f32,
}

impl Default for ReverbConfig {
  fn default() -> Self {
    Self {
      impulse_duration_secs: 2.5,
      impulse_decay: 4.0,
      block_size: 512,
      smoothing_secs: 0.1,
      wet_scale: 0.8,
      ring_buffer_secs: 0.5,
    }
  }
}

impl ReverbConfig {
  pub fn builder() -> ReverbConfigBuilder {
    ReverbConfigBuilder::new()
  }

  pub fn load() -> Result<Self, ConfigError> {
    let cfg = CONFIG_BACKEND.load_section_with_default("reverb")?;
    CONFIG_BACKEND.save_section("reverb", &cfg)?;
    Ok(cfg)
  }

  pub fn save(&self) -> Result<(), ConfigError> {
    CONFIG_BACKEND.save_section("reverb", self)
  }
}

/// Builder so tests and callers only touch the fields they care about.
#[derive(Debug, Clone)]
pub struct ReverbConfigBuilder {
  inner: ReverbConfig,
}

impl ReverbConfigBuilder {
  pub fn new() -> Self {
    Self { inner: ReverbConfig::default() }
  }

  pub fn impulse_duration_secs(mut self, secs: f32) -> Self {
    self.inner.impulse_duration_secs = secs;
    self
  }

  pub fn impulse_decay(mut self, decay: f32) -> Self {
    self.inner.impulse_decay = decay;
    self
  }

  pub fn block_size(mut self, size: usize) -> Self {
    self.inner.block_size = size;
    self
  }

  pub fn smoothing_secs(mut self, secs: f32) -> Self {
    self.inner.smoothing_secs = secs;
    self
  }

  pub fn wet_scale(mut self, scale: f32) -> Self {
    self.inner.wet_scale = scale;
    self
  }

  pub fn build(self) -> ReverbConfig {
    self.inner
  }
}

impl Default for ReverbConfigBuilder {
  fn default() -> Self {
    Self::new()
  }
}
