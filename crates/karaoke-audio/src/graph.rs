use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::config::ReverbConfig;
use crate::convolver::Convolver;
use crate::gain::SmoothedGain;
use crate::impulse::ImpulseResponse;

/// Dry path gain. Monitoring is always at full strength.
pub const DRY_GAIN: f32 = 1.0;

/// Wet path gain for a reverb percentage: `percent / 100 * scale`,
/// with the percentage clamped to `0..=100` and NaN read as 0.
pub fn wet_gain_for(percent: f32, scale: f32) -> f32 {
  let percent = if percent.is_nan() { 0.0 } else { percent.clamp(0.0, 100.0) };
  percent / 100.0 * scale
}

/// Control side of an [`EffectsGraph`], safe to use from any thread while
/// the graph runs on the audio thread.
#[derive(Debug, Clone)]
pub struct EffectsControls {
  wet_target: Arc<AtomicU32>,
  wet_scale: f32,
}

impl EffectsControls {
  fn new(initial: f32, wet_scale: f32) -> Self {
    Self { wet_target: Arc::new(AtomicU32::new(initial.to_bits())), wet_scale }
  }

  /// Retunes the wet path. The graph glides to the new gain.
  pub fn set_wet_level(&self, percent: f32) {
    let gain = wet_gain_for(percent, self.wet_scale);
    self.wet_target.store(gain.to_bits(), Ordering::Relaxed);
  }

  pub fn wet_target(&self) -> f32 {
    f32::from_bits(self.wet_target.load(Ordering::Relaxed))
  }
}

/// Mono microphone in, stereo out: dry signal plus convolution reverb.
pub struct EffectsGraph {
  convolver: Convolver,
  wet_gain: SmoothedGain,
  controls: EffectsControls,
  wet_frame: [f32; 2],
}

impl EffectsGraph {
  /// Builds the graph around a fixed impulse response. The wet gain
  /// starts at the value for `wet_percent`, without a glide.
  pub fn new(impulse: &ImpulseResponse, config: &ReverbConfig, wet_percent: f32) -> Self {
    let initial = wet_gain_for(wet_percent, config.wet_scale);

    Self {
      convolver: Convolver::new(impulse.channels(), config.block_size),
      wet_gain: SmoothedGain::new(initial, config.smoothing_secs, impulse.sample_rate()),
      controls: EffectsControls::new(initial, config.wet_scale),
      wet_frame: [0.0; 2],
    }
  }

  pub fn controls(&self) -> EffectsControls {
    self.controls.clone()
  }

  pub fn set_wet_level(&self, percent: f32) {
    self.controls.set_wet_level(percent);
  }

  /// Gain currently applied on the wet path.
  pub fn wet_gain(&self) -> f32 {
    self.wet_gain.current()
  }

  pub fn latency(&self) -> usize {
    self.convolver.latency()
  }

  /// Processes one microphone sample into a stereo frame.
  pub fn process_sample(&mut self, input: f32) -> [f32; 2] {
    self.wet_gain.set_target(self.controls.wet_target());
    let gain = self.wet_gain.next_value();

    self.convolver.process_sample(input, &mut self.wet_frame);

    let dry = input * DRY_GAIN;
    [dry + self.wet_frame[0] * gain, dry + self.wet_frame[1] * gain]
  }

  /// Processes a block. `output` is resized to match `input`.
  pub fn process(&mut self, input: &[f32], output: &mut Vec<[f32; 2]>) {
    output.clear();
    output.extend(input.iter().map(|&x| self.process_sample(x)));
  }

  /// Writes into an interleaved device buffer with `channels` channels.
  /// Mono devices get the average of both sides; extra channels are silent.
  pub fn render_interleaved(&mut self, input: &[f32], output: &mut [f32], channels: usize) {
    let channels = channels.max(1);
    for (frame, &x) in output.chunks_mut(channels).zip(input.iter().chain(std::iter::repeat(&0.0))) {
      let [l, r] = self.process_sample(x);
      match frame {
        [mono] => *mono = (l + r) * 0.5,
        [left, right, rest @ ..] => {
          *left = l;
          *right = r;
          rest.iter_mut().for_each(|s| *s = 0.0);
        }
        [] => {}
      }
    }
  }
}
