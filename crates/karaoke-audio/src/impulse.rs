use rand::Rng;

/// Smallest decay exponent accepted. Anything at or below zero (or NaN) is
/// raised to this, which gives an almost flat envelope.
pub const MIN_DECAY: f32 = 1e-3;

/// Synthetic stereo impulse response: independent uniform noise per
/// channel shaped by `(1 - i / len) ^ decay`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpulseResponse {
  sample_rate: u32,
  decay: f32,
  channels: [Vec<f32>; 2],
}

impl ImpulseResponse {
  /// Generates a new response with the thread-local generator.
  pub fn generate(sample_rate: u32, duration_secs: f32, decay: f32) -> Self {
    Self::synthesize(sample_rate, duration_secs, decay, &mut rand::thread_rng())
  }

  /// Same as [`ImpulseResponse::generate`] with a caller supplied generator.
  ///
  /// The length is `duration_secs * sample_rate`, never less than one
  /// sample.
  pub fn synthesize<R: Rng>(sample_rate: u32, duration_secs: f32, decay: f32, rng: &mut R) -> Self {
    let len = impulse_len(sample_rate, duration_secs);
    let decay = clamp_decay(decay);

    let mut left = Vec::with_capacity(len);
    let mut right = Vec::with_capacity(len);

    for i in 0..len {
      let fade = envelope(i, len, decay);
      left.push(rng.gen_range(-1.0f32..=1.0) * fade);
      right.push(rng.gen_range(-1.0f32..=1.0) * fade);
    }

    Self { sample_rate, decay, channels: [left, right] }
  }

  pub fn sample_rate(&self) -> u32 {
    self.sample_rate
  }

  pub fn decay(&self) -> f32 {
    self.decay
  }

  /// Samples per channel.
  pub fn len(&self) -> usize {
    self.channels[0].len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn channels(&self) -> &[Vec<f32>; 2] {
    &self.channels
  }

  pub fn left(&self) -> &[f32] {
    &self.channels[0]
  }

  pub fn right(&self) -> &[f32] {
    &self.channels[1]
  }
}

pub fn impulse_len(sample_rate: u32, duration_secs: f32) -> usize {
  let samples = sample_rate as f64 * duration_secs as f64;
  if samples.is_finite() && samples >= 1.0 { samples as usize } else { 1 }
}

pub fn clamp_decay(decay: f32) -> f32 {
  if decay.is_finite() && decay > MIN_DECAY { decay } else { MIN_DECAY }
}

/// Amplitude bound of sample `i` in a response of `len` samples.
pub fn envelope(i: usize, len: usize, decay: f32) -> f32 {
  let n = i as f32 / len.max(1) as f32;
  (1.0 - n).max(0.0).powf(decay)
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::SeedableRng;
  use rand::rngs::StdRng;

  fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
  }

  #[test]
  fn length_is_duration_times_rate() {
    let ir = ImpulseResponse::synthesize(48_000, 2.5, 4.0, &mut rng());

    assert_eq!(ir.len(), 120_000);
    assert_eq!(ir.left().len(), ir.right().len());
  }

  #[test]
  fn samples_stay_under_a_non_increasing_envelope() {
    for &decay in &[0.5f32, 1.0, 4.0, 12.0] {
      let ir = ImpulseResponse::synthesize(8_000, 0.5, decay, &mut rng());
      let len = ir.len();

      let mut previous = f32::INFINITY;
      for i in 0..len {
        let bound = envelope(i, len, ir.decay());
        assert!(bound <= previous, "envelope rose at {i} for decay {decay}");
        assert!(ir.left()[i].abs() <= bound + f32::EPSILON);
        assert!(ir.right()[i].abs() <= bound + f32::EPSILON);
        previous = bound;
      }

      assert_eq!(envelope(0, len, ir.decay()), 1.0);
    }
  }

  #[test]
  fn higher_decay_front_loads_energy() {
    let soft = ImpulseResponse::synthesize(8_000, 1.0, 1.0, &mut rng());
    let hard = ImpulseResponse::synthesize(8_000, 1.0, 8.0, &mut rng());

    let tail_energy = |ir: &ImpulseResponse| ir.left()[ir.len() / 2..].iter().map(|s| s * s).sum::<f32>();
    assert!(tail_energy(&hard) < tail_energy(&soft));
  }

  #[test]
  fn channels_are_independent() {
    let ir = ImpulseResponse::synthesize(8_000, 0.1, 2.0, &mut rng());
    assert_ne!(ir.left(), ir.right());
  }

  #[test]
  fn degenerate_inputs_do_not_produce_nan_or_empty() {
    for (duration, decay) in [(0.0, 4.0), (-1.0, 4.0), (2.0, 0.0), (2.0, -3.0), (f32::NAN, f32::NAN)] {
      let ir = ImpulseResponse::synthesize(100, duration, decay, &mut rng());

      assert!(!ir.is_empty());
      assert!(ir.decay() >= MIN_DECAY);
      assert!(ir.left().iter().chain(ir.right()).all(|s| s.is_finite()));
    }

    assert_eq!(ImpulseResponse::synthesize(0, 2.0, 4.0, &mut rng()).len(), 1);
  }
}
