/// Below this distance the gain snaps onto its target.
const SNAP_EPSILON: f32 = 1e-6;

/// Gain that moves towards its target exponentially, one step per sample.
///
/// This is the `setTargetAtTime` curve: after `time_constant` seconds the
/// remaining distance is about 37%, after five time constants under 1%.
/// A zero time constant jumps immediately.
#[derive(Debug, Clone)]
pub struct SmoothedGain {
  current: f32,
  target: f32,
  coefficient: f32,
}

impl SmoothedGain {
  pub fn new(initial: f32, time_constant_secs: f32, sample_rate: u32) -> Self {
    Self { current: initial, target: initial, coefficient: coefficient(time_constant_secs, sample_rate) }
  }

  pub fn set_target(&mut self, target: f32) {
    self.target = target;
  }

  pub fn current(&self) -> f32 {
    self.current
  }

  pub fn target(&self) -> f32 {
    self.target
  }

  pub fn is_settled(&self) -> bool {
    self.current == self.target
  }

  /// Advances one sample and returns the gain to apply to it.
  pub fn next_value(&mut self) -> f32 {
    if self.current != self.target {
      self.current += (self.target - self.current) * self.coefficient;
      if (self.target - self.current).abs() < SNAP_EPSILON {
        self.current = self.target;
      }
    }
    self.current
  }
}

fn coefficient(time_constant_secs: f32, sample_rate: u32) -> f32 {
  let samples = time_constant_secs * sample_rate as f32;
  if !samples.is_finite() || samples <= 0.0 {
    return 1.0;
  }
  1.0 - (-1.0 / samples).exp()
}
