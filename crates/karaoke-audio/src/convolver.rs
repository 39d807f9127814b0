//! Uniformly partitioned FFT convolution (overlap-save).
//!
//! The kernel is cut into partitions of `block_size` samples, each one
//! transformed once up front. Every input block is transformed once and
//! kept in a frequency-domain delay line; the output block is the inverse
//! transform of the sum of delayed input spectra times partition spectra.
//!
//! Latency is exactly `block_size` samples. Cost per block is one forward
//! FFT plus one inverse FFT per output channel, independent of kernel
//! length apart from the complex multiply-accumulate.

use num_traits::Zero;
use rustfft::{Fft, FftPlanner, num_complex::Complex};
use std::sync::Arc;

pub struct Convolver {
  block_size: usize,
  fft_size: usize,
  fft: Arc<dyn Fft<f32>>,
  ifft: Arc<dyn Fft<f32>>,
  /// `[channel][partition]` kernel spectra.
  kernels: Vec<Vec<Vec<Complex<f32>>>>,
  /// Spectra of the last `partitions` input windows, used as a ring.
  delay_line: Vec<Vec<Complex<f32>>>,
  delay_pos: usize,
  /// Previous block followed by the current block.
  window: Vec<f32>,
  /// Output of the last processed block, per channel.
  pending: Vec<Vec<f32>>,
  pos: usize,
  // Pre-allocated scratch so processing never allocates.
  spectrum: Vec<Complex<f32>>,
  accumulator: Vec<Complex<f32>>,
  scratch: Vec<Complex<f32>>,
}

impl Convolver {
  /// Builds a convolver with one output channel per kernel.
  ///
  /// Empty kernels behave as silence. `block_size` is raised to at least 1.
  pub fn new(kernels: &[Vec<f32>], block_size: usize) -> Self {
    let block_size = block_size.max(1);
    let fft_size = block_size * 2;

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_size);
    let ifft = planner.plan_fft_inverse(fft_size);
    let scratch_len = fft.get_inplace_scratch_len().max(ifft.get_inplace_scratch_len());
    let mut scratch = vec![Complex::zero(); scratch_len];

    let partitions = kernels.iter().map(|k| k.len().div_ceil(block_size)).max().unwrap_or(0).max(1);

    let kernels: Vec<Vec<Vec<Complex<f32>>>> = kernels
      .iter()
      .map(|kernel| {
        (0..partitions)
          .map(|p| {
            let start = (p * block_size).min(kernel.len());
            let end = (start + block_size).min(kernel.len());

            let mut buf = vec![Complex::zero(); fft_size];
            for (slot, &sample) in buf.iter_mut().zip(&kernel[start..end]) {
              *slot = Complex::new(sample, 0.0);
            }
            fft.process_with_scratch(&mut buf, &mut scratch);
            buf
          })
          .collect()
      })
      .collect();

    let channels = kernels.len();

    Self {
      block_size,
      fft_size,
      fft,
      ifft,
      kernels,
      delay_line: vec![vec![Complex::zero(); fft_size]; partitions],
      delay_pos: 0,
      window: vec![0.0; fft_size],
      pending: vec![vec![0.0; block_size]; channels],
      pos: 0,
      spectrum: vec![Complex::zero(); fft_size],
      accumulator: vec![Complex::zero(); fft_size],
      scratch,
    }
  }

  pub fn block_size(&self) -> usize {
    self.block_size
  }

  /// Delay between an input sample and its first contribution to the output.
  pub fn latency(&self) -> usize {
    self.block_size
  }

  pub fn channels(&self) -> usize {
    self.kernels.len()
  }

  /// Pushes one input sample and writes one output sample per channel.
  pub fn process_sample(&mut self, input: f32, out: &mut [f32]) {
    let b = self.block_size;

    for (slot, channel) in out.iter_mut().zip(&self.pending) {
      *slot = channel[self.pos];
    }

    self.window[b + self.pos] = input;
    self.pos += 1;

    if self.pos == b {
      self.process_block();
      self.pos = 0;
    }
  }

  fn process_block(&mut self) {
    let b = self.block_size;
    let partitions = self.delay_line.len();

    // 1) Spectrum of [previous block | current block].
    for (slot, &sample) in self.spectrum.iter_mut().zip(&self.window) {
      *slot = Complex::new(sample, 0.0);
    }
    self.fft.process_with_scratch(&mut self.spectrum, &mut self.scratch);
    self.delay_line[self.delay_pos].copy_from_slice(&self.spectrum);

    // 2) Per channel: sum of delayed spectra times kernel partitions.
    let scale = 1.0 / self.fft_size as f32;
    for (channel, kernel) in self.kernels.iter().enumerate() {
      self.accumulator.iter_mut().for_each(|c| *c = Complex::zero());

      for (p, partition) in kernel.iter().enumerate() {
        let x = &self.delay_line[(self.delay_pos + partitions - p) % partitions];
        for ((acc, xi), hi) in self.accumulator.iter_mut().zip(x).zip(partition) {
          *acc += xi * hi;
        }
      }

      self.ifft.process_with_scratch(&mut self.accumulator, &mut self.scratch);

      // 3) Overlap-save: only the second half is alias free.
      for (out, c) in self.pending[channel].iter_mut().zip(&self.accumulator[b..]) {
        *out = c.re * scale;
      }
    }

    // 4) Slide the input window and advance the delay line.
    self.window.copy_within(b.., 0);
    self.delay_pos = (self.delay_pos + 1) % partitions;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn direct(input: &[f32], kernel: &[f32]) -> Vec<f32> {
    let mut out = vec![0.0; input.len() + kernel.len()];
    for (i, &x) in input.iter().enumerate() {
      for (k, &h) in kernel.iter().enumerate() {
        out[i + k] += x * h;
      }
    }
    out
  }

  fn run(conv: &mut Convolver, input: &[f32]) -> Vec<Vec<f32>> {
    let mut outputs = vec![Vec::new(); conv.channels()];
    let mut frame = vec![0.0; conv.channels()];
    for &x in input {
      conv.process_sample(x, &mut frame);
      for (c, &s) in frame.iter().enumerate() {
        outputs[c].push(s);
      }
    }
    outputs
  }

  #[test]
  fn impulse_reproduces_kernel_after_latency() {
    let kernel: Vec<f32> = (0..10).map(|i| 1.0 - i as f32 * 0.1).collect();
    let mut conv = Convolver::new(&[kernel.clone()], 4);

    let mut input = vec![0.0; 24];
    input[0] = 1.0;
    let out = run(&mut conv, &input).remove(0);

    for (i, &s) in out.iter().enumerate() {
      let expected = i.checked_sub(4).and_then(|k| kernel.get(k)).copied().unwrap_or(0.0);
      assert!((s - expected).abs() < 1e-5, "sample {i}: {s} vs {expected}");
    }
  }

  #[test]
  fn matches_direct_convolution() {
    let kernel_l: Vec<f32> = (0..37).map(|i| ((i * 7 % 11) as f32 - 5.0) / 5.0).collect();
    let kernel_r: Vec<f32> = (0..13).map(|i| ((i * 3 % 5) as f32 - 2.0) / 2.0).collect();
    let input: Vec<f32> = (0..200).map(|i| ((i * 13 % 17) as f32 - 8.0) / 8.0).collect();

    let mut conv = Convolver::new(&[kernel_l.clone(), kernel_r.clone()], 8);
    let out = run(&mut conv, &input);

    for (channel, kernel) in [&kernel_l, &kernel_r].iter().enumerate() {
      let expected = direct(&input, kernel);
      for i in conv.latency()..input.len() {
        let want = expected[i - conv.latency()];
        assert!((out[channel][i] - want).abs() < 1e-3, "ch {channel} sample {i}");
      }
    }
  }

  #[test]
  fn empty_kernel_is_silent() {
    let mut conv = Convolver::new(&[Vec::new()], 4);
    let out = run(&mut conv, &[1.0; 16]).remove(0);
    assert!(out.iter().all(|s| s.abs() < 1e-6));
  }
}
