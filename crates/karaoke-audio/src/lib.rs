//! Vocal effects for the karaoke player.
//!
//! Signal flow of one session:
//!
//! ```text
//! microphone ──┬── dry (gain 1.0) ───────────────┬──> output
//!              └── convolver ── wet gain (smoothed) ┘
//! ```
//!
//! The convolution kernel is a synthetic impulse response generated once
//! per session. Only the wet gain changes afterwards.

pub mod capture;
pub mod config;
pub mod convolver;
pub mod cpal_host;
pub mod gain;
pub mod graph;
pub mod impulse;

pub use capture::{AudioHost, AudioHostError, CaptureError, InputStream, VocalChain};
pub use config::ReverbConfig;
pub use convolver::Convolver;
pub use cpal_host::CpalHost;
pub use gain::SmoothedGain;
pub use graph::{EffectsControls, EffectsGraph, wet_gain_for};
pub use impulse::ImpulseResponse;
