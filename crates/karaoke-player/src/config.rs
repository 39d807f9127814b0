use karaoke_config::{CONFIG_BACKEND, ConfigBackend, ConfigError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::boot::BootTiming;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlayerConfig {
  /// Reverb level a session starts with, 0 to 100.
  #[serde(default = "default_reverb")]
  pub default_reverb: f32,

  /// Instrumental volume a session starts with, 0 to 100.
  #[serde(default = "default_volume")]
  pub default_volume: f32,

  /// Start playing as soon as a file source is attached.
  #[serde(default = "default_autoplay")]
  pub autoplay: bool,

  /// Delay between two video launch messages.
  #[serde(default = "default_boot_cadence_ms")]
  pub boot_cadence_ms: u64,

  /// Extra delay after the last launch message.
  #[serde(default = "default_boot_settle_ms")]
  pub boot_settle_ms: u64,
}

fn default_reverb() -> f32 {
  30.0
}

fn default_volume() -> f32 {
  80.0
}

fn default_autoplay() -> bool {
  true
}

fn default_boot_cadence_ms() -> u64 {
  400
}

fn default_boot_settle_ms() -> u64 {
  800
}

impl Default for PlayerConfig {
  fn default() -> Self {
    PlayerConfig {
      default_reverb: default_reverb(),
      default_volume: default_volume(),
      autoplay: default_autoplay(),
      boot_cadence_ms: default_boot_cadence_ms(),
      boot_settle_ms: default_boot_settle_ms(),
    }
  }
}

impl PlayerConfig {
  pub fn load() -> Result<Self, ConfigError> {
    let cfg = CONFIG_BACKEND.load_section_with_default("player")?;
    CONFIG_BACKEND.save_section("player", &cfg)?;
    Ok(cfg)
  }

  pub fn save(&self) -> Result<(), ConfigError> {
    CONFIG_BACKEND.save_section("player", self)
  }

  pub fn boot_timing(&self) -> BootTiming {
    BootTiming {
      cadence: Duration::from_millis(self.boot_cadence_ms),
      settle: Duration::from_millis(self.boot_settle_ms),
    }
  }
}
