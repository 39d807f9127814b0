use karaoke_audio::ReverbConfig;
use karaoke_player::PlayerConfig;
use karaoke_storage::StorageConfig;
use serde::{Deserialize, Serialize};

/// Every configuration section in one printable document.
#[derive(Debug, Serialize, Deserialize)]
pub struct SettingsDto {
  pub db_path: String,
  pub journal_mode: Option<String>,
  pub player: PlayerConfig,
  pub reverb: ReverbConfig,
}

impl From<(StorageConfig, PlayerConfig, ReverbConfig)> for SettingsDto {
  fn from((storage, player, reverb): (StorageConfig, PlayerConfig, ReverbConfig)) -> Self {
    SettingsDto {
      db_path: storage.db_path.to_string_lossy().to_string(),
      journal_mode: storage.journal_mode,
      player,
      reverb,
    }
  }
}
