use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{AiConfig, GameMode};

/// Board sizes offered to players. The core itself accepts 5..=19.
pub const SUPPORTED_SIZES: [usize; 4] = [5, 7, 11, 15];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
  pub board_size: usize,
  pub mode: GameMode,
  pub ai: AiConfig,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      board_size: 5,
      mode: GameMode::HumanVsAi,
      ai: AiConfig::default(),
    }
  }
}

impl AppConfig {
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let config: AppConfig = serde_json::from_str(&data)?;
    config.validate()?;
    Ok(config)
  }

  /// Like `load`, but a missing file means defaults.
  pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
    if path.exists() {
      Self::load(path)
    } else {
      tracing::warn!("config file '{}' not found, using defaults", path.display());
      Ok(Self::default())
    }
  }

  pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
    let data = serde_json::to_string_pretty(self)?;
    fs::write(path, data).map_err(|source| ConfigError::Write {
      path: path.to_path_buf(),
      source,
    })
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if !SUPPORTED_SIZES.contains(&self.board_size) {
      return Err(ConfigError::Validation(format!(
        "boardSize must be one of {:?}, got {}",
        SUPPORTED_SIZES, self.board_size
      )));
    }
    if self.ai.max_depth == 0 {
      return Err(ConfigError::Validation("ai.maxDepth must be > 0".into()));
    }
    if self.ai.time_budget_ms == 0 {
      return Err(ConfigError::Validation("ai.timeBudgetMs must be > 0".into()));
    }
    if self.ai.max_nodes == Some(0) {
      return Err(ConfigError::Validation("ai.maxNodes must be > 0".into()));
    }
    if self.ai.max_candidates == 0 {
      return Err(ConfigError::Validation("ai.maxCandidates must be > 0".into()));
    }
    if self.ai.tt_entries == 0 {
      return Err(ConfigError::Validation("ai.ttEntries must be > 0".into()));
    }
    Ok(())
  }
}
