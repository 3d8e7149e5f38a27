use std::path::PathBuf;

/// Per-move failures. None of these are fatal; the board is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
  #[error("invalid move at ({row}, {col})")]
  InvalidMove { row: usize, col: usize },

  #[error("no legal move: the board is full")]
  NoLegalMove,

  #[error("unsupported board size {0} (expected 5..=19)")]
  UnsupportedSize(usize),

  #[error("the game is already finished")]
  GameOver,

  #[error("it is not a human turn")]
  NotYourTurn,
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("failed to read config file {path}: {source}")]
  Read {
    path: PathBuf,
    source: std::io::Error,
  },

  #[error("failed to write config file {path}: {source}")]
  Write {
    path: PathBuf,
    source: std::io::Error,
  },

  #[error("failed to parse config: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("config validation error: {0}")]
  Validation(String),
}
