use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Player {
  X,
  O,
}

impl Player {
  pub fn other(self) -> Self {
    match self {
      Player::X => Player::O,
      Player::O => Player::X,
    }
  }

  pub fn symbol(self) -> char {
    match self {
      Player::X => 'X',
      Player::O => 'O',
    }
  }

  pub(crate) fn slot(self) -> usize {
    match self {
      Player::X => 0,
      Player::O => 1,
    }
  }
}

impl fmt::Display for Player {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.symbol())
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSetKind {
  Standard,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coord {
  pub row: usize,
  pub col: usize,
}

impl Coord {
  pub const fn new(row: usize, col: usize) -> Self {
    Self { row, col }
  }
}

impl fmt::Display for Coord {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({}, {})", self.row, self.col)
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "player", rename_all = "snake_case")]
pub enum Outcome {
  InProgress,
  Win(Player),
  Draw,
}

impl Outcome {
  pub fn is_over(self) -> bool {
    !matches!(self, Outcome::InProgress)
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
  HumanVsHuman,
  HumanVsAi,
}

impl Default for GameMode {
  fn default() -> Self {
    GameMode::HumanVsAi
  }
}

/// The AI always plays the second mark.
pub const AI_PLAYER: Player = Player::O;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiLevel {
  /// Uniformly random empty cell.
  Random,
  /// Full decision pipeline with alpha-beta search.
  Search,
}

impl Default for AiLevel {
  fn default() -> Self {
    AiLevel::Search
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiConfig {
  pub level: AiLevel,
  pub max_depth: u8,
  pub time_budget_ms: u64,
  pub max_candidates: usize,
  /// Chebyshev radius around occupied cells; `None` searches every empty cell.
  pub neighborhood_radius: Option<usize>,
  pub threat_step: bool,
  pub parallel: bool,
  pub tt_entries: usize,
  // Node cap per move on top of the time budget.
  pub max_nodes: Option<u64>,
}

impl Default for AiConfig {
  fn default() -> Self {
    Self {
      level: AiLevel::Search,
      max_depth: 10,
      time_budget_ms: 5_000,
      max_candidates: 20,
      neighborhood_radius: Some(2),
      threat_step: true,
      parallel: true,
      tt_entries: 1 << 16,
      max_nodes: None,
    }
  }
}

/// Which step of the decision pipeline produced a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decision {
  Random,
  OpeningBook,
  Center,
  ImmediateWin,
  ImmediateBlock,
  Threat,
  Search { depth: u8 },
  Fallback,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchReport {
  pub mv: Coord,
  pub decision: Decision,
  pub score: Option<i32>,
  pub nodes: u64,
  pub elapsed_ms: u64,
}
