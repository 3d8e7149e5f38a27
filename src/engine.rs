use std::fmt;

use lazy_static::lazy_static;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::GameError;
use crate::rules::{rules_for, RuleSet};
use crate::types::{Coord, GameMode, Outcome, Player, RuleSetKind, AI_PLAYER};

pub const MIN_SIZE: usize = 5;
pub const MAX_SIZE: usize = 19;
const MAX_CELLS: usize = MAX_SIZE * MAX_SIZE;

// Zobrist keys for every (cell, player) pair of the largest supported board.
// Seeded so hashes are stable across runs.
lazy_static! {
  pub static ref ZOBRIST_TABLE: [[u64; 2]; MAX_CELLS] = {
    let mut table = [[0u64; 2]; MAX_CELLS];
    let mut rng = StdRng::seed_from_u64(0x00CA_50B0_A4D5);
    for entry in table.iter_mut() {
      entry[0] = rng.gen(); // X
      entry[1] = rng.gen(); // O
    }
    table
  };
}

/// Win length is fixed by the board size: three on 5x5, five everywhere else.
pub fn win_length_for(size: usize) -> usize {
  if size == 5 {
    3
  } else {
    5
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
  size: usize,
  win_length: usize,
  cells: Vec<Option<Player>>,
  marked: usize,
  hash: u64,
}

impl Board {
  pub fn new(size: usize) -> Result<Self, GameError> {
    if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
      return Err(GameError::UnsupportedSize(size));
    }
    Ok(Self {
      size,
      win_length: win_length_for(size),
      cells: vec![None; size * size],
      marked: 0,
      hash: 0,
    })
  }

  pub fn size(&self) -> usize {
    self.size
  }

  pub fn win_length(&self) -> usize {
    self.win_length
  }

  pub fn marked_count(&self) -> usize {
    self.marked
  }

  pub fn cell_count(&self) -> usize {
    self.cells.len()
  }

  pub fn in_bounds(&self, row: usize, col: usize) -> bool {
    row < self.size && col < self.size
  }

  pub fn index(&self, row: usize, col: usize) -> usize {
    row * self.size + col
  }

  pub fn coord(&self, idx: usize) -> Coord {
    Coord::new(idx / self.size, idx % self.size)
  }

  pub fn get(&self, row: usize, col: usize) -> Option<Player> {
    if !self.in_bounds(row, col) {
      return None;
    }
    self.cells[self.index(row, col)]
  }

  pub fn at(&self, idx: usize) -> Option<Player> {
    self.cells[idx]
  }

  /// Signed lookup for line scans: `None` when off the board.
  pub fn lookup(&self, row: isize, col: isize) -> Option<Option<Player>> {
    if row < 0 || col < 0 {
      return None;
    }
    let (r, c) = (row as usize, col as usize);
    if !self.in_bounds(r, c) {
      return None;
    }
    Some(self.cells[self.index(r, c)])
  }

  pub fn is_empty(&self, row: usize, col: usize) -> bool {
    self.in_bounds(row, col) && self.get(row, col).is_none()
  }

  pub fn is_full(&self) -> bool {
    self.marked == self.cells.len()
  }

  pub fn mark(&mut self, row: usize, col: usize, player: Player) -> Result<(), GameError> {
    if !self.is_empty(row, col) {
      return Err(GameError::InvalidMove { row, col });
    }
    let idx = self.index(row, col);
    self.place(idx, player);
    Ok(())
  }

  /// Apply half of the search's apply/undo pair. The cell must be empty.
  pub fn place(&mut self, idx: usize, player: Player) {
    debug_assert!(self.cells[idx].is_none(), "place on occupied cell {idx}");
    self.cells[idx] = Some(player);
    self.marked += 1;
    self.hash ^= ZOBRIST_TABLE[idx][player.slot()];
  }

  pub fn unplace(&mut self, idx: usize) {
    if let Some(player) = self.cells[idx].take() {
      self.marked -= 1;
      self.hash ^= ZOBRIST_TABLE[idx][player.slot()];
    }
  }

  pub fn hash(&self) -> u64 {
    self.hash
  }

  pub fn empty_cells(&self) -> Vec<Coord> {
    let mut coords = Vec::with_capacity(self.cells.len() - self.marked);
    for (idx, cell) in self.cells.iter().enumerate() {
      if cell.is_none() {
        coords.push(self.coord(idx));
      }
    }
    coords
  }

  pub fn occupied_cells(&self) -> Vec<(Coord, Player)> {
    self
      .cells
      .iter()
      .enumerate()
      .filter_map(|(idx, cell)| cell.map(|p| (self.coord(idx), p)))
      .collect()
  }

  pub fn cells(&self) -> &[Option<Player>] {
    &self.cells
  }

  pub fn center(&self) -> Coord {
    Coord::new(self.size / 2, self.size / 2)
  }
}

impl fmt::Display for Board {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "   ")?;
    for col in 0..self.size {
      write!(f, "{:>3}", col)?;
    }
    writeln!(f)?;
    for row in 0..self.size {
      write!(f, "{:>3}", row)?;
      for col in 0..self.size {
        let ch = self.get(row, col).map(Player::symbol).unwrap_or('.');
        write!(f, "{:>3}", ch)?;
      }
      writeln!(f)?;
    }
    Ok(())
  }
}

/// One interactive match: turn order, mode and the outcome of the last move.
#[derive(Clone, Debug)]
pub struct GameState {
  pub board: Board,
  pub rule_set: RuleSetKind,
  pub to_move: Player,
  pub moves: Vec<Coord>,
  pub outcome: Outcome,
  pub mode: GameMode,
}

impl GameState {
  pub fn new(board_size: usize, mode: GameMode) -> Result<Self, GameError> {
    Ok(Self {
      board: Board::new(board_size)?,
      rule_set: RuleSetKind::Standard,
      to_move: Player::X,
      moves: Vec::new(),
      outcome: Outcome::InProgress,
      mode,
    })
  }

  pub fn can_human_move(&self) -> bool {
    if self.outcome.is_over() {
      return false;
    }
    match self.mode {
      GameMode::HumanVsAi => self.to_move != AI_PLAYER,
      GameMode::HumanVsHuman => true,
    }
  }

  pub fn is_ai_turn(&self) -> bool {
    !self.outcome.is_over() && self.mode == GameMode::HumanVsAi && self.to_move == AI_PLAYER
  }

  pub fn last_move(&self) -> Option<Coord> {
    self.moves.last().copied()
  }

  pub fn apply_human_move(&mut self, row: usize, col: usize) -> Result<Outcome, GameError> {
    if self.outcome.is_over() {
      return Err(GameError::GameOver);
    }
    if !self.can_human_move() {
      return Err(GameError::NotYourTurn);
    }
    self.apply_move(row, col)
  }

  /// Plays `to_move` at (row, col) and advances the turn unless the game ended.
  pub fn apply_move(&mut self, row: usize, col: usize) -> Result<Outcome, GameError> {
    if self.outcome.is_over() {
      return Err(GameError::GameOver);
    }

    let rules = rules_for(self.rule_set);
    let mv = Coord::new(row, col);
    if !rules.is_legal(&self.board, mv) {
      return Err(GameError::InvalidMove { row, col });
    }

    self.board.mark(row, col, self.to_move)?;
    self.moves.push(mv);
    self.outcome = rules.outcome_after(&self.board, mv);

    if !self.outcome.is_over() {
      self.to_move = self.to_move.other();
    }
    Ok(self.outcome)
  }

  /// Back to an empty board of the same size and mode.
  pub fn reset(&mut self) {
    let size = self.board.size();
    // Size was validated when the game was created.
    if let Ok(board) = Board::new(size) {
      self.board = board;
    }
    self.to_move = Player::X;
    self.moves.clear();
    self.outcome = Outcome::InProgress;
  }
}
