use crate::engine::Board;
use crate::error::GameError;
use crate::types::{Coord, Outcome, Player, RuleSetKind};

/// Line directions as (d_row, d_col): vertical, horizontal, both diagonals.
pub const DIRECTIONS: [(isize, isize); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

pub trait RuleSet {
  fn is_legal(&self, board: &Board, mv: Coord) -> bool;
  fn check_win(&self, board: &Board, mv: Coord) -> Option<Player>;

  fn outcome_after(&self, board: &Board, mv: Coord) -> Outcome {
    match self.check_win(board, mv) {
      Some(player) => Outcome::Win(player),
      None if board.is_full() => Outcome::Draw,
      None => Outcome::InProgress,
    }
  }
}

pub struct StandardRuleSet;

impl RuleSet for StandardRuleSet {
  fn is_legal(&self, board: &Board, mv: Coord) -> bool {
    board.in_bounds(mv.row, mv.col) && board.is_empty(mv.row, mv.col)
  }

  fn check_win(&self, board: &Board, mv: Coord) -> Option<Player> {
    check_win(board, mv.row, mv.col)
  }
}

pub fn rules_for(kind: RuleSetKind) -> Box<dyn RuleSet> {
  match kind {
    RuleSetKind::Standard => Box::new(StandardRuleSet),
  }
}

/// Did the mark at (row, col) complete a line? Only the lines through that
/// cell are scanned.
pub fn check_win(board: &Board, row: usize, col: usize) -> Option<Player> {
  let player = board.get(row, col)?;
  let found = DIRECTIONS
    .iter()
    .any(|&(dr, dc)| line_reaches(board, row, col, dr, dc, player));
  if found {
    Some(player)
  } else {
    None
  }
}

// Offsets -(K-1)..=(K-1) along one direction.
fn line_reaches(board: &Board, row: usize, col: usize, dr: isize, dc: isize, player: Player) -> bool {
  let k = board.win_length() as isize;
  let mut count = 0;
  for delta in -(k - 1)..k {
    let r = row as isize + delta * dr;
    let c = col as isize + delta * dc;
    if board.lookup(r, c) == Some(Some(player)) {
      count += 1;
      if count == k {
        return true;
      }
    } else {
      count = 0;
    }
  }
  false
}

pub fn has_won(board: &Board, player: Player) -> bool {
  let size = board.size();
  for idx in 0..board.cell_count() {
    if board.at(idx) != Some(player) {
      continue;
    }
    let (row, col) = (idx / size, idx % size);
    if DIRECTIONS
      .iter()
      .any(|&(dr, dc)| line_reaches(board, row, col, dr, dc, player))
    {
      return true;
    }
  }
  false
}

/// Marks the cell for `player` and reports the resulting outcome. On error
/// the board is unchanged.
pub fn apply_move(board: &mut Board, row: usize, col: usize, player: Player) -> Result<Outcome, GameError> {
  board.mark(row, col, player)?;
  Ok(StandardRuleSet.outcome_after(board, Coord::new(row, col)))
}

/// Would `player` win by playing the empty cell at `idx`? The board is
/// restored before returning.
pub fn wins_at(board: &mut Board, idx: usize, player: Player) -> bool {
  board.place(idx, player);
  let mv = board.coord(idx);
  let won = check_win(board, mv.row, mv.col).is_some();
  board.unplace(idx);
  won
}

#[cfg(test)]
mod tests {
  use super::*;

  fn board_with(size: usize, marks: &[(usize, usize, Player)]) -> Board {
    let mut board = Board::new(size).unwrap();
    for &(r, c, p) in marks {
      board.mark(r, c, p).unwrap();
    }
    board
  }

  #[test]
  fn detects_lines_in_every_direction() {
    // (start, step) for a line of five on 7x7
    let lines = [
      ((0, 3), (1, 0)),
      ((2, 0), (0, 1)),
      ((1, 1), (1, 1)),
      ((0, 6), (1, -1)),
    ];
    for ((r0, c0), (dr, dc)) in lines {
      let mut board = Board::new(7).unwrap();
      let cells: Vec<(usize, usize)> = (0..5)
        .map(|i| ((r0 as isize + i * dr) as usize, (c0 as isize + i * dc) as usize))
        .collect();
      for &(r, c) in &cells[..4] {
        board.mark(r, c, Player::O).unwrap();
        assert_eq!(check_win(&board, r, c), None, "four is not a win");
      }
      let (r, c) = cells[4];
      board.mark(r, c, Player::O).unwrap();
      assert_eq!(check_win(&board, r, c), Some(Player::O));
      // Any cell of the line reports the win, not just the last one.
      assert_eq!(check_win(&board, cells[2].0, cells[2].1), Some(Player::O));
      assert!(has_won(&board, Player::O));
      assert!(!has_won(&board, Player::X));
    }
  }

  #[test]
  fn three_wins_on_five_by_five() {
    let board = board_with(5, &[(4, 2, Player::X), (3, 3, Player::X), (2, 4, Player::X)]);
    assert_eq!(check_win(&board, 3, 3), Some(Player::X));
  }

  #[test]
  fn broken_line_does_not_win() {
    let board = board_with(
      5,
      &[(0, 0, Player::X), (0, 1, Player::X), (0, 2, Player::O), (0, 3, Player::X)],
    );
    assert_eq!(check_win(&board, 0, 1), None);
    assert_eq!(check_win(&board, 0, 3), None);
    assert!(!has_won(&board, Player::X));
  }

  #[test]
  fn empty_cell_has_no_winner() {
    let board = Board::new(5).unwrap();
    assert_eq!(check_win(&board, 2, 2), None);
  }

  #[test]
  fn full_board_without_line_is_draw() {
    // X X O O X
    // O O X X O
    // X X O O X
    // O O X X O
    // X X O O X   -- no three in a row anywhere
    let rows = ["XXOOX", "OOXXO", "XXOOX", "OOXXO", "XXOOX"];
    let mut board = Board::new(5).unwrap();
    let mut last = (0, 0);
    let mut outcome = Outcome::InProgress;
    for (r, line) in rows.iter().enumerate() {
      for (c, ch) in line.chars().enumerate() {
        let player = if ch == 'X' { Player::X } else { Player::O };
        outcome = apply_move(&mut board, r, c, player).unwrap();
        last = (r, c);
      }
    }
    assert!(board.is_full());
    assert_eq!(check_win(&board, last.0, last.1), None);
    assert_eq!(outcome, Outcome::Draw);
  }

  #[test]
  fn apply_move_reports_win_and_rejects_occupied() {
    let mut board = board_with(5, &[(2, 0, Player::O), (2, 1, Player::O)]);
    assert_eq!(apply_move(&mut board, 2, 2, Player::O), Ok(Outcome::Win(Player::O)));
    assert_eq!(
      apply_move(&mut board, 2, 2, Player::X),
      Err(GameError::InvalidMove { row: 2, col: 2 })
    );
    assert_eq!(board.marked_count(), 3);
  }

  #[test]
  fn wins_at_restores_board() {
    let mut board = board_with(5, &[(0, 0, Player::X), (0, 1, Player::X)]);
    let before = board.clone();
    let idx = board.index(0, 2);
    assert!(wins_at(&mut board, idx, Player::X));
    assert!(!wins_at(&mut board, idx, Player::O));
    assert_eq!(board, before);
  }

  #[test]
  fn standard_rules_legality() {
    let rules = rules_for(RuleSetKind::Standard);
    let board = board_with(5, &[(1, 1, Player::X)]);
    assert!(rules.is_legal(&board, Coord::new(0, 0)));
    assert!(!rules.is_legal(&board, Coord::new(1, 1)));
    assert!(!rules.is_legal(&board, Coord::new(0, 5)));
  }
}
