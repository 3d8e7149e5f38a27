//! Static position scoring.

use crate::engine::Board;
use crate::rules::{has_won, DIRECTIONS};
use crate::types::Player;

pub const TERMINAL_BONUS: i32 = 10_000;

pub fn score(board: &Board, perspective: Player) -> i32 {
  let opponent = perspective.other();
  let mut total = 0;

  if has_won(board, perspective) {
    total += TERMINAL_BONUS;
  }
  if has_won(board, opponent) {
    total -= TERMINAL_BONUS;
  }

  for idx in 0..board.cell_count() {
    match board.at(idx) {
      Some(p) if p == perspective => total += positional(board, idx, p),
      Some(p) => total -= positional(board, idx, p),
      None => {}
    }
  }

  total
}

/// Sum over the four directions of `run^2` for the run through `idx`, up to
/// K-1 steps each way. A run closed at both ends by the edge or the opponent
/// scores nothing.
pub fn positional(board: &Board, idx: usize, player: Player) -> i32 {
  let origin = board.coord(idx);
  let reach = board.win_length() as isize - 1;
  let mut score = 0;

  for (dr, dc) in DIRECTIONS {
    let mut run = 1;
    let mut blocks = 0;
    for sign in [1isize, -1] {
      for step in 1..=reach {
        let r = origin.row as isize + sign * step * dr;
        let c = origin.col as isize + sign * step * dc;
        match board.lookup(r, c) {
          Some(Some(p)) if p == player => run += 1,
          Some(None) => break,
          _ => {
            blocks += 1;
            break;
          }
        }
      }
    }
    if blocks < 2 {
      score += run * run;
    }
  }

  score
}

pub fn move_potential(board: &mut Board, idx: usize, player: Player) -> i32 {
  board.place(idx, player);
  let gain = positional(board, idx, player);
  board.unplace(idx);
  gain
}
