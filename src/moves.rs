use std::cmp::Reverse;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::engine::Board;
use crate::eval::move_potential;
use crate::types::{Coord, Player};

pub fn candidates(board: &mut Board, radius: Option<usize>, limit: usize, rng: &mut StdRng) -> Vec<Coord> {
  ordered_candidates(board, radius, limit, rng)
    .into_iter()
    .map(|idx| board.coord(idx))
    .collect()
}

// Shuffle first so the stable sort breaks ties by seed.
pub fn ordered_candidates(board: &mut Board, radius: Option<usize>, limit: usize, rng: &mut StdRng) -> Vec<usize> {
  let mut cells = match radius {
    Some(r) if board.marked_count() > 0 => neighborhood(board, r),
    _ => (0..board.cell_count()).filter(|&i| board.at(i).is_none()).collect(),
  };

  cells.shuffle(rng);

  let mut scored: Vec<(i32, usize)> = cells
    .into_iter()
    .map(|idx| (ordering_score(board, idx), idx))
    .collect();
  scored.sort_by_key(|&(score, _)| Reverse(score));
  scored.truncate(limit.max(1));
  scored.into_iter().map(|(_, idx)| idx).collect()
}

fn neighborhood(board: &Board, radius: usize) -> Vec<usize> {
  let size = board.size();
  let mut near = vec![false; board.cell_count()];

  for idx in 0..board.cell_count() {
    if board.at(idx).is_none() {
      continue;
    }
    let (row, col) = (idx / size, idx % size);
    let rows = row.saturating_sub(radius)..=usize::min(row + radius, size - 1);
    for r in rows {
      let cols = col.saturating_sub(radius)..=usize::min(col + radius, size - 1);
      for c in cols {
        near[r * size + c] = true;
      }
    }
  }

  (0..board.cell_count())
    .filter(|&i| near[i] && board.at(i).is_none())
    .collect()
}

/// Centrality plus what either side would gain by taking the cell. Symmetric
/// in X and O.
pub fn ordering_score(board: &mut Board, idx: usize) -> i32 {
  let center = board.center();
  let at = board.coord(idx);
  let dist = at.row.abs_diff(center.row) + at.col.abs_diff(center.col);
  let centrality = board.size() as i32 - dist as i32;

  centrality + move_potential(board, idx, Player::X) + move_potential(board, idx, Player::O)
}

// Manhattan distance; ties go to the first cell in row-major order.
pub fn nearest_center(board: &Board) -> Option<Coord> {
  let center = board.center();
  board
    .empty_cells()
    .into_iter()
    .min_by_key(|c| c.row.abs_diff(center.row) + c.col.abs_diff(center.col))
}
