use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::book::opening_cells;
use crate::engine::Board;
use crate::error::GameError;
use crate::eval::{self, TERMINAL_BONUS};
use crate::moves::{nearest_center, ordered_candidates, ordering_score};
use crate::rules::{check_win, wins_at, DIRECTIONS};
use crate::tt::TranspositionTable;
use crate::types::{AiConfig, AiLevel, Coord, Decision, Player, SearchReport};

pub const INF: i32 = 100_000;
// Forced win; stops deepening.
pub const WIN_THRESHOLD: i32 = TERMINAL_BONUS / 2;

const CLOCK_CHECK_INTERVAL: u64 = 256;

/// Wall-clock budget shared by every thread of one search, with an optional
/// cap on visited nodes.
pub struct SearchClock {
  start: Instant,
  budget: Duration,
  node_limit: u64,
  nodes: AtomicU64,
  expired: AtomicBool,
}

impl SearchClock {
  pub fn new(budget: Duration) -> Self {
    Self::with_node_limit(budget, None)
  }

  pub fn with_node_limit(budget: Duration, max_nodes: Option<u64>) -> Self {
    Self {
      start: Instant::now(),
      budget,
      node_limit: max_nodes.unwrap_or(u64::MAX),
      nodes: AtomicU64::new(0),
      expired: AtomicBool::new(false),
    }
  }

  // Reads the wall clock only every CLOCK_CHECK_INTERVAL nodes.
  fn tick(&self) -> bool {
    let n = self.nodes.fetch_add(1, Ordering::Relaxed);
    if self.expired.load(Ordering::Relaxed) {
      return true;
    }
    if n >= self.node_limit || (n % CLOCK_CHECK_INTERVAL == 0 && self.start.elapsed() >= self.budget) {
      self.expired.store(true, Ordering::Relaxed);
      return true;
    }
    false
  }

  pub fn expired(&self) -> bool {
    if self.expired.load(Ordering::Relaxed) {
      return true;
    }
    if self.nodes() >= self.node_limit || self.start.elapsed() >= self.budget {
      self.expired.store(true, Ordering::Relaxed);
      return true;
    }
    false
  }

  pub fn nodes(&self) -> u64 {
    self.nodes.load(Ordering::Relaxed)
  }

  pub fn elapsed(&self) -> Duration {
    self.start.elapsed()
  }
}

struct SearchContext<'a> {
  me: Player,
  opponent: Player,
  radius: Option<usize>,
  max_candidates: usize,
  clock: &'a SearchClock,
  tt: &'a mut TranspositionTable,
  rng: &'a mut StdRng,
}

pub struct SearchEngine {
  config: AiConfig,
  rng: StdRng,
  tt: TranspositionTable,
}

impl SearchEngine {
  pub fn new(config: AiConfig) -> Self {
    Self::from_rng(config, StdRng::from_entropy())
  }

  pub fn with_seed(config: AiConfig, seed: u64) -> Self {
    Self::from_rng(config, StdRng::seed_from_u64(seed))
  }

  fn from_rng(config: AiConfig, rng: StdRng) -> Self {
    Self {
      tt: TranspositionTable::new(config.tt_entries),
      config,
      rng,
    }
  }

  pub fn config(&self) -> &AiConfig {
    &self.config
  }

  pub fn choose_move(&mut self, board: &Board, player: Player) -> Result<Coord, GameError> {
    self.analyze(board, player).map(|report| report.mv)
  }

  /// Runs the decision pipeline for `player` and reports which step decided.
  pub fn analyze(&mut self, board: &Board, player: Player) -> Result<SearchReport, GameError> {
    if board.is_full() {
      return Err(GameError::NoLegalMove);
    }
    let clock = SearchClock::with_node_limit(Duration::from_millis(self.config.time_budget_ms), self.config.max_nodes);

    let (mv, decision, score) = self.decide(board, player, &clock);
    let report = SearchReport {
      mv,
      decision,
      score,
      nodes: clock.nodes(),
      elapsed_ms: clock.elapsed().as_millis() as u64,
    };
    debug!(
      player = %player,
      mv = %report.mv,
      decision = ?report.decision,
      score = ?report.score,
      nodes = report.nodes,
      elapsed_ms = report.elapsed_ms,
      "move chosen"
    );
    Ok(report)
  }

  fn decide(&mut self, board: &Board, player: Player, clock: &SearchClock) -> (Coord, Decision, Option<i32>) {
    if self.config.level == AiLevel::Random {
      return (self.random_empty(board), Decision::Random, None);
    }

    if let Some(mv) = self.book_move(board) {
      return (mv, Decision::OpeningBook, None);
    }

    // Nobody can threaten a win yet, so just take the middle.
    if opening_cells(board.size()).is_none() && board.marked_count() + 2 <= board.win_length() {
      if let Some(mv) = nearest_center(board) {
        return (mv, Decision::Center, None);
      }
    }

    let mut work = board.clone();
    if let Some(mv) = first_winning_cell(&mut work, player) {
      return (mv, Decision::ImmediateWin, None);
    }
    if let Some(mv) = first_winning_cell(&mut work, player.other()) {
      return (mv, Decision::ImmediateBlock, None);
    }

    if self.config.threat_step {
      let threat = open_threat_move(&mut work, player).or_else(|| open_threat_move(&mut work, player.other()));
      if let Some(mv) = threat {
        return (mv, Decision::Threat, None);
      }
    }

    match self.iterative_deepening(board, player, clock) {
      Some((score, mv, depth)) => (mv, Decision::Search { depth }, Some(score)),
      None => {
        let mv = self.random_empty(board);
        warn!(mv = %mv, "search budget ran out before depth 1, playing a random cell");
        (mv, Decision::Fallback, None)
      }
    }
  }

  fn book_move(&mut self, board: &Board) -> Option<Coord> {
    if board.marked_count() >= 2 {
      return None;
    }
    let open: Vec<Coord> = opening_cells(board.size())?
      .iter()
      .copied()
      .filter(|c| board.is_empty(c.row, c.col))
      .collect();
    open.choose(&mut self.rng).copied()
  }

  fn random_empty(&mut self, board: &Board) -> Coord {
    let empty = board.empty_cells();
    // Callers have already rejected full boards.
    empty.choose(&mut self.rng).copied().unwrap_or_else(|| board.center())
  }

  /// Deepens one ply at a time until the budget runs out. Only depths that
  /// finished every root candidate count; an interrupted depth is dropped.
  fn iterative_deepening(&mut self, board: &Board, player: Player, clock: &SearchClock) -> Option<(i32, Coord, u8)> {
    let empties = board.cell_count() - board.marked_count();
    let max_depth = usize::min(self.config.max_depth.max(1) as usize, empties) as u8;
    let mut best: Option<(i32, Coord, u8)> = None;

    for depth in 1..=max_depth {
      if clock.expired() {
        break;
      }
      let result = if self.config.parallel {
        self.search_root_parallel(board, player, depth, clock)
      } else {
        self.search_root(board, player, depth, clock)
      };

      match result {
        Some((score, mv)) => {
          debug!(depth, score, mv = %mv, nodes = clock.nodes(), "depth complete");
          best = Some((score, mv, depth));
          if score >= WIN_THRESHOLD {
            break;
          }
        }
        None => {
          debug!(depth, "depth interrupted, keeping previous result");
          break;
        }
      }
    }

    trace!(
      entries = self.tt.len(),
      hits = self.tt.hits(),
      misses = self.tt.misses(),
      "evaluation cache"
    );
    best
  }

  fn search_root(&mut self, board: &Board, player: Player, depth: u8, clock: &SearchClock) -> Option<(i32, Coord)> {
    let mut work = board.clone();
    let mut ctx = SearchContext {
      me: player,
      opponent: player.other(),
      radius: self.config.neighborhood_radius,
      max_candidates: self.config.max_candidates,
      clock,
      tt: &mut self.tt,
      rng: &mut self.rng,
    };
    let (score, mv) = minimax(&mut work, depth, -INF, INF, true, &mut ctx)?;
    mv.map(|mv| (score, mv))
  }

  // Each root move gets its own board, cache and RNG; only the clock is
  // shared. Results fold in candidate order.
  fn search_root_parallel(
    &mut self,
    board: &Board,
    player: Player,
    depth: u8,
    clock: &SearchClock,
  ) -> Option<(i32, Coord)> {
    let mut work = board.clone();
    let roots = ordered_candidates(
      &mut work,
      self.config.neighborhood_radius,
      self.config.max_candidates,
      &mut self.rng,
    );
    let jobs: Vec<(usize, u64)> = roots.into_iter().map(|idx| (idx, self.rng.gen())).collect();
    let config = self.config;

    let scored: Vec<Option<(i32, usize)>> = jobs
      .par_iter()
      .map(|&(idx, seed)| {
        let mut local_board = board.clone();
        let mut local_tt = TranspositionTable::new(config.tt_entries);
        let mut local_rng = StdRng::seed_from_u64(seed);
        let mut ctx = SearchContext {
          me: player,
          opponent: player.other(),
          radius: config.neighborhood_radius,
          max_candidates: config.max_candidates,
          clock,
          tt: &mut local_tt,
          rng: &mut local_rng,
        };
        let score = play_and_score(&mut local_board, idx, depth, -INF, INF, true, &mut ctx)?;
        Some((score, idx))
      })
      .collect();

    let mut best: Option<(i32, usize)> = None;
    for entry in scored {
      let (score, idx) = entry?;
      if best.map_or(true, |(b, _)| score > b) {
        best = Some((score, idx));
      }
    }
    best.map(|(score, idx)| (score, board.coord(idx)))
  }
}

/// Minimax with alpha-beta over an apply/undo board. `maximizing` means
/// `ctx.me` is to act. Returns `None` once the clock has expired; partial
/// results are never returned.
fn minimax(
  board: &mut Board,
  depth: u8,
  mut alpha: i32,
  mut beta: i32,
  maximizing: bool,
  ctx: &mut SearchContext,
) -> Option<(i32, Option<Coord>)> {
  if ctx.clock.tick() {
    return None;
  }
  if depth == 0 || board.is_full() {
    return Some((evaluate_cached(board, ctx), None));
  }

  let moves = ordered_candidates(board, ctx.radius, ctx.max_candidates, ctx.rng);
  if moves.is_empty() {
    return Some((evaluate_cached(board, ctx), None));
  }

  let mut best_value = if maximizing { -INF } else { INF };
  let mut best_move = None;

  for idx in moves {
    let value = play_and_score(board, idx, depth, alpha, beta, maximizing, ctx)?;

    if maximizing {
      if value > best_value {
        best_value = value;
        best_move = Some(board.coord(idx));
      }
      alpha = alpha.max(value);
    } else {
      if value < best_value {
        best_value = value;
        best_move = Some(board.coord(idx));
      }
      beta = beta.min(value);
    }
    if beta <= alpha {
      break;
    }
  }

  Some((best_value, best_move))
}

fn play_and_score(
  board: &mut Board,
  idx: usize,
  depth: u8,
  alpha: i32,
  beta: i32,
  maximizing: bool,
  ctx: &mut SearchContext,
) -> Option<i32> {
  let side = if maximizing { ctx.me } else { ctx.opponent };
  board.place(idx, side);
  let mv = board.coord(idx);

  let value = if check_win(board, mv.row, mv.col).is_some() {
    // Terminal: prefer wins found with more depth left (i.e. sooner).
    let bonus = if maximizing { depth as i32 } else { -(depth as i32) };
    Some(evaluate_cached(board, ctx) + bonus)
  } else {
    minimax(board, depth - 1, alpha, beta, !maximizing, ctx).map(|(v, _)| v)
  };

  board.unplace(idx);
  value
}

fn evaluate_cached(board: &Board, ctx: &mut SearchContext) -> i32 {
  let key = TranspositionTable::key(board.hash(), board.size(), ctx.me);
  if let Some(score) = ctx.tt.probe(key) {
    return score;
  }
  let score = eval::score(board, ctx.me);
  ctx.tt.store(key, score);
  score
}

// First empty cell in row-major order.
fn first_winning_cell(board: &mut Board, player: Player) -> Option<Coord> {
  (0..board.cell_count())
    .find(|&idx| board.at(idx).is_none() && wins_at(board, idx, player))
    .map(|idx| board.coord(idx))
}

/// Flanking cells of every run of exactly K-2 marks of `player` that has an
/// empty cell on both ends. Only meaningful when K-2 >= 2.
pub fn open_threat_flanks(board: &Board, player: Player) -> Vec<usize> {
  let k = board.win_length();
  if k < 4 {
    return Vec::new();
  }
  let target = k - 2;
  let size = board.size();
  let mut flanks = Vec::new();

  for (at, owner) in board.occupied_cells() {
    if owner != player {
      continue;
    }
    let (row, col) = (at.row as isize, at.col as isize);
    for (dr, dc) in DIRECTIONS {
      // Only start counting at the first mark of a run.
      let before = board.lookup(row - dr, col - dc);
      if before == Some(Some(player)) {
        continue;
      }
      let mut len = 1;
      while board.lookup(row + len as isize * dr, col + len as isize * dc) == Some(Some(player)) {
        len += 1;
      }
      if len != target {
        continue;
      }
      let after_r = row + len as isize * dr;
      let after_c = col + len as isize * dc;
      if before == Some(None) && board.lookup(after_r, after_c) == Some(None) {
        flanks.push(((row - dr) as usize) * size + (col - dc) as usize);
        flanks.push((after_r as usize) * size + after_c as usize);
      }
    }
  }

  flanks
}

fn open_threat_move(board: &mut Board, player: Player) -> Option<Coord> {
  let flanks = open_threat_flanks(board, player);
  let mut best: Option<(i32, usize)> = None;
  for idx in flanks {
    let score = ordering_score(board, idx);
    if best.map_or(true, |(b, _)| score > b) {
      best = Some((score, idx));
    }
  }
  best.map(|(_, idx)| board.coord(idx))
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

  fn quick_config() -> AiConfig {
    AiConfig {
      max_depth: 3,
      time_budget_ms: 60_000,
      max_candidates: 12,
      parallel: false,
      tt_entries: 1 << 12,
      ..AiConfig::default()
    }
  }

  fn plain_minimax(board: &mut Board, depth: u8, maximizing: bool, ctx: &mut SearchContext) -> i32 {
    if depth == 0 || board.is_full() {
      return eval::score(board, ctx.me);
    }
    let moves = ordered_candidates(board, ctx.radius, ctx.max_candidates, ctx.rng);
    let side = if maximizing { ctx.me } else { ctx.opponent };
    let mut best = if maximizing { -INF } else { INF };
    for idx in moves {
      board.place(idx, side);
      let mv = board.coord(idx);
      let value = if check_win(board, mv.row, mv.col).is_some() {
        let bonus = if maximizing { depth as i32 } else { -(depth as i32) };
        eval::score(board, ctx.me) + bonus
      } else {
        plain_minimax(board, depth - 1, !maximizing, ctx)
      };
      board.unplace(idx);
      best = if maximizing { best.max(value) } else { best.min(value) };
    }
    best
  }

  fn alpha_beta_value(board: &Board, player: Player, depth: u8, seed: u64) -> i32 {
    let clock = SearchClock::new(Duration::from_secs(600));
    let mut tt = TranspositionTable::new(1 << 12);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut ctx = SearchContext {
      me: player,
      opponent: player.other(),
      radius: Some(1),
      max_candidates: usize::MAX,
      clock: &clock,
      tt: &mut tt,
      rng: &mut rng,
    };
    let mut work = board.clone();
    minimax(&mut work, depth, -INF, INF, true, &mut ctx).unwrap().0
  }

  fn plain_value(board: &Board, player: Player, depth: u8, seed: u64) -> i32 {
    let clock = SearchClock::new(Duration::from_secs(600));
    let mut tt = TranspositionTable::new(16);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut ctx = SearchContext {
      me: player,
      opponent: player.other(),
      radius: Some(1),
      max_candidates: usize::MAX,
      clock: &clock,
      tt: &mut tt,
      rng: &mut rng,
    };
    let mut work = board.clone();
    plain_minimax(&mut work, depth, true, &mut ctx)
  }

  #[test]
  fn alpha_beta_matches_plain_minimax() {
    let positions = [
      board_with(5, &[(2, 2, Player::X), (1, 1, Player::O), (2, 3, Player::X)]),
      board_with(5, &[(0, 0, Player::O), (4, 4, Player::X), (2, 2, Player::O), (1, 3, Player::X)]),
      board_with(7, &[(3, 3, Player::X), (3, 4, Player::O), (4, 4, Player::X), (2, 2, Player::O)]),
    ];
    for board in &positions {
      for depth in 1..=3 {
        for player in [Player::X, Player::O] {
          assert_eq!(
            alpha_beta_value(board, player, depth, 11),
            plain_value(board, player, depth, 99),
            "depth {depth} player {player}"
          );
        }
      }
    }
  }

  #[test]
  fn takes_immediate_win_on_five_by_five() {
    let board = board_with(5, &[(0, 0, Player::X), (0, 1, Player::X), (4, 4, Player::O), (3, 0, Player::O)]);
    let mut engine = SearchEngine::with_seed(quick_config(), 1);
    let report = engine.analyze(&board, Player::X).unwrap();
    assert_eq!(report.mv, Coord::new(0, 2));
    assert_eq!(report.decision, Decision::ImmediateWin);
  }

  #[test]
  fn two_marks_on_a_row_complete_to_three() {
    let board = board_with(5, &[(0, 0, Player::X), (0, 1, Player::X)]);
    let mut engine = SearchEngine::with_seed(quick_config(), 3);
    assert_eq!(engine.choose_move(&board, Player::X), Ok(Coord::new(0, 2)));
  }

  #[test]
  fn blocks_single_opponent_threat() {
    let board = board_with(
      7,
      &[
        (3, 1, Player::X),
        (3, 2, Player::X),
        (3, 3, Player::X),
        (3, 4, Player::X),
        (3, 0, Player::O),
        (0, 0, Player::O),
        (6, 6, Player::O),
      ],
    );
    let mut engine = SearchEngine::with_seed(quick_config(), 5);
    let report = engine.analyze(&board, Player::O).unwrap();
    assert_eq!(report.mv, Coord::new(3, 5));
    assert_eq!(report.decision, Decision::ImmediateBlock);
  }

  #[test]
  fn own_win_beats_block() {
    let board = board_with(
      5,
      &[(0, 0, Player::X), (0, 1, Player::X), (4, 0, Player::O), (4, 1, Player::O)],
    );
    let mut engine = SearchEngine::with_seed(quick_config(), 5);
    assert_eq!(engine.choose_move(&board, Player::O), Ok(Coord::new(4, 2)));
  }

  #[test]
  fn opening_book_never_picks_a_corner() {
    let board = Board::new(5).unwrap();
    let book = opening_cells(5).unwrap();
    for seed in 0..32 {
      let mut engine = SearchEngine::with_seed(quick_config(), seed);
      let report = engine.analyze(&board, Player::O).unwrap();
      assert_eq!(report.decision, Decision::OpeningBook);
      assert!(book.contains(&report.mv));
      let corner = (report.mv.row == 0 || report.mv.row == 4) && (report.mv.col == 0 || report.mv.col == 4);
      assert!(!corner);
    }
  }

  #[test]
  fn opening_book_skips_occupied_cells() {
    let board = board_with(5, &[(2, 2, Player::X)]);
    for seed in 0..16 {
      let mut engine = SearchEngine::with_seed(quick_config(), seed);
      let mv = engine.choose_move(&board, Player::O).unwrap();
      assert_ne!(mv, Coord::new(2, 2));
    }
  }

  #[test]
  fn large_board_opens_in_the_center() {
    let board = Board::new(11).unwrap();
    let mut engine = SearchEngine::with_seed(quick_config(), 0);
    let report = engine.analyze(&board, Player::X).unwrap();
    assert_eq!(report.mv, Coord::new(5, 5));
    assert_eq!(report.decision, Decision::Center);
  }

  #[test]
  fn full_board_is_no_legal_move() {
    let rows = ["XXOOX", "OOXXO", "XXOOX", "OOXXO", "XXOOX"];
    let mut board = Board::new(5).unwrap();
    for (r, line) in rows.iter().enumerate() {
      for (c, ch) in line.chars().enumerate() {
        let p = if ch == 'X' { Player::X } else { Player::O };
        board.mark(r, c, p).unwrap();
      }
    }
    let mut engine = SearchEngine::with_seed(quick_config(), 0);
    assert_eq!(engine.choose_move(&board, Player::O), Err(GameError::NoLegalMove));
  }

  #[test]
  fn zero_budget_falls_back_to_a_legal_cell() {
    let board = board_with(5, &[(2, 2, Player::X), (1, 1, Player::O), (0, 1, Player::X)]);
    let config = AiConfig {
      time_budget_ms: 0,
      threat_step: false,
      ..quick_config()
    };
    let mut engine = SearchEngine::with_seed(config, 9);
    let report = engine.analyze(&board, Player::O).unwrap();
    assert_eq!(report.decision, Decision::Fallback);
    assert!(board.is_empty(report.mv.row, report.mv.col));
  }

  #[test]
  fn search_reports_completed_depth() {
    let board = board_with(5, &[(2, 2, Player::X), (1, 1, Player::O), (0, 1, Player::X)]);
    let mut engine = SearchEngine::with_seed(quick_config(), 2);
    let report = engine.analyze(&board, Player::O).unwrap();
    assert_eq!(report.decision, Decision::Search { depth: 3 });
    assert!(report.score.is_some());
    assert!(board.is_empty(report.mv.row, report.mv.col));
  }

  #[test]
  fn seeded_engines_agree() {
    let board = board_with(7, &[(3, 3, Player::X), (2, 4, Player::O), (4, 2, Player::X)]);
    let a = SearchEngine::with_seed(quick_config(), 77).choose_move(&board, Player::O);
    let b = SearchEngine::with_seed(quick_config(), 77).choose_move(&board, Player::O);
    assert_eq!(a, b);
  }

  #[test]
  fn parallel_root_matches_sequential_value() {
    let board = board_with(7, &[(3, 3, Player::X), (2, 4, Player::O), (4, 2, Player::X), (2, 2, Player::O)]);
    let config = AiConfig {
      max_candidates: usize::MAX,
      neighborhood_radius: Some(1),
      ..quick_config()
    };
    let clock = SearchClock::new(Duration::from_secs(600));
    let mut seq = SearchEngine::with_seed(config, 4);
    let mut par = SearchEngine::with_seed(AiConfig { parallel: true, ..config }, 4);
    let (seq_score, seq_mv) = seq.search_root(&board, Player::O, 2, &clock).unwrap();
    let (par_score, par_mv) = par.search_root_parallel(&board, Player::O, 2, &clock).unwrap();
    assert_eq!(seq_score, par_score);
    assert!(board.is_empty(seq_mv.row, seq_mv.col));
    assert!(board.is_empty(par_mv.row, par_mv.col));
  }

  #[test]
  fn open_three_flanks_are_found() {
    let board = board_with(7, &[(3, 2, Player::X), (3, 3, Player::X), (3, 4, Player::X)]);
    let mut flanks: Vec<Coord> = open_threat_flanks(&board, Player::X)
      .into_iter()
      .map(|i| board.coord(i))
      .collect();
    flanks.sort();
    assert_eq!(flanks, vec![Coord::new(3, 1), Coord::new(3, 5)]);
    assert!(open_threat_flanks(&board, Player::O).is_empty());
  }

  #[test]
  fn capped_three_is_not_a_threat() {
    let board = board_with(
      7,
      &[(3, 1, Player::O), (3, 2, Player::X), (3, 3, Player::X), (3, 4, Player::X)],
    );
    assert!(open_threat_flanks(&board, Player::X).is_empty());
  }

  #[test]
  fn threat_step_blocks_open_three() {
    let board = board_with(
      7,
      &[(3, 2, Player::X), (3, 3, Player::X), (3, 4, Player::X), (0, 0, Player::O), (6, 0, Player::O)],
    );
    let mut engine = SearchEngine::with_seed(quick_config(), 8);
    let report = engine.analyze(&board, Player::O).unwrap();
    assert_eq!(report.decision, Decision::Threat);
    assert!(report.mv == Coord::new(3, 1) || report.mv == Coord::new(3, 5));
  }

  #[test]
  fn no_threat_step_on_five_by_five() {
    let board = board_with(5, &[(2, 2, Player::X)]);
    assert!(open_threat_flanks(&board, Player::X).is_empty());
  }

  #[test]
  fn random_level_plays_an_empty_cell() {
    let board = board_with(5, &[(0, 0, Player::X), (0, 1, Player::X)]);
    let config = AiConfig {
      level: AiLevel::Random,
      ..quick_config()
    };
    let mut engine = SearchEngine::with_seed(config, 21);
    let report = engine.analyze(&board, Player::O).unwrap();
    assert_eq!(report.decision, Decision::Random);
    assert!(board.is_empty(report.mv.row, report.mv.col));
  }

  #[test]
  fn interrupted_depth_keeps_last_completed_move() {
    let board = board_with(5, &[(2, 2, Player::X), (1, 1, Player::O), (0, 1, Player::X)]);
    let shallow = AiConfig {
      max_depth: 1,
      ..quick_config()
    };
    let first = SearchEngine::with_seed(shallow, 6).analyze(&board, Player::O).unwrap();
    assert_eq!(first.decision, Decision::Search { depth: 1 });

    // Enough nodes for all of depth 1 and the root of depth 2.
    let capped = AiConfig {
      max_depth: 4,
      max_nodes: Some(first.nodes + 1),
      ..quick_config()
    };
    let report = SearchEngine::with_seed(capped, 6).analyze(&board, Player::O).unwrap();
    assert_eq!(report.decision, Decision::Search { depth: 1 });
    assert_eq!(report.mv, first.mv);
    assert_eq!(report.score, first.score);
    assert!(report.nodes > first.nodes);
  }

  #[test]
  fn node_limit_expires_clock() {
    let clock = SearchClock::with_node_limit(Duration::from_secs(600), Some(2));
    assert!(!clock.tick());
    assert!(!clock.tick());
    assert!(clock.tick());
    assert!(clock.expired());
  }

  #[test]
  fn cached_scores_stay_with_their_board_size() {
    let row = [(0, 0, Player::X), (0, 1, Player::X), (0, 2, Player::X)];
    let small = board_with(5, &row);
    let large = board_with(7, &row);
    assert_eq!(small.hash(), large.hash());

    let clock = SearchClock::new(Duration::from_secs(600));
    let mut tt = TranspositionTable::new(1 << 12);
    let mut rng = StdRng::seed_from_u64(0);
    let mut ctx = SearchContext {
      me: Player::O,
      opponent: Player::X,
      radius: Some(2),
      max_candidates: 20,
      clock: &clock,
      tt: &mut tt,
      rng: &mut rng,
    };
    assert_eq!(evaluate_cached(&small, &mut ctx), eval::score(&small, Player::O));
    assert_eq!(evaluate_cached(&large, &mut ctx), eval::score(&large, Player::O));
    assert!(eval::score(&large, Player::O) > -TERMINAL_BONUS / 2);
  }

  #[test]
  fn threat_step_extends_own_open_three_first() {
    let board = board_with(
      7,
      &[
        (1, 2, Player::X),
        (1, 3, Player::X),
        (1, 4, Player::X),
        (5, 2, Player::O),
        (5, 3, Player::O),
        (5, 4, Player::O),
      ],
    );
    let mut engine = SearchEngine::with_seed(quick_config(), 12);
    let report = engine.analyze(&board, Player::O).unwrap();
    assert_eq!(report.decision, Decision::Threat);
    assert!(report.mv == Coord::new(5, 1) || report.mv == Coord::new(5, 5));

    let report = engine.analyze(&board, Player::X).unwrap();
    assert_eq!(report.decision, Decision::Threat);
    assert!(report.mv == Coord::new(1, 1) || report.mv == Coord::new(1, 5));
  }
}
