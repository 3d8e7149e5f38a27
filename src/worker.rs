//! Runs searches off the caller's thread.
//!
//! The engine and a board snapshot are moved into a blocking task and handed
//! back through the task's `JoinHandle`, which is the only channel between
//! the host and the search. Nothing is shared, so nothing is locked.

use tokio::task::JoinHandle;

use crate::ai::SearchEngine;
use crate::engine::Board;
use crate::error::GameError;
use crate::types::{AiConfig, Coord, Player, SearchReport};

pub struct SearchOutcome {
  pub engine: SearchEngine,
  pub result: Result<SearchReport, GameError>,
}

/// Searches `board` for `player` on the blocking pool. The engine comes back
/// with the outcome so its RNG and cache carry over to the next move.
pub fn spawn_search(mut engine: SearchEngine, board: Board, player: Player) -> JoinHandle<SearchOutcome> {
  tokio::task::spawn_blocking(move || {
    let result = engine.analyze(&board, player);
    SearchOutcome { engine, result }
  })
}

/// One-shot request with a fresh seeded engine.
pub fn request_ai_move(board: &Board, ai_player: Player, config: AiConfig, seed: u64) -> JoinHandle<Result<Coord, GameError>> {
  let board = board.clone();
  tokio::task::spawn_blocking(move || {
    let mut engine = SearchEngine::with_seed(config, seed);
    engine.choose_move(&board, ai_player)
  })
}
