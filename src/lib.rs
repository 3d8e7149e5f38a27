//! Caro - connect-K engine and AI
//!
//! This crate provides the core of a Caro (Gomoku / tic-tac-toe variant) game:
//! - Board state with apply/undo and Zobrist hashing
//! - Win detection (three in a row on 5x5, five otherwise)
//! - Heuristic evaluation and move ordering
//! - Alpha-beta search with opening book, forced-move shortcuts and
//!   iterative deepening under a time budget
//! - An off-thread search worker for interactive hosts

pub mod ai;
pub mod book;
pub mod config;
pub mod engine;
pub mod error;
pub mod eval;
pub mod moves;
pub mod rules;
pub mod tt;
pub mod types;
pub mod worker;

// Re-exports for convenient access
pub use ai::SearchEngine;
pub use config::AppConfig;
pub use engine::{Board, GameState};
pub use error::{ConfigError, GameError};
pub use rules::{apply_move, check_win, has_won};
pub use types::{AiConfig, AiLevel, Coord, Decision, GameMode, Outcome, Player, SearchReport, AI_PLAYER};
pub use worker::{request_ai_move, spawn_search};
