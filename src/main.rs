//! Caro CLI - terminal host for the engine
//!
//! Commands:
//! - play: interactive game in the terminal (menu, human vs human or vs AI)
//! - selfplay: the AI plays both sides of one game
//! - suggest: print the engine's choice for a position as JSON

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::Rng;
use tracing_subscriber::EnvFilter;

use caro::config::SUPPORTED_SIZES;
use caro::{
  spawn_search, AiConfig, AiLevel, AppConfig, GameError, GameMode, GameState, Outcome, Player, SearchEngine,
  SearchReport,
};

#[derive(Parser)]
#[command(name = "caro")]
#[command(about = "Connect-K (Caro) with an alpha-beta AI")]
struct Cli {
  /// JSON config file; missing file means defaults
  #[arg(long, global = true, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Seed for the AI's random choices
  #[arg(long, global = true)]
  seed: Option<u64>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Play in the terminal
  Play(EngineArgs),
  /// Let the AI play against itself
  Selfplay(EngineArgs),
  /// Suggest a move for a position
  Suggest {
    #[command(flatten)]
    engine: EngineArgs,
    /// Moves played so far, X first, e.g. "2,2 1,1 2,3"
    #[arg(long, default_value = "")]
    moves: String,
  },
}

#[derive(Args, Clone)]
struct EngineArgs {
  /// Board size
  #[arg(long)]
  size: Option<usize>,
  #[arg(long, value_enum)]
  mode: Option<ModeArg>,
  #[arg(long, value_enum)]
  level: Option<LevelArg>,
  /// Maximum search depth
  #[arg(long)]
  depth: Option<u8>,
  /// Thinking time per move in milliseconds
  #[arg(long)]
  time_ms: Option<u64>,
  /// Node cap per AI move
  #[arg(long)]
  max_nodes: Option<u64>,
  /// Search every empty cell instead of the neighborhood of existing marks
  #[arg(long)]
  full_width: bool,
  /// Search root moves on a single thread
  #[arg(long)]
  single_thread: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
  Pvp,
  Ai,
}

#[derive(Clone, Copy, ValueEnum)]
enum LevelArg {
  Random,
  Search,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("caro=info")))
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();
  let seed = cli.seed.unwrap_or_else(|| rand::thread_rng().gen());

  match cli.command {
    Commands::Play(args) => {
      let config = resolve_config(cli.config.as_ref(), &args)?;
      run_play(config, seed).await
    }
    Commands::Selfplay(args) => {
      let config = resolve_config(cli.config.as_ref(), &args)?;
      run_selfplay(config, seed).await
    }
    Commands::Suggest { engine, moves } => {
      let config = resolve_config(cli.config.as_ref(), &engine)?;
      run_suggest(config, seed, &moves).await
    }
  }
}

fn resolve_config(path: Option<&PathBuf>, args: &EngineArgs) -> Result<AppConfig> {
  let mut config = match path {
    Some(path) => AppConfig::load_or_default(path)
      .with_context(|| format!("Failed to load config: {}", path.display()))?,
    None => AppConfig::default(),
  };

  if let Some(size) = args.size {
    config.board_size = size;
  }
  if let Some(mode) = args.mode {
    config.mode = match mode {
      ModeArg::Pvp => GameMode::HumanVsHuman,
      ModeArg::Ai => GameMode::HumanVsAi,
    };
  }
  if let Some(level) = args.level {
    config.ai.level = match level {
      LevelArg::Random => AiLevel::Random,
      LevelArg::Search => AiLevel::Search,
    };
  }
  if let Some(depth) = args.depth {
    config.ai.max_depth = depth;
  }
  if let Some(time_ms) = args.time_ms {
    config.ai.time_budget_ms = time_ms;
  }
  if args.max_nodes.is_some() {
    config.ai.max_nodes = args.max_nodes;
  }
  if args.full_width {
    config.ai.neighborhood_radius = None;
  }
  if args.single_thread {
    config.ai.parallel = false;
  }

  config.validate().context("Invalid configuration")?;
  Ok(config)
}

// ============================================================================
// PLAY
// ============================================================================

enum Screen {
  Menu,
  Game(GameState),
  Quit,
}

async fn run_play(config: AppConfig, seed: u64) -> Result<()> {
  let stdin = io::stdin();
  let mut lines = stdin.lock().lines();
  let mut engine = Some(SearchEngine::with_seed(config.ai, seed));
  let mut screen = Screen::Game(new_game(config.board_size, config.mode)?);
  tracing::info!(size = config.board_size, mode = ?config.mode, seed, "starting game");

  loop {
    screen = match screen {
      Screen::Quit => return Ok(()),
      Screen::Menu => {
        println!("Board size {:?} and mode (ai|pvp), e.g. \"7 ai\"; \"quit\" to exit", SUPPORTED_SIZES);
        let Some(line) = prompt(&mut lines)? else {
          return Ok(());
        };
        menu_choice(&line, config.mode)
      }
      Screen::Game(mut game) => {
        if game.is_ai_turn() {
          let current = engine.take().unwrap_or_else(|| SearchEngine::with_seed(config.ai, seed));
          let (returned, report) = ai_move(current, &mut game).await?;
          engine = Some(returned);
          println!("AI plays {} ({:?})", report.mv, report.decision);
          announce(&game);
          Screen::Game(game)
        } else {
          println!("{}", game.board);
          if game.outcome.is_over() {
            println!("\"reset\" for a new game, \"back\" for the menu, \"quit\" to exit");
          } else {
            println!("{} to move: enter \"row col\" (or reset/back/quit)", game.to_move);
          }
          let Some(line) = prompt(&mut lines)? else {
            return Ok(());
          };
          handle_input(game, &line)?
        }
      }
    };
  }
}

fn new_game(size: usize, mode: GameMode) -> Result<GameState> {
  GameState::new(size, mode).context("Failed to create game")
}

fn menu_choice(line: &str, default_mode: GameMode) -> Screen {
  let mut parts = line.split_whitespace();
  let Some(first) = parts.next() else {
    return Screen::Menu;
  };
  if first.eq_ignore_ascii_case("quit") {
    return Screen::Quit;
  }
  let size = match first.parse::<usize>() {
    Ok(size) if SUPPORTED_SIZES.contains(&size) => size,
    _ => {
      println!("Unsupported size: {}", first);
      return Screen::Menu;
    }
  };
  let mode = match parts.next() {
    Some("pvp") => GameMode::HumanVsHuman,
    Some("ai") => GameMode::HumanVsAi,
    _ => default_mode,
  };
  match GameState::new(size, mode) {
    Ok(game) => Screen::Game(game),
    Err(e) => {
      println!("{}", e);
      Screen::Menu
    }
  }
}

fn handle_input(mut game: GameState, line: &str) -> Result<Screen> {
  match line.trim() {
    "quit" | "exit" => return Ok(Screen::Quit),
    "back" | "menu" => return Ok(Screen::Menu),
    "reset" => {
      game.reset();
      println!("New game");
      return Ok(Screen::Game(game));
    }
    _ => {}
  }

  let Some((row, col)) = parse_coord(line) else {
    println!("Could not read a move from {:?}", line.trim());
    return Ok(Screen::Game(game));
  };

  match make_move(&mut game, row, col) {
    Ok(_) => announce(&game),
    Err(GameError::InvalidMove { .. }) => println!("That cell is taken or off the board"),
    Err(e) => println!("{}", e),
  }
  Ok(Screen::Game(game))
}

fn make_move(game: &mut GameState, row: usize, col: usize) -> Result<Outcome, GameError> {
  game.apply_human_move(row, col)
}

/// Runs the search on the blocking pool and prints progress dots while it
/// thinks, then applies the move.
async fn ai_move(engine: SearchEngine, game: &mut GameState) -> Result<(SearchEngine, SearchReport)> {
  let mut handle = spawn_search(engine, game.board.clone(), game.to_move);
  let mut ticker = tokio::time::interval(Duration::from_millis(500));
  ticker.tick().await;

  let outcome = loop {
    tokio::select! {
      joined = &mut handle => break joined.context("Search task failed")?,
      _ = ticker.tick() => {
        eprint!(".");
        let _ = io::stderr().flush();
      }
    }
  };

  let report = outcome.result?;
  game.apply_move(report.mv.row, report.mv.col)?;
  Ok((outcome.engine, report))
}

fn announce(game: &GameState) {
  match game.outcome {
    Outcome::Win(player) => {
      println!("{}", game.board);
      println!("{} wins", player);
    }
    Outcome::Draw => {
      println!("{}", game.board);
      println!("Draw");
    }
    Outcome::InProgress => {}
  }
}

fn prompt<B: BufRead>(lines: &mut io::Lines<B>) -> Result<Option<String>> {
  print!("> ");
  io::stdout().flush()?;
  match lines.next() {
    Some(line) => Ok(Some(line.context("Failed to read input")?)),
    None => Ok(None),
  }
}

fn parse_coord(text: &str) -> Option<(usize, usize)> {
  let mut parts = text
    .split(|c: char| c == ',' || c.is_whitespace())
    .filter(|s| !s.is_empty());
  let row = parts.next()?.parse().ok()?;
  let col = parts.next()?.parse().ok()?;
  if parts.next().is_some() {
    return None;
  }
  Some((row, col))
}

// ============================================================================
// SELF PLAY
// ============================================================================

async fn run_selfplay(config: AppConfig, seed: u64) -> Result<()> {
  let mut game = new_game(config.board_size, GameMode::HumanVsHuman)?;
  let mut engines = [
    Some(SearchEngine::with_seed(config.ai, seed)),
    Some(SearchEngine::with_seed(config.ai, seed.wrapping_add(1))),
  ];
  tracing::info!(size = config.board_size, seed, "starting self play");

  while !game.outcome.is_over() {
    let slot = match game.to_move {
      Player::X => 0,
      Player::O => 1,
    };
    let player = game.to_move;
    let engine = engines[slot].take().unwrap_or_else(|| SearchEngine::with_seed(config.ai, seed));
    let (engine, report) = ai_move(engine, &mut game).await?;
    engines[slot] = Some(engine);
    println!(
      "{:>3}. {} {} {:?} score={:?} nodes={} {}ms",
      game.moves.len(),
      player,
      report.mv,
      report.decision,
      report.score,
      report.nodes,
      report.elapsed_ms
    );
  }

  println!("{}", game.board);
  match game.outcome {
    Outcome::Win(player) => println!("{} wins after {} moves", player, game.moves.len()),
    _ => println!("Draw after {} moves", game.moves.len()),
  }
  Ok(())
}

// ============================================================================
// SUGGEST
// ============================================================================

async fn run_suggest(config: AppConfig, seed: u64, moves: &str) -> Result<()> {
  let mut game = new_game(config.board_size, GameMode::HumanVsHuman)?;
  for token in moves.split_whitespace() {
    let (row, col) = parse_coord(token).with_context(|| format!("Bad move {:?}", token))?;
    game
      .apply_move(row, col)
      .with_context(|| format!("Cannot play {:?}", token))?;
  }
  if game.outcome.is_over() {
    bail!("Game is already finished: {:?}", game.outcome);
  }

  let ai: AiConfig = config.ai;
  let engine = SearchEngine::with_seed(ai, seed);
  let outcome = spawn_search(engine, game.board.clone(), game.to_move)
    .await
    .context("Search task failed")?;
  let report = outcome.result?;

  println!("{}", game.board);
  println!("{}", serde_json::to_string_pretty(&report)?);
  Ok(())
}
