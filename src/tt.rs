use crate::types::Player;

// XORed into the board hash so X- and O-perspective scores get separate keys.
const PERSPECTIVE_KEY: [u64; 2] = [0, 0x9E37_79B9_7F4A_7C15];

// Zobrist keys are per flat index, so boards of different sizes can share a
// hash. The size salt keeps their scores apart.
const SIZE_SALT: u64 = 0xD6E8_FEB8_6659_FD93;

#[derive(Clone, Copy)]
struct TTEntry {
  key: u64,
  score: i32,
}

/// Fixed-size cache of leaf evaluations. Direct-mapped: a colliding store
/// evicts the older entry.
pub struct TranspositionTable {
  entries: Vec<Option<TTEntry>>,
  size: usize,
  len: usize,
  hits: u64,
  misses: u64,
}

impl TranspositionTable {
  pub fn new(size: usize) -> Self {
    let size = size.max(1);
    Self {
      entries: vec![None; size],
      size,
      len: 0,
      hits: 0,
      misses: 0,
    }
  }

  pub fn key(hash: u64, board_size: usize, perspective: Player) -> u64 {
    hash ^ (board_size as u64).wrapping_mul(SIZE_SALT) ^ PERSPECTIVE_KEY[perspective.slot()]
  }

  pub fn probe(&mut self, key: u64) -> Option<i32> {
    let index = (key as usize) % self.size;
    match &self.entries[index] {
      Some(entry) if entry.key == key => {
        self.hits += 1;
        Some(entry.score)
      }
      _ => {
        self.misses += 1;
        None
      }
    }
  }

  pub fn store(&mut self, key: u64, score: i32) {
    let index = (key as usize) % self.size;
    if self.entries[index].is_none() {
      self.len += 1;
    }
    self.entries[index] = Some(TTEntry { key, score });
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  pub fn capacity(&self) -> usize {
    self.size
  }

  pub fn hits(&self) -> u64 {
    self.hits
  }

  pub fn misses(&self) -> u64 {
    self.misses
  }

  pub fn clear(&mut self) {
    self.entries.iter_mut().for_each(|e| *e = None);
    self.len = 0;
    self.hits = 0;
    self.misses = 0;
  }
}
