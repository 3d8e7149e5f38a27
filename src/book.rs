use crate::types::Coord;

static BOOK_5: [Coord; 4] = [
  Coord::new(2, 2),
  Coord::new(2, 3),
  Coord::new(3, 2),
  Coord::new(3, 3),
];

static BOOK_7: [Coord; 4] = [
  Coord::new(3, 3),
  Coord::new(3, 4),
  Coord::new(4, 3),
  Coord::new(4, 4),
];

/// Preferred opening cells for a board size, if the book has an entry.
pub fn opening_cells(size: usize) -> Option<&'static [Coord]> {
  match size {
    5 => Some(&BOOK_5),
    7 => Some(&BOOK_7),
    _ => None,
  }
}
