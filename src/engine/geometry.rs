//! Precomputed board geometry: ray directions, distances to the board
//! edge, and jump/capture target sets for the non-sliding pieces.
//!
//! Everything here is derived once at startup from square coordinates and
//! shared through a `OnceLock`. Wrap-around at the board edge is excluded
//! at table-build time, so the mailbox offsets can be applied blindly at
//! generation time.

use std::sync::OnceLock;

use super::types::{Color, Square, SquareSet};

/// Mailbox deltas for the eight ray directions, in the order
/// N, S, W, E, NW, SE, NE, SW. The first four are the rook directions,
/// the last four the bishop directions.
pub const DIRECTION_OFFSETS: [i8; 8] = [8, -8, -1, 1, 7, -7, 9, -9];

/// Range of direction indices used by rooks.
pub const ROOK_DIRS: std::ops::Range<usize> = 0..4;
/// Range of direction indices used by bishops.
pub const BISHOP_DIRS: std::ops::Range<usize> = 4..8;
/// Range of direction indices used by queens and for attack scans.
pub const ALL_DIRS: std::ops::Range<usize> = 0..8;

/// Precomputed geometry tables.
pub struct GeometryTables {
    /// For each square and direction index, how many steps can be taken
    /// before running off the board.
    pub squares_to_edge: [[u8; 8]; 64],
    /// King move targets from each square.
    pub king_targets: [SquareSet; 64],
    /// Knight move targets from each square.
    pub knight_targets: [SquareSet; 64],
    /// Pawn capture targets, indexed by color then square. These are the
    /// squares a pawn *attacks*, independent of occupancy.
    pub pawn_captures: [[SquareSet; 64]; 2],
}

static TABLES: OnceLock<GeometryTables> = OnceLock::new();

/// Access the shared geometry tables, building them on first use.
pub fn tables() -> &'static GeometryTables {
    TABLES.get_or_init(build_tables)
}

fn build_tables() -> GeometryTables {
    GeometryTables {
        squares_to_edge: build_squares_to_edge(),
        king_targets: build_king_targets(),
        knight_targets: build_knight_targets(),
        pawn_captures: build_pawn_captures(),
    }
}

fn build_squares_to_edge() -> [[u8; 8]; 64] {
    let mut table = [[0u8; 8]; 64];
    for sq in 0..64u8 {
        let file = sq & 7;
        let rank = sq >> 3;
        let north = 7 - rank;
        let south = rank;
        let west = file;
        let east = 7 - file;
        table[sq as usize] = [
            north,
            south,
            west,
            east,
            north.min(west),
            south.min(east),
            north.min(east),
            south.min(west),
        ];
    }
    table
}

fn build_king_targets() -> [SquareSet; 64] {
    let mut table = [SquareSet::EMPTY; 64];
    for sq in 0..64u8 {
        let from = Square(sq);
        let mut targets = SquareSet::EMPTY;
        for &delta in &DIRECTION_OFFSETS {
            if let Some(to) = from.offset(delta) {
                if chebyshev(from, to) == 1 {
                    targets.insert(to);
                }
            }
        }
        table[sq as usize] = targets;
    }
    table
}

fn build_knight_targets() -> [SquareSet; 64] {
    const KNIGHT_OFFSETS: [i8; 8] = [15, 17, -17, -15, 10, -6, 6, -10];
    let mut table = [SquareSet::EMPTY; 64];
    for sq in 0..64u8 {
        let from = Square(sq);
        let mut targets = SquareSet::EMPTY;
        for &delta in &KNIGHT_OFFSETS {
            if let Some(to) = from.offset(delta) {
                // Chebyshev distance 2 filters out edge wrap-around.
                if chebyshev(from, to) == 2 {
                    targets.insert(to);
                }
            }
        }
        table[sq as usize] = targets;
    }
    table
}

fn build_pawn_captures() -> [[SquareSet; 64]; 2] {
    let mut table = [[SquareSet::EMPTY; 64]; 2];
    for sq in 0..64u8 {
        let from = Square(sq);
        let file = from.file();
        let rank = from.rank();

        let mut white = SquareSet::EMPTY;
        if rank < 7 {
            if file > 0 {
                white.insert(Square(sq + 7));
            }
            if file < 7 {
                white.insert(Square(sq + 9));
            }
        }
        table[Color::White.index()][sq as usize] = white;

        let mut black = SquareSet::EMPTY;
        if rank > 0 {
            if file > 0 {
                black.insert(Square(sq - 9));
            }
            if file < 7 {
                black.insert(Square(sq - 7));
            }
        }
        table[Color::Black.index()][sq as usize] = black;
    }
    table
}

fn chebyshev(a: Square, b: Square) -> u8 {
    let df = (a.file() as i8 - b.file() as i8).unsigned_abs();
    let dr = (a.rank() as i8 - b.rank() as i8).unsigned_abs();
    df.max(dr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn edge_distances_corner() {
        let t = tables();
        // a1: nothing south or west, seven steps north and east.
        let a1 = &t.squares_to_edge[sq("a1").0 as usize];
        assert_eq!(a1[0], 7); // N
        assert_eq!(a1[1], 0); // S
        assert_eq!(a1[2], 0); // W
        assert_eq!(a1[3], 7); // E
        assert_eq!(a1[4], 0); // NW
        assert_eq!(a1[5], 0); // SE
        assert_eq!(a1[6], 7); // NE
        assert_eq!(a1[7], 0); // SW
    }

    #[test]
    fn edge_distances_center() {
        let t = tables();
        let e4 = &t.squares_to_edge[sq("e4").0 as usize];
        assert_eq!(e4[0], 4); // N
        assert_eq!(e4[1], 3); // S
        assert_eq!(e4[2], 4); // W
        assert_eq!(e4[3], 3); // E
        assert_eq!(e4[4], 4); // NW: min(4, 4)
        assert_eq!(e4[5], 3); // SE: min(3, 3)
        assert_eq!(e4[6], 3); // NE: min(4, 3)
        assert_eq!(e4[7], 3); // SW: min(3, 4)
    }

    #[test]
    fn knight_target_counts() {
        let t = tables();
        assert_eq!(t.knight_targets[sq("e4").0 as usize].len(), 8);
        assert_eq!(t.knight_targets[sq("a1").0 as usize].len(), 2);
        assert_eq!(t.knight_targets[sq("h8").0 as usize].len(), 2);
        assert_eq!(t.knight_targets[sq("b1").0 as usize].len(), 3);
    }

    #[test]
    fn knight_targets_no_wraparound() {
        let t = tables();
        // A knight on h4 must not reach the a-file.
        for target in t.knight_targets[sq("h4").0 as usize].iter() {
            assert!(target.file() >= 5, "wrapped target {target}");
        }
    }

    #[test]
    fn king_target_counts() {
        let t = tables();
        assert_eq!(t.king_targets[sq("e4").0 as usize].len(), 8);
        assert_eq!(t.king_targets[sq("a1").0 as usize].len(), 3);
        assert_eq!(t.king_targets[sq("a4").0 as usize].len(), 5);
    }

    #[test]
    fn pawn_captures_center() {
        let t = tables();
        let white = t.pawn_captures[Color::White.index()][sq("e4").0 as usize];
        assert_eq!(white.len(), 2);
        assert!(white.contains(sq("d5")));
        assert!(white.contains(sq("f5")));

        let black = t.pawn_captures[Color::Black.index()][sq("e4").0 as usize];
        assert_eq!(black.len(), 2);
        assert!(black.contains(sq("d3")));
        assert!(black.contains(sq("f3")));
    }

    #[test]
    fn pawn_captures_edges() {
        let t = tables();
        // Rook-file pawns only attack one square.
        let a2 = t.pawn_captures[Color::White.index()][sq("a2").0 as usize];
        assert_eq!(a2.len(), 1);
        assert!(a2.contains(sq("b3")));

        // Last-rank pawns attack nothing (they would already have promoted).
        assert!(t.pawn_captures[Color::White.index()][sq("e8").0 as usize].is_empty());
        assert!(t.pawn_captures[Color::Black.index()][sq("e1").0 as usize].is_empty());
    }
}
