//! Static position evaluation.
//!
//! Returns a score in centipawns from the given side's perspective:
//! positive means that side stands better. Components:
//!   1. Material balance (the king carries a large nominal value so that
//!      losing it dominates everything else)
//!   2. Piece-square tables, with the king table switching between a
//!      middle-game and an endgame variant
//!   3. Optional endgame king-proximity bonus (off by default)

use crate::engine::board::Board;
use crate::engine::types::{Color, PieceType, Square};

/// Infinity sentinel. Larger than any realistic eval.
pub const INF: i32 = 100_000;

/// Checkmate score base.
pub const MATE: i32 = 90_000;

/// Is this score a forced-mate score?
#[inline]
pub fn is_mate_score(score: i32) -> bool {
    score.abs() >= MATE - 500
}

// =========================================================================
// Piece-Square Tables (from White's perspective)
//
// Indexed by square, a1=0 .. h8=63, rank 1 first. Black lookups mirror
// the rank with `sq ^ 56`.
// =========================================================================

/// Pawn PST — encourages central pawns and advancement.
#[rustfmt::skip]
const PAWN_PST: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,   // rank 1 (never occupied)
     5, 10, 10,-20,-20, 10, 10,  5,   // rank 2
     5, -5,-10,  0,  0,-10, -5,  5,   // rank 3
     0,  0,  0, 20, 20,  0,  0,  0,   // rank 4
     5,  5, 10, 25, 25, 10,  5,  5,   // rank 5
    10, 10, 20, 30, 30, 20, 10, 10,   // rank 6
    50, 50, 50, 50, 50, 50, 50, 50,   // rank 7
     0,  0,  0,  0,  0,  0,  0,  0,   // rank 8 (promoted)
];

/// Knight PST — encourages centralization.
#[rustfmt::skip]
const KNIGHT_PST: [i32; 64] = [
    -50,-40,-30,-30,-30,-30,-40,-50,
    -40,-20,  0,  5,  5,  0,-20,-40,
    -30,  5, 10, 15, 15, 10,  5,-30,
    -30,  0, 15, 20, 20, 15,  0,-30,
    -30,  5, 15, 20, 20, 15,  5,-30,
    -30,  0, 10, 15, 15, 10,  0,-30,
    -40,-20,  0,  0,  0,  0,-20,-40,
    -50,-40,-30,-30,-30,-30,-40,-50,
];

/// Bishop PST — encourages long diagonals and avoids corners.
#[rustfmt::skip]
const BISHOP_PST: [i32; 64] = [
    -20,-10,-10,-10,-10,-10,-10,-20,
    -10,  5,  0,  0,  0,  0,  5,-10,
    -10, 10, 10, 10, 10, 10, 10,-10,
    -10,  0, 10, 10, 10, 10,  0,-10,
    -10,  5,  5, 10, 10,  5,  5,-10,
    -10,  0,  5, 10, 10,  5,  0,-10,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -20,-10,-10,-10,-10,-10,-10,-20,
];

/// Rook PST — encourages the 7th rank and central files.
#[rustfmt::skip]
const ROOK_PST: [i32; 64] = [
      0,  0,  0,  5,  5,  0,  0,  0,
     -5,  0,  0,  0,  0,  0,  0, -5,
     -5,  0,  0,  0,  0,  0,  0, -5,
     -5,  0,  0,  0,  0,  0,  0, -5,
     -5,  0,  0,  0,  0,  0,  0, -5,
     -5,  0,  0,  0,  0,  0,  0, -5,
      5, 10, 10, 10, 10, 10, 10,  5,
      0,  0,  0,  0,  0,  0,  0,  0,
];

/// Queen PST — minor centralization bonus.
#[rustfmt::skip]
const QUEEN_PST: [i32; 64] = [
    -20,-10,-10, -5, -5,-10,-10,-20,
    -10,  0,  5,  0,  0,  0,  0,-10,
    -10,  5,  5,  5,  5,  5,  0,-10,
      0,  0,  5,  5,  5,  5,  0, -5,
     -5,  0,  5,  5,  5,  5,  0, -5,
    -10,  0,  5,  5,  5,  5,  0,-10,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -20,-10,-10, -5, -5,-10,-10,-20,
];

/// King PST, middle-game — rewards the castled corner, penalizes the
/// center.
#[rustfmt::skip]
const KING_MG_PST: [i32; 64] = [
     20, 30, 10,  0,  0, 10, 30, 20,
     20, 20,  0,  0,  0,  0, 20, 20,
    -10,-20,-20,-20,-20,-20,-20,-10,
    -20,-30,-30,-40,-40,-30,-30,-20,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
];

/// King PST, endgame — the king becomes a fighting piece and belongs in
/// the center.
#[rustfmt::skip]
const KING_EG_PST: [i32; 64] = [
    -50,-30,-30,-30,-30,-30,-30,-50,
    -30,-30,  0,  0,  0,  0,-30,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-20,-10,  0,  0,-10,-20,-30,
    -50,-40,-30,-20,-20,-30,-40,-50,
];

fn pst_for(kind: PieceType, endgame: bool) -> &'static [i32; 64] {
    match kind {
        PieceType::Pawn => &PAWN_PST,
        PieceType::Knight => &KNIGHT_PST,
        PieceType::Bishop => &BISHOP_PST,
        PieceType::Rook => &ROOK_PST,
        PieceType::Queen => &QUEEN_PST,
        PieceType::King => {
            if endgame {
                &KING_EG_PST
            } else {
                &KING_MG_PST
            }
        }
    }
}

// =========================================================================
// Evaluation
// =========================================================================

/// Tunable evaluation parameters.
#[derive(Clone, Debug, Default)]
pub struct Params {
    /// In the endgame, reward dragging the kings together.
    pub king_proximity_bonus: bool,
}

/// Evaluate a board from `side`'s perspective.
pub fn evaluate(board: &Board, side: Color) -> i32 {
    evaluate_with(board, side, &Params::default())
}

/// Evaluate with explicit parameters.
pub fn evaluate_with(board: &Board, side: Color, params: &Params) -> i32 {
    let endgame = is_endgame(board);
    let mut score = 0i32;

    for (sq, piece) in board.occupied() {
        let pst = pst_for(piece.kind, endgame);
        let pst_sq = match piece.color {
            Color::White => sq.0,
            Color::Black => mirror_square(sq),
        };
        let value = piece.kind.value() + pst[pst_sq as usize];
        if piece.color == side {
            score += value;
        } else {
            score -= value;
        }
    }

    if params.king_proximity_bonus && endgame {
        if let (Some(own), Some(other)) =
            (board.king_square(side), board.king_square(!side))
        {
            // A material leader wants the kings close to drive the mate
            // home; small enough to never outweigh a pawn.
            if score > 0 {
                score += (14 - manhattan(own, other)) * 4;
            }
        }
    }

    score
}

/// Both sides are down to endgame material: a color qualifies with no
/// queen at all, or with a queen accompanied by no rook and no minor
/// piece.
pub fn is_endgame(board: &Board) -> bool {
    endgame_for(board, Color::White) && endgame_for(board, Color::Black)
}

fn endgame_for(board: &Board, color: Color) -> bool {
    let mut has_queen = false;
    let mut heavy_or_minor = 0;
    for (_, piece) in board.pieces_of(color) {
        match piece.kind {
            PieceType::Queen => has_queen = true,
            PieceType::Rook | PieceType::Knight | PieceType::Bishop => heavy_or_minor += 1,
            _ => {}
        }
    }
    !has_queen || heavy_or_minor == 0
}

/// Mirror a square vertically (flip rank) for Black PST lookup.
#[inline]
fn mirror_square(sq: Square) -> u8 {
    sq.0 ^ 56
}

fn manhattan(a: Square, b: Square) -> i32 {
    let df = (a.file() as i32 - b.file() as i32).abs();
    let dr = (a.rank() as i32 - b.rank() as i32).abs();
    df + dr
}

// =========================================================================
// Tests
// =========================================================================
