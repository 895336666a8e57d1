//! Attack maps, check detection and pin analysis.
//!
//! `attacked_squares` builds the full attack map of one side under the
//! conventions the legality filter depends on: pawn diagonals count
//! whether or not a capture is possible, and slider rays x-ray one square
//! past the opposing king so the king cannot retreat along a checking ray.

use crate::engine::board::Board;
use crate::engine::geometry::{self, ALL_DIRS, BISHOP_DIRS, DIRECTION_OFFSETS, ROOK_DIRS};
use crate::engine::types::{ChessError, Color, Piece, PieceType, Square, SquareSet};

/// Direction index range for a slider kind.
fn slider_dirs(kind: PieceType) -> std::ops::Range<usize> {
    match kind {
        PieceType::Rook => ROOK_DIRS,
        PieceType::Bishop => BISHOP_DIRS,
        _ => ALL_DIRS,
    }
}

/// Squares attacked by a single piece, under attack-pattern rules.
///
/// Slider rays include the first blocker of either color; when that
/// blocker is the opposing king the ray continues one square further, so
/// squares "behind" a checked king still read as attacked.
pub fn piece_attacks(board: &Board, sq: Square, piece: Piece) -> SquareSet {
    let t = geometry::tables();
    match piece.kind {
        PieceType::Pawn => t.pawn_captures[piece.color.index()][sq.0 as usize],
        PieceType::Knight => t.knight_targets[sq.0 as usize],
        PieceType::King => t.king_targets[sq.0 as usize],
        PieceType::Rook | PieceType::Bishop | PieceType::Queen => {
            let mut attacks = SquareSet::EMPTY;
            for dir in slider_dirs(piece.kind) {
                let offset = DIRECTION_OFFSETS[dir];
                let steps = t.squares_to_edge[sq.0 as usize][dir];
                let mut current = sq;
                for _ in 0..steps {
                    // Offsets stay in range for `steps` iterations.
                    let Some(next) = current.offset(offset) else {
                        break;
                    };
                    attacks.insert(next);
                    match board.piece_at(next) {
                        Some(p) if p.kind == PieceType::King && p.color != piece.color => {
                            // X-ray through the enemy king: mark the square
                            // behind it, then stop.
                            if let Some(behind) = next.offset(offset) {
                                if t.squares_to_edge[next.0 as usize][dir] > 0 {
                                    attacks.insert(behind);
                                }
                            }
                            break;
                        }
                        Some(_) => break,
                        None => {}
                    }
                    current = next;
                }
            }
            attacks
        }
    }
}

/// Union of all squares attacked by `by`.
pub fn attacked_squares(board: &Board, by: Color) -> SquareSet {
    let mut attacks = SquareSet::EMPTY;
    for (sq, piece) in board.pieces_of(by) {
        attacks |= piece_attacks(board, sq, piece);
    }
    attacks
}

/// The pieces of `!color` currently giving check to `color`'s king,
/// with the squares they stand on.
pub fn king_attackers(board: &Board, color: Color) -> Result<Vec<(Square, Piece)>, ChessError> {
    let king = board
        .king_square(color)
        .ok_or(ChessError::MissingKing(color))?;
    let mut attackers = Vec::new();
    for (sq, piece) in board.pieces_of(!color) {
        if piece_attacks(board, sq, piece).contains(king) {
            attackers.push((sq, piece));
        }
    }
    Ok(attackers)
}

/// Is `color`'s king currently attacked?
pub fn in_check(board: &Board, color: Color) -> Result<bool, ChessError> {
    Ok(!king_attackers(board, color)?.is_empty())
}

/// An absolutely pinned piece and the squares it may still occupy.
#[derive(Clone, Debug)]
pub struct Pin {
    /// The pinned piece's square.
    pub square: Square,
    /// Squares the pinned piece may move to without exposing the king:
    /// along the pin ray, including the pinning slider's square.
    pub allowed: SquareSet,
}

/// Find all absolute pins against `color`'s king.
///
/// Walks each ray from the king outward; a single friendly piece followed
/// by an enemy slider that moves along that ray is a pin.
pub fn pins(board: &Board, color: Color) -> Result<Vec<Pin>, ChessError> {
    let king = board
        .king_square(color)
        .ok_or(ChessError::MissingKing(color))?;
    let t = geometry::tables();
    let mut result = Vec::new();

    for dir in ALL_DIRS {
        let offset = DIRECTION_OFFSETS[dir];
        let steps = t.squares_to_edge[king.0 as usize][dir];
        let mut blocker: Option<Square> = None;
        let mut ray = SquareSet::EMPTY;
        let mut current = king;

        for _ in 0..steps {
            let Some(next) = current.offset(offset) else {
                break;
            };
            match board.piece_at(next) {
                None => ray.insert(next),
                Some(p) if p.color == color => {
                    if blocker.is_some() {
                        // Two friendly pieces on the ray: no pin.
                        break;
                    }
                    blocker = Some(next);
                }
                Some(p) => {
                    let pins_on_this_ray = match p.kind {
                        PieceType::Queen => true,
                        PieceType::Rook => ROOK_DIRS.contains(&dir),
                        PieceType::Bishop => BISHOP_DIRS.contains(&dir),
                        _ => false,
                    };
                    if let (Some(pinned), true) = (blocker, pins_on_this_ray) {
                        ray.insert(next);
                        result.push(Pin {
                            square: pinned,
                            allowed: ray,
                        });
                    }
                    break;
                }
            }
            current = next;
        }
    }
    Ok(result)
}

/// The empty squares strictly between two squares on a shared rank, file
/// or diagonal, plus `to` itself. Used to enumerate check-blocking
/// destinations against a slider. Empty set when the squares share no ray.
pub fn ray_between(from: Square, to: Square) -> SquareSet {
    let t = geometry::tables();
    for dir in ALL_DIRS {
        let offset = DIRECTION_OFFSETS[dir];
        let steps = t.squares_to_edge[from.0 as usize][dir];
        let mut ray = SquareSet::EMPTY;
        let mut current = from;
        for _ in 0..steps {
            let Some(next) = current.offset(offset) else {
                break;
            };
            if next == to {
                ray.insert(to);
                return ray;
            }
            ray.insert(next);
            current = next;
        }
    }
    SquareSet::EMPTY
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::board::Position;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn board(fen: &str) -> Board {
        Position::from_fen(fen).unwrap().board
    }

    #[test]
    fn rook_attacks_stop_at_blockers() {
        let b = board("8/8/8/3p4/8/3R1P2/8/4k3 w - - 0 1");
        let rook = Piece::new(PieceType::Rook, Color::White);
        let attacks = piece_attacks(&b, sq("d3"), rook);
        assert!(attacks.contains(sq("d5"))); // first blocker included
        assert!(!attacks.contains(sq("d6"))); // but not past it
        assert!(attacks.contains(sq("f3"))); // own piece included (defended)
        assert!(!attacks.contains(sq("g3")));
        assert!(attacks.contains(sq("a3")));
        assert!(attacks.contains(sq("d1")));
    }

    #[test]
    fn slider_xrays_through_enemy_king() {
        // Rook on a4 checks the king on e4; f4 behind the king must still
        // read as attacked so the king cannot step there.
        let b = board("8/8/8/8/R3k3/8/8/4K3 b - - 0 1");
        let attacks = attacked_squares(&b, Color::White);
        assert!(attacks.contains(sq("e4")));
        assert!(attacks.contains(sq("f4")));
        assert!(!attacks.contains(sq("g4")));
    }

    #[test]
    fn no_xray_through_other_blockers() {
        // Rook a4, own bishop e4: the ray stops at the bishop with no
        // look-behind.
        let b = board("8/8/8/8/R3B3/8/8/4k3 w - - 0 1");
        let rook = Piece::new(PieceType::Rook, Color::White);
        let attacks = piece_attacks(&b, sq("a4"), rook);
        assert!(attacks.contains(sq("e4"))); // blocker square is covered
        assert!(!attacks.contains(sq("f4"))); // no x-ray through own piece
    }

    #[test]
    fn pawn_attacks_ignore_occupancy() {
        // White pawn on e4 attacks d5/f5 even though both are empty.
        let b = board("4k3/8/8/8/4P3/8/8/4K3 w - - 0 1");
        let attacks = attacked_squares(&b, Color::White);
        assert!(attacks.contains(sq("d5")));
        assert!(attacks.contains(sq("f5")));
        assert!(!attacks.contains(sq("e5"))); // pushes are not attacks
    }

    #[test]
    fn king_attackers_finds_double_check() {
        let b = board("4k3/8/8/8/8/5n2/8/r3K3 w - - 0 1");
        let attackers = king_attackers(&b, Color::White).unwrap();
        assert_eq!(attackers.len(), 2);
    }

    #[test]
    fn king_attackers_empty_when_safe() {
        let b = Position::starting().board;
        assert!(king_attackers(&b, Color::White).unwrap().is_empty());
        assert!(king_attackers(&b, Color::Black).unwrap().is_empty());
    }

    #[test]
    fn missing_king_is_an_error() {
        let b = board("8/8/8/3r4/8/8/8/8 w - - 0 1");
        assert!(matches!(
            king_attackers(&b, Color::White),
            Err(ChessError::MissingKing(Color::White))
        ));
    }

    #[test]
    fn detects_rook_pin() {
        // Rook d8 pins the knight d4 against the king d1.
        let b = board("3r4/8/8/8/3N4/8/8/3K4 w - - 0 1");
        let found = pins(&b, Color::White).unwrap();
        assert_eq!(found.len(), 1);
        let pin = &found[0];
        assert_eq!(pin.square, sq("d4"));
        assert!(pin.allowed.contains(sq("d8"))); // may capture the pinner
        assert!(pin.allowed.contains(sq("d5"))); // may slide along the ray
        assert!(!pin.allowed.contains(sq("e4")));
    }

    #[test]
    fn detects_diagonal_pin() {
        let b = board("7b/8/8/8/3P4/8/8/K7 w - - 0 1");
        let found = pins(&b, Color::White).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].square, sq("d4"));
        assert!(found[0].allowed.contains(sq("h8")));
    }

    #[test]
    fn two_blockers_break_the_pin() {
        let b = board("3r4/8/3P4/8/3N4/8/8/3K4 w - - 0 1");
        assert!(pins(&b, Color::White).unwrap().is_empty());
    }

    #[test]
    fn rook_does_not_pin_diagonally() {
        // King d1, pawn e2, rook f3: the rook sits on the diagonal but
        // does not move along it, so there is no pin.
        let b = board("8/8/8/8/8/5r2/4P3/3K4 w - - 0 1");
        assert!(pins(&b, Color::White).unwrap().is_empty());
    }

    #[test]
    fn ray_between_rank_and_diagonal() {
        let between = ray_between(sq("d1"), sq("d8"));
        assert!(between.contains(sq("d4")));
        assert!(between.contains(sq("d8")));
        assert!(!between.contains(sq("d1")));
        assert_eq!(between.len(), 7);

        let diag = ray_between(sq("a1"), sq("d4"));
        assert!(diag.contains(sq("b2")));
        assert!(diag.contains(sq("c3")));
        assert!(diag.contains(sq("d4")));
        assert_eq!(diag.len(), 3);
    }

    #[test]
    fn ray_between_off_ray_is_empty() {
        assert!(ray_between(sq("a1"), sq("b3")).is_empty());
    }
}
