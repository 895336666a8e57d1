//! Move generation.
//!
//! Two layers:
//!   1. `pseudo_legal_moves` — movement patterns and occupancy only, no
//!      king-safety reasoning.
//!   2. `legal_moves` — filters by check analysis: attack map, checker
//!      count, pin rays and castling path safety, without applying any
//!      candidate move.
//!
//! `legal_moves_oracle` is a deliberately slow reference filter (apply
//! each pseudo-legal move virtually, reject if the king can be captured
//! in reply) kept as a cross-check for the analytic filter.

use crate::engine::attacks::{self, Pin};
use crate::engine::board::{castling_rook_squares, Position};
use crate::engine::geometry::{self, ALL_DIRS, BISHOP_DIRS, DIRECTION_OFFSETS, ROOK_DIRS};
use crate::engine::types::{ChessError, Color, Move, Piece, PieceType, Square, SquareSet};

// =========================================================================
// Pseudo-legal generation
// =========================================================================

/// Generate all pseudo-legal moves for the side to move.
///
/// Castling checks rights and the squares between king and rook being
/// empty (kingside f/g, queenside d/c), but not attacks; en-passant
/// captures are not generated at all.
pub fn pseudo_legal_moves(pos: &Position) -> Vec<Move> {
    let mut moves = Vec::with_capacity(64);
    for (sq, piece) in pos.board.pieces_of(pos.side_to_move) {
        piece_moves(pos, sq, piece, &mut moves);
    }
    moves
}

fn piece_moves(pos: &Position, from: Square, piece: Piece, moves: &mut Vec<Move>) {
    match piece.kind {
        PieceType::Pawn => pawn_moves(pos, from, piece.color, moves),
        PieceType::Knight => {
            jump_moves(pos, from, geometry::tables().knight_targets[from.0 as usize], moves)
        }
        PieceType::King => {
            jump_moves(pos, from, geometry::tables().king_targets[from.0 as usize], moves);
            castling_moves(pos, from, piece.color, moves);
        }
        PieceType::Rook | PieceType::Bishop | PieceType::Queen => {
            slider_moves(pos, from, piece, moves)
        }
    }
}

fn jump_moves(pos: &Position, from: Square, targets: SquareSet, moves: &mut Vec<Move>) {
    for to in targets.iter() {
        match pos.board.piece_at(to) {
            Some(p) if p.color == pos.side_to_move => {}
            _ => moves.push(Move::new(from, to)),
        }
    }
}

fn slider_moves(pos: &Position, from: Square, piece: Piece, moves: &mut Vec<Move>) {
    let t = geometry::tables();
    let dirs = match piece.kind {
        PieceType::Rook => ROOK_DIRS,
        PieceType::Bishop => BISHOP_DIRS,
        _ => ALL_DIRS,
    };
    for dir in dirs {
        let offset = DIRECTION_OFFSETS[dir];
        let steps = t.squares_to_edge[from.0 as usize][dir];
        let mut current = from;
        for _ in 0..steps {
            let Some(to) = current.offset(offset) else {
                break;
            };
            match pos.board.piece_at(to) {
                None => moves.push(Move::new(from, to)),
                Some(p) => {
                    if p.color != piece.color {
                        moves.push(Move::new(from, to));
                    }
                    break;
                }
            }
            current = to;
        }
    }
}

fn pawn_moves(pos: &Position, from: Square, color: Color, moves: &mut Vec<Move>) {
    let (push, start_rank) = match color {
        Color::White => (8i8, 1),
        Color::Black => (-8i8, 6),
    };

    if let Some(one) = from.offset(push) {
        if pos.board.piece_at(one).is_none() {
            moves.push(Move::new(from, one));
            if from.rank() == start_rank {
                if let Some(two) = one.offset(push) {
                    if pos.board.piece_at(two).is_none() {
                        moves.push(Move::new(from, two));
                    }
                }
            }
        }
    }

    // Diagonal captures only onto enemy-occupied squares. No en passant.
    let captures = geometry::tables().pawn_captures[color.index()][from.0 as usize];
    for to in captures.iter() {
        if matches!(pos.board.piece_at(to), Some(p) if p.color != color) {
            moves.push(Move::new(from, to));
        }
    }
}

fn castling_moves(pos: &Position, from: Square, color: Color, moves: &mut Vec<Move>) {
    let rights = pos.castling_rights;
    let home = match color {
        Color::White => Square(4),
        Color::Black => Square(60),
    };
    if from != home {
        return;
    }

    // Kingside: f and g must be empty.
    if rights.kingside(color)
        && pos.board.piece_at(Square(from.0 + 1)).is_none()
        && pos.board.piece_at(Square(from.0 + 2)).is_none()
    {
        moves.push(Move::new(from, Square(from.0 + 2)));
    }
    // Queenside: d and c must be empty. The b-file square is not
    // examined, and neither side's rook presence is re-verified; the
    // castling rights carry that state.
    if rights.queenside(color)
        && pos.board.piece_at(Square(from.0 - 1)).is_none()
        && pos.board.piece_at(Square(from.0 - 2)).is_none()
    {
        moves.push(Move::new(from, Square(from.0 - 2)));
    }
}

// =========================================================================
// Legality filter
// =========================================================================

/// Generate all fully legal moves for the side to move.
///
/// Errors with `PromotionPending` while a promotion is unresolved and
/// `MissingKing` when the mover has no king on the board.
pub fn legal_moves(pos: &Position) -> Result<Vec<Move>, ChessError> {
    if let Some(sq) = pos.pending_promotion {
        return Err(ChessError::PromotionPending(sq));
    }
    let us = pos.side_to_move;
    let king = pos
        .board
        .king_square(us)
        .ok_or(ChessError::MissingKing(us))?;

    let danger = attacks::attacked_squares(&pos.board, !us);
    let checkers = attacks::king_attackers(&pos.board, us)?;
    let pin_list = attacks::pins(&pos.board, us)?;
    let pseudo = pseudo_legal_moves(pos);

    let mut legal = Vec::with_capacity(pseudo.len());
    match checkers.len() {
        // Double check: only the king may move, and only to safe squares.
        // Castling is never an escape.
        2.. => {
            for mv in pseudo {
                if mv.from == king && mv.file_span().abs() != 2 && !danger.contains(mv.to) {
                    legal.push(mv);
                }
            }
        }
        // Single check: safe king moves, captures of the checker, or
        // interpositions on a slider's checking ray. Pinned pieces stay
        // restricted to their pin ray throughout.
        1 => {
            let (checker_sq, checker) = checkers[0];
            let block_squares = if checker.kind.is_slider() {
                attacks::ray_between(checker_sq, king)
            } else {
                SquareSet::EMPTY
            };
            for mv in pseudo {
                if mv.from == king {
                    if mv.file_span().abs() != 2 && !danger.contains(mv.to) {
                        legal.push(mv);
                    }
                    continue;
                }
                let resolves = mv.to == checker_sq
                    || (block_squares.contains(mv.to) && mv.to != king);
                if resolves && pin_allows(&pin_list, mv) {
                    legal.push(mv);
                }
            }
        }
        // No check: drop pinned pieces' off-ray moves, king steps into
        // attacked squares, and castling whose crossed squares are
        // attacked.
        0 => {
            for mv in pseudo {
                if mv.from == king {
                    match mv.file_span() {
                        2 => {
                            if !danger.contains(Square(mv.from.0 + 1))
                                && !danger.contains(Square(mv.from.0 + 2))
                            {
                                legal.push(mv);
                            }
                        }
                        -2 => {
                            if !danger.contains(Square(mv.from.0 - 1))
                                && !danger.contains(Square(mv.from.0 - 2))
                            {
                                legal.push(mv);
                            }
                        }
                        _ => {
                            if !danger.contains(mv.to) {
                                legal.push(mv);
                            }
                        }
                    }
                } else if pin_allows(&pin_list, mv) {
                    legal.push(mv);
                }
            }
        }
    }
    Ok(legal)
}

fn pin_allows(pins: &[Pin], mv: Move) -> bool {
    pins.iter()
        .find(|p| p.square == mv.from)
        .is_none_or(|p| p.allowed.contains(mv.to))
}

/// Legal moves starting from one square.
pub fn legal_moves_from(pos: &Position, from: Square) -> Result<Vec<Move>, ChessError> {
    Ok(legal_moves(pos)?
        .into_iter()
        .filter(|mv| mv.from == from)
        .collect())
}

// =========================================================================
// Reference filter
// =========================================================================

/// Slow reference implementation of `legal_moves`: apply each candidate
/// on a scratch board and reject it if any pseudo-legal reply could land
/// on the mover's king. Exists to cross-check the analytic filter.
pub fn legal_moves_oracle(pos: &Position) -> Result<Vec<Move>, ChessError> {
    if let Some(sq) = pos.pending_promotion {
        return Err(ChessError::PromotionPending(sq));
    }
    let us = pos.side_to_move;
    let king = pos
        .board
        .king_square(us)
        .ok_or(ChessError::MissingKing(us))?;
    let in_check_now = attacks::in_check(&pos.board, us)?;
    let danger = attacks::attacked_squares(&pos.board, !us);

    let mut legal = Vec::new();
    for mv in pseudo_legal_moves(pos) {
        let is_castling = mv.from == king && mv.file_span().abs() == 2;
        if is_castling {
            // The virtual-reply test below cannot see the king's
            // intermediate square, so castling is screened directly.
            let crossed = Square((mv.from.0 + mv.to.0) / 2);
            if in_check_now || danger.contains(crossed) {
                continue;
            }
        }

        let mut board = pos.board.clone();
        let piece = match board.piece_at(mv.from) {
            Some(p) => p,
            None => continue,
        };
        board.set(mv.from, None);
        board.set(mv.to, Some(piece));
        if is_castling {
            if let Some((rook_from, rook_to)) = castling_rook_squares(mv) {
                let rook = board.piece_at(rook_from);
                board.set(rook_from, None);
                board.set(rook_to, rook);
            }
        }

        let king_now = if mv.from == king { mv.to } else { king };
        let mut scratch = pos.clone();
        scratch.board = board;
        scratch.side_to_move = !us;
        let exposed = pseudo_legal_moves(&scratch)
            .iter()
            .any(|reply| reply.to == king_now);
        if !exposed {
            legal.push(mv);
        }
    }
    Ok(legal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    fn has_move(moves: &[Move], from: &str, to: &str) -> bool {
        moves.contains(&Move::new(sq(from), sq(to)))
    }

    #[test]
    fn starting_position_has_20_moves() {
        let p = Position::starting();
        assert_eq!(pseudo_legal_moves(&p).len(), 20);
        assert_eq!(legal_moves(&p).unwrap().len(), 20);
    }

    #[test]
    fn pawn_double_push_needs_both_squares_empty() {
        // Knight on e3 blocks e2-e4 but also e2-e3.
        let p = pos("4k3/8/8/8/8/4n3/4P3/4K3 w - - 0 1");
        let moves = pseudo_legal_moves(&p);
        assert!(!has_move(&moves, "e2", "e3"));
        assert!(!has_move(&moves, "e2", "e4"));

        // Blocker on e4 only: single push stays available.
        let p = pos("4k3/8/8/8/4n3/8/4P3/4K3 w - - 0 1");
        let moves = pseudo_legal_moves(&p);
        assert!(has_move(&moves, "e2", "e3"));
        assert!(!has_move(&moves, "e2", "e4"));
    }

    #[test]
    fn pawn_captures_diagonally_only() {
        let p = pos("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1");
        let moves = pseudo_legal_moves(&p);
        assert!(has_move(&moves, "e4", "d5"));
        assert!(has_move(&moves, "e4", "e5"));
        assert!(!has_move(&moves, "e4", "f5")); // empty diagonal
    }

    #[test]
    fn no_en_passant_capture_is_generated() {
        // Black just played f7-f5 past the white e5 pawn; the en-passant
        // target square f6 is set but no capture onto it is offered.
        let p = pos("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
        assert_eq!(p.en_passant, Some(sq("f6")));
        let moves = legal_moves(&p).unwrap();
        assert!(!has_move(&moves, "e5", "f6"));
        assert!(has_move(&moves, "e5", "e6"));
    }

    #[test]
    fn castling_generated_with_empty_path() {
        let p = pos("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        let moves = legal_moves(&p).unwrap();
        assert!(has_move(&moves, "e1", "g1"));
        assert!(has_move(&moves, "e1", "c1"));
    }

    #[test]
    fn castling_requires_rights() {
        let p = pos("4k3/8/8/8/8/8/8/R3K2R w - - 0 1");
        let moves = legal_moves(&p).unwrap();
        assert!(!has_move(&moves, "e1", "g1"));
        assert!(!has_move(&moves, "e1", "c1"));
    }

    #[test]
    fn castling_blocked_by_pieces() {
        let p = pos("4k3/8/8/8/8/8/8/R2QK1NR w KQ - 0 1");
        let moves = legal_moves(&p).unwrap();
        assert!(!has_move(&moves, "e1", "g1")); // knight on g1
        assert!(!has_move(&moves, "e1", "c1")); // queen on d1
    }

    #[test]
    fn queenside_castling_ignores_b_file_square() {
        // A piece on b1 does not block queenside castling here; only the
        // d- and c-file squares are examined.
        let p = pos("4k3/8/8/8/8/8/8/RN2K3 w Q - 0 1");
        let moves = legal_moves(&p).unwrap();
        assert!(has_move(&moves, "e1", "c1"));
    }

    #[test]
    fn castling_through_attacked_square_rejected() {
        // The queen on a7 covers g1 along the a7-g1 diagonal, so kingside
        // castling would land the king on an attacked square.
        let p = pos("8/q7/8/8/8/8/8/4K2R w KQkq - 2 20");
        let moves = legal_moves(&p).unwrap();
        assert!(!has_move(&moves, "e1", "g1"));
        // Ordinary king steps to safe squares remain.
        assert!(has_move(&moves, "e1", "d1"));
    }

    #[test]
    fn castling_out_of_check_rejected() {
        let p = pos("4k3/8/8/8/8/8/4r3/4K2R w K - 0 1");
        let moves = legal_moves(&p).unwrap();
        assert!(!has_move(&moves, "e1", "g1"));
    }

    #[test]
    fn king_cannot_step_into_attack() {
        let p = pos("4k3/8/8/8/8/8/5r2/4K3 w - - 0 1");
        let moves = legal_moves(&p).unwrap();
        assert!(!has_move(&moves, "e1", "f1")); // rook's file
        assert!(!has_move(&moves, "e1", "e2")); // rook's rank
        assert!(has_move(&moves, "e1", "f2")); // rook is undefended
        assert!(has_move(&moves, "e1", "d1"));
    }

    #[test]
    fn pinned_piece_restricted_to_ray() {
        // Knight d4 pinned by rook d8 cannot move at all; rook e4 pinned
        // horizontally could still slide along the rank.
        let p = pos("3r4/8/8/8/3N4/8/8/3K4 w - - 0 1");
        let moves = legal_moves(&p).unwrap();
        assert!(moves.iter().all(|m| m.from != sq("d4")));
    }

    #[test]
    fn pinned_slider_moves_along_ray() {
        // Rook d4 pinned by rook d8 against king d1: may slide on the
        // d-file and capture the pinner, nothing else.
        let p = pos("3r4/8/8/8/3R4/8/8/3K4 w - - 0 1");
        let moves = legal_moves(&p).unwrap();
        assert!(has_move(&moves, "d4", "d8"));
        assert!(has_move(&moves, "d4", "d5"));
        assert!(!has_move(&moves, "d4", "e4"));
        assert!(!has_move(&moves, "d4", "a4"));
    }

    #[test]
    fn single_check_allows_block_capture_or_king_move() {
        // Rook e8 checks the king down the open e-file; the a4 rook can
        // interpose on e4, or the king can step off the file.
        let p = pos("4r3/8/8/8/R7/8/8/4K3 w - - 0 1");
        let moves = legal_moves(&p).unwrap();
        assert!(has_move(&moves, "a4", "e4")); // interpose
        assert!(has_move(&moves, "e1", "d2")); // step off the file
        assert!(!has_move(&moves, "e1", "e2")); // still on the checking ray
        assert!(!has_move(&moves, "a4", "a5")); // does not address the check
    }

    #[test]
    fn single_check_capture_of_checker() {
        // The checking rook on e2 is adjacent and undefended: the king
        // captures it. The a1 rook can neither block nor capture.
        let p = pos("4k3/8/8/8/8/8/4r3/R3K3 w - - 0 1");
        let moves = legal_moves(&p).unwrap();
        assert!(has_move(&moves, "e1", "e2"));
        assert!(moves.iter().all(|m| m.from != sq("a1")));
    }

    #[test]
    fn double_check_king_moves_only() {
        // Rook e8 and bishop a5 both check the king e1: even though the
        // rook could be blocked, only king moves are legal.
        let p = pos("4r3/8/8/b7/8/8/8/R3K3 w Q - 0 1");
        let checkers = attacks::king_attackers(&p.board, Color::White).unwrap();
        assert_eq!(checkers.len(), 2);
        let moves = legal_moves(&p).unwrap();
        assert!(moves.iter().all(|m| m.from == sq("e1")));
        assert!(!has_move(&moves, "e1", "c1")); // no castling out of check
    }

    #[test]
    fn checkmate_has_no_moves() {
        // Back-rank mate: queen b7 supported by rook b6 covers every
        // escape of the cornered king.
        let p = pos("K7/1q6/1r6/8/8/8/8/8 w - - 2 20");
        assert!(legal_moves(&p).unwrap().is_empty());
    }

    #[test]
    fn cornered_king_with_escape_is_not_mate() {
        // Rook b6 + queen c6 give check, but a7 is uncovered.
        let p = pos("K7/8/1rq5/8/8/8/8/8 w - - 2 20");
        let moves = legal_moves(&p).unwrap();
        assert!(has_move(&moves, "a8", "a7"));
    }

    #[test]
    fn stalemate_has_no_moves_and_no_check() {
        let p = pos("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1");
        assert!(legal_moves(&p).unwrap().is_empty());
        assert!(!attacks::in_check(&p.board, Color::Black).unwrap());
    }

    #[test]
    fn legal_moves_errors_while_promotion_pending() {
        let p = pos("k7/7P/8/8/8/8/p7/7K w - - 2 20");
        let mid = p.apply_move(Move::new(sq("h7"), sq("h8"))).unwrap();
        assert!(matches!(
            legal_moves(&mid),
            Err(ChessError::PromotionPending(_))
        ));
    }

    #[test]
    fn missing_king_reported() {
        let p = pos("8/8/8/3r4/8/8/3R4/8 w - - 0 1");
        assert!(matches!(
            legal_moves(&p),
            Err(ChessError::MissingKing(Color::White))
        ));
    }

    #[test]
    fn legal_moves_from_filters_by_origin() {
        let p = Position::starting();
        let knight_moves = legal_moves_from(&p, sq("g1")).unwrap();
        assert_eq!(knight_moves.len(), 2);
        assert!(has_move(&knight_moves, "g1", "f3"));
        assert!(has_move(&knight_moves, "g1", "h3"));
    }

    #[test]
    fn oracle_agrees_on_assorted_positions() {
        let fens = [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
            "4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1",
            "3r4/8/8/8/3R4/8/8/3K4 w - - 0 1",
            "4r3/8/8/8/R7/8/8/4K3 w - - 0 1",
            "4r3/8/8/b7/8/8/3P4/R3K3 w Q - 0 1",
            "8/q7/8/8/8/8/8/4K2R w KQkq - 2 20",
            "K7/8/1rq5/8/8/8/8/8 w - - 2 20",
            "k7/2K5/1Q6/8/8/8/8/8 b - - 0 1",
            "r3k2r/pppq1ppp/2npbn2/2b1p3/2B1P3/2NPBN2/PPPQ1PPP/R3K2R w KQkq - 6 8",
        ];
        for fen in fens {
            let p = pos(fen);
            let mut fast = legal_moves(&p).unwrap();
            let mut slow = legal_moves_oracle(&p).unwrap();
            fast.sort_by_key(|m| (m.from.0, m.to.0));
            slow.sort_by_key(|m| (m.from.0, m.to.0));
            assert_eq!(fast, slow, "filter mismatch for {fen}");
        }
    }
}
