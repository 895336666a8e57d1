//! Mailbox chess position representation.
//!
//! `Board` is a plain 64-element array of optional pieces; `Position` adds
//! side to move, castling rights, en-passant square, move counters and the
//! pending-promotion marker. All transitions are pure: `apply_move` and
//! `promote_pawn` return a new `Position` and leave the input untouched.

use std::fmt;

use crate::engine::types::{
    CastlingRights, ChessError, Color, Move, Piece, PieceType, Square,
};

/// FEN for the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// Piece placement only: one `Option<Piece>` per square, a1 = 0, h8 = 63
/// (rank-major).
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    squares: [Option<Piece>; 64],
}

impl Board {
    /// An empty board.
    pub fn empty() -> Self {
        Board {
            squares: [None; 64],
        }
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.0 as usize]
    }

    #[inline]
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        self.squares[sq.0 as usize] = piece;
    }

    /// Locate the king of the given color, if present.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.occupied().find_map(|(sq, piece)| {
            (piece.kind == PieceType::King && piece.color == color).then_some(sq)
        })
    }

    /// Iterate over all occupied squares.
    pub fn occupied(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.squares
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.map(|piece| (Square(i as u8), piece)))
    }

    /// Iterate over the squares occupied by one side.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.occupied().filter(move |(_, p)| p.color == color)
    }

    /// ASCII rendering with rank/file labels, rank 8 on top.
    pub fn board_string(&self) -> String {
        let mut s = String::new();
        for rank in (0..8).rev() {
            s.push_str(&format!("{} ", rank + 1));
            for file in 0..8 {
                let sq = Square::from_file_rank(file, rank);
                match self.piece_at(sq) {
                    Some(p) => s.push(p.kind.to_char(p.color)),
                    None => s.push('.'),
                }
                s.push(' ');
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h\n");
        s
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board_string())
    }
}

// ---------------------------------------------------------------------------
// Castling bookkeeping
// ---------------------------------------------------------------------------

/// Per-square castling-rights mask. Moving a piece from (or capturing on) a
/// square ANDs the rights with its mask, so king and rook home squares
/// strip the affected rights and every other square is a no-op.
const CASTLING_MASK: [u8; 64] = {
    let mut mask = [0b1111u8; 64];
    mask[0] = 0b1101; // a1: White queenside rook
    mask[4] = 0b1100; // e1: White king
    mask[7] = 0b1110; // h1: White kingside rook
    mask[56] = 0b0111; // a8: Black queenside rook
    mask[60] = 0b0011; // e8: Black king
    mask[63] = 0b1011; // h8: Black kingside rook
    mask
};

/// For a castling king move, the rook's from/to squares, derived from the
/// king's destination alone.
pub fn castling_rook_squares(mv: Move) -> Option<(Square, Square)> {
    match mv.file_span() {
        2 => Some((Square(mv.to.0 + 1), Square(mv.to.0 - 1))),
        -2 => Some((Square(mv.to.0 - 2), Square(mv.to.0 + 1))),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A complete game state: placement plus everything FEN carries, plus the
/// pending-promotion marker for the two-call promotion protocol.
#[derive(Clone, PartialEq, Eq)]
pub struct Position {
    pub board: Board,
    pub side_to_move: Color,
    pub castling_rights: CastlingRights,
    /// En-passant target square (the square behind a double-pushed pawn).
    /// Tracked and round-tripped through FEN, but no capture is generated
    /// from it.
    pub en_passant: Option<Square>,
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
    /// When a pawn reaches the last rank the turn stays with the mover
    /// until `promote_pawn` supplies the replacement piece.
    pub pending_promotion: Option<Square>,
}

impl Position {
    /// An empty position, White to move.
    pub fn empty() -> Self {
        Position {
            board: Board::empty(),
            side_to_move: Color::White,
            castling_rights: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            pending_promotion: None,
        }
    }

    /// The standard starting position.
    pub fn starting() -> Self {
        // STARTING_FEN is well-formed by construction.
        Self::from_fen(STARTING_FEN).unwrap_or_else(|_| Self::empty())
    }

    // -- FEN decoding -------------------------------------------------------

    /// Parse a FEN string into a position.
    ///
    /// Each of the six fields is validated separately and errors name the
    /// offending field. King presence is *not* enforced here: sparse test
    /// positions without kings parse fine, and operations that need a king
    /// report `MissingKing` instead.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(ChessError::InvalidFen {
                field: "record",
                value: fen.to_string(),
                message: format!("expected 6 fields, got {}", fields.len()),
            });
        }

        let board = Self::parse_placement(fields[0])?;
        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(ChessError::InvalidFen {
                    field: "side to move",
                    value: other.to_string(),
                    message: "expected 'w' or 'b'".to_string(),
                })
            }
        };
        let castling_rights =
            CastlingRights::from_fen(fields[2]).ok_or_else(|| ChessError::InvalidFen {
                field: "castling",
                value: fields[2].to_string(),
                message: "expected '-' or a subset of KQkq".to_string(),
            })?;
        let en_passant = match fields[3] {
            "-" => None,
            s => Some(
                Square::from_algebraic(s).ok_or_else(|| ChessError::InvalidFen {
                    field: "en passant",
                    value: s.to_string(),
                    message: "expected '-' or a square like e3".to_string(),
                })?,
            ),
        };
        let halfmove_clock = fields[4].parse().map_err(|_| ChessError::InvalidFen {
            field: "halfmove clock",
            value: fields[4].to_string(),
            message: "expected a non-negative integer".to_string(),
        })?;
        let fullmove_number = fields[5].parse().map_err(|_| ChessError::InvalidFen {
            field: "fullmove number",
            value: fields[5].to_string(),
            message: "expected a positive integer".to_string(),
        })?;

        Ok(Position {
            board,
            side_to_move,
            castling_rights,
            en_passant,
            halfmove_clock,
            fullmove_number,
            pending_promotion: None,
        })
    }

    fn parse_placement(placement: &str) -> Result<Board, ChessError> {
        let invalid = |message: String| ChessError::InvalidFen {
            field: "placement",
            value: placement.to_string(),
            message,
        };

        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(invalid(format!("expected 8 ranks, got {}", ranks.len())));
        }

        let mut board = Board::empty();
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if skip == 0 || skip > 8 {
                        return Err(invalid(format!("invalid skip count '{c}'")));
                    }
                    file += skip as u8;
                } else {
                    let (color, kind) = PieceType::from_char(c)
                        .ok_or_else(|| invalid(format!("unknown piece character '{c}'")))?;
                    if file > 7 {
                        return Err(invalid(format!("rank {} overflows 8 files", rank + 1)));
                    }
                    board.set(Square::from_file_rank(file, rank), Some(Piece::new(kind, color)));
                    file += 1;
                }
            }
            if file != 8 {
                return Err(invalid(format!(
                    "rank {} describes {file} files, expected 8",
                    rank + 1
                )));
            }
        }
        Ok(board)
    }

    // -- FEN encoding -------------------------------------------------------

    /// Serialize to a FEN string.
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                let sq = Square::from_file_rank(file, rank);
                match self.board.piece_at(sq) {
                    Some(p) => {
                        if empty > 0 {
                            fen.push_str(&empty.to_string());
                            empty = 0;
                        }
                        fen.push(p.kind.to_char(p.color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        let side = match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        };
        let ep = match self.en_passant {
            Some(sq) => sq.to_algebraic(),
            None => "-".to_string(),
        };
        format!(
            "{fen} {side} {} {ep} {} {}",
            self.castling_rights.to_fen(),
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    // -- Transitions --------------------------------------------------------

    /// Apply a move and return the resulting position.
    ///
    /// The move is trusted to be legal; legality checking lives in the
    /// move generator. Castling is recognized by the king's two-file
    /// displacement and relocates the rook as part of the same transition.
    /// A pawn reaching the last rank leaves the position in the
    /// pending-promotion sub-state: the side to move and the fullmove
    /// number do not advance until `promote_pawn` is called.
    pub fn apply_move(&self, mv: Move) -> Result<Position, ChessError> {
        if let Some(sq) = self.pending_promotion {
            return Err(ChessError::PromotionPending(sq));
        }
        let piece = self
            .board
            .piece_at(mv.from)
            .ok_or_else(|| ChessError::InvalidMove {
                from: mv.from,
                to: mv.to,
                reason: "no piece on the from-square".to_string(),
            })?;
        if piece.color != self.side_to_move {
            return Err(ChessError::InvalidMove {
                from: mv.from,
                to: mv.to,
                reason: format!("it is {}'s turn", self.side_to_move),
            });
        }

        let captured = self.board.piece_at(mv.to);
        let mut next = self.clone();

        next.board.set(mv.from, None);
        next.board.set(mv.to, Some(piece));

        // Castling: relocate the rook alongside the king.
        if piece.kind == PieceType::King {
            if let Some((rook_from, rook_to)) = castling_rook_squares(mv) {
                let rook = next.board.piece_at(rook_from);
                next.board.set(rook_from, None);
                next.board.set(rook_to, rook);
            }
        }

        // Rights decay when king or rook squares are touched, whether by
        // moving off them or capturing onto them.
        next.castling_rights = CastlingRights(
            self.castling_rights.0
                & CASTLING_MASK[mv.from.0 as usize]
                & CASTLING_MASK[mv.to.0 as usize],
        );

        // En-passant target appears behind a double pawn push and expires
        // after one ply.
        next.en_passant = if piece.kind == PieceType::Pawn
            && (mv.to.0 as i16 - mv.from.0 as i16).abs() == 16
        {
            Some(Square((mv.from.0 + mv.to.0) / 2))
        } else {
            None
        };

        next.halfmove_clock = if piece.kind == PieceType::Pawn || captured.is_some() {
            0
        } else {
            self.halfmove_clock + 1
        };

        let last_rank = match piece.color {
            Color::White => 7,
            Color::Black => 0,
        };
        if piece.kind == PieceType::Pawn && mv.to.rank() == last_rank {
            // The turn stays open until the promotion piece is chosen.
            next.pending_promotion = Some(mv.to);
        } else {
            next.side_to_move = !self.side_to_move;
            if self.side_to_move == Color::Black {
                next.fullmove_number += 1;
            }
        }

        Ok(next)
    }

    /// Resolve a pending promotion by replacing the pawn on `sq` with the
    /// chosen piece, then hand the turn over.
    pub fn promote_pawn(&self, sq: Square, kind: PieceType) -> Result<Position, ChessError> {
        match self.pending_promotion {
            Some(pending) if pending == sq => {}
            _ => return Err(ChessError::NoPromotionPending(sq)),
        }
        if matches!(kind, PieceType::Pawn | PieceType::King) {
            return Err(ChessError::InvalidPromotion(kind));
        }

        let mut next = self.clone();
        next.board
            .set(sq, Some(Piece::new(kind, self.side_to_move)));
        next.pending_promotion = None;
        next.side_to_move = !self.side_to_move;
        if self.side_to_move == Color::Black {
            next.fullmove_number += 1;
        }
        Ok(next)
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.to_fen(), self.board.board_string())
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board.board_string())
    }
}
