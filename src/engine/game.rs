//! Stateful game controller wrapping `Position`.
//!
//! `Game` manages the move history, the undo stack and game status
//! detection (check, checkmate, stalemate, draws, pending promotion).
//! Because positions are immutable values, undo is just popping the
//! previous position off the history.

use rand::Rng;
use tracing::debug;

use crate::ai::evaluation::Params;
use crate::ai::search::Searcher;
use crate::config::EngineConfig;
use crate::engine::board::Position;
use crate::engine::{attacks, movegen};
use crate::engine::types::{
    ChessError, Color, DrawReason, GameStatus, Move, PieceType, Square,
};

/// A complete chess game with history, undo and status tracking.
#[derive(Clone)]
pub struct Game {
    position: Position,
    /// Previous positions, oldest first. Undo pops the last entry.
    history: Vec<Position>,
    status: GameStatus,
    config: EngineConfig,
}

impl Game {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// A new game from the standard starting position.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// A new game from a FEN string. Positions whose side to move has no
    /// king are rejected with `MissingKing`.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        Self::from_position(Position::from_fen(fen)?, EngineConfig::default())
    }

    /// A new game with explicit engine configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        // The starting position has both kings, so status computation
        // cannot fail on it.
        Self::from_position(Position::starting(), config.clone()).unwrap_or_else(|_| Game {
            position: Position::starting(),
            history: Vec::new(),
            status: GameStatus::Active,
            config,
        })
    }

    fn from_position(position: Position, config: EngineConfig) -> Result<Self, ChessError> {
        let mut game = Game {
            position,
            history: Vec::new(),
            status: GameStatus::Active,
            config,
        };
        game.status = game.compute_status()?;
        Ok(game)
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn status(&self) -> &GameStatus {
        &self.status
    }

    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move
    }

    pub fn to_fen(&self) -> String {
        self.position.to_fen()
    }

    pub fn is_game_over(&self) -> bool {
        self.status.is_game_over()
    }

    /// Number of half-moves played (promotion counts with its pawn move).
    pub fn ply(&self) -> usize {
        self.history.len()
    }

    /// Legal moves in the current position.
    pub fn legal_moves(&self) -> Result<Vec<Move>, ChessError> {
        movegen::legal_moves(&self.position)
    }

    /// Legal moves from one square.
    pub fn legal_moves_from(&self, from: Square) -> Result<Vec<Move>, ChessError> {
        movegen::legal_moves_from(&self.position, from)
    }

    // -----------------------------------------------------------------
    // Playing
    // -----------------------------------------------------------------

    /// Play a move after validating it against the legal move list.
    pub fn make_move(&mut self, mv: Move) -> Result<&GameStatus, ChessError> {
        if self.is_game_over() {
            return Err(ChessError::GameOver(self.status.to_string()));
        }
        if !movegen::legal_moves(&self.position)?.contains(&mv) {
            return Err(ChessError::InvalidMove {
                from: mv.from,
                to: mv.to,
                reason: "not a legal move in this position".to_string(),
            });
        }
        let next = self.position.apply_move(mv)?;
        self.history.push(std::mem::replace(&mut self.position, next));
        self.status = self.compute_status()?;
        debug!(%mv, status = %self.status, "move played");
        Ok(&self.status)
    }

    /// Resolve a pending promotion.
    pub fn promote(&mut self, sq: Square, kind: PieceType) -> Result<&GameStatus, ChessError> {
        // The pawn move and its promotion form one turn: the pawn move
        // already pushed a history entry, so none is added here.
        self.position = self.position.promote_pawn(sq, kind)?;
        self.status = self.compute_status()?;
        debug!(square = %sq, piece = %kind, status = %self.status, "promotion resolved");
        Ok(&self.status)
    }

    /// Take back the last turn.
    pub fn undo_move(&mut self) -> Result<(), ChessError> {
        let previous = self.history.pop().ok_or(ChessError::NothingToUndo)?;
        self.position = previous;
        self.status = self.compute_status()?;
        Ok(())
    }

    /// Replace the current state with a position parsed from FEN. History
    /// is cleared; on error the game is left untouched.
    pub fn load_fen(&mut self, fen: &str) -> Result<(), ChessError> {
        let position = Position::from_fen(fen)?;
        *self = Self::from_position(position, self.config.clone())?;
        Ok(())
    }

    /// Pick a move for the side to move by fixed-depth search.
    pub fn choose_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Option<Move>, ChessError> {
        if self.is_game_over() {
            return Ok(None);
        }
        self.searcher()
            .best_move(&self.position, self.config.search_depth, rng)
    }

    /// Searcher configured from the game's engine settings.
    fn searcher(&self) -> Searcher {
        Searcher::with_params(Params {
            king_proximity_bonus: self.config.king_proximity_bonus,
        })
    }

    // -----------------------------------------------------------------
    // Status
    // -----------------------------------------------------------------

    fn compute_status(&self) -> Result<GameStatus, ChessError> {
        if let Some(sq) = self.position.pending_promotion {
            return Ok(GameStatus::AwaitingPromotion(sq));
        }

        let us = self.position.side_to_move;
        let in_check = attacks::in_check(&self.position.board, us)?;
        let has_moves = !movegen::legal_moves(&self.position)?.is_empty();

        if !has_moves {
            return Ok(if in_check {
                GameStatus::Checkmate
            } else {
                GameStatus::Stalemate
            });
        }
        if self.position.halfmove_clock >= 100 {
            return Ok(GameStatus::Draw(DrawReason::FiftyMoveRule));
        }
        if self.insufficient_material() {
            return Ok(GameStatus::Draw(DrawReason::InsufficientMaterial));
        }
        Ok(if in_check {
            GameStatus::Check
        } else {
            GameStatus::Active
        })
    }

    /// Neither side can possibly deliver mate: bare kings, or king plus a
    /// single minor piece against a bare king.
    fn insufficient_material(&self) -> bool {
        let mut minors = 0;
        for (_, piece) in self.position.board.occupied() {
            match piece.kind {
                PieceType::King => {}
                PieceType::Knight | PieceType::Bishop => minors += 1,
                _ => return false,
            }
        }
        minors <= 1
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
