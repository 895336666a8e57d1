//! A chess rules-and-search engine on a mailbox board.
//!
//! The crate is split the same way the code is used:
//!
//! - [`engine`] holds the rules: board representation, FEN codec, move
//!   generation with full legality filtering (check, pin, double-check,
//!   castling-through-attack), and pure state transitions.
//! - [`ai`] holds the player: a static evaluator (material + piece-square
//!   tables with endgame phase detection) and a fixed-depth negamax /
//!   alpha-beta search with a randomized tie-break at the root.
//!
//! Positions are immutable values: every transition returns a new
//! [`Position`], so sharing and undo need no synchronization or bookkeeping.
//!
//! ```
//! use mailbox_chess::engine::{movegen, Position};
//!
//! let pos = Position::starting();
//! assert_eq!(movegen::legal_moves(&pos).unwrap().len(), 20);
//! ```

pub mod ai;
pub mod config;
pub mod engine;

pub use ai::evaluation::evaluate;
pub use ai::search::Searcher;
pub use config::EngineConfig;
pub use engine::board::{Board, Position};
pub use engine::game::Game;
pub use engine::types::{
    CastlingRights, ChessError, Color, GameStatus, Move, Piece, PieceType, Square,
};
