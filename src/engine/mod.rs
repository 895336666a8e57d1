//! Chess rules: board state, geometry, attacks, move generation and the
//! game controller.

pub mod attacks;
pub mod board;
pub mod game;
pub mod geometry;
pub mod movegen;
pub mod types;

pub use board::{Board, Position};
pub use game::Game;
pub use movegen::{legal_moves, legal_moves_from, legal_moves_oracle, pseudo_legal_moves};
pub use types::*;
