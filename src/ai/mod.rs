//! The engine's player: static evaluation and fixed-depth search.

pub mod evaluation;
pub mod search;

pub use evaluation::{evaluate, Params};
pub use search::Searcher;
