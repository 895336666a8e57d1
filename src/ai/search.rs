//! Fixed-depth search.
//!
//! Two interchangeable tree walks over the same scoring: plain negamax
//! and fail-hard alpha-beta. Both return the score of a position from
//! its side-to-move's perspective, and for any position and depth they
//! return the same value — alpha-beta only prunes lines that cannot
//! change the result.
//!
//! At the root, candidate moves are scored from the opponent's
//! perspective, so *lower* is better for the mover; ties are broken
//! uniformly at random with a caller-supplied RNG.

use std::time::Instant;

use rand::prelude::IndexedRandom;
use rand::Rng;
use tracing::debug;

use crate::ai::evaluation::{self, Params, INF, MATE};
use crate::engine::attacks;
use crate::engine::board::Position;
use crate::engine::movegen;
use crate::engine::types::{ChessError, Move, PieceType};

/// Fixed-depth searcher.
#[derive(Clone, Debug, Default)]
pub struct Searcher {
    params: Params,
}

impl Searcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: Params) -> Self {
        Searcher { params }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Score a position by full-width negamax.
    pub fn negamax(&self, pos: &Position, depth: u32) -> Result<i32, ChessError> {
        let mut nodes = 0u64;
        self.negamax_inner(pos, depth, &mut nodes)
    }

    fn negamax_inner(
        &self,
        pos: &Position,
        depth: u32,
        nodes: &mut u64,
    ) -> Result<i32, ChessError> {
        *nodes += 1;
        let moves = movegen::legal_moves(pos)?;
        if moves.is_empty() {
            return Ok(self.terminal_score(pos)?);
        }
        if depth == 0 {
            return Ok(evaluation::evaluate_with(
                &pos.board,
                pos.side_to_move,
                &self.params,
            ));
        }

        let mut best = -INF;
        for mv in moves {
            let child = self.advance(pos, mv)?;
            let score = -self.negamax_inner(&child, depth - 1, nodes)?;
            best = best.max(score);
        }
        Ok(best)
    }

    /// Score a position by fail-hard alpha-beta. Agrees with `negamax`
    /// for every position and depth.
    pub fn alpha_beta(
        &self,
        pos: &Position,
        alpha: i32,
        beta: i32,
        depth: u32,
    ) -> Result<i32, ChessError> {
        let mut nodes = 0u64;
        self.alpha_beta_inner(pos, alpha, beta, depth, &mut nodes)
    }

    fn alpha_beta_inner(
        &self,
        pos: &Position,
        mut alpha: i32,
        beta: i32,
        depth: u32,
        nodes: &mut u64,
    ) -> Result<i32, ChessError> {
        *nodes += 1;
        let moves = movegen::legal_moves(pos)?;
        if moves.is_empty() {
            // Fail-hard: even terminal scores stay inside the window.
            return Ok(self.terminal_score(pos)?.clamp(alpha, beta));
        }
        if depth == 0 {
            let eval =
                evaluation::evaluate_with(&pos.board, pos.side_to_move, &self.params);
            return Ok(eval.clamp(alpha, beta));
        }

        for mv in moves {
            let child = self.advance(pos, mv)?;
            let score = -self.alpha_beta_inner(&child, -beta, -alpha, depth - 1, nodes)?;
            if score >= beta {
                return Ok(beta);
            }
            alpha = alpha.max(score);
        }
        Ok(alpha)
    }

    /// No legal moves: mate if in check, stalemate otherwise.
    fn terminal_score(&self, pos: &Position) -> Result<i32, ChessError> {
        if attacks::in_check(&pos.board, pos.side_to_move)? {
            Ok(-MATE)
        } else {
            Ok(0)
        }
    }

    /// Apply a move, resolving any resulting promotion to a queen so the
    /// search never sees the half-finished sub-state.
    fn advance(&self, pos: &Position, mv: Move) -> Result<Position, ChessError> {
        let next = pos.apply_move(mv)?;
        match next.pending_promotion {
            Some(sq) => next.promote_pawn(sq, PieceType::Queen),
            None => Ok(next),
        }
    }

    /// Pick the best move for the side to move, breaking ties uniformly
    /// at random. Returns `None` when there is no legal move.
    pub fn best_move<R: Rng + ?Sized>(
        &self,
        pos: &Position,
        depth: u32,
        rng: &mut R,
    ) -> Result<Option<Move>, ChessError> {
        let started = Instant::now();
        let moves = movegen::legal_moves(pos)?;
        if moves.is_empty() {
            return Ok(None);
        }

        let mut nodes = 0u64;
        let mut best = INF;
        let mut scored = Vec::with_capacity(moves.len());
        for mv in moves {
            let child = self.advance(pos, mv)?;
            // Scored from the opponent's perspective: lower is better.
            let score = self.alpha_beta_inner(
                &child,
                -INF,
                INF,
                depth.saturating_sub(1),
                &mut nodes,
            )?;
            best = best.min(score);
            scored.push((mv, score));
        }

        let candidates: Vec<Move> = scored
            .into_iter()
            .filter_map(|(mv, score)| (score == best).then_some(mv))
            .collect();
        let chosen = candidates.choose(rng).copied();

        debug!(
            depth,
            nodes,
            candidates = candidates.len(),
            score = best,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search finished"
        );
        Ok(chosen)
    }

    /// Pick a uniformly random legal move.
    pub fn random_move<R: Rng + ?Sized>(
        &self,
        pos: &Position,
        rng: &mut R,
    ) -> Result<Option<Move>, ChessError> {
        Ok(movegen::legal_moves(pos)?.choose(rng).copied())
    }
}
