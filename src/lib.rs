//! # Rush Hour Solver Library
//!
//! This library finds a short sequence of single-cell vehicle moves that frees
//! the goal vehicle of a Rush Hour sliding-block puzzle. It runs a heuristic
//! best-first (A*-style) search over board states that are generated on the fly.
//!
//! It is used by two binaries:
//! - `ai_solver`: Loads a `.board` file, solves it, and writes the winning moves
//!   to a `.sol` file.
//! - `heuristic_evaluator`: Compares heuristic-table policies on seeded,
//!   scrambled boards.
//!
//! ## Modules
//! - `engine`: Vehicles, the occupancy `Board`, fingerprints, moves, the goal test,
//!   and the validated `Puzzle`.
//! - `heuristics`: The per-move scoring rules and the `HeuristicTable`.
//! - `heap`: A generic binary heap used as the search frontier.
//! - `graph`: A labelled directed multigraph that records discovered transitions.
//! - `solver`: The search engine itself (`solve`, `Search`, `SearchConfig`).
//! - `utils`: Board-file loading, solution files, grid literals, and scrambling.

pub mod engine;
pub mod graph;
pub mod heap;
pub mod heuristics;
pub mod solver;
pub mod utils;

use crate::engine::{BoardError, Move};
use crate::heap::HeapError;
use crate::solver::SearchStats;
use serde::Serialize;
use std::fmt;

/// Represents a solution found by the solver.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Solution {
    /// The moves leading from the initial board to the goal, in order.
    /// Empty if the initial board already satisfies the goal.
    pub moves: Vec<Move>,
    /// Counters describing the search that produced these moves.
    pub stats: SearchStats,
}

impl Solution {
    /// The number of moves in the solution.
    pub fn steps(&self) -> usize {
        self.moves.len()
    }
}

/// Represents the reasons why a solve attempt might fail.
///
/// An unsolvable but valid board is not an error; see
/// [`solver::SearchOutcome::Exhausted`].
#[derive(Clone, Debug, PartialEq)]
pub enum SolveError {
    /// The board, or a state decoded during the search, is malformed.
    InvalidBoard(BoardError),
    /// The frontier was read while empty.
    Frontier(HeapError),
    /// A discovered state has no recorded edge from the state that produced it.
    MissingTransition { from: String, to: String },
    /// `run` was called on a search that already reached a terminal phase.
    SearchFinished,
}

impl std::error::Error for SolveError {}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::InvalidBoard(err) => write!(f, "Invalid board: {}", err),
            SolveError::Frontier(err) => write!(f, "Frontier error: {}", err),
            SolveError::MissingTransition { from, to } => {
                write!(f, "No recorded transition from {} to {}", from, to)
            }
            SolveError::SearchFinished => write!(f, "The search has already finished"),
        }
    }
}

impl From<BoardError> for SolveError {
    fn from(err: BoardError) -> Self {
        SolveError::InvalidBoard(err)
    }
}

impl From<HeapError> for SolveError {
    fn from(err: HeapError) -> Self {
        SolveError::Frontier(err)
    }
}
