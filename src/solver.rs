//! Best-first search over Rush Hour board states.
//!
//! The search keeps a min-heap frontier keyed by `heuristic + moves so far`,
//! a visited set of fingerprints, a heuristic table, and a transition graph
//! that records every expansion. Stale frontier entries (states already
//! expanded through a cheaper entry) are dropped when they are popped.
//!
//! Frontier ties are broken by the fingerprint text and then by the move
//! history, so the winning sequence is the same on every run.
use crate::engine::{Board, Fingerprint, GoalCell, Move, Orientation, Puzzle};
use crate::graph::TransitionGraph;
use crate::heap::{HeapOrder, PriorityQueue};
use crate::heuristics::{score_move, HeuristicPolicy, HeuristicTable};
use crate::{Solution, SolveError};
use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Placeholder heuristic of the initial state; above every move score.
pub const DEFAULT_INITIAL_HEURISTIC: f64 = 4.0;

const PROGRESS_INTERVAL: usize = 10_000;

/// Settings for one search.
///
/// Missing fields fall back to [`SearchConfig::default`] when deserializing, so a
/// JSON config file only needs to name what it changes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Left cell of the exit pair the goal vehicle must cover.
    pub goal: GoalCell,
    /// Heuristic value seeded for the initial state.
    pub initial_heuristic: f64,
    /// How repeated scores for one state are resolved.
    pub heuristic_policy: HeuristicPolicy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            goal: GoalCell::default(),
            initial_heuristic: DEFAULT_INITIAL_HEURISTIC,
            heuristic_policy: HeuristicPolicy::default(),
        }
    }
}

/// Where a [`Search`] is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchPhase {
    Initializing,
    Expanding,
    Solved,
    Exhausted,
}

/// Counters collected while searching.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// States popped from the frontier and expanded (the goal state is not counted).
    pub states_expanded: usize,
    /// Distinct states recorded in the transition graph.
    pub states_discovered: usize,
    /// Frontier entries dropped because their state was already visited.
    pub stale_entries: usize,
    /// Transitions recorded in the graph.
    pub transitions: usize,
}

/// Terminal result of a search.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchOutcome {
    /// The goal was reached.
    Solved(Solution),
    /// Every reachable state was expanded without reaching the goal.
    Exhausted(SearchStats),
}

impl SearchOutcome {
    /// Returns the winning moves, or `None` if there is no solution.
    pub fn moves(&self) -> Option<&[Move]> {
        match self {
            SearchOutcome::Solved(solution) => Some(&solution.moves),
            SearchOutcome::Exhausted(_) => None,
        }
    }

    pub fn is_solved(&self) -> bool {
        matches!(self, SearchOutcome::Solved(_))
    }

    pub fn stats(&self) -> &SearchStats {
        match self {
            SearchOutcome::Solved(solution) => &solution.stats,
            SearchOutcome::Exhausted(stats) => stats,
        }
    }
}

/// A discovered state together with the moves that led to it.
///
/// Ordered by fingerprint, then history; the frontier uses this to break
/// priority ties.
#[derive(Clone, Debug, PartialEq, PartialOrd)]
struct FrontierEntry {
    fingerprint: Fingerprint,
    history: Vec<Move>,
}

/// A single search over one puzzle.
///
/// The frontier, visited set, heuristic table, and transition graph all belong to
/// this value and are dropped with it. After [`Search::run`] returns, the graph
/// and heuristic table can still be inspected.
pub struct Search<'a> {
    puzzle: &'a Puzzle,
    config: SearchConfig,
    phase: SearchPhase,
    initial: Fingerprint,
    frontier: PriorityQueue<f64, FrontierEntry>,
    visited: HashSet<Fingerprint>,
    heuristics: HeuristicTable,
    graph: TransitionGraph<Fingerprint, Move>,
    stats: SearchStats,
}

impl<'a> Search<'a> {
    /// Creates a search in the `Initializing` phase. Nothing is explored until [`Search::run`].
    pub fn new(puzzle: &'a Puzzle, config: SearchConfig) -> Self {
        Search {
            puzzle,
            config,
            phase: SearchPhase::Initializing,
            initial: puzzle.board().fingerprint(),
            frontier: PriorityQueue::new(HeapOrder::Min),
            visited: HashSet::new(),
            heuristics: HeuristicTable::new(config.heuristic_policy),
            graph: TransitionGraph::new(),
            stats: SearchStats::default(),
        }
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Fingerprint of the puzzle's starting board.
    pub fn initial_fingerprint(&self) -> &Fingerprint {
        &self.initial
    }

    pub fn graph(&self) -> &TransitionGraph<Fingerprint, Move> {
        &self.graph
    }

    pub fn heuristics(&self) -> &HeuristicTable {
        &self.heuristics
    }

    pub fn stats(&self) -> SearchStats {
        let mut stats = self.stats;
        stats.states_discovered = self.graph.node_count();
        stats.transitions = self.graph.edge_count();
        stats
    }

    fn initialize(&mut self) {
        let board = self.puzzle.board();
        let goal = self.config.goal;
        info!(
            "Searching a {}x{} board with {} vehicles, goal vehicle {} to cell ({}, {}) and its right neighbour",
            board.rows(),
            board.cols(),
            self.puzzle.vehicles().len(),
            self.puzzle.goal_id(),
            goal.row,
            goal.col
        );
        let right_inside = goal.right_col().map_or(false, |c| c < board.cols());
        if goal.row >= board.rows() || !right_inside {
            warn!(
                "Goal cells starting at ({}, {}) lie outside the {}x{} board; the goal cannot be reached",
                goal.row,
                goal.col,
                board.rows(),
                board.cols()
            );
        }
        let goal_vehicle = self.puzzle.goal_vehicle();
        if goal_vehicle.orientation == Orientation::Vertical && goal_vehicle.length > 1 {
            warn!(
                "Goal vehicle {} is vertical and can never cover two cells of one row",
                goal_vehicle.id
            );
        }

        let initial = self.initial.clone();
        let h = self
            .heuristics
            .record(initial.clone(), self.config.initial_heuristic);
        self.graph.add_node(initial.clone());
        self.frontier.insert(
            h,
            FrontierEntry {
                fingerprint: initial,
                history: Vec::new(),
            },
        );
        self.phase = SearchPhase::Expanding;
    }

    /// Runs the search to a terminal phase.
    ///
    /// # Returns
    /// `SearchOutcome::Solved` with the move history of the first goal state popped,
    /// or `SearchOutcome::Exhausted` once the frontier runs dry.
    ///
    /// # Errors
    /// `SolveError::SearchFinished` if the search already ended; the other variants
    /// signal broken internal invariants.
    pub fn run(&mut self) -> Result<SearchOutcome, SolveError> {
        match self.phase {
            SearchPhase::Initializing => self.initialize(),
            SearchPhase::Expanding => {}
            SearchPhase::Solved | SearchPhase::Exhausted => return Err(SolveError::SearchFinished),
        }

        let goal_id = self.puzzle.goal_id();
        while !self.frontier.is_empty() {
            let (priority, entry) = self.frontier.pop_root()?;
            if !self.visited.insert(entry.fingerprint.clone()) {
                self.stats.stale_entries += 1;
                continue;
            }
            trace!(
                "Popped state at depth {} with priority {}",
                entry.history.len(),
                priority
            );

            let board = Board::from_fingerprint(&entry.fingerprint)?;
            if board.goal_reached(self.config.goal, goal_id) {
                self.phase = SearchPhase::Solved;
                let stats = self.stats();
                info!(
                    "Solved in {} move(s) after expanding {} states ({} discovered)",
                    entry.history.len(),
                    stats.states_expanded,
                    stats.states_discovered
                );
                return Ok(SearchOutcome::Solved(Solution {
                    moves: entry.history,
                    stats,
                }));
            }

            let discovered = self.expand(&entry.fingerprint, &board);
            self.stats.states_expanded += 1;
            if self.stats.states_expanded % PROGRESS_INTERVAL == 0 {
                debug!(
                    "Expanded {} states, {} discovered, frontier holds {}",
                    self.stats.states_expanded,
                    self.graph.node_count(),
                    self.frontier.len()
                );
            }

            for next in discovered {
                let label = *self.graph.label_to(&entry.fingerprint, &next).ok_or_else(|| {
                    SolveError::MissingTransition {
                        from: entry.fingerprint.to_string(),
                        to: next.to_string(),
                    }
                })?;
                let mut history = entry.history.clone();
                history.push(label);
                let h = self
                    .heuristics
                    .get(&next)
                    .unwrap_or(self.config.initial_heuristic);
                let priority = h + history.len() as f64;
                self.frontier.insert(
                    priority,
                    FrontierEntry {
                        fingerprint: next,
                        history,
                    },
                );
            }
        }

        self.phase = SearchPhase::Exhausted;
        let stats = self.stats();
        info!(
            "No solution: exhausted {} reachable states",
            stats.states_expanded
        );
        Ok(SearchOutcome::Exhausted(stats))
    }

    /// Generates every legal move from `current`, vehicles by ascending id, and
    /// records each transition and heuristic score.
    ///
    /// # Returns
    /// The resulting fingerprints in generation order.
    fn expand(&mut self, current: &Fingerprint, board: &Board) -> Vec<Fingerprint> {
        let mut discovered = Vec::new();
        for vehicle in self.puzzle.vehicles().iter() {
            for (next, mv) in board.legal_moves(vehicle) {
                self.graph.add_edge(current.clone(), next.clone(), mv);
                self.heuristics.record(next.clone(), score_move(&mv, vehicle));
                discovered.push(next);
            }
        }
        discovered
    }
}

/// Solves a puzzle with the given configuration.
///
/// # Examples
/// ```
/// use rush_hour_solver::engine::{Direction, GoalCell, Move};
/// use rush_hour_solver::solver::{solve, SearchConfig};
/// use rush_hour_solver::utils::puzzle_from_grid;
///
/// let puzzle = puzzle_from_grid(&[
///     vec![-1, -1, -1, -1],
///     vec![0, 0, -1, 1],
///     vec![-1, -1, -1, 1],
///     vec![-1, -1, -1, -1],
/// ], 0).unwrap();
/// let config = SearchConfig { goal: GoalCell::new(1, 2), ..SearchConfig::default() };
///
/// let outcome = solve(&puzzle, &config).unwrap();
/// let moves = outcome.moves().unwrap();
/// assert!(puzzle.replay(moves).unwrap().is_solved(config.goal));
/// assert_eq!(moves.last(), Some(&Move::new(0, Direction::Positive)));
/// ```
pub fn solve(puzzle: &Puzzle, config: &SearchConfig) -> Result<SearchOutcome, SolveError> {
    Search::new(puzzle, *config).run()
}
