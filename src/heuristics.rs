use crate::engine::{Direction, Fingerprint, Move, Orientation, Vehicle};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Scores a candidate move; lower scores are explored first.
///
/// The score depends only on the moving vehicle and the direction, never on the
/// rest of the board. Rules are checked top to bottom:
///
/// | Condition | Score |
/// |---|---|
/// | goal vehicle moving toward the exit (positive) | 1.0 |
/// | goal vehicle moving away from the exit | 3.5 |
/// | horizontal vehicle moving left | 3.0 |
/// | vertical truck (length 3) moving down | 2.0 |
/// | vertical car (length 2) moving up | 2.0 |
/// | anything else | 3.5 |
///
/// This is a per-move preference rather than a distance estimate, and it is not
/// admissible.
///
/// # Arguments
/// * `mv`: The move being scored.
/// * `vehicle`: Registry entry of the vehicle named by `mv`.
///
/// # Examples
/// ```
/// use rush_hour_solver::engine::{Direction, Move, Orientation, Vehicle};
/// use rush_hour_solver::heuristics::score_move;
///
/// let goal = Vehicle::new(5, 2, 0, Orientation::Horizontal, 2, true);
/// assert_eq!(score_move(&Move::new(5, Direction::Positive), &goal), 1.0);
/// assert_eq!(score_move(&Move::new(5, Direction::Negative), &goal), 3.5);
/// ```
pub fn score_move(mv: &Move, vehicle: &Vehicle) -> f64 {
    if vehicle.is_goal {
        return match mv.direction {
            Direction::Positive => 1.0,
            Direction::Negative => 3.5,
        };
    }
    match (vehicle.orientation, vehicle.length, mv.direction) {
        (Orientation::Horizontal, _, Direction::Negative) => 3.0,
        (Orientation::Vertical, 3, Direction::Positive) => 2.0,
        (Orientation::Vertical, 2, Direction::Negative) => 2.0,
        _ => 3.5,
    }
}

/// How the heuristic table resolves a state that is scored more than once.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum HeuristicPolicy {
    /// The most recent score replaces any earlier one.
    #[default]
    LastWriterWins,
    /// The first score recorded for a state is kept.
    FirstWriterWins,
    /// The smallest score seen for a state is kept.
    Minimum,
}

/// Heuristic score per discovered state.
///
/// A state reached by several moves, in one expansion or across expansions, is
/// scored once per move. Which of those scores survives is decided by the
/// table's [`HeuristicPolicy`]. With the default `LastWriterWins` policy a
/// state's score can get worse after it was queued, which may make the search
/// return a longer move sequence than necessary.
#[derive(Clone, Debug, Default)]
pub struct HeuristicTable {
    scores: HashMap<Fingerprint, f64>,
    policy: HeuristicPolicy,
}

impl HeuristicTable {
    pub fn new(policy: HeuristicPolicy) -> Self {
        HeuristicTable {
            scores: HashMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> HeuristicPolicy {
        self.policy
    }

    /// Records a score for `state` according to the policy.
    ///
    /// # Returns
    /// The score stored for `state` after the update.
    pub fn record(&mut self, state: Fingerprint, score: f64) -> f64 {
        let policy = self.policy;
        let stored = self
            .scores
            .entry(state)
            .and_modify(|current| match policy {
                HeuristicPolicy::LastWriterWins => *current = score,
                HeuristicPolicy::FirstWriterWins => {}
                HeuristicPolicy::Minimum => *current = current.min(score),
            })
            .or_insert(score);
        *stored
    }

    pub fn get(&self, state: &Fingerprint) -> Option<f64> {
        self.scores.get(state).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Board;

    fn mv(direction: Direction) -> Move {
        Move::new(1, direction)
    }

    fn vehicle(orientation: Orientation, length: usize, is_goal: bool) -> Vehicle {
        Vehicle::new(1, 0, 0, orientation, length, is_goal)
    }

    fn state(n: usize) -> Fingerprint {
        Board::new_empty(1, n).fingerprint()
    }

    #[test]
    fn test_goal_vehicle_scores() {
        let goal = vehicle(Orientation::Horizontal, 2, true);
        assert_eq!(score_move(&mv(Direction::Positive), &goal), 1.0);
        assert_eq!(score_move(&mv(Direction::Negative), &goal), 3.5);

        // The goal rule wins over the orientation rules.
        let vertical_goal = vehicle(Orientation::Vertical, 2, true);
        assert_eq!(score_move(&mv(Direction::Negative), &vertical_goal), 3.5);
        assert_eq!(score_move(&mv(Direction::Positive), &vertical_goal), 1.0);
    }

    #[test]
    fn test_horizontal_scores() {
        for length in [2, 3] {
            let car = vehicle(Orientation::Horizontal, length, false);
            assert_eq!(score_move(&mv(Direction::Negative), &car), 3.0);
            assert_eq!(score_move(&mv(Direction::Positive), &car), 3.5);
        }
    }

    #[test]
    fn test_vertical_scores() {
        let truck = vehicle(Orientation::Vertical, 3, false);
        assert_eq!(score_move(&mv(Direction::Positive), &truck), 2.0);
        assert_eq!(score_move(&mv(Direction::Negative), &truck), 3.5);

        let car = vehicle(Orientation::Vertical, 2, false);
        assert_eq!(score_move(&mv(Direction::Negative), &car), 2.0);
        assert_eq!(score_move(&mv(Direction::Positive), &car), 3.5);

        let odd = vehicle(Orientation::Vertical, 4, false);
        assert_eq!(score_move(&mv(Direction::Positive), &odd), 3.5);
        assert_eq!(score_move(&mv(Direction::Negative), &odd), 3.5);
    }

    #[test]
    fn test_last_writer_wins() {
        let mut table = HeuristicTable::default();
        assert_eq!(table.policy(), HeuristicPolicy::LastWriterWins);
        assert_eq!(table.record(state(1), 1.0), 1.0);
        assert_eq!(table.record(state(1), 3.5), 3.5);
        assert_eq!(table.record(state(2), 2.0), 2.0);
        assert_eq!(table.get(&state(1)), Some(3.5));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_first_writer_wins() {
        let mut table = HeuristicTable::new(HeuristicPolicy::FirstWriterWins);
        table.record(state(1), 3.0);
        assert_eq!(table.record(state(1), 1.0), 3.0);
        assert_eq!(table.get(&state(1)), Some(3.0));
    }

    #[test]
    fn test_minimum_policy() {
        let mut table = HeuristicTable::new(HeuristicPolicy::Minimum);
        table.record(state(1), 3.0);
        assert_eq!(table.record(state(1), 3.5), 3.0);
        assert_eq!(table.record(state(1), 1.0), 1.0);
        assert_eq!(table.get(&state(3)), None);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_policy_names() {
        let json = serde_json::to_string(&HeuristicPolicy::LastWriterWins).unwrap();
        assert_eq!(json, "\"last-writer-wins\"");
        let parsed: HeuristicPolicy = serde_json::from_str("\"minimum\"").unwrap();
        assert_eq!(parsed, HeuristicPolicy::Minimum);
    }
}
