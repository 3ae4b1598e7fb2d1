//! Board model and move generation for the Rush Hour puzzle.
//!
//! This module defines the puzzle's fundamental components:
//! - `Vehicle` and `VehicleRegistry`: the cars and trucks on the board, keyed by id.
//! - `Cell` and `Board`: the occupancy grid that changes as vehicles slide.
//! - `Fingerprint`: the canonical serialized form of a `Board`, used as a state id.
//! - `Move`: a one-cell shift of a single vehicle along its own axis.
//! - `Puzzle`: a validated board together with its vehicle registry.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a vehicle on the board.
pub type VehicleId = u32;

/// The axis a vehicle is allowed to slide along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// Occupies one row, slides left (negative) and right (positive).
    Horizontal,
    /// Occupies one column, slides up (negative) and down (positive).
    Vertical,
}

/// Direction of a one-cell shift along a vehicle's axis.
///
/// Serialized as the integers `-1` and `1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Direction {
    /// Toward row/column zero.
    Negative,
    /// Away from row/column zero.
    Positive,
}

impl Direction {
    /// Both directions in the order moves are generated: negative first.
    pub const ALL: [Direction; 2] = [Direction::Negative, Direction::Positive];

    /// Returns the signed cell offset of this direction.
    ///
    /// # Examples
    /// ```
    /// use rush_hour_solver::engine::Direction;
    /// assert_eq!(Direction::Negative.offset(), -1);
    /// assert_eq!(Direction::Positive.offset(), 1);
    /// ```
    pub fn offset(self) -> isize {
        match self {
            Direction::Negative => -1,
            Direction::Positive => 1,
        }
    }

    /// Returns the opposite direction.
    pub fn reversed(self) -> Direction {
        match self {
            Direction::Negative => Direction::Positive,
            Direction::Positive => Direction::Negative,
        }
    }
}

impl From<Direction> for i8 {
    fn from(direction: Direction) -> i8 {
        direction.offset() as i8
    }
}

impl TryFrom<i8> for Direction {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Direction::Negative),
            1 => Ok(Direction::Positive),
            other => Err(format!("Invalid direction {}, expected 1 or -1", other)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.offset())
    }
}

/// A single-cell shift of one vehicle.
///
/// Moves order by vehicle id, then direction with negative first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Move {
    /// The vehicle being moved.
    pub vehicle: VehicleId,
    /// Which way it slides along its own axis.
    pub direction: Direction,
}

impl Move {
    pub fn new(vehicle: VehicleId, direction: Direction) -> Self {
        Move { vehicle, direction }
    }

    /// Returns the move that undoes this one.
    pub fn reversed(&self) -> Move {
        Move::new(self.vehicle, self.direction.reversed())
    }
}

impl fmt::Display for Move {
    /// Formats the move as `id,direction`, the line format of solution files.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.vehicle, self.direction)
    }
}

/// Content of one board cell.
///
/// Serialized as `-1` for an empty cell and as the vehicle id otherwise, which
/// is what makes a serialized grid readable as a plain integer matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum Cell {
    Empty,
    Occupied(VehicleId),
}

impl Cell {
    /// Returns the id of the vehicle in this cell, if any.
    pub fn vehicle(self) -> Option<VehicleId> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(id) => Some(id),
        }
    }

    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

impl From<Cell> for i64 {
    fn from(cell: Cell) -> i64 {
        match cell {
            Cell::Empty => -1,
            Cell::Occupied(id) => i64::from(id),
        }
    }
}

impl TryFrom<i64> for Cell {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value == -1 {
            return Ok(Cell::Empty);
        }
        VehicleId::try_from(value)
            .map(Cell::Occupied)
            .map_err(|_| format!("Invalid cell value {}", value))
    }
}

/// A car or truck as described by the puzzle loader.
///
/// `row` and `col` locate the vehicle's upper-left cell. A vehicle never
/// changes its orientation or length.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub row: usize,
    pub col: usize,
    pub orientation: Orientation,
    pub length: usize,
    pub is_goal: bool,
}

impl Vehicle {
    pub fn new(
        id: VehicleId,
        row: usize,
        col: usize,
        orientation: Orientation,
        length: usize,
        is_goal: bool,
    ) -> Self {
        Vehicle {
            id,
            row,
            col,
            orientation,
            length,
            is_goal,
        }
    }

    /// Returns the coordinates of every cell this vehicle covers, starting at its upper-left cell.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.length).map(move |i| match self.orientation {
            Orientation::Horizontal => (self.row, self.col + i),
            Orientation::Vertical => (self.row + i, self.col),
        })
    }
}

/// All vehicles of a puzzle, iterated in ascending id order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VehicleRegistry {
    vehicles: BTreeMap<VehicleId, Vehicle>,
}

impl VehicleRegistry {
    pub fn get(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(&id)
    }

    /// Iterates over the vehicles by ascending id.
    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Returns the vehicle marked as the goal vehicle, if there is one.
    pub fn goal(&self) -> Option<&Vehicle> {
        self.vehicles.values().find(|v| v.is_goal)
    }
}

/// Upper-left of the two horizontally adjacent cells the goal vehicle must cover.
///
/// The goal is reached when both `(row, col)` and `(row, col + 1)` hold the goal vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GoalCell {
    pub row: usize,
    pub col: usize,
}

/// Exit cell of the classic 6x6 layout: third row, last two columns.
pub const CLASSIC_GOAL: GoalCell = GoalCell { row: 2, col: 4 };

impl Default for GoalCell {
    fn default() -> Self {
        CLASSIC_GOAL
    }
}

impl GoalCell {
    pub fn new(row: usize, col: usize) -> Self {
        GoalCell { row, col }
    }

    /// Column of the second goal cell, or `None` if it cannot be addressed.
    pub fn right_col(&self) -> Option<usize> {
        self.col.checked_add(1)
    }
}

/// Canonical serialized form of a board's occupancy grid.
///
/// Two boards are the same search state if and only if their fingerprints are equal.
/// The text is a JSON array of rows, each an array of cell values (`-1` for empty).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reasons a board description is rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoardError {
    /// The grid has no rows or no columns.
    EmptyGrid,
    /// A row of a grid literal has a different width than the first row.
    RaggedGrid { row: usize, expected: usize, found: usize },
    /// No vehicle is marked as the goal vehicle.
    NoGoalVehicle,
    /// More than one vehicle is marked as the goal vehicle.
    MultipleGoalVehicles(Vec<VehicleId>),
    /// Two vehicles share an id.
    DuplicateVehicle(VehicleId),
    /// A vehicle has length zero.
    ZeroLength(VehicleId),
    /// Part of a vehicle lies outside the grid.
    OutOfBounds { id: VehicleId, row: usize, col: usize },
    /// Two vehicles claim the same cell.
    Overlap {
        first: VehicleId,
        second: VehicleId,
        row: usize,
        col: usize,
    },
    /// A move or grid refers to a vehicle that is not registered.
    UnknownVehicle(VehicleId),
    /// A move that cannot be applied to the current board.
    IllegalMove(Move),
    /// A fingerprint that does not decode to a rectangular grid.
    BadFingerprint(String),
}

impl std::error::Error for BoardError {}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::EmptyGrid => write!(f, "Board must have at least one row and one column"),
            BoardError::RaggedGrid {
                row,
                expected,
                found,
            } => write!(
                f,
                "Row {} has {} cells, expected {}",
                row, found, expected
            ),
            BoardError::NoGoalVehicle => write!(f, "No vehicle is marked as the goal vehicle"),
            BoardError::MultipleGoalVehicles(ids) => {
                write!(f, "Several vehicles are marked as the goal vehicle: {:?}", ids)
            }
            BoardError::DuplicateVehicle(id) => write!(f, "Vehicle {} is defined more than once", id),
            BoardError::ZeroLength(id) => write!(f, "Vehicle {} has length zero", id),
            BoardError::OutOfBounds { id, row, col } => write!(
                f,
                "Vehicle {} extends outside the board at ({}, {})",
                id, row, col
            ),
            BoardError::Overlap {
                first,
                second,
                row,
                col,
            } => write!(
                f,
                "Vehicles {} and {} overlap at ({}, {})",
                first, second, row, col
            ),
            BoardError::UnknownVehicle(id) => write!(f, "Unknown vehicle {}", id),
            BoardError::IllegalMove(mv) => write!(
                f,
                "Vehicle {} cannot move in direction {}",
                mv.vehicle, mv.direction
            ),
            BoardError::BadFingerprint(reason) => write!(f, "Malformed fingerprint: {}", reason),
        }
    }
}

/// The occupancy grid of a puzzle.
///
/// A `Board` only knows which vehicle id sits in which cell. Vehicle shapes come
/// from the `VehicleRegistry` and are passed in where a move needs them.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    grid: Vec<Vec<Cell>>,
}

impl Board {
    /// Creates a board of the given size with every cell empty.
    ///
    /// # Examples
    /// ```
    /// use rush_hour_solver::engine::{Board, Cell};
    /// let board = Board::new_empty(6, 6);
    /// assert_eq!(board.get_cell(0, 0), Some(Cell::Empty));
    /// assert_eq!(board.get_cell(6, 0), None);
    /// ```
    pub fn new_empty(rows: usize, cols: usize) -> Self {
        Board {
            grid: vec![vec![Cell::Empty; cols]; rows],
        }
    }

    /// Creates a board from a rectangular grid of cells.
    ///
    /// # Errors
    /// `BoardError::EmptyGrid` if the grid has no cells, `BoardError::RaggedGrid`
    /// if its rows differ in length.
    pub fn from_grid(grid: Vec<Vec<Cell>>) -> Result<Self, BoardError> {
        let width = grid.first().map_or(0, Vec::len);
        if width == 0 {
            return Err(BoardError::EmptyGrid);
        }
        for (r, row) in grid.iter().enumerate() {
            if row.len() != width {
                return Err(BoardError::RaggedGrid {
                    row: r,
                    expected: width,
                    found: row.len(),
                });
            }
        }
        Ok(Board { grid })
    }

    pub fn rows(&self) -> usize {
        self.grid.len()
    }

    pub fn cols(&self) -> usize {
        self.grid.first().map_or(0, Vec::len)
    }

    /// Returns the cell at (`r`, `c`), or `None` outside the grid.
    pub fn get_cell(&self, r: usize, c: usize) -> Option<Cell> {
        self.grid.get(r).and_then(|row| row.get(c)).copied()
    }

    /// Returns the underlying rows of the grid.
    pub fn grid(&self) -> &[Vec<Cell>] {
        &self.grid
    }

    fn set_cell(&mut self, r: usize, c: usize, cell: Cell) {
        self.grid[r][c] = cell;
    }

    /// True if (`r`, `c`) is inside the grid and holds no vehicle.
    fn is_free(&self, r: isize, c: isize) -> bool {
        if r < 0 || c < 0 {
            return false;
        }
        self.get_cell(r as usize, c as usize) == Some(Cell::Empty)
    }

    /// Serializes the occupancy grid into its canonical fingerprint.
    pub fn fingerprint(&self) -> Fingerprint {
        // A grid of integer cells always serializes.
        Fingerprint(serde_json::to_string(&self.grid).expect("cell grid is always serializable"))
    }

    /// Rebuilds a board from a fingerprint produced by [`Board::fingerprint`].
    ///
    /// # Errors
    /// `BoardError::BadFingerprint` if the text is not a JSON matrix of cell values,
    /// plus the shape errors of [`Board::from_grid`].
    pub fn from_fingerprint(fingerprint: &Fingerprint) -> Result<Self, BoardError> {
        let grid: Vec<Vec<Cell>> = serde_json::from_str(fingerprint.as_str())
            .map_err(|e| BoardError::BadFingerprint(e.to_string()))?;
        Board::from_grid(grid)
    }

    /// Finds the upper-left cell of a vehicle by scanning the grid row by row.
    ///
    /// # Returns
    /// The `(row, col)` of the first cell holding `id`, or `None` if the vehicle is not on the board.
    pub fn locate(&self, id: VehicleId) -> Option<(usize, usize)> {
        self.grid.iter().enumerate().find_map(|(r, row)| {
            row.iter()
                .position(|&cell| cell == Cell::Occupied(id))
                .map(|c| (r, c))
        })
    }

    /// Shifts `vehicle` one cell in `direction` on a copy of this board.
    ///
    /// The vehicle may move only if the cell just beyond its span in that direction
    /// is inside the grid and empty. This board is left untouched.
    ///
    /// # Arguments
    /// * `vehicle`: The vehicle's registry entry, which supplies orientation and length.
    /// * `direction`: Which way to slide.
    ///
    /// # Returns
    /// The shifted board, or `None` if the vehicle is not on the board or the move is blocked.
    pub fn shift(&self, vehicle: &Vehicle, direction: Direction) -> Option<Board> {
        let (r, c) = self.locate(vehicle.id)?;
        let (r, c) = (r as isize, c as isize);
        let len = vehicle.length as isize;
        let id = Cell::Occupied(vehicle.id);

        // (cell to claim, cell to release)
        let (claim, release) = match (vehicle.orientation, direction) {
            (Orientation::Horizontal, Direction::Negative) => ((r, c - 1), (r, c + len - 1)),
            (Orientation::Horizontal, Direction::Positive) => ((r, c + len), (r, c)),
            (Orientation::Vertical, Direction::Negative) => ((r - 1, c), (r + len - 1, c)),
            (Orientation::Vertical, Direction::Positive) => ((r + len, c), (r, c)),
        };
        if !self.is_free(claim.0, claim.1) {
            return None;
        }

        let mut next = self.clone();
        next.set_cell(claim.0 as usize, claim.1 as usize, id);
        next.set_cell(release.0 as usize, release.1 as usize, Cell::Empty);
        Some(next)
    }

    /// Enumerates the legal one-cell moves of a vehicle.
    ///
    /// The negative direction is checked before the positive one, so the output
    /// order is deterministic. Each move is evaluated on its own clone of the board.
    ///
    /// # Returns
    /// A `Vec` of `(resulting fingerprint, move)` pairs, with at most two entries.
    pub fn legal_moves(&self, vehicle: &Vehicle) -> Vec<(Fingerprint, Move)> {
        Direction::ALL
            .iter()
            .filter_map(|&direction| {
                self.shift(vehicle, direction)
                    .map(|next| (next.fingerprint(), Move::new(vehicle.id, direction)))
            })
            .collect()
    }

    /// Checks whether the goal vehicle covers both goal cells.
    ///
    /// Goal cells that fall outside the grid never count as reached.
    pub fn goal_reached(&self, goal: GoalCell, goal_id: VehicleId) -> bool {
        let Some(right) = goal.right_col() else {
            return false;
        };
        let target = Some(Cell::Occupied(goal_id));
        self.get_cell(goal.row, goal.col) == target && self.get_cell(goal.row, right) == target
    }
}

impl fmt::Display for Board {
    /// Prints the grid with column and row indices; empty cells are shown as `.`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for c in 0..self.cols() {
            write!(f, "{:>3}", c)?;
        }
        for (r, row) in self.grid.iter().enumerate() {
            write!(f, "\n{:>3}", r)?;
            for cell in row {
                match cell {
                    Cell::Empty => write!(f, "{:>3}", ".")?,
                    Cell::Occupied(id) => write!(f, "{:>3}", id)?,
                }
            }
        }
        Ok(())
    }
}

/// A validated puzzle: the occupancy grid plus the vehicles placed on it.
///
/// Construction through [`Puzzle::new`] guarantees that every vehicle lies inside
/// the grid, no two vehicles overlap, and exactly one vehicle is the goal vehicle.
#[derive(Clone, Debug, PartialEq)]
pub struct Puzzle {
    board: Board,
    vehicles: VehicleRegistry,
    goal_id: VehicleId,
}

impl Puzzle {
    /// Validates the vehicles and places them on an empty `rows` x `cols` grid.
    ///
    /// # Errors
    /// Fails fast with the first problem found; the board is never repaired.
    ///
    /// # Examples
    /// ```
    /// use rush_hour_solver::engine::{Orientation, Puzzle, Vehicle};
    /// let puzzle = Puzzle::new(6, 6, vec![
    ///     Vehicle::new(0, 2, 0, Orientation::Horizontal, 2, true),
    ///     Vehicle::new(1, 0, 3, Orientation::Vertical, 3, false),
    /// ]).unwrap();
    /// assert_eq!(puzzle.goal_vehicle().id, 0);
    ///
    /// let overlapping = Puzzle::new(6, 6, vec![
    ///     Vehicle::new(0, 2, 2, Orientation::Horizontal, 2, true),
    ///     Vehicle::new(1, 0, 3, Orientation::Vertical, 3, false),
    /// ]);
    /// assert!(overlapping.is_err());
    /// ```
    pub fn new(rows: usize, cols: usize, vehicles: Vec<Vehicle>) -> Result<Self, BoardError> {
        if rows == 0 || cols == 0 {
            return Err(BoardError::EmptyGrid);
        }

        let mut board = Board::new_empty(rows, cols);
        let mut registry = BTreeMap::new();
        for vehicle in vehicles {
            if vehicle.length == 0 {
                return Err(BoardError::ZeroLength(vehicle.id));
            }
            if registry.contains_key(&vehicle.id) {
                return Err(BoardError::DuplicateVehicle(vehicle.id));
            }
            for (r, c) in vehicle.cells() {
                match board.get_cell(r, c) {
                    None => {
                        return Err(BoardError::OutOfBounds {
                            id: vehicle.id,
                            row: r,
                            col: c,
                        })
                    }
                    Some(Cell::Occupied(other)) => {
                        return Err(BoardError::Overlap {
                            first: other,
                            second: vehicle.id,
                            row: r,
                            col: c,
                        })
                    }
                    Some(Cell::Empty) => board.set_cell(r, c, Cell::Occupied(vehicle.id)),
                }
            }
            registry.insert(vehicle.id, vehicle);
        }

        let goal_ids: Vec<VehicleId> = registry
            .values()
            .filter(|v| v.is_goal)
            .map(|v| v.id)
            .collect();
        let goal_id = match goal_ids.as_slice() {
            [] => return Err(BoardError::NoGoalVehicle),
            [id] => *id,
            _ => return Err(BoardError::MultipleGoalVehicles(goal_ids)),
        };

        Ok(Puzzle {
            board,
            vehicles: VehicleRegistry { vehicles: registry },
            goal_id,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn vehicles(&self) -> &VehicleRegistry {
        &self.vehicles
    }

    pub fn goal_id(&self) -> VehicleId {
        self.goal_id
    }

    pub fn goal_vehicle(&self) -> &Vehicle {
        // `new` only succeeds with a registered goal vehicle.
        &self.vehicles.vehicles[&self.goal_id]
    }

    /// True if the goal vehicle currently covers both cells of `goal`.
    pub fn is_solved(&self, goal: GoalCell) -> bool {
        self.board.goal_reached(goal, self.goal_id)
    }

    /// Applies one move and returns the resulting puzzle.
    ///
    /// Unlike [`Board::shift`], the vehicle registry is updated too, so the
    /// returned puzzle describes the new positions.
    ///
    /// # Errors
    /// `BoardError::UnknownVehicle` or `BoardError::IllegalMove`.
    pub fn apply(&self, mv: &Move) -> Result<Puzzle, BoardError> {
        let vehicle = self
            .vehicles
            .get(mv.vehicle)
            .ok_or(BoardError::UnknownVehicle(mv.vehicle))?;
        let board = self
            .board
            .shift(vehicle, mv.direction)
            .ok_or(BoardError::IllegalMove(*mv))?;
        let (row, col) = board
            .locate(vehicle.id)
            .ok_or(BoardError::UnknownVehicle(vehicle.id))?;

        let mut vehicles = self.vehicles.clone();
        vehicles
            .vehicles
            .insert(vehicle.id, Vehicle { row, col, ..*vehicle });
        Ok(Puzzle {
            board,
            vehicles,
            goal_id: self.goal_id,
        })
    }

    /// Applies a sequence of moves in order.
    pub fn replay(&self, moves: &[Move]) -> Result<Puzzle, BoardError> {
        moves
            .iter()
            .try_fold(self.clone(), |puzzle, mv| puzzle.apply(mv))
    }
}
