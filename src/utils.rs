use crate::engine::{BoardError, Cell, Direction, Move, Orientation, Puzzle, Vehicle, VehicleId};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Represents the reasons why loading a puzzle or a solution might fail.
#[derive(Debug)]
pub enum LoadError {
    Io(io::Error),
    /// A line (or grid row) that could not be understood; `line` is 1-based.
    Parse { line: usize, reason: String },
    /// The description parsed but does not form a valid puzzle.
    Board(BoardError),
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(err) => Some(err),
            LoadError::Board(err) => Some(err),
            LoadError::Parse { .. } => None,
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(err) => write!(f, "Failed to read file: {}", err),
            LoadError::Parse { line, reason } => write!(f, "Line {}: {}", line, reason),
            LoadError::Board(err) => write!(f, "Invalid board: {}", err),
        }
    }
}

impl From<io::Error> for LoadError {
    fn from(err: io::Error) -> Self {
        LoadError::Io(err)
    }
}

impl From<BoardError> for LoadError {
    fn from(err: BoardError) -> Self {
        LoadError::Board(err)
    }
}

fn parse_field<T: std::str::FromStr>(field: &str, name: &str, line: usize) -> Result<T, LoadError> {
    field.parse().map_err(|_| LoadError::Parse {
        line,
        reason: format!("Invalid {} '{}'", name, field),
    })
}

/// Parses the contents of a `.board` file into a validated `Puzzle`.
///
/// The first line holds the board dimensions as `width,height`. Every further
/// line describes one vehicle with six comma-separated fields:
///
/// 1. A unique integer id.
/// 2. The column (x) of the vehicle's upper-left cell.
/// 3. The row (y) of the vehicle's upper-left cell.
/// 4. `H` for horizontal or `V` for vertical.
/// 5. The vehicle's length.
/// 6. `T` if this is the goal vehicle, `F` otherwise.
///
/// Blank lines are skipped and whitespace around fields is ignored.
///
/// # Errors
/// `LoadError::Parse` for malformed lines, `LoadError::Board` if the vehicles do
/// not form a valid puzzle.
///
/// # Examples
/// ```
/// use rush_hour_solver::utils::parse_board;
///
/// let puzzle = parse_board("6,6\n0,0,2,H,2,T\n1,3,0,V,3,F\n").unwrap();
/// assert_eq!(puzzle.board().rows(), 6);
/// assert_eq!(puzzle.goal_id(), 0);
/// assert!(parse_board("6,6\n0,0,2,X,2,T\n").is_err());
/// ```
pub fn parse_board(contents: &str) -> Result<Puzzle, LoadError> {
    let mut lines = contents.lines().enumerate().map(|(i, l)| (i + 1, l.trim()));

    let (line, header) = lines.next().ok_or(LoadError::Parse {
        line: 1,
        reason: "Missing board dimensions".to_string(),
    })?;
    let dims: Vec<&str> = header.split(',').map(str::trim).collect();
    if dims.len() != 2 {
        return Err(LoadError::Parse {
            line,
            reason: format!("Expected 'width,height', found '{}'", header),
        });
    }
    let cols: usize = parse_field(dims[0], "width", line)?;
    let rows: usize = parse_field(dims[1], "height", line)?;

    let mut vehicles = Vec::new();
    for (line, text) in lines {
        let fields: Vec<&str> = text.split(',').map(str::trim).collect();
        if fields.len() <= 1 {
            continue;
        }
        if fields.len() != 6 {
            return Err(LoadError::Parse {
                line,
                reason: format!("Expected 6 fields, found {}", fields.len()),
            });
        }

        let id: VehicleId = parse_field(fields[0], "vehicle id", line)?;
        let col: usize = parse_field(fields[1], "x coordinate", line)?;
        let row: usize = parse_field(fields[2], "y coordinate", line)?;
        let orientation = match fields[3] {
            "H" | "h" => Orientation::Horizontal,
            "V" | "v" => Orientation::Vertical,
            other => {
                return Err(LoadError::Parse {
                    line,
                    reason: format!("Unrecognized orientation '{}'", other),
                })
            }
        };
        let length: usize = parse_field(fields[4], "length", line)?;
        let is_goal = match fields[5] {
            "T" | "t" => true,
            "F" | "f" => false,
            other => {
                return Err(LoadError::Parse {
                    line,
                    reason: format!("Unrecognized goal flag '{}'", other),
                })
            }
        };
        vehicles.push(Vehicle::new(id, row, col, orientation, length, is_goal));
    }

    Ok(Puzzle::new(rows, cols, vehicles)?)
}

/// Reads and parses a `.board` file.
pub fn read_board_file(path: &Path) -> Result<Puzzle, LoadError> {
    let contents = fs::read_to_string(path)?;
    parse_board(&contents)
}

/// Builds a puzzle from an integer grid, the same encoding a fingerprint uses.
///
/// Each non-negative value is a vehicle id and `-1` is an empty cell. A vehicle's
/// orientation is inferred from its cells; single-cell vehicles are horizontal.
///
/// # Arguments
/// * `grid`: Rows of cell values, top row first.
/// * `goal`: Id of the goal vehicle.
///
/// # Errors
/// `LoadError::Parse` if a value is out of range or a vehicle's cells are not one
/// straight contiguous run (`line` is the 1-based grid row), `LoadError::Board`
/// for shape problems or a missing goal vehicle.
pub fn puzzle_from_grid(grid: &[Vec<i64>], goal: VehicleId) -> Result<Puzzle, LoadError> {
    let rows = grid.len();
    let cols = grid.first().map_or(0, Vec::len);

    // Cells per vehicle, collected in row-major order.
    let mut cells: BTreeMap<VehicleId, Vec<(usize, usize)>> = BTreeMap::new();
    for (r, row) in grid.iter().enumerate() {
        if row.len() != cols {
            return Err(BoardError::RaggedGrid {
                row: r,
                expected: cols,
                found: row.len(),
            }
            .into());
        }
        for (c, &value) in row.iter().enumerate() {
            let cell = Cell::try_from(value).map_err(|reason| LoadError::Parse {
                line: r + 1,
                reason,
            })?;
            if let Some(id) = cell.vehicle() {
                cells.entry(id).or_default().push((r, c));
            }
        }
    }

    let mut vehicles = Vec::with_capacity(cells.len());
    for (id, positions) in cells {
        let (r0, c0) = positions[0];
        let horizontal = positions
            .iter()
            .enumerate()
            .all(|(i, &(r, c))| r == r0 && c == c0 + i);
        let vertical = positions
            .iter()
            .enumerate()
            .all(|(i, &(r, c))| c == c0 && r == r0 + i);
        let orientation = if horizontal {
            Orientation::Horizontal
        } else if vertical {
            Orientation::Vertical
        } else {
            return Err(LoadError::Parse {
                line: r0 + 1,
                reason: format!(
                    "Cells of vehicle {} do not form a straight contiguous run",
                    id
                ),
            });
        };
        vehicles.push(Vehicle::new(
            id,
            r0,
            c0,
            orientation,
            positions.len(),
            id == goal,
        ));
    }

    Ok(Puzzle::new(rows, cols, vehicles)?)
}

/// Formats moves as solution-file text: one `id,direction` line per move.
pub fn format_solution(moves: &[Move]) -> String {
    moves.iter().map(|mv| format!("{}\n", mv)).collect()
}

/// Parses solution-file text back into moves. Blank lines are skipped.
pub fn parse_solution(contents: &str) -> Result<Vec<Move>, LoadError> {
    let mut moves = Vec::new();
    for (i, text) in contents.lines().enumerate() {
        let line = i + 1;
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        let (id, direction) = text.split_once(',').ok_or_else(|| LoadError::Parse {
            line,
            reason: format!("Expected 'id,direction', found '{}'", text),
        })?;
        let id: VehicleId = parse_field(id.trim(), "vehicle id", line)?;
        let offset: i8 = parse_field(direction.trim(), "direction", line)?;
        let direction =
            Direction::try_from(offset).map_err(|reason| LoadError::Parse { line, reason })?;
        moves.push(Move::new(id, direction));
    }
    Ok(moves)
}

/// Writes a solution file next to other game data.
///
/// The file is named `solution_<board name>_<10 random digits>.sol` inside
/// `out_dir`, which is created if missing.
///
/// # Returns
/// The path of the written file.
pub fn write_solution(moves: &[Move], board_path: &Path, out_dir: &Path) -> io::Result<PathBuf> {
    let board_name = board_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "board".to_string());
    let mut rng = rand::thread_rng();
    let digits: String = (0..10)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect();

    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(format!("solution_{}_{}.sol", board_name, digits));
    fs::write(&path, format_solution(moves))?;
    Ok(path)
}

/// Shuffles a puzzle with a seeded random walk of legal moves.
///
/// Every step picks uniformly among all legal moves of the current board, so the
/// result is reachable from (and can be solved back to) the input. The same seed
/// always produces the same puzzle.
pub fn scramble(puzzle: &Puzzle, seed: u64, steps: usize) -> Result<Puzzle, BoardError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut current = puzzle.clone();
    for _ in 0..steps {
        let moves: Vec<Move> = current
            .vehicles()
            .iter()
            .flat_map(|vehicle| current.board().legal_moves(vehicle))
            .map(|(_, mv)| mv)
            .collect();
        if moves.is_empty() {
            break;
        }
        let mv = moves[rng.gen_range(0..moves.len())];
        current = current.apply(&mv)?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_BOARD: &str = "6,6
0,2,0,V,2,F
1,3,0,H,3,F
2,3,1,V,2,F
3,4,1,H,2,F
4,0,2,V,2,F
5,1,2,H,2,T
6,4,2,V,3,F
7,5,2,V,2,F
8,1,3,V,2,F
9,0,4,V,2,F
10,2,4,H,2,F
11,5,4,V,2,F
12,1,5,H,2,F
13,3,5,H,2,F
";

    fn start_board() -> Vec<Vec<i64>> {
        vec![
            vec![-1, -1, 0, 1, 1, 1],
            vec![-1, -1, 0, 2, 3, 3],
            vec![4, 5, 5, 2, 6, 7],
            vec![4, 8, -1, -1, 6, 7],
            vec![9, 8, 10, 10, 6, 11],
            vec![9, 12, 12, 13, 13, 11],
        ]
    }

    #[test]
    fn test_parse_board() {
        let puzzle = parse_board(TEST_BOARD).unwrap();
        let expected = puzzle_from_grid(&start_board(), 5).unwrap();
        assert_eq!(puzzle.board(), expected.board());
        assert_eq!(puzzle.vehicles(), expected.vehicles());
        assert_eq!(puzzle.goal_id(), 5);
    }

    #[test]
    fn test_parse_board_skips_blank_lines_and_spaces() {
        let puzzle = parse_board("4, 3\n\n 0, 0, 1, H, 2, T \n\n1,3,0,V,3,F\n").unwrap();
        assert_eq!(puzzle.board().rows(), 3);
        assert_eq!(puzzle.board().cols(), 4);
        assert_eq!(puzzle.vehicles().len(), 2);
    }

    #[test]
    fn test_parse_board_errors() {
        let err = parse_board("").unwrap_err();
        assert!(err.to_string().contains("Missing board dimensions"));

        let err = parse_board("6\n").unwrap_err();
        assert!(matches!(err, LoadError::Parse { line: 1, .. }));

        let err = parse_board("6,6\n0,0,2,H,2\n").unwrap_err();
        assert!(matches!(err, LoadError::Parse { line: 2, .. }));
        assert!(err.to_string().contains("Expected 6 fields"));

        let err = parse_board("6,6\n0,0,2,D,2,T\n").unwrap_err();
        assert!(err.to_string().contains("Unrecognized orientation 'D'"));

        let err = parse_board("6,6\n0,0,2,H,2,Y\n").unwrap_err();
        assert!(err.to_string().contains("Unrecognized goal flag 'Y'"));

        let err = parse_board("6,6\n0,x,2,H,2,T\n").unwrap_err();
        assert!(err.to_string().contains("Invalid x coordinate 'x'"));
    }

    #[test]
    fn test_parse_board_rejects_invalid_layouts() {
        let err = parse_board("6,6\n0,0,2,H,2,T\n1,1,1,V,2,F\n").unwrap_err();
        assert!(matches!(err, LoadError::Board(BoardError::Overlap { .. })));

        let err = parse_board("6,6\n0,0,2,H,2,F\n").unwrap_err();
        assert!(matches!(err, LoadError::Board(BoardError::NoGoalVehicle)));

        let err = parse_board("6,6\n0,5,2,H,2,T\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::Board(BoardError::OutOfBounds { id: 0, .. })
        ));
    }

    #[test]
    fn test_read_board_file_missing() {
        let path = std::env::temp_dir().join("rush_hour_solver_missing_file.board");
        let err = read_board_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn test_puzzle_from_grid_infers_vehicles() {
        let puzzle = puzzle_from_grid(&start_board(), 5).unwrap();
        assert_eq!(puzzle.vehicles().len(), 14);
        let truck = puzzle.vehicles().get(6).unwrap();
        assert_eq!(truck.orientation, Orientation::Vertical);
        assert_eq!(truck.length, 3);
        assert_eq!((truck.row, truck.col), (2, 4));
        let goal = puzzle.goal_vehicle();
        assert_eq!(goal.id, 5);
        assert_eq!(goal.orientation, Orientation::Horizontal);
        assert!(goal.is_goal);
    }

    #[test]
    fn test_puzzle_from_grid_errors() {
        let bent = [vec![0, 0], vec![-1, 0]];
        let err = puzzle_from_grid(&bent, 0).unwrap_err();
        assert!(err.to_string().contains("straight contiguous run"));

        let gap = [vec![0, -1, 0]];
        assert!(puzzle_from_grid(&gap, 0).is_err());

        let bad_value = [vec![0, -3]];
        assert!(matches!(
            puzzle_from_grid(&bad_value, 0),
            Err(LoadError::Parse { line: 1, .. })
        ));

        let ragged = [vec![0, 0], vec![-1]];
        assert!(matches!(
            puzzle_from_grid(&ragged, 0),
            Err(LoadError::Board(BoardError::RaggedGrid { .. }))
        ));

        let no_goal = [vec![1, 1]];
        assert!(matches!(
            puzzle_from_grid(&no_goal, 0),
            Err(LoadError::Board(BoardError::NoGoalVehicle))
        ));
    }

    #[test]
    fn test_solution_text_round_trip() {
        let moves = vec![
            Move::new(2, Direction::Positive),
            Move::new(12, Direction::Negative),
        ];
        let text = format_solution(&moves);
        assert_eq!(text, "2,1\n12,-1\n");
        assert_eq!(parse_solution(&text).unwrap(), moves);
        assert!(parse_solution("3;1\n").is_err());
        assert!(parse_solution("3,0\n").is_err());
    }

    #[test]
    fn test_write_solution() {
        let out_dir = std::env::temp_dir().join("rush_hour_solver_test_write_solution");
        let moves = vec![Move::new(5, Direction::Positive)];
        let path = write_solution(&moves, Path::new("game_data/test.board"), &out_dir).unwrap();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("solution_test_"), "{}", name);
        assert!(name.ends_with(".sol"));
        let digits = &name["solution_test_".len()..name.len() - ".sol".len()];
        assert_eq!(digits.len(), 10);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(parse_solution(&written).unwrap(), moves);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_scramble_is_seeded_and_legal() {
        let puzzle = puzzle_from_grid(&start_board(), 5).unwrap();
        let a = scramble(&puzzle, 42, 30).unwrap();
        let b = scramble(&puzzle, 42, 30).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.vehicles().len(), puzzle.vehicles().len());

        // The registry still matches the board after the walk.
        for vehicle in a.vehicles().iter() {
            assert_eq!(a.board().locate(vehicle.id), Some((vehicle.row, vehicle.col)));
        }
        assert_eq!(scramble(&puzzle, 42, 0).unwrap(), puzzle);
    }
}
