use clap::Parser;
use rush_hour_solver::engine::Puzzle;
use rush_hour_solver::heuristics::HeuristicPolicy;
use rush_hour_solver::solver::{solve, SearchConfig};
use rush_hour_solver::utils::{puzzle_from_grid, read_board_file, scramble};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process;

// Fourteen vehicles; vehicle 5 starts on the exit cells.
const SOLVED_LAYOUT: [[i64; 6]; 6] = [
    [0, 0, 1, 1, 1, 2],
    [3, -1, 4, 13, 13, 2],
    [3, -1, 4, -1, 5, 5],
    [6, 6, 7, 8, 8, 9],
    [10, -1, 7, -1, -1, 9],
    [10, 11, 11, -1, 12, 12],
];
const SOLVED_LAYOUT_GOAL: u32 = 5;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Compares heuristic-table policies on scrambled boards", long_about = None)]
struct Args {
    /// Number of scrambled boards to evaluate
    #[clap(short, long, default_value_t = 20)]
    boards: u64,

    /// Seed of the first board; board i uses seed + i
    #[clap(short, long, default_value_t = 0)]
    seed: u64,

    /// Random moves applied to the base board
    #[clap(long, default_value_t = 60)]
    scramble_steps: usize,

    /// Base board file to scramble instead of the built-in layout
    #[clap(long)]
    board: Option<PathBuf>,
}

#[derive(Default)]
struct Totals {
    moves: usize,
    expanded: usize,
    solved: usize,
}

fn base_puzzle(args: &Args) -> Result<Puzzle, String> {
    match &args.board {
        Some(path) => read_board_file(path).map_err(|e| format!("Cannot load {}: {}", path.display(), e)),
        None => {
            let grid: Vec<Vec<i64>> = SOLVED_LAYOUT.iter().map(|row| row.to_vec()).collect();
            puzzle_from_grid(&grid, SOLVED_LAYOUT_GOAL).map_err(|e| e.to_string())
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let base = match base_puzzle(&args) {
        Ok(puzzle) => puzzle,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(2);
        }
    };

    let policies = [
        ("last-writer-wins", HeuristicPolicy::LastWriterWins),
        ("first-writer-wins", HeuristicPolicy::FirstWriterWins),
        ("minimum", HeuristicPolicy::Minimum),
    ];
    let mut totals: HashMap<&str, Totals> = HashMap::new();

    println!("Starting heuristic evaluation for {} boards...", args.boards);

    for board_idx in 0..args.boards {
        let current_seed = args.seed + board_idx;
        let puzzle = match scramble(&base, current_seed, args.scramble_steps) {
            Ok(puzzle) => puzzle,
            Err(e) => {
                eprintln!("Scrambling with seed {} failed: {}", current_seed, e);
                continue;
            }
        };
        println!("\nEvaluating Board {} (Seed: {})", board_idx, current_seed);

        for (name, policy) in &policies {
            let config = SearchConfig {
                heuristic_policy: *policy,
                ..SearchConfig::default()
            };
            let entry = totals.entry(*name).or_default();
            match solve(&puzzle, &config) {
                Ok(outcome) => {
                    let stats = outcome.stats();
                    entry.expanded += stats.states_expanded;
                    match outcome.moves() {
                        Some(moves) => {
                            entry.moves += moves.len();
                            entry.solved += 1;
                            println!(
                                "  Policy: {:<18} Moves: {:<5} Expanded: {}",
                                name,
                                moves.len(),
                                stats.states_expanded
                            );
                        }
                        None => println!("  Policy: {:<18} no solution", name),
                    }
                }
                Err(e) => eprintln!("  Policy {} failed on board {}: {}", name, board_idx, e),
            }
        }
    }

    println!("\n--- Evaluation Complete ---");
    println!("\n--- Average Moves (solved boards only) ---");

    let mut averages: Vec<(&str, f64, f64)> = Vec::new();
    for (name, total) in &totals {
        if total.solved == 0 {
            println!("Policy {}: no boards solved.", name);
            continue;
        }
        let n = total.solved as f64;
        averages.push((*name, total.moves as f64 / n, total.expanded as f64 / n));
    }
    averages.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    for (name, avg_moves, avg_expanded) in averages {
        println!(
            "Policy {:<18}: Average Moves = {:.2}, Average Expanded = {:.1}",
            name, avg_moves, avg_expanded
        );
    }
}
