use clap::Parser;
use rush_hour_solver::engine::Puzzle;
use rush_hour_solver::heuristics::HeuristicPolicy;
use rush_hour_solver::solver::{solve, SearchConfig, SearchOutcome};
use rush_hour_solver::utils::{read_board_file, write_solution};
use std::fs;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to the board file (first line `width,height`, then `id,x,y,H|V,length,T|F`)
    board_file: PathBuf,

    /// JSON file with search settings; flags below override it
    #[clap(long)]
    config: Option<PathBuf>,

    /// Row of the exit cells
    #[clap(long)]
    goal_row: Option<usize>,

    /// Left column of the exit cells
    #[clap(long)]
    goal_col: Option<usize>,

    /// How repeated heuristic scores for one state are resolved
    #[clap(long, value_enum)]
    policy: Option<HeuristicPolicy>,

    /// Directory the solution file is written to
    #[clap(short, long, default_value = "game_data")]
    output_dir: PathBuf,

    /// Do not write a solution file
    #[clap(long)]
    no_save: bool,

    /// Print the solution as JSON instead of a move list
    #[clap(long)]
    json: bool,
}

fn load_config(args: &Args) -> Result<SearchConfig, String> {
    let mut config = match &args.config {
        Some(path) => {
            let content = fs::read_to_string(path)
                .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
            serde_json::from_str(&content)
                .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?
        }
        None => SearchConfig::default(),
    };
    if let Some(row) = args.goal_row {
        config.goal.row = row;
    }
    if let Some(col) = args.goal_col {
        config.goal.col = col;
    }
    if let Some(policy) = args.policy {
        config.heuristic_policy = policy;
    }
    Ok(config)
}

fn print_moves(puzzle: &Puzzle, outcome: &SearchOutcome) {
    let Some(moves) = outcome.moves() else {
        return;
    };
    if moves.is_empty() {
        println!("  No moves needed.");
        return;
    }
    for (i, mv) in moves.iter().enumerate() {
        println!("  Move {}: vehicle {} by {}", i + 1, mv.vehicle, mv.direction);
    }
    match puzzle.replay(moves) {
        Ok(finished) => println!("\nFinal board state:\n{}\n", finished.board()),
        Err(e) => eprintln!("Solution does not replay: {}", e),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(2);
        }
    };

    println!("Setting up the board...");
    let puzzle = match read_board_file(&args.board_file) {
        Ok(puzzle) => puzzle,
        Err(e) => {
            eprintln!("Cannot load {}: {}", args.board_file.display(), e);
            process::exit(2);
        }
    };
    println!("Initial board state:\n{}\n", puzzle.board());

    println!("Navigating traffic...");
    let start = Instant::now();
    let outcome = match solve(&puzzle, &config) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Search failed: {}", e);
            process::exit(1);
        }
    };
    let elapsed = start.elapsed();

    match &outcome {
        SearchOutcome::Solved(solution) => {
            println!(
                "Successfully found a way out in {:?} using {} move(s)",
                elapsed,
                solution.steps()
            );
            if args.json {
                match serde_json::to_string_pretty(solution) {
                    Ok(json) => println!("{}", json),
                    Err(e) => eprintln!("Cannot serialize solution: {}", e),
                }
            } else {
                print_moves(&puzzle, &outcome);
            }
            if !args.no_save {
                match write_solution(&solution.moves, &args.board_file, &args.output_dir) {
                    Ok(path) => println!("Solution written to file: {}", path.display()),
                    Err(e) => {
                        eprintln!("Cannot write solution: {}", e);
                        process::exit(1);
                    }
                }
            }
        }
        SearchOutcome::Exhausted(stats) => {
            println!(
                "Board has no solutions. Took {:?} and explored {} states",
                elapsed, stats.states_expanded
            );
        }
    }
}
