// Headless bot-vs-bot batch runner
//
// Runs complete matches between two bots on a simulated clock and prints
// outcome statistics. Useful for sanity-checking rule changes and for
// comparing difficulty tiers without a rendering driver.
//
// Usage:
//   cargo run --release --bin autoplay -- [options]
//
// Options:
//   --matches <N>      Number of matches to run (default: 10)
//   --tier1 <1-3>      Difficulty of player 1 (default: 2)
//   --tier2 <1-3>      Difficulty of player 2 (default: 2)
//   --width <W>        Board width, odd 9-21 (default: 15)
//   --height <H>       Board height, odd 9-21 (default: 13)
//   --seed <S>         Base RNG seed; match i uses seed + i (default: 1)
//   --max-ticks <N>    Tick limit per match before calling it a draw
//   --config <path>    Path to Arena.toml (default: Arena.toml)

use std::env;
use std::process;

use bomber_arena::bot::Difficulty;
use bomber_arena::config::Config;
use bomber_arena::game::{ControlMode, Game};

// Simulated frame cadence for the headless clock
const TICK_STEP_MS: u64 = 50;

fn print_usage() {
    eprintln!("Arena Autoplay Tool");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  autoplay [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --matches <N>      Number of matches to run (default: 10)");
    eprintln!("  --tier1 <1-3>      Difficulty of player 1 (default: 2)");
    eprintln!("  --tier2 <1-3>      Difficulty of player 2 (default: 2)");
    eprintln!("  --width <W>        Board width (default: 15)");
    eprintln!("  --height <H>       Board height (default: 13)");
    eprintln!("  --seed <S>         Base RNG seed (default: 1)");
    eprintln!("  --max-ticks <N>    Tick limit per match (default: 12000)");
    eprintln!("  --config <path>    Path to Arena.toml (default: Arena.toml)");
    eprintln!("  --help             Show this help message");
}

struct Options {
    matches: u64,
    tier1: u8,
    tier2: u8,
    width: i32,
    height: i32,
    seed: u64,
    max_ticks: u64,
    config_path: String,
}

fn value_of(args: &[String], i: usize) -> Result<&str, String> {
    args.get(i + 1)
        .map(|s| s.as_str())
        .ok_or_else(|| format!("Missing value for {}", args[i]))
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut opts = Options {
        matches: 10,
        tier1: 2,
        tier2: 2,
        width: 15,
        height: 13,
        seed: 1,
        max_ticks: 12_000,
        config_path: "Arena.toml".to_string(),
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--matches" => opts.matches = parse_num(value_of(args, i)?)?,
            "--tier1" => opts.tier1 = parse_num(value_of(args, i)?)?,
            "--tier2" => opts.tier2 = parse_num(value_of(args, i)?)?,
            "--width" => opts.width = parse_num(value_of(args, i)?)?,
            "--height" => opts.height = parse_num(value_of(args, i)?)?,
            "--seed" => opts.seed = parse_num(value_of(args, i)?)?,
            "--max-ticks" => opts.max_ticks = parse_num(value_of(args, i)?)?,
            "--config" => opts.config_path = value_of(args, i)?.to_string(),
            "--help" => {
                print_usage();
                process::exit(0);
            }
            other => return Err(format!("Unknown option: {}", other)),
        }
        i += 2;
    }
    Ok(opts)
}

fn parse_num<T: std::str::FromStr>(s: &str) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    s.parse::<T>()
        .map_err(|e| format!("Invalid number '{}': {}", s, e))
}

struct MatchOutcome {
    winner: Option<usize>,
    ticks: u64,
    scores: Vec<i32>,
    bombs_placed: u64,
    walls_destroyed: u64,
}

fn run_match(
    opts: &Options,
    config: &Config,
    tiers: [Difficulty; 2],
    seed: u64,
) -> Result<MatchOutcome, String> {
    let mut game = Game::with_seed(
        opts.width,
        opts.height,
        [ControlMode::Bot(tiers[0]), ControlMode::Bot(tiers[1])],
        config.clone(),
        seed,
    )?;

    let mut now = 0;
    while game.is_running() && game.tick_count() < opts.max_ticks {
        now += TICK_STEP_MS;
        game.update(now);
    }

    let view = game.snapshot(now);
    Ok(MatchOutcome {
        winner: game.winner(),
        ticks: game.tick_count(),
        scores: view.scores,
        bombs_placed: view.bombs_placed,
        walls_destroyed: view.walls_destroyed,
    })
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let opts = match parse_args(&args) {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            process::exit(1);
        }
    };

    let tiers = match (
        Difficulty::from_tier(opts.tier1),
        Difficulty::from_tier(opts.tier2),
    ) {
        (Ok(t1), Ok(t2)) => [t1, t2],
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let config = Config::from_file(&opts.config_path).unwrap_or_else(|e| {
        eprintln!("Warning: {} - using hardcoded defaults", e);
        Config::default_hardcoded()
    });

    let mut wins = [0u64, 0u64];
    let mut draws = 0u64;
    let mut total_ticks = 0u64;
    let mut total_bombs = 0u64;
    let mut total_walls = 0u64;

    for i in 0..opts.matches {
        let outcome = match run_match(&opts, &config, tiers, opts.seed + i) {
            Ok(outcome) => outcome,
            Err(e) => {
                eprintln!("Match {} failed to start: {}", i + 1, e);
                process::exit(1);
            }
        };

        let result = match outcome.winner {
            Some(id) => {
                wins[id] += 1;
                format!("player {} wins", id + 1)
            }
            None => {
                draws += 1;
                "draw".to_string()
            }
        };
        println!(
            "Match {:>3}: {:<14} ({} ticks, scores {}-{}, {} bombs, {} walls)",
            i + 1,
            result,
            outcome.ticks,
            outcome.scores[0],
            outcome.scores[1],
            outcome.bombs_placed,
            outcome.walls_destroyed
        );

        total_ticks += outcome.ticks;
        total_bombs += outcome.bombs_placed;
        total_walls += outcome.walls_destroyed;
    }

    println!("\n═══════════════════════════════════════════════════════════");
    println!("                   AUTOPLAY REPORT");
    println!("═══════════════════════════════════════════════════════════");
    println!(
        "Matches:        {} (tier {} vs tier {})",
        opts.matches, opts.tier1, opts.tier2
    );
    println!("Player 1 wins:  {}", wins[0]);
    println!("Player 2 wins:  {}", wins[1]);
    println!("Draws:          {}", draws);
    if opts.matches > 0 {
        println!(
            "Avg ticks:      {:.1}",
            total_ticks as f64 / opts.matches as f64
        );
        println!(
            "Avg bombs:      {:.1}",
            total_bombs as f64 / opts.matches as f64
        );
        println!(
            "Avg walls:      {:.1}",
            total_walls as f64 / opts.matches as f64
        );
    }
    println!("═══════════════════════════════════════════════════════════");

    bomber_arena::profiler::report_and_reset();
}
