use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
    time::Instant,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hailstones::{
    count_xy_crossings,
    crossing::{PUZZLE_MAX, PUZZLE_MIN},
    parse_hailstones, solve, SolverOptions,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command()]
struct Cli {
    #[arg(short, long, global = true)]
    /// Log debug output (equations, solver models)
    verbose: bool,

    #[arg(short, long, global = true)]
    /// Log how long parsing and solving took
    timings: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the rock that hits every hailstone, and print the solver's assignment
    Rock {
        #[arg(long)]
        /// Give up after this many milliseconds
        timeout_ms: Option<u64>,

        #[arg(long, default_value_t = 10_000)]
        /// How long to spend proving no second rock exists
        uniqueness_timeout_ms: u32,

        #[arg(short, long)]
        /// Also print the sum of the rock's starting coordinates
        answer: bool,

        /// Puzzle input, stdin when omitted
        file: Option<PathBuf>,
    },

    /// Count pairs of hailstones whose XY paths cross inside the test area
    Crossings {
        #[arg(long, default_value_t = PUZZLE_MIN)]
        min: f64,

        #[arg(long, default_value_t = PUZZLE_MAX)]
        max: f64,

        /// Puzzle input, stdin when omitted
        file: Option<PathBuf>,
    },
}

fn init_logger(verbose: bool) {
    let default = if verbose {
        "hailstones=debug"
    } else {
        "hailstones=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display())),
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("could not read stdin")?;
            Ok(input)
        }
    }
}

fn time<T, F>(enabled: bool, what: &str, f: F) -> T
where
    F: FnOnce() -> T,
{
    let t0 = Instant::now();
    let result = f();
    if enabled {
        info!("{what} took {:?}", t0.elapsed());
    }
    result
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Commands::Rock {
            timeout_ms,
            uniqueness_timeout_ms,
            answer,
            file,
        } => {
            let input = read_input(file.as_ref())?;
            let hailstones = time(cli.timings, "parsing", || parse_hailstones(&input))?;
            info!(count = hailstones.len(), "parsed hailstones");

            let options = SolverOptions {
                timeout_ms,
                uniqueness_timeout_ms,
            };
            let outcome = time(cli.timings, "solving", || solve(&hailstones, &options))?;
            println!("{outcome}");

            if answer {
                match outcome.unique() {
                    Some(solution) => println!("{}", solution.position_sum()),
                    None => warn!("no unique rock, not printing an answer"),
                }
            }
        }
        Commands::Crossings { min, max, file } => {
            let input = read_input(file.as_ref())?;
            let hailstones = time(cli.timings, "parsing", || parse_hailstones(&input))?;

            let count = time(cli.timings, "counting", || {
                count_xy_crossings(&hailstones, min, max)
            });
            println!("{count}");
        }
    }

    Ok(())
}
