//! Headless simulation runner.
//!
//! Runs territorial grid scenarios without a UI, for watching matchups in
//! a terminal, collecting balance metrics, and checking reproducibility.
//!
//! # Usage
//!
//! ```bash
//! # Watch the built-in skirmish in the terminal
//! cargo run -p turf_headless -- run --render
//!
//! # Run a scenario file and write metrics JSON
//! cargo run -p turf_headless -- stats --scenario scenarios/canyon.ron --output metrics.json
//!
//! # Check that a scenario reproduces the same state hash across runs
//! cargo run -p turf_headless -- verify --runs 5 --ticks 500
//! ```
//!
//! Logs go to stderr; stdout carries rendered frames and metrics output.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use turf_headless::{
    ascii::{render_ascii, AsciiConfig},
    runner::{RunConfig, Runner},
    scenario::Scenario,
};

#[derive(Parser)]
#[command(name = "turf_headless")]
#[command(about = "Headless territorial grid simulation runner")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario, optionally rendering frames to the terminal
    Run {
        /// Scenario RON file (defaults to the built-in skirmish)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Maximum ticks to run
        #[arg(short, long, default_value = "1000")]
        ticks: u64,

        /// Render the grid after every tick
        #[arg(long)]
        render: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Keep running even after one side is eliminated
        #[arg(long)]
        no_stop: bool,
    },

    /// Run a scenario and emit metrics JSON
    Stats {
        /// Scenario RON file (defaults to the built-in skirmish)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Maximum ticks to run
        #[arg(short, long, default_value = "1000")]
        ticks: u64,

        /// Metrics sampling interval in ticks
        #[arg(long, default_value = "10")]
        sample_interval: u64,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify a scenario reproduces the same state hash across runs
    Verify {
        /// Scenario RON file (defaults to the built-in skirmish)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Ticks per run
        #[arg(short, long, default_value = "500")]
        ticks: u64,

        /// Number of runs to compare
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs to stderr; stdout is for frames and metrics.
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level.to_string())),
        )
        .init();

    match execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            tracing::error!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn load_scenario(path: Option<&PathBuf>) -> Result<Scenario, String> {
    match path {
        Some(path) => Scenario::load(path).map_err(|e| e.to_string()),
        None => Ok(Scenario::skirmish()),
    }
}

fn execute(command: Commands) -> Result<(), String> {
    match command {
        Commands::Run {
            scenario,
            ticks,
            render,
            no_color,
            no_stop,
        } => {
            let scenario = load_scenario(scenario.as_ref())?;
            let config = RunConfig {
                max_ticks: ticks,
                sample_interval: 10,
                stop_on_victory: !no_stop,
            };
            let ascii = AsciiConfig {
                show_legend: true,
                use_color: !no_color,
            };
            let runner = Runner::from_scenario(&scenario, config).map_err(|e| e.to_string())?;
            let metrics = runner.run_with(|sim, _| {
                if render {
                    println!("tick {}", sim.current_tick());
                    println!("{}", render_ascii(sim.world(), &ascii));
                }
            });
            match metrics.survivor {
                Some(player) => println!(
                    "player {player} holds the grid after {} ticks",
                    metrics.ticks
                ),
                None => println!("contested after {} ticks", metrics.ticks),
            }
            Ok(())
        }

        Commands::Stats {
            scenario,
            ticks,
            sample_interval,
            output,
        } => {
            let scenario = load_scenario(scenario.as_ref())?;
            let config = RunConfig {
                max_ticks: ticks,
                sample_interval,
                stop_on_victory: true,
            };
            let metrics = Runner::from_scenario(&scenario, config)
                .map_err(|e| e.to_string())?
                .run();
            let json = serde_json::to_string_pretty(&metrics).map_err(|e| e.to_string())?;
            match output {
                Some(path) => std::fs::write(&path, json).map_err(|e| e.to_string())?,
                None => println!("{json}"),
            }
            Ok(())
        }

        Commands::Verify {
            scenario,
            ticks,
            runs,
        } => {
            let scenario = load_scenario(scenario.as_ref())?;
            let mut hashes = Vec::new();
            for _ in 0..runs.max(1) {
                let config = RunConfig {
                    max_ticks: ticks,
                    sample_interval: ticks.max(1),
                    stop_on_victory: false,
                };
                let metrics = Runner::from_scenario(&scenario, config)
                    .map_err(|e| e.to_string())?
                    .run();
                hashes.push(metrics.final_state_hash);
            }
            if hashes.windows(2).all(|pair| pair[0] == pair[1]) {
                println!(
                    "deterministic: {} runs of {} ticks all hashed {:016x}",
                    hashes.len(),
                    ticks,
                    hashes[0]
                );
                Ok(())
            } else {
                Err(format!("state hashes diverged: {hashes:x?}"))
            }
        }
    }
}
