//! Headless Trainer
//!
//! Runs AI vs AI episodes against a shared Q-table and prints a summary.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use grid_tactics::core::config::{load_config, TacticsConfig};
use grid_tactics::core::error::Result;
use grid_tactics::learning::policy::LayeredPolicy;
use grid_tactics::session::{TrainingSession, TrainingSummary};
use tracing_subscriber::EnvFilter;

/// Headless Trainer - self-play episodes for the unit Q-table
#[derive(Parser, Debug)]
#[command(name = "train")]
#[command(about = "Train unit policies by AI vs AI self-play")]
struct Args {
    /// Number of episodes to play
    #[arg(long, default_value_t = 100)]
    episodes: usize,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Q-table snapshot to resume from and save to
    #[arg(long)]
    table: Option<PathBuf>,

    /// TOML config (defaults built in when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Starting exploration rate, overrides the config
    #[arg(long)]
    epsilon: Option<f64>,

    /// Pure epsilon-greedy, without the structural rules
    #[arg(long)]
    tabular: bool,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("grid_tactics=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(summary) => {
            print_summary(&args.format, &summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "training failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<TrainingSummary> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => TacticsConfig::default(),
    };
    if let Some(epsilon) = args.epsilon {
        config.learning.epsilon = epsilon;
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    let policy = if args.tabular {
        LayeredPolicy::tabular()
    } else {
        LayeredPolicy::strategic()
    };
    tracing::info!(seed, episodes = args.episodes, "starting training");

    let mut session = TrainingSession::new(config, policy, seed)?;
    if let Some(path) = &args.table {
        session = session.with_snapshot(path)?;
    }
    session.train(args.episodes)
}

fn print_summary(format: &str, summary: &TrainingSummary) {
    match format {
        "json" => match serde_json::to_string_pretty(summary) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::error!(error = %e, "failed to serialize summary"),
        },
        _ => {
            println!("Training Summary");
            println!("================");
            println!("Episodes: {}", summary.episodes);
            println!("Player wins: {}", summary.player_wins);
            println!("Enemy wins: {}", summary.enemy_wins);
            println!("Draws: {}", summary.draws);
            println!("Final epsilon: {:.4}", summary.final_epsilon);
            println!("States: {}", summary.states);
            println!("Entries: {}", summary.entries);
        }
    }
}
