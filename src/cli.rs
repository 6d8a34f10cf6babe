//! Command-line interface for DuelSim
//!
//! The simulator runs headless; graphical clients live outside this crate
//! and consume the render-boundary snapshot instead.

use clap::Parser;
use std::path::PathBuf;

/// Real-time duel simulator
#[derive(Parser, Debug)]
#[command(name = "duelsim")]
#[command(about = "Real-time two-combatant duel simulator")]
#[command(version)]
pub struct Args {
    /// Path to a JSON series config file (defaults to a normal-difficulty
    /// three-round series of best-of-3 rounds when omitted)
    #[arg(long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Output path for the match log
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Random seed for deterministic simulation
    #[arg(long)]
    pub seed: Option<u64>,

    /// Maximum duration of a single engagement in seconds
    #[arg(long)]
    pub max_duration: Option<f32>,
}

pub fn parse_args() -> Args {
    Args::parse()
}
