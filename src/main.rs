//! DuelSim - Real-Time Duel Simulator
//!
//! Headless entry point: loads a series configuration, runs the duel to
//! series completion, and writes the match log.

use duelsim::cli;
use duelsim::headless::{run_headless_series, HeadlessSeriesConfig};

fn main() {
    let args = cli::parse_args();

    let mut config = match args.config {
        Some(path) => match HeadlessSeriesConfig::load_from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => HeadlessSeriesConfig::default(),
    };

    // CLI flags override the config file
    if let Some(seed) = args.seed {
        config.random_seed = Some(seed);
    }
    if let Some(output) = args.output {
        config.output_path = Some(output.to_string_lossy().into_owned());
    }
    if let Some(max_duration) = args.max_duration {
        config.max_engagement_secs = max_duration;
    }

    match run_headless_series(config) {
        Ok(report) => {
            println!(
                "Series complete: side {} wins {}-{} over {} rounds ({} engagements)",
                report.winner,
                report.series_score[0],
                report.series_score[1],
                report.rounds_played,
                report.engagements_played
            );
        }
        Err(e) => {
            eprintln!("Series failed: {}", e);
            std::process::exit(1);
        }
    }
}
