//! End-to-end headless series tests: full app, fixed timestep, seeded runs.

use duelsim::headless::{run_headless_series, HeadlessSeriesConfig};
use duelsim::log::MatchLog;

fn quick_config(seed: u64) -> HeadlessSeriesConfig {
    HeadlessSeriesConfig {
        best_of: 1,
        total_rounds: 3,
        arena: 0,
        difficulty: "normal".to_string(),
        random_seed: Some(seed),
        max_engagement_secs: 45.0,
        output_path: None,
    }
}

#[test]
fn test_series_runs_to_a_coherent_result() {
    let report = run_headless_series(quick_config(1234)).expect("series failed");
    assert!(report.winner <= 1);
    // Every round in the series is played out
    assert_eq!(report.rounds_played, 3);
    assert_eq!(report.series_score[0] + report.series_score[1], 3);
    assert!(
        report.series_score[report.winner as usize]
            > report.series_score[1 - report.winner as usize]
    );
    assert!(report.engagements_played >= report.rounds_played);
    assert_eq!(report.seed, Some(1234));
}

#[test]
fn test_seeded_series_replays_identically() {
    let a = run_headless_series(quick_config(77)).expect("first run failed");
    let b = run_headless_series(quick_config(77)).expect("second run failed");
    assert_eq!(a.winner, b.winner);
    assert_eq!(a.series_score, b.series_score);
    assert_eq!(a.rounds_played, b.rounds_played);
    assert_eq!(a.engagements_played, b.engagements_played);
    assert_eq!(a.damage_dealt, b.damage_dealt);
}

#[test]
fn test_invalid_configs_are_rejected_before_running() {
    let even = HeadlessSeriesConfig {
        best_of: 2,
        ..quick_config(1)
    };
    assert!(run_headless_series(even).is_err());

    let even_rounds = HeadlessSeriesConfig {
        total_rounds: 4,
        ..quick_config(1)
    };
    assert!(run_headless_series(even_rounds).is_err());

    let bad_tier = HeadlessSeriesConfig {
        difficulty: "impossible".to_string(),
        ..quick_config(1)
    };
    assert!(run_headless_series(bad_tier).is_err());

    let bad_arena = HeadlessSeriesConfig {
        arena: 99,
        ..quick_config(1)
    };
    assert!(run_headless_series(bad_arena).is_err());
}

#[test]
fn test_match_log_lands_on_disk_with_round_results() {
    let path = std::env::temp_dir().join(format!("duelsim-series-{}.json", std::process::id()));
    let config = HeadlessSeriesConfig {
        output_path: Some(path.to_string_lossy().into_owned()),
        ..quick_config(4242)
    };
    let report = run_headless_series(config).expect("series failed");
    assert_eq!(report.log_path.as_deref(), Some(&*path.to_string_lossy()));

    let contents = std::fs::read_to_string(&path).expect("log not written");
    let log: MatchLog = serde_json::from_str(&contents).expect("log not valid JSON");
    assert_eq!(log.seed, Some(4242));

    use duelsim::log::MatchLogEventType;
    // One entry per engagement plus one per concluded round
    let rounds = log.entries_of_type(MatchLogEventType::RoundEvent);
    assert_eq!(
        rounds.len() as u32,
        report.engagements_played + report.rounds_played
    );
    assert_eq!(log.entries_of_type(MatchLogEventType::MatchEvent).len(), 1);
    // Drafts open after rounds one and two, both sides picking each time
    assert_eq!(log.entries_of_type(MatchLogEventType::Draft).len(), 4);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_single_round_series_skips_drafting_entirely() {
    let config = HeadlessSeriesConfig {
        total_rounds: 1,
        ..quick_config(5)
    };
    let report = run_headless_series(config).expect("series failed");
    assert_eq!(report.rounds_played, 1);
    assert_eq!(report.engagements_played, 1);
    assert_eq!(report.series_score[report.winner as usize], 1);
}
