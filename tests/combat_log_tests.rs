//! Match log structure and serialization format tests.

use duelsim::log::{MatchLog, MatchLogEntry, MatchLogEventType};
use regex::Regex;

fn sample_log() -> MatchLog {
    let mut log = MatchLog {
        seed: Some(9001),
        ..Default::default()
    };
    log.log(0.8, MatchLogEventType::Damage, "side 0 hit side 1 for 10.0".into());
    log.log(1.2, MatchLogEventType::Explosion, "side 1 blast side 0 for 4.4".into());
    log.log(14.5, MatchLogEventType::RoundEvent, "engagement 1 won by side 0".into());
    log.log(14.5, MatchLogEventType::RoundEvent, "round 1 won by side 0".into());
    log.log(15.5, MatchLogEventType::Draft, "side 1 drafted Ricochet to level 1".into());
    log.log(30.0, MatchLogEventType::MatchEvent, "series won by side 0 (2-0)".into());
    log
}

#[test]
fn test_damage_messages_follow_the_wire_format() {
    let log = sample_log();
    let damage = Regex::new(r"^side [01] (hit|blast) side [01] for \d+\.\d$").unwrap();
    for entry in log
        .entries_of_type(MatchLogEventType::Damage)
        .into_iter()
        .chain(log.entries_of_type(MatchLogEventType::Explosion))
    {
        assert!(damage.is_match(&entry.message), "bad entry: {}", entry.message);
    }
}

#[test]
fn test_round_and_series_messages_parse() {
    let log = sample_log();
    let round = Regex::new(r"^(engagement|round) \d+ won by side [01]$").unwrap();
    for entry in log.entries_of_type(MatchLogEventType::RoundEvent) {
        assert!(round.is_match(&entry.message));
    }
    let series = Regex::new(r"^series won by side [01] \(\d+-\d+\)$").unwrap();
    for entry in log.entries_of_type(MatchLogEventType::MatchEvent) {
        assert!(series.is_match(&entry.message));
    }
}

#[test]
fn test_timestamps_are_monotonic() {
    let log = sample_log();
    for pair in log.entries.windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp);
    }
}

#[test]
fn test_save_round_trips_through_json() {
    let log = sample_log();
    let path = std::env::temp_dir().join(format!("duelsim-log-{}.json", std::process::id()));
    let path_str = path.to_string_lossy().into_owned();
    let written = log.save_to_file(&path_str).unwrap();
    assert_eq!(written, path_str);

    let contents = std::fs::read_to_string(&path).unwrap();
    let parsed: MatchLog = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed.seed, Some(9001));
    assert_eq!(parsed.entries.len(), log.entries.len());
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_entry_json_shape_is_stable() {
    let entry = MatchLogEntry {
        timestamp: 2.5,
        event_type: MatchLogEventType::Draft,
        message: "side 0 drafted Barrier to level 2".into(),
    };
    let json = serde_json::to_string(&entry).unwrap();
    assert!(json.contains("\"timestamp\":2.5"));
    assert!(json.contains("\"event_type\":\"Draft\""));
    assert!(json.contains("\"message\""));
}
