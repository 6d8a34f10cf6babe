//! Match Log
//!
//! Structured record of everything that happened in a series: damage,
//! drafts, round results, the final outcome. Each entry is timestamped
//! with simulation time. The log serializes to JSON for headless runs
//! and post-match analysis.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::sim::draft::DraftPicked;
use crate::sim::match_flow::{EngagementOver, RoundConcluded, SeriesOutcome};
use crate::sim::projectiles::{DamageEvent, DamageSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchLogEventType {
    Damage,
    Explosion,
    Draft,
    RoundEvent,
    MatchEvent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchLogEntry {
    /// Simulation time in seconds.
    pub timestamp: f32,
    pub event_type: MatchLogEventType,
    pub message: String,
}

/// The accumulating log for one series.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchLog {
    /// Seed the series ran under, when deterministic.
    pub seed: Option<u64>,
    pub entries: Vec<MatchLogEntry>,
}

impl MatchLog {
    pub fn log(&mut self, timestamp: f32, event_type: MatchLogEventType, message: String) {
        self.entries.push(MatchLogEntry {
            timestamp,
            event_type,
            message,
        });
    }

    pub fn entries_of_type(&self, event_type: MatchLogEventType) -> Vec<&MatchLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Serialize the log to pretty JSON and write it to `path`. Returns the
    /// path written for the caller's report.
    pub fn save_to_file(&self, path: &str) -> Result<String, String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize match log: {}", e))?;
        std::fs::write(path, json).map_err(|e| format!("Failed to write match log: {}", e))?;
        Ok(path.to_string())
    }
}

/// Aggregate bullet damage per tick into one entry per attacker; explosions
/// log individually since they are rare and carry their own note.
pub fn record_combat_damage(
    time: Res<Time>,
    mut events: EventReader<DamageEvent>,
    mut log: ResMut<MatchLog>,
) {
    let now = time.elapsed_secs();
    for ev in events.read() {
        let (kind, noun) = match ev.source {
            DamageSource::Bullet => (MatchLogEventType::Damage, "hit"),
            DamageSource::Explosion => (MatchLogEventType::Explosion, "blast"),
        };
        log.log(
            now,
            kind,
            format!(
                "side {} {} side {} for {:.1}",
                ev.attacker_side, noun, ev.victim_side, ev.amount
            ),
        );
    }
}

pub fn record_draft_picks(
    time: Res<Time>,
    mut events: EventReader<DraftPicked>,
    mut log: ResMut<MatchLog>,
) {
    let now = time.elapsed_secs();
    for ev in events.read() {
        log.log(
            now,
            MatchLogEventType::Draft,
            format!("side {} drafted {} to level {}", ev.side, ev.id.name(), ev.level),
        );
    }
}

pub fn record_round_results(
    time: Res<Time>,
    mut engagements: EventReader<EngagementOver>,
    mut rounds: EventReader<RoundConcluded>,
    mut log: ResMut<MatchLog>,
) {
    let now = time.elapsed_secs();
    for ev in engagements.read() {
        log.log(
            now,
            MatchLogEventType::RoundEvent,
            format!(
                "engagement {} won by side {}",
                ev.engagement_index + 1,
                ev.winner
            ),
        );
    }
    for ev in rounds.read() {
        log.log(
            now,
            MatchLogEventType::RoundEvent,
            format!("round {} won by side {}", ev.round_index, ev.winner),
        );
    }
}

pub fn record_series_outcome(
    time: Res<Time>,
    mut events: EventReader<SeriesOutcome>,
    mut log: ResMut<MatchLog>,
) {
    let now = time.elapsed_secs();
    for ev in events.read() {
        log.log(
            now,
            MatchLogEventType::MatchEvent,
            format!(
                "series won by side {} ({}-{})",
                ev.winner, ev.score[0], ev.score[1]
            ),
        );
    }
}

/// Installs the log resource and its event recorders.
pub struct MatchLogPlugin;

impl Plugin for MatchLogPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MatchLog>().add_systems(
            Update,
            (
                record_combat_damage,
                record_draft_picks,
                record_round_results,
                record_series_outcome,
            ),
        );
    }
}
