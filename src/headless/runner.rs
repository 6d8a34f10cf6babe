//! Headless series runner
//!
//! Builds a minimal app with no window or render stack and drives it with
//! explicit `update` calls at a fixed manual timestep, so runs are fast,
//! seeded runs replay exactly, and the final world stays readable for the
//! report once the series resolves.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

use super::config::HeadlessSeriesConfig;
use crate::log::{MatchLog, MatchLogPlugin};
use crate::sim::combatant::Combatant;
use crate::sim::constants::TICK_SECS;
use crate::sim::match_flow::{ArenaChoice, EngagementClock, MatchPhase, MatchState};
use crate::sim::rng::GameRng;
use crate::sim::{spawn_ai_duelists, AiDifficulty, SimPlugin};

/// Outcome of a completed headless series.
#[derive(Debug, Clone)]
pub struct SeriesReport {
    pub winner: u8,
    pub series_score: [u32; 2],
    pub rounds_played: u32,
    pub engagements_played: u32,
    pub damage_dealt: [f32; 2],
    pub seed: Option<u64>,
    pub log_path: Option<String>,
}

fn start_series(mut next: ResMut<NextState<MatchPhase>>) {
    next.set(MatchPhase::Engagement);
}

/// Run an AI-vs-AI series to completion and report the result.
pub fn run_headless_series(config: HeadlessSeriesConfig) -> Result<SeriesReport, String> {
    config.validate()?;

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(bevy::state::app::StatesPlugin)
        .add_plugins(bevy::log::LogPlugin::default())
        // Fixed manual timestep: every update advances exactly one tick of
        // virtual time no matter how fast the loop spins
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            TICK_SECS,
        )))
        .add_plugins(SimPlugin)
        .add_plugins(MatchLogPlugin);

    let rng = match config.random_seed {
        Some(seed) => GameRng::from_seed(seed),
        None => GameRng::from_entropy(),
    };
    app.insert_resource(rng)
        .insert_resource(MatchState::new(config.best_of, config.total_rounds))
        .insert_resource(EngagementClock::new(config.max_engagement_secs))
        .insert_resource(ArenaChoice(config.arena))
        .insert_resource(AiDifficulty(config.difficulty()))
        .insert_resource(MatchLog {
            seed: config.random_seed,
            ..Default::default()
        })
        .add_systems(Startup, (spawn_ai_duelists, start_series).chain());

    // Tick budget watchdog: a stuck series aborts instead of spinning.
    // Generous cap: every engagement plus intermissions and drafts, doubled
    let ticks_per_engagement = (config.max_engagement_secs as f64 / TICK_SECS) as u64 + 600;
    let max_engagements = (config.best_of * config.total_rounds) as u64;
    let mut budget = ticks_per_engagement * max_engagements * 2;

    // Drive the schedule by hand; `App::run` would hand the world to the
    // runner and leave nothing behind to read the report from
    loop {
        app.update();
        let phase = *app.world().resource::<State<MatchPhase>>().get();
        if phase == MatchPhase::SeriesComplete {
            break;
        }
        budget -= 1;
        if budget == 0 {
            return Err("Series did not complete within the tick budget".to_string());
        }
    }

    let state = app
        .world()
        .get_resource::<MatchState>()
        .ok_or("Match state missing after run")?;
    let winner = state
        .series_winner
        .ok_or("Series finished without a winner")?;
    let series_score = state.series_score;
    let rounds_played = state.round_index;
    let engagements_played = state.engagements_played;

    let mut damage_dealt = [0.0_f32; 2];
    let mut query = app.world_mut().query::<&Combatant>();
    for c in query.iter(app.world()) {
        damage_dealt[(c.side as usize).min(1)] = c.damage_dealt;
    }

    let mut log_path = None;
    if let Some(path) = &config.output_path {
        let log = app
            .world()
            .get_resource::<MatchLog>()
            .ok_or("Match log missing after run")?;
        log_path = Some(log.save_to_file(path)?);
        info!("Match log written to {}", path);
    }

    Ok(SeriesReport {
        winner,
        series_score,
        rounds_played,
        engagements_played,
        damage_dealt,
        seed: config.random_seed,
        log_path,
    })
}
