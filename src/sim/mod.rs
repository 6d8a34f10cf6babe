//! Simulation core
//!
//! Everything that advances the duel lives here. Each tick runs three
//! chained phases: intents (controllers write what they want), integration
//! (arena, bodies, weapons, bullets move), and resolution (damage lands,
//! shields regenerate, round ends are detected, the snapshot is rebuilt).
//! Systems only join the schedule through [`add_core_sim_systems`], so a
//! headless runner and a windowed build share the exact same tick.

pub mod abilities;
pub mod ai;
pub mod arena;
pub mod combatant;
pub mod constants;
pub mod draft;
pub mod geometry;
pub mod intent;
pub mod match_flow;
pub mod net;
pub mod physics;
pub mod projectiles;
pub mod rng;
pub mod snapshot;

use bevy::ecs::schedule::Condition;
use bevy::prelude::*;

use ai::{AiState, Difficulty};
use arena::{Arena, ArenaSpec};
use combatant::Combatant;
use intent::{AiControlled, ControlIntent};
use match_flow::{ArenaChoice, DraftQueue, EngagementClock, MatchPhase, MatchState};
use projectiles::{Bullets, Explosions};
use rng::GameRng;
use snapshot::RenderSnapshot;

/// Tick phases, chained in declaration order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimPhase {
    /// Controllers (AI, input, network) write intents.
    Intents,
    /// Arena, combatant, and bullet motion.
    Integration,
    /// Damage, deaths, round transitions, snapshot.
    Resolution,
}

/// Register the per-tick combat systems under `condition`. Callers pick the
/// run condition (typically `in_state(MatchPhase::Engagement)`) so the same
/// registration serves interactive and headless schedules.
pub fn add_core_sim_systems<M>(app: &mut App, condition: impl Condition<M> + Clone) {
    app.add_systems(
        Update,
        (net::apply_inbound, ai::drive_ai)
            .chain()
            .in_set(SimPhase::Intents)
            .run_if(condition.clone()),
    );
    app.add_systems(
        Update,
        (
            arena::update_arena,
            physics::integrate_combatants,
            projectiles::fire_weapons,
            projectiles::step_bullets,
        )
            .chain()
            .in_set(SimPhase::Integration)
            .run_if(condition.clone()),
    );
    app.add_systems(
        Update,
        (
            projectiles::resolve_combat_damage,
            combatant::regenerate_shields,
            match_flow::detect_engagement_end,
            net::publish_state,
            snapshot::build_snapshot,
        )
            .chain()
            .in_set(SimPhase::Resolution)
            .run_if(condition),
    );
}

/// Core simulation plugin. Expects the states plugin to already be
/// installed (DefaultPlugins carries it; minimal schedules add
/// `bevy::state::app::StatesPlugin` themselves).
pub struct SimPlugin;

impl Plugin for SimPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<MatchPhase>()
            .configure_sets(
                Update,
                (SimPhase::Intents, SimPhase::Integration, SimPhase::Resolution).chain(),
            )
            .insert_resource(Arena::from_spec(&ArenaSpec::builtin(0)))
            .init_resource::<Bullets>()
            .init_resource::<Explosions>()
            .init_resource::<RenderSnapshot>()
            .init_resource::<GameRng>()
            .init_resource::<ArenaChoice>()
            .init_resource::<DraftQueue>()
            .init_resource::<net::NetClock>()
            .insert_resource(MatchState::new(3, 3))
            .insert_resource(EngagementClock::new(120.0))
            .add_event::<projectiles::DamageEvent>()
            .add_event::<draft::DraftPoolReady>()
            .add_event::<draft::DraftSelection>()
            .add_event::<draft::DraftPicked>()
            .add_event::<match_flow::EngagementOver>()
            .add_event::<match_flow::RoundConcluded>()
            .add_event::<match_flow::SeriesOutcome>()
            .add_event::<net::OutboundNet>()
            .add_event::<net::InboundNet>()
            .add_systems(OnEnter(MatchPhase::Engagement), match_flow::setup_engagement)
            .add_systems(
                OnEnter(MatchPhase::RoundIntermission),
                match_flow::enter_intermission,
            )
            .add_systems(
                Update,
                match_flow::tick_intermission.run_if(in_state(MatchPhase::RoundIntermission)),
            )
            .add_systems(
                Update,
                match_flow::process_draft.run_if(in_state(MatchPhase::Draft)),
            )
            .add_systems(
                OnEnter(MatchPhase::SeriesComplete),
                match_flow::clear_series_progression,
            );
        add_core_sim_systems(app, in_state(MatchPhase::Engagement));
    }
}

/// Spawn two AI-driven fighters at the arena's spawn points.
pub fn spawn_ai_duelists(mut commands: Commands, arena: Res<Arena>, difficulty: Res<AiDifficulty>) {
    for side in 0..2u8 {
        commands.spawn((
            Combatant::new(side, arena.spawns[side as usize]),
            ControlIntent::default(),
            AiState::new(difficulty.0),
            AiControlled,
        ));
    }
}

/// Difficulty both scripted fighters run at.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct AiDifficulty(pub Difficulty);
