//! Render snapshot
//!
//! A flat, serializable view of everything a renderer needs, rebuilt from
//! scratch at the end of every tick. Render code (or a debugging dump)
//! reads this resource and never touches simulation state.

use bevy::prelude::*;
use serde::Serialize;

use super::arena::Arena;
use super::combatant::Combatant;
use super::constants::EXPLOSION_LIFETIME;
use super::geometry::Rect;
use super::match_flow::MatchState;
use super::projectiles::{Bullets, Explosions};

#[derive(Debug, Clone, Serialize)]
pub struct FighterView {
    pub side: u8,
    pub x: f32,
    pub y: f32,
    pub facing: f32,
    pub health: f32,
    pub max_health: f32,
    pub ammo: u32,
    pub magazine: u32,
    pub reloading: bool,
    pub shield_charges: u8,
    pub defeated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformView {
    pub rect: Rect,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulletView {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub side: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExplosionView {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    /// 0 at spawn, 1 right before the blast fades.
    pub progress: f32,
}

#[derive(Resource, Debug, Clone, Default, Serialize)]
pub struct RenderSnapshot {
    pub arena_name: String,
    pub palette: Vec<String>,
    pub platforms: Vec<PlatformView>,
    pub hazards: Vec<Rect>,
    pub fighters: Vec<FighterView>,
    pub bullets: Vec<BulletView>,
    pub explosions: Vec<ExplosionView>,
    pub series_score: [u32; 2],
    pub round_index: u32,
}

/// Rebuild the snapshot. Runs after resolution so the view reflects the
/// finished tick.
pub fn build_snapshot(
    arena: Res<Arena>,
    bullets: Res<Bullets>,
    explosions: Res<Explosions>,
    state: Res<MatchState>,
    query: Query<&Combatant>,
    mut snapshot: ResMut<RenderSnapshot>,
) {
    snapshot.arena_name = arena.name.clone();
    snapshot.palette = arena.palette.clone();
    snapshot.platforms = arena
        .platforms
        .iter()
        .map(|p| PlatformView {
            rect: p.rect,
            active: p.active,
        })
        .collect();
    snapshot.hazards = arena.hazards.iter().map(|h| h.rect).collect();

    snapshot.fighters = query
        .iter()
        .map(|c| FighterView {
            side: c.side,
            x: c.pos.x,
            y: c.pos.y,
            facing: c.facing,
            health: c.health.max(0.0),
            max_health: c.stats.max_health,
            ammo: c.ammo,
            magazine: c.stats.magazine_size,
            reloading: c.reloading,
            shield_charges: c.shield_charges,
            defeated: c.defeated,
        })
        .collect();
    snapshot.fighters.sort_by_key(|f| f.side);

    snapshot.bullets = bullets
        .0
        .iter()
        .map(|b| BulletView {
            x: b.pos.x,
            y: b.pos.y,
            radius: b.radius,
            side: b.side,
        })
        .collect();
    snapshot.explosions = explosions
        .0
        .iter()
        .map(|e| ExplosionView {
            x: e.pos.x,
            y: e.pos.y,
            radius: e.radius,
            progress: 1.0 - (e.time_left / EXPLOSION_LIFETIME).clamp(0.0, 1.0),
        })
        .collect();
    snapshot.series_score = state.series_score;
    snapshot.round_index = state.round_index;
}
