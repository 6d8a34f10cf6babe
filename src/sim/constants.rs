//! Simulation Constants
//!
//! Centralized location for magic numbers used throughout the simulation.
//! This makes it easier to tune balance and ensures consistency.

// ============================================================================
// Timing
// ============================================================================

/// Headless tick cadence in seconds (60 Hz).
pub const TICK_SECS: f64 = 1.0 / 60.0;

/// Upper clamp on the per-tick delta. A stalled host produces one long tick;
/// clamping keeps the integration step bounded instead of letting bodies
/// tunnel arbitrarily far.
pub const MAX_TICK_DT: f32 = 1.0 / 30.0;

// ============================================================================
// World physics
// ============================================================================

/// Downward acceleration applied to combatants, in units/s^2.
/// The coordinate system is canvas-style: +y is down, a platform's top
/// surface is its smaller y edge.
pub const WORLD_GRAVITY: f32 = 1800.0;

/// Bullets fall at a fraction of world gravity, giving them a shallow
/// ballistic arc instead of dropping like bodies.
pub const BULLET_GRAVITY_FACTOR: f32 = 0.2;

/// Horizontal ground speed for an unmodified combatant, units/s.
pub const BASE_MOVE_SPEED: f32 = 300.0;

/// Initial upward speed of an unmodified jump, units/s.
pub const BASE_JUMP_POWER: f32 = 640.0;

/// Impulse applied to a combatant struck by a bullet, along the bullet's
/// travel direction.
pub const HIT_KNOCKBACK: f32 = 140.0;

/// How quickly horizontal velocity converges on the control target, per
/// second. Knockback impulses decay under the same convergence.
pub const GROUND_CONTROL_RATE: f32 = 12.0;
pub const AIR_CONTROL_RATE: f32 = 6.0;

// ============================================================================
// Combatant base stats
// ============================================================================

pub const BASE_MAX_HEALTH: f32 = 100.0;
pub const BASE_FIRE_DELAY: f32 = 0.35;
pub const BASE_BULLET_SPEED: f32 = 700.0;
pub const BASE_BULLET_DAMAGE: f32 = 10.0;
pub const BASE_MAGAZINE_SIZE: u32 = 8;
pub const BASE_RELOAD_TIME: f32 = 1.2;
pub const BASE_BURST_INTERVAL: f32 = 0.06;

/// Combatant body half-extents (width, height).
pub const BODY_HALF_W: f32 = 14.0;
pub const BODY_HALF_H: f32 = 22.0;

// ============================================================================
// Bullets
// ============================================================================

pub const BULLET_RADIUS: f32 = 4.0;
pub const BULLET_LIFETIME: f32 = 3.0;

/// Vertical velocity retained after a bounce off terrain.
pub const BOUNCE_DAMPING: f32 = 0.6;

/// Full spread arc for multishot at pellet level 1, in radians. Higher
/// levels widen the arc by `MULTISHOT_SPREAD_PER_LEVEL` per extra pellet.
pub const MULTISHOT_BASE_SPREAD: f32 = 0.30;
pub const MULTISHOT_SPREAD_PER_LEVEL: f32 = 0.08;

/// Per-pellet aim jitter inside the spread arc, radians.
pub const PELLET_JITTER: f32 = 0.02;

// ============================================================================
// Explosions
// ============================================================================

pub const EXPLOSION_BASE_RADIUS: f32 = 80.0;
pub const EXPLOSION_RADIUS_PER_LEVEL: f32 = 20.0;
pub const EXPLOSION_BASE_DAMAGE: f32 = 20.0;
pub const EXPLOSION_DAMAGE_PER_LEVEL: f32 = 8.0;

/// Explosions linger briefly and deal their damage over this window rather
/// than as a single spike.
pub const EXPLOSION_LIFETIME: f32 = 0.25;

/// Blast radius for an explosion at the given explosive level.
pub fn explosion_radius(level: u8) -> f32 {
    EXPLOSION_BASE_RADIUS + EXPLOSION_RADIUS_PER_LEVEL * level.saturating_sub(1) as f32
}

/// Total blast damage for an explosion at the given explosive level.
pub fn explosion_damage(level: u8) -> f32 {
    EXPLOSION_BASE_DAMAGE + EXPLOSION_DAMAGE_PER_LEVEL * level.saturating_sub(1) as f32
}

// ============================================================================
// Draft
// ============================================================================

/// Cards offered per draft pick.
pub const DRAFT_POOL_SIZE: usize = 3;

/// Ability level cap. A card at this level is never offered again.
pub const MAX_ABILITY_LEVEL: u8 = 4;

// ============================================================================
// Network mirror
// ============================================================================

/// Outbound state snapshots are throttled to ~20 Hz.
pub const NET_SEND_INTERVAL: f32 = 0.05;
