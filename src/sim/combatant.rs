//! Combatant state
//!
//! One component per fighter: kinematics, weapon state, health, shields,
//! and the derived stat block recomputed from ability levels.

use bevy::prelude::*;

use super::abilities::{recompute_stats, AbilityLevels};
use super::constants::*;
use super::geometry::Rect;

/// Derived stats, rebuilt from scratch whenever ability levels change.
/// Never mutated incrementally.
#[derive(Debug, Clone, PartialEq)]
pub struct StatBlock {
    pub move_speed: f32,
    pub jump_power: f32,
    /// Total jumps from the ground (1 = no double jump).
    pub max_jumps: u8,
    pub max_health: f32,
    pub fire_delay: f32,
    pub bullet_speed: f32,
    pub bullet_damage: f32,
    pub magazine_size: u32,
    pub reload_time: f32,
    pub pierce_level: u8,
    pub bounce_level: u8,
    pub explosive_level: u8,
    /// Unstoppable bullets ignore terrain entirely.
    pub unstoppable: bool,
    pub shield_capacity: u8,
    pub shield_cooldown: f32,
    /// Fraction of dealt damage returned as healing.
    pub lifesteal_fraction: f32,
    /// Extra pellets per shot beyond the first.
    pub pellet_count: u8,
    /// Bullets fired per trigger pull.
    pub burst_count: u8,
    pub burst_interval: f32,
}

impl Default for StatBlock {
    fn default() -> Self {
        Self {
            move_speed: BASE_MOVE_SPEED,
            jump_power: BASE_JUMP_POWER,
            max_jumps: 1,
            max_health: BASE_MAX_HEALTH,
            fire_delay: BASE_FIRE_DELAY,
            bullet_speed: BASE_BULLET_SPEED,
            bullet_damage: BASE_BULLET_DAMAGE,
            magazine_size: BASE_MAGAZINE_SIZE,
            reload_time: BASE_RELOAD_TIME,
            pierce_level: 0,
            bounce_level: 0,
            explosive_level: 0,
            unstoppable: false,
            shield_capacity: 0,
            shield_cooldown: 0.0,
            lifesteal_fraction: 0.0,
            pellet_count: 0,
            burst_count: 1,
            burst_interval: BASE_BURST_INTERVAL,
        }
    }
}

/// A fighter in the duel. Side 0 spawns on the left, side 1 on the right.
#[derive(Component, Debug, Clone)]
pub struct Combatant {
    pub side: u8,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Body half-extents.
    pub half: Vec2,
    /// Last non-zero horizontal heading, -1.0 or 1.0.
    pub facing: f32,
    pub grounded: bool,
    /// Index of the platform currently stood on, for carry.
    pub standing_on: Option<usize>,
    pub jumps_used: u8,
    pub health: f32,
    pub ammo: u32,
    pub reloading: bool,
    pub reload_timer: f32,
    /// Cooldown until the next trigger pull is accepted.
    pub fire_timer: f32,
    pub shield_charges: u8,
    /// Counts down to the next shield charge regeneration.
    pub shield_timer: f32,
    /// Bullets still owed from the current burst.
    pub burst_queue: u8,
    pub burst_timer: f32,
    /// Aim direction latched at trigger pull, reused by burst follow-ups.
    pub pending_aim: Vec2,
    pub stats: StatBlock,
    pub levels: AbilityLevels,
    pub defeated: bool,
    /// Driven by inbound network state instead of local simulation.
    pub remote: bool,
    pub damage_dealt: f32,
    pub damage_taken: f32,
}

impl Combatant {
    pub fn new(side: u8, spawn: Vec2) -> Self {
        let stats = StatBlock::default();
        Self {
            side,
            pos: spawn,
            vel: Vec2::ZERO,
            half: Vec2::new(BODY_HALF_W, BODY_HALF_H),
            facing: if side == 0 { 1.0 } else { -1.0 },
            grounded: false,
            standing_on: None,
            jumps_used: 0,
            health: stats.max_health,
            ammo: stats.magazine_size,
            reloading: false,
            reload_timer: 0.0,
            fire_timer: 0.0,
            shield_charges: 0,
            shield_timer: 0.0,
            burst_queue: 0,
            burst_timer: 0.0,
            pending_aim: Vec2::X,
            stats,
            levels: AbilityLevels::default(),
            defeated: false,
            remote: false,
            damage_dealt: 0.0,
            damage_taken: 0.0,
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.defeated && self.health > 0.0
    }

    /// Body AABB at the current position.
    pub fn body(&self) -> Rect {
        Rect::from_center(self.pos, self.half)
    }

    /// Rebuild the stat block from ability levels, in the catalog's fixed
    /// application order. A recompute only ever clamps health down; the
    /// engagement reset is what refills pools.
    pub fn recompute_from_levels(&mut self) {
        self.stats = recompute_stats(&self.levels);
        self.health = self.health.min(self.stats.max_health);
        self.shield_charges = self.shield_charges.min(self.stats.shield_capacity);
        self.ammo = self.ammo.min(self.stats.magazine_size);
    }

    /// Reset per-engagement state. Ability levels and derived stats persist
    /// across engagements within a series.
    pub fn reset_for_engagement(&mut self, spawn: Vec2) {
        self.pos = spawn;
        self.vel = Vec2::ZERO;
        self.facing = if self.side == 0 { 1.0 } else { -1.0 };
        self.grounded = false;
        self.standing_on = None;
        self.jumps_used = 0;
        self.health = self.stats.max_health;
        self.ammo = self.stats.magazine_size;
        self.reloading = false;
        self.reload_timer = 0.0;
        self.fire_timer = 0.0;
        self.shield_charges = self.stats.shield_capacity;
        self.shield_timer = self.stats.shield_cooldown;
        self.burst_queue = 0;
        self.burst_timer = 0.0;
        self.defeated = false;
    }

    /// Wipe drafted progression (series over). Damage tallies survive for
    /// the series report.
    pub fn clear_progression(&mut self) {
        self.levels = AbilityLevels::default();
        self.recompute_from_levels();
    }

    /// Apply damage, returning the amount actually applied. Dead combatants
    /// absorb nothing, so simultaneous-hit resolution stays order-free.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        if !self.is_alive() {
            return 0.0;
        }
        self.health -= amount;
        self.damage_taken += amount;
        amount
    }

    /// Heal up to max health.
    pub fn heal(&mut self, amount: f32) {
        if self.is_alive() {
            self.health = (self.health + amount).min(self.stats.max_health);
        }
    }
}

/// Regenerate shield charges over time, one charge per cooldown period.
pub fn regenerate_shields(time: Res<Time>, mut query: Query<&mut Combatant>) {
    let dt = time.delta_secs().min(MAX_TICK_DT);
    for mut c in query.iter_mut() {
        if !c.is_alive() || c.stats.shield_capacity == 0 {
            continue;
        }
        if c.shield_charges >= c.stats.shield_capacity {
            c.shield_timer = c.stats.shield_cooldown;
            continue;
        }
        c.shield_timer -= dt;
        if c.shield_timer <= 0.0 {
            c.shield_charges += 1;
            c.shield_timer = c.stats.shield_cooldown;
        }
    }
}
