//! Projectiles
//!
//! Bullets live in one dense `Vec` owned by the tick driver and are removed
//! by swap-remove; there are no bullet entities. Each bullet snapshots the
//! shooter's weapon stats at spawn, so a draft pick mid-flight never changes
//! bullets already in the air.
//!
//! Core stepping and hit resolution are plain functions over slices; the
//! Bevy systems are thin wrappers that gather the queries.

use bevy::prelude::*;

use super::arena::Arena;
use super::combatant::Combatant;
use super::constants::*;
use super::geometry::{normalize_or, Rect};
use super::intent::ControlIntent;
use super::rng::GameRng;

#[derive(Debug, Clone)]
pub struct Bullet {
    pub owner: Option<Entity>,
    pub side: u8,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub lifetime: f32,
    /// Shooter's pierce level at spawn; converted into a pass-through budget
    /// at the first combatant hit.
    pub pierce_level: u8,
    pub pierce_remaining: u8,
    pub pierce_seeded: bool,
    pub bounce_remaining: u8,
    pub explosive_level: u8,
    pub unstoppable: bool,
    /// Fraction of dealt damage healed back to the shooter.
    pub lifesteal: f32,
    /// Mirrored from the network; stepped for display, never deals damage.
    pub remote: bool,
}

/// All live bullets.
#[derive(Resource, Debug, Default)]
pub struct Bullets(pub Vec<Bullet>);

/// A lingering blast: deals its damage over [`EXPLOSION_LIFETIME`] to every
/// combatant inside the radius, the owner's side included.
#[derive(Debug, Clone)]
pub struct Explosion {
    pub side: u8,
    pub pos: Vec2,
    pub radius: f32,
    pub damage_rate: f32,
    pub time_left: f32,
}

#[derive(Resource, Debug, Default)]
pub struct Explosions(pub Vec<Explosion>);

impl Explosions {
    pub fn spawn(&mut self, side: u8, pos: Vec2, level: u8) {
        self.0.push(Explosion {
            side,
            pos,
            radius: explosion_radius(level),
            damage_rate: explosion_damage(level) / EXPLOSION_LIFETIME,
            time_left: EXPLOSION_LIFETIME,
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageSource {
    Bullet,
    Explosion,
}

/// Combat damage landed this tick, for the match log.
#[derive(Event, Debug, Clone)]
pub struct DamageEvent {
    pub attacker_side: u8,
    pub victim_side: u8,
    pub amount: f32,
    pub source: DamageSource,
}

/// Advance weapon timers and fire on request. Fires nothing while reloading;
/// pulling the trigger on an empty magazine starts the reload instead.
pub fn try_fire(
    entity: Option<Entity>,
    c: &mut Combatant,
    intent: &ControlIntent,
    rng: &mut GameRng,
    bullets: &mut Vec<Bullet>,
    dt: f32,
) {
    c.fire_timer = (c.fire_timer - dt).max(0.0);

    if c.reloading {
        c.reload_timer -= dt;
        if c.reload_timer <= 0.0 {
            c.reloading = false;
            c.ammo = c.stats.magazine_size;
        }
        return;
    }

    // Burst follow-ups were paid for at the trigger pull
    if c.burst_queue > 0 {
        c.burst_timer -= dt;
        if c.burst_timer <= 0.0 {
            c.burst_queue -= 1;
            c.burst_timer = c.stats.burst_interval;
            let aim = c.pending_aim;
            emit_pellets(entity, c, aim, rng, bullets);
        }
        return;
    }

    if intent.reload && c.ammo < c.stats.magazine_size {
        start_reload(c);
        return;
    }

    if intent.fire && c.fire_timer <= 0.0 {
        if c.ammo == 0 {
            start_reload(c);
            return;
        }
        c.ammo -= 1;
        c.fire_timer = c.stats.fire_delay;
        c.pending_aim = normalize_or(intent.aim - c.pos, Vec2::new(c.facing, 0.0));
        c.burst_queue = c.stats.burst_count.saturating_sub(1);
        c.burst_timer = c.stats.burst_interval;
        let aim = c.pending_aim;
        emit_pellets(entity, c, aim, rng, bullets);
    }
}

fn start_reload(c: &mut Combatant) {
    c.reloading = true;
    c.reload_timer = c.stats.reload_time;
}

/// Spawn one shot's worth of bullets: a single bullet, or a fan of pellets
/// spread evenly across the multishot arc with per-pellet jitter.
fn emit_pellets(
    entity: Option<Entity>,
    c: &Combatant,
    aim: Vec2,
    rng: &mut GameRng,
    bullets: &mut Vec<Bullet>,
) {
    let count = 1 + c.stats.pellet_count as usize;
    let spread = if c.stats.pellet_count > 0 {
        MULTISHOT_BASE_SPREAD + MULTISHOT_SPREAD_PER_LEVEL * (c.stats.pellet_count - 1) as f32
    } else {
        0.0
    };
    let base = aim.y.atan2(aim.x);
    for i in 0..count {
        let offset = if count > 1 {
            -spread * 0.5 + spread * i as f32 / (count - 1) as f32
        } else {
            0.0
        };
        let jitter = if spread > 0.0 {
            rng.random_range(-PELLET_JITTER, PELLET_JITTER)
        } else {
            0.0
        };
        let angle = base + offset + jitter;
        bullets.push(Bullet {
            owner: entity,
            side: c.side,
            pos: c.pos,
            vel: Vec2::new(angle.cos(), angle.sin()) * c.stats.bullet_speed,
            radius: BULLET_RADIUS,
            damage: c.stats.bullet_damage,
            lifetime: BULLET_LIFETIME,
            pierce_level: c.stats.pierce_level,
            pierce_remaining: 0,
            pierce_seeded: false,
            bounce_remaining: c.stats.bounce_level,
            explosive_level: c.stats.explosive_level,
            unstoppable: c.stats.unstoppable,
            lifesteal: c.stats.lifesteal_fraction,
            remote: false,
        });
    }
}

/// Step one bullet: ballistic arc, lifetime, terrain. Returns `false` when
/// the bullet should be removed.
pub fn step_bullet(b: &mut Bullet, arena: &Arena, explosions: &mut Explosions, dt: f32) -> bool {
    b.lifetime -= dt;
    if b.lifetime <= 0.0 {
        return false;
    }

    let prev = b.pos;
    b.vel.y += WORLD_GRAVITY * BULLET_GRAVITY_FACTOR * dt;
    b.pos += b.vel * dt;

    if b.pos.x < arena.bounds.left() - b.radius
        || b.pos.x > arena.bounds.right() + b.radius
        || b.pos.y > arena.bounds.bottom() + b.radius
        || b.pos.y < arena.bounds.top() - 200.0
    {
        return false;
    }

    if b.unstoppable {
        return true;
    }

    let probe = Rect::from_center(b.pos, Vec2::splat(b.radius));
    for idx in arena.platforms_overlapping(&probe) {
        let p = &arena.platforms[idx].rect;
        if b.bounce_remaining > 0 {
            b.bounce_remaining -= 1;
            // Reflect on the axis the bullet crossed into the platform
            let crossed_vertically = prev.y + b.radius <= p.top() || prev.y - b.radius >= p.bottom();
            if crossed_vertically {
                b.vel.y = -b.vel.y * BOUNCE_DAMPING;
            } else {
                b.vel.x = -b.vel.x * BOUNCE_DAMPING;
            }
            b.pos = prev;
            return true;
        }
        if b.explosive_level > 0 {
            explosions.spawn(b.side, b.pos, b.explosive_level);
        }
        return false;
    }
    true
}

/// Resolve bullet-vs-combatant hits. `fighters` is every living combatant;
/// bullets never hit their own side. Returns the damage records landed.
pub fn resolve_bullet_hits(
    bullets: &mut Vec<Bullet>,
    fighters: &mut [&mut Combatant],
    explosions: &mut Explosions,
) -> Vec<DamageEvent> {
    let mut events = Vec::new();
    let mut i = 0;
    'bullets: while i < bullets.len() {
        if bullets[i].remote {
            i += 1;
            continue;
        }
        let probe = Rect::from_center(bullets[i].pos, Vec2::splat(bullets[i].radius));

        let mut heal = 0.0_f32;
        let mut dealt_total = 0.0_f32;
        let mut consumed = false;
        for target in fighters.iter_mut() {
            if target.side == bullets[i].side || !target.is_alive() {
                continue;
            }
            if !probe.intersects(&target.body()) {
                continue;
            }

            if target.shield_charges > 0 {
                // A shield charge eats the whole bullet, pierce and all
                target.shield_charges -= 1;
                target.shield_timer = target.stats.shield_cooldown;
                consumed = true;
                break;
            }

            let b = &mut bullets[i];
            let dealt = target.take_damage(b.damage);
            let dir = normalize_or(b.vel, Vec2::X);
            target.vel += dir * HIT_KNOCKBACK;
            heal = dealt * b.lifesteal;
            dealt_total = dealt;
            events.push(DamageEvent {
                attacker_side: b.side,
                victim_side: target.side,
                amount: dealt,
                source: DamageSource::Bullet,
            });
            if b.explosive_level > 0 {
                explosions.spawn(b.side, b.pos, b.explosive_level);
            }

            // Pierce budget is established at the first combatant hit and
            // every hit, that one included, spends a unit: a level-L
            // bullet survives L hits and is consumed on hit L+1
            if !b.pierce_seeded {
                b.pierce_seeded = true;
                b.pierce_remaining = b.pierce_level;
            }
            if b.pierce_remaining > 0 {
                b.pierce_remaining -= 1;
            } else {
                consumed = true;
            }
            break;
        }

        if dealt_total > 0.0 {
            let side = bullets[i].side;
            if let Some(owner) = fighters.iter_mut().find(|f| f.side == side) {
                owner.damage_dealt += dealt_total;
                if heal > 0.0 {
                    owner.heal(heal);
                }
            }
        }

        if consumed {
            bullets.swap_remove(i);
            continue 'bullets;
        }
        i += 1;
    }
    events
}

/// Tick active explosions, applying radius damage to everyone inside,
/// including the owner's own side.
pub fn step_explosions(
    explosions: &mut Explosions,
    fighters: &mut [&mut Combatant],
    dt: f32,
) -> Vec<DamageEvent> {
    let mut events = Vec::new();
    let mut i = 0;
    while i < explosions.0.len() {
        let tick = explosions.0[i].time_left.min(dt);
        let (side, pos, radius, rate) = {
            let e = &explosions.0[i];
            (e.side, e.pos, e.radius, e.damage_rate)
        };
        let mut dealt_to_enemy = 0.0;
        for target in fighters.iter_mut() {
            if !target.is_alive() {
                continue;
            }
            let closest = Vec2::new(
                pos.x.clamp(target.body().left(), target.body().right()),
                pos.y.clamp(target.body().top(), target.body().bottom()),
            );
            if closest.distance_squared(pos) > radius * radius {
                continue;
            }
            let dealt = target.take_damage(rate * tick);
            if dealt > 0.0 {
                events.push(DamageEvent {
                    attacker_side: side,
                    victim_side: target.side,
                    amount: dealt,
                    source: DamageSource::Explosion,
                });
                if target.side != side {
                    dealt_to_enemy += dealt;
                }
            }
        }
        if dealt_to_enemy > 0.0 {
            if let Some(owner) = fighters.iter_mut().find(|f| f.side == side) {
                owner.damage_dealt += dealt_to_enemy;
            }
        }

        explosions.0[i].time_left -= dt;
        if explosions.0[i].time_left <= 0.0 {
            explosions.0.swap_remove(i);
        } else {
            i += 1;
        }
    }
    events
}

/// Weapon system: timers, reloads, bursts, trigger pulls.
pub fn fire_weapons(
    time: Res<Time>,
    mut rng: ResMut<GameRng>,
    mut bullets: ResMut<Bullets>,
    mut query: Query<(Entity, &mut Combatant, &ControlIntent)>,
) {
    let dt = time.delta_secs().min(MAX_TICK_DT);
    for (entity, mut combatant, intent) in query.iter_mut() {
        if combatant.remote || !combatant.is_alive() {
            continue;
        }
        try_fire(Some(entity), &mut combatant, intent, &mut rng, &mut bullets.0, dt);
    }
}

/// Bullet integration and terrain collision.
pub fn step_bullets(
    time: Res<Time>,
    arena: Res<Arena>,
    mut bullets: ResMut<Bullets>,
    mut explosions: ResMut<Explosions>,
) {
    let dt = time.delta_secs().min(MAX_TICK_DT);
    let mut i = 0;
    while i < bullets.0.len() {
        if step_bullet(&mut bullets.0[i], &arena, &mut explosions, dt) {
            i += 1;
        } else {
            bullets.0.swap_remove(i);
        }
    }
}

/// Hit resolution and explosion ticking, emitting damage events for the log.
pub fn resolve_combat_damage(
    time: Res<Time>,
    mut bullets: ResMut<Bullets>,
    mut explosions: ResMut<Explosions>,
    mut query: Query<&mut Combatant>,
    mut damage_events: EventWriter<DamageEvent>,
) {
    let dt = time.delta_secs().min(MAX_TICK_DT);
    let mut list: Vec<Mut<Combatant>> = query.iter_mut().collect();
    let mut fighters: Vec<&mut Combatant> = list.iter_mut().map(|m| &mut **m).collect();

    for ev in resolve_bullet_hits(&mut bullets.0, &mut fighters, &mut explosions) {
        damage_events.send(ev);
    }
    for ev in step_explosions(&mut explosions, &mut fighters, dt) {
        damage_events.send(ev);
    }
}
