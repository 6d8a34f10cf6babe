//! Movement and collision
//!
//! One combatant step per tick: platform carry, control, jump, gravity,
//! then axis-separated AABB resolution against active platforms. Horizontal
//! resolution zeroes vx; vertical resolution zeroes vy and only a downward
//! resolution grounds the body, so brushing a wall or bumping a ceiling
//! never restores jumps.

use bevy::prelude::*;

use super::arena::Arena;
use super::combatant::Combatant;
use super::constants::*;
use super::intent::ControlIntent;

/// Advance one combatant by `dt`. Mutates the arena only to arm crumbling
/// platforms the body stands on.
pub fn step_combatant(c: &mut Combatant, intent: &ControlIntent, arena: &mut Arena, dt: f32) {
    // Ride the platform we were standing on, if it still exists and moved
    if let Some(idx) = c.standing_on {
        match arena.platforms.get(idx) {
            Some(p) if p.active => {
                c.pos += p.carry;
                arena.note_load_bearing_contact(idx);
            }
            _ => c.standing_on = None,
        }
    }

    // Horizontal control converges on the target speed; knockback riding on
    // vel.x decays under the same convergence
    let target = intent.move_axis.clamp(-1.0, 1.0) * c.stats.move_speed;
    let rate = if c.grounded {
        GROUND_CONTROL_RATE
    } else {
        AIR_CONTROL_RATE
    };
    c.vel.x += (target - c.vel.x) * (rate * dt).min(1.0);
    if intent.move_axis.abs() > 0.01 {
        c.facing = intent.move_axis.signum();
    }

    // Jump (y-down: jumping is negative vy). Ground jumps and air jumps
    // share one counter, refilled on landing.
    if intent.jump && c.jumps_used < c.stats.max_jumps {
        c.vel.y = -c.stats.jump_power;
        c.jumps_used += 1;
        c.grounded = false;
        c.standing_on = None;
    }

    c.vel.y += WORLD_GRAVITY * dt;

    // Horizontal sweep
    c.pos.x += c.vel.x * dt;
    let body = c.body();
    for idx in arena.platforms_overlapping(&body) {
        let p = &arena.platforms[idx].rect;
        if c.vel.x > 0.0 {
            c.pos.x = p.left() - c.half.x;
        } else if c.vel.x < 0.0 {
            c.pos.x = p.right() + c.half.x;
        }
        c.vel.x = 0.0;
    }

    // Vertical sweep. Grounding is re-earned every tick.
    c.pos.y += c.vel.y * dt;
    c.grounded = false;
    c.standing_on = None;
    let body = c.body();
    for idx in arena.platforms_overlapping(&body) {
        let p = &arena.platforms[idx].rect;
        if c.vel.y > 0.0 {
            c.pos.y = p.top() - c.half.y;
            c.grounded = true;
            c.jumps_used = 0;
            c.standing_on = Some(idx);
            arena.note_load_bearing_contact(idx);
        } else if c.vel.y < 0.0 {
            c.pos.y = p.bottom() + c.half.y;
        }
        c.vel.y = 0.0;
    }

    // Hazards drain continuously while overlapped
    let body = c.body();
    for idx in arena.hazards_overlapping(&body) {
        let rate = arena.hazards[idx].damage_rate;
        c.take_damage(rate * dt);
    }

    // Side walls clamp; falling past the bottom edge is lethal
    let min_x = arena.bounds.left() + c.half.x;
    let max_x = arena.bounds.right() - c.half.x;
    if c.pos.x < min_x {
        c.pos.x = min_x;
        c.vel.x = c.vel.x.max(0.0);
    } else if c.pos.x > max_x {
        c.pos.x = max_x;
        c.vel.x = c.vel.x.min(0.0);
    }
    if c.pos.y - c.half.y > arena.bounds.bottom() {
        c.health = 0.0;
    }
}

/// Integration system: steps every locally simulated, living combatant.
/// Remote mirrors are positioned by inbound network state instead.
pub fn integrate_combatants(
    time: Res<Time>,
    mut arena: ResMut<Arena>,
    mut query: Query<(&mut Combatant, &ControlIntent)>,
) {
    let dt = time.delta_secs().min(MAX_TICK_DT);
    for (mut combatant, intent) in query.iter_mut() {
        if combatant.remote || !combatant.is_alive() {
            continue;
        }
        step_combatant(&mut combatant, intent, &mut arena, dt);
    }
}
