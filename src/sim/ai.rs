//! Scripted opponent
//!
//! The AI is a pipeline of pure decision stages over a read-only view of
//! the world: threat detection, movement, jump decision, aim solving. The
//! driver system runs the pipeline and writes a [`ControlIntent`]; nothing
//! downstream can tell an AI intent from a player's.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::arena::Arena;
use super::combatant::Combatant;
use super::constants::*;
use super::geometry::{point_segment_distance_sq, Rect};
use super::intent::{AiControlled, ControlIntent};
use super::projectiles::{Bullet, Bullets};
use super::rng::GameRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn profile(self) -> AiProfile {
        match self {
            Difficulty::Easy => AiProfile {
                reaction_delay: 0.55,
                aim_jitter: 0.14,
                jump_cooldown: 1.2,
                dodge_chance: 0.25,
            },
            Difficulty::Normal => AiProfile {
                reaction_delay: 0.30,
                aim_jitter: 0.07,
                jump_cooldown: 0.8,
                dodge_chance: 0.55,
            },
            Difficulty::Hard => AiProfile {
                reaction_delay: 0.12,
                aim_jitter: 0.025,
                jump_cooldown: 0.5,
                dodge_chance: 0.85,
            },
        }
    }
}

/// Tuning knobs for one difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiProfile {
    /// Seconds between trigger decisions.
    pub reaction_delay: f32,
    /// Aim error, radians of rotation applied to the solved direction.
    pub aim_jitter: f32,
    /// Minimum seconds between dodge jumps.
    pub jump_cooldown: f32,
    /// Probability an incoming threat triggers a dodge at all.
    pub dodge_chance: f32,
}

/// Per-combatant AI working state.
#[derive(Component, Debug, Clone)]
pub struct AiState {
    pub profile: AiProfile,
    /// Preferred horizontal standoff from the opponent.
    pub desired_offset: f32,
    /// Counts down to the next standoff reroll.
    pub reroll_timer: f32,
    /// Counts down to the next trigger decision.
    pub reaction_timer: f32,
    pub jump_timer: f32,
}

impl AiState {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            profile: difficulty.profile(),
            desired_offset: 190.0,
            reroll_timer: 0.0,
            reaction_timer: 0.0,
            jump_timer: 0.0,
        }
    }
}

/// Read-only world view the decision stages work from.
pub struct WorldView<'a> {
    pub me: &'a Combatant,
    pub foe: &'a Combatant,
    pub bullets: &'a [Bullet],
    pub arena: &'a Arena,
}

/// Threat horizon: how far ahead incoming bullets are extrapolated.
const THREAT_LOOKAHEAD: f32 = 0.45;
const THREAT_RADIUS: f32 = 90.0;

/// Closest enemy bullet predicted to pass near the body within the
/// lookahead window.
pub fn detect_threat(view: &WorldView) -> Option<Vec2> {
    let mut best: Option<(f32, Vec2)> = None;
    for b in view.bullets.iter().filter(|b| b.side != view.me.side) {
        let end = b.pos + b.vel * THREAT_LOOKAHEAD;
        let d2 = point_segment_distance_sq(view.me.pos, b.pos, end);
        if d2 < THREAT_RADIUS * THREAT_RADIUS && best.map_or(true, |(bd2, _)| d2 < bd2) {
            best = Some((d2, b.pos));
        }
    }
    best.map(|(_, pos)| pos)
}

/// Horizontal axis: hold the preferred standoff band around the opponent.
pub fn movement_intent(view: &WorldView, state: &AiState) -> f32 {
    let dx = view.foe.pos.x - view.me.pos.x;
    let dist = dx.abs();
    let toward = dx.signum();
    // Deadband so the AI does not oscillate around the exact offset
    if dist > state.desired_offset + 30.0 {
        toward
    } else if dist < state.desired_offset - 30.0 {
        -toward
    } else {
        0.0
    }
}

/// How far ahead of the body the hazard hop check looks.
const HAZARD_LOOKAHEAD: f32 = 70.0;

/// Horizontal slack around a platform when deciding it sits under the foe.
const PLATFORM_CHASE_SLACK: f32 = 40.0;

/// Jump to dodge a detected threat, hop a hazard in the movement path, or
/// chase a foe holding high ground when a platform up there is actually
/// reachable and nothing blocks the head.
pub fn jump_decision(
    view: &WorldView,
    state: &mut AiState,
    threat: Option<Vec2>,
    move_axis: f32,
    rng: &mut GameRng,
) -> bool {
    if state.jump_timer > 0.0 {
        return false;
    }
    if threat.is_some() && rng.chance(state.profile.dodge_chance) {
        state.jump_timer = state.profile.jump_cooldown;
        return true;
    }
    if view.me.grounded && move_axis != 0.0 {
        let probe = Rect::from_center(
            view.me.pos + Vec2::new(move_axis.signum() * HAZARD_LOOKAHEAD, view.me.half.y),
            view.me.half,
        );
        if !view.arena.hazards_overlapping(&probe).is_empty() {
            state.jump_timer = state.profile.jump_cooldown;
            return true;
        }
    }
    // Foe well above us (y-down: smaller y is higher): jump only when an
    // active platform under the foe is within jump reach and the head probe
    // is clear
    if view.me.grounded && view.foe.pos.y < view.me.pos.y - 80.0 {
        let apex =
            view.me.stats.jump_power * view.me.stats.jump_power / (2.0 * WORLD_GRAVITY);
        let reach = apex * view.me.stats.max_jumps as f32;
        let reachable = view.arena.platforms.iter().any(|p| {
            p.active
                && p.rect.bottom() < view.me.pos.y
                && view.me.pos.y - p.rect.top() < reach
                && view.foe.pos.x > p.rect.left() - PLATFORM_CHASE_SLACK
                && view.foe.pos.x < p.rect.right() + PLATFORM_CHASE_SLACK
        });
        let head = Rect::from_center(
            view.me.pos - Vec2::new(0.0, view.me.half.y * 3.0),
            view.me.half,
        );
        if reachable && view.arena.platforms_overlapping(&head).is_empty() {
            state.jump_timer = state.profile.jump_cooldown;
            return true;
        }
    }
    false
}

/// Number of candidate flight times sampled by the aim solver.
const AIM_SAMPLES: usize = 12;

/// Ballistic lead solver: sample flight times, pick the one whose implied
/// launch speed best matches the actual bullet speed, and aim above the
/// predicted position to cancel bullet drop over that flight.
pub fn solve_aim(me_pos: Vec2, foe: &Combatant, bullet_speed: f32) -> Vec2 {
    let g = WORLD_GRAVITY * BULLET_GRAVITY_FACTOR;
    let mut best_t = 0.1;
    let mut best_err = f32::MAX;
    for i in 0..AIM_SAMPLES {
        let t = 0.1 + i as f32 * 1.0 / AIM_SAMPLES as f32;
        let predicted = foe.pos + foe.vel * t;
        let err = (predicted.distance(me_pos) / t - bullet_speed).abs();
        if err < best_err {
            best_err = err;
            best_t = t;
        }
    }
    let predicted = foe.pos + foe.vel * best_t;
    // Aim higher by the drop accrued over the flight (y-down: subtract)
    predicted - Vec2::new(0.0, 0.5 * g * best_t * best_t)
}

/// Run the pipeline for every AI-controlled combatant.
pub fn drive_ai(
    time: Res<Time>,
    arena: Res<Arena>,
    bullets: Res<Bullets>,
    mut rng: ResMut<GameRng>,
    mut ai_query: Query<(Entity, &mut AiState, &mut ControlIntent), With<AiControlled>>,
    combatants: Query<(Entity, &Combatant)>,
) {
    let dt = time.delta_secs().min(MAX_TICK_DT);
    for (entity, mut state, mut intent) in ai_query.iter_mut() {
        state.reroll_timer -= dt;
        state.reaction_timer -= dt;
        state.jump_timer = (state.jump_timer - dt).max(0.0);
        if state.reroll_timer <= 0.0 {
            state.desired_offset = rng.random_range(120.0, 260.0);
            state.reroll_timer = rng.random_range(2.0, 4.0);
        }

        let Ok((_, me)) = combatants.get(entity) else {
            continue;
        };
        let Some(foe) = combatants
            .iter()
            .find(|(e, c)| *e != entity && c.side != me.side)
            .map(|(_, c)| c)
        else {
            continue;
        };

        intent.clear_edges();
        if !me.is_alive() || !foe.is_alive() {
            intent.move_axis = 0.0;
            continue;
        }

        let view = WorldView {
            me,
            foe,
            bullets: &bullets.0,
            arena: &arena,
        };
        let threat = detect_threat(&view);
        intent.move_axis = movement_intent(&view, &state);
        intent.jump = jump_decision(&view, &mut state, threat, intent.move_axis, &mut rng);

        let aim = solve_aim(me.pos, foe, me.stats.bullet_speed);
        let dir = aim - me.pos;
        let jitter = rng.random_range(-state.profile.aim_jitter, state.profile.aim_jitter);
        let rotated = Vec2::from_angle(jitter).rotate(dir);
        intent.aim = me.pos + rotated;

        if state.reaction_timer <= 0.0 {
            intent.fire = true;
            state.reaction_timer = state.profile.reaction_delay;
        }

        // Top off the magazine when the foe is far and we are low
        if !me.reloading
            && me.ammo * 3 < me.stats.magazine_size
            && (foe.pos.x - me.pos.x).abs() > 400.0
        {
            intent.reload = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::arena::ArenaSpec;

    fn view_arena() -> Arena {
        Arena::from_spec(&ArenaSpec::builtin(0))
    }

    #[test]
    fn test_threat_detection_ignores_own_and_outbound_bullets() {
        let arena = view_arena();
        let me = Combatant::new(0, Vec2::new(500.0, 300.0));
        let foe = Combatant::new(1, Vec2::new(900.0, 300.0));
        let make = |side: u8, pos: Vec2, vel: Vec2| Bullet {
            owner: None,
            side,
            pos,
            vel,
            radius: BULLET_RADIUS,
            damage: 10.0,
            lifetime: 1.0,
            pierce_level: 0,
            pierce_remaining: 0,
            pierce_seeded: false,
            bounce_remaining: 0,
            explosive_level: 0,
            unstoppable: false,
            lifesteal: 0.0,
            remote: false,
        };

        // Own bullet heading straight at us is not a threat
        let own = vec![make(0, Vec2::new(700.0, 300.0), Vec2::new(-700.0, 0.0))];
        let view = WorldView {
            me: &me,
            foe: &foe,
            bullets: &own,
            arena: &arena,
        };
        assert!(detect_threat(&view).is_none());

        // Enemy bullet flying away is not a threat
        let away = vec![make(1, Vec2::new(700.0, 300.0), Vec2::new(700.0, 0.0))];
        let view = WorldView {
            me: &me,
            foe: &foe,
            bullets: &away,
            arena: &arena,
        };
        assert!(detect_threat(&view).is_none());

        // Enemy bullet inbound is
        let inbound = vec![make(1, Vec2::new(700.0, 300.0), Vec2::new(-700.0, 0.0))];
        let view = WorldView {
            me: &me,
            foe: &foe,
            bullets: &inbound,
            arena: &arena,
        };
        assert!(detect_threat(&view).is_some());
    }

    #[test]
    fn test_movement_holds_the_standoff_band() {
        let arena = view_arena();
        let state = AiState::new(Difficulty::Normal);
        let me = Combatant::new(0, Vec2::new(500.0, 300.0));

        let far = Combatant::new(1, Vec2::new(1100.0, 300.0));
        let view = WorldView {
            me: &me,
            foe: &far,
            bullets: &[],
            arena: &arena,
        };
        assert_eq!(movement_intent(&view, &state), 1.0);

        let close = Combatant::new(1, Vec2::new(540.0, 300.0));
        let view = WorldView {
            me: &me,
            foe: &close,
            bullets: &[],
            arena: &arena,
        };
        assert_eq!(movement_intent(&view, &state), -1.0);

        let banded = Combatant::new(1, Vec2::new(500.0 + state.desired_offset, 300.0));
        let view = WorldView {
            me: &me,
            foe: &banded,
            bullets: &[],
            arena: &arena,
        };
        assert_eq!(movement_intent(&view, &state), 0.0);
    }

    #[test]
    fn test_aim_leads_a_moving_target() {
        let mut foe = Combatant::new(1, Vec2::new(900.0, 300.0));
        foe.vel = Vec2::new(-200.0, 0.0);
        let aim = solve_aim(Vec2::new(300.0, 300.0), &foe, BASE_BULLET_SPEED);
        // Lead: aim lands where the foe is heading, not where it is
        assert!(aim.x < foe.pos.x);
        // Drop compensation: aim above the target (y-down: smaller y)
        assert!(aim.y < foe.pos.y);
    }

    #[test]
    fn test_dodge_respects_jump_cooldown() {
        let mut rng = GameRng::from_seed(5);
        let arena = view_arena();
        let me = Combatant::new(0, Vec2::new(500.0, 300.0));
        let foe = Combatant::new(1, Vec2::new(900.0, 300.0));
        let view = WorldView {
            me: &me,
            foe: &foe,
            bullets: &[],
            arena: &arena,
        };
        let mut state = AiState::new(Difficulty::Hard);
        state.jump_timer = 1.0;
        // Cooldown pins the decision regardless of the threat
        assert!(!jump_decision(&view, &mut state, Some(Vec2::ZERO), 0.0, &mut rng));
    }

    #[test]
    fn test_high_ground_chase_needs_a_reachable_platform_and_clear_head() {
        let mut rng = GameRng::from_seed(13);
        let arena = view_arena();
        let mut me = Combatant::new(0, Vec2::new(420.0, 560.0));
        me.grounded = true;

        // A ledge sits under the foe and within jump reach: chase it
        let foe = Combatant::new(1, Vec2::new(300.0, 400.0));
        let view = WorldView {
            me: &me,
            foe: &foe,
            bullets: &[],
            arena: &arena,
        };
        let mut state = AiState::new(Difficulty::Normal);
        assert!(jump_decision(&view, &mut state, None, 0.0, &mut rng));

        // Foe above the open pit gap: nothing to land on, stay put
        let foe = Combatant::new(1, Vec2::new(480.0, 400.0));
        let view = WorldView {
            me: &me,
            foe: &foe,
            bullets: &[],
            arena: &arena,
        };
        let mut state = AiState::new(Difficulty::Normal);
        assert!(!jump_decision(&view, &mut state, None, 0.0, &mut rng));

        // Standing right under the ledge: the head is blocked, no jump
        me.pos = Vec2::new(250.0, 560.0);
        let foe = Combatant::new(1, Vec2::new(250.0, 400.0));
        let view = WorldView {
            me: &me,
            foe: &foe,
            bullets: &[],
            arena: &arena,
        };
        let mut state = AiState::new(Difficulty::Normal);
        assert!(!jump_decision(&view, &mut state, None, 0.0, &mut rng));
    }

    #[test]
    fn test_hazard_in_the_path_forces_a_hop() {
        let mut rng = GameRng::from_seed(9);
        let mut arena = view_arena();
        let me = {
            let mut c = Combatant::new(0, Vec2::new(500.0, 300.0));
            c.grounded = true;
            c
        };
        let foe = Combatant::new(1, Vec2::new(900.0, 300.0));
        arena.hazards[0].rect = Rect::new(540.0, 280.0, 60.0, 60.0);
        let view = WorldView {
            me: &me,
            foe: &foe,
            bullets: &[],
            arena: &arena,
        };
        let mut state = AiState::new(Difficulty::Normal);
        assert!(jump_decision(&view, &mut state, None, 1.0, &mut rng));
        // Moving the other way, the same hazard is ignored
        let mut state = AiState::new(Difficulty::Normal);
        assert!(!jump_decision(&view, &mut state, None, -1.0, &mut rng));
    }
}
