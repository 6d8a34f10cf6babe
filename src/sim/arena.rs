//! Arena Model
//!
//! Static and dynamic platforms (fixed, oscillating, crumbling) plus hazard
//! zones. The arena owns no combat logic; it answers geometry queries over
//! *active* geometry only and advances its own platform timers once per tick.
//!
//! Arena layouts are declarative content: built-in specs per arena index,
//! or RON files loaded through [`ArenaSpec::load_from_file`].

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::path::Path;

use super::geometry::Rect;

/// Behavior tag for a platform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum PlatformKind {
    #[default]
    Fixed,
    /// Sinusoidal offset around the spawn position.
    Oscillating {
        amp_x: f32,
        amp_y: f32,
        speed: f32,
        phase: f32,
    },
    /// Collapses `delay` seconds after first bearing a combatant's weight,
    /// reactivates `respawn` seconds later.
    Crumbling { delay: f32, respawn: f32 },
}

/// Declarative platform description (arena content boundary).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformSpec {
    pub rect: Rect,
    #[serde(default)]
    pub kind: PlatformKind,
}

/// Declarative hazard description. Hazards drain health continuously
/// (rate x dt) while overlapping a combatant's body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardSpec {
    pub rect: Rect,
    pub damage_rate: f32,
}

/// Complete declarative arena layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaSpec {
    pub name: String,
    pub bounds: Rect,
    /// Spawn points for side 0 and side 1.
    pub spawns: [(f32, f32); 2],
    pub platforms: Vec<PlatformSpec>,
    #[serde(default)]
    pub hazards: Vec<HazardSpec>,
    /// Render palette, passed through to the snapshot untouched.
    #[serde(default)]
    pub palette: Vec<String>,
}

impl ArenaSpec {
    /// Load an arena layout from a RON file.
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read arena file: {}", e))?;
        ron::from_str(&contents).map_err(|e| format!("Failed to parse arena RON: {}", e))
    }

    /// Number of built-in arena layouts.
    pub fn builtin_count() -> usize {
        3
    }

    /// Built-in layout for the given arena index (wraps around).
    pub fn builtin(index: usize) -> Self {
        match index % Self::builtin_count() {
            0 => Self::foundry(),
            1 => Self::scaffold(),
            _ => Self::pendulum(),
        }
    }

    /// Flat floor, two side ledges, a lava pit in the middle.
    fn foundry() -> Self {
        Self {
            name: "Foundry".to_string(),
            bounds: Rect::new(0.0, 0.0, 1280.0, 720.0),
            spawns: [(200.0, 600.0), (1080.0, 600.0)],
            platforms: vec![
                PlatformSpec {
                    rect: Rect::new(0.0, 660.0, 520.0, 60.0),
                    kind: PlatformKind::Fixed,
                },
                PlatformSpec {
                    rect: Rect::new(760.0, 660.0, 520.0, 60.0),
                    kind: PlatformKind::Fixed,
                },
                PlatformSpec {
                    rect: Rect::new(140.0, 470.0, 220.0, 24.0),
                    kind: PlatformKind::Fixed,
                },
                PlatformSpec {
                    rect: Rect::new(920.0, 470.0, 220.0, 24.0),
                    kind: PlatformKind::Fixed,
                },
                PlatformSpec {
                    rect: Rect::new(540.0, 540.0, 200.0, 24.0),
                    kind: PlatformKind::Fixed,
                },
            ],
            hazards: vec![HazardSpec {
                rect: Rect::new(520.0, 690.0, 240.0, 30.0),
                damage_rate: 35.0,
            }],
            palette: vec!["#2b2b33".into(), "#d35400".into(), "#f1c40f".into()],
        }
    }

    /// Crumbling upper ledges over a solid floor.
    fn scaffold() -> Self {
        Self {
            name: "Scaffold".to_string(),
            bounds: Rect::new(0.0, 0.0, 1280.0, 720.0),
            spawns: [(180.0, 600.0), (1100.0, 600.0)],
            platforms: vec![
                PlatformSpec {
                    rect: Rect::new(0.0, 660.0, 1280.0, 60.0),
                    kind: PlatformKind::Fixed,
                },
                PlatformSpec {
                    rect: Rect::new(220.0, 480.0, 180.0, 20.0),
                    kind: PlatformKind::Crumbling {
                        delay: 0.8,
                        respawn: 4.0,
                    },
                },
                PlatformSpec {
                    rect: Rect::new(880.0, 480.0, 180.0, 20.0),
                    kind: PlatformKind::Crumbling {
                        delay: 0.8,
                        respawn: 4.0,
                    },
                },
                PlatformSpec {
                    rect: Rect::new(550.0, 360.0, 180.0, 20.0),
                    kind: PlatformKind::Crumbling {
                        delay: 0.6,
                        respawn: 5.0,
                    },
                },
            ],
            hazards: vec![],
            palette: vec!["#1e272e".into(), "#8395a7".into(), "#ee5253".into()],
        }
    }

    /// Oscillating center platforms over a hazard floor strip.
    fn pendulum() -> Self {
        Self {
            name: "Pendulum".to_string(),
            bounds: Rect::new(0.0, 0.0, 1280.0, 720.0),
            spawns: [(160.0, 560.0), (1120.0, 560.0)],
            platforms: vec![
                PlatformSpec {
                    rect: Rect::new(0.0, 620.0, 360.0, 100.0),
                    kind: PlatformKind::Fixed,
                },
                PlatformSpec {
                    rect: Rect::new(920.0, 620.0, 360.0, 100.0),
                    kind: PlatformKind::Fixed,
                },
                PlatformSpec {
                    rect: Rect::new(440.0, 520.0, 160.0, 22.0),
                    kind: PlatformKind::Oscillating {
                        amp_x: 0.0,
                        amp_y: 70.0,
                        speed: 1.1,
                        phase: 0.0,
                    },
                },
                PlatformSpec {
                    rect: Rect::new(690.0, 450.0, 160.0, 22.0),
                    kind: PlatformKind::Oscillating {
                        amp_x: 90.0,
                        amp_y: 0.0,
                        speed: 0.8,
                        phase: 1.7,
                    },
                },
            ],
            hazards: vec![HazardSpec {
                rect: Rect::new(360.0, 700.0, 560.0, 20.0),
                damage_rate: 45.0,
            }],
            palette: vec!["#10101a".into(), "#4b6584".into(), "#0abde3".into()],
        }
    }
}

/// Runtime platform state.
#[derive(Debug, Clone)]
pub struct Platform {
    pub rect: Rect,
    pub active: bool,
    pub kind: PlatformKind,
    /// Position delta since the previous tick; grounded riders apply it to
    /// track the platform smoothly.
    pub carry: Vec2,
    /// Spawn-time min corner, the anchor oscillation offsets from.
    origin: Vec2,
    /// Counting down to collapse once armed by load-bearing contact.
    crumble_timer: Option<f32>,
    /// Counting down to reactivation after a collapse.
    respawn_timer: Option<f32>,
}

impl Platform {
    fn from_spec(spec: &PlatformSpec) -> Self {
        Self {
            rect: spec.rect,
            active: true,
            kind: spec.kind,
            carry: Vec2::ZERO,
            origin: Vec2::new(spec.rect.x, spec.rect.y),
            crumble_timer: None,
            respawn_timer: None,
        }
    }
}

/// Runtime hazard state.
#[derive(Debug, Clone)]
pub struct Hazard {
    pub rect: Rect,
    pub damage_rate: f32,
}

/// A geometry query hit: index into the arena's platform or hazard list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Overlap {
    Platform(usize),
    Hazard(usize),
}

/// The arena resource: query-only geometry for the simulation tick.
#[derive(Resource, Debug, Clone)]
pub struct Arena {
    pub name: String,
    pub bounds: Rect,
    pub spawns: [Vec2; 2],
    pub palette: Vec<String>,
    pub platforms: Vec<Platform>,
    pub hazards: Vec<Hazard>,
    /// Seconds since the arena was built; drives oscillation.
    pub elapsed: f32,
}

impl Arena {
    pub fn from_spec(spec: &ArenaSpec) -> Self {
        Self {
            name: spec.name.clone(),
            bounds: spec.bounds,
            spawns: [
                Vec2::new(spec.spawns[0].0, spec.spawns[0].1),
                Vec2::new(spec.spawns[1].0, spec.spawns[1].1),
            ],
            palette: spec.palette.clone(),
            platforms: spec.platforms.iter().map(Platform::from_spec).collect(),
            hazards: spec
                .hazards
                .iter()
                .map(|h| Hazard {
                    rect: h.rect,
                    damage_rate: h.damage_rate,
                })
                .collect(),
            elapsed: 0.0,
        }
    }

    /// All active geometry overlapping `rect`. Inactive platforms never
    /// appear in the results.
    pub fn query_overlaps(&self, rect: &Rect) -> SmallVec<[Overlap; 4]> {
        let mut hits = SmallVec::new();
        for (i, p) in self.platforms.iter().enumerate() {
            if p.active && p.rect.intersects(rect) {
                hits.push(Overlap::Platform(i));
            }
        }
        for (i, h) in self.hazards.iter().enumerate() {
            if h.rect.intersects(rect) {
                hits.push(Overlap::Hazard(i));
            }
        }
        hits
    }

    /// Indices of active platforms overlapping `rect`.
    pub fn platforms_overlapping(&self, rect: &Rect) -> SmallVec<[usize; 4]> {
        self.platforms
            .iter()
            .enumerate()
            .filter(|(_, p)| p.active && p.rect.intersects(rect))
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of hazards overlapping `rect`.
    pub fn hazards_overlapping(&self, rect: &Rect) -> SmallVec<[usize; 2]> {
        self.hazards
            .iter()
            .enumerate()
            .filter(|(_, h)| h.rect.intersects(rect))
            .map(|(i, _)| i)
            .collect()
    }

    /// Arm the crumble countdown the first time a platform bears weight.
    /// Re-arming only happens after a full collapse/respawn cycle.
    pub fn note_load_bearing_contact(&mut self, index: usize) {
        let platform = &mut self.platforms[index];
        if let PlatformKind::Crumbling { delay, .. } = platform.kind {
            if platform.active && platform.crumble_timer.is_none() {
                platform.crumble_timer = Some(delay);
            }
        }
    }

    /// Advance oscillation offsets and crumble/respawn timers by one tick.
    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt;
        for platform in &mut self.platforms {
            platform.carry = Vec2::ZERO;
            match platform.kind {
                PlatformKind::Fixed => {}
                PlatformKind::Oscillating {
                    amp_x,
                    amp_y,
                    speed,
                    phase,
                } => {
                    let s = (self.elapsed * speed + phase).sin();
                    let new_pos = platform.origin + Vec2::new(amp_x * s, amp_y * s);
                    platform.carry = new_pos - Vec2::new(platform.rect.x, platform.rect.y);
                    platform.rect.x = new_pos.x;
                    platform.rect.y = new_pos.y;
                }
                PlatformKind::Crumbling { respawn, .. } => {
                    if let Some(t) = platform.crumble_timer {
                        let t = t - dt;
                        if t <= 0.0 {
                            platform.active = false;
                            platform.crumble_timer = None;
                            platform.respawn_timer = Some(respawn);
                        } else {
                            platform.crumble_timer = Some(t);
                        }
                    } else if let Some(t) = platform.respawn_timer {
                        let t = t - dt;
                        if t <= 0.0 {
                            platform.active = true;
                            platform.respawn_timer = None;
                        } else {
                            platform.respawn_timer = Some(t);
                        }
                    }
                }
            }
        }
    }
}

/// Advance platform motion and timers. Runs before combatant integration so
/// carry deltas describe this tick's motion.
pub fn update_arena(time: Res<Time>, mut arena: ResMut<Arena>) {
    let dt = time.delta_secs().min(super::constants::MAX_TICK_DT);
    arena.advance(dt);
}
