//! Control intents
//!
//! Controllers (AI, input, network) write intents; the physics and weapon
//! systems read them. Nothing downstream knows or cares who authored an
//! intent, which is what lets the AI, a local player, and a remote mirror
//! share one movement and combat pipeline.

use bevy::prelude::*;

/// Per-tick control state for one combatant.
#[derive(Component, Debug, Clone)]
pub struct ControlIntent {
    /// Horizontal movement axis in [-1, 1].
    pub move_axis: f32,
    /// Edge-triggered: consumed by the jump system each tick.
    pub jump: bool,
    pub fire: bool,
    pub reload: bool,
    /// World-space point the combatant is aiming at.
    pub aim: Vec2,
}

impl Default for ControlIntent {
    fn default() -> Self {
        Self {
            move_axis: 0.0,
            jump: false,
            fire: false,
            reload: false,
            aim: Vec2::ZERO,
        }
    }
}

impl ControlIntent {
    /// Clear edge-triggered flags after they have been consumed.
    pub fn clear_edges(&mut self) {
        self.jump = false;
        self.fire = false;
        self.reload = false;
    }
}

/// Marker: this combatant is driven by the scripted AI.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct AiControlled;
