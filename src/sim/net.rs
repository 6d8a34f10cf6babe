//! Network mirror
//!
//! A thin last-message-wins state mirror: the local simulation is
//! authoritative for its own side and periodically publishes a JSON state
//! message; inbound messages reposition the remote side's combatant and
//! replace its mirrored bullets. There is no reconciliation and no input
//! relay; a dropped message is simply superseded by the next one.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::abilities::AbilityId;
use super::combatant::Combatant;
use super::constants::{BULLET_LIFETIME, BULLET_RADIUS, NET_SEND_INTERVAL};
use super::projectiles::{Bullet, Bullets};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StateMsg {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub health: f32,
    pub facing: f32,
    pub ammo: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BulletMsg {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub damage: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NetMessage {
    State {
        seq: u64,
        side: u8,
        state: StateMsg,
        bullets: Vec<BulletMsg>,
    },
    DraftPick {
        seq: u64,
        side: u8,
        ability: AbilityId,
        level: u8,
    },
}

impl NetMessage {
    pub fn seq(&self) -> u64 {
        match self {
            NetMessage::State { seq, .. } | NetMessage::DraftPick { seq, .. } => *seq,
        }
    }
}

pub fn encode(msg: &NetMessage) -> Result<String, String> {
    serde_json::to_string(msg).map_err(|e| format!("Failed to encode net message: {}", e))
}

/// Parse an inbound message. Malformed payloads are dropped, not errors:
/// the next good message supersedes whatever was lost.
pub fn decode(text: &str) -> Option<NetMessage> {
    serde_json::from_str(text).ok()
}

/// Message ready to hand to the transport.
#[derive(Event, Debug, Clone)]
pub struct OutboundNet(pub String);

/// Raw payload received from the transport.
#[derive(Event, Debug, Clone)]
pub struct InboundNet(pub String);

#[derive(Resource, Debug, Clone)]
pub struct NetClock {
    pub send_timer: f32,
    pub next_seq: u64,
    /// Highest inbound sequence applied so far; stale messages are ignored.
    pub last_applied: u64,
}

impl Default for NetClock {
    fn default() -> Self {
        Self {
            send_timer: 0.0,
            next_seq: 1,
            last_applied: 0,
        }
    }
}

/// Publish the local side's state at ~20 Hz.
pub fn publish_state(
    time: Res<Time>,
    mut clock: ResMut<NetClock>,
    bullets: Res<Bullets>,
    query: Query<&Combatant>,
    mut outbound: EventWriter<OutboundNet>,
) {
    clock.send_timer -= time.delta_secs();
    if clock.send_timer > 0.0 {
        return;
    }
    clock.send_timer = NET_SEND_INTERVAL;

    let Some(local) = query.iter().find(|c| !c.remote) else {
        return;
    };
    let msg = NetMessage::State {
        seq: clock.next_seq,
        side: local.side,
        state: StateMsg {
            x: local.pos.x,
            y: local.pos.y,
            vx: local.vel.x,
            vy: local.vel.y,
            health: local.health,
            facing: local.facing,
            ammo: local.ammo,
        },
        bullets: bullets
            .0
            .iter()
            .filter(|b| b.side == local.side && !b.remote)
            .map(|b| BulletMsg {
                x: b.pos.x,
                y: b.pos.y,
                vx: b.vel.x,
                vy: b.vel.y,
                damage: b.damage,
            })
            .collect(),
    };
    clock.next_seq += 1;
    match encode(&msg) {
        Ok(text) => {
            outbound.send(OutboundNet(text));
        }
        Err(e) => warn!("{}", e),
    }
}

/// Apply inbound state to the remote combatant. Only the newest message in
/// the batch wins; everything older than what we already applied is stale.
pub fn apply_inbound(
    mut clock: ResMut<NetClock>,
    mut inbound: EventReader<InboundNet>,
    mut bullets: ResMut<Bullets>,
    mut query: Query<&mut Combatant>,
) {
    let newest = inbound
        .read()
        .filter_map(|m| decode(&m.0))
        .filter(|m| m.seq() > clock.last_applied)
        .max_by_key(|m| m.seq());
    let Some(msg) = newest else { return };
    clock.last_applied = msg.seq();

    match msg {
        NetMessage::State {
            side,
            state,
            bullets: mirrored,
            ..
        } => {
            let Some(mut remote) = query.iter_mut().find(|c| c.remote && c.side == side) else {
                return;
            };
            remote.pos = Vec2::new(state.x, state.y);
            remote.vel = Vec2::new(state.vx, state.vy);
            remote.health = state.health;
            remote.facing = state.facing;
            remote.ammo = state.ammo;

            bullets.0.retain(|b| !(b.remote && b.side == side));
            for m in mirrored {
                bullets.0.push(Bullet {
                    owner: None,
                    side,
                    pos: Vec2::new(m.x, m.y),
                    vel: Vec2::new(m.vx, m.vy),
                    radius: BULLET_RADIUS,
                    damage: m.damage,
                    lifetime: BULLET_LIFETIME,
                    pierce_level: 0,
                    pierce_remaining: 0,
                    pierce_seeded: false,
                    bounce_remaining: 0,
                    explosive_level: 0,
                    unstoppable: false,
                    lifesteal: 0.0,
                    remote: true,
                });
            }
        }
        NetMessage::DraftPick {
            side, ability, level, ..
        } => {
            let Some(mut remote) = query.iter_mut().find(|c| c.remote && c.side == side) else {
                return;
            };
            while remote.levels.level(ability) < level && !remote.levels.is_maxed(ability) {
                remote.levels.raise(ability);
            }
            remote.recompute_from_levels();
        }
    }
}
