//! DuelSim - Real-Time Duel Simulator
//!
//! A two-combatant duel: gravity platformer movement, a projectile system
//! with modifier behaviors (pierce, bounce, explosive, lifesteal), an
//! ability-draft progression between rounds, a scripted AI opponent, and a
//! best-of-N round/series match state machine.
//!
//! Rendering, input devices, matchmaking, and persistence are external
//! collaborators; this library exposes the simulation core plus its boundary
//! contracts (snapshot, intents, draft events, network mirror messages).

pub mod cli;
pub mod headless;
pub mod log;
pub mod sim;

// Re-export commonly used types
pub use headless::{HeadlessSeriesConfig, SeriesReport};
pub use log::{MatchLog, MatchLogEventType};
pub use sim::match_flow::{MatchPhase, MatchState};
