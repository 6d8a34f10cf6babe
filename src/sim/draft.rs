//! Ability draft
//!
//! Between rounds each combatant picks one card from a rarity-weighted pool
//! of distinct offers. Maxed cards never reappear; when a rolled rarity has
//! no remaining candidates the slot backfills from whatever is left, so a
//! late-series pool is still full whenever enough cards remain.

use bevy::prelude::*;

use super::abilities::{AbilityId, AbilityLevels, Rarity};
use super::constants::DRAFT_POOL_SIZE;
use super::rng::GameRng;

/// One card offer in a draft pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DraftOffer {
    pub id: AbilityId,
    /// The level the card reaches if picked.
    pub next_level: u8,
}

/// A pool has been generated for the given side.
#[derive(Event, Debug, Clone)]
pub struct DraftPoolReady {
    pub side: u8,
    pub offers: Vec<DraftOffer>,
}

/// The given side picked a card from its pool.
#[derive(Event, Debug, Clone)]
pub struct DraftSelection {
    pub side: u8,
    pub id: AbilityId,
}

/// A pick was applied (AI or human), for the match log.
#[derive(Event, Debug, Clone)]
pub struct DraftPicked {
    pub side: u8,
    pub id: AbilityId,
    pub level: u8,
}

/// Roll a draft pool: up to [`DRAFT_POOL_SIZE`] distinct cards, each chosen
/// by first rolling a rarity tier by weight, then a uniform card within it.
pub fn generate_draft_pool(levels: &AbilityLevels, rng: &mut GameRng) -> Vec<DraftOffer> {
    let mut candidates = levels.draftable();
    let mut offers = Vec::with_capacity(DRAFT_POOL_SIZE);

    while offers.len() < DRAFT_POOL_SIZE && !candidates.is_empty() {
        let picked = roll_card(&candidates, rng);
        candidates.retain(|&id| id != picked);
        offers.push(DraftOffer {
            id: picked,
            next_level: levels.level(picked) + 1,
        });
    }
    offers
}

/// Weighted rarity roll over the tiers actually present in `candidates`,
/// then a uniform pick inside the winning tier.
fn roll_card(candidates: &[AbilityId], rng: &mut GameRng) -> AbilityId {
    let tiers = [
        Rarity::Common,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::Secret,
    ];
    let total: f32 = tiers
        .iter()
        .filter(|&&r| candidates.iter().any(|id| id.rarity() == r))
        .map(|r| r.weight())
        .sum();

    let mut roll = rng.random_f32() * total;
    for rarity in tiers {
        let tier: Vec<AbilityId> = candidates
            .iter()
            .copied()
            .filter(|id| id.rarity() == rarity)
            .collect();
        if tier.is_empty() {
            continue;
        }
        roll -= rarity.weight();
        if roll < 0.0 {
            return tier[rng.random_index(tier.len())];
        }
    }
    // Float edge: total consumed without landing in a tier
    candidates[rng.random_index(candidates.len())]
}
