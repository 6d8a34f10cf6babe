//! Ability catalog
//!
//! The 19 draftable cards, their rarities, and the declarative stat deltas
//! each level applies. Stats are never patched in place: any level change
//! triggers a full [`recompute_stats`] pass from base values, walking the
//! catalog in one fixed order so multiplicative cards always compose the
//! same way. Compound cards (heavy magazine, glass cannon) apply last.

use serde::{Deserialize, Serialize};

use super::combatant::StatBlock;
use super::constants::MAX_ABILITY_LEVEL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityId {
    RapidFire,
    Damage,
    Speed,
    Jump,
    DoubleJump,
    Pierce,
    Bounce,
    Unstoppable,
    Sniper,
    Explosive,
    Shield,
    Lifesteal,
    MaxHealth,
    Multishot,
    Burst,
    MagazineSize,
    ReloadSpeed,
    HeavyMagazine,
    GlassCannon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
    Secret,
}

impl Rarity {
    /// Draft roll weight. Secret cards are a ~1-in-100 sight.
    pub fn weight(self) -> f32 {
        match self {
            Rarity::Common => 50.0,
            Rarity::Rare => 30.0,
            Rarity::Epic => 14.0,
            Rarity::Legendary => 5.0,
            Rarity::Secret => 1.0,
        }
    }
}

impl AbilityId {
    /// Every card, in catalog order. This order is also the stat application
    /// order, except that compound cards are deferred to the end.
    pub const ALL: [AbilityId; 19] = [
        AbilityId::RapidFire,
        AbilityId::Damage,
        AbilityId::Speed,
        AbilityId::Jump,
        AbilityId::DoubleJump,
        AbilityId::Pierce,
        AbilityId::Bounce,
        AbilityId::Unstoppable,
        AbilityId::Sniper,
        AbilityId::Explosive,
        AbilityId::Shield,
        AbilityId::Lifesteal,
        AbilityId::MaxHealth,
        AbilityId::Multishot,
        AbilityId::Burst,
        AbilityId::MagazineSize,
        AbilityId::ReloadSpeed,
        AbilityId::HeavyMagazine,
        AbilityId::GlassCannon,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&id| id == self).unwrap_or(0)
    }

    pub fn name(self) -> &'static str {
        match self {
            AbilityId::RapidFire => "Rapid Fire",
            AbilityId::Damage => "Heavy Rounds",
            AbilityId::Speed => "Fleet Foot",
            AbilityId::Jump => "Spring Heels",
            AbilityId::DoubleJump => "Double Jump",
            AbilityId::Pierce => "Piercing Rounds",
            AbilityId::Bounce => "Ricochet",
            AbilityId::Unstoppable => "Unstoppable Rounds",
            AbilityId::Sniper => "Sniper Kit",
            AbilityId::Explosive => "Explosive Rounds",
            AbilityId::Shield => "Barrier",
            AbilityId::Lifesteal => "Leech Rounds",
            AbilityId::MaxHealth => "Iron Constitution",
            AbilityId::Multishot => "Scattergun",
            AbilityId::Burst => "Burst Trigger",
            AbilityId::MagazineSize => "Extended Mag",
            AbilityId::ReloadSpeed => "Quick Hands",
            AbilityId::HeavyMagazine => "Drum Magazine",
            AbilityId::GlassCannon => "Glass Cannon",
        }
    }

    pub fn rarity(self) -> Rarity {
        match self {
            AbilityId::RapidFire
            | AbilityId::Damage
            | AbilityId::Speed
            | AbilityId::Jump
            | AbilityId::MagazineSize
            | AbilityId::ReloadSpeed
            | AbilityId::MaxHealth => Rarity::Common,
            AbilityId::DoubleJump
            | AbilityId::Pierce
            | AbilityId::Bounce
            | AbilityId::Shield
            | AbilityId::Burst => Rarity::Rare,
            AbilityId::Sniper
            | AbilityId::Explosive
            | AbilityId::Multishot
            | AbilityId::HeavyMagazine => Rarity::Epic,
            AbilityId::Lifesteal | AbilityId::GlassCannon => Rarity::Legendary,
            AbilityId::Unstoppable => Rarity::Secret,
        }
    }

    /// Level cap per card. Unstoppable is a one-shot unlock.
    pub fn max_level(self) -> u8 {
        match self {
            AbilityId::Unstoppable => 1,
            _ => MAX_ABILITY_LEVEL,
        }
    }

    /// Apply this card's stat delta at the given level. Level 0 is a no-op.
    fn apply(self, level: u8, stats: &mut StatBlock) {
        if level == 0 {
            return;
        }
        let l = level as f32;
        match self {
            AbilityId::RapidFire => stats.fire_delay *= 0.85_f32.powi(level as i32),
            AbilityId::Damage => stats.bullet_damage *= 1.0 + 0.25 * l,
            AbilityId::Speed => stats.move_speed *= 1.0 + 0.12 * l,
            AbilityId::Jump => stats.jump_power *= 1.0 + 0.10 * l,
            AbilityId::DoubleJump => stats.max_jumps += level,
            AbilityId::Pierce => stats.pierce_level = level,
            AbilityId::Bounce => stats.bounce_level = level,
            AbilityId::Unstoppable => stats.unstoppable = true,
            AbilityId::Sniper => {
                stats.bullet_speed *= 1.0 + 0.30 * l;
                stats.bullet_damage *= 1.0 + 0.15 * l;
                stats.fire_delay *= 1.0 + 0.10 * l;
            }
            AbilityId::Explosive => stats.explosive_level = level,
            AbilityId::Shield => {
                stats.shield_capacity = level;
                stats.shield_cooldown = 6.0 - 0.5 * l;
            }
            AbilityId::Lifesteal => stats.lifesteal_fraction = 0.10 * l,
            AbilityId::MaxHealth => stats.max_health += 25.0 * l,
            AbilityId::Multishot => stats.pellet_count = level,
            AbilityId::Burst => stats.burst_count = 1 + level,
            AbilityId::MagazineSize => stats.magazine_size += 4 * level as u32,
            AbilityId::ReloadSpeed => stats.reload_time *= 0.85_f32.powi(level as i32),
            AbilityId::HeavyMagazine => {
                stats.magazine_size += 8 * level as u32;
                stats.move_speed *= 1.0 - 0.05 * l;
            }
            AbilityId::GlassCannon => {
                stats.bullet_damage *= 1.0 + 0.40 * l;
                stats.max_health *= 1.0 - 0.10 * l;
            }
        }
    }

    fn is_compound(self) -> bool {
        matches!(self, AbilityId::HeavyMagazine | AbilityId::GlassCannon)
    }
}

/// Per-card levels for one combatant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityLevels(pub [u8; AbilityId::COUNT]);

impl AbilityLevels {
    pub fn level(&self, id: AbilityId) -> u8 {
        self.0[id.index()]
    }

    /// Raise a card by one level, clamped to its cap. Returns the new level.
    pub fn raise(&mut self, id: AbilityId) -> u8 {
        let slot = &mut self.0[id.index()];
        *slot = (*slot + 1).min(id.max_level());
        *slot
    }

    pub fn is_maxed(&self, id: AbilityId) -> bool {
        self.level(id) >= id.max_level()
    }

    /// Cards still draftable (below their level cap).
    pub fn draftable(&self) -> Vec<AbilityId> {
        AbilityId::ALL
            .iter()
            .copied()
            .filter(|&id| !self.is_maxed(id))
            .collect()
    }
}

/// Rebuild a stat block from base values plus every card's delta, applied
/// in catalog order with compound cards last.
pub fn recompute_stats(levels: &AbilityLevels) -> StatBlock {
    let mut stats = StatBlock::default();
    for id in AbilityId::ALL.iter().copied().filter(|id| !id.is_compound()) {
        id.apply(levels.level(id), &mut stats);
    }
    for id in AbilityId::ALL.iter().copied().filter(|id| id.is_compound()) {
        id.apply(levels.level(id), &mut stats);
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::constants::*;

    #[test]
    fn test_zero_levels_give_base_stats() {
        let stats = recompute_stats(&AbilityLevels::default());
        assert_eq!(stats, StatBlock::default());
    }

    #[test]
    fn test_rapid_fire_compounds_per_level() {
        let mut levels = AbilityLevels::default();
        levels.raise(AbilityId::RapidFire);
        levels.raise(AbilityId::RapidFire);
        let stats = recompute_stats(&levels);
        let expected = BASE_FIRE_DELAY * 0.85 * 0.85;
        assert!((stats.fire_delay - expected).abs() < 1e-6);
    }

    #[test]
    fn test_recompute_is_order_free_for_the_caller() {
        // Raising cards in different orders must land on identical stats.
        let mut a = AbilityLevels::default();
        a.raise(AbilityId::Damage);
        a.raise(AbilityId::GlassCannon);
        a.raise(AbilityId::Sniper);

        let mut b = AbilityLevels::default();
        b.raise(AbilityId::Sniper);
        b.raise(AbilityId::Damage);
        b.raise(AbilityId::GlassCannon);

        assert_eq!(recompute_stats(&a), recompute_stats(&b));
    }

    #[test]
    fn test_glass_cannon_applies_after_damage_cards() {
        let mut levels = AbilityLevels::default();
        levels.raise(AbilityId::Damage);
        levels.raise(AbilityId::GlassCannon);
        let stats = recompute_stats(&levels);
        // (base * 1.25) * 1.4 — compound multiplies the already-boosted value
        let expected = BASE_BULLET_DAMAGE * 1.25 * 1.4;
        assert!((stats.bullet_damage - expected).abs() < 1e-4);
        assert!((stats.max_health - BASE_MAX_HEALTH * 0.9).abs() < 1e-4);
    }

    #[test]
    fn test_unstoppable_caps_at_level_one() {
        let mut levels = AbilityLevels::default();
        assert_eq!(levels.raise(AbilityId::Unstoppable), 1);
        assert_eq!(levels.raise(AbilityId::Unstoppable), 1);
        assert!(levels.is_maxed(AbilityId::Unstoppable));
    }

    #[test]
    fn test_maxed_cards_leave_the_draftable_set() {
        let mut levels = AbilityLevels::default();
        for _ in 0..MAX_ABILITY_LEVEL {
            levels.raise(AbilityId::Speed);
        }
        let pool = levels.draftable();
        assert!(!pool.contains(&AbilityId::Speed));
        assert_eq!(pool.len(), AbilityId::COUNT - 1);
    }

    #[test]
    fn test_every_card_has_positive_rarity_weight() {
        for id in AbilityId::ALL {
            assert!(id.rarity().weight() > 0.0, "{}", id.name());
        }
    }
}
