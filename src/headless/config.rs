//! Headless series configuration
//!
//! JSON-loaded settings for an unattended AI-vs-AI series. Every field has
//! a default so a config file only needs to name what it changes.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::sim::ai::Difficulty;
use crate::sim::arena::ArenaSpec;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlessSeriesConfig {
    /// Engagements per round (best-of); must be odd so rounds cannot tie.
    pub best_of: u32,
    /// Rounds in the series; must be odd so the series cannot tie.
    pub total_rounds: u32,
    /// Built-in arena index.
    pub arena: usize,
    /// AI tier for both sides: "easy", "normal", or "hard".
    pub difficulty: String,
    /// Seed for deterministic replays. `None` rolls fresh entropy.
    pub random_seed: Option<u64>,
    /// Per-engagement wall clock limit in simulation seconds.
    pub max_engagement_secs: f32,
    /// Where to write the JSON match log, if anywhere.
    pub output_path: Option<String>,
}

impl Default for HeadlessSeriesConfig {
    fn default() -> Self {
        Self {
            best_of: 3,
            total_rounds: 3,
            arena: 0,
            difficulty: "normal".to_string(),
            random_seed: None,
            max_engagement_secs: 120.0,
            output_path: None,
        }
    }
}

impl HeadlessSeriesConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.best_of == 0 {
            return Err("best_of must be at least 1".to_string());
        }
        if self.best_of % 2 == 0 {
            return Err(format!("best_of must be odd, got {}", self.best_of));
        }
        if self.total_rounds == 0 {
            return Err("total_rounds must be at least 1".to_string());
        }
        if self.total_rounds % 2 == 0 {
            return Err(format!("total_rounds must be odd, got {}", self.total_rounds));
        }
        if self.arena >= ArenaSpec::builtin_count() {
            return Err(format!(
                "arena index {} out of range (0..{})",
                self.arena,
                ArenaSpec::builtin_count()
            ));
        }
        if Difficulty::from_name(&self.difficulty).is_none() {
            return Err(format!(
                "unknown difficulty '{}' (expected easy, normal, or hard)",
                self.difficulty
            ));
        }
        if self.max_engagement_secs <= 0.0 {
            return Err("max_engagement_secs must be positive".to_string());
        }
        Ok(())
    }

    pub fn difficulty(&self) -> Difficulty {
        Difficulty::from_name(&self.difficulty).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(HeadlessSeriesConfig::default().validate().is_ok());
    }

    #[test]
    fn test_even_best_of_rejected() {
        let config = HeadlessSeriesConfig {
            best_of: 4,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_difficulty_rejected() {
        let config = HeadlessSeriesConfig {
            difficulty: "nightmare".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_even_total_rounds_rejected() {
        let config = HeadlessSeriesConfig {
            total_rounds: 2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: HeadlessSeriesConfig =
            serde_json::from_str(r#"{"best_of": 5, "random_seed": 7}"#).unwrap();
        assert_eq!(config.best_of, 5);
        assert_eq!(config.total_rounds, 3);
        assert_eq!(config.random_seed, Some(7));
        assert_eq!(config.difficulty, "normal");
        assert_eq!(config.max_engagement_secs, 120.0);
        assert!(config.validate().is_ok());
    }
}
