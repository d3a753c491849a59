// Configuration module for reading Arena.toml
// This module provides OOP-style configuration management for the simulation engine

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub timing: TimingConfig,
    pub rules: RulesConfig,
    pub board: BoardConfig,
    pub loot: LootConfig,
    pub bot: BotConfig,
    pub debug: DebugConfig,
}

/// Fuse, expiry and movement-gate timing constants (milliseconds)
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    pub bomb_fuse_ms: u64,
    pub explosion_duration_ms: u64,
    pub invincibility_ms: u64,
    pub power_up_expiry_ms: u64,
    pub power_up_blink_ms: u64,
    pub curse_duration_ms: u64,
    pub base_move_delay_ms: u64,
}

impl TimingConfig {
    /// Computes the effective delay between moves for an entity at the
    /// given speed level
    pub fn move_delay_ms(&self, speed: u32) -> u64 {
        self.base_move_delay_ms / speed.max(1) as u64
    }
}

/// Starting stats, stat bounds and scoring values
#[derive(Debug, Deserialize, Clone)]
pub struct RulesConfig {
    pub starting_lives: u32,
    pub starting_max_bombs: u32,
    pub starting_blast_range: u32,
    pub starting_speed: u32,
    pub max_speed: u32,
    pub score_wall_destroyed: i32,
    pub score_power_up: i32,
    pub score_kill: i32,
}

/// Board generation constants
#[derive(Debug, Deserialize, Clone)]
pub struct BoardConfig {
    pub min_dimension: i32,
    pub max_dimension: i32,
    pub destructible_density: f64,
    pub spawn_clearance: i32,
}

/// Power-up spawn chance and kind weights. Weights are cumulative
/// thresholds over a uniform draw in [0, total).
#[derive(Debug, Deserialize, Clone)]
pub struct LootConfig {
    pub spawn_chance: f64,
    pub weight_bomb_capacity: u32,
    pub weight_blast_range: u32,
    pub weight_speed: u32,
    pub weight_kick: u32,
    pub weight_curse: u32,
}

impl LootConfig {
    /// Sum of all kind weights
    pub fn total_weight(&self) -> u32 {
        self.weight_bomb_capacity
            + self.weight_blast_range
            + self.weight_speed
            + self.weight_kick
            + self.weight_curse
    }
}

/// Bot decision-unit constants shared by all difficulty tiers
#[derive(Debug, Deserialize, Clone)]
pub struct BotConfig {
    pub reconsider_interval_ticks: u64,
    pub bomb_cooldown_ticks: u64,
    pub hold_still_chance: f64,
    pub easy_bomb_chance: f64,
    pub medium_bomb_chance: f64,
    pub hard_bomb_chance: f64,
    pub medium_random_ratio: f64,
    pub hard_close_distance: i32,
    pub trapped_neighbor_threshold: usize,
}

/// Match logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Arena.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Loads default configuration from Arena.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Arena.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Arena.toml
    pub fn default_hardcoded() -> Self {
        Config {
            timing: TimingConfig {
                bomb_fuse_ms: 3000,
                explosion_duration_ms: 1000,
                invincibility_ms: 2000,
                power_up_expiry_ms: 10_000,
                power_up_blink_ms: 3000,
                curse_duration_ms: 10_000,
                base_move_delay_ms: 200,
            },
            rules: RulesConfig {
                starting_lives: 3,
                starting_max_bombs: 1,
                starting_blast_range: 2,
                starting_speed: 1,
                max_speed: 5,
                score_wall_destroyed: 5,
                score_power_up: 10,
                score_kill: 50,
            },
            board: BoardConfig {
                min_dimension: 9,
                max_dimension: 21,
                destructible_density: 0.45,
                spawn_clearance: 2,
            },
            loot: LootConfig {
                spawn_chance: 0.30,
                weight_bomb_capacity: 30,
                weight_blast_range: 25,
                weight_speed: 20,
                weight_kick: 15,
                weight_curse: 10,
            },
            bot: BotConfig {
                reconsider_interval_ticks: 8,
                bomb_cooldown_ticks: 30,
                hold_still_chance: 0.2,
                easy_bomb_chance: 0.05,
                medium_bomb_chance: 0.10,
                hard_bomb_chance: 0.20,
                medium_random_ratio: 0.33,
                hard_close_distance: 2,
                trapped_neighbor_threshold: 3,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "arena_match.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default()
            .unwrap_or_else(|e| {
                eprintln!("Warning: Could not load Arena.toml ({}), using hardcoded defaults", e);
                Self::default_hardcoded()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_delay_scales_with_speed() {
        let config = Config::default_hardcoded();
        assert_eq!(config.timing.move_delay_ms(1), 200);
        assert_eq!(config.timing.move_delay_ms(2), 100);
        assert_eq!(config.timing.move_delay_ms(4), 50);
        // Speed zero must not divide by zero
        assert_eq!(config.timing.move_delay_ms(0), 200);
    }

    #[test]
    fn test_config_can_be_created() {
        let config = Config::default_hardcoded();
        assert_eq!(config.timing.bomb_fuse_ms, 3000);
        assert_eq!(config.rules.starting_lives, 3);
        assert_eq!(config.loot.total_weight(), 100);
    }

    #[test]
    fn test_arena_toml_can_be_parsed() {
        // This test ensures Arena.toml is valid and can be parsed
        let result = Config::from_file("Arena.toml");
        assert!(
            result.is_ok(),
            "Failed to parse Arena.toml: {:?}",
            result.err()
        );
    }

    #[test]
    fn test_arena_toml_contains_all_required_fields() {
        let config = Config::from_file("Arena.toml")
            .expect("Arena.toml should be parseable");

        // Test timing config
        assert!(config.timing.bomb_fuse_ms > 0);
        assert!(config.timing.explosion_duration_ms > 0);
        assert!(config.timing.invincibility_ms > 0);
        assert!(config.timing.power_up_expiry_ms > config.timing.power_up_blink_ms);
        assert!(config.timing.base_move_delay_ms > 0);

        // Test rules config
        assert!(config.rules.starting_lives > 0);
        assert!(config.rules.starting_max_bombs > 0);
        assert!(config.rules.starting_blast_range > 0);
        assert!(config.rules.max_speed >= config.rules.starting_speed);
        assert!(config.rules.score_wall_destroyed > 0);
        assert!(config.rules.score_power_up > 0);
        assert!(config.rules.score_kill > 0);

        // Test board config
        assert!(config.board.min_dimension >= 9);
        assert!(config.board.max_dimension <= 21);
        assert!(config.board.destructible_density > 0.0);
        assert!(config.board.destructible_density < 1.0);

        // Test loot config
        assert!(config.loot.spawn_chance > 0.0);
        assert!(config.loot.spawn_chance < 1.0);
        assert!(config.loot.total_weight() > 0);

        // Test bot config
        assert!(config.bot.reconsider_interval_ticks > 0);
        assert!(config.bot.bomb_cooldown_ticks > 0);
        assert!(config.bot.trapped_neighbor_threshold <= 4);

        // Test debug config
        assert!(!config.debug.log_file_path.is_empty());
    }

    #[test]
    fn test_all_config_values_match_hardcoded_defaults() {
        let file_config = Config::from_file("Arena.toml")
            .expect("Arena.toml should be parseable");
        let hardcoded_config = Config::default_hardcoded();

        // Timing
        assert_eq!(
            file_config.timing.bomb_fuse_ms,
            hardcoded_config.timing.bomb_fuse_ms
        );
        assert_eq!(
            file_config.timing.explosion_duration_ms,
            hardcoded_config.timing.explosion_duration_ms
        );
        assert_eq!(
            file_config.timing.invincibility_ms,
            hardcoded_config.timing.invincibility_ms
        );
        assert_eq!(
            file_config.timing.power_up_expiry_ms,
            hardcoded_config.timing.power_up_expiry_ms
        );
        assert_eq!(
            file_config.timing.curse_duration_ms,
            hardcoded_config.timing.curse_duration_ms
        );

        // Rules
        assert_eq!(
            file_config.rules.starting_lives,
            hardcoded_config.rules.starting_lives
        );
        assert_eq!(
            file_config.rules.score_wall_destroyed,
            hardcoded_config.rules.score_wall_destroyed
        );
        assert_eq!(
            file_config.rules.score_power_up,
            hardcoded_config.rules.score_power_up
        );
        assert_eq!(
            file_config.rules.score_kill,
            hardcoded_config.rules.score_kill
        );

        // Loot
        assert_eq!(
            file_config.loot.weight_bomb_capacity,
            hardcoded_config.loot.weight_bomb_capacity
        );
        assert_eq!(
            file_config.loot.weight_curse,
            hardcoded_config.loot.weight_curse
        );

        // Bot
        assert_eq!(
            file_config.bot.reconsider_interval_ticks,
            hardcoded_config.bot.reconsider_interval_ticks
        );
        assert_eq!(
            file_config.bot.bomb_cooldown_ticks,
            hardcoded_config.bot.bomb_cooldown_ticks
        );
        assert_eq!(
            file_config.bot.hard_close_distance,
            hardcoded_config.bot.hard_close_distance
        );
    }

    #[test]
    fn test_load_or_default_works() {
        // This should succeed with the actual file
        let config = Config::load_or_default();
        assert_eq!(config.timing.bomb_fuse_ms, 3000);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        // Test with a non-existent file
        let result = Config::from_file("nonexistent.toml");
        assert!(result.is_err());
    }
}
