//! Server configuration.

use protocol::Color;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub border: BorderConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub food: FoodConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from `config.toml` or use defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    /// Load configuration from `path`, writing the defaults there when it does not exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let config: Self = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str(&contents)?
        } else {
            info!("No {} found, creating default config", path.display());
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            default_config
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject balance values the simulation cannot work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.border.width > 0.0 && self.border.height > 0.0,
            "border dimensions must be positive"
        );
        anyhow::ensure!(self.player.spawn_size > 0.0, "player.spawn_size must be positive");
        anyhow::ensure!(self.player.min_split_size > 0.0, "player.min_split_size must be positive");
        anyhow::ensure!(self.player.max_cells >= 1, "player.max_cells must be at least 1");
        anyhow::ensure!(self.player.eat_ratio >= 1.0, "player.eat_ratio must be at least 1.0");
        anyhow::ensure!(self.player.merge_cooldown >= 0.0, "player.merge_cooldown must not be negative");
        anyhow::ensure!(self.player.spawn_attempts >= 1, "player.spawn_attempts must be at least 1");
        anyhow::ensure!(self.food.size > 0.0, "food.size must be positive");
        anyhow::ensure!(!self.food.colors.is_empty(), "food.colors must not be empty");
        Ok(())
    }
}

/// Server networking and general settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bind address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Server name shown in logs and the healthcheck.
    #[serde(default = "default_name")]
    pub name: String,
    /// Fixed RNG seed for spawn and food placement (random when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            name: default_name(),
            seed: None,
        }
    }
}

fn default_port() -> u16 {
    2022
}
fn default_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_name() -> String {
    "Cell Arena".to_string()
}

/// Arena border configuration. The arena is centered on the origin.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BorderConfig {
    #[serde(default = "default_border_size")]
    pub width: f64,
    #[serde(default = "default_border_size")]
    pub height: f64,
}

impl Default for BorderConfig {
    fn default() -> Self {
        Self {
            width: default_border_size(),
            height: default_border_size(),
        }
    }
}

fn default_border_size() -> f64 {
    2000.0
}

/// Player balance configuration. Sizes are masses.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerConfig {
    /// Size of the single cell created on join and respawn.
    #[serde(default = "default_player_spawn_size")]
    pub spawn_size: f64,
    /// Smallest cell size that may split.
    #[serde(default = "default_player_min_split")]
    pub min_split_size: f64,
    #[serde(default = "default_player_max_cells")]
    pub max_cells: usize,
    /// Distance between a splitting parent and its new sibling.
    #[serde(default = "default_player_split_distance")]
    pub split_distance: f64,
    /// Seconds after a split before siblings may merge.
    #[serde(default = "default_player_merge_cooldown")]
    pub merge_cooldown: f64,
    /// Minimum predator/prey size ratio for eating another player.
    #[serde(default = "default_player_eat_ratio")]
    pub eat_ratio: f64,
    #[serde(default = "default_player_speed")]
    pub speed: f64,
    /// Random placements tried before a spawn falls back to the first one.
    #[serde(default = "default_player_spawn_attempts")]
    pub spawn_attempts: usize,
}

impl PlayerConfig {
    pub fn merge_cooldown_duration(&self) -> Duration {
        Duration::from_secs_f64(self.merge_cooldown)
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            spawn_size: default_player_spawn_size(),
            min_split_size: default_player_min_split(),
            max_cells: default_player_max_cells(),
            split_distance: default_player_split_distance(),
            merge_cooldown: default_player_merge_cooldown(),
            eat_ratio: default_player_eat_ratio(),
            speed: default_player_speed(),
            spawn_attempts: default_player_spawn_attempts(),
        }
    }
}

fn default_player_spawn_size() -> f64 {
    50.0
}
fn default_player_min_split() -> f64 {
    35.0
}
fn default_player_max_cells() -> usize {
    16
}
fn default_player_split_distance() -> f64 {
    120.0
}
fn default_player_merge_cooldown() -> f64 {
    15.0
}
fn default_player_eat_ratio() -> f64 {
    1.25
}
fn default_player_speed() -> f64 {
    30.0
}
fn default_player_spawn_attempts() -> usize {
    10
}

/// Food configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FoodConfig {
    #[serde(default = "default_food_size")]
    pub size: f64,
    /// Score credited per pellet eaten.
    #[serde(default = "default_food_score_value")]
    pub score_value: u64,
    /// Pellets seeded into a newly created room.
    #[serde(default = "default_food_initial_amount")]
    pub initial_amount: usize,
    #[serde(default = "default_food_colors")]
    pub colors: Vec<Color>,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            size: default_food_size(),
            score_value: default_food_score_value(),
            initial_amount: default_food_initial_amount(),
            colors: default_food_colors(),
        }
    }
}

fn default_food_size() -> f64 {
    5.0
}
fn default_food_score_value() -> u64 {
    1
}
fn default_food_initial_amount() -> usize {
    40
}
fn default_food_colors() -> Vec<Color> {
    vec![
        Color::new(0xFF, 0x6B, 0x6B),
        Color::new(0x4E, 0xCD, 0xC4),
        Color::new(0x45, 0xB7, 0xD1),
        Color::new(0xF9, 0xCA, 0x24),
        Color::new(0x6C, 0x5C, 0xE7),
        Color::new(0xA2, 0x9B, 0xFE),
    ]
}

/// Persistence settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Upper bound for a single write to the storage collaborator.
    #[serde(default = "default_storage_timeout")]
    pub timeout_ms: u64,
}

impl StorageConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_storage_timeout(),
        }
    }
}

fn default_storage_timeout() -> u64 {
    2000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r##"
            [player]
            max_cells = 8

            [food]
            colors = ["#112233"]
            "##,
        )
        .unwrap();
        assert_eq!(config.player.max_cells, 8);
        assert_eq!(config.player.spawn_size, 50.0);
        assert_eq!(config.food.colors, vec![Color::new(0x11, 0x22, 0x33)]);
        assert_eq!(config.server.port, 2022);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.food.colors, default_food_colors());
        assert_eq!(parsed.player.merge_cooldown_duration(), Duration::from_secs(15));
    }

    #[test]
    fn test_validate_rejects_sub_unit_eat_ratio() {
        let mut config = Config::default();
        config.player.eat_ratio = 0.9;
        assert!(config.validate().is_err());
    }
}
