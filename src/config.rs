//! Game Configuration
//!
//! Grid size, object counts, win target and timer cadences. Everything is
//! fixed at construction time.

use std::time::Duration;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::grid::Cell;
use crate::game::maze::MazeError;

/// Main update loop cadence.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 10;

/// Enemy wander cadence.
pub const DEFAULT_ENEMY_INTERVAL_MS: u64 = 300;

/// Configuration errors. All of these are caller mistakes caught before a
/// game starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Maze could not be built.
    #[error(transparent)]
    Maze(#[from] MazeError),

    /// More objects requested than the maze has cells.
    #[error("need {needed} cells for the player and objects, maze has {available}")]
    NotEnoughCells { needed: usize, available: usize },

    /// Cell size that is zero, negative, or not a number.
    #[error("cell size must be a positive finite number, got {value}")]
    InvalidCellSize { value: f32 },

    /// Gold target of zero would win before the first move.
    #[error("gold target must be at least 1")]
    ZeroGoldTarget,

    /// Gold target cannot be met with the gold on the board.
    #[error("gold target {target} exceeds the {available} gold placed")]
    UnreachableGoldTarget { target: u32, available: u32 },

    /// A timer interval of zero.
    #[error("{timer} interval must be positive")]
    ZeroInterval { timer: &'static str },

    /// Object placed outside the grid.
    #[error("cell {cell} is outside the maze")]
    OutOfBounds { cell: Cell },

    /// Environment variable that does not parse.
    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },

    /// Malformed JSON config.
    #[error("invalid config JSON: {0}")]
    Json(String),
}

/// Configuration for one game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Maze width in cells
    pub width: u32,
    /// Maze height in cells
    pub height: u32,
    /// Cell edge length in host pixels
    pub cell_size: f32,
    /// Number of enemies
    pub enemies: u32,
    /// Number of gold pickups
    pub gold: u32,
    /// Number of crystals
    pub crystals: u32,
    /// Gold needed to win
    pub gold_target: u32,
    /// Main update loop interval (ms)
    pub tick_interval_ms: u64,
    /// Enemy move interval (ms)
    pub enemy_interval_ms: u64,
    /// RNG seed; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 25,
            height: 25,
            cell_size: 20.0,
            enemies: 5,
            gold: 5,
            crystals: 5,
            gold_target: 5,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            enemy_interval_ms: DEFAULT_ENEMY_INTERVAL_MS,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Defaults overridden by `EZAM_*` environment variables.
    ///
    /// Recognized: `EZAM_WIDTH`, `EZAM_HEIGHT`, `EZAM_CELL_SIZE`,
    /// `EZAM_ENEMIES`, `EZAM_GOLD`, `EZAM_CRYSTALS`, `EZAM_GOLD_TARGET`,
    /// `EZAM_TICK_MS`, `EZAM_ENEMY_MS`, `EZAM_SEED`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`GameConfig::from_env`] over an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        override_from(&lookup, "EZAM_WIDTH", &mut config.width)?;
        override_from(&lookup, "EZAM_HEIGHT", &mut config.height)?;
        override_from(&lookup, "EZAM_CELL_SIZE", &mut config.cell_size)?;
        override_from(&lookup, "EZAM_ENEMIES", &mut config.enemies)?;
        override_from(&lookup, "EZAM_GOLD", &mut config.gold)?;
        override_from(&lookup, "EZAM_CRYSTALS", &mut config.crystals)?;
        override_from(&lookup, "EZAM_GOLD_TARGET", &mut config.gold_target)?;
        override_from(&lookup, "EZAM_TICK_MS", &mut config.tick_interval_ms)?;
        override_from(&lookup, "EZAM_ENEMY_MS", &mut config.enemy_interval_ms)?;

        if let Some(raw) = lookup("EZAM_SEED") {
            let seed = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: "EZAM_SEED",
                value: raw.clone(),
            })?;
            config.seed = Some(seed);
        }

        Ok(config)
    }

    /// Parse from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))
    }

    /// Number of non-player objects.
    pub fn object_count(&self) -> usize {
        self.enemies as usize + self.gold as usize + self.crystals as usize
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn enemy_interval(&self) -> Duration {
        Duration::from_millis(self.enemy_interval_ms)
    }

    /// Check every construction precondition.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(MazeError::EmptyGrid {
                width: self.width,
                height: self.height,
            }
            .into());
        }
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(ConfigError::InvalidCellSize {
                value: self.cell_size,
            });
        }
        if self.gold_target == 0 {
            return Err(ConfigError::ZeroGoldTarget);
        }
        if self.gold_target > self.gold {
            return Err(ConfigError::UnreachableGoldTarget {
                target: self.gold_target,
                available: self.gold,
            });
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval { timer: "tick" });
        }
        if self.enemy_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval { timer: "enemy" });
        }

        let available = self.width as usize * self.height as usize;
        let needed = self.object_count() + 1;
        if needed > available {
            return Err(ConfigError::NotEnoughCells { needed, available });
        }

        Ok(())
    }
}

fn override_from<F, T>(lookup: &F, var: &'static str, slot: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    if let Some(raw) = lookup(var) {
        *slot = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            var,
            value: raw.clone(),
        })?;
    }
    Ok(())
}
