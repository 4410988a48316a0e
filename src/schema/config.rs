//! Configuration types for the grid and room level models.

use serde::{Deserialize, Serialize};

/// Default side length of the square level.
pub const LEVEL_SIZE: usize = 50;

fn default_level_size() -> usize {
    LEVEL_SIZE
}

/// Grid model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Side length of the grid in cells.
    #[serde(default = "default_level_size")]
    pub level_size: usize,
    /// Per-cell transition probabilities.
    #[serde(default)]
    pub mutation: GridMutationRates,
    /// Target counts the evaluator steers towards.
    #[serde(default)]
    pub targets: GridTargets,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            level_size: LEVEL_SIZE,
            mutation: GridMutationRates::default(),
            targets: GridTargets::default(),
        }
    }
}

/// Probabilities applied to each cell during a grid mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridMutationRates {
    /// Empty cell with no wall neighbour becomes a wall.
    pub empty_to_wall_isolated: f64,
    /// Empty cell with at least one wall neighbour becomes a wall.
    pub empty_to_wall_adjacent: f64,
    pub empty_to_treasure: f64,
    pub empty_to_enemy: f64,
    pub wall_to_empty: f64,
    pub enemy_to_empty: f64,
    pub treasure_to_empty: f64,
}

impl Default for GridMutationRates {
    fn default() -> Self {
        Self {
            empty_to_wall_isolated: 0.001,
            empty_to_wall_adjacent: 0.1,
            empty_to_treasure: 0.0005,
            empty_to_enemy: 0.0005,
            wall_to_empty: 0.0005,
            enemy_to_empty: 0.0005,
            treasure_to_empty: 0.0005,
        }
    }
}

impl GridMutationRates {
    fn named(&self) -> [(&'static str, f64); 7] {
        [
            ("empty_to_wall_isolated", self.empty_to_wall_isolated),
            ("empty_to_wall_adjacent", self.empty_to_wall_adjacent),
            ("empty_to_treasure", self.empty_to_treasure),
            ("empty_to_enemy", self.empty_to_enemy),
            ("wall_to_empty", self.wall_to_empty),
            ("enemy_to_empty", self.enemy_to_empty),
            ("treasure_to_empty", self.treasure_to_empty),
        ]
    }
}

/// Ideal cell counts for the grid evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridTargets {
    pub walls: i64,
    pub enemies: i64,
    pub treasures: i64,
}

impl Default for GridTargets {
    fn default() -> Self {
        Self {
            walls: 600,
            enemies: 10,
            treasures: 5,
        }
    }
}

/// Room model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Side length of the level in cells.
    pub level_size: usize,
    /// Minimum room width and height.
    pub min_room_size: i32,
    /// Chance that a room is dropped during mutation.
    pub deletion_probability: f64,
    /// Chance that a mutation appends a brand-new room.
    pub spawn_probability: f64,
    /// New rooms are placed with both coordinates in `[0, spawn_position_max]`.
    pub spawn_position_max: i32,
    /// Inclusive bounds for the drawn width and height of a new room.
    pub spawn_size_bounds: (i32, i32),
    /// Chance that the add-or-remove operator attempts an add.
    pub entity_add_probability: f64,
    /// Chance that a non-add roll removes an entity.
    pub entity_remove_probability: f64,
    /// Placement retries before an add is abandoned.
    pub placement_attempts: u32,
    /// Target for the scaled room count. Large values mean "as many as fit".
    pub ideal_room_count: f64,
    /// Enemies per cell of room area.
    pub ideal_enemy_density: f64,
    /// Treasures per cell of room area.
    pub ideal_treasure_density: f64,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            level_size: LEVEL_SIZE,
            min_room_size: 5,
            deletion_probability: 0.05,
            spawn_probability: 0.1,
            spawn_position_max: 40,
            spawn_size_bounds: (4, 10),
            entity_add_probability: 0.5,
            entity_remove_probability: 0.5,
            placement_attempts: 10,
            ideal_room_count: 9999.0,
            // Two enemies per 5x5 room, one treasure every second 5x5 room
            ideal_enemy_density: 1.0 / 25.0,
            ideal_treasure_density: 0.5 / 25.0,
        }
    }
}

impl GridConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Start sits at (2, 2) and the exit at (size - 2, size - 2)
        if self.level_size < 5 {
            return Err(ConfigError::LevelTooSmall {
                size: self.level_size,
                min: 5,
            });
        }
        for (name, p) in self.mutation.named() {
            check_probability(name, p)?;
        }
        Ok(())
    }
}

impl RoomConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_room_size < 1 {
            return Err(ConfigError::InvalidMinRoomSize(self.min_room_size));
        }
        // A room's outline occupies `x + width`, one past its last interior cell
        if self.level_size <= self.min_room_size as usize {
            return Err(ConfigError::LevelTooSmall {
                size: self.level_size,
                min: self.min_room_size as usize + 1,
            });
        }
        check_probability("deletion_probability", self.deletion_probability)?;
        check_probability("spawn_probability", self.spawn_probability)?;
        check_probability("entity_add_probability", self.entity_add_probability)?;
        check_probability("entity_remove_probability", self.entity_remove_probability)?;

        let (lo, hi) = self.spawn_size_bounds;
        if lo < 1 || lo > hi {
            return Err(ConfigError::InvalidBounds(format!(
                "spawn_size_bounds ({lo}, {hi})"
            )));
        }
        if self.spawn_position_max < 0 {
            return Err(ConfigError::InvalidBounds(format!(
                "spawn_position_max {}",
                self.spawn_position_max
            )));
        }
        if self.placement_attempts == 0 {
            return Err(ConfigError::NoPlacementAttempts);
        }
        Ok(())
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability { name, value })
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Level size {size} is below the minimum of {min}")]
    LevelTooSmall { size: usize, min: usize },
    #[error("Minimum room size must be positive, got {0}")]
    InvalidMinRoomSize(i32),
    #[error("Probability {name} must lie in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },
    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),
    #[error("Entity placement needs at least one attempt")]
    NoPlacementAttempts,
    #[error("Considered levels (pool size) must be at least 1")]
    EmptyPool,
}
