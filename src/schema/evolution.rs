//! Evolution configuration and reporting types for the level search.
//!
//! The search keeps a small pool of levels, expands every pool member into a
//! batch of mutants each round, and truncates the scored candidates back to
//! the pool size.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ConfigError, GridConfig, RoomConfig};

/// Top-level configuration for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Level representation and its model parameters.
    pub representation: LevelRepresentation,
    /// Pool and round settings.
    pub search: SearchConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::grid()
    }
}

impl GeneratorConfig {
    /// Grid representation with its reference search settings.
    pub fn grid() -> Self {
        Self {
            representation: LevelRepresentation::Grid(GridConfig::default()),
            search: SearchConfig::grid(),
        }
    }

    /// Room representation with its reference search settings.
    pub fn rooms() -> Self {
        Self {
            representation: LevelRepresentation::Rooms(RoomConfig::default()),
            search: SearchConfig::rooms(),
        }
    }

    /// Load and validate a JSON configuration file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let text = fs::read_to_string(path)?;
        let config: GeneratorConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate both the model and the search settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.representation {
            LevelRepresentation::Grid(grid) => grid.validate()?,
            LevelRepresentation::Rooms(rooms) => rooms.validate()?,
        }
        self.search.validate()
    }
}

/// Level representation selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LevelRepresentation {
    /// Dense per-cell grid.
    Grid(GridConfig),
    /// Sparse list of rooms with entity positions.
    Rooms(RoomConfig),
}

/// Pool and round settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of rounds to run.
    pub iterations: usize,
    /// Mutants produced from every pool member per round.
    pub mutations_per_level: usize,
    /// Pool size kept after each round.
    pub considered_levels: usize,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::grid()
    }
}

impl SearchConfig {
    /// Reference settings for the grid model.
    pub fn grid() -> Self {
        Self {
            iterations: 30,
            mutations_per_level: 20,
            considered_levels: 3,
            random_seed: None,
        }
    }

    /// Reference settings for the room model.
    pub fn rooms() -> Self {
        Self {
            iterations: 600,
            mutations_per_level: 6,
            considered_levels: 10,
            random_seed: None,
        }
    }

    /// Validate search settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.considered_levels == 0 {
            return Err(ConfigError::EmptyPool);
        }
        Ok(())
    }

    /// Candidates scored in a round when the pool is full.
    pub fn candidates_per_round(&self) -> usize {
        self.considered_levels * (self.mutations_per_level + 1)
    }
}

/// Errors raised while loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(#[from] ConfigError),
}

/// Progress update emitted after every round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionProgress {
    /// Rounds completed.
    pub generation: usize,
    /// Total rounds configured.
    pub total_generations: usize,
    /// Candidates scored in the last round.
    pub evaluations_completed: usize,
    /// Best fitness seen so far.
    pub best_fitness: f64,
    /// Best fitness in the current pool.
    pub generation_best: f64,
    /// Average fitness of the current pool.
    pub avg_fitness: f64,
    /// Current pool size.
    pub pool_size: usize,
}

/// Evolution history for plotting.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EvolutionHistory {
    /// Best fitness per generation.
    pub best_fitness: Vec<f64>,
    /// Average pool fitness per generation.
    pub avg_fitness: Vec<f64>,
    /// Standard deviation of pool fitness per generation.
    pub fitness_std: Vec<f64>,
}

impl EvolutionHistory {
    /// Record summary statistics of one round's pool.
    pub fn record(&mut self, fitness: &[f64]) {
        if fitness.is_empty() {
            return;
        }
        let n = fitness.len() as f64;
        let best = fitness.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = fitness.iter().sum::<f64>() / n;
        let variance = fitness.iter().map(|f| (f - avg).powi(2)).sum::<f64>() / n;

        self.best_fitness.push(best);
        self.avg_fitness.push(avg);
        self.fitness_std.push(variance.sqrt());
    }

    pub fn len(&self) -> usize {
        self.best_fitness.len()
    }

    pub fn is_empty(&self) -> bool {
        self.best_fitness.is_empty()
    }
}

/// Statistics from an evolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionStats {
    /// Total rounds run.
    pub generations: usize,
    /// Total candidate evaluations performed.
    pub total_evaluations: u64,
    /// Best fitness achieved.
    pub best_fitness: f64,
    /// Average fitness of the final pool.
    pub final_avg_fitness: f64,
    /// Time taken (in seconds).
    pub elapsed_seconds: f64,
    /// Evaluations per second.
    pub evaluations_per_second: f64,
}
