//! Evolve-and-select search over procedurally generated levels.
//!
//! # Overview
//!
//! - **Level models** (`model`): the `LevelModel` capability, implemented by
//!   the dense grid (`grid`) and the room list (`rooms`)
//! - **Random source** (`rng`): explicit, seedable draws for every mutation
//! - **Search** (`search`): expand each pool member into mutants, score
//!   everything, shuffle, rank and keep the best
//!
//! # Example
//!
//! ```rust,no_run
//! use dungeon_evolve::compute::evolution::{EvolutionEngine, GridModel, LevelModel};
//! use dungeon_evolve::schema::{GridConfig, SearchConfig};
//!
//! let model = GridModel::new(GridConfig::default()).unwrap();
//! let mut engine = EvolutionEngine::new(model, SearchConfig::grid()).unwrap();
//! let result = engine.run_with_callback(|progress, _best| {
//!     println!("Round {}: best score = {}", progress.generation, progress.best_fitness);
//! });
//!
//! println!("{}", engine.model().render(&result.best.level));
//! ```

mod grid;
mod model;
mod rng;
mod rooms;
mod search;

pub use grid::{GridMeasurements, GridModel};
pub use model::{Fitness, LevelModel};
pub use rng::LevelRng;
pub use rooms::{RoomModel, RoomScore, density_error_function};
pub use search::{Candidate, EvolutionEngine, EvolutionResult, ModelCandidate};
