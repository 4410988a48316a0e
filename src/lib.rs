//! Dungeon Evolve - procedural dungeon levels by evolve-and-select search.
//!
//! Starting from a trivial seed level, the search repeatedly mutates a small
//! pool of candidate levels, scores each candidate and keeps only the best.
//! Two level representations share the same outer loop: a dense cell grid
//! scored on path length and cell counts, and a sparse list of rooms scored
//! on room count, overlap and entity density.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Level representations and configuration
//! - `compute`: Neighbourhoods, A* pathfinding, level models and the search
//!
//! # Example
//!
//! ```rust,no_run
//! use dungeon_evolve::{
//!     compute::evolution::{EvolutionEngine, LevelModel, RoomModel},
//!     schema::{RoomConfig, SearchConfig},
//! };
//!
//! let model = RoomModel::new(RoomConfig::default()).unwrap();
//! let search = SearchConfig {
//!     random_seed: Some(7),
//!     ..SearchConfig::rooms()
//! };
//! let mut engine = EvolutionEngine::new(model, search).unwrap();
//! let result = engine.run();
//!
//! println!("{}", engine.model().render(&result.best.level));
//! println!("Rank key: {:.3}", result.best.score.rank_key());
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::evolution::{EvolutionEngine, GridModel, LevelModel, RoomModel};
pub use compute::shortest_path;
pub use schema::{GeneratorConfig, GridLevel, RoomLevel, SearchConfig};
