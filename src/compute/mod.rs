//! Compute module - Pathfinding and the level search.

mod geometry;
mod pathfinding;

pub mod evolution;

pub use geometry::*;
pub use pathfinding::*;
