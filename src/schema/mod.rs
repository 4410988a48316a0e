//! Schema module - Level representations and configuration for level generation.

mod config;
mod evolution;
mod level;

pub use config::*;
pub use evolution::*;
pub use level::*;
