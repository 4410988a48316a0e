//! The capability shared by every level representation.

use std::fmt;

use super::rng::LevelRng;

/// Totally ordered score; greater is better.
pub trait Fitness: Ord + Clone + Send + Sync + fmt::Debug {
    /// Scalar view used for progress and history reporting.
    fn value(&self) -> f64;
}

impl Fitness for i64 {
    #[inline]
    fn value(&self) -> f64 {
        *self as f64
    }
}

/// A level representation with its mutation operator and evaluator.
///
/// The search engine only goes through this trait, so grid and room levels
/// are interchangeable strategies.
pub trait LevelModel: Send + Sync {
    type Level: Clone + Send + Sync;
    type Score: Fitness;

    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Trivial starting level of a run.
    fn seed_level(&self) -> Self::Level;

    /// Produce an independent mutated copy of `level`.
    fn mutate(&self, level: &Self::Level, rng: &mut LevelRng) -> Self::Level;

    /// Score a level. Never fails; poor levels just score low.
    fn evaluate(&self, level: &Self::Level) -> Self::Score;

    /// Draw the level as rows of characters separated by newlines.
    fn render(&self, level: &Self::Level) -> String;
}
