//! Population selection loop for evolve-and-select level generation.

use std::time::Instant;

use log::{debug, info, log_enabled};
use rayon::prelude::*;

use crate::schema::{
    ConfigError, EvolutionHistory, EvolutionProgress, EvolutionStats, SearchConfig,
};

use super::model::{Fitness, LevelModel};
use super::rng::LevelRng;

/// A scored level.
#[derive(Debug, Clone)]
pub struct Candidate<L, S> {
    /// Unique identifier.
    pub id: u64,
    /// The level.
    pub level: L,
    /// Score from the model's evaluator.
    pub score: S,
    /// Round the level was created in.
    pub generation: usize,
    /// Pool member this level was mutated from.
    pub parent: Option<u64>,
}

/// Final result of a search run.
#[derive(Debug, Clone)]
pub struct EvolutionResult<L, S> {
    /// Best candidate of the final pool.
    pub best: Candidate<L, S>,
    /// Final pool, best first.
    pub pool: Vec<Candidate<L, S>>,
    /// Statistics from the run.
    pub stats: EvolutionStats,
    /// Per-round history.
    pub history: EvolutionHistory,
}

/// Candidate type produced by a level model.
pub type ModelCandidate<M> = Candidate<<M as LevelModel>::Level, <M as LevelModel>::Score>;

/// Evolution engine that runs the search for one level model.
pub struct EvolutionEngine<M: LevelModel> {
    model: M,
    config: SearchConfig,
    rng: LevelRng,
    pool: Vec<ModelCandidate<M>>,
    history: EvolutionHistory,
    generation: usize,
    best_fitness: f64,
    next_id: u64,
    evaluations: u64,
    last_round_evaluations: usize,
}

impl<M: LevelModel> EvolutionEngine<M> {
    /// Create a new engine. Fails if the search settings are unusable.
    pub fn new(model: M, config: SearchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.random_seed {
            Some(seed) => LevelRng::new(seed),
            None => LevelRng::random(),
        };

        Ok(Self {
            model,
            config,
            rng,
            pool: Vec::new(),
            history: EvolutionHistory::default(),
            generation: 0,
            best_fitness: f64::NEG_INFINITY,
            next_id: 0,
            evaluations: 0,
            last_round_evaluations: 0,
        })
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Current pool, best first.
    pub fn pool(&self) -> &[ModelCandidate<M>] {
        &self.pool
    }

    /// Rounds completed.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Reset the pool to the model's seed level.
    pub fn initialize(&mut self) {
        self.pool.clear();
        self.history = EvolutionHistory::default();
        self.generation = 0;
        self.best_fitness = f64::NEG_INFINITY;

        let level = self.model.seed_level();
        let score = self.model.evaluate(&level);
        let id = self.allocate_id();
        self.pool.push(Candidate {
            id,
            level,
            score,
            generation: 0,
            parent: None,
        });

        self.evaluations = 1;
        self.last_round_evaluations = 1;
        self.record_round();
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Mutate every pool member and score mutants plus unmodified survivors.
    fn expand_pool(&mut self) -> Vec<ModelCandidate<M>> {
        let mutations = self.config.mutations_per_level;

        // Child streams are drawn up front so a seeded run does not depend on
        // thread scheduling
        let mut jobs = Vec::with_capacity(self.pool.len() * mutations);
        for parent in 0..self.pool.len() {
            for _ in 0..mutations {
                let id = self.allocate_id();
                jobs.push((parent, id, self.rng.next_seed()));
            }
        }

        let model = &self.model;
        let pool = &self.pool;
        let generation = self.generation + 1;

        let mut scored: Vec<ModelCandidate<M>> = jobs
            .into_par_iter()
            .map(|(parent, id, seed)| {
                let mut rng = LevelRng::new(seed);
                let source = &pool[parent];
                let level = model.mutate(&source.level, &mut rng);
                let score = model.evaluate(&level);
                Candidate {
                    id,
                    level,
                    score,
                    generation,
                    parent: Some(source.id),
                }
            })
            .collect();

        scored.par_extend(pool.par_iter().map(|survivor| Candidate {
            id: survivor.id,
            level: survivor.level.clone(),
            score: model.evaluate(&survivor.level),
            generation: survivor.generation,
            parent: survivor.parent,
        }));

        scored
    }

    /// Run a single round: expand, score, rank, truncate.
    pub fn step_generation(&mut self) {
        let mut scored = self.expand_pool();
        self.last_round_evaluations = scored.len();
        self.evaluations += scored.len() as u64;

        // Shuffle before the stable sort so tied scores are not ordered by
        // pool position
        self.rng.shuffle(&mut scored);
        scored.sort_by(|a, b| b.score.cmp(&a.score));

        if log_enabled!(log::Level::Debug) {
            let scores: Vec<f64> = scored.iter().map(|c| c.score.value()).collect();
            debug!(
                "{} round {}: scores {:?}",
                self.model.name(),
                self.generation + 1,
                scores
            );
        }

        scored.truncate(self.config.considered_levels);
        self.pool = scored;
        self.generation += 1;
        self.record_round();
    }

    fn record_round(&mut self) {
        let fitness: Vec<f64> = self.pool.iter().map(|c| c.score.value()).collect();
        self.history.record(&fitness);
        if let Some(&best) = self.history.best_fitness.last() {
            self.best_fitness = self.best_fitness.max(best);
        }
    }

    /// Best member of the pool. The pool is never empty after `initialize`.
    fn best_candidate(&self) -> &ModelCandidate<M> {
        &self.pool[0]
    }

    fn avg_fitness(&self) -> f64 {
        if self.pool.is_empty() {
            return 0.0;
        }
        self.pool.iter().map(|c| c.score.value()).sum::<f64>() / self.pool.len() as f64
    }

    /// Get current progress.
    pub fn progress(&self) -> EvolutionProgress {
        EvolutionProgress {
            generation: self.generation,
            total_generations: self.config.iterations,
            evaluations_completed: self.last_round_evaluations,
            best_fitness: self.best_fitness,
            generation_best: self
                .pool
                .first()
                .map_or(f64::NEG_INFINITY, |c| c.score.value()),
            avg_fitness: self.avg_fitness(),
            pool_size: self.pool.len(),
        }
    }

    /// Run the search with a callback invoked after seeding and after every
    /// round, receiving the progress and the current best candidate.
    pub fn run_with_callback<F>(&mut self, mut callback: F) -> EvolutionResult<M::Level, M::Score>
    where
        F: FnMut(&EvolutionProgress, &ModelCandidate<M>),
    {
        let start_time = Instant::now();
        info!(
            "Starting {} search: {} rounds, {} mutants per level, pool of {}",
            self.model.name(),
            self.config.iterations,
            self.config.mutations_per_level,
            self.config.considered_levels
        );

        self.initialize();
        callback(&self.progress(), self.best_candidate());

        while self.generation < self.config.iterations {
            self.step_generation();
            callback(&self.progress(), self.best_candidate());
        }

        let elapsed = start_time.elapsed().as_secs_f64();
        let stats = EvolutionStats {
            generations: self.generation,
            total_evaluations: self.evaluations,
            best_fitness: self.best_fitness,
            final_avg_fitness: self.avg_fitness(),
            elapsed_seconds: elapsed,
            evaluations_per_second: if elapsed > 0.0 {
                self.evaluations as f64 / elapsed
            } else {
                0.0
            },
        };
        info!(
            "Finished {} search after {} rounds: best fitness {:.3}, {} evaluations in {:.2}s",
            self.model.name(),
            stats.generations,
            stats.best_fitness,
            stats.total_evaluations,
            stats.elapsed_seconds
        );

        EvolutionResult {
            best: self.best_candidate().clone(),
            pool: self.pool.clone(),
            stats,
            history: self.history.clone(),
        }
    }

    /// Run the search (blocking).
    pub fn run(&mut self) -> EvolutionResult<M::Level, M::Score> {
        self.run_with_callback(|_, _| {})
    }
}
