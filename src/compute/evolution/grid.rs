//! Dense grid level model.
//!
//! Mutation is a per-cell stochastic transition in the style of a cellular
//! automaton: empty cells next to walls turn into walls far more often than
//! isolated ones, so walls grow in clusters. Fitness rewards a long route
//! from start to exit and penalises straying from the target counts.

use super::model::LevelModel;
use super::rng::LevelRng;
use crate::compute::geometry::neighbors;
use crate::compute::pathfinding::shortest_path;
use crate::schema::{Cell, ConfigError, Coord, GridConfig, GridLevel};

/// Grid representation of the level search.
#[derive(Debug, Clone)]
pub struct GridModel {
    config: GridConfig,
}

/// Breakdown of a grid evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridMeasurements {
    pub path_length: i64,
    pub walls: i64,
    pub enemies: i64,
    pub treasures: i64,
}

impl GridModel {
    /// Create a grid model, validating its configuration.
    pub fn new(config: GridConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Count cells and measure the start-to-exit route in one pass.
    pub fn measure(&self, level: &GridLevel) -> GridMeasurements {
        let mut start = None;
        let mut end = None;
        let (mut walls, mut enemies, mut treasures) = (0, 0, 0);

        for (pos, cell) in level.iter() {
            match cell {
                Cell::Wall => walls += 1,
                Cell::Enemy => enemies += 1,
                Cell::Treasure => treasures += 1,
                Cell::Start => start = Some(pos),
                Cell::End => end = Some(pos),
                Cell::Empty | Cell::Door => {}
            }
        }

        let path_length = match (start, end) {
            (Some(start), Some(end)) => shortest_path(level, start, end).len() as i64,
            _ => 0,
        };

        GridMeasurements {
            path_length,
            walls,
            enemies,
            treasures,
        }
    }

    /// Combine measurements into a single score.
    pub fn score(&self, m: &GridMeasurements) -> i64 {
        let targets = &self.config.targets;
        m.path_length
            - (targets.walls - m.walls).abs()
            - (targets.enemies - m.enemies).pow(2)
            - (targets.treasures - m.treasures).pow(2)
    }

    fn mutate_cell(&self, level: &GridLevel, pos: Coord, rng: &mut LevelRng) -> Cell {
        let rates = &self.config.mutation;
        match level.get(pos) {
            Cell::Empty => {
                let wall_neighbors = neighbors(pos, level.size())
                    .filter(|&n| level.get(n) == Cell::Wall)
                    .count();
                let p_wall = if wall_neighbors == 0 {
                    rates.empty_to_wall_isolated
                } else {
                    rates.empty_to_wall_adjacent
                };

                if rng.chance(p_wall) {
                    Cell::Wall
                } else if rng.chance(rates.empty_to_treasure) {
                    Cell::Treasure
                } else if rng.chance(rates.empty_to_enemy) {
                    Cell::Enemy
                } else {
                    Cell::Empty
                }
            }
            Cell::Wall if rng.chance(rates.wall_to_empty) => Cell::Empty,
            Cell::Enemy if rng.chance(rates.enemy_to_empty) => Cell::Empty,
            Cell::Treasure if rng.chance(rates.treasure_to_empty) => Cell::Empty,
            cell => cell,
        }
    }
}

impl LevelModel for GridModel {
    type Level = GridLevel;
    type Score = i64;

    fn name(&self) -> &'static str {
        "grid"
    }

    fn seed_level(&self) -> GridLevel {
        let size = self.config.level_size;
        let mut level = GridLevel::empty(size);
        let far = size as i32 - 2;
        level.set(Coord::new(2, 2), Cell::Start);
        level.set(Coord::new(far, far), Cell::End);
        level
    }

    fn mutate(&self, level: &GridLevel, rng: &mut LevelRng) -> GridLevel {
        // Neighbour counts read the source grid, never the partially mutated copy
        let mut next = level.clone();
        for (pos, _) in level.iter() {
            let cell = self.mutate_cell(level, pos, rng);
            next.set(pos, cell);
        }
        next
    }

    fn evaluate(&self, level: &GridLevel) -> i64 {
        self.score(&self.measure(level))
    }

    fn render(&self, level: &GridLevel) -> String {
        let size = level.size();
        let mut out = String::with_capacity(size * (size + 1));
        for (pos, cell) in level.iter() {
            out.push(cell.glyph());
            if pos.x as usize == size - 1 {
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::GridMutationRates;

    fn model() -> GridModel {
        GridModel::new(GridConfig::default()).unwrap()
    }

    #[test]
    fn test_seed_level_scenario_score() {
        let model = model();
        let level = model.seed_level();
        assert_eq!(level.get(Coord::new(2, 2)), Cell::Start);
        assert_eq!(level.get(Coord::new(48, 48)), Cell::End);

        let m = model.measure(&level);
        assert_eq!(m.path_length, 92);
        // 92 - 600 walls - 10^2 enemies - 5^2 treasures
        assert_eq!(model.evaluate(&level), 92 - 600 - 100 - 25);
    }

    #[test]
    fn test_unreachable_exit_scores_without_path() {
        let model = model();
        let mut level = model.seed_level();
        for pos in neighbors(Coord::new(48, 48), 50).collect::<Vec<_>>() {
            level.set(pos, Cell::Wall);
        }
        let m = model.measure(&level);
        assert_eq!(m.path_length, 0);
        assert_eq!(m.walls, 4);
        assert_eq!(model.evaluate(&level), -596 - 100 - 25);
    }

    #[test]
    fn test_missing_anchor_scores_without_path() {
        let model = model();
        let level = GridLevel::empty(50);
        assert_eq!(model.measure(&level).path_length, 0);
    }

    #[test]
    fn test_counts_in_score() {
        let model = model();
        let mut level = model.seed_level();
        level.set(Coord::new(10, 10), Cell::Enemy);
        level.set(Coord::new(11, 10), Cell::Treasure);
        level.set(Coord::new(12, 10), Cell::Treasure);
        // The route keeps its length, only the count penalties change
        assert_eq!(model.evaluate(&level), 92 - 600 - 81 - 9);
    }

    #[test]
    fn test_mutation_leaves_source_untouched() {
        let model = model();
        let level = model.seed_level();
        let snapshot = level.clone();
        let mut rng = LevelRng::new(5);
        for _ in 0..10 {
            let _ = model.mutate(&level, &mut rng);
        }
        assert_eq!(level, snapshot);
    }

    #[test]
    fn test_anchors_survive_certain_transitions() {
        let config = GridConfig {
            level_size: 12,
            mutation: GridMutationRates {
                empty_to_wall_isolated: 1.0,
                empty_to_wall_adjacent: 1.0,
                empty_to_treasure: 1.0,
                empty_to_enemy: 1.0,
                wall_to_empty: 1.0,
                enemy_to_empty: 1.0,
                treasure_to_empty: 1.0,
            },
            ..Default::default()
        };
        let model = GridModel::new(config).unwrap();
        let mut level = model.seed_level();
        level.set(Coord::new(6, 6), Cell::Door);
        let mut rng = LevelRng::new(11);

        let once = model.mutate(&level, &mut rng);
        assert_eq!(once.count(Cell::Wall), 144 - 3);
        let twice = model.mutate(&once, &mut rng);
        assert_eq!(twice.count(Cell::Empty), 144 - 3);

        assert_eq!(twice.get(Coord::new(2, 2)), Cell::Start);
        assert_eq!(twice.get(Coord::new(10, 10)), Cell::End);
        assert_eq!(twice.get(Coord::new(6, 6)), Cell::Door);
    }

    #[test]
    fn test_treasure_checked_before_enemy() {
        let config = GridConfig {
            level_size: 8,
            mutation: GridMutationRates {
                empty_to_wall_isolated: 0.0,
                empty_to_wall_adjacent: 0.0,
                empty_to_treasure: 1.0,
                empty_to_enemy: 1.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let model = GridModel::new(config).unwrap();
        let level = model.mutate(&model.seed_level(), &mut LevelRng::new(2));
        assert_eq!(level.count(Cell::Treasure), 62);
        assert_eq!(level.count(Cell::Enemy), 0);
    }

    #[test]
    fn test_walls_cluster() {
        let config = GridConfig {
            mutation: GridMutationRates {
                empty_to_wall_isolated: 0.0,
                wall_to_empty: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let model = GridModel::new(config).unwrap();
        let mut level = model.seed_level();
        level.set(Coord::new(25, 25), Cell::Wall);

        let mut rng = LevelRng::new(8);
        for _ in 0..20 {
            level = model.mutate(&level, &mut rng);
        }
        // Every wall grew from the seed wall, so each has a wall neighbour
        let walls: Vec<_> = level
            .iter()
            .filter(|&(_, cell)| cell == Cell::Wall)
            .map(|(pos, _)| pos)
            .collect();
        assert!(walls.len() > 1);
        for pos in walls {
            assert!(neighbors(pos, 50).any(|n| level.get(n) == Cell::Wall));
        }
    }

    #[test]
    fn test_render() {
        let model = GridModel::new(GridConfig {
            level_size: 5,
            ..Default::default()
        })
        .unwrap();
        let mut level = model.seed_level();
        level.set(Coord::new(0, 0), Cell::Wall);
        level.set(Coord::new(4, 0), Cell::Door);
        level.set(Coord::new(1, 4), Cell::Enemy);
        level.set(Coord::new(2, 4), Cell::Treasure);
        assert_eq!(
            model.render(&level),
            "#...-\n.....\n..S..\n...F.\n.ET..\n"
        );
    }

    #[test]
    fn test_rejects_small_level() {
        let config = GridConfig {
            level_size: 3,
            ..Default::default()
        };
        assert!(GridModel::new(config).is_err());
    }
}
