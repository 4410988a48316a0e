//! Sparse room-list level model.
//!
//! A level is a list of rectangular rooms, each holding explicit enemy and
//! treasure positions. Mutation jitters room geometry, churns entities and
//! occasionally deletes or spawns whole rooms. Fitness is a triple of errors
//! (room count, enemy density, treasure density) where smaller is better.

use std::cmp::Ordering;
use std::collections::HashSet;

use super::model::{Fitness, LevelModel};
use super::rng::LevelRng;
use crate::schema::{ConfigError, Coord, Room, RoomConfig, RoomLevel, are_rooms_colliding};

/// Penalty for a deviation between an ideal and an actual density.
///
/// `3 * (e^(10 * |ideal - actual|) - 1)`: zero on target, growing
/// exponentially as the density drifts away.
pub fn density_error_function(ideal: f64, actual: f64) -> f64 {
    3.0 * (((ideal - actual).abs() * 10.0).exp() - 1.0)
}

/// Score of a room level.
///
/// Ranked by `SENTINEL - total_error`, higher first. An empty level always
/// ranks below any level with rooms.
#[derive(Debug, Clone, Copy)]
pub enum RoomScore {
    /// Level without rooms.
    Empty,
    Measured {
        room_count_error: f64,
        enemy_density_error: f64,
        treasure_density_error: f64,
    },
}

impl RoomScore {
    /// Total error of an empty level, and the base of the rank key.
    pub const SENTINEL: f64 = 9999.0;

    /// Sum of the error terms.
    pub fn total_error(&self) -> f64 {
        match *self {
            RoomScore::Empty => Self::SENTINEL,
            RoomScore::Measured {
                room_count_error,
                enemy_density_error,
                treasure_density_error,
            } => room_count_error + enemy_density_error + treasure_density_error,
        }
    }

    /// Error total inverted into a higher-is-better key.
    #[inline]
    pub fn rank_key(&self) -> f64 {
        Self::SENTINEL - self.total_error()
    }
}

impl Ord for RoomScore {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (RoomScore::Empty, RoomScore::Empty) => Ordering::Equal,
            (RoomScore::Empty, _) => Ordering::Less,
            (_, RoomScore::Empty) => Ordering::Greater,
            _ => self.rank_key().total_cmp(&other.rank_key()),
        }
    }
}

impl PartialOrd for RoomScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for RoomScore {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RoomScore {}

impl Fitness for RoomScore {
    fn value(&self) -> f64 {
        self.rank_key()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entity {
    Enemy,
    Treasure,
}

/// Room representation of the level search.
#[derive(Debug, Clone)]
pub struct RoomModel {
    config: RoomConfig,
}

impl RoomModel {
    /// Create a room model, validating its configuration.
    pub fn new(config: RoomConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Rooms left after discounting collisions.
    ///
    /// Each room that collides with any later room costs two; a room is
    /// counted at most once however many rooms it overlaps.
    pub fn valid_room_count(rooms: &[Room]) -> i64 {
        let mut valid = rooms.len() as i64;
        for (i, room) in rooms.iter().enumerate() {
            if rooms[i + 1..].iter().any(|other| are_rooms_colliding(room, other)) {
                valid -= 2;
            }
        }
        valid
    }

    /// Jitter position then size by one cell, keeping the room inside the level.
    ///
    /// The outline sits on `x + width`, so the far edge stays below `size`.
    fn jitter_geometry(&self, room: &mut Room, rng: &mut LevelRng) {
        let size = self.config.level_size as i32;
        let min = self.config.min_room_size;

        room.x = (room.x + rng.offset()).min(size - room.width - 1).max(0);
        room.y = (room.y + rng.offset()).min(size - room.height - 1).max(0);
        room.width = (room.width + rng.offset()).min(size - room.x - 1).max(min);
        room.height = (room.height + rng.offset()).min(size - room.y - 1).max(min);
    }

    /// Random interior cell not yet taken by any entity of the room.
    fn free_interior_point(&self, room: &Room, rng: &mut LevelRng) -> Option<Coord> {
        if room.width < 2 || room.height < 2 {
            return None;
        }
        for _ in 0..self.config.placement_attempts {
            let p = Coord::new(
                rng.range_inclusive(room.x + 1, room.x + room.width - 1),
                rng.range_inclusive(room.y + 1, room.y + room.height - 1),
            );
            if !room.is_occupied(p) {
                return Some(p);
            }
        }
        None
    }

    /// Maybe add one entity of `kind`, otherwise maybe remove one.
    fn add_or_remove_entity(&self, room: &mut Room, kind: Entity, rng: &mut LevelRng) {
        if rng.chance(self.config.entity_add_probability) {
            if let Some(p) = self.free_interior_point(room, rng) {
                entities_mut(room, kind).push(p);
            }
            return;
        }

        let len = entities_mut(room, kind).len();
        if len > 0 && rng.chance(self.config.entity_remove_probability) {
            let idx = rng.index(len);
            entities_mut(room, kind).remove(idx);
        }
    }

    /// Brand-new room with randomly churned contents.
    fn spawn_room(&self, rng: &mut LevelRng) -> Room {
        let size = self.config.level_size as i32;
        let min = self.config.min_room_size;
        let (lo, hi) = self.config.spawn_size_bounds;

        let width = rng.range_inclusive(lo, hi).max(min).min(size - 1);
        let height = rng.range_inclusive(lo, hi).max(min).min(size - 1);
        let x = rng
            .range_inclusive(0, self.config.spawn_position_max)
            .min(size - width - 1);
        let y = rng
            .range_inclusive(0, self.config.spawn_position_max)
            .min(size - height - 1);

        let mut room = Room::new(x, y, width, height);
        let rolls = (width * height / 8) as usize;
        for kind in [Entity::Enemy, Entity::Treasure] {
            for _ in 0..rng.index(rolls) {
                self.add_or_remove_entity(&mut room, kind, rng);
            }
        }
        room
    }
}

fn entities_mut(room: &mut Room, kind: Entity) -> &mut Vec<Coord> {
    match kind {
        Entity::Enemy => &mut room.enemies,
        Entity::Treasure => &mut room.treasures,
    }
}

impl LevelModel for RoomModel {
    type Level = RoomLevel;
    type Score = RoomScore;

    fn name(&self) -> &'static str {
        "rooms"
    }

    fn seed_level(&self) -> RoomLevel {
        RoomLevel::default()
    }

    fn mutate(&self, level: &RoomLevel, rng: &mut LevelRng) -> RoomLevel {
        let mut rooms = Vec::with_capacity(level.len() + 1);

        for source in &level.rooms {
            if rng.chance(self.config.deletion_probability) {
                continue;
            }
            let mut room = source.clone();
            self.jitter_geometry(&mut room, rng);
            room.retain_interior_entities();
            self.add_or_remove_entity(&mut room, Entity::Enemy, rng);
            self.add_or_remove_entity(&mut room, Entity::Treasure, rng);
            rooms.push(room);
        }

        if rng.chance(self.config.spawn_probability) {
            rooms.push(self.spawn_room(rng));
        }

        RoomLevel::new(rooms)
    }

    fn evaluate(&self, level: &RoomLevel) -> RoomScore {
        if level.is_empty() {
            return RoomScore::Empty;
        }

        let valid = Self::valid_room_count(&level.rooms);
        let mut enemy_error = 0.0;
        let mut treasure_error = 0.0;
        // Densities ignore overlap with other rooms
        for room in &level.rooms {
            let area = room.area() as f64;
            enemy_error += density_error_function(
                self.config.ideal_enemy_density,
                room.enemies.len() as f64 / area,
            );
            treasure_error += density_error_function(
                self.config.ideal_treasure_density,
                room.treasures.len() as f64 / area,
            );
        }

        let n = level.len() as f64;
        RoomScore::Measured {
            room_count_error: (self.config.ideal_room_count - (valid.max(0) * 4) as f64).abs(),
            enemy_density_error: enemy_error / n,
            treasure_density_error: treasure_error / n,
        }
    }

    fn render(&self, level: &RoomLevel) -> String {
        let size = self.config.level_size as i32;
        let enemies: HashSet<Coord> = level
            .rooms
            .iter()
            .flat_map(|r| r.enemies.iter().copied())
            .collect();
        let treasures: HashSet<Coord> = level
            .rooms
            .iter()
            .flat_map(|r| r.treasures.iter().copied())
            .collect();

        let mut out = String::with_capacity((size * (size + 1)) as usize);
        for y in 0..size {
            for x in 0..size {
                let p = Coord::new(x, y);
                let glyph = if enemies.contains(&p) {
                    'E'
                } else if treasures.contains(&p) {
                    'T'
                } else if level.rooms.iter().any(|r| r.is_margin(p))
                    && !level.rooms.iter().any(|r| r.contains_point(p))
                {
                    '#'
                } else {
                    '.'
                };
                out.push(glyph);
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> RoomModel {
        RoomModel::new(RoomConfig::default()).unwrap()
    }

    fn assert_room_invariants(config: &RoomConfig, level: &RoomLevel) {
        let size = config.level_size as i32;
        for room in &level.rooms {
            assert!(room.width >= config.min_room_size, "{room:?}");
            assert!(room.height >= config.min_room_size, "{room:?}");
            assert!(room.x >= 0 && room.y >= 0, "{room:?}");
            assert!(room.x + room.width < size, "{room:?}");
            assert!(room.y + room.height < size, "{room:?}");
            for p in room.enemies.iter().chain(&room.treasures) {
                assert!(room.contains_point(*p), "{p:?} outside {room:?}");
            }
        }
    }

    #[test]
    fn test_density_error_function() {
        assert_eq!(density_error_function(0.04, 0.04), 0.0);
        let e = density_error_function(0.0, 0.1);
        assert!((e - 3.0 * (1.0f64.exp() - 1.0)).abs() < 1e-12);
        assert_eq!(density_error_function(0.3, 0.1), density_error_function(0.1, 0.3));
    }

    #[test]
    fn test_empty_level_is_sentinel() {
        let model = model();
        let score = model.evaluate(&RoomLevel::default());
        assert!(matches!(score, RoomScore::Empty));
        assert_eq!(score.total_error(), RoomScore::SENTINEL);
        assert_eq!(score.rank_key(), 0.0);
    }

    #[test]
    fn test_empty_level_ranks_below_single_room() {
        let model = model();
        let empty = model.evaluate(&RoomLevel::default());
        let single = model.evaluate(&RoomLevel::new(vec![Room::new(0, 0, 10, 10)]));
        assert!(empty < single);

        // Even a room so crowded that its key goes negative beats no rooms
        let mut crowded = Room::new(0, 0, 5, 5);
        crowded.enemies = (1..5).flat_map(|x| (1..5).map(move |y| Coord::new(x, y))).collect();
        let crowded = model.evaluate(&RoomLevel::new(vec![crowded]));
        assert!(crowded.rank_key() < 0.0);
        assert!(empty < crowded);
    }

    #[test]
    fn test_single_room_score() {
        let model = model();
        let score = model.evaluate(&RoomLevel::new(vec![Room::new(0, 0, 10, 10)]));
        let RoomScore::Measured {
            room_count_error,
            enemy_density_error,
            treasure_density_error,
        } = score
        else {
            panic!("expected measured score");
        };
        assert_eq!(room_count_error, 9995.0);
        assert!((enemy_density_error - 3.0 * (0.4f64.exp() - 1.0)).abs() < 1e-9);
        assert!((treasure_density_error - 3.0 * (0.2f64.exp() - 1.0)).abs() < 1e-9);
    }

    #[test]
    fn test_density_errors_are_averaged() {
        let model = model();
        let mut on_target = Room::new(0, 0, 5, 5);
        on_target.enemies = vec![Coord::new(1, 1)];
        let off_target = Room::new(20, 20, 5, 5);
        let score = model.evaluate(&RoomLevel::new(vec![on_target, off_target]));
        let RoomScore::Measured {
            enemy_density_error,
            ..
        } = score
        else {
            panic!("expected measured score");
        };
        let expected = density_error_function(0.04, 0.0) / 2.0;
        assert!((enemy_density_error - expected).abs() < 1e-9);
    }

    #[test]
    fn test_collisions_reduce_valid_count() {
        let a = Room::new(0, 0, 10, 10);
        let b = Room::new(5, 5, 10, 10);
        let c = Room::new(30, 30, 5, 5);
        assert_eq!(RoomModel::valid_room_count(&[a.clone(), c.clone()]), 2);
        assert_eq!(RoomModel::valid_room_count(&[a.clone(), b.clone(), c.clone()]), 1);

        // a overlaps both b and d but is only discounted once; b overlaps d too
        let d = Room::new(8, 8, 6, 6);
        assert_eq!(RoomModel::valid_room_count(&[a, b, d]), -1);
    }

    #[test]
    fn test_negative_valid_count_clamps() {
        let model = model();
        let rooms = vec![
            Room::new(0, 0, 10, 10),
            Room::new(5, 5, 10, 10),
            Room::new(8, 8, 6, 6),
        ];
        let RoomScore::Measured {
            room_count_error, ..
        } = model.evaluate(&RoomLevel::new(rooms))
        else {
            panic!("expected measured score");
        };
        assert_eq!(room_count_error, 9999.0);
    }

    #[test]
    fn test_mutation_keeps_invariants() {
        let model = model();
        let mut rng = LevelRng::new(17);
        let mut level = RoomLevel::new(vec![Room::new(44, 44, 6, 6), Room::new(0, 0, 5, 5)]);
        for _ in 0..500 {
            level = model.mutate(&level, &mut rng);
            assert_room_invariants(model.config(), &level);
        }
    }

    #[test]
    fn test_rooms_at_far_edge_keep_outline_on_grid() {
        let model = RoomModel::new(RoomConfig {
            deletion_probability: 0.0,
            spawn_probability: 0.0,
            ..Default::default()
        })
        .unwrap();
        let mut rng = LevelRng::new(17);
        let source = RoomLevel::new(vec![Room::new(44, 10, 5, 6), Room::new(10, 44, 6, 5)]);

        for _ in 0..200 {
            let level = model.mutate(&source, &mut rng);
            assert_room_invariants(model.config(), &level);

            let rendered = model.render(&level);
            let rows: Vec<&str> = rendered.lines().collect();
            for room in &level.rooms {
                let right = (room.x + room.width) as usize;
                let bottom = (room.y + room.height) as usize;
                let mid_row = rows[(room.y + 1) as usize].as_bytes();
                assert_eq!(mid_row[right], b'#', "right wall of {room:?} not drawn");
                let bottom_row = rows[bottom].as_bytes();
                assert_eq!(bottom_row[(room.x + 1) as usize], b'#', "bottom wall of {room:?}");
            }
        }
    }

    #[test]
    fn test_jitter_moves_each_side_by_at_most_one() {
        let model = RoomModel::new(RoomConfig {
            deletion_probability: 0.0,
            spawn_probability: 0.0,
            ..Default::default()
        })
        .unwrap();
        let source = Room::new(20, 20, 8, 8);
        let level = RoomLevel::new(vec![source.clone()]);
        let mut rng = LevelRng::new(6);
        let mut moved = [false; 4];

        for _ in 0..300 {
            let next = model.mutate(&level, &mut rng);
            assert_eq!(next.len(), 1);
            let room = &next.rooms[0];
            let deltas = [
                room.x - source.x,
                room.y - source.y,
                room.width - source.width,
                room.height - source.height,
            ];
            for (i, d) in deltas.into_iter().enumerate() {
                assert!((-1..=1).contains(&d), "{room:?}");
                moved[i] |= d != 0;
            }
        }
        assert_eq!(moved, [true; 4]);
    }

    #[test]
    fn test_mutation_leaves_source_untouched() {
        let model = model();
        let mut room = Room::new(10, 10, 8, 8);
        room.enemies = vec![Coord::new(12, 12)];
        room.treasures = vec![Coord::new(13, 14)];
        let level = RoomLevel::new(vec![room]);
        let snapshot = level.clone();

        let mut rng = LevelRng::new(4);
        for _ in 0..50 {
            let _ = model.mutate(&level, &mut rng);
        }
        assert_eq!(level, snapshot);
    }

    #[test]
    fn test_certain_deletion_empties_level() {
        let model = RoomModel::new(RoomConfig {
            deletion_probability: 1.0,
            spawn_probability: 0.0,
            ..Default::default()
        })
        .unwrap();
        let level = RoomLevel::new(vec![Room::new(0, 0, 5, 5), Room::new(20, 20, 7, 7)]);
        assert!(model.mutate(&level, &mut LevelRng::new(0)).is_empty());
    }

    #[test]
    fn test_certain_spawn_appends_valid_room() {
        let model = RoomModel::new(RoomConfig {
            spawn_probability: 1.0,
            ..Default::default()
        })
        .unwrap();
        let mut rng = LevelRng::new(21);
        for _ in 0..100 {
            let level = model.mutate(&RoomLevel::default(), &mut rng);
            assert_eq!(level.len(), 1);
            let room = &level.rooms[0];
            assert!(room.x <= 40 && room.y <= 40);
            assert!(room.width <= 10 && room.height <= 10);
            assert_room_invariants(model.config(), &level);
        }
    }

    #[test]
    fn test_add_gives_up_when_room_is_full() {
        let model = RoomModel::new(RoomConfig {
            entity_add_probability: 1.0,
            ..Default::default()
        })
        .unwrap();
        let mut room = Room::new(0, 0, 5, 5);
        room.enemies = (1..5).flat_map(|x| (1..5).map(move |y| Coord::new(x, y))).collect();
        let mut rng = LevelRng::new(3);

        model.add_or_remove_entity(&mut room, Entity::Treasure, &mut rng);
        assert!(room.treasures.is_empty());
        assert_eq!(room.enemies.len(), 16);
    }

    #[test]
    fn test_remove_takes_one_entity() {
        let model = RoomModel::new(RoomConfig {
            entity_add_probability: 0.0,
            entity_remove_probability: 1.0,
            ..Default::default()
        })
        .unwrap();
        let mut room = Room::new(0, 0, 6, 6);
        room.treasures = vec![Coord::new(1, 1), Coord::new(2, 2), Coord::new(3, 3)];
        let mut rng = LevelRng::new(9);

        model.add_or_remove_entity(&mut room, Entity::Treasure, &mut rng);
        assert_eq!(room.treasures.len(), 2);
        model.add_or_remove_entity(&mut room, Entity::Enemy, &mut rng);
        assert!(room.enemies.is_empty());
    }

    #[test]
    fn test_render_single_room() {
        let model = RoomModel::new(RoomConfig {
            level_size: 6,
            ..Default::default()
        })
        .unwrap();
        let mut room = Room::new(0, 0, 5, 5);
        room.enemies = vec![Coord::new(1, 1)];
        room.treasures = vec![Coord::new(2, 2)];
        assert_eq!(
            model.render(&RoomLevel::new(vec![room])),
            "######\n#E...#\n#.T..#\n#....#\n#....#\n######\n"
        );
    }

    #[test]
    fn test_render_suppresses_walls_inside_other_rooms() {
        let model = RoomModel::new(RoomConfig {
            level_size: 9,
            ..Default::default()
        })
        .unwrap();
        let level = RoomLevel::new(vec![Room::new(0, 0, 5, 5), Room::new(3, 0, 5, 5)]);
        let rendered = model.render(&level);
        let rows: Vec<&str> = rendered.lines().collect();
        assert_eq!(rows[0], "#########");
        assert_eq!(rows[2], "#.......#");
        assert_eq!(rows[5], "#########");
        assert_eq!(rows[6], ".........");
    }
}
