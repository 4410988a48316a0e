//! Bounds-checked 4-directional adjacency over the square level space.

use crate::schema::Coord;

/// Step offsets in the fixed order +x, -x, +y, -y.
const DIRECTIONS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Axis-aligned neighbours of `cell` that lie inside `[0, size)` on both axes.
///
/// The order is always +x, -x, +y, -y so downstream tie-breaks are reproducible.
pub fn neighbors(cell: Coord, size: usize) -> impl Iterator<Item = Coord> {
    let size = size as i32;
    DIRECTIONS.into_iter().filter_map(move |(dx, dy)| {
        let next = Coord::new(cell.x + dx, cell.y + dy);
        (next.x >= 0 && next.x < size && next.y >= 0 && next.y < size).then_some(next)
    })
}

/// Manhattan distance between two cells.
#[inline]
pub fn manhattan(a: Coord, b: Coord) -> u32 {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}
