//! A* shortest-path search over a grid level.
//!
//! Used as the playability signal of the grid evaluator: the length of the
//! route from the start cell to the exit.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::geometry::{manhattan, neighbors};
use crate::schema::{Coord, GridLevel};

/// Frontier entry ordered by `f = g + h`, then `g`, then push order.
///
/// Entries with equal `f` and `g` are popped in the order they were pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f: u32,
    g: u32,
    seq: u64,
    cell: Coord,
    prev: Coord,
}

/// Shortest path from `start` to `goal` avoiding impassable cells.
///
/// Returns the cells from `goal` back towards `start`, excluding `start`, so
/// the length equals the number of steps. Returns an empty path when `goal`
/// is unreachable (or equal to `start`).
///
/// Uses the Manhattan heuristic, which is consistent for unit-cost
/// 4-directional movement. A cell is expanded at most once: the first pop
/// fixes its predecessor and later entries for it are discarded.
pub fn shortest_path(grid: &GridLevel, start: Coord, goal: Coord) -> Vec<Coord> {
    if !grid.in_bounds(start) || !grid.in_bounds(goal) {
        return Vec::new();
    }

    let size = grid.size();
    let mut visited = vec![false; size * size];
    let mut came_from: Vec<Option<Coord>> = vec![None; size * size];
    let mut open = BinaryHeap::new();
    let mut seq = 0u64;

    open.push(Reverse(OpenNode {
        f: manhattan(start, goal),
        g: 0,
        seq,
        cell: start,
        prev: start,
    }));

    while let Some(Reverse(node)) = open.pop() {
        let i = cell_index(node.cell, size);
        if visited[i] {
            continue;
        }
        visited[i] = true;
        came_from[i] = Some(node.prev);

        if node.cell == goal {
            return reconstruct_path(&came_from, size, start, goal);
        }

        for next in neighbors(node.cell, size) {
            if visited[cell_index(next, size)] || !grid.get(next).is_passable() {
                continue;
            }
            seq += 1;
            let g = node.g + 1;
            open.push(Reverse(OpenNode {
                f: g + manhattan(next, goal),
                g,
                seq,
                cell: next,
                prev: node.cell,
            }));
        }
    }

    Vec::new()
}

#[inline]
fn cell_index(p: Coord, size: usize) -> usize {
    p.y as usize * size + p.x as usize
}

fn reconstruct_path(came_from: &[Option<Coord>], size: usize, start: Coord, goal: Coord) -> Vec<Coord> {
    let mut path = Vec::new();
    let mut current = goal;
    while current != start {
        path.push(current);
        match came_from[cell_index(current, size)] {
            Some(prev) => current = prev,
            None => return Vec::new(),
        }
    }
    path
}
