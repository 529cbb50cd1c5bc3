#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid A* search used by the pursuit planner.
//!
//! The search is deliberately best-effort: it never fails, it degrades.
//! When the goal is unreachable or the expansion cap trips, the path to the
//! closest approach seen so far is returned instead of nothing, so a pursuer
//! keeps closing distance on a target it cannot actually reach.

use veil_core::CellCoord;

/// Upper bound on node expansions. A runaway search aborts here and falls
/// back to the closest-approach path.
const EXPANSION_LIMIT: u32 = 1_000;

/// Finds an orthogonal path from `start` to `goal` across non-wall cells.
///
/// The returned sequence includes both endpoints; `start == goal` yields a
/// single-cell path. Moves have uniform cost and the heuristic is Manhattan
/// distance, with ties resolved in favour of the lowest `f` encountered
/// first in scan order. If the goal is never reached, the path to the node
/// that came closest (by Manhattan distance) is returned; if no expanded
/// node improved on the start, the result is empty.
#[must_use]
pub fn find_path<F>(
    start: CellCoord,
    goal: CellCoord,
    columns: u32,
    rows: u32,
    is_wall: F,
) -> Vec<CellCoord>
where
    F: Fn(CellCoord) -> bool,
{
    let Some(tables) = Tables::new(columns, rows) else {
        return Vec::new();
    };
    let mut tables = tables;

    let Some(start_index) = tables.index(start) else {
        return Vec::new();
    };
    tables.g[start_index] = 0;
    tables.f[start_index] = start.manhattan_distance(goal);

    let mut open: Vec<CellCoord> = vec![start];
    let mut closest = start;
    let mut closest_distance = u32::MAX;

    let mut expansions = 0;
    while !open.is_empty() {
        expansions += 1;
        if expansions > EXPANSION_LIMIT {
            break;
        }

        let (scan_index, current) = lowest_f(&open, &tables);
        let Some(current_index) = tables.index(current) else {
            let _ = open.swap_remove(scan_index);
            continue;
        };

        let distance = current.manhattan_distance(goal);
        if distance < closest_distance {
            closest_distance = distance;
            closest = current;
        }

        if current == goal {
            return reconstruct(&tables, current);
        }

        let _ = open.swap_remove(scan_index);
        tables.in_open[current_index] = false;

        let tentative = tables.g[current_index].saturating_add(1);
        for neighbor in orthogonal_neighbors(current, columns, rows) {
            if is_wall(neighbor) {
                continue;
            }

            let Some(neighbor_index) = tables.index(neighbor) else {
                continue;
            };

            if tentative < tables.g[neighbor_index] {
                tables.came_from[neighbor_index] = Some(current);
                tables.g[neighbor_index] = tentative;
                tables.f[neighbor_index] = tentative + neighbor.manhattan_distance(goal);

                if !tables.in_open[neighbor_index] {
                    tables.in_open[neighbor_index] = true;
                    open.push(neighbor);
                }
            }
        }
    }

    if closest != start {
        reconstruct(&tables, closest)
    } else {
        Vec::new()
    }
}

struct Tables {
    columns: u32,
    rows: u32,
    g: Vec<u32>,
    f: Vec<u32>,
    came_from: Vec<Option<CellCoord>>,
    in_open: Vec<bool>,
}

impl Tables {
    fn new(columns: u32, rows: u32) -> Option<Self> {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).ok()?;
        if capacity == 0 {
            return None;
        }

        Some(Self {
            columns,
            rows,
            g: vec![u32::MAX; capacity],
            f: vec![u32::MAX; capacity],
            came_from: vec![None; capacity],
            in_open: vec![false; capacity],
        })
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.x() < self.columns && cell.y() < self.rows {
            let row = usize::try_from(cell.y()).ok()?;
            let column = usize::try_from(cell.x()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

fn lowest_f(open: &[CellCoord], tables: &Tables) -> (usize, CellCoord) {
    let mut best_index = 0;
    let mut best_cell = open[0];
    let mut best_f = tables
        .index(best_cell)
        .map_or(u32::MAX, |index| tables.f[index]);

    for (scan_index, cell) in open.iter().copied().enumerate().skip(1) {
        let f = tables.index(cell).map_or(u32::MAX, |index| tables.f[index]);
        if f < best_f {
            best_f = f;
            best_cell = cell;
            best_index = scan_index;
        }
    }

    (best_index, best_cell)
}

fn orthogonal_neighbors(cell: CellCoord, columns: u32, rows: u32) -> impl Iterator<Item = CellCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(x) = cell.x().checked_add(1) {
        if x < columns {
            candidates[count] = Some(CellCoord::new(x, cell.y()));
            count += 1;
        }
    }

    if let Some(x) = cell.x().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(x, cell.y()));
        count += 1;
    }

    if let Some(y) = cell.y().checked_add(1) {
        if y < rows {
            candidates[count] = Some(CellCoord::new(cell.x(), y));
            count += 1;
        }
    }

    if let Some(y) = cell.y().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(cell.x(), y));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}

fn reconstruct(tables: &Tables, tail: CellCoord) -> Vec<CellCoord> {
    let mut path = vec![tail];
    let mut current = tail;
    while let Some(previous) = tables
        .index(current)
        .and_then(|index| tables.came_from[index])
    {
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_grid(_: CellCoord) -> bool {
        false
    }

    #[test]
    fn trivial_path_is_the_start_cell() {
        let cell = CellCoord::new(2, 2);
        assert_eq!(find_path(cell, cell, 5, 5, open_grid), vec![cell]);
    }

    #[test]
    fn adjacent_cells_produce_a_two_cell_path() {
        let path = find_path(CellCoord::new(1, 1), CellCoord::new(2, 1), 5, 5, open_grid);
        assert_eq!(path, vec![CellCoord::new(1, 1), CellCoord::new(2, 1)]);
    }

    #[test]
    fn consecutive_path_cells_are_orthogonal_neighbors() {
        let path = find_path(CellCoord::new(0, 0), CellCoord::new(4, 3), 6, 6, open_grid);
        for pair in path.windows(2) {
            assert_eq!(pair[0].manhattan_distance(pair[1]), 1);
        }
    }

    #[test]
    fn empty_grid_yields_no_path() {
        let path = find_path(CellCoord::new(0, 0), CellCoord::new(1, 0), 0, 0, open_grid);
        assert!(path.is_empty());
    }

    #[test]
    fn enclosed_start_yields_no_path() {
        // Start at (1,1) ringed by walls.
        let is_wall = |cell: CellCoord| cell != CellCoord::new(1, 1) && cell != CellCoord::new(3, 3);
        let path = find_path(CellCoord::new(1, 1), CellCoord::new(3, 3), 5, 5, is_wall);
        assert!(path.is_empty());
    }
}
