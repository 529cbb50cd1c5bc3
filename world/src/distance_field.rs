//! Breadth-first distance field measured from the spawn cell.
//!
//! Placement runs entirely off this field: percentile bands are fractions of
//! the maximum recorded distance, and unreached floor cells are the islands
//! the generator seals off.

use std::collections::VecDeque;

use veil_core::{CellCoord, Direction};

const UNREACHED: u16 = u16::MAX;

/// Per-cell step counts from the spawn cell, `u16::MAX` where unreachable.
#[derive(Clone, Debug, Default)]
pub(crate) struct DistanceField {
    columns: u32,
    rows: u32,
    distances: Vec<u16>,
}

impl DistanceField {
    /// Rebuilds the field by flooding outward from `spawn` across cells for
    /// which `is_blocked` returns `false`.
    pub(crate) fn rebuild_with<F>(&mut self, columns: u32, rows: u32, spawn: CellCoord, is_blocked: F)
    where
        F: Fn(CellCoord) -> bool,
    {
        self.columns = columns;
        self.rows = rows;
        let capacity = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        self.distances.clear();
        self.distances.resize(capacity, UNREACHED);

        let Some(spawn_index) = self.index(spawn) else {
            return;
        };
        if is_blocked(spawn) {
            return;
        }
        self.distances[spawn_index] = 0;

        let mut frontier = VecDeque::new();
        frontier.push_back(spawn);
        while let Some(cell) = frontier.pop_front() {
            let Some(cell_index) = self.index(cell) else {
                continue;
            };
            let next_distance = self.distances[cell_index].saturating_add(1);
            for direction in Direction::ALL {
                let Some(neighbor) = direction.offset(cell, columns, rows) else {
                    continue;
                };
                if is_blocked(neighbor) {
                    continue;
                }
                let Some(neighbor_index) = self.index(neighbor) else {
                    continue;
                };
                if self.distances[neighbor_index] != UNREACHED {
                    continue;
                }
                self.distances[neighbor_index] = next_distance;
                frontier.push_back(neighbor);
            }
        }
    }

    /// Step count from the spawn to `cell`, or `None` if the cell was never
    /// reached or lies outside the field.
    pub(crate) fn distance(&self, cell: CellCoord) -> Option<u16> {
        let index = self.index(cell)?;
        let distance = self.distances[index];
        (distance != UNREACHED).then_some(distance)
    }

    /// Largest recorded step count, or zero when nothing was reached.
    pub(crate) fn max_steps(&self) -> u16 {
        self.distances
            .iter()
            .copied()
            .filter(|&distance| distance != UNREACHED)
            .max()
            .unwrap_or(0)
    }

    /// Iterates every reached cell alongside its step count.
    pub(crate) fn iter_reached(&self) -> impl Iterator<Item = (CellCoord, u16)> + '_ {
        let columns = self.columns;
        self.distances
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, distance)| distance != UNREACHED)
            .map(move |(index, distance)| {
                let index = index as u32;
                (CellCoord::new(index % columns, index / columns), distance)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_field_distances_are_manhattan() {
        let mut field = DistanceField::default();
        let spawn = CellCoord::new(2, 2);
        field.rebuild_with(5, 5, spawn, |_| false);

        assert_eq!(field.distance(spawn), Some(0));
        assert_eq!(field.distance(CellCoord::new(4, 2)), Some(2));
        assert_eq!(field.distance(CellCoord::new(0, 4)), Some(4));
        assert_eq!(field.max_steps(), 4);
    }

    #[test]
    fn walls_block_the_flood() {
        let mut field = DistanceField::default();
        // A full vertical wall at x == 2 splits the grid.
        field.rebuild_with(5, 5, CellCoord::new(0, 0), |cell| cell.x() == 2);

        assert_eq!(field.distance(CellCoord::new(1, 4)), Some(5));
        assert_eq!(field.distance(CellCoord::new(3, 0)), None);
        assert!(field.iter_reached().all(|(cell, _)| cell.x() < 2));
    }

    #[test]
    fn blocked_spawn_reaches_nothing() {
        let mut field = DistanceField::default();
        field.rebuild_with(4, 4, CellCoord::new(1, 1), |_| true);
        assert_eq!(field.max_steps(), 0);
        assert_eq!(field.iter_reached().count(), 0);
    }
}
