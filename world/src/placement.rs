//! Distance-band placement over the spawn distance field.
//!
//! Items land in percentile bands of the maximum flood distance, enemies on
//! far cells only, and unreachable floor pockets are sealed before anything
//! is placed.

use rand::seq::SliceRandom;
use rand::Rng;
use veil_core::{CellCoord, HUD_ROWS};

use crate::distance_field::DistanceField;
use crate::grid::CellGrid;

/// Items never land within this many steps of the spawn.
pub(crate) const MIN_ITEM_DISTANCE: u16 = 5;
/// Enemies only spawn strictly farther than this many steps from the spawn.
pub(crate) const MIN_ENEMY_DISTANCE: u16 = 15;

/// Opens a 3x3 floor patch around the spawn cell, clamped to the grid.
pub(crate) fn clear_spawn_area(grid: &mut CellGrid, spawn: CellCoord) {
    for dy in -1i64..=1 {
        for dx in -1i64..=1 {
            let x = i64::from(spawn.x()) + dx;
            let y = i64::from(spawn.y()) + dy;
            if x >= 0 && y >= 0 && x < i64::from(grid.columns()) && y < i64::from(grid.rows()) {
                grid.set_wall(CellCoord::new(x as u32, y as u32), false);
            }
        }
    }
}

/// Converts floor cells the flood never reached into walls, sealing pockets
/// that items or enemies could otherwise land in. Returns how many cells
/// were sealed.
pub(crate) fn fill_islands(grid: &mut CellGrid, field: &DistanceField) -> u32 {
    let mut sealed = 0;
    for y in HUD_ROWS..grid.rows() {
        for x in 0..grid.columns() {
            let cell = CellCoord::new(x, y);
            if !grid.is_wall(cell) && field.distance(cell).is_none() {
                grid.set_wall(cell, true);
                sealed += 1;
            }
        }
    }
    sealed
}

/// Picks a uniform random reachable cell whose flood distance falls within
/// `[min_fraction, max_fraction]` of the maximum distance. Cells inside the
/// HUD band or closer than [`MIN_ITEM_DISTANCE`] never qualify.
pub(crate) fn find_cell_in_band<R: Rng>(
    field: &DistanceField,
    min_fraction: f32,
    max_fraction: f32,
    rng: &mut R,
) -> Option<CellCoord> {
    let max_steps = f32::from(field.max_steps());
    let min_steps = max_steps * min_fraction;
    let max_steps = max_steps * max_fraction;
    let candidates: Vec<CellCoord> = field
        .iter_reached()
        .filter(|&(cell, steps)| {
            cell.y() >= HUD_ROWS
                && steps >= MIN_ITEM_DISTANCE
                && f32::from(steps) >= min_steps
                && f32::from(steps) <= max_steps
        })
        .map(|(cell, _)| cell)
        .collect();
    candidates.choose(rng).copied()
}

/// Farthest reachable playfield cell, used when the exit band is empty.
pub(crate) fn farthest_cell(field: &DistanceField) -> Option<CellCoord> {
    field
        .iter_reached()
        .filter(|&(cell, _)| cell.y() >= HUD_ROWS)
        .fold(None, |best, (cell, steps)| match best {
            Some((_, best_steps)) if steps <= best_steps => best,
            _ => Some((cell, steps)),
        })
        .map(|(cell, _)| cell)
}

/// Up to `count` distinct enemy spawn cells, shuffled, all strictly farther
/// than [`MIN_ENEMY_DISTANCE`] steps from the spawn.
pub(crate) fn enemy_spawn_cells<R: Rng>(
    field: &DistanceField,
    count: u32,
    rng: &mut R,
) -> Vec<CellCoord> {
    let mut candidates: Vec<CellCoord> = field
        .iter_reached()
        .filter(|&(cell, steps)| cell.y() >= HUD_ROWS && steps > MIN_ENEMY_DISTANCE)
        .map(|(cell, _)| cell)
        .collect();
    candidates.shuffle(rng);
    candidates.truncate(usize::try_from(count).unwrap_or(usize::MAX));
    candidates
}
