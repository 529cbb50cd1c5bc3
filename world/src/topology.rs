//! Procedural wall layouts.
//!
//! Two strategies produce the raw terrain before connectivity repair:
//! cellular-automata caves and stamped city blocks. Both reserve the top
//! [`HUD_ROWS`] rows as the HUD band, with row 1 left open as its interior.

use rand::Rng;
use veil_core::{CellCoord, TopologyKind, HUD_ROWS};

use crate::grid::CellGrid;

const NOISE_WALL_CHANCE: f64 = 0.45;
const SMOOTHING_ROUNDS: u32 = 5;
const RADIAL_CLEAR_FRACTION: f32 = 0.2;
const BLOCK_STAMP_CHANCE: f64 = 0.9;
const BLOCK_MAX_SIZE: u32 = 3;
const LATTICE_STEP: u32 = 4;

/// Builds the wall layout for a fresh level.
pub(crate) fn generate<R: Rng>(columns: u32, rows: u32, kind: TopologyKind, rng: &mut R) -> CellGrid {
    let mut grid = CellGrid::new(columns, rows);
    if columns == 0 || rows <= HUD_ROWS {
        return grid;
    }
    match kind {
        TopologyKind::Organic => generate_organic(&mut grid, rng),
        TopologyKind::Block => generate_block(&mut grid, rng),
    }
    grid
}

/// Walls off the HUD band: rows 0 and 2 solid, row 1 open except its
/// endpoints and permanently lit.
fn carve_hud_band(grid: &mut CellGrid) {
    let columns = grid.columns();
    for x in 0..columns {
        grid.set_wall(CellCoord::new(x, 0), true);
        grid.set_wall(CellCoord::new(x, 2), true);
        let in_row_one = CellCoord::new(x, 1);
        let is_endpoint = x == 0 || x == columns - 1;
        grid.set_wall(in_row_one, is_endpoint);
        if let Some(cell) = grid.cell_mut(in_row_one) {
            cell.set_visibility(1.0);
        }
    }
}

fn generate_organic<R: Rng>(grid: &mut CellGrid, rng: &mut R) {
    let columns = grid.columns();
    let rows = grid.rows();
    carve_hud_band(grid);

    for y in HUD_ROWS..rows {
        for x in 0..columns {
            if rng.gen_bool(NOISE_WALL_CHANCE) {
                grid.set_wall(CellCoord::new(x, y), true);
            }
        }
    }

    for _ in 0..SMOOTHING_ROUNDS {
        smooth(grid);
    }

    // Guarantee open ground around the map centre and seal the outer rim.
    let center_x = columns as f32 / 2.0;
    let center_y = HUD_ROWS as f32 + (rows - HUD_ROWS) as f32 / 2.0;
    let half_diagonal =
        ((columns as f32).powi(2) + ((rows - HUD_ROWS) as f32).powi(2)).sqrt() / 2.0;
    for y in HUD_ROWS..rows {
        for x in 0..columns {
            let cell = CellCoord::new(x, y);
            let dx = x as f32 - center_x;
            let dy = y as f32 - center_y;
            let normalized = (dx * dx + dy * dy).sqrt() / half_diagonal;
            if normalized < RADIAL_CLEAR_FRACTION {
                grid.set_wall(cell, false);
            }
            if x == 0 || x == columns - 1 || y == rows - 1 {
                grid.set_wall(cell, true);
            }
        }
    }
}

/// One cellular-automata round over the playfield. Cells with more than four
/// wall neighbours become walls, fewer than four become floor, exactly four
/// keep their state. Out-of-bounds neighbours count as walls.
fn smooth(grid: &mut CellGrid) {
    let columns = grid.columns();
    let rows = grid.rows();
    let previous = grid.clone();
    for y in HUD_ROWS..rows {
        for x in 0..columns {
            let cell = CellCoord::new(x, y);
            let walls = wall_neighbors(&previous, cell);
            if walls > 4 {
                grid.set_wall(cell, true);
            } else if walls < 4 {
                grid.set_wall(cell, false);
            }
        }
    }
}

fn wall_neighbors(grid: &CellGrid, cell: CellCoord) -> u32 {
    let mut count = 0;
    for dy in -1i64..=1 {
        for dx in -1i64..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let x = i64::from(cell.x()) + dx;
            let y = i64::from(cell.y()) + dy;
            let in_bounds = x >= 0 && y >= 0 && x < i64::from(grid.columns()) && y < i64::from(grid.rows());
            let blocked = if in_bounds {
                grid.is_wall(CellCoord::new(x as u32, y as u32))
            } else {
                true
            };
            if blocked {
                count += 1;
            }
        }
    }
    count
}

fn generate_block<R: Rng>(grid: &mut CellGrid, rng: &mut R) {
    let columns = grid.columns();
    let rows = grid.rows();

    for y in 0..rows {
        for x in 0..columns {
            let border = y < HUD_ROWS || y == rows - 1 || x == 0 || x == columns - 1;
            grid.set_wall(CellCoord::new(x, y), border);
        }
    }
    carve_hud_band(grid);

    // Stamp rectangular blocks on a lattice, leaving two-cell roads between.
    let mut y = HUD_ROWS + 2;
    while y + 2 < rows {
        let mut x = 2;
        while x + 2 < columns {
            if rng.gen_bool(BLOCK_STAMP_CHANCE) {
                let block_width = rng.gen_range(1..=BLOCK_MAX_SIZE);
                let block_height = rng.gen_range(1..=BLOCK_MAX_SIZE);
                for by in 0..block_height {
                    for bx in 0..block_width {
                        let wx = x + bx;
                        let wy = y + by;
                        if wx < columns - 1 && wy < rows - 1 {
                            grid.set_wall(CellCoord::new(wx, wy), true);
                        }
                    }
                }
            }
            x += LATTICE_STEP;
        }
        y += LATTICE_STEP;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn hud_band_is_sealed_with_a_lit_interior() {
        for kind in [TopologyKind::Organic, TopologyKind::Block] {
            let mut rng = ChaCha8Rng::seed_from_u64(11);
            let grid = generate(20, 16, kind, &mut rng);
            for x in 0..20 {
                assert!(grid.is_wall(CellCoord::new(x, 0)));
                assert!(grid.is_wall(CellCoord::new(x, 2)));
            }
            for x in 1..19 {
                let cell = grid.cell(CellCoord::new(x, 1)).expect("in bounds");
                assert!(!cell.is_wall());
                assert_eq!(cell.visibility(), 1.0);
            }
            assert!(grid.is_wall(CellCoord::new(0, 1)));
            assert!(grid.is_wall(CellCoord::new(19, 1)));
        }
    }

    #[test]
    fn playfield_borders_are_walled() {
        for kind in [TopologyKind::Organic, TopologyKind::Block] {
            for seed in 0..4 {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let grid = generate(25, 20, kind, &mut rng);
                for y in HUD_ROWS..20 {
                    assert!(grid.is_wall(CellCoord::new(0, y)));
                    assert!(grid.is_wall(CellCoord::new(24, y)));
                }
                for x in 0..25 {
                    assert!(grid.is_wall(CellCoord::new(x, 19)));
                }
            }
        }
    }

    #[test]
    fn organic_keeps_the_radial_core_open() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let grid = generate(30, 24, TopologyKind::Organic, &mut rng);
        // The map centre must be floor regardless of the noise roll.
        let center = CellCoord::new(15, HUD_ROWS + (24 - HUD_ROWS) / 2);
        assert!(!grid.is_wall(center));
    }

    #[test]
    fn degenerate_dimensions_yield_an_untouched_grid() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let grid = generate(0, 10, TopologyKind::Block, &mut rng);
        assert_eq!(grid.columns(), 0);
        let grid = generate(10, HUD_ROWS, TopologyKind::Organic, &mut rng);
        assert_eq!(grid.coords().filter(|&c| grid.is_wall(c)).count(), 0);
    }
}
