//! Dense cell grid backing the level.

use veil_core::CellCoord;

/// A single grid cell: terrain plus fog-of-war state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    is_wall: bool,
    visibility: f32,
    discovered: bool,
}

impl Cell {
    const FLOOR: Cell = Cell {
        is_wall: false,
        visibility: 0.0,
        discovered: false,
    };

    /// Whether the cell blocks movement and sight lines.
    #[must_use]
    pub const fn is_wall(&self) -> bool {
        self.is_wall
    }

    /// Current fog brightness in `[0, 1]`.
    #[must_use]
    pub const fn visibility(&self) -> f32 {
        self.visibility
    }

    /// Whether the cell has ever been seen. Monotonic: never reset.
    #[must_use]
    pub const fn discovered(&self) -> bool {
        self.discovered
    }

    pub(crate) fn set_wall(&mut self, is_wall: bool) {
        self.is_wall = is_wall;
    }

    pub(crate) fn set_visibility(&mut self, visibility: f32) {
        self.visibility = visibility.clamp(0.0, 1.0);
    }

    pub(crate) fn mark_discovered(&mut self) {
        self.discovered = true;
    }
}

/// Row-major grid of [`Cell`]s addressed by [`CellCoord`].
#[derive(Clone, Debug, Default)]
pub struct CellGrid {
    columns: u32,
    rows: u32,
    cells: Vec<Cell>,
}

impl CellGrid {
    /// Creates an all-floor grid of the requested dimensions.
    #[must_use]
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![Cell::FLOOR; capacity],
        }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Read-only access to a cell, if it lies within bounds.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<&Cell> {
        self.index(cell).and_then(|index| self.cells.get(index))
    }

    /// Whether the cell is a wall. Out-of-bounds coordinates count as walls.
    #[must_use]
    pub fn is_wall(&self, cell: CellCoord) -> bool {
        self.cell(cell).map_or(true, Cell::is_wall)
    }

    /// Iterates every coordinate in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let columns = self.columns;
        (0..self.rows).flat_map(move |y| (0..columns).map(move |x| CellCoord::new(x, y)))
    }

    pub(crate) fn cell_mut(&mut self, cell: CellCoord) -> Option<&mut Cell> {
        let index = self.index(cell)?;
        self.cells.get_mut(index)
    }

    pub(crate) fn set_wall(&mut self, cell: CellCoord, is_wall: bool) {
        if let Some(cell) = self.cell_mut(cell) {
            cell.set_wall(is_wall);
        }
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
