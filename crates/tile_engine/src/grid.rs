use core::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::Direction;

/// Side length of the board.
pub const GRID_SIZE: usize = 4;

/// A position on the board, `(0, 0)` being the top-left cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub const fn is_on_grid(self) -> bool {
        self.row < GRID_SIZE && self.col < GRID_SIZE
    }

    /// The neighbour one step along `direction`, or `None` past the edge.
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (row_delta, col_delta) = direction.delta();
        let next = Self::new(
            self.row.checked_add_signed(row_delta)?,
            self.col.checked_add_signed(col_delta)?,
        );
        next.is_on_grid().then_some(next)
    }

    /// Every cell of the board, row-major.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..GRID_SIZE).flat_map(|row| (0..GRID_SIZE).map(move |col| Self::new(row, col)))
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Fixed-size per-cell storage addressed by [`Cell`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Grid<T>([[T; GRID_SIZE]; GRID_SIZE]);

impl<T> Grid<T> {
    pub(crate) fn get(&self, cell: Cell) -> Option<&T> {
        self.0.get(cell.row).and_then(|row| row.get(cell.col))
    }

    pub(crate) fn get_mut(&mut self, cell: Cell) -> Option<&mut T> {
        self.0.get_mut(cell.row).and_then(|row| row.get_mut(cell.col))
    }
}

impl<T: Copy> Grid<Option<T>> {
    /// Value stored at `cell`, `None` for an empty or off-grid cell.
    pub(crate) fn at(&self, cell: Cell) -> Option<T> {
        self.get(cell).copied().flatten()
    }

    pub(crate) fn put(&mut self, cell: Cell, value: T) {
        if let Some(slot) = self.get_mut(cell) {
            *slot = Some(value);
        }
    }
}
