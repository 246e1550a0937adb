use core::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::Cell;

/// Identity of a tile, stable from creation until it is merged away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(pub u64);

impl TileId {
    /// Largest id a caller-built board may carry. Ids above it are left to
    /// the session's counter.
    pub const LIMIT: Self = Self(u32::MAX as u64);
}

impl Display for TileId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic id counter owned by one game session.
#[derive(Debug, Clone, Default)]
pub struct TileIds {
    next: u64,
}

impl TileIds {
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    pub const fn next_id(&mut self) -> TileId {
        let id = TileId(self.next);
        self.next += 1;
        id
    }

    /// Makes sure ids handed out from now on are greater than `id`.
    pub fn skip_past(&mut self, id: TileId) {
        if let Some(after) = id.0.checked_add(1) {
            self.next = self.next.max(after);
        }
    }
}

/// A numbered square on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    pub id: TileId,
    pub value: u32,
    pub row: usize,
    pub col: usize,
    /// Spawned by the move that produced the current board.
    pub is_new: bool,
    /// One of the two sources of a merge, only seen in a slide result.
    pub is_merging: bool,
    /// Created by a merge during the move that produced the current board.
    pub is_merge_result: bool,
}

impl Tile {
    pub const fn new(id: TileId, cell: Cell, value: u32) -> Self {
        Self {
            id,
            value,
            row: cell.row,
            col: cell.col,
            is_new: false,
            is_merging: false,
            is_merge_result: false,
        }
    }

    pub const fn spawned(id: TileId, cell: Cell, value: u32) -> Self {
        Self {
            is_new: true,
            ..Self::new(id, cell, value)
        }
    }

    pub const fn merge_result(id: TileId, cell: Cell, value: u32) -> Self {
        Self {
            is_merge_result: true,
            ..Self::new(id, cell, value)
        }
    }

    pub const fn cell(&self) -> Cell {
        Cell::new(self.row, self.col)
    }

    /// The same tile with every animation flag cleared.
    pub(crate) const fn settled(self) -> Self {
        Self::new(self.id, self.cell(), self.value)
    }

    pub(crate) const fn moved_to(self, cell: Cell) -> Self {
        Self {
            row: cell.row,
            col: cell.col,
            ..self
        }
    }
}
