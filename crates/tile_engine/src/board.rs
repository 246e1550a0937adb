use core::fmt::{self, Display, Formatter};
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::{Cell, EngineError, GRID_SIZE, Tile, TileId};

/// Largest tile value a board accepts. Higher values cannot be built on a
/// 4x4 board from spawns of 2.
pub const MAX_TILE_VALUE: u32 = 1 << 17;

/// One settled snapshot of the grid: at most one tile per cell.
///
/// Boards are never edited in place across moves; every move builds a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Tile>", into = "Vec<Tile>")]
pub struct Board {
    tiles: Vec<Tile>,
}

impl Board {
    pub const CELLS: usize = GRID_SIZE * GRID_SIZE;

    pub const fn empty() -> Self {
        Self { tiles: Vec::new() }
    }

    /// Builds a board from caller-supplied tiles, rejecting anything that
    /// breaks the board invariants.
    pub fn from_tiles(tiles: Vec<Tile>) -> Result<Self, EngineError> {
        validate(&tiles)?;
        Ok(Self { tiles })
    }

    /// Builds a board from tiles the engine produced itself.
    pub(crate) fn from_settled(tiles: Vec<Tile>) -> Self {
        debug_assert!(validate(&tiles).is_ok(), "engine produced an invalid board");
        Self { tiles }
    }

    pub(crate) fn push(&mut self, tile: Tile) {
        debug_assert!(self.tile_at(tile.cell()).is_none(), "cell {} taken", tile.cell());
        self.tiles.push(tile);
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.tiles.len() >= Self::CELLS
    }

    pub fn tile_at(&self, cell: Cell) -> Option<&Tile> {
        self.tiles.iter().find(|tile| tile.cell() == cell)
    }

    /// Cells no tile occupies, row-major.
    pub fn empty_cells(&self) -> Vec<Cell> {
        let occupied = self.value_grid();
        Cell::all()
            .filter(|cell| occupied.at(*cell).is_none())
            .collect()
    }

    pub(crate) fn value_grid(&self) -> Grid<Option<u32>> {
        let mut grid = Grid::default();
        for tile in &self.tiles {
            grid.put(tile.cell(), tile.value);
        }
        grid
    }
}

fn validate(tiles: &[Tile]) -> Result<(), EngineError> {
    if tiles.len() > Board::CELLS {
        return Err(EngineError::InvalidArgument(format!(
            "{} tiles do not fit on a {GRID_SIZE}x{GRID_SIZE} board",
            tiles.len()
        )));
    }

    let mut occupied = Grid::<bool>::default();
    let mut ids = HashSet::with_capacity(tiles.len());
    for tile in tiles {
        let cell = tile.cell();
        let Some(taken) = occupied.get_mut(cell) else {
            return Err(EngineError::InvalidArgument(format!(
                "tile {} lies outside the board at {cell}",
                tile.id
            )));
        };
        if *taken {
            return Err(EngineError::InvalidArgument(format!(
                "two tiles share cell {cell}"
            )));
        }
        *taken = true;

        if tile.value < 2 || !tile.value.is_power_of_two() || tile.value > MAX_TILE_VALUE {
            return Err(EngineError::InvalidArgument(format!(
                "tile {} has invalid value {}",
                tile.id, tile.value
            )));
        }
        if tile.id > TileId::LIMIT {
            return Err(EngineError::InvalidArgument(format!(
                "tile id {} is above the limit {}",
                tile.id,
                TileId::LIMIT
            )));
        }
        if !ids.insert(tile.id) {
            return Err(EngineError::InvalidArgument(format!(
                "tile id {} used twice",
                tile.id
            )));
        }
    }
    Ok(())
}

impl TryFrom<Vec<Tile>> for Board {
    type Error = EngineError;

    fn try_from(tiles: Vec<Tile>) -> Result<Self, Self::Error> {
        Self::from_tiles(tiles)
    }
}

impl From<Board> for Vec<Tile> {
    fn from(board: Board) -> Self {
        board.tiles
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let values = self.value_grid();
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                match values.at(Cell::new(row, col)) {
                    Some(value) => write!(f, "{value:>6}")?,
                    None => write!(f, "{:>6}", ".")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
