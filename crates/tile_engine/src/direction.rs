use core::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::{Cell, EngineError, GRID_SIZE};

/// The way every tile on the board is pushed by a move.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Row and column offset of a single step.
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
        }
    }

    /// Cells in the order a move resolves them.
    ///
    /// Row-major, starting from the edge the tiles travel toward, so every
    /// cell in front of a tile has been resolved before the tile itself.
    pub fn traversal_order(self) -> impl Iterator<Item = Cell> {
        let rows_reversed = self == Self::Down;
        let cols_reversed = self == Self::Right;
        let flip = |index: usize, reversed: bool| {
            if reversed { GRID_SIZE - 1 - index } else { index }
        };
        (0..GRID_SIZE).flat_map(move |row| {
            (0..GRID_SIZE)
                .map(move |col| Cell::new(flip(row, rows_reversed), flip(col, cols_reversed)))
        })
    }
}

impl FromStr for Direction {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::iter()
            .find(|direction| <&'static str>::from(*direction) == s)
            .ok_or_else(|| EngineError::InvalidArgument(format!("unknown direction {s:?}")))
    }
}

impl TryFrom<u8> for Direction {
    type Error = EngineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Up),
            1 => Ok(Self::Down),
            2 => Ok(Self::Left),
            3 => Ok(Self::Right),
            other => Err(EngineError::InvalidArgument(format!(
                "direction index {other} out of range"
            ))),
        }
    }
}
