//! Game rules for a 4x4 sliding-tile merge game.
//!
//! The crate has no rendering or platform dependency. A host feeds raw
//! input into an [`InputTranslator`], hands the resulting [`Direction`] to a
//! [`GameSession`], and renders the [`GameState`] it gets back.
//!
//! A move is split in two phases so a host can animate it: [`slide`] resolves
//! where every tile ends up, [`settle`] collapses the merged pairs and spawns
//! the next tile. [`apply_move`] runs both at once.

mod board;
mod direction;
mod engine;
mod error;
mod grid;
pub mod input;
mod score;
mod session;
mod tile;

pub use board::{Board, MAX_TILE_VALUE};
pub use direction::Direction;
pub use engine::{
    Merge, MoveResult, SPAWN_VALUE, SlidTile, SlideResult, Spawner, apply_move, initial_board,
    is_terminal, settle, slide, spawn_tile,
};
pub use error::EngineError;
pub use grid::{Cell, GRID_SIZE};
pub use input::{InputEvent, InputGate, InputSource, InputTranslator, Key, Point};
pub use score::{BEST_SCORE_KEY, KeyValueStore, MemoryStore, ScoreTracker};
pub use session::{GameSession, GameState, Phase};
pub use tile::{Tile, TileId, TileIds};
