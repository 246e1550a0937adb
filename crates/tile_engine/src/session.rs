use serde::Serialize;
use tracing::{debug, info};

use crate::engine::{self, MoveResult, SlideResult, Spawner};
use crate::{Board, Direction, InputGate, KeyValueStore, ScoreTracker, initial_board, is_terminal};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    #[default]
    Playing,
    Over,
}

/// What a presentation layer needs to draw the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub board: Board,
    pub score: u32,
    pub best_score: u32,
    pub is_over: bool,
}

/// One game from reset to game over, and the state machine around it.
///
/// A move runs in two steps: [`GameSession::begin_move`] publishes the slide
/// and [`GameSession::settle`] commits it. In between the session is moving
/// and takes no further move. The host picks the delay between the two.
#[derive(Debug)]
pub struct GameSession<S> {
    board: Board,
    phase: Phase,
    in_flight: Option<SlideResult>,
    spawner: Spawner,
    scores: ScoreTracker<S>,
}

impl<S: KeyValueStore> GameSession<S> {
    pub fn new(store: S) -> Self {
        Self::with_spawner(store, Spawner::new())
    }

    /// A session whose spawns are reproducible.
    pub fn with_seed(store: S, seed: u64) -> Self {
        Self::with_spawner(store, Spawner::with_seed(seed))
    }

    /// A session resumed from an arbitrary position.
    pub fn from_board(store: S, board: Board, seed: u64) -> Self {
        let mut spawner = Spawner::with_seed(seed);
        spawner.reserve_ids(&board);
        let phase = if is_terminal(&board) {
            Phase::Over
        } else {
            Phase::Playing
        };
        let scores = ScoreTracker::new(store);
        info!(best = scores.best_score(), tiles = board.len(), ?phase, "game started");
        Self {
            board,
            phase,
            in_flight: None,
            spawner,
            scores,
        }
    }

    fn with_spawner(store: S, mut spawner: Spawner) -> Self {
        let board = initial_board(&mut spawner);
        let scores = ScoreTracker::new(store);
        info!(best = scores.best_score(), "game started");
        Self {
            board,
            phase: Phase::Playing,
            in_flight: None,
            spawner,
            scores,
        }
    }

    /// Starts over on a fresh board with a zero score. The best score stays.
    pub fn reset(&mut self) {
        self.in_flight = None;
        self.board = initial_board(&mut self.spawner);
        self.phase = Phase::Playing;
        self.scores.reset();
        info!(best = self.scores.best_score(), "game reset");
    }

    pub const fn input_gate(&self) -> InputGate {
        match (self.phase, &self.in_flight) {
            (Phase::Over, _) => InputGate::Over,
            (Phase::Playing, Some(_)) => InputGate::Moving,
            (Phase::Playing, None) => InputGate::Ready,
        }
    }

    /// Slide phase of a move. Returns `None`, changing nothing, while a move
    /// is in flight or the game is over.
    ///
    /// A direction that moves nothing still opens a move; it settles to the
    /// same board.
    pub fn begin_move(&mut self, direction: Direction) -> Option<&SlideResult> {
        if self.input_gate() != InputGate::Ready {
            debug!(%direction, gate = ?self.input_gate(), "move ignored");
            return None;
        }
        let slide = engine::slide(&self.board, direction);
        debug!(%direction, moved = slide.moved(), merges = slide.merge_count(), "tiles slid");
        Some(&*self.in_flight.insert(slide))
    }

    /// Settle phase: commits the move in flight, updates the score and checks
    /// for game over. `None` when no move is in flight.
    pub fn settle(&mut self) -> Option<MoveResult> {
        let slide = self.in_flight.take()?;
        let result = engine::settle(&slide, &mut self.spawner);
        self.scores.record(result.score_delta);
        self.board = result.board.clone();
        if is_terminal(&self.board) {
            self.phase = Phase::Over;
            info!(score = self.scores.score(), "game over");
        }
        debug!(score = self.scores.score(), "move settled\n{}", self.board);
        Some(result)
    }

    /// Both phases at once.
    pub fn apply_move(&mut self, direction: Direction) -> Option<MoveResult> {
        self.begin_move(direction)?;
        self.settle()
    }

    pub const fn board(&self) -> &Board {
        &self.board
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub const fn is_over(&self) -> bool {
        matches!(self.phase, Phase::Over)
    }

    pub const fn is_moving(&self) -> bool {
        self.in_flight.is_some()
    }

    pub const fn score(&self) -> u32 {
        self.scores.score()
    }

    pub const fn best_score(&self) -> u32 {
        self.scores.best_score()
    }

    pub const fn store(&self) -> &S {
        self.scores.store()
    }

    pub fn state(&self) -> GameState {
        GameState {
            board: self.board.clone(),
            score: self.score(),
            best_score: self.best_score(),
            is_over: self.is_over(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cell, MemoryStore, Tile, TileId};

    fn row_board(values: [u32; 4]) -> Board {
        let tiles = values
            .iter()
            .enumerate()
            .filter(|(_, value)| **value != 0)
            .map(|(col, value)| Tile::new(TileId(col as u64), Cell::new(0, col), *value))
            .collect();
        Board::from_tiles(tiles).expect("valid row")
    }

    #[test]
    fn starts_playing_with_two_tiles() {
        let session = GameSession::with_seed(MemoryStore::new(), 1);
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.board().len(), 2);
        assert_eq!(session.input_gate(), InputGate::Ready);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn moving_guard_blocks_a_second_move() {
        let mut session = GameSession::from_board(MemoryStore::new(), row_board([2, 2, 0, 0]), 3);
        assert!(session.begin_move(Direction::Left).is_some());
        assert!(session.is_moving());
        assert_eq!(session.input_gate(), InputGate::Moving);
        assert!(session.begin_move(Direction::Right).is_none());

        let result = session.settle().expect("a move was in flight");
        assert_eq!(result.score_delta, 4);
        assert_eq!(session.score(), 4);
        assert!(!session.is_moving());
        assert!(session.settle().is_none());
    }

    #[test]
    fn board_is_unchanged_until_settle() {
        let start = row_board([0, 0, 4, 4]);
        let mut session = GameSession::from_board(MemoryStore::new(), start.clone(), 3);
        session.begin_move(Direction::Left);
        assert_eq!(session.board(), &start);
        session.settle();
        assert_ne!(session.board(), &start);
    }

    #[test]
    fn no_op_move_still_runs_both_phases() {
        let start = row_board([2, 4, 8, 16]);
        let mut session = GameSession::from_board(MemoryStore::new(), start.clone(), 3);
        let slide = session.begin_move(Direction::Left).expect("session is ready");
        assert!(!slide.moved());
        assert!(session.is_moving());

        let result = session.settle().expect("a move was in flight");
        assert!(!result.moved);
        assert_eq!(session.board(), &start);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn terminal_board_starts_over() {
        let tiles = Cell::all()
            .zip(0u64..)
            .map(|(cell, id)| {
                let value = if (cell.row + cell.col) % 2 == 0 { 2 } else { 4 };
                Tile::new(TileId(id), cell, value)
            })
            .collect();
        let locked = Board::from_tiles(tiles).expect("checkerboard");
        let mut session = GameSession::from_board(MemoryStore::new(), locked, 0);
        assert!(session.is_over());
        assert_eq!(session.input_gate(), InputGate::Over);
        assert!(session.apply_move(Direction::Up).is_none());

        session.reset();
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.board().len(), 2);
    }

    #[test]
    fn reset_drops_a_move_in_flight() {
        let mut session = GameSession::from_board(MemoryStore::new(), row_board([2, 2, 0, 0]), 3);
        session.begin_move(Direction::Left);
        session.reset();
        assert!(!session.is_moving());
        assert!(session.settle().is_none());
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn resumed_ids_continue_past_the_board() {
        let start = Board::from_tiles(vec![
            Tile::new(TileId::LIMIT, Cell::new(0, 0), 2),
            Tile::new(TileId(0), Cell::new(0, 1), 2),
        ])
        .expect("ids within the limit");
        let mut session = GameSession::from_board(MemoryStore::new(), start, 9);

        let result = session.apply_move(Direction::Left).expect("session is ready");
        let merge = result.merges.first().expect("the twos merge");
        let spawned = result.spawned.expect("a tile spawns");
        assert!(merge.result > TileId::LIMIT, "merge reused an id");
        assert!(spawned.id > merge.result, "spawn reused an id");
    }

    #[test]
    fn state_snapshot_mirrors_the_session() {
        let mut session = GameSession::from_board(MemoryStore::new(), row_board([8, 8, 0, 0]), 5);
        session.apply_move(Direction::Right);
        let state = session.state();
        assert_eq!(state.score, 16);
        assert_eq!(state.best_score, 16);
        assert!(!state.is_over);
        assert_eq!(&state.board, session.board());
    }
}
