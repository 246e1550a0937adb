use fastrand::Rng;
use serde::Serialize;

use crate::grid::Grid;
use crate::{Board, Cell, Direction, EngineError, MAX_TILE_VALUE, Tile, TileId, TileIds};

/// Value of every spawned tile.
pub const SPAWN_VALUE: u32 = 2;

/// Where new tiles come from: the session's RNG and its id counter.
#[derive(Debug, Clone)]
pub struct Spawner {
    rng: Rng,
    ids: TileIds,
}

impl Default for Spawner {
    fn default() -> Self {
        Self::new()
    }
}

impl Spawner {
    pub fn new() -> Self {
        Self::from_rng(Rng::new())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(Rng::with_seed(seed))
    }

    const fn from_rng(rng: Rng) -> Self {
        Self {
            rng,
            ids: TileIds::new(),
        }
    }

    pub const fn next_id(&mut self) -> TileId {
        self.ids.next_id()
    }

    /// Keeps future ids clear of every tile already on `board`.
    pub fn reserve_ids(&mut self, board: &Board) {
        for tile in board.tiles() {
            self.ids.skip_past(tile.id);
        }
    }

    /// A uniformly random empty cell of `board`.
    fn pick_empty(&mut self, board: &Board) -> Option<Cell> {
        self.rng.choice(board.empty_cells())
    }
}

/// Creates a tile of `value` on a random empty cell of `board`.
///
/// The tile is returned, not added: the caller builds the next board.
pub fn spawn_tile(board: &Board, value: u32, spawner: &mut Spawner) -> Result<Tile, EngineError> {
    if value < 2 || !value.is_power_of_two() || value > MAX_TILE_VALUE {
        return Err(EngineError::InvalidArgument(format!(
            "cannot spawn a tile of value {value}"
        )));
    }
    let cell = spawner
        .pick_empty(board)
        .ok_or(EngineError::NoEmptyCell)?;
    Ok(Tile::spawned(spawner.next_id(), cell, value))
}

/// A fresh board holding two tiles of [`SPAWN_VALUE`] on distinct cells.
pub fn initial_board(spawner: &mut Spawner) -> Board {
    let mut board = Board::empty();
    for _ in 0..2 {
        if let Ok(tile) = spawn_tile(&board, SPAWN_VALUE, spawner) {
            board.push(tile);
        }
    }
    board
}

/// A tile after the slide phase, with the cell it started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlidTile {
    pub tile: Tile,
    pub from: Cell,
}

impl SlidTile {
    pub fn has_moved(&self) -> bool {
        self.tile.cell() != self.from
    }
}

/// Two equal tiles that ended the slide on the same cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MergePair {
    cell: Cell,
    value: u32,
    resident: TileId,
    mover: TileId,
}

/// Positions after the slide phase of a move, before merges collapse.
///
/// Both sources of a merge still exist here, sharing their target cell and
/// flagged `is_merging`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideResult {
    before: Board,
    tiles: Vec<SlidTile>,
    pairs: Vec<MergePair>,
    moved: bool,
}

impl SlideResult {
    pub fn tiles(&self) -> &[SlidTile] {
        &self.tiles
    }

    /// Whether any tile changed cell.
    pub const fn moved(&self) -> bool {
        self.moved
    }

    pub fn merge_count(&self) -> usize {
        self.pairs.len()
    }
}

/// A merge committed by the settle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Merge {
    pub cell: Cell,
    /// Value of the resulting tile, also its contribution to the score.
    pub value: u32,
    pub sources: [TileId; 2],
    pub result: TileId,
}

/// Outcome of a complete move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveResult {
    pub board: Board,
    pub score_delta: u32,
    pub moved: bool,
    pub merges: Vec<Merge>,
    pub spawned: Option<Tile>,
}

#[derive(Clone, Copy)]
struct Occupant {
    id: TileId,
    value: u32,
    merged: bool,
}

#[derive(Default)]
struct Slide {
    occupied: Grid<Option<Occupant>>,
    tiles: Vec<SlidTile>,
    pairs: Vec<MergePair>,
    moved: bool,
}

impl Slide {
    /// Pushes `tile` as far as it goes. Every cell ahead of it has already
    /// been resolved, so `occupied` only holds final positions.
    fn resolve(mut self, tile: &Tile, direction: Direction) -> Self {
        let from = tile.cell();
        let mut target = from;
        let mut absorbed_by = None;
        while let Some(next) = target.step(direction) {
            match self.occupied.at(next) {
                None => target = next,
                Some(occupant)
                    if occupant.value == tile.value
                        && !occupant.merged
                        && tile.value < MAX_TILE_VALUE =>
                {
                    target = next;
                    absorbed_by = Some(occupant.id);
                    break;
                }
                Some(_) => break,
            }
        }

        let merging = absorbed_by.is_some();
        if let Some(resident) = absorbed_by {
            if let Some(slid) = self.tiles.iter_mut().find(|slid| slid.tile.id == resident) {
                slid.tile.is_merging = true;
            }
            self.pairs.push(MergePair {
                cell: target,
                value: tile.value,
                resident,
                mover: tile.id,
            });
        }

        self.occupied.put(
            target,
            Occupant {
                id: tile.id,
                value: tile.value,
                merged: merging,
            },
        );
        self.moved |= target != from;
        self.tiles.push(SlidTile {
            tile: Tile {
                is_merging: merging,
                ..tile.settled().moved_to(target)
            },
            from,
        });
        self
    }
}

/// Slide phase: where every tile of `board` ends up when pushed toward
/// `direction`. A tile merges at most once and a cell takes at most one merge.
/// Tiles of [`MAX_TILE_VALUE`] never merge.
pub fn slide(board: &Board, direction: Direction) -> SlideResult {
    let resolved = direction
        .traversal_order()
        .filter_map(|cell| board.tile_at(cell))
        .fold(Slide::default(), |slide, tile| slide.resolve(tile, direction));

    SlideResult {
        before: board.clone(),
        tiles: resolved.tiles,
        pairs: resolved.pairs,
        moved: resolved.moved,
    }
}

/// Settle phase: collapses merged pairs into tiles of double value and, if
/// anything moved, spawns one new tile.
///
/// A slide that moved nothing settles to the unchanged starting board.
pub fn settle(slide: &SlideResult, spawner: &mut Spawner) -> MoveResult {
    if !slide.moved {
        return MoveResult {
            board: slide.before.clone(),
            score_delta: 0,
            moved: false,
            merges: Vec::new(),
            spawned: None,
        };
    }

    let mut tiles: Vec<Tile> = slide
        .tiles
        .iter()
        .map(|slid| slid.tile)
        .filter(|tile| !tile.is_merging)
        .collect();

    let mut merges = Vec::with_capacity(slide.pairs.len());
    for pair in &slide.pairs {
        let result = Tile::merge_result(spawner.next_id(), pair.cell, pair.value * 2);
        tiles.push(result);
        merges.push(Merge {
            cell: pair.cell,
            value: result.value,
            sources: [pair.resident, pair.mover],
            result: result.id,
        });
    }

    let mut board = Board::from_settled(tiles);
    let spawned = spawner
        .pick_empty(&board)
        .map(|cell| Tile::spawned(spawner.next_id(), cell, SPAWN_VALUE));
    if let Some(tile) = spawned {
        board.push(tile);
    }

    MoveResult {
        score_delta: merges.iter().map(|merge| merge.value).sum(),
        board,
        moved: true,
        merges,
        spawned,
    }
}

/// Both phases of a move in one call.
pub fn apply_move(board: &Board, direction: Direction, spawner: &mut Spawner) -> MoveResult {
    settle(&slide(board, direction), spawner)
}

/// True when the board is full and no two neighbours below [`MAX_TILE_VALUE`]
/// share a value.
pub fn is_terminal(board: &Board) -> bool {
    if !board.is_full() {
        return false;
    }
    let values = board.value_grid();
    // Right and down neighbours cover every adjacent pair once.
    Cell::all().all(|cell| {
        let Some(value) = values.at(cell) else {
            return true;
        };
        [Direction::Right, Direction::Down]
            .into_iter()
            .filter_map(|direction| cell.step(direction))
            .all(|neighbour| value >= MAX_TILE_VALUE || values.at(neighbour) != Some(value))
    })
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    /// Builds a board from a row-major value layout, 0 meaning empty.
    fn board(layout: [[u32; 4]; 4]) -> Board {
        let tiles = layout
            .iter()
            .enumerate()
            .flat_map(|(row, values)| {
                values
                    .iter()
                    .enumerate()
                    .filter(|(_, value)| **value != 0)
                    .map(move |(col, value)| (row, col, *value))
            })
            .enumerate()
            .map(|(id, (row, col, value))| Tile::new(TileId(id as u64), Cell::new(row, col), value))
            .collect();
        Board::from_tiles(tiles).expect("test layout is a valid board")
    }

    fn layout(board: &Board) -> [[u32; 4]; 4] {
        let mut layout = [[0; 4]; 4];
        for tile in board.tiles() {
            if let Some(slot) = layout.get_mut(tile.row).and_then(|row| row.get_mut(tile.col)) {
                *slot = tile.value;
            }
        }
        layout
    }

    /// Layout of the slid-and-merged board, leaving out the spawned tile.
    fn merged_layout(result: &MoveResult) -> [[u32; 4]; 4] {
        let tiles = result
            .board
            .tiles()
            .iter()
            .copied()
            .filter(|tile| Some(tile.id) != result.spawned.map(|spawned| spawned.id))
            .collect();
        layout(&Board::from_tiles(tiles).expect("subset of a valid board"))
    }

    fn random_board(rng: &mut Rng) -> Board {
        let mut layout = [[0; 4]; 4];
        for row in &mut layout {
            for value in row.iter_mut() {
                if rng.u8(..3) != 0 {
                    *value = 1 << rng.u32(1..5);
                }
            }
        }
        board(layout)
    }

    fn spawner_after(board: &Board, seed: u64) -> Spawner {
        let mut spawner = Spawner::with_seed(seed);
        spawner.reserve_ids(board);
        spawner
    }

    #[test]
    fn two_twos_merge_to_the_left() {
        let start = board([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let result = apply_move(&start, Direction::Left, &mut spawner_after(&start, 1));

        assert!(result.moved, "the right tile slid");
        assert_eq!(result.score_delta, 4);
        assert_eq!(result.board.len(), 2);
        let merged = result.board.tile_at(Cell::new(0, 0)).expect("merge result at (0, 0)");
        assert_eq!(merged.value, 4);
        assert!(merged.is_merge_result);
        let spawned = result.spawned.expect("a tile spawns after a move");
        assert_ne!(spawned.cell(), Cell::new(0, 0));
        assert_eq!(spawned.value, SPAWN_VALUE);
        assert!(spawned.is_new);
    }

    #[test]
    fn a_tile_merges_only_once_per_move() {
        let start = board([[2, 2, 2, 2], [4, 2, 2, 0], [8, 8, 16, 0], [2, 0, 2, 4]]);
        let result = apply_move(&start, Direction::Left, &mut spawner_after(&start, 7));

        assert_eq!(
            merged_layout(&result),
            [[4, 4, 0, 0], [4, 4, 0, 0], [16, 16, 0, 0], [4, 4, 0, 0]]
        );
        assert_eq!(result.score_delta, 4 + 4 + 4 + 16 + 4);
        assert_eq!(result.merges.len(), 5);
    }

    #[test]
    fn tiles_at_the_value_cap_never_merge() {
        const M: u32 = MAX_TILE_VALUE;
        let start = board([[M, M, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let slid = slide(&start, Direction::Left);
        assert_eq!(slid.merge_count(), 0, "capped tiles merged");
        assert!(!slid.moved(), "nothing can slide left");

        let result = apply_move(&start, Direction::Right, &mut spawner_after(&start, 5));
        assert!(result.merges.is_empty(), "capped tiles merged");
        assert_eq!(result.score_delta, 0);
        assert_eq!(merged_layout(&result), [[0, 0, M, M], [0; 4], [0; 4], [0; 4]]);
        assert!(
            Board::from_tiles(result.board.tiles().to_vec()).is_ok(),
            "settled board breaks the value limit"
        );

        let capped = board([[M, M, 2, 4], [2, 4, 8, 2], [4, 2, 4, 8], [2, 4, 2, 4]]);
        assert!(is_terminal(&capped), "only capped pairs touch");
        for direction in Direction::iter() {
            assert!(!slide(&capped, direction).moved(), "{direction} moved a locked board");
        }
    }

    #[test]
    fn chains_collapse_toward_the_target_edge() {
        let start = board([[2, 0, 0, 2], [0; 4], [0; 4], [0; 4]]);
        let result = apply_move(&start, Direction::Right, &mut spawner_after(&start, 3));
        assert_eq!(merged_layout(&result), [[0, 0, 0, 4], [0; 4], [0; 4], [0; 4]]);

        let start = board([[4, 0, 0, 0], [4, 0, 0, 0], [8, 0, 0, 0], [8, 0, 0, 0]]);
        let result = apply_move(&start, Direction::Down, &mut spawner_after(&start, 3));
        assert_eq!(
            merged_layout(&result),
            [[0; 4], [0; 4], [8, 0, 0, 0], [16, 0, 0, 0]]
        );
        assert_eq!(result.score_delta, 24);

        let start = board([[2, 0, 0, 0], [2, 0, 0, 0], [2, 0, 0, 0], [0; 4]]);
        let result = apply_move(&start, Direction::Up, &mut spawner_after(&start, 3));
        assert_eq!(
            merged_layout(&result),
            [[4, 0, 0, 0], [2, 0, 0, 0], [0; 4], [0; 4]]
        );
    }

    #[test]
    fn a_merged_cell_blocks_the_tiles_behind_it() {
        let start = board([[4, 4, 8, 0], [0; 4], [0; 4], [0; 4]]);
        let result = apply_move(&start, Direction::Left, &mut spawner_after(&start, 5));
        assert_eq!(merged_layout(&result), [[8, 8, 0, 0], [0; 4], [0; 4], [0; 4]]);
        assert_eq!(result.merges.len(), 1);
    }

    #[test]
    fn slide_flags_both_merge_sources() {
        let start = board([[0; 4], [0, 8, 0, 8], [0; 4], [0; 4]]);
        let slid = slide(&start, Direction::Right);

        assert!(slid.moved());
        assert_eq!(slid.merge_count(), 1);
        let sources: Vec<_> = slid
            .tiles()
            .iter()
            .filter(|slid| slid.tile.is_merging)
            .collect();
        assert_eq!(sources.len(), 2);
        assert!(sources.iter().all(|slid| slid.tile.cell() == Cell::new(1, 3)));
        assert!(sources.iter().any(|slid| slid.has_moved()));
        assert!(sources.iter().any(|slid| !slid.has_moved()));
    }

    #[test]
    fn blocked_move_changes_nothing() {
        let start = board([[2, 0, 0, 0], [4, 0, 0, 0], [8, 0, 0, 0], [16, 0, 0, 0]]);
        let result = apply_move(&start, Direction::Left, &mut spawner_after(&start, 9));

        assert!(!result.moved);
        assert_eq!(result.score_delta, 0);
        assert_eq!(result.board, start);
        assert!(result.spawned.is_none());
        assert!(result.merges.is_empty());
    }

    #[test]
    fn flags_from_the_previous_move_are_cleared() {
        let start = board([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let mut spawner = spawner_after(&start, 11);
        let first = apply_move(&start, Direction::Left, &mut spawner);
        let second = apply_move(&first.board, Direction::Down, &mut spawner);

        assert!(second.moved);
        let fresh = second.spawned.map(|tile| tile.id);
        for tile in second.board.tiles() {
            if Some(tile.id) == fresh {
                continue;
            }
            assert!(!tile.is_new, "{} kept its new flag", tile.id);
            assert!(!tile.is_merging, "{} still merging", tile.id);
        }
    }

    #[test]
    fn tile_ids_survive_plain_slides() {
        let start = board([[0, 0, 0, 2], [0; 4], [0; 4], [0; 4]]);
        let id = start.tiles().first().map(|tile| tile.id);
        let result = apply_move(&start, Direction::Left, &mut spawner_after(&start, 2));
        assert_eq!(result.board.tile_at(Cell::new(0, 0)).map(|tile| tile.id), id);
    }

    #[test]
    fn spawn_lands_on_the_only_empty_cell() {
        let mut full = [[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 0]];
        let almost = board(full);
        let tile = spawn_tile(&almost, 2, &mut spawner_after(&almost, 4)).expect("one cell left");
        assert_eq!(tile.cell(), Cell::new(3, 3));

        full[3][3] = 2;
        let packed = board(full);
        assert_eq!(
            spawn_tile(&packed, 2, &mut spawner_after(&packed, 4)),
            Err(EngineError::NoEmptyCell)
        );
    }

    #[test]
    fn spawn_rejects_invalid_values() {
        let empty = Board::empty();
        assert!(matches!(
            spawn_tile(&empty, 3, &mut Spawner::with_seed(0)),
            Err(EngineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn spawn_is_spread_over_empty_cells() {
        let mut spawner = Spawner::with_seed(21);
        let mut seen = Grid::<bool>::default();
        for _ in 0..400 {
            let tile = spawn_tile(&Board::empty(), 2, &mut spawner).expect("empty board");
            if let Some(hit) = seen.get_mut(tile.cell()) {
                *hit = true;
            }
        }
        assert!(Cell::all().all(|cell| seen.get(cell) == Some(&true)));
    }

    #[test]
    fn initial_board_has_two_distinct_twos() {
        for seed in 0..50 {
            let board = initial_board(&mut Spawner::with_seed(seed));
            assert_eq!(board.len(), 2);
            assert!(board.tiles().iter().all(|tile| tile.value == 2 && tile.is_new));
            let cells: Vec<_> = board.tiles().iter().map(Tile::cell).collect();
            assert_ne!(cells.first(), cells.get(1), "seed {seed} stacked the tiles");
        }
    }

    #[test]
    fn terminal_when_full_without_neighbours() {
        let locked = board([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        assert!(is_terminal(&locked));
        for direction in Direction::iter() {
            assert!(!slide(&locked, direction).moved(), "{direction} moved a locked board");
        }
    }

    #[test]
    fn not_terminal_with_a_merge_or_a_gap() {
        let horizontal = board([[2, 2, 4, 8], [4, 8, 16, 32], [8, 16, 32, 64], [16, 32, 64, 128]]);
        assert!(!is_terminal(&horizontal));

        let vertical = board([[2, 4, 8, 16], [2, 8, 16, 32], [4, 16, 32, 64], [8, 32, 64, 128]]);
        assert!(!is_terminal(&vertical));

        let gap = board([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 0]]);
        assert!(!is_terminal(&gap));
    }

    #[test]
    fn random_moves_respect_merge_and_count_rules() {
        let mut rng = Rng::with_seed(2048);
        for round in 0..500 {
            let start = random_board(&mut rng);
            let direction = Direction::iter()
                .nth(rng.usize(..4))
                .expect("four directions");
            let slid = slide(&start, direction);
            let result = settle(&slid, &mut spawner_after(&start, round));

            let mut merged_sources: Vec<TileId> =
                result.merges.iter().flat_map(|merge| merge.sources).collect();
            let source_count = merged_sources.len();
            merged_sources.sort_unstable();
            merged_sources.dedup();
            assert_eq!(merged_sources.len(), source_count, "a tile merged twice");

            let mut cells: Vec<Cell> = result.merges.iter().map(|merge| merge.cell).collect();
            cells.sort_unstable();
            cells.dedup();
            assert_eq!(cells.len(), result.merges.len(), "a cell took two merges");

            let expected = (start.len() - result.merges.len() + usize::from(result.moved))
                .min(Board::CELLS);
            assert_eq!(result.board.len(), expected, "tile count off for\n{start}");

            assert_eq!(
                result.score_delta,
                result.merges.iter().map(|merge| merge.value).sum::<u32>()
            );
            if !result.moved {
                assert_eq!(result.board, start);
                assert_eq!(result.score_delta, 0);
            }
            assert_eq!(is_terminal(&result.board), {
                result.board.is_full()
                    && Direction::iter().all(|direction| !slide(&result.board, direction).moved())
            });
        }
    }
}
