use core::time::Duration;

use bevy::prelude::*;
use play_helpers::floating_score::spawn_floating_score;
use tile_engine::{Cell, GRID_SIZE, SlideResult, Tile, TileId};

use crate::palette::{self, tile_colors, tile_font_size};
use crate::{PlayConfig, ScreenState, Session, TileState};

// The HUD sits above the board.
const BOARD_Y: f32 = -40.0;

const SLOT_Z: f32 = -5.0;
const TILE_Z: f32 = 0.0;
const MERGING_Z: f32 = 1.0;
const POPUP_Z: f32 = 20.0;

const POP_FROM: f32 = 0.6;
const POP_DURATION: Duration = Duration::from_millis(150);

#[derive(Component)]
pub struct TileVisual {
    id: TileId,
}

#[derive(Component)]
pub struct TileMotion {
    from: Vec3,
    to: Vec3,
}

/// Scales a fresh tile up to full size.
#[derive(Component)]
pub struct PopIn(Timer);

#[derive(Resource)]
pub struct SettleTimer(pub Timer);

/// World position of a cell's centre, row 0 at the top.
pub fn cell_translation(config: &PlayConfig, cell: Cell, z: f32) -> Vec3 {
    let pitch = config.cell_size + config.cell_gap;
    let offset = -pitch * (GRID_SIZE as f32 - 1.0) / 2.0;
    Vec3::new(
        (cell.col as f32).mul_add(pitch, offset),
        BOARD_Y - (cell.row as f32).mul_add(pitch, offset),
        z,
    )
}

pub fn setup_board(
    mut commands: Commands,
    config: Res<PlayConfig>,
    mut next_state: ResMut<NextState<ScreenState>>,
) {
    commands.spawn(Camera2d);

    let side = (config.cell_size + config.cell_gap).mul_add(GRID_SIZE as f32, config.cell_gap);
    commands.spawn((
        Sprite::from_color(palette::BOARD, Vec2::splat(side)),
        Transform::from_xyz(0.0, BOARD_Y, SLOT_Z - 1.0),
    ));
    for cell in Cell::all() {
        commands.spawn((
            Sprite::from_color(palette::SLOT, Vec2::splat(config.cell_size)),
            Transform::from_translation(cell_translation(&config, cell, SLOT_Z)),
        ));
    }

    next_state.set(ScreenState::Playing);
}

fn spawn_tile_visual(commands: &mut Commands, config: &PlayConfig, tile: &Tile) {
    let colors = tile_colors(tile.value);
    let pops = tile.is_new || tile.is_merge_result;
    let scale = if pops { POP_FROM } else { 1.0 };

    let mut entity = commands.spawn((
        Sprite::from_color(colors.background, Vec2::splat(config.cell_size)),
        Transform::from_translation(cell_translation(config, tile.cell(), TILE_Z))
            .with_scale(Vec3::splat(scale)),
        TileVisual { id: tile.id },
    ));
    entity.with_child((
        Text2d::new(tile.value.to_string()),
        TextFont {
            font_size: tile_font_size(tile.value, config.cell_size),
            ..default()
        },
        TextColor(colors.text),
        Transform::from_xyz(0.0, 0.0, 1.0),
    ));
    if pops {
        entity.insert(PopIn(Timer::new(POP_DURATION, TimerMode::Once)));
    }
}

fn respawn_tiles(
    commands: &mut Commands,
    config: &PlayConfig,
    session: &Session,
    visuals: &Query<Entity, With<TileVisual>>,
) {
    for entity in visuals.iter() {
        commands.entity(entity).despawn_recursive();
    }
    for tile in session.board().tiles() {
        spawn_tile_visual(commands, config, tile);
    }
}

pub fn spawn_tiles(
    mut commands: Commands,
    config: Res<PlayConfig>,
    session: Res<Session>,
    visuals: Query<Entity, With<TileVisual>>,
) {
    info!("New board\n{}", session.board());
    respawn_tiles(&mut commands, &config, &session, &visuals);
}

/// Points every tile visual at the cell it slides to. Merging tiles are
/// drawn over the tile they merge into.
pub fn start_slide(
    commands: &mut Commands,
    config: &PlayConfig,
    slide: &SlideResult,
    visuals: &Query<(Entity, &TileVisual)>,
) {
    for (entity, visual) in visuals.iter() {
        let Some(slid) = slide.tiles().iter().find(|slid| slid.tile.id == visual.id) else {
            warn!("No slide for tile {}", visual.id);
            continue;
        };
        let z = if slid.tile.is_merging { MERGING_Z } else { TILE_Z };
        commands.entity(entity).insert(TileMotion {
            from: cell_translation(config, slid.from, TILE_Z),
            to: cell_translation(config, slid.tile.cell(), z),
        });
    }
}

fn ease_out(t: f32) -> f32 {
    let inverse = 1.0 - t;
    inverse.mul_add(-inverse, 1.0)
}

pub fn slide_tiles(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<PlayConfig>,
    timer: Option<ResMut<SettleTimer>>,
    mut session: ResMut<Session>,
    mut moving: Query<(&TileMotion, &mut Transform)>,
    visuals: Query<Entity, With<TileVisual>>,
    mut next_tile_state: ResMut<NextState<TileState>>,
    mut next_screen_state: ResMut<NextState<ScreenState>>,
) {
    let Some(mut timer) = timer else {
        return;
    };
    timer.0.tick(time.delta());
    let progress = ease_out(timer.0.fraction());
    for (motion, mut transform) in &mut moving {
        transform.translation = motion.from.lerp(motion.to, progress);
    }
    if !timer.0.finished() {
        return;
    }

    commands.remove_resource::<SettleTimer>();
    next_tile_state.set(TileState::StandBy);

    let Some(result) = session.settle() else {
        warn!("Slide finished without a move in flight");
        return;
    };
    respawn_tiles(&mut commands, &config, &session, &visuals);
    for merge in &result.merges {
        spawn_floating_score(
            &mut commands,
            cell_translation(&config, merge.cell, POPUP_Z),
            &format!("+{}", merge.value),
            palette::SCORE_POPUP,
        );
    }

    if session.is_over() {
        next_screen_state.set(ScreenState::Over);
    }
}

pub fn pop_tiles(
    mut commands: Commands,
    time: Res<Time>,
    mut popping: Query<(Entity, &mut PopIn, &mut Transform)>,
) {
    for (entity, mut pop, mut transform) in &mut popping {
        pop.0.tick(time.delta());
        transform.scale = Vec3::splat((1.0 - POP_FROM).mul_add(pop.0.fraction(), POP_FROM));
        if pop.0.finished() {
            commands.entity(entity).remove::<PopIn>();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_laid_out_row_major_from_the_top_left() {
        let config = PlayConfig::default();
        let top_left = cell_translation(&config, Cell::new(0, 0), 0.0);
        let bottom_right = cell_translation(&config, Cell::new(3, 3), 0.0);

        assert!(top_left.x < bottom_right.x, "columns grow to the right");
        assert!(top_left.y > bottom_right.y, "rows grow downwards");
        assert!(
            (top_left.x + bottom_right.x).abs() < f32::EPSILON,
            "board is centred horizontally"
        );
        assert!(
            ((top_left.y + bottom_right.y) / 2.0 - BOARD_Y).abs() < f32::EPSILON,
            "board is centred on its offset"
        );
    }

    #[test]
    fn neighbouring_cells_are_one_pitch_apart() {
        let config = PlayConfig::default();
        let a = cell_translation(&config, Cell::new(1, 1), 0.0);
        let b = cell_translation(&config, Cell::new(1, 2), 0.0);
        let pitch = config.cell_size + config.cell_gap;

        assert!((b.x - a.x - pitch).abs() < 1e-4, "horizontal pitch");
        assert!((a.y - b.y).abs() < f32::EPSILON, "same row, same height");
    }

    #[test]
    fn easing_starts_and_ends_on_the_endpoints() {
        assert!(ease_out(0.0).abs() < f32::EPSILON, "starts at 0");
        assert!((ease_out(1.0) - 1.0).abs() < f32::EPSILON, "ends at 1");
        assert!(ease_out(0.5) > 0.5, "front-loaded");
    }
}
