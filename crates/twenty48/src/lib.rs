use core::time::Duration;

use bevy::prelude::*;
use play_helpers::floating_score::FloatingScorePlugin;
use play_helpers::restart::{Restartable, cleanup_marked_entities, handle_restart};
use storage::PlatformStore;
use tile_engine::input::SWIPE_THRESHOLD;
use tile_engine::{GameSession, InputTranslator};

mod board_view;
mod controls;
mod hud;
mod palette;
mod storage;

#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash)]
enum ScreenState {
    #[default]
    Init,
    Playing,
    Over,
}

#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash)]
enum TileState {
    #[default]
    StandBy,
    Slide,
}

/// Board geometry and move timing.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PlayConfig {
    pub cell_size: f32,
    pub cell_gap: f32,
    /// Time between starting a slide and settling it into the next board.
    pub settle_delay: Duration,
    /// Minimum pointer travel, in logical pixels, that counts as a swipe.
    pub swipe_threshold: f32,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            cell_size: 72.0,
            cell_gap: 8.0,
            settle_delay: Duration::from_millis(200),
            swipe_threshold: SWIPE_THRESHOLD,
        }
    }
}

#[derive(Resource, Deref, DerefMut)]
struct Session(GameSession<PlatformStore>);

impl Restartable for Session {
    type State = ScreenState;

    fn restart(&mut self) {
        self.reset();
    }

    fn restart_state() -> ScreenState {
        ScreenState::Playing
    }
}

pub fn run() {
    run_with(PlayConfig::default());
}

pub fn run_with(config: PlayConfig) {
    let controls = controls::Controls(InputTranslator::new(config.swipe_threshold));

    play_helpers::default_app(env!("CARGO_PKG_NAME"), "#twenty48")
        .insert_resource(Session(GameSession::new(PlatformStore::default())))
        .insert_resource(controls)
        .insert_resource(config)
        .init_state::<ScreenState>()
        .init_state::<TileState>()
        .add_plugins(FloatingScorePlugin)
        .add_systems(Startup, (board_view::setup_board, hud::spawn_hud))
        .add_systems(OnEnter(ScreenState::Playing), board_view::spawn_tiles)
        .add_systems(OnEnter(ScreenState::Over), hud::spawn_game_over)
        .add_systems(OnExit(ScreenState::Over), cleanup_marked_entities)
        .add_systems(
            Update,
            (
                controls::read_input.run_if(in_state(ScreenState::Playing)),
                board_view::slide_tiles
                    .run_if(in_state(ScreenState::Playing))
                    .run_if(in_state(TileState::Slide)),
                board_view::pop_tiles,
                hud::update_scores,
                handle_restart::<Session>.run_if(in_state(ScreenState::Over)),
            ),
        )
        .run();
}
