use bevy::asset::AssetMetaCheck;
use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use bevy::render::RenderPlugin;
use bevy::render::settings::{WgpuSettings, WgpuSettingsPriority};
use bevy::window::{WindowMode, WindowResolution};

// typical smartphone screen ratio (9:16)
pub const WINDOW_WIDTH: f32 = 360.0;
pub const WINDOW_HEIGHT: f32 = 640.0;

/// Log filter applied on top of the default level.
pub const LOG_FILTER: &str = "wgpu=error,naga=warn,bevy_render=warn,tile_engine=debug";

pub const BACKGROUND: Color = Color::srgb(0.94, 0.96, 1.0);

/// Creates a Bevy app with the window, renderer and logging setup shared by
/// every game in this workspace.
///
/// `canvas` is the CSS selector of the canvas the game draws into on the web.
pub fn default_app(title: &str, canvas: &str) -> App {
    let mut app = App::new();

    let asset_plugin = AssetPlugin {
        // No .meta files are shipped, don't let the browser 404 on each of them.
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    let window_plugin = WindowPlugin {
        primary_window: Some(Window {
            title: title.to_string(),
            present_mode: bevy::window::PresentMode::Fifo,
            resolution: WindowResolution::new(WINDOW_WIDTH, WINDOW_HEIGHT),
            canvas: Some(canvas.to_string()),
            fit_canvas_to_parent: true,
            mode: WindowMode::Windowed,
            // Arrow keys would scroll the page otherwise.
            prevent_default_event_handling: true,
            ..default()
        }),
        ..default()
    };

    let render_plugin = RenderPlugin {
        render_creation: bevy::render::settings::RenderCreation::Automatic(WgpuSettings {
            backends: Some(
                bevy::render::settings::Backends::BROWSER_WEBGPU
                    | bevy::render::settings::Backends::GL,
            ),
            power_preference: bevy::render::settings::PowerPreference::HighPerformance,
            priority: WgpuSettingsPriority::Functionality,
            ..default()
        }),
        ..default()
    };

    let log_plugin = LogPlugin {
        level: Level::INFO,
        filter: LOG_FILTER.to_string(),
        ..default()
    };

    app.add_plugins(
        DefaultPlugins
            .set(asset_plugin)
            .set(window_plugin)
            .set(render_plugin)
            .set(log_plugin),
    );

    // The board only changes on input, no need to burn battery at full frame rate.
    app.add_plugins(bevy_framepace::FramepacePlugin);

    app.insert_resource(ClearColor(BACKGROUND));

    app
}
