use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use bevy::window::{WindowMode, WindowResolution};

use crate::pause::PausePlugin;
use crate::score::ScorePlugin;

// typical smartphone screen ratio (9:16)
pub const WINDOW_WIDTH: f32 = 360.0;
pub const WINDOW_HEIGHT: f32 = 640.0;

// Creates a Bevy app with the window, pause and score setup every game shares
pub fn get_default_app(bit_name: &str) -> App {
    let mut app = App::new();

    let asset_plugin = AssetPlugin {
        mode: bevy::asset::AssetMode::Unprocessed,
        file_path: "assets".to_string(),
        processed_file_path: "imported_assets/Default".to_string(),
        watch_for_changes_override: None,
        meta_check: AssetMetaCheck::Never,
    };

    let window_plugin = WindowPlugin {
        primary_window: Some(Window {
            title: bit_name.to_string(),
            present_mode: bevy::window::PresentMode::Fifo,
            resolution: WindowResolution::new(WINDOW_WIDTH, WINDOW_HEIGHT),
            mode: WindowMode::Windowed,
            // Leaves default browser/OS shortcuts alone
            prevent_default_event_handling: false,
            ..default()
        }),
        ..default()
    };

    app.add_plugins(DefaultPlugins.set(asset_plugin).set(window_plugin));

    // This plugin is useful to preserve battery life on mobile.
    // https://github.com/aevyrie/bevy_framepace
    app.add_plugins(bevy_framepace::FramepacePlugin);

    app.insert_resource(ClearColor(Color::BLACK))
        .add_plugins((PausePlugin, ScorePlugin));

    info!("Starting {bit_name}");
    app
}
