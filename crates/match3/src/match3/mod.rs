use bevy::prelude::*;
use bits_helpers::grid::BoardLayout;
use bits_helpers::pause::not_paused;
use bits_helpers::score::AddScore;

mod board;
mod config;
mod engine;
mod error;
mod events;
mod matching;
mod swipe;
mod systems;

pub mod prelude {
    pub use super::board::{Board, Tile, TileId};
    pub use super::config::Match3Config;
    pub use super::engine::{BoardEngine, Phase, SwipeOutcome};
    pub use super::error::Match3Error;
    pub use super::events::{BoardEvent, BoardEvents, Fall, Removal, Spawn};
    pub use super::matching::{find_match, Match, MIN_MATCH};
    pub use super::swipe::{Direction, SwipeState, SwipeTracker};
    pub use super::Match3Plugin;
    pub use bits_helpers::grid::BoardLayout;
}

use config::Match3Config;
use engine::BoardEngine;
use events::BoardEvents;

/// Runs a [`BoardEngine`] from pointer input and replays its events into [`BoardEvents`].
///
/// Score deltas leave as [`AddScore`], everything else waits in the queue for presentation.
pub struct Match3Plugin {
    pub config: Match3Config,
    pub layout: BoardLayout,
}

impl Plugin for Match3Plugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone())
            .insert_resource(self.layout)
            .init_resource::<BoardEvents>()
            .add_event::<AddScore>();

        match BoardEngine::new(self.config.clone()) {
            Ok(engine) => {
                app.insert_resource(engine);
            }
            Err(err) => error!("Could not create the match-3 board: {err}"),
        }

        app.add_systems(
            Update,
            (
                systems::pointer_input.run_if(not_paused),
                systems::advance_engine,
                systems::forward_events,
            )
                .chain()
                .run_if(resource_exists::<BoardEngine>),
        );
    }
}
