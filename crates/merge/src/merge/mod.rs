use bevy::prelude::*;
use bits_helpers::grid::BoardLayout;
use bits_helpers::pause::not_paused;
use bits_helpers::score::AddScore;

mod config;
mod engine;
mod error;
mod events;
mod systems;

pub mod prelude {
    pub use super::config::MergeConfig;
    pub use super::engine::{DropOutcome, MergeEngine, Piece};
    pub use super::error::MergeError;
    pub use super::events::{MergeEvent, MergeEvents, PieceId, PieceSpawn};
    pub use super::MergePlugin;
    pub use bits_helpers::grid::BoardLayout;
}

use config::MergeConfig;
use engine::MergeEngine;
use events::MergeEvents;

/// Drives a [`MergeEngine`] from the clock and pointer input.
pub struct MergePlugin {
    pub config: MergeConfig,
    pub layout: BoardLayout,
}

impl Plugin for MergePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone())
            .insert_resource(self.layout)
            .init_resource::<MergeEvents>()
            .add_event::<AddScore>();

        match MergeEngine::new(self.config.clone()) {
            Ok(engine) => {
                app.insert_resource(engine);
            }
            Err(err) => error!("Could not create the merge board: {err}"),
        }

        app.add_systems(
            Update,
            (
                systems::pointer_input.run_if(not_paused),
                systems::advance_engine,
                systems::forward_events,
            )
                .chain()
                .run_if(resource_exists::<MergeEngine>),
        );
    }
}

#[cfg(test)]
mod tests {
    use core::time::Duration;

    use bevy::ecs::event::Events;
    use bevy::input::touch::Touches;
    use bevy::math::IVec2;
    use bits_helpers::pause::PauseState;

    use super::prelude::*;
    use super::*;

    fn app() -> App {
        let mut app = App::new();
        app.init_resource::<Time>()
            .init_resource::<ButtonInput<MouseButton>>()
            .init_resource::<Touches>()
            .init_resource::<PauseState>()
            .add_plugins(MergePlugin {
                config: MergeConfig {
                    seed: Some(2),
                    ..default()
                },
                layout: BoardLayout::default(),
            });
        app
    }

    #[test]
    fn clock_spawns_into_the_presentation_queue() {
        let mut app = app();
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(3.5));
        app.update();

        let mut queue = app.world_mut().resource_mut::<MergeEvents>();
        assert!(
            matches!(queue.pop(), Some(MergeEvent::Spawned(PieceSpawn { level: 1, .. }))),
            "one level-1 piece"
        );
        assert!(queue.is_empty(), "only one");
    }

    #[test]
    fn merges_are_scored_through_add_score() {
        let mut app = app();
        {
            let mut engine = app.world_mut().resource_mut::<MergeEngine>();
            let from = IVec2::new(0, 0);
            let to = IVec2::new(1, 0);
            engine.spawn_at(from, 1).unwrap();
            engine.spawn_at(to, 1).unwrap();
            let start = engine.cell_to_world(from);
            engine.pointer_down(start);
            engine.pointer_move(start + Vec2::X);
            assert_eq!(
                engine.pointer_up().unwrap(),
                DropOutcome::Merged { level: 2 },
                "merged"
            );
        }

        app.update();

        let added: u32 = app
            .world()
            .resource::<Events<AddScore>>()
            .iter_current_update_events()
            .map(|AddScore(points)| *points)
            .sum();
        assert_eq!(added, 1, "one point");
    }
}
