use bevy::input::touch::Touches;
use bevy::prelude::*;
use bits_helpers::grid::BoardLayout;
use bits_helpers::input::{read_pointer, PointerEvent};
use bits_helpers::score::AddScore;

use super::engine::BoardEngine;
use super::events::{BoardEvent, BoardEvents};

pub fn pointer_input(
    mut engine: ResMut<BoardEngine>,
    layout: Res<BoardLayout>,
    buttons: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    windows: Query<&Window>,
    camera: Query<(&Camera, &GlobalTransform)>,
) {
    let Some(pointer) = read_pointer(&buttons, &touches, &windows, &camera) else {
        return;
    };

    match pointer {
        PointerEvent::Down(world) => engine.pointer_down(layout.to_board_space(world)),
        PointerEvent::Move(world) => {
            if let Err(err) = engine.pointer_move(layout.to_board_space(world)) {
                error!("Swipe failed: {err}");
            }
        }
        PointerEvent::Up => engine.pointer_up(),
    }
}

// Virtual time stops while paused, so does the pacing timer.
pub fn advance_engine(mut engine: ResMut<BoardEngine>, time: Res<Time>) {
    engine.tick(time.delta_secs());
}

pub fn forward_events(
    mut engine: ResMut<BoardEngine>,
    mut queue: ResMut<BoardEvents>,
    mut scores: EventWriter<AddScore>,
) {
    for event in engine.drain_events() {
        match event {
            BoardEvent::ScoreDelta(points) => {
                scores.send(AddScore(points));
            }
            other => queue.push(other),
        }
    }
}
