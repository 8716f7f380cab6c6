use bevy::input::touch::Touches;
use bevy::prelude::*;
use bits_helpers::grid::BoardLayout;
use bits_helpers::input::{read_pointer, PointerEvent};
use bits_helpers::score::AddScore;

use super::engine::MergeEngine;
use super::events::{MergeEvent, MergeEvents};

pub fn pointer_input(
    mut engine: ResMut<MergeEngine>,
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
        PointerEvent::Move(world) => engine.pointer_move(layout.to_board_space(world)),
        PointerEvent::Up => {
            if let Err(err) = engine.pointer_up() {
                error!("Drop failed: {err}");
            }
        }
    }
}

pub fn advance_engine(mut engine: ResMut<MergeEngine>, time: Res<Time>) {
    if let Err(err) = engine.tick(time.delta_secs()) {
        error!("Spawn failed: {err}");
    }
}

pub fn forward_events(
    mut engine: ResMut<MergeEngine>,
    mut queue: ResMut<MergeEvents>,
    mut scores: EventWriter<AddScore>,
) {
    for event in engine.drain_events() {
        match event {
            MergeEvent::ScoreDelta(points) => {
                scores.send(AddScore(points));
            }
            other => queue.push(other),
        }
    }
}
