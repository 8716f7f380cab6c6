use bevy::prelude::*;

/// One step of a single pointer gesture, mouse or first touch alike.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Vec2),
    Move(Vec2),
    Up,
}

pub fn just_pressed_screen_position(
    button_input: &ButtonInput<MouseButton>,
    touch_input: &Touches,
    windows: &Query<&Window>,
) -> Option<Vec2> {
    if button_input.just_pressed(MouseButton::Left) {
        windows.get_single().ok()?.cursor_position()
    } else if touch_input.any_just_pressed() {
        let touch = touch_input.iter_just_pressed().next()?;
        Some(touch.position())
    } else {
        None
    }
}

/// Position of a pointer that is held down, whether it just went down or not.
pub fn held_screen_position(
    button_input: &ButtonInput<MouseButton>,
    touch_input: &Touches,
    windows: &Query<&Window>,
) -> Option<Vec2> {
    if button_input.pressed(MouseButton::Left) {
        windows.get_single().ok()?.cursor_position()
    } else {
        touch_input.first_pressed_position()
    }
}

pub fn just_released(button_input: &ButtonInput<MouseButton>, touch_input: &Touches) -> bool {
    button_input.just_released(MouseButton::Left) || touch_input.any_just_released()
}

pub fn screen_to_world(
    position: Vec2,
    camera: &Query<(&Camera, &GlobalTransform)>,
) -> Option<Vec2> {
    let (camera, camera_transform) = camera.get_single().ok()?;
    camera.viewport_to_world_2d(camera_transform, position).ok()
}

pub fn just_pressed_world_position(
    button_input: &ButtonInput<MouseButton>,
    touch_input: &Touches,
    windows: &Query<&Window>,
    camera: &Query<(&Camera, &GlobalTransform)>,
) -> Option<Vec2> {
    let position = just_pressed_screen_position(button_input, touch_input, windows)?;
    screen_to_world(position, camera)
}

/// Reduces this frame's mouse and touch state to at most one pointer event.
///
/// A press wins over a release in the same frame so a quick tap still starts a gesture.
pub fn read_pointer(
    button_input: &ButtonInput<MouseButton>,
    touch_input: &Touches,
    windows: &Query<&Window>,
    camera: &Query<(&Camera, &GlobalTransform)>,
) -> Option<PointerEvent> {
    if let Some(world) = just_pressed_world_position(button_input, touch_input, windows, camera) {
        return Some(PointerEvent::Down(world));
    }

    if just_released(button_input, touch_input) {
        return Some(PointerEvent::Up);
    }

    let position = held_screen_position(button_input, touch_input, windows)?;
    screen_to_world(position, camera).map(PointerEvent::Move)
}
