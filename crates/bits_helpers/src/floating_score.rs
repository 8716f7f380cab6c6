use core::time::Duration;

use bevy::prelude::*;

const RISE_DISTANCE: f32 = 50.0;

/// World space "+N" text that rises and shrinks until its timer runs out.
#[derive(Component)]
pub struct FloatingScore {
    timer: Timer,
    initial_position: Vec2,
}

pub fn spawn_floating_score(
    commands: &mut Commands,
    position: Vec2,
    text: &str,
    color: Srgba,
    lifetime: Duration,
) {
    commands.spawn((
        Text2d::new(text),
        TextFont {
            font_size: 28.0,
            ..default()
        },
        TextColor(Color::Srgba(color)),
        Transform::from_translation(position.extend(10.0)),
        FloatingScore {
            timer: Timer::new(lifetime, TimerMode::Once),
            initial_position: position,
        },
    ));
}

pub fn animate_floating_scores(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Transform, &mut TextColor, &mut FloatingScore)>,
) {
    for (entity, mut transform, mut color, mut floating_score) in &mut query {
        floating_score.timer.tick(time.delta());
        let progress = floating_score.timer.fraction();

        transform.translation.y = RISE_DISTANCE.mul_add(progress, floating_score.initial_position.y);
        transform.scale = Vec3::splat(1.0 - 0.5 * progress);
        color.0.set_alpha(1.0 - progress);

        if floating_score.timer.finished() {
            commands.entity(entity).despawn();
        }
    }
}
