use bevy::color::Mix;
use bevy::prelude::*;
use bevy::utils::HashMap;
use bits_helpers::score::spawn_score_text;
use bits_helpers::{WINDOW_HEIGHT, WINDOW_WIDTH};
use merge::prelude::*;

pub mod merge;

pub use merge::prelude;

const BOARD_MARGIN: f32 = 20.0;
const MAX_TILE_SIZE: f32 = 64.0;
const POP_SCALE: f32 = 1.3;
const POP_SECONDS: f32 = 0.2;
// Level at which the color ramp tops out
const TOP_LEVEL: f32 = 10.0;

const LOW_LEVEL_COLOR: Srgba = Srgba::rgb(0.35, 0.75, 0.95);
const HIGH_LEVEL_COLOR: Srgba = Srgba::rgb(0.95, 0.30, 0.45);

pub fn run() {
    run_with(MergeConfig::default());
}

pub fn run_with(config: MergeConfig) {
    let layout = BoardLayout::fit(
        UVec2::new(config.width, config.height),
        Vec2::new(WINDOW_WIDTH - 2.0 * BOARD_MARGIN, WINDOW_HEIGHT - 4.0 * BOARD_MARGIN),
        MAX_TILE_SIZE,
    );
    bits_helpers::get_default_app(env!("CARGO_PKG_NAME"))
        .add_plugins(MergePlugin { config, layout })
        .add_systems(Startup, setup)
        .add_systems(
            Update,
            (consume_events, follow_drag, drop_in, pop).chain(),
        )
        .run();
}

fn level_color(level: u32) -> Color {
    let t = (level as f32 / TOP_LEVEL).clamp(0.0, 1.0);
    LOW_LEVEL_COLOR.mix(&HIGH_LEVEL_COLOR, t).into()
}

#[derive(Component, Default)]
struct VisiblePieces(HashMap<PieceId, Entity>);

/// Board space center of every cell, in the engine's own mapping.
fn cell_centers(engine: &MergeEngine) -> Vec<Vec2> {
    let config = engine.config();
    (0..config.width as i32)
        .flat_map(|x| (0..config.height as i32).map(move |y| IVec2::new(x, y)))
        .map(|pos| engine.cell_to_world(pos))
        .collect()
}

fn setup(mut commands: Commands, engine: Option<Res<MergeEngine>>, layout: Res<BoardLayout>) {
    commands.spawn(Camera2d);

    let cell = Vec2::splat(layout.tile_size * 0.95);
    for center in engine.as_deref().map(cell_centers).unwrap_or_default() {
        commands.spawn((
            Sprite::from_color(Color::srgb(0.14, 0.14, 0.18), cell),
            Transform::from_translation(layout.to_world(center).extend(-1.0)),
        ));
    }

    commands.spawn((
        Transform::default(),
        Visibility::default(),
        VisiblePieces::default(),
    ));

    spawn_score_text(&mut commands);
}

/// Slides a spawned piece from above the board into its cell.
#[derive(Component)]
struct DropIn {
    from: Vec2,
    to: Vec2,
    timer: Timer,
}

/// Briefly scales a piece up and back down.
#[derive(Component)]
struct Pop(Timer);

fn spawn_piece(
    commands: &mut Commands,
    root: Entity,
    engine: &MergeEngine,
    layout: BoardLayout,
    spawn: PieceSpawn,
) -> Entity {
    let config = engine.config();
    let to = layout.to_world(engine.cell_to_world(spawn.position));
    let from = Vec2::new(to.x, layout.to_world(Vec2::Y * (config.height as f32 / 2.0 + 2.0)).y);
    let size = Vec2::splat(layout.tile_size * config.piece_scale(spawn.level));

    let piece = commands
        .spawn((
            Sprite::from_color(level_color(spawn.level), size),
            Transform::from_translation(from.extend(0.0)),
            DropIn {
                from,
                to,
                timer: Timer::from_seconds(config.spawn_drop_duration, TimerMode::Once),
            },
            Pop(Timer::from_seconds(2.0 * POP_SECONDS, TimerMode::Once)),
        ))
        .id();
    commands.entity(root).add_child(piece);
    piece
}

fn consume_events(
    mut commands: Commands,
    mut events: ResMut<MergeEvents>,
    engine: Res<MergeEngine>,
    layout: Res<BoardLayout>,
    mut pieces: Query<(Entity, &mut VisiblePieces)>,
    mut transforms: Query<&mut Transform>,
) {
    let Ok((root, mut visible)) = pieces.get_single_mut() else {
        error!("Could not find board");
        return;
    };

    for event in events.drain() {
        match event {
            MergeEvent::Spawned(spawn) => {
                let piece = spawn_piece(&mut commands, root, &engine, *layout, spawn);
                visible.0.insert(spawn.id, piece);
            }
            MergeEvent::Merged {
                dragged,
                target,
                into,
            } => {
                for id in [dragged, target] {
                    match visible.0.remove(&id) {
                        Some(piece) => commands.entity(piece).despawn_recursive(),
                        None => warn!("Could not find piece {id}"),
                    }
                }
                let piece = spawn_piece(&mut commands, root, &engine, *layout, into);
                visible.0.insert(into.id, piece);
            }
            MergeEvent::Returned { id, position } => {
                let Some(mut transform) = visible
                    .0
                    .get(&id)
                    .and_then(|piece| transforms.get_mut(*piece).ok())
                else {
                    warn!("Could not find piece {id}");
                    continue;
                };
                let home = layout.to_world(engine.cell_to_world(position));
                transform.translation = home.extend(0.0);
            }
            MergeEvent::ScoreDelta(_) => {}
        }
    }
}

fn follow_drag(
    engine: Res<MergeEngine>,
    layout: Res<BoardLayout>,
    pieces: Query<&VisiblePieces>,
    mut transforms: Query<&mut Transform>,
) {
    let Some((id, position)) = engine.dragged() else {
        return;
    };
    let Some(mut transform) = pieces
        .get_single()
        .ok()
        .and_then(|visible| visible.0.get(&id))
        .and_then(|piece| transforms.get_mut(*piece).ok())
    else {
        return;
    };
    // Above the resting pieces
    transform.translation = layout.to_world(position).extend(1.0);
}

fn drop_in(
    mut commands: Commands,
    time: Res<Time>,
    mut drops: Query<(Entity, &mut Transform, &mut DropIn)>,
) {
    for (entity, mut transform, mut falling) in &mut drops {
        falling.timer.tick(time.delta());
        // Smoothstep
        let t = falling.timer.fraction();
        let eased = t * t * 2.0f32.mul_add(-t, 3.0);
        transform.translation = falling
            .from
            .lerp(falling.to, eased)
            .extend(transform.translation.z);
        if falling.timer.finished() {
            commands.entity(entity).remove::<DropIn>();
        }
    }
}

fn pop(mut commands: Commands, time: Res<Time>, mut pops: Query<(Entity, &mut Transform, &mut Pop)>) {
    for (entity, mut transform, mut pop) in &mut pops {
        pop.0.tick(time.delta());
        // Up during the first half, back down during the second
        let swell = 1.0 - (2.0 * pop.0.fraction() - 1.0).abs();
        transform.scale = Vec3::splat((POP_SCALE - 1.0).mul_add(swell, 1.0));
        if pop.0.finished() {
            transform.scale = Vec3::ONE;
            commands.entity(entity).remove::<Pop>();
        }
    }
}

#[cfg(test)]
mod tests {
    use bevy::prelude::default;

    use super::*;

    #[test]
    fn backdrop_sits_under_every_piece() {
        let config = MergeConfig {
            seed: Some(4),
            ..default()
        };
        let mut engine = MergeEngine::new(config).unwrap();
        let centers = cell_centers(&engine);
        assert_eq!(centers.len(), 30, "one backdrop per cell");
        assert_eq!(centers.iter().sum::<Vec2>(), Vec2::ZERO, "centered on the origin");

        let corner = IVec2::new(4, 5);
        engine.spawn_at(corner, 1).unwrap();
        let (_, piece) = engine.piece_at(corner).unwrap();
        assert!(
            centers.contains(&engine.cell_to_world(piece.position)),
            "piece drawn on a backdrop cell"
        );
    }

    #[test]
    fn color_ramp_clamps_at_the_top_level() {
        assert_eq!(level_color(10), level_color(25), "clamped");
        assert_ne!(level_color(1), level_color(2), "levels differ");
    }
}
