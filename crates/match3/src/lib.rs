use bevy::math::Vec3Swizzles;
use bevy::prelude::*;
use bevy::utils::HashMap;
use bits_helpers::score::spawn_score_text;
use bits_helpers::{WINDOW_HEIGHT, WINDOW_WIDTH};
use match3::prelude::*;

pub mod match3;

pub use match3::prelude;

const BOARD_MARGIN: f32 = 20.0;
const MAX_TILE_SIZE: f32 = 48.0;
// Cells per second of every slide
const MOVE_SPEED: f32 = 10.0;

const TILE_COLORS: [Srgba; 8] = [
    Srgba::rgb(0.90, 0.25, 0.25),
    Srgba::rgb(0.25, 0.70, 0.30),
    Srgba::rgb(0.25, 0.45, 0.90),
    Srgba::rgb(0.95, 0.80, 0.20),
    Srgba::rgb(0.70, 0.35, 0.85),
    Srgba::rgb(0.95, 0.55, 0.15),
    Srgba::rgb(0.20, 0.80, 0.85),
    Srgba::rgb(0.90, 0.90, 0.90),
];

pub fn run() {
    run_with(Match3Config::default());
}

pub fn run_with(config: Match3Config) {
    let layout = layout_for(&config);
    bits_helpers::get_default_app(env!("CARGO_PKG_NAME"))
        .add_plugins(Match3Plugin { config, layout })
        .add_systems(Startup, setup)
        .add_systems(Update, (consume_events, move_to).chain())
        .run();
}

fn layout_for(config: &Match3Config) -> BoardLayout {
    BoardLayout::fit(
        UVec2::new(config.width, config.height),
        Vec2::new(WINDOW_WIDTH - 2.0 * BOARD_MARGIN, WINDOW_HEIGHT - 4.0 * BOARD_MARGIN),
        MAX_TILE_SIZE,
    )
}

fn tile_color(kind: u32) -> Color {
    let index = kind as usize % TILE_COLORS.len();
    TILE_COLORS
        .get(index)
        .copied()
        .map_or(Color::WHITE, Color::from)
}

#[derive(Component, Default)]
struct VisibleBoard(HashMap<TileId, Entity>);

#[derive(Component)]
struct MainCamera;

fn setup(mut commands: Commands, config: Res<Match3Config>, layout: Res<BoardLayout>) {
    commands.spawn((Camera2d, MainCamera));

    let board_size = Vec2::new(config.width as f32, config.height as f32) * layout.tile_size;
    commands.spawn((
        Sprite::from_color(Color::srgb(0.12, 0.12, 0.16), board_size),
        Transform::from_xyz(0.0, 0.0, -1.0),
    ));

    commands.spawn((
        Transform::default(),
        Visibility::default(),
        VisibleBoard::default(),
    ));

    spawn_score_text(&mut commands);
}

#[derive(Component)]
struct MoveTo(Vec2);

fn move_to(
    mut commands: Commands,
    time: Res<Time>,
    layout: Res<BoardLayout>,
    mut moves: Query<(Entity, &mut Transform, &MoveTo)>,
) {
    for (entity, mut transform, MoveTo(move_to)) in &mut moves {
        let movement = *move_to - transform.translation.xy();
        if movement == Vec2::ZERO {
            commands.entity(entity).remove::<MoveTo>();
        } else {
            let step = (movement.normalize() * time.delta_secs() * layout.tile_size * MOVE_SPEED)
                .clamp_length_max(movement.length());
            transform.translation += step.extend(0.0);
        }
    }
}

fn spawn_tile(
    commands: &mut Commands,
    board_entity: Entity,
    layout: BoardLayout,
    from: Vec2,
    to: Vec2,
    kind: u32,
) -> Entity {
    let gem = commands
        .spawn((
            Sprite::from_color(tile_color(kind), Vec2::splat(layout.tile_size * 0.9)),
            Transform::from_translation(from.extend(0.0)),
            MoveTo(to),
        ))
        .id();
    commands.entity(board_entity).add_child(gem);
    gem
}

/// Replays one board event whenever the previous one finished animating.
fn consume_events(
    mut commands: Commands,
    mut events: ResMut<BoardEvents>,
    engine: Res<BoardEngine>,
    layout: Res<BoardLayout>,
    mut board: Query<(Entity, &mut VisibleBoard)>,
    animations: Query<(), With<MoveTo>>,
) {
    if !animations.is_empty() {
        return;
    }
    let Some(event) = events.pop() else {
        return;
    };
    let Ok((board_entity, mut visible)) = board.get_single_mut() else {
        error!("Could not find board");
        return;
    };

    let to_world = |pos: IVec2| layout.to_world(engine.board().board_to_world(pos));
    let drop_height = (engine.board().height() as f32 / 2.0 + 1.0) * layout.tile_size;

    match event {
        BoardEvent::Filled(spawns) | BoardEvent::Spawned(spawns) => {
            for Spawn { id, position, kind } in spawns {
                let target = to_world(position);
                let start = Vec2::new(target.x, target.y + drop_height);
                let gem = spawn_tile(&mut commands, board_entity, *layout, start, target, kind);
                if let Some(stale) = visible.0.insert(id, gem) {
                    warn!("Tile {id} was still shown, replacing it");
                    commands.entity(stale).despawn_recursive();
                }
            }
        }
        BoardEvent::Swapped {
            first,
            second,
            a,
            b,
        } => {
            slide(&mut commands, &visible, first, to_world(b));
            slide(&mut commands, &visible, second, to_world(a));
        }
        BoardEvent::SwapReverted {
            first,
            second,
            a,
            b,
        } => {
            info!("Swap of {a} and {b} did not match");
            slide(&mut commands, &visible, first, to_world(a));
            slide(&mut commands, &visible, second, to_world(b));
        }
        // Points show up through the score plugin, not here
        BoardEvent::Removed(removals) => {
            for Removal { id, position } in removals {
                let Some(gem) = visible.0.remove(&id) else {
                    warn!("Could not find tile {id} at {position}");
                    continue;
                };
                commands.entity(gem).despawn_recursive();
            }
        }
        BoardEvent::Fell(falls) => {
            for Fall { id, to, .. } in falls {
                slide(&mut commands, &visible, id, to_world(to));
            }
        }
        BoardEvent::ScoreDelta(_) | BoardEvent::Settled => {}
    }
}

fn slide(commands: &mut Commands, visible: &VisibleBoard, id: TileId, to: Vec2) {
    let Some(gem) = visible.0.get(&id).copied() else {
        warn!("Could not find tile {id}");
        return;
    };
    commands.entity(gem).insert(MoveTo(to));
}
