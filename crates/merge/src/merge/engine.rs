use bevy::log::debug;
use bevy::math::{IVec2, Vec2};
use bevy::prelude::Resource;
use bits_helpers::config::Validate;
use bits_helpers::grid::Grid;
use bits_helpers::pool::Pool;

use super::config::MergeConfig;
use super::error::MergeError;
use super::events::{MergeEvent, MergeEvents, PieceId, PieceSpawn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub level: u32,
    pub position: IVec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    id: PieceId,
    offset: Vec2,
    position: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Nothing was being dragged.
    None,
    Returned,
    Merged { level: u32 },
}

/// Merge board: pieces of a level combine into one of the next level when dropped on each
/// other, and a fresh level-1 piece shows up on a free cell every spawn interval.
///
/// Positions passed in and out are in board space, one unit per cell, centered on the origin.
#[derive(Resource)]
pub struct MergeEngine {
    config: MergeConfig,
    cells: Grid<PieceId>,
    pieces: Pool<Piece>,
    drag: Option<Drag>,
    since_spawn: f32,
    rng: fastrand::Rng,
    events: MergeEvents,
    score: u32,
}

impl MergeEngine {
    pub fn new(config: MergeConfig) -> Result<Self, MergeError> {
        let rng = config
            .seed
            .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: MergeConfig, rng: fastrand::Rng) -> Result<Self, MergeError> {
        config.validate()?;
        Ok(Self {
            cells: Grid::new(config.width, config.height),
            pieces: Pool::with_capacity(config.capacity()),
            config,
            drag: None,
            since_spawn: 0.0,
            rng,
            events: MergeEvents::default(),
            score: 0,
        })
    }

    pub const fn config(&self) -> &MergeConfig {
        &self.config
    }

    pub const fn score(&self) -> u32 {
        self.score
    }

    pub fn piece_at(&self, pos: IVec2) -> Option<(PieceId, &Piece)> {
        let id = *self.cells.get(pos)?;
        self.pieces.get(id).map(|piece| (id, piece))
    }

    pub fn live_pieces(&self) -> usize {
        self.pieces.live()
    }

    /// The piece under the pointer and where it is drawn right now.
    pub fn dragged(&self) -> Option<(PieceId, Vec2)> {
        self.drag.map(|drag| (drag.id, drag.position))
    }

    pub fn cell_to_world(&self, pos: IVec2) -> Vec2 {
        self.cells.cell_to_world(pos)
    }

    pub fn pop_event(&mut self) -> Option<MergeEvent> {
        self.events.pop()
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = MergeEvent> + '_ {
        self.events.drain()
    }

    /// Runs the spawn clock, one level-1 piece per elapsed interval.
    pub fn tick(&mut self, delta: f32) -> Result<(), MergeError> {
        self.since_spawn += delta;
        while self.since_spawn >= self.config.spawn_interval {
            self.since_spawn -= self.config.spawn_interval;
            self.spawn_random(1)?;
        }
        Ok(())
    }

    /// Spawns on a uniformly random free cell. A full board spawns nothing.
    pub fn spawn_random(&mut self, level: u32) -> Result<Option<PieceId>, MergeError> {
        let Some(position) = self.rng.choice(self.cells.free_cells()) else {
            debug!("Board full, skipping spawn");
            return Ok(None);
        };
        self.spawn_at(position, level).map(Some)
    }

    pub fn spawn_at(&mut self, position: IVec2, level: u32) -> Result<PieceId, MergeError> {
        if !self.cells.contains(position) {
            return Err(MergeError::OutOfBounds(position));
        }
        if self.cells.get(position).is_some() {
            return Err(MergeError::Occupied(position));
        }
        let id = self.pieces.spawn(Piece { level, position })?;
        self.cells.set(position, Some(id));
        self.events.push(MergeEvent::Spawned(PieceSpawn {
            id,
            position,
            level,
        }));
        Ok(id)
    }

    /// Picks up the piece under the pointer, keeping the grab offset.
    pub fn pointer_down(&mut self, world: Vec2) {
        let cell = self.cells.world_to_cell(world);
        self.drag = self.piece_at(cell).map(|(id, _)| {
            let position = self.cells.cell_to_world(cell);
            Drag {
                id,
                offset: position - world,
                position,
            }
        });
    }

    pub fn pointer_move(&mut self, world: Vec2) {
        if let Some(drag) = &mut self.drag {
            drag.position = world + drag.offset;
        }
    }

    /// Drops the dragged piece on the cell under its center.
    pub fn pointer_up(&mut self) -> Result<DropOutcome, MergeError> {
        let Some(drag) = self.drag.take() else {
            return Ok(DropOutcome::None);
        };
        let Some(dragged) = self.pieces.get(drag.id).copied() else {
            return Ok(DropOutcome::None);
        };

        let cell = self.cells.world_to_cell(drag.position);
        let target = self.piece_at(cell).map(|(id, piece)| (id, piece.level));
        match target {
            Some((target, level)) if target != drag.id && level == dragged.level => {
                let level = dragged.level + 1;
                self.merge(drag.id, target, level)?;
                Ok(DropOutcome::Merged { level })
            }
            _ => {
                self.events.push(MergeEvent::Returned {
                    id: drag.id,
                    position: dragged.position,
                });
                Ok(DropOutcome::Returned)
            }
        }
    }

    fn merge(&mut self, dragged: PieceId, target: PieceId, level: u32) -> Result<(), MergeError> {
        let mut position = IVec2::ZERO;
        for id in [dragged, target] {
            if let Some(piece) = self.pieces.despawn(id) {
                self.cells.take(piece.position);
                position = piece.position;
            }
        }

        let id = self.pieces.spawn(Piece { level, position })?;
        self.cells.set(position, Some(id));
        self.events.push(MergeEvent::Merged {
            dragged,
            target,
            into: PieceSpawn {
                id,
                position,
                level,
            },
        });
        self.events.push(MergeEvent::ScoreDelta(1));
        self.score += 1;
        debug!("Merged {dragged} into {target}, level {level} at {position}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bevy::prelude::default;

    use super::*;

    fn engine(width: u32, height: u32) -> MergeEngine {
        let config = MergeConfig {
            width,
            height,
            seed: Some(4),
            ..default()
        };
        MergeEngine::new(config).unwrap()
    }

    fn drag(engine: &mut MergeEngine, from: IVec2, to: IVec2) -> DropOutcome {
        let start = engine.cell_to_world(from) + Vec2::new(0.2, -0.1);
        engine.pointer_down(start);
        engine.pointer_move(start + (to - from).as_vec2());
        engine.pointer_up().unwrap()
    }

    #[test]
    fn spawns_once_per_interval() {
        let mut engine = engine(5, 6);
        engine.tick(2.9).unwrap();
        assert_eq!(engine.live_pieces(), 0, "not yet");
        engine.tick(0.2).unwrap();
        assert_eq!(engine.live_pieces(), 1, "first spawn");
        engine.tick(6.0).unwrap();
        assert_eq!(engine.live_pieces(), 3, "two more intervals");

        let levels: Vec<u32> = engine
            .drain_events()
            .filter_map(|event| match event {
                MergeEvent::Spawned(spawn) => Some(spawn.level),
                _ => None,
            })
            .collect();
        assert_eq!(levels, vec![1, 1, 1], "level one only");
    }

    #[test]
    fn full_board_spawns_nothing() {
        let mut engine = engine(2, 1);
        assert!(engine.spawn_random(1).unwrap().is_some(), "first cell");
        assert!(engine.spawn_random(1).unwrap().is_some(), "second cell");
        assert_eq!(engine.spawn_random(1).unwrap(), None, "full");
        assert_eq!(engine.live_pieces(), 2, "no overflow");
    }

    #[test]
    fn spawn_at_rejects_bad_cells() {
        let mut engine = engine(2, 2);
        engine.spawn_at(IVec2::ZERO, 1).unwrap();
        assert!(
            matches!(engine.spawn_at(IVec2::ZERO, 1), Err(MergeError::Occupied(_))),
            "occupied"
        );
        assert!(
            matches!(engine.spawn_at(IVec2::new(0, 5), 1), Err(MergeError::OutOfBounds(_))),
            "outside"
        );
    }

    #[test]
    fn equal_levels_merge_into_the_target_cell() {
        let mut engine = engine(3, 3);
        let from = IVec2::new(0, 0);
        let to = IVec2::new(2, 1);
        let dragged = engine.spawn_at(from, 2).unwrap();
        let target = engine.spawn_at(to, 2).unwrap();
        let _spawns: Vec<MergeEvent> = engine.drain_events().collect();

        assert_eq!(drag(&mut engine, from, to), DropOutcome::Merged { level: 3 }, "merged");
        assert_eq!(engine.piece_at(from), None, "source cleared");
        assert_eq!(engine.piece_at(to).map(|(_, piece)| piece.level), Some(3), "level up");
        assert_eq!(engine.live_pieces(), 1, "two became one");
        assert_eq!(engine.score(), 1, "one point per merge");

        match engine.pop_event() {
            Some(MergeEvent::Merged {
                dragged: gone,
                target: consumed,
                into,
            }) => {
                assert_eq!((gone, consumed), (dragged, target), "both pieces reported");
                assert_eq!(into.position, to, "at the target");
            }
            other => panic!("expected a merge, got {other:?}"),
        }
        assert_eq!(engine.pop_event(), Some(MergeEvent::ScoreDelta(1)), "then the point");
    }

    #[test]
    fn different_levels_return_home() {
        let mut engine = engine(3, 3);
        let from = IVec2::new(1, 1);
        let dragged = engine.spawn_at(from, 1).unwrap();
        engine.spawn_at(IVec2::new(1, 2), 2).unwrap();
        let _spawns: Vec<MergeEvent> = engine.drain_events().collect();

        assert_eq!(drag(&mut engine, from, IVec2::new(1, 2)), DropOutcome::Returned, "levels differ");
        assert_eq!(
            engine.pop_event(),
            Some(MergeEvent::Returned {
                id: dragged,
                position: from
            }),
            "snapped back"
        );
        assert_eq!(engine.piece_at(from).map(|(id, _)| id), Some(dragged), "still home");
        assert_eq!(engine.score(), 0, "no score");
    }

    #[test]
    fn drops_on_itself_empty_cells_or_outside_return_home() {
        let mut engine = engine(3, 3);
        let from = IVec2::new(1, 1);
        engine.spawn_at(from, 1).unwrap();

        assert_eq!(drag(&mut engine, from, from), DropOutcome::Returned, "own cell");
        assert_eq!(drag(&mut engine, from, IVec2::new(0, 0)), DropOutcome::Returned, "empty");
        assert_eq!(drag(&mut engine, from, IVec2::new(9, 9)), DropOutcome::Returned, "outside");
        assert_eq!(engine.live_pieces(), 1, "untouched");
    }

    #[test]
    fn grab_offset_is_kept_while_dragging() {
        let mut engine = engine(3, 3);
        let cell = IVec2::new(2, 2);
        let id = engine.spawn_at(cell, 1).unwrap();
        let center = engine.cell_to_world(cell);

        engine.pointer_down(center + Vec2::new(0.25, 0.25));
        engine.pointer_move(center + Vec2::new(-0.75, 0.25));
        assert_eq!(
            engine.dragged(),
            Some((id, center + Vec2::new(-1.0, 0.0))),
            "piece follows with the grab offset"
        );
    }

    #[test]
    fn pointer_on_empty_cell_drags_nothing() {
        let mut engine = engine(3, 3);
        engine.pointer_down(Vec2::ZERO);
        assert_eq!(engine.dragged(), None, "nothing picked up");
        assert_eq!(engine.pointer_up().unwrap(), DropOutcome::None, "nothing dropped");
    }
}
