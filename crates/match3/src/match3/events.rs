use bevy::log::error;
use bevy::math::IVec2;
use bevy::prelude::Resource;
use queues::{IsQueue, Queue};

use super::board::TileId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spawn {
    pub id: TileId,
    pub position: IVec2,
    pub kind: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removal {
    pub id: TileId,
    pub position: IVec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fall {
    pub id: TileId,
    pub from: IVec2,
    pub to: IVec2,
}

/// Observable description of a board change, in the order the changes happened.
///
/// The board has already changed by the time an event is read. Presentation replays the
/// events to animate, it never has to query the engine mid-sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    /// Initial fill, column by column from the bottom-left.
    Filled(Vec<Spawn>),
    /// `first` moved from `a` to `b` and `second` from `b` to `a`.
    Swapped {
        first: TileId,
        second: TileId,
        a: IVec2,
        b: IVec2,
    },
    /// The swap above slid back, nothing matched.
    SwapReverted {
        first: TileId,
        second: TileId,
        a: IVec2,
        b: IVec2,
    },
    /// One matched run was cleared.
    Removed(Vec<Removal>),
    /// Gravity of one pass, all columns.
    Fell(Vec<Fall>),
    /// Refill of one pass, all columns.
    Spawned(Vec<Spawn>),
    /// One point per removed tile.
    ScoreDelta(u32),
    /// The resolution sequence is over.
    Settled,
}

#[derive(Resource)]
pub struct BoardEvents(Queue<BoardEvent>);

impl Default for BoardEvents {
    fn default() -> Self {
        Self(Queue::new())
    }
}

impl BoardEvents {
    pub fn push(&mut self, event: BoardEvent) {
        if let Err(err) = self.0.add(event) {
            error!("Could not queue board event: {err}");
        }
    }

    pub fn pop(&mut self) -> Option<BoardEvent> {
        self.0.remove().ok()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = BoardEvent> + '_ {
        core::iter::from_fn(|| self.pop())
    }
}
