use bevy::log::error;
use bevy::math::IVec2;
use bevy::prelude::Resource;
use bits_helpers::pool::SlotId;
use queues::{IsQueue, Queue};

pub type PieceId = SlotId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSpawn {
    pub id: PieceId,
    pub position: IVec2,
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeEvent {
    Spawned(PieceSpawn),
    /// `dragged` and `target` are gone, `into` took the target's cell.
    Merged {
        dragged: PieceId,
        target: PieceId,
        into: PieceSpawn,
    },
    /// A dropped piece snapped back to its own cell.
    Returned { id: PieceId, position: IVec2 },
    ScoreDelta(u32),
}

#[derive(Resource)]
pub struct MergeEvents(Queue<MergeEvent>);

impl Default for MergeEvents {
    fn default() -> Self {
        Self(Queue::new())
    }
}

impl MergeEvents {
    pub fn push(&mut self, event: MergeEvent) {
        if let Err(err) = self.0.add(event) {
            error!("Could not queue merge event: {err}");
        }
    }

    pub fn pop(&mut self) -> Option<MergeEvent> {
        self.0.remove().ok()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = MergeEvent> + '_ {
        core::iter::from_fn(|| self.pop())
    }
}
