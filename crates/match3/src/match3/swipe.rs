use bevy::math::{IVec2, Vec2};
use strum::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const fn offset(self) -> IVec2 {
        match self {
            Self::Left => IVec2::NEG_X,
            Self::Right => IVec2::X,
            Self::Up => IVec2::Y,
            Self::Down => IVec2::NEG_Y,
        }
    }

    /// Dominant axis of a drag. Only a strictly larger horizontal component counts as
    /// horizontal, exact ties are vertical.
    pub fn from_delta(delta: Vec2) -> Self {
        if delta.x.abs() > delta.y.abs() {
            if delta.x > 0.0 {
                Self::Right
            } else {
                Self::Left
            }
        } else if delta.y > 0.0 {
            Self::Up
        } else {
            Self::Down
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SwipeState {
    #[default]
    Idle,
    Tracking {
        start: Vec2,
    },
    /// A direction came out of this gesture, nothing more will until the pointer is released.
    Emitted {
        start: Vec2,
    },
}

/// Turns one pointer gesture into at most one swipe direction.
#[derive(Debug, Clone)]
pub struct SwipeTracker {
    threshold: f32,
    state: SwipeState,
}

impl SwipeTracker {
    pub const fn new(threshold: f32) -> Self {
        Self {
            threshold,
            state: SwipeState::Idle,
        }
    }

    pub const fn state(&self) -> SwipeState {
        self.state
    }

    pub const fn start(&self) -> Option<Vec2> {
        match self.state {
            SwipeState::Idle => None,
            SwipeState::Tracking { start } | SwipeState::Emitted { start } => Some(start),
        }
    }

    /// Starts a gesture. A gesture still in progress lost its release and is replaced.
    pub fn begin(&mut self, point: Vec2) {
        self.state = SwipeState::Tracking { start: point };
    }

    pub fn update(&mut self, point: Vec2) -> Option<Direction> {
        let SwipeState::Tracking { start } = self.state else {
            return None;
        };

        let delta = point - start;
        if delta.length() < self.threshold {
            return None;
        }

        self.state = SwipeState::Emitted { start };
        Some(Direction::from_delta(delta))
    }

    pub fn end(&mut self) {
        self.state = SwipeState::Idle;
    }
}
