use bevy::log::debug;
use bevy::math::{IVec2, Vec2};
use bevy::prelude::Resource;
use bits_helpers::config::{ConfigError, Validate};

use super::board::Board;
use super::config::Match3Config;
use super::error::Match3Error;
use super::events::{BoardEvent, BoardEvents, Fall, Removal, Spawn};
use super::matching::find_match;
use super::swipe::{Direction, SwipeTracker};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Idle,
    /// Animations of the last resolution are still playing for `remaining` seconds.
    Resolving { remaining: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeOutcome {
    /// No swap happened: no gesture, a busy board, a target off the board or an empty cell.
    Ignored,
    Reverted,
    Committed {
        removed: u32,
        cascades: u32,
    },
}

#[derive(Debug, Default)]
struct Settlement {
    removed: u32,
    passes: u32,
    duration: f32,
}

/// Sole owner and mutator of the match-3 board.
///
/// Every change happens immediately. What presentation needs to animate it is recorded as
/// [`BoardEvent`]s and the engine stays [`Phase::Resolving`] for the nominal duration of those
/// animations, so one resolution never overlaps the next.
#[derive(Resource)]
pub struct BoardEngine {
    config: Match3Config,
    board: Board,
    swipe: SwipeTracker,
    phase: Phase,
    rng: fastrand::Rng,
    events: BoardEvents,
    score: u32,
}

impl BoardEngine {
    pub fn new(config: Match3Config) -> Result<Self, Match3Error> {
        let rng = config
            .seed
            .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        Self::with_rng(config, rng)
    }

    /// Builds the engine and fills the board without any ready-made match.
    pub fn with_rng(config: Match3Config, rng: fastrand::Rng) -> Result<Self, Match3Error> {
        config.validate()?;
        let board = Board::new(config.width, config.height);
        let mut engine = Self::assemble(config, board, rng);
        engine.fill()?;
        Ok(engine)
    }

    /// Starts from a prepared board, idle and without a fill.
    pub fn from_board(
        config: Match3Config,
        board: Board,
        rng: fastrand::Rng,
    ) -> Result<Self, Match3Error> {
        config.validate()?;
        if board.width() != config.width || board.height() != config.height {
            return Err(ConfigError::Invalid(format!(
                "board is {}x{} but the config asks for {}x{}",
                board.width(),
                board.height(),
                config.width,
                config.height
            ))
            .into());
        }
        Ok(Self::assemble(config, board, rng))
    }

    fn assemble(config: Match3Config, board: Board, rng: fastrand::Rng) -> Self {
        Self {
            swipe: SwipeTracker::new(config.swipe_threshold),
            config,
            board,
            phase: Phase::Idle,
            rng,
            events: BoardEvents::default(),
            score: 0,
        }
    }

    pub const fn board(&self) -> &Board {
        &self.board
    }

    pub const fn config(&self) -> &Match3Config {
        &self.config
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub const fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    /// Points scored by this board so far, one per removed tile.
    pub const fn score(&self) -> u32 {
        self.score
    }

    pub fn pop_event(&mut self) -> Option<BoardEvent> {
        self.events.pop()
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = BoardEvent> + '_ {
        self.events.drain()
    }

    pub fn pointer_down(&mut self, world: Vec2) {
        self.swipe.begin(world);
    }

    /// Feeds a drag position and dispatches the swipe it completes, if the board is idle.
    pub fn pointer_move(&mut self, world: Vec2) -> Result<SwipeOutcome, Match3Error> {
        let Some(direction) = self.swipe.update(world) else {
            return Ok(SwipeOutcome::Ignored);
        };
        if !self.is_idle() {
            debug!("Dropping {direction} swipe, the board is still resolving");
            return Ok(SwipeOutcome::Ignored);
        }
        let Some(start) = self.swipe.start() else {
            return Ok(SwipeOutcome::Ignored);
        };
        let origin = self.board.world_to_board(start);
        self.try_swipe(origin, direction)
    }

    pub fn pointer_up(&mut self) {
        self.swipe.end();
    }

    /// Advances the pacing timer of the current resolution.
    pub fn tick(&mut self, delta: f32) {
        let Phase::Resolving { remaining } = self.phase else {
            return;
        };
        let remaining = remaining - delta;
        self.phase = if remaining > 0.0 {
            Phase::Resolving { remaining }
        } else {
            Phase::Idle
        };
    }

    /// Swaps the tile at `origin` with its neighbour in `direction` and resolves the result.
    ///
    /// # Panics
    ///
    /// When called before the previous resolution finished. Callers go through the idle gate.
    pub fn try_swipe(
        &mut self,
        origin: IVec2,
        direction: Direction,
    ) -> Result<SwipeOutcome, Match3Error> {
        assert!(
            self.is_idle(),
            "swipe dispatched while the board is still resolving"
        );

        let target = origin + direction.offset();
        let (Some(first), Some(second)) = (self.board.id_at(origin), self.board.id_at(target))
        else {
            return Ok(SwipeOutcome::Ignored);
        };

        self.board.swap(origin, target);
        self.events.push(BoardEvent::Swapped {
            first,
            second,
            a: origin,
            b: target,
        });

        let at_origin = find_match(&self.board, origin);
        let at_target = find_match(&self.board, target);

        if at_origin.is_empty() && at_target.is_empty() {
            self.board.swap(origin, target);
            self.events.push(BoardEvent::SwapReverted {
                first,
                second,
                a: origin,
                b: target,
            });
            self.events.push(BoardEvent::Settled);
            self.begin_resolving(2.0 * self.config.swap_duration);
            debug!("Swap of {origin} {direction} reverted");
            return Ok(SwipeOutcome::Reverted);
        }

        let removed = self.remove_matched(&at_origin) + self.remove_matched(&at_target);
        let settlement = self.settle()?;
        self.events.push(BoardEvent::Settled);
        self.begin_resolving(self.config.swap_duration + settlement.duration);

        let outcome = SwipeOutcome::Committed {
            removed: removed + settlement.removed,
            cascades: settlement.passes.saturating_sub(1),
        };
        debug!("Swap of {origin} {direction} committed: {outcome:?}");
        Ok(outcome)
    }

    fn begin_resolving(&mut self, duration: f32) {
        self.phase = Phase::Resolving {
            remaining: duration,
        };
    }

    /// Fills every cell column by column from the bottom-left.
    fn fill(&mut self) -> Result<(), Match3Error> {
        let mut spawns = Vec::with_capacity(self.config.capacity());
        for x in 0..self.board.width() as i32 {
            for y in 0..self.board.height() as i32 {
                let position = IVec2::new(x, y);
                let kind = self.kind_avoiding_match(position);
                let id = self.board.spawn(position, kind)?;
                spawns.push(Spawn { id, position, kind });
            }
        }
        self.events.push(BoardEvent::Filled(spawns));
        self.events.push(BoardEvent::Settled);
        self.begin_resolving(
            self.config.fill_stagger * self.config.capacity() as f32 + self.config.fill_settle,
        );
        debug!(
            "Filled {}x{} board with {} kinds",
            self.config.width, self.config.height, self.config.kinds
        );
        Ok(())
    }

    /// Random kind that does not complete a run with the two cells to the left or the two
    /// below. Those are the only neighbours already placed in fill order.
    fn kind_avoiding_match(&mut self, pos: IVec2) -> u32 {
        let mut excluded = Vec::with_capacity(2);
        for step in [IVec2::NEG_X, IVec2::NEG_Y] {
            let near = self.board.kind_at(pos + step);
            if near.is_some() && near == self.board.kind_at(pos + step * 2) {
                excluded.extend(near);
            }
        }

        let allowed: Vec<u32> = (0..self.config.kinds)
            .filter(|kind| !excluded.contains(kind))
            .collect();
        let picked = self.rng.choice(allowed);
        picked.unwrap_or_else(|| self.rng.u32(0..self.config.kinds))
    }

    /// Clears the still occupied cells of a match and scores one point per tile.
    fn remove_matched(&mut self, cells: &[IVec2]) -> u32 {
        let removals: Vec<Removal> = cells
            .iter()
            .filter_map(|&position| {
                self.board
                    .despawn(position)
                    .map(|(id, _)| Removal { id, position })
            })
            .collect();
        if removals.is_empty() {
            return 0;
        }

        let count = removals.len() as u32;
        self.events.push(BoardEvent::Removed(removals));
        for _ in 0..count {
            self.events.push(BoardEvent::ScoreDelta(1));
        }
        self.score += count;
        count
    }

    /// Gravity, refill and cascades until a full scan finds nothing.
    ///
    /// Refills draw kinds without constraint, so every pass has a fair chance of ending the
    /// loop. It ends with probability one for any finite board.
    fn settle(&mut self) -> Result<Settlement, Match3Error> {
        let mut settlement = Settlement::default();
        loop {
            settlement.duration += self.gravity_and_refill()?;
            settlement.passes += 1;

            let removed = self.clear_cascades();
            if removed == 0 {
                return Ok(settlement);
            }
            settlement.removed += removed;
        }
    }

    fn clear_cascades(&mut self) -> u32 {
        let mut removed = 0;
        for x in 0..self.board.width() as i32 {
            for y in 0..self.board.height() as i32 {
                let found = find_match(&self.board, IVec2::new(x, y));
                removed += self.remove_matched(&found);
            }
        }
        removed
    }

    /// Compacts every column downwards, keeping tile order, then tops it up with random kinds.
    /// Returns the nominal duration of the pass.
    fn gravity_and_refill(&mut self) -> Result<f32, Match3Error> {
        let width = self.board.width() as i32;
        let height = self.board.height() as i32;
        let mut falls = Vec::new();
        let mut spawns = Vec::new();
        let mut longest_fall = 0;

        for x in 0..width {
            let mut write_y = 0;
            for y in 0..height {
                let from = IVec2::new(x, y);
                if self.board.id_at(from).is_none() {
                    continue;
                }
                if y != write_y {
                    let to = IVec2::new(x, write_y);
                    if let Some(id) = self.board.move_tile(from, to) {
                        falls.push(Fall { id, from, to });
                        longest_fall = longest_fall.max(y - write_y);
                    }
                }
                write_y += 1;
            }

            for y in write_y..height {
                let position = IVec2::new(x, y);
                let kind = self.rng.u32(0..self.config.kinds);
                let id = self.board.spawn(position, kind)?;
                spawns.push(Spawn { id, position, kind });
            }
        }

        if !falls.is_empty() {
            self.events.push(BoardEvent::Fell(falls));
        }
        if !spawns.is_empty() {
            self.events.push(BoardEvent::Spawned(spawns));
        }

        Ok(self.config.fall_base_delay * longest_fall as f32
            + self.config.column_spawn_delay * (width - 1) as f32
            + self.config.spawn_drop_duration
            + self.config.settle_delay)
    }
}
