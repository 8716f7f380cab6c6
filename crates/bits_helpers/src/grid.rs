use bevy::log::warn;
use bevy::math::{IVec2, UVec2, Vec2};
use bevy::prelude::Resource;

/// Size of one grid cell in world units. Grids work in cells, the screen in pixels.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct BoardLayout {
    pub tile_size: f32,
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self { tile_size: 40.0 }
    }
}

impl BoardLayout {
    /// Largest tile size that fits `cells` into `area`, capped at `max_tile_size`.
    pub fn fit(cells: UVec2, area: Vec2, max_tile_size: f32) -> Self {
        let fit = area / cells.max(UVec2::ONE).as_vec2();
        Self {
            tile_size: fit.x.min(fit.y).min(max_tile_size),
        }
    }

    pub fn to_board_space(self, world: Vec2) -> Vec2 {
        world / self.tile_size
    }

    pub fn to_world(self, board_space: Vec2) -> Vec2 {
        board_space * self.tile_size
    }
}

/// Fixed size 2D container addressed by `(x, y)` with `y` growing upwards.
///
/// Out of range reads are a normal outcome and return `None`, match scans rely on
/// that at the board edges. Out of range writes are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    width: u32,
    height: u32,
    cells: Vec<Option<T>>,
}

impl<T> Grid<T> {
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        let mut cells = Vec::with_capacity(len);
        cells.resize_with(len, || None);
        Self {
            width,
            height,
            cells,
        }
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub const fn contains(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    fn index(&self, pos: IVec2) -> Option<usize> {
        self.contains(pos)
            .then(|| pos.x as usize * self.height as usize + pos.y as usize)
    }

    pub fn get(&self, pos: IVec2) -> Option<&T> {
        self.index(pos)
            .and_then(|index| self.cells.get(index))
            .and_then(Option::as_ref)
    }

    pub fn is_empty_at(&self, pos: IVec2) -> bool {
        self.contains(pos) && self.get(pos).is_none()
    }

    /// Writes `value` at `pos`, returning what was there before.
    pub fn set(&mut self, pos: IVec2, value: Option<T>) -> Option<T> {
        let (width, height) = (self.width, self.height);
        let Some(cell) = self.index(pos).and_then(|index| self.cells.get_mut(index)) else {
            warn!("Ignoring write outside of the {width}x{height} grid at {pos}");
            return None;
        };
        core::mem::replace(cell, value)
    }

    pub fn take(&mut self, pos: IVec2) -> Option<T> {
        let index = self.index(pos)?;
        self.cells.get_mut(index).and_then(Option::take)
    }

    /// All cells, column by column from the bottom-left corner.
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, Option<&T>)> + '_ {
        let height = self.height as i32;
        self.cells.iter().enumerate().map(move |(index, cell)| {
            let index = index as i32;
            (IVec2::new(index / height, index % height), cell.as_ref())
        })
    }

    pub fn occupied(&self) -> impl Iterator<Item = (IVec2, &T)> + '_ {
        self.iter().filter_map(|(pos, cell)| cell.map(|value| (pos, value)))
    }

    pub fn free_cells(&self) -> Vec<IVec2> {
        self.iter()
            .filter(|(_, cell)| cell.is_none())
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Offset that centers the grid around the world origin, one world unit per cell.
    fn origin_offset(&self) -> Vec2 {
        Vec2::new(
            -(self.width as f32) / 2.0 + 0.5,
            -(self.height as f32) / 2.0 + 0.5,
        )
    }

    pub fn cell_to_world(&self, pos: IVec2) -> Vec2 {
        pos.as_vec2() + self.origin_offset()
    }

    /// Nearest cell to a world position. The result may lie outside of the grid.
    pub fn world_to_cell(&self, world: Vec2) -> IVec2 {
        let local = world - self.origin_offset();
        IVec2::new(
            local.x.round_ties_even() as i32,
            local.y.round_ties_even() as i32,
        )
    }
}
