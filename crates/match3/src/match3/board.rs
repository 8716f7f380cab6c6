use bevy::log::warn;
use bevy::math::{IVec2, Vec2};
use bits_helpers::grid::Grid;
use bits_helpers::pool::{Pool, SlotId};

use super::error::Match3Error;

pub type TileId = SlotId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub kind: u32,
    /// Always equal to the cell that references this tile.
    pub position: IVec2,
}

/// Tile ids laid out on the grid, backed by a pool sized to the whole board.
#[derive(Debug, Clone)]
pub struct Board {
    cells: Grid<TileId>,
    tiles: Pool<Tile>,
}

impl Board {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            cells: Grid::new(width, height),
            tiles: Pool::with_capacity(width as usize * height as usize),
        }
    }

    pub const fn width(&self) -> u32 {
        self.cells.width()
    }

    pub const fn height(&self) -> u32 {
        self.cells.height()
    }

    pub const fn contains(&self, pos: IVec2) -> bool {
        self.cells.contains(pos)
    }

    pub fn get(&self, pos: IVec2) -> Option<&Tile> {
        self.id_at(pos).and_then(|id| self.tiles.get(id))
    }

    pub fn id_at(&self, pos: IVec2) -> Option<TileId> {
        self.cells.get(pos).copied()
    }

    pub fn kind_at(&self, pos: IVec2) -> Option<u32> {
        self.get(pos).map(|tile| tile.kind)
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id)
    }

    pub fn live_tiles(&self) -> usize {
        self.tiles.live()
    }

    /// Rents a tile from the pool and places it on an empty cell.
    pub fn spawn(&mut self, pos: IVec2, kind: u32) -> Result<TileId, Match3Error> {
        if !self.contains(pos) {
            return Err(Match3Error::OutOfBounds(pos));
        }
        if self.cells.get(pos).is_some() {
            return Err(Match3Error::Occupied(pos));
        }
        let id = self.tiles.spawn(Tile { kind, position: pos })?;
        self.cells.set(pos, Some(id));
        Ok(id)
    }

    /// Clears the cell and hands its tile back to the pool.
    pub fn despawn(&mut self, pos: IVec2) -> Option<(TileId, Tile)> {
        let id = self.cells.take(pos)?;
        let tile = self.tiles.despawn(id)?;
        Some((id, tile))
    }

    /// Exchanges the contents of two cells, either of which may be empty.
    pub fn swap(&mut self, a: IVec2, b: IVec2) {
        if !self.contains(a) || !self.contains(b) {
            warn!("Ignoring swap of {a} and {b} outside of the board");
            return;
        }
        let first = self.cells.take(a);
        let second = self.cells.take(b);
        self.put(a, second);
        self.put(b, first);
    }

    /// Moves a tile onto an empty cell.
    pub fn move_tile(&mut self, from: IVec2, to: IVec2) -> Option<TileId> {
        if !self.cells.is_empty_at(to) {
            warn!("Ignoring move from {from} to occupied or missing cell {to}");
            return None;
        }
        let id = self.cells.take(from)?;
        self.put(to, Some(id));
        Some(id)
    }

    fn put(&mut self, pos: IVec2, id: Option<TileId>) {
        if let Some(tile) = id.and_then(|id| self.tiles.get_mut(id)) {
            tile.position = pos;
        }
        self.cells.set(pos, id);
    }

    /// Occupied cells, column by column from the bottom-left.
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, TileId, &Tile)> + '_ {
        self.cells
            .occupied()
            .filter_map(|(pos, id)| self.tiles.get(*id).map(|tile| (pos, *id, tile)))
    }

    pub fn board_to_world(&self, pos: IVec2) -> Vec2 {
        self.cells.cell_to_world(pos)
    }

    pub fn world_to_board(&self, world: Vec2) -> IVec2 {
        self.cells.world_to_cell(world)
    }

    /// Every occupied cell's tile records that cell and every tile sits in exactly one cell.
    pub fn is_consistent(&self) -> bool {
        let mut seen = Vec::new();
        for (pos, id) in self.cells.occupied() {
            match self.tiles.get(*id) {
                Some(tile) if tile.position == pos && !seen.contains(id) => seen.push(*id),
                _ => return false,
            }
        }
        seen.len() == self.tiles.live()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_rejects_occupied_and_outside_cells() {
        let mut board = Board::new(2, 2);
        board.spawn(IVec2::new(0, 0), 1).unwrap();

        assert!(
            matches!(board.spawn(IVec2::new(0, 0), 2), Err(Match3Error::Occupied(_))),
            "occupied"
        );
        assert!(
            matches!(board.spawn(IVec2::new(2, 0), 2), Err(Match3Error::OutOfBounds(_))),
            "outside"
        );
        assert_eq!(board.live_tiles(), 1, "no leaked tiles");
    }

    #[test]
    fn swap_updates_recorded_positions() {
        let mut board = Board::new(3, 1);
        let a = board.spawn(IVec2::new(0, 0), 1).unwrap();
        let b = board.spawn(IVec2::new(1, 0), 2).unwrap();

        board.swap(IVec2::new(0, 0), IVec2::new(1, 0));

        assert_eq!(board.id_at(IVec2::new(0, 0)), Some(b), "b moved left");
        assert_eq!(board.id_at(IVec2::new(1, 0)), Some(a), "a moved right");
        assert_eq!(board.tile(a).unwrap().position, IVec2::new(1, 0), "a records its cell");
        assert!(board.is_consistent(), "consistent after swap");
    }

    #[test]
    fn swap_with_empty_cell_moves_tile() {
        let mut board = Board::new(3, 1);
        let a = board.spawn(IVec2::new(0, 0), 1).unwrap();
        board.swap(IVec2::new(0, 0), IVec2::new(2, 0));
        assert_eq!(board.id_at(IVec2::new(2, 0)), Some(a), "moved");
        assert_eq!(board.get(IVec2::new(0, 0)), None, "vacated");
        assert!(board.is_consistent(), "consistent");
    }

    #[test]
    fn despawn_returns_tile_to_pool() {
        let mut board = Board::new(1, 1);
        board.spawn(IVec2::ZERO, 3).unwrap();
        let (_, tile) = board.despawn(IVec2::ZERO).unwrap();
        assert_eq!(tile.kind, 3, "kind handed back");
        assert_eq!(board.live_tiles(), 0, "slot freed");
        assert!(board.spawn(IVec2::ZERO, 4).is_ok(), "slot reused");
    }

    #[test]
    fn move_tile_refuses_occupied_target() {
        let mut board = Board::new(1, 2);
        board.spawn(IVec2::new(0, 0), 1).unwrap();
        board.spawn(IVec2::new(0, 1), 2).unwrap();
        assert_eq!(board.move_tile(IVec2::new(0, 1), IVec2::new(0, 0)), None, "occupied");
        assert_eq!(board.kind_at(IVec2::new(0, 1)), Some(2), "tile stayed");
    }
}
