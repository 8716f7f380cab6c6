use bevy::math::IVec2;

use super::board::Board;

/// Shortest run that counts as a match.
pub const MIN_MATCH: usize = 3;

/// Coordinates of one matched run, each listed once.
pub type Match = Vec<IVec2>;

/// Maximal straight run of the kind at `pos` that contains `pos`.
///
/// The horizontal run is checked first and returned as soon as it is long enough, so at an
/// L or T intersection the vertical arm is not part of the result. That arm can still be
/// found later from one of its own cells.
pub fn find_match(board: &Board, pos: IVec2) -> Match {
    let Some(kind) = board.kind_at(pos) else {
        return Vec::new();
    };

    let horizontal = run(board, pos, kind, IVec2::X);
    if horizontal.len() >= MIN_MATCH {
        return horizontal;
    }

    let vertical = run(board, pos, kind, IVec2::Y);
    if vertical.len() >= MIN_MATCH {
        return vertical;
    }

    Vec::new()
}

fn run(board: &Board, pos: IVec2, kind: u32, axis: IVec2) -> Match {
    let mut cells = vec![pos];
    for step in [-axis, axis] {
        let mut next = pos + step;
        while board.kind_at(next) == Some(kind) {
            cells.push(next);
            next += step;
        }
    }
    cells
}
