use bevy::math::IVec2;
use bits_helpers::config::ConfigError;
use bits_helpers::pool::PoolError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Piece pool failure: {0}")]
    Pool(#[from] PoolError),

    #[error("Cell {0} is outside of the board")]
    OutOfBounds(IVec2),

    #[error("Cell {0} is already occupied")]
    Occupied(IVec2),
}
