mod bit;
pub use bit::*;

pub mod config;
pub mod floating_score;
pub mod grid;
pub mod input;
pub mod pause;
pub mod pool;
pub mod score;
