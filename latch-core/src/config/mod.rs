//! Configuration types
//!
//! Driver configuration (channel and watch settings) and the board-level
//! configuration the firmware builds from its `board.toml`.

pub mod board;
pub mod types;

pub use board::*;
pub use types::*;
