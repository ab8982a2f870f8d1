//! Dense block grid and its packed occupancy mask.
#![forbid(unsafe_code)]

mod error;
mod grid;
pub mod mask;

pub use error::GridError;
pub use grid::BlockGrid;
pub use mask::{OccupancyMask, WORD_BITS};
