//! Block identifiers and the block occupancy table.
#![forbid(unsafe_code)]

pub mod config;
pub mod table;

pub use config::{BlockDef, BlocksConfig};
pub use table::OccupancyTable;

/// Small unsigned block identifier stored per grid cell.
pub type BlockId = u16;

/// Block id conventionally used for empty space.
pub const AIR: BlockId = 0;
