//! Batched voxel ray traversal over a packed occupancy mask.
//!
//! Typical use: build a [`voxcast_grid::OccupancyMask`] once per grid, then hand
//! a [`RayBatch`] to a [`Scheduler`]. The scheduler advances every ray with the
//! DDA [`step`](step::step) in bounded rounds and finally merges block ids and
//! entry faces into [`RayResult`]s.
#![forbid(unsafe_code)]

pub mod camera;
mod config;
mod error;
pub mod finalize;
mod ray;
pub mod schedule;
pub mod state;
pub mod step;


pub use config::TraceConfig;
pub use error::TraceError;
pub use finalize::{OutcomeCounts, RayOutcome, RayResult, TraceOutput, finalize, pack_hit};
pub use ray::{RAY_ELEMENTS, Ray, RayBatch};
pub use schedule::{ChunkKernel, LaunchStats, Scheduler};
pub use state::{Status, TraversalState};
pub use step::{Face, Probe, Step};

use voxcast_grid::{BlockGrid, OccupancyMask};

/// One-shot traversal with a throwaway scheduler.
pub fn trace(
    rays: &RayBatch,
    grid: &BlockGrid,
    mask: &OccupancyMask,
    config: TraceConfig,
) -> Result<TraceOutput, TraceError> {
    Scheduler::new(config)?.traverse(rays, grid, mask)
}

/// Flat-array entry point: `rays` is `N x 6`, `codes` and `depths` hold `N`
/// entries each. Entries of rays that do not hit keep their prior values.
pub fn trace_into(
    rays: &[f64],
    grid: &BlockGrid,
    mask: &OccupancyMask,
    config: TraceConfig,
    codes: &mut [u32],
    depths: &mut [f64],
) -> Result<OutcomeCounts, TraceError> {
    let batch = RayBatch::from_flat(rays)?;
    Scheduler::new(config)?.traverse_into(&batch, grid, mask, codes, depths)
}
