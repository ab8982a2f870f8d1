use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use voxcast_blocks::BlockId;
use voxcast_grid::BlockGrid;

use crate::state::{Status, TraversalState};
use crate::step::Face;

pub const BLOCK_ID_MASK: u32 = 0xffff;
pub const FACE_SHIFT: u32 = 16;
pub const FACE_MASK: u32 = 0x7 << FACE_SHIFT;

/// `block_id | face << 16`, the packed code of a hit.
#[inline]
pub fn pack_hit(id: BlockId, face: Face) -> u32 {
    (u32::from(id) & BLOCK_ID_MASK) | ((u32::from(face.code()) << FACE_SHIFT) & FACE_MASK)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RayOutcome {
    Hit,
    /// Left the grid (or never entered it) without hitting anything.
    Escaped,
    /// Step budget ran out while the ray could still reach the grid.
    Unresolved,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RayResult {
    /// Packed hit code, 0 unless `outcome` is `Hit`.
    pub code: u32,
    /// Ray parameter at the entered face, 0.0 unless `outcome` is `Hit`.
    pub depth: f64,
    pub outcome: RayOutcome,
}

impl RayResult {
    pub const NONE: RayResult = RayResult {
        code: 0,
        depth: 0.0,
        outcome: RayOutcome::Unresolved,
    };

    #[inline]
    pub fn block_id(&self) -> BlockId {
        (self.code & BLOCK_ID_MASK) as BlockId
    }

    #[inline]
    pub fn face(&self) -> Option<Face> {
        Face::from_code(((self.code & FACE_MASK) >> FACE_SHIFT) as u8)
    }

    #[inline]
    pub fn is_hit(&self) -> bool {
        self.outcome == RayOutcome::Hit
    }
}

#[inline]
fn finalize_one(state: &TraversalState, grid: &BlockGrid) -> RayResult {
    match (state.status, state.hit) {
        (Status::Hit, Some((depth, face))) => {
            let [x, y, z] = state.cell;
            // A hit cell is always inside the grid the mask was built from.
            let id = grid.get(x, y, z).unwrap_or(voxcast_blocks::AIR);
            RayResult {
                code: pack_hit(id, face),
                depth,
                outcome: RayOutcome::Hit,
            }
        }
        (Status::Escaped, _) => RayResult {
            outcome: RayOutcome::Escaped,
            ..RayResult::NONE
        },
        _ => RayResult::NONE,
    }
}

/// Merges block ids from the dense grid with the recorded faces and depths.
pub fn finalize(states: &[TraversalState], grid: &BlockGrid) -> Vec<RayResult> {
    states
        .par_iter()
        .map(|s| finalize_one(s, grid))
        .collect()
}

/// Writes the code and depth of every hit ray; other entries are left untouched.
/// Slices must have one entry per state.
pub fn write_hits(
    states: &[TraversalState],
    grid: &BlockGrid,
    codes: &mut [u32],
    depths: &mut [f64],
) {
    debug_assert_eq!(states.len(), codes.len());
    debug_assert_eq!(states.len(), depths.len());
    states
        .par_iter()
        .zip(codes.par_iter_mut())
        .zip(depths.par_iter_mut())
        .for_each(|((s, code), depth)| {
            let r = finalize_one(s, grid);
            if r.is_hit() {
                *code = r.code;
                *depth = r.depth;
            }
        });
}

/// Outcome counts for a finished traversal.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub hit: usize,
    pub escaped: usize,
    pub unresolved: usize,
}

impl OutcomeCounts {
    pub fn from_states(states: &[TraversalState]) -> Self {
        let mut c = OutcomeCounts::default();
        for s in states {
            match s.status {
                Status::Hit => c.hit += 1,
                Status::Escaped => c.escaped += 1,
                Status::Normal => c.unresolved += 1,
            }
        }
        c
    }
}

/// Results of [`crate::Scheduler::traverse`] alongside the final cursors.
#[derive(Clone, Debug)]
pub struct TraceOutput {
    pub results: Vec<RayResult>,
    pub states: Vec<TraversalState>,
    pub counts: OutcomeCounts,
    /// Outer rounds actually launched.
    pub rounds: u32,
}

impl TraceOutput {
    pub fn codes(&self) -> Vec<u32> {
        self.results.iter().map(|r| r.code).collect()
    }

    pub fn depths(&self) -> Vec<f64> {
        self.results.iter().map(|r| r.depth).collect()
    }

    pub fn mean_hit_depth(&self) -> Option<f64> {
        if self.counts.hit == 0 {
            return None;
        }
        let sum: f64 = self.results.iter().filter(|r| r.is_hit()).map(|r| r.depth).sum();
        Some(sum / self.counts.hit as f64)
    }
}
