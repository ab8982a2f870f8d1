use serde::{Deserialize, Serialize};
use voxcast_grid::OccupancyMask;

use crate::Ray;
use crate::step::{Face, Probe, step};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// Still marching; may be resumed by a later launch.
    Normal,
    Hit,
    /// Outside the grid and unable to re-enter it. Rays with a zero direction
    /// end here too, without stepping.
    Escaped,
}

/// Per-ray cursor carried across kernel launches.
///
/// Plain data, so a batch of states can be stored between launches (or
/// processes) and resumed with the same rays.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraversalState {
    pub cell: [i32; 3],
    pub status: Status,
    /// Stepper calls consumed so far.
    pub steps: u64,
    /// Set once, on the transition to `Hit`.
    pub hit: Option<(f64, Face)>,
}

impl TraversalState {
    pub fn new(ray: &Ray) -> Self {
        Self {
            cell: ray.start_cell(),
            status: Status::Normal,
            steps: 0,
            hit: None,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == Status::Normal
    }

    /// Runs up to `budget` Stepper calls, stopping at a hit or a permanent exit.
    /// Returns the number of calls made.
    pub fn advance(&mut self, ray: &Ray, mask: &OccupancyMask, budget: u32) -> u32 {
        let extents = mask.extents();
        let mut used = 0;
        while self.status == Status::Normal {
            if cannot_reach_grid(ray, self.cell, extents) {
                self.status = Status::Escaped;
                break;
            }
            if used == budget {
                break;
            }
            let s = step(ray, self.cell, mask);
            used += 1;
            self.steps += 1;
            self.cell = s.cell;
            if s.probe == Probe::Hit {
                self.status = Status::Hit;
                self.hit = Some((s.distance, s.face));
            }
        }
        used
    }
}

/// True when the ray sits outside the grid on some axis and its travel along
/// that axis can never bring it back: moving away, or not moving at all.
#[inline]
pub fn cannot_reach_grid(ray: &Ray, cell: [i32; 3], extents: [usize; 3]) -> bool {
    if ray.is_degenerate() {
        return true;
    }
    (0..3).any(|a| {
        let c = cell[a] as i64;
        let size = extents[a] as i64;
        let r = ray.recip[a];
        (r > 0.0 && c >= size) || (r < 0.0 && c < 0) || (r == 0.0 && (c < 0 || c >= size))
    })
}
