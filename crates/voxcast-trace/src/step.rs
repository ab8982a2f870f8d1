//! Single-cell DDA step.

use serde::{Deserialize, Serialize};
use voxcast_grid::OccupancyMask;

use crate::Ray;

/// Cell face a ray crossed to enter its current cell, named by travel direction.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    PosX = 1,
    NegX = 2,
    PosY = 3,
    NegY = 4,
    PosZ = 5,
    NegZ = 6,
}

impl Face {
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Face> {
        match code {
            1 => Some(Face::PosX),
            2 => Some(Face::NegX),
            3 => Some(Face::PosY),
            4 => Some(Face::NegY),
            5 => Some(Face::PosZ),
            6 => Some(Face::NegZ),
            _ => None,
        }
    }

    #[inline]
    fn along(axis: usize, positive: bool) -> Face {
        match (axis, positive) {
            (0, true) => Face::PosX,
            (0, false) => Face::NegX,
            (1, true) => Face::PosY,
            (1, false) => Face::NegY,
            (2, true) => Face::PosZ,
            _ => Face::NegZ,
        }
    }

    /// Axis index, 0 = x.
    #[inline]
    pub fn axis(self) -> usize {
        (self.code() as usize - 1) / 2
    }
}

/// What the stepper found in the cell it moved into.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Probe {
    Hit,
    Empty,
    Outside,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Step {
    pub cell: [i32; 3],
    /// Ray parameter at the crossed boundary.
    pub distance: f64,
    pub face: Face,
    pub probe: Probe,
}

/// Ray parameter at the next boundary along one axis; infinite when parallel.
#[inline]
pub fn next_boundary(cell: i32, origin: f64, recip: f64) -> f64 {
    if recip > 0.0 {
        (cell as f64 - origin + 1.0) * recip
    } else if recip < 0.0 {
        (cell as f64 - origin) * recip
    } else {
        f64::INFINITY
    }
}

/// x only when strictly nearest, then y only when strictly nearer than z, else z.
#[inline]
pub fn nearest_axis(d: [f64; 3]) -> usize {
    if d[0] < d[1] && d[0] < d[2] {
        0
    } else if d[1] < d[2] {
        1
    } else {
        2
    }
}

/// Advances exactly one cell across the nearest boundary and probes the mask.
///
/// Distances are recomputed from the origin on every call, so there is no
/// accumulated state, but no drift correction either.
#[inline]
pub fn step(ray: &Ray, cell: [i32; 3], mask: &OccupancyMask) -> Step {
    let d = [
        next_boundary(cell[0], ray.origin[0], ray.recip[0]),
        next_boundary(cell[1], ray.origin[1], ray.recip[1]),
        next_boundary(cell[2], ray.origin[2], ray.recip[2]),
    ];
    let axis = nearest_axis(d);
    let positive = ray.recip[axis] > 0.0;
    let mut next = cell;
    next[axis] += if positive { 1 } else { -1 };

    let [sx, sy, sz] = mask.extents();
    let inside = next[0] >= 0
        && next[1] >= 0
        && next[2] >= 0
        && (next[0] as usize) < sx
        && (next[1] as usize) < sy
        && (next[2] as usize) < sz;
    let probe = if !inside {
        Probe::Outside
    } else if mask.get(next[0] as usize, next[1] as usize, next[2] as usize) {
        Probe::Hit
    } else {
        Probe::Empty
    };

    Step {
        cell: next,
        distance: d[axis],
        face: Face::along(axis, positive),
        probe,
    }
}
