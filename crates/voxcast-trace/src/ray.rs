use voxcast_geom::Vec3;

use crate::TraceError;

/// Values per ray row: origin xyz then direction xyz.
pub const RAY_ELEMENTS: usize = 6;

/// Ray origin plus per-axis direction reciprocals.
///
/// A zero reciprocal means the ray never crosses a boundary on that axis.
/// Reciprocals are always finite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: [f64; 3],
    pub recip: [f64; 3],
}

/// `1 / d`, or the zero sentinel when that is not finite: zero and subnormal
/// components both count as parallel.
#[inline]
fn recip_or_zero(d: f64) -> f64 {
    let r = 1.0 / d;
    if r.is_finite() { r } else { 0.0 }
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self::from_row([origin.x, origin.y, origin.z, dir.x, dir.y, dir.z])
    }

    #[inline]
    pub fn from_row(row: [f64; RAY_ELEMENTS]) -> Self {
        Ray {
            origin: [row[0], row[1], row[2]],
            recip: [
                recip_or_zero(row[3]),
                recip_or_zero(row[4]),
                recip_or_zero(row[5]),
            ],
        }
    }

    /// Floor of the origin, the cell traversal starts from.
    #[inline]
    pub fn start_cell(&self) -> [i32; 3] {
        Vec3::from(self.origin).floor_cell()
    }

    /// A ray with no direction at all never leaves its start cell.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.recip.iter().all(|r| *r == 0.0)
    }
}

/// Immutable batch of rays submitted for one traversal.
#[derive(Clone, Debug, Default)]
pub struct RayBatch {
    rays: Vec<Ray>,
}

impl RayBatch {
    pub fn new(rays: Vec<Ray>) -> Self {
        Self { rays }
    }

    /// Parses an `N x 6` row-major buffer `[ox, oy, oz, dx, dy, dz]`.
    pub fn from_flat(values: &[f64]) -> Result<Self, TraceError> {
        if values.len() % RAY_ELEMENTS != 0 {
            return Err(TraceError::RayLayout { len: values.len() });
        }
        let mut rays = Vec::with_capacity(values.len() / RAY_ELEMENTS);
        for (index, row) in values.chunks_exact(RAY_ELEMENTS).enumerate() {
            if row.iter().any(|v| !v.is_finite()) {
                return Err(TraceError::NonFiniteRay { index });
            }
            let mut r = [0.0; RAY_ELEMENTS];
            r.copy_from_slice(row);
            rays.push(Ray::from_row(r));
        }
        Ok(Self { rays })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rays.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rays.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Ray] {
        &self.rays
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Ray> {
        self.rays.iter()
    }
}

impl From<Vec<Ray>> for RayBatch {
    fn from(rays: Vec<Ray>) -> Self {
        Self::new(rays)
    }
}
