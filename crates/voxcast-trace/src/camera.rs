//! Primary rays for a pinhole camera.

use voxcast_geom::{Mat3, Vec3};

use crate::{Ray, RayBatch};

/// `n` evenly spaced values over `[-1, 1]`; a single sample sits at -1.
#[inline]
fn signed_unit(i: usize, n: usize) -> f64 {
    if n <= 1 {
        -1.0
    } else {
        -1.0 + 2.0 * i as f64 / (n - 1) as f64
    }
}

/// Inverse of `camera * rotation`, the matrix that maps screen directions back
/// into grid space. `None` for a singular view.
pub fn inverse_view(camera: &Mat3, rotation: &Mat3) -> Option<Mat3> {
    (*camera * *rotation).inverse()
}

/// One ray per pixel, row-major, all from `position`. Pixel `(row, col)` looks
/// along `normalize(inv_view * (u, v, 1))` with `u`, `v` spanning `[-1, 1]`
/// across the width and height.
pub fn pinhole_rays(position: Vec3, inv_view: &Mat3, width: usize, height: usize) -> RayBatch {
    let mut rays = Vec::with_capacity(width * height);
    for row in 0..height {
        let v = signed_unit(row, height);
        for col in 0..width {
            let u = signed_unit(col, width);
            let dir = inv_view.mul_vec(Vec3::new(u, v, 1.0)).normalized();
            rays.push(Ray::new(position, dir));
        }
    }
    RayBatch::new(rays)
}
