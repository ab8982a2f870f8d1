//! Scene description for the `voxcast` driver: grid extents, filled boxes and
//! a pinhole camera.

use std::error::Error;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use voxcast_blocks::OccupancyTable;
use voxcast_geom::{Mat3, Vec3};
use voxcast_grid::BlockGrid;

const IDENTITY_ROWS: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

fn default_extents() -> [usize; 3] {
    [64, 32, 64]
}
fn default_identity() -> [[f64; 3]; 3] {
    IDENTITY_ROWS
}

#[derive(Clone, Debug, Deserialize)]
pub struct FillBox {
    /// Inclusive lower corner, `[x, y, z]`.
    pub min: [i32; 3],
    /// Exclusive upper corner.
    pub max: [i32; 3],
    pub block: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CameraDef {
    /// World-space camera position.
    pub position: [f64; 3],
    /// World-space coordinates of grid cell `(0, 0, 0)`.
    #[serde(default)]
    pub offset: [f64; 3],
    #[serde(default = "default_identity")]
    pub camera: [[f64; 3]; 3],
    #[serde(default = "default_identity")]
    pub rotation: [[f64; 3]; 3],
}

#[derive(Clone, Debug, Deserialize)]
pub struct Scene {
    /// `[x, y, z]`; x must be a multiple of 32.
    #[serde(default = "default_extents")]
    pub extents: [usize; 3],
    #[serde(default)]
    pub fill: Vec<FillBox>,
    pub camera: CameraDef,
}

impl Scene {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    /// Dense grid with every `[[fill]]` box applied in order; later boxes win.
    pub fn build_grid(&self, table: &OccupancyTable) -> Result<BlockGrid, Box<dyn Error>> {
        let [sx, sy, sz] = self.extents;
        let mut grid = BlockGrid::new(sx, sy, sz)?;
        for f in &self.fill {
            let id = table
                .id_by_name(&f.block)
                .ok_or_else(|| format!("scene fill names unknown block '{}'", f.block))?;
            let n = grid.fill_box(f.min, f.max, id);
            log::debug!("fill {:?}..{:?} with '{}': {} cells", f.min, f.max, f.block, n);
        }
        Ok(grid)
    }

    /// Camera position in grid coordinates.
    pub fn position(&self) -> Vec3 {
        Vec3::from(self.camera.position) - Vec3::from(self.camera.offset)
    }

    /// Inverse of `camera * rotation`; errors on a singular view.
    pub fn inverse_view(&self) -> Result<Mat3, Box<dyn Error>> {
        let camera = Mat3::from_rows(self.camera.camera);
        let rotation = Mat3::from_rows(self.camera.rotation);
        voxcast_trace::camera::inverse_view(&camera, &rotation)
            .ok_or_else(|| "scene camera * rotation is singular".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxcast_blocks::{BlockDef, BlocksConfig};
    use voxcast_grid::OccupancyMask;
    use voxcast_trace::camera::pinhole_rays;
    use voxcast_trace::{Face, RayOutcome, TraceConfig};

    fn table() -> OccupancyTable {
        let cfg = BlocksConfig {
            blocks: vec![
                BlockDef::new("air", Some(0), Some(false)),
                BlockDef::new("stone", None, None),
            ],
        };
        OccupancyTable::from_config(cfg).unwrap()
    }

    #[test]
    fn scene_defaults_and_fill() {
        let scene = Scene::from_toml_str(
            r#"
            extents = [32, 4, 4]

            [[fill]]
            min = [0, 0, 0]
            max = [32, 1, 4]
            block = "stone"

            [camera]
            position = [16.0, 2.0, -3.0]
            "#,
        )
        .unwrap();
        let grid = scene.build_grid(&table()).unwrap();
        assert_eq!(grid.get(5, 0, 2), Some(1));
        assert_eq!(grid.get(5, 1, 2), Some(0));
        assert_eq!(scene.inverse_view().unwrap(), Mat3::IDENTITY);
        assert_eq!(scene.position(), Vec3::new(16.0, 2.0, -3.0));
    }

    #[test]
    fn camera_offset_moves_into_grid_space() {
        let scene = Scene::from_toml_str(
            r#"
            extents = [32, 4, 4]

            [[fill]]
            min = [0, 0, 0]
            max = [32, 4, 4]
            block = "stone"

            [camera]
            position = [116.5, -48.5, 988.0]
            offset = [100.0, -50.0, 990.0]
            "#,
        )
        .unwrap();
        assert_eq!(scene.position(), Vec3::new(16.5, 1.5, -2.0));

        // Center pixel of a 3x3 view looks down +z onto the near face.
        let grid = scene.build_grid(&table()).unwrap();
        let mask = OccupancyMask::build(&grid, &table()).unwrap();
        let rays = pinhole_rays(scene.position(), &scene.inverse_view().unwrap(), 3, 3);
        let out = voxcast_trace::trace(&rays, &grid, &mask, TraceConfig::default()).unwrap();
        assert_eq!(out.results[4].outcome, RayOutcome::Hit);
        assert_eq!(out.results[4].face(), Some(Face::PosZ));
        assert_eq!(out.results[4].depth, 2.0);

        // The same camera left in world space never reaches the grid.
        let world = Vec3::from(scene.camera.position);
        let rays = pinhole_rays(world, &Mat3::IDENTITY, 3, 3);
        let out = voxcast_trace::trace(&rays, &grid, &mask, TraceConfig::default()).unwrap();
        assert_eq!(out.counts.hit, 0);
    }

    #[test]
    fn unknown_block_is_rejected() {
        let scene = Scene::from_toml_str(
            r#"
            extents = [32, 2, 2]
            [[fill]]
            min = [0, 0, 0]
            max = [1, 1, 1]
            block = "lava"
            [camera]
            position = [0.0, 0.0, 0.0]
            "#,
        )
        .unwrap();
        assert!(scene.build_grid(&table()).is_err());
    }

    #[test]
    fn singular_camera_is_rejected() {
        let scene = Scene::from_toml_str(
            r#"
            [camera]
            position = [0.0, 0.0, 0.0]
            camera = [[1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]
            "#,
        )
        .unwrap();
        assert!(scene.inverse_view().is_err());
    }
}
