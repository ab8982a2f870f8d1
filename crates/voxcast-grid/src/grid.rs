use voxcast_blocks::{AIR, BlockId};

use crate::GridError;
use crate::mask::WORD_BITS;

/// Dense `(size_y, size_z, size_x)` grid of block ids, x fastest.
///
/// The buffer length always equals the product of the extents; cells can be
/// rewritten through [`BlockGrid::blocks_mut`] but never added or dropped.
#[derive(Clone, Debug)]
pub struct BlockGrid {
    sx: usize,
    sy: usize,
    sz: usize,
    blocks: Vec<BlockId>,
}

impl BlockGrid {
    /// All-air grid.
    pub fn new(sx: usize, sy: usize, sz: usize) -> Result<Self, GridError> {
        let cells = Self::check_extents(sx, sy, sz)?;
        Ok(BlockGrid {
            sx,
            sy,
            sz,
            blocks: vec![AIR; cells],
        })
    }

    /// Wraps an existing buffer laid out as `blocks[(y * sz + z) * sx + x]`.
    pub fn from_blocks(
        sx: usize,
        sy: usize,
        sz: usize,
        blocks: Vec<BlockId>,
    ) -> Result<Self, GridError> {
        let expected = Self::check_extents(sx, sy, sz)?;
        if blocks.len() != expected {
            return Err(GridError::ShapeMismatch {
                expected,
                actual: blocks.len(),
            });
        }
        Ok(BlockGrid { sx, sy, sz, blocks })
    }

    /// Validates the extents and returns the cell count.
    fn check_extents(sx: usize, sy: usize, sz: usize) -> Result<usize, GridError> {
        if sx % WORD_BITS != 0 {
            return Err(GridError::UnalignedWidth {
                size_x: sx,
                granularity: WORD_BITS,
            });
        }
        for (axis, extent) in [('x', sx), ('y', sy), ('z', sz)] {
            if extent > i32::MAX as usize {
                return Err(GridError::ExtentTooLarge { axis, extent });
            }
        }
        sx.checked_mul(sy)
            .and_then(|n| n.checked_mul(sz))
            .ok_or(GridError::TooManyCells {
                extents: [sx, sy, sz],
            })
    }

    #[inline]
    pub fn sx(&self) -> usize {
        self.sx
    }

    #[inline]
    pub fn sy(&self) -> usize {
        self.sy
    }

    #[inline]
    pub fn sz(&self) -> usize {
        self.sz
    }

    #[inline]
    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    #[inline]
    pub fn blocks_mut(&mut self) -> &mut [BlockId] {
        &mut self.blocks
    }

    pub fn into_blocks(self) -> Vec<BlockId> {
        self.blocks
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        (y * self.sz + z) * self.sx + x
    }

    #[inline]
    pub fn get_local(&self, x: usize, y: usize, z: usize) -> BlockId {
        self.blocks[self.idx(x, y, z)]
    }

    #[inline]
    pub fn set_local(&mut self, x: usize, y: usize, z: usize, id: BlockId) {
        let i = self.idx(x, y, z);
        self.blocks[i] = id;
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && (x as usize) < self.sx
            && (y as usize) < self.sy
            && (z as usize) < self.sz
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> Option<BlockId> {
        if !self.contains(x, y, z) {
            return None;
        }
        Some(self.get_local(x as usize, y as usize, z as usize))
    }

    /// One x-row of the grid.
    #[inline]
    pub fn row(&self, y: usize, z: usize) -> &[BlockId] {
        let start = self.idx(0, y, z);
        &self.blocks[start..start + self.sx]
    }

    #[inline]
    pub fn extents(&self) -> [usize; 3] {
        [self.sx, self.sy, self.sz]
    }

    /// Fills the inclusive-exclusive box `min..max`, clipped to the grid.
    /// Returns the number of cells written.
    pub fn fill_box(&mut self, min: [i32; 3], max: [i32; 3], id: BlockId) -> usize {
        let clip = |lo: i32, hi: i32, size: usize| -> (usize, usize) {
            let lo = lo.clamp(0, size as i32) as usize;
            let hi = hi.clamp(0, size as i32) as usize;
            (lo, hi.max(lo))
        };
        let (x0, x1) = clip(min[0], max[0], self.sx);
        let (y0, y1) = clip(min[1], max[1], self.sy);
        let (z0, z1) = clip(min[2], max[2], self.sz);
        for y in y0..y1 {
            for z in z0..z1 {
                let start = self.idx(x0, y, z);
                self.blocks[start..start + (x1 - x0)].fill(id);
            }
        }
        (x1 - x0) * (y1 - y0) * (z1 - z0)
    }
}
