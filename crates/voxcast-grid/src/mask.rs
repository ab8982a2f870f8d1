//! Packed per-cell occupancy.
//!
//! Layout: one bit per cell in `u32` words, one run of `size_x / 32` words per
//! `(y, z)` row, rows ordered like the dense grid (`(y * size_z + z)`). Cell `x`
//! lives in word `x / 32` of its row at bit `x % 32`, counted from the least
//! significant bit.

use std::time::Instant;

use rayon::prelude::*;
use voxcast_blocks::{BlockId, OccupancyTable};

use crate::{BlockGrid, GridError};

pub const WORD_BITS: usize = 32;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OccupancyMask {
    sx: usize,
    sy: usize,
    sz: usize,
    words_per_row: usize,
    words: Vec<u32>,
}

impl OccupancyMask {
    /// Builds the mask for `grid`, one rayon task per `(y, z)` row.
    pub fn build(grid: &BlockGrid, table: &OccupancyTable) -> Result<Self, GridError> {
        let [sx, sy, sz] = grid.extents();
        if sx % WORD_BITS != 0 {
            return Err(GridError::UnalignedWidth {
                size_x: sx,
                granularity: WORD_BITS,
            });
        }
        let t0 = Instant::now();
        let words_per_row = sx / WORD_BITS;
        let mut words = vec![0u32; words_per_row * sy * sz];
        if words_per_row > 0 {
            words
                .par_chunks_mut(words_per_row)
                .zip(grid.blocks().par_chunks(sx))
                .for_each(|(row_words, row_blocks)| pack_row(row_words, row_blocks, table));
        }
        let mask = OccupancyMask {
            sx,
            sy,
            sz,
            words_per_row,
            words,
        };
        log::debug!(
            "occupancy mask {}x{}x{}: {} words, {} occupied, built in {:.2}ms",
            mask.sx,
            mask.sy,
            mask.sz,
            mask.words.len(),
            mask.occupied_count(),
            t0.elapsed().as_secs_f64() * 1000.0
        );
        Ok(mask)
    }

    #[inline]
    pub fn extents(&self) -> [usize; 3] {
        [self.sx, self.sy, self.sz]
    }

    #[inline]
    pub fn words_per_row(&self) -> usize {
        self.words_per_row
    }

    #[inline]
    fn row_start(&self, y: usize, z: usize) -> usize {
        (y * self.sz + z) * self.words_per_row
    }

    /// Word `w` of row `(y, z)`, covering cells `32 * w .. 32 * w + 32`.
    #[inline]
    pub fn word(&self, y: usize, z: usize, w: usize) -> u32 {
        self.words[self.row_start(y, z) + w]
    }

    #[inline]
    pub fn row(&self, y: usize, z: usize) -> &[u32] {
        let start = self.row_start(y, z);
        &self.words[start..start + self.words_per_row]
    }

    /// Occupancy of an in-bounds cell.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> bool {
        (self.word(y, z, x / WORD_BITS) >> (x % WORD_BITS)) & 1 == 1
    }

    /// Occupancy of a signed cell; cells outside the grid are empty.
    #[inline]
    pub fn get_signed(&self, x: i32, y: i32, z: i32) -> bool {
        if x < 0 || y < 0 || z < 0 {
            return false;
        }
        let (x, y, z) = (x as usize, y as usize, z as usize);
        x < self.sx && y < self.sy && z < self.sz && self.get(x, y, z)
    }

    pub fn occupied_count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Raw words, e.g. for upload to another device.
    pub fn as_words(&self) -> &[u32] {
        &self.words
    }
}

#[inline]
fn pack_row(row_words: &mut [u32], row_blocks: &[BlockId], table: &OccupancyTable) {
    for (word, cells) in row_words.iter_mut().zip(row_blocks.chunks_exact(WORD_BITS)) {
        let mut bits = 0u32;
        for (bit, id) in cells.iter().enumerate() {
            if table.is_solid(*id) {
                bits |= 1 << bit;
            }
        }
        *word = bits;
    }
}
