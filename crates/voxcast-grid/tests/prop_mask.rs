use proptest::prelude::*;
use voxcast_blocks::OccupancyTable;
use voxcast_grid::{BlockGrid, GridError, OccupancyMask, WORD_BITS};

fn dims() -> impl Strategy<Value = (usize, usize, usize)> {
    (1usize..=3, 1usize..=4, 1usize..=4).prop_map(|(wx, sy, sz)| (wx * WORD_BITS, sy, sz))
}

fn grid_and_table() -> impl Strategy<Value = (BlockGrid, OccupancyTable)> {
    dims().prop_flat_map(|(sx, sy, sz)| {
        (
            prop::collection::vec(0u16..12, sx * sy * sz),
            prop::collection::vec(any::<bool>(), 0..10),
        )
            .prop_map(move |(blocks, flags)| {
                (
                    BlockGrid::from_blocks(sx, sy, sz, blocks).unwrap(),
                    OccupancyTable::from_flags(flags),
                )
            })
    })
}

proptest! {
    // Every mask bit equals the table entry of the grid cell it covers
    #[test]
    fn mask_bit_matches_table((grid, table) in grid_and_table()) {
        let mask = OccupancyMask::build(&grid, &table).unwrap();
        for y in 0..grid.sy() { for z in 0..grid.sz() { for x in 0..grid.sx() {
            prop_assert_eq!(mask.get(x, y, z), table.is_solid(grid.get_local(x, y, z)));
        }}}
    }

    // Word addressing follows mask[y][z][x / 32], bit x % 32
    #[test]
    fn word_layout_is_lsb_first((grid, table) in grid_and_table()) {
        let mask = OccupancyMask::build(&grid, &table).unwrap();
        prop_assert_eq!(mask.as_words().len(), grid.sy() * grid.sz() * grid.sx() / WORD_BITS);
        for y in 0..grid.sy() { for z in 0..grid.sz() {
            let row = mask.row(y, z);
            prop_assert_eq!(row.len(), mask.words_per_row());
            for (w, word) in row.iter().enumerate() {
                prop_assert_eq!(*word, mask.word(y, z, w));
                for bit in 0..WORD_BITS {
                    let x = w * WORD_BITS + bit;
                    prop_assert_eq!((word >> bit) & 1 == 1, table.is_solid(grid.get_local(x, y, z)));
                }
            }
        }}
    }

    // Occupied count equals the number of solid cells
    #[test]
    fn occupied_count_matches((grid, table) in grid_and_table()) {
        let mask = OccupancyMask::build(&grid, &table).unwrap();
        let expect = grid.blocks().iter().filter(|id| table.is_solid(**id)).count();
        prop_assert_eq!(mask.occupied_count(), expect);
    }

    // Signed lookups outside the grid are always empty
    #[test]
    fn signed_lookup_outside_is_empty((grid, _) in grid_and_table(), dx in -3i32..3) {
        let table = OccupancyTable::from_flags(vec![true; 16]);
        let mask = OccupancyMask::build(&grid, &table).unwrap();
        let (sx, sy, sz) = (grid.sx() as i32, grid.sy() as i32, grid.sz() as i32);
        prop_assert!(!mask.get_signed(-1 + dx.min(0), 0, 0));
        prop_assert!(!mask.get_signed(sx + dx.max(0), 0, 0));
        prop_assert!(!mask.get_signed(0, sy, 0));
        prop_assert!(!mask.get_signed(0, 0, sz));
        prop_assert!(mask.get_signed(0, 0, 0));
    }

    // idx maps each (x,y,z) within bounds to unique in-range indices
    #[test]
    fn idx_is_unique_and_in_range((sx, sy, sz) in dims()) {
        let grid = BlockGrid::new(sx, sy, sz).unwrap();
        let expect = sx * sy * sz;
        let mut seen = vec![false; expect];
        for y in 0..sy { for z in 0..sz { for x in 0..sx {
            let i = grid.idx(x, y, z);
            prop_assert!(i < expect);
            prop_assert!(!seen[i]);
            seen[i] = true;
        }}}
        prop_assert!(seen.into_iter().all(|b| b));
    }

    // fill_box writes exactly the clipped box
    #[test]
    fn fill_box_writes_clipped_box(
        (sx, sy, sz) in dims(),
        min in prop::array::uniform3(-4i32..8),
        max in prop::array::uniform3(-4i32..40),
    ) {
        let mut grid = BlockGrid::new(sx, sy, sz).unwrap();
        let written = grid.fill_box(min, max, 5);
        let ext = [sx as i32, sy as i32, sz as i32];
        let mut count = 0;
        for y in 0..sy as i32 { for z in 0..sz as i32 { for x in 0..sx as i32 {
            let p = [x, y, z];
            let inside = (0..3).all(|a| p[a] >= min[a].max(0) && p[a] < max[a].min(ext[a]));
            prop_assert_eq!(grid.get(x, y, z) == Some(5), inside);
            count += inside as usize;
        }}}
        prop_assert_eq!(written, count);
    }
}

#[test]
fn unaligned_width_is_rejected() {
    assert_eq!(
        BlockGrid::new(33, 1, 1).unwrap_err(),
        GridError::UnalignedWidth { size_x: 33, granularity: 32 }
    );
}

#[test]
fn wrong_buffer_length_is_rejected_not_resized() {
    let err = BlockGrid::from_blocks(32, 2, 2, vec![0; 127]).unwrap_err();
    assert_eq!(err, GridError::ShapeMismatch { expected: 128, actual: 127 });
}

#[test]
fn ids_beyond_table_are_empty() {
    let mut grid = BlockGrid::new(32, 1, 1).unwrap();
    grid.set_local(3, 0, 0, 1);
    grid.set_local(4, 0, 0, 900);
    let mask = OccupancyMask::build(&grid, &OccupancyTable::from_flags(vec![false, true])).unwrap();
    assert_eq!(mask.word(0, 0, 0), 1 << 3);
}

#[test]
fn zero_height_grid_builds_empty_mask() {
    let grid = BlockGrid::new(64, 0, 3).unwrap();
    let mask = OccupancyMask::build(&grid, &OccupancyTable::from_flags(vec![true])).unwrap();
    assert!(mask.as_words().is_empty());
    assert_eq!(mask.occupied_count(), 0);
}

#[test]
fn overflowing_cell_count_is_rejected() {
    let (sx, sy, sz) = (2_147_483_616, i32::MAX as usize, i32::MAX as usize);
    let expected = GridError::TooManyCells { extents: [sx, sy, sz] };
    assert_eq!(BlockGrid::new(sx, sy, sz).unwrap_err(), expected);
    assert_eq!(BlockGrid::from_blocks(sx, sy, sz, Vec::new()).unwrap_err(), expected);
}

#[test]
fn edits_through_blocks_mut_reach_the_mask() {
    let mut grid = BlockGrid::new(32, 2, 1).unwrap();
    grid.blocks_mut()[32 + 5] = 1;
    assert_eq!(grid.blocks().len(), 64);
    assert_eq!(grid.get(5, 1, 0), Some(1));
    let mask = OccupancyMask::build(&grid, &OccupancyTable::from_flags(vec![false, true])).unwrap();
    assert!(mask.get(5, 1, 0));
    assert_eq!(mask.occupied_count(), 1);
}
