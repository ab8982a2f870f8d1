#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// `size_x` is not a multiple of the mask word width.
    UnalignedWidth { size_x: usize, granularity: usize },
    /// Block buffer length does not match `size_y * size_z * size_x`.
    ShapeMismatch { expected: usize, actual: usize },
    /// An extent does not fit the signed cell coordinates used by traversal.
    ExtentTooLarge { axis: char, extent: usize },
    /// `size_x * size_y * size_z` overflows `usize`.
    TooManyCells { extents: [usize; 3] },
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridError::UnalignedWidth {
                size_x,
                granularity,
            } => write!(
                f,
                "grid x extent {} is not a multiple of {}",
                size_x, granularity
            ),
            GridError::ShapeMismatch { expected, actual } => write!(
                f,
                "grid buffer holds {} blocks, shape requires {}",
                actual, expected
            ),
            GridError::ExtentTooLarge { axis, extent } => {
                write!(f, "grid {} extent {} exceeds i32 range", axis, extent)
            }
            GridError::TooManyCells { extents } => write!(
                f,
                "grid {}x{}x{} has more cells than fit in usize",
                extents[0], extents[1], extents[2]
            ),
        }
    }
}

impl std::error::Error for GridError {}
