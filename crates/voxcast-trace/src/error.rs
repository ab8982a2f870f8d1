use voxcast_grid::GridError;

#[derive(Debug, Clone, PartialEq)]
pub enum TraceError {
    /// Flat ray buffer length is not a multiple of the six-value row.
    RayLayout { len: usize },
    /// A ray row holds NaN or infinity.
    NonFiniteRay { index: usize },
    /// Mask was built for a grid of different extents.
    MaskShape {
        grid: [usize; 3],
        mask: [usize; 3],
    },
    /// An output buffer does not hold exactly one entry per ray.
    OutputLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    InvalidConfig(&'static str),
    ThreadPool(String),
    Grid(GridError),
}

impl std::fmt::Display for TraceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TraceError::RayLayout { len } => write!(
                f,
                "ray buffer of {} values is not a multiple of {}",
                len,
                crate::ray::RAY_ELEMENTS
            ),
            TraceError::NonFiniteRay { index } => write!(f, "ray {} is not finite", index),
            TraceError::MaskShape { grid, mask } => write!(
                f,
                "mask extents {:?} do not match grid extents {:?}",
                mask, grid
            ),
            TraceError::OutputLength {
                what,
                expected,
                actual,
            } => write!(
                f,
                "{} buffer holds {} entries, expected {}",
                what, actual, expected
            ),
            TraceError::InvalidConfig(msg) => write!(f, "invalid trace config: {}", msg),
            TraceError::ThreadPool(msg) => write!(f, "trace thread pool: {}", msg),
            TraceError::Grid(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for TraceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TraceError::Grid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GridError> for TraceError {
    fn from(e: GridError) -> Self {
        TraceError::Grid(e)
    }
}
