//! Error types for the detection pipeline.
//!
//! Two failure classes exist: caller configuration mistakes and internal
//! invariant violations. Logically-empty results (no neighbors found, no
//! ridge transitions, ambiguous chain direction) are ordinary `Ok` values
//! and never surface here. There is no transient/recoverable class and no
//! retry path anywhere in the crate.

// ── Configuration errors ───────────────────────────────────────────────────

/// Caller configuration mistakes. Fatal for the detection run.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Image smaller than one block in at least one dimension.
    ImageTooSmall {
        /// Image width in pixels.
        width: usize,
        /// Image height in pixels.
        height: usize,
        /// Requested block size.
        block_size: usize,
    },
    /// Caller-supplied padding is smaller than the rotated grids require.
    InsufficientPadding {
        /// Padding supplied by the caller.
        requested: usize,
        /// Minimum padding derived from the grid diagonal.
        required: usize,
    },
    /// DFT analysis requires square sampling grids.
    NonSquareDftGrid {
        /// Grid width.
        grid_w: usize,
        /// Grid height.
        grid_h: usize,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ImageTooSmall {
                width,
                height,
                block_size,
            } => {
                write!(
                    f,
                    "image {}x{} is smaller than one {}px block",
                    width, height, block_size
                )
            }
            Self::InsufficientPadding {
                requested,
                required,
            } => {
                write!(
                    f,
                    "insufficient padding: got {}, rotated grids need {}",
                    requested, required
                )
            }
            Self::NonSquareDftGrid { grid_w, grid_h } => {
                write!(f, "DFT grid must be square, got {}x{}", grid_w, grid_h)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ── Internal consistency errors ────────────────────────────────────────────

/// Invariant violations that indicate a logic bug, not bad input.
/// These should never occur in correct operation.
#[derive(Debug, Clone, PartialEq)]
pub enum InternalError {
    /// Digital line generation produced more points than its derived bound.
    LinePointOverflow {
        /// Points generated so far.
        generated: usize,
        /// Precomputed maximum `max(|dx|+2, |dy|+2)`.
        capacity: usize,
    },
    /// Neighbor insertion position fell outside the kept list.
    InsertionOutOfRange {
        /// Computed insertion position.
        position: usize,
        /// Current neighbor count.
        len: usize,
    },
    /// Percentile scan exhausted the histogram without reaching its target.
    PercentileNotFound,
    /// Neighbor list grew past its configured capacity.
    NeighborOverflow {
        /// Configured maximum neighbor count.
        max_nbrs: usize,
    },
}

impl std::fmt::Display for InternalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LinePointOverflow {
                generated,
                capacity,
            } => {
                write!(
                    f,
                    "line point buffer overflow: {} points, capacity {}",
                    generated, capacity
                )
            }
            Self::InsertionOutOfRange { position, len } => {
                write!(
                    f,
                    "neighbor insertion position {} out of range (len {})",
                    position, len
                )
            }
            Self::PercentileNotFound => {
                write!(f, "percentile point not reached in block histogram")
            }
            Self::NeighborOverflow { max_nbrs } => {
                write!(f, "neighbor list overflow (max {})", max_nbrs)
            }
        }
    }
}

impl std::error::Error for InternalError {}

// ── Top-level error ────────────────────────────────────────────────────────

/// Any failure the detection pipeline can surface to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectError {
    /// Caller configuration mistake.
    Config(ConfigError),
    /// Internal invariant violation.
    Internal(InternalError),
}

impl std::fmt::Display for DetectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration error: {}", e),
            Self::Internal(e) => write!(f, "internal error: {}", e),
        }
    }
}

impl std::error::Error for DetectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Internal(e) => Some(e),
        }
    }
}

impl From<ConfigError> for DetectError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<InternalError> for DetectError {
    fn from(e: InternalError) -> Self {
        Self::Internal(e)
    }
}
