//! # Procedural Error Types
//!
//! Every variant is an invalid-argument condition detected at the entry of
//! an operation, before any state is touched.

use thiserror::Error;

/// Errors that can occur while generating or streaming terrain.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProceduralError {
    /// Fractal noise needs at least one octave.
    #[error("invalid octave count {0}: at least one octave is required")]
    InvalidOctaveCount(u32),

    /// Persistence must be a finite, strictly positive factor.
    #[error("invalid persistence {0}: must be finite and greater than zero")]
    InvalidPersistence(f64),

    /// A grid was requested with a zero dimension.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },

    /// A gradient needs at least one color stop.
    #[error("gradient has no color stops")]
    EmptyGradient,

    /// Color stops and band widths must pair up one to one.
    #[error("gradient has {stops} stops but {widths} band widths")]
    GradientLengthMismatch {
        /// Number of color stops supplied.
        stops: usize,
        /// Number of band widths supplied.
        widths: usize,
    },

    /// A tile cache cannot hold zero tiles.
    #[error("tile cache capacity must be at least 1")]
    ZeroCapacity,

    /// The window would not fit in the cache backing it.
    #[error("window of {cells} cells does not fit a cache of capacity {capacity}")]
    WindowExceedsCapacity {
        /// Cells in the window.
        cells: usize,
        /// Capacity of the cache.
        capacity: usize,
    },

    /// Window sides must be odd so the focus sits in the middle cell.
    #[error("window size {width}x{height} must be odd and non-zero")]
    InvalidWindowSize {
        /// Requested window width.
        width: usize,
        /// Requested window height.
        height: usize,
    },

    /// The focus moved more than one tile in a single update.
    #[error("focus jump of ({dx}, {dy}) tiles exceeds a single step")]
    FocusJump {
        /// Horizontal jump in tiles.
        dx: i64,
        /// Vertical jump in tiles.
        dy: i64,
    },

    /// Configuration could not be parsed or failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for procedural operations.
pub type ProceduralResult<T> = Result<T, ProceduralError>;
