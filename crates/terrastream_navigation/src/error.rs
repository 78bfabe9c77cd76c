//! Navigation errors.

use thiserror::Error;

/// Errors raised by mesh building and path queries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NavError {
    /// Block size must be at least one sample.
    #[error("block size must be positive")]
    ZeroBlockSize,

    /// The requested mesh has no cells.
    #[error("navigation mesh would be empty")]
    EmptyMesh,

    /// Cell values do not fill the mesh.
    #[error("expected {expected} cell values, got {actual}")]
    DimensionMismatch {
        /// `width * height`.
        expected: usize,
        /// Values supplied.
        actual: usize,
    },

    /// A query coordinate lies outside the mesh.
    #[error("cell ({x}, {y}) outside {width}x{height} mesh")]
    OutOfBounds {
        /// Column requested.
        x: usize,
        /// Row requested.
        y: usize,
        /// Mesh width.
        width: usize,
        /// Mesh height.
        height: usize,
    },

    /// Walkability threshold is NaN.
    #[error("walkable threshold must be a number, got {0}")]
    InvalidThreshold(f32),

    /// Configuration could not be parsed.
    #[error("invalid navigation config: {0}")]
    InvalidConfig(String),
}

/// Result alias for navigation operations.
pub type NavResult<T> = Result<T, NavError>;
