//! # Navigation Mesh
//!
//! A coarse grid where each cell holds the mean height of one
//! `block_size × block_size` block of a heightmap. Pathfinding runs on this
//! grid instead of the full-resolution field.

use terrastream_procedural::HeightField;
use tracing::debug;

use crate::error::{NavError, NavResult};

/// Height given to cells whose block has no in-bounds samples.
pub const UNKNOWN_HEIGHT: f32 = 1.0;

/// Grid of averaged terrain heights, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct NavMesh {
    width: usize,
    height: usize,
    cells: Vec<f32>,
}

impl NavMesh {
    /// Wraps precomputed cell heights.
    ///
    /// # Errors
    ///
    /// - [`NavError::EmptyMesh`] if either side is zero
    /// - [`NavError::DimensionMismatch`] if `cells` is not `width * height`
    pub fn from_values(width: usize, height: usize, cells: Vec<f32>) -> NavResult<Self> {
        if width == 0 || height == 0 {
            return Err(NavError::EmptyMesh);
        }
        let expected = width * height;
        if cells.len() != expected {
            return Err(NavError::DimensionMismatch {
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Cells along x.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Cells along y.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Whether `(x, y)` is a cell of this mesh.
    #[inline]
    #[must_use]
    pub const fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Average height of cell `(x, y)`.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if self.contains(x, y) {
            Some(self.cells[y * self.width + x])
        } else {
            None
        }
    }

    /// Whether the cell exists and is at or below `threshold`.
    #[must_use]
    pub fn is_walkable(&self, x: usize, y: usize, threshold: f32) -> bool {
        self.get(x, y).is_some_and(|h| h <= threshold)
    }

    /// All cells, row-major.
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.cells
    }

    /// Checks that `(x, y)` is inside the mesh.
    pub(crate) fn check_bounds(&self, x: usize, y: usize) -> NavResult<()> {
        if self.contains(x, y) {
            Ok(())
        } else {
            Err(NavError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }
}

/// Builds [`NavMesh`]es from heightmaps.
pub struct NavMeshBuilder;

impl NavMeshBuilder {
    /// Downsamples `field` into `floor(W / block) × floor(H / block)` cells.
    ///
    /// Trailing samples that do not fill a whole block are dropped.
    ///
    /// # Errors
    ///
    /// - [`NavError::ZeroBlockSize`] if `block_size` is zero
    /// - [`NavError::EmptyMesh`] if the block is larger than the field
    pub fn build(field: &HeightField, block_size: usize) -> NavResult<NavMesh> {
        if block_size == 0 {
            return Err(NavError::ZeroBlockSize);
        }
        Self::build_with_extent(
            field,
            block_size,
            field.width() / block_size,
            field.height() / block_size,
        )
    }

    /// Downsamples `field` into exactly `width × height` cells.
    ///
    /// Blocks reaching past the field average only their in-bounds samples;
    /// blocks entirely outside get [`UNKNOWN_HEIGHT`].
    ///
    /// # Errors
    ///
    /// - [`NavError::ZeroBlockSize`] if `block_size` is zero
    /// - [`NavError::EmptyMesh`] if `width` or `height` is zero
    pub fn build_with_extent(
        field: &HeightField,
        block_size: usize,
        width: usize,
        height: usize,
    ) -> NavResult<NavMesh> {
        if block_size == 0 {
            return Err(NavError::ZeroBlockSize);
        }
        if width == 0 || height == 0 {
            return Err(NavError::EmptyMesh);
        }

        let mut cells = Vec::with_capacity(width * height);
        for cy in 0..height {
            for cx in 0..width {
                cells.push(block_mean(field, cx * block_size, cy * block_size, block_size));
            }
        }

        debug!(width, height, block_size, "built navigation mesh");
        NavMesh::from_values(width, height, cells)
    }
}

fn block_mean(field: &HeightField, x0: usize, y0: usize, block_size: usize) -> f32 {
    let x1 = (x0 + block_size).min(field.width());
    let y1 = (y0 + block_size).min(field.height());
    if x0 >= x1 || y0 >= y1 {
        return UNKNOWN_HEIGHT;
    }

    let sum: f64 = (y0..y1)
        .flat_map(|y| field.row(y)[x0..x1].iter())
        .map(|&v| f64::from(v))
        .sum();
    let count = (x1 - x0) * (y1 - y0);
    (sum / count as f64) as f32
}
