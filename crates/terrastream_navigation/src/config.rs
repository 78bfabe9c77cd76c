//! # Navigation Configuration
//!
//! ```toml
//! block_size = 8
//! walkable_threshold = 0.6
//! ```

use serde::{Deserialize, Serialize};
use terrastream_procedural::HeightField;

use crate::error::{NavError, NavResult};
use crate::navmesh::{NavMesh, NavMeshBuilder};

/// Mesh resolution and walkability cutoff.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Heightmap samples per mesh cell along each axis.
    pub block_size: usize,
    /// Cells averaging above this height are impassable.
    pub walkable_threshold: f32,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            block_size: 8,
            walkable_threshold: 0.6,
        }
    }
}

impl NavConfig {
    /// Parses and validates a TOML document. Missing keys keep defaults.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::InvalidConfig`] on malformed TOML, or the
    /// validation error for the first bad field.
    pub fn from_toml_str(source: &str) -> NavResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| NavError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every field.
    ///
    /// # Errors
    ///
    /// - [`NavError::ZeroBlockSize`] if `block_size` is zero
    /// - [`NavError::InvalidThreshold`] if the threshold is NaN
    pub fn validate(&self) -> NavResult<()> {
        if self.block_size == 0 {
            return Err(NavError::ZeroBlockSize);
        }
        if self.walkable_threshold.is_nan() {
            return Err(NavError::InvalidThreshold(self.walkable_threshold));
        }
        Ok(())
    }

    /// Downsamples `field` at the configured block size.
    ///
    /// # Errors
    ///
    /// See [`NavMeshBuilder::build`].
    pub fn build_mesh(&self, field: &HeightField) -> NavResult<NavMesh> {
        NavMeshBuilder::build(field, self.block_size)
    }
}
