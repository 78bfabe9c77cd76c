//! # World Configuration
//!
//! Tunables handed to the core as plain values. Callers may build them in
//! code or parse them from a TOML string; the core never touches the disk.
//!
//! ```toml
//! cache_capacity = 20
//!
//! [terrain]
//! seed = 42
//! octaves = 6
//! persistence = 0.5
//!
//! [gradient]
//! stops = [[0, 0, 90], [250, 250, 250]]
//! widths = [200, 56]
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ProceduralError, ProceduralResult};
use crate::grid::Rgb;
use crate::noise::WorldSeed;
use crate::palette::{terrain_stops, Gradient};

/// Noise and tile-shape parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Seed every tile derives from.
    pub seed: WorldSeed,
    /// Noise layers per sample.
    pub octaves: u32,
    /// Amplitude decay per octave.
    pub persistence: f64,
    /// Frequency growth per octave.
    pub lacunarity: f64,
    /// World units covered by one period of the base octave.
    pub feature_scale: f64,
    /// Samples along each side of a tile.
    pub tile_resolution: usize,
    /// Side of a tile in world units.
    pub tile_world_size: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: WorldSeed::default(),
            octaves: 6,
            persistence: 0.5,
            lacunarity: 2.0,
            feature_scale: 2_000.0,
            tile_resolution: 128,
            tile_world_size: 1_000.0,
        }
    }
}

impl TerrainConfig {
    /// Checks every field.
    ///
    /// # Errors
    ///
    /// Returns the first invalid parameter found.
    pub fn validate(&self) -> ProceduralResult<()> {
        if self.octaves == 0 {
            return Err(ProceduralError::InvalidOctaveCount(self.octaves));
        }
        if !self.persistence.is_finite() || self.persistence <= 0.0 {
            return Err(ProceduralError::InvalidPersistence(self.persistence));
        }
        if self.tile_resolution == 0 {
            return Err(ProceduralError::InvalidDimensions {
                width: self.tile_resolution,
                height: self.tile_resolution,
            });
        }
        for (name, value) in [
            ("lacunarity", self.lacunarity),
            ("feature_scale", self.feature_scale),
            ("tile_world_size", self.tile_world_size),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ProceduralError::InvalidConfig(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Color stops and band widths for a [`Gradient`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientConfig {
    /// Colors, lowest height first.
    pub stops: Vec<Rgb>,
    /// Entries spent interpolating from each stop to the next.
    pub widths: Vec<usize>,
}

impl Default for GradientConfig {
    fn default() -> Self {
        let (stops, widths) = terrain_stops();
        Self { stops, widths }
    }
}

impl GradientConfig {
    /// Resolves the gradient table.
    ///
    /// # Errors
    ///
    /// See [`Gradient::new`].
    pub fn build(&self) -> ProceduralResult<Gradient> {
        Gradient::new(&self.stops, &self.widths)
    }
}

/// Everything needed to stream a world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Tiles kept in the cache.
    pub cache_capacity: usize,
    /// Window width in tiles (odd).
    pub window_width: usize,
    /// Window height in tiles (odd).
    pub window_height: usize,
    /// Noise parameters.
    pub terrain: TerrainConfig,
    /// Height-to-color ramp.
    pub gradient: GradientConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 20,
            window_width: 3,
            window_height: 3,
            terrain: TerrainConfig::default(),
            gradient: GradientConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Parses and validates a TOML document. Missing keys keep defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ProceduralError::InvalidConfig`] on malformed TOML, or the
    /// validation error for the first bad field.
    pub fn from_toml_str(source: &str) -> ProceduralResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| ProceduralError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration back to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ProceduralError::InvalidConfig`] if serialization fails.
    pub fn to_toml_string(&self) -> ProceduralResult<String> {
        toml::to_string(self).map_err(|e| ProceduralError::InvalidConfig(e.to_string()))
    }

    /// Checks every field.
    ///
    /// # Errors
    ///
    /// Returns the first invalid parameter found.
    pub fn validate(&self) -> ProceduralResult<()> {
        self.terrain.validate()?;
        let _ = self.gradient.build()?;
        if self.cache_capacity == 0 {
            return Err(ProceduralError::ZeroCapacity);
        }
        if self.window_width % 2 == 0 || self.window_height % 2 == 0 {
            return Err(ProceduralError::InvalidWindowSize {
                width: self.window_width,
                height: self.window_height,
            });
        }
        let cells = self.window_width * self.window_height;
        if cells > self.cache_capacity {
            return Err(ProceduralError::WindowExceedsCapacity {
                cells,
                capacity: self.cache_capacity,
            });
        }
        Ok(())
    }
}
