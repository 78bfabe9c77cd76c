//! # Continuous Terrain Sampling
//!
//! Heights as a function of world position rather than grid index, so tiles
//! generated independently agree wherever their borders touch.

use crate::config::TerrainConfig;
use crate::error::{ProceduralError, ProceduralResult};
use crate::grid::HeightField;
use crate::noise::{SimplexNoise, WorldSeed};

/// Purpose tag for the terrain noise stream.
const TERRAIN_STREAM: u64 = 0x7E44_A1B0;

/// Samples octaved simplex noise at world coordinates, mapped into [0, 1].
pub struct TerrainSampler {
    noise: SimplexNoise,
    lacunarity: f64,
    feature_scale: f64,
}

impl TerrainSampler {
    /// Creates a sampler.
    ///
    /// `feature_scale` is the number of world units spanned by one period of
    /// the base octave.
    #[must_use]
    pub fn new(seed: WorldSeed, lacunarity: f64, feature_scale: f64) -> Self {
        Self {
            noise: SimplexNoise::new(seed.derive(TERRAIN_STREAM)),
            lacunarity,
            feature_scale,
        }
    }

    /// Creates a sampler from validated terrain settings.
    ///
    /// # Errors
    ///
    /// Returns the validation error if `config` is invalid.
    pub fn from_config(config: &TerrainConfig) -> ProceduralResult<Self> {
        config.validate()?;
        Ok(Self::new(config.seed, config.lacunarity, config.feature_scale))
    }

    /// Height at world position `(x, y)`, in [0, 1].
    #[must_use]
    pub fn sample_world(&self, x: f64, y: f64, octaves: u32, persistence: f64) -> f32 {
        let nx = x / self.feature_scale;
        let ny = y / self.feature_scale;
        let value = self.noise.octaved(nx, ny, octaves, persistence, self.lacunarity);
        ((value + 1.0) * 0.5).clamp(0.0, 1.0) as f32
    }

    /// Heightmap for tile `(tile_x, tile_y)`: `size × size` samples spread
    /// evenly over a `tile_size` world-unit square.
    ///
    /// Sample `(i, j)` reads world position
    /// `(tile_x * tile_size + i * tile_size / size, ...)`, so column `size`
    /// of one tile would coincide with column 0 of its eastern neighbour.
    ///
    /// # Errors
    ///
    /// - [`ProceduralError::InvalidDimensions`] if `size` is zero
    /// - [`ProceduralError::InvalidOctaveCount`] if `octaves` is zero
    /// - [`ProceduralError::InvalidPersistence`] for non-positive persistence
    /// - [`ProceduralError::InvalidConfig`] for a non-positive `tile_size`
    pub fn create_height_map(
        &self,
        tile_x: i64,
        tile_y: i64,
        size: usize,
        tile_size: f64,
        octaves: u32,
        persistence: f64,
    ) -> ProceduralResult<HeightField> {
        if octaves == 0 {
            return Err(ProceduralError::InvalidOctaveCount(octaves));
        }
        if !persistence.is_finite() || persistence <= 0.0 {
            return Err(ProceduralError::InvalidPersistence(persistence));
        }
        if !tile_size.is_finite() || tile_size <= 0.0 {
            return Err(ProceduralError::InvalidConfig(format!(
                "tile size must be finite and positive, got {tile_size}"
            )));
        }

        if size == 0 {
            return Err(ProceduralError::InvalidDimensions {
                width: size,
                height: size,
            });
        }
        Ok(self.render_tile(tile_x, tile_y, size, tile_size, octaves, persistence))
    }

    /// [`Self::create_height_map`] without argument checks.
    pub(crate) fn render_tile(
        &self,
        tile_x: i64,
        tile_y: i64,
        size: usize,
        tile_size: f64,
        octaves: u32,
        persistence: f64,
    ) -> HeightField {
        let origin_x = tile_x as f64 * tile_size;
        let origin_y = tile_y as f64 * tile_size;
        let step = tile_size / size as f64;

        HeightField::from_fn(size, size, |i, j| {
            let wx = origin_x + i as f64 * step;
            let wy = origin_y + j as f64 * step;
            self.sample_world(wx, wy, octaves, persistence)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampler() -> TerrainSampler {
        TerrainSampler::new(WorldSeed::new(42), 2.0, 500.0)
    }

    #[test]
    fn test_height_map_in_unit_range() {
        let field = sampler().create_height_map(-3, 7, 32, 1000.0, 5, 0.5).unwrap();
        assert_eq!((field.width(), field.height()), (32, 32));
        assert!(field.values().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_neighbouring_tiles_share_border() {
        let s = sampler();
        let size = 16;
        let east = s.create_height_map(1, 0, size, 1000.0, 4, 0.5).unwrap();
        let north = s.create_height_map(0, 1, size, 1000.0, 4, 0.5).unwrap();

        for j in 0..size {
            // One step past the last column of tile (0, 0).
            let wy = j as f64 * (1000.0 / size as f64);
            assert_eq!(east.get(0, j), Some(s.sample_world(1000.0, wy, 4, 0.5)));
        }
        for i in 0..size {
            let wx = i as f64 * (1000.0 / size as f64);
            assert_eq!(north.get(i, 0), Some(s.sample_world(wx, 1000.0, 4, 0.5)));
        }
    }

    #[test]
    fn test_adjacent_samples_blend() {
        let s = sampler();
        let field = s.create_height_map(0, 0, 64, 1000.0, 3, 0.5).unwrap();
        let east = s.create_height_map(1, 0, 64, 1000.0, 3, 0.5).unwrap();

        for j in 0..64 {
            let last = field.get(63, j).unwrap_or_default();
            let first = east.get(0, j).unwrap_or_default();
            assert!((last - first).abs() < 0.1, "seam at row {j}: {last} vs {first}");
        }
    }

    #[test]
    fn test_rejects_bad_arguments() {
        let s = sampler();
        assert_eq!(
            s.create_height_map(0, 0, 8, 1000.0, 0, 0.5),
            Err(ProceduralError::InvalidOctaveCount(0))
        );
        assert!(s.create_height_map(0, 0, 0, 1000.0, 2, 0.5).is_err());
        assert!(s.create_height_map(0, 0, 8, -1.0, 2, 0.5).is_err());
    }

    #[test]
    fn test_deterministic_per_seed() {
        let a = sampler().create_height_map(5, 5, 16, 1000.0, 4, 0.5).unwrap();
        let b = sampler().create_height_map(5, 5, 16, 1000.0, 4, 0.5).unwrap();
        assert_eq!(a, b);
    }
}
