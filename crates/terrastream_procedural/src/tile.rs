//! # Tiles
//!
//! A tile is one square of the infinite world grid: its heightmap and the
//! color grid the renderer draws. Tiles are immutable once built and shared
//! as `Arc<Tile>`; whether a tile is active or passive is tracked by the
//! cache that owns it, not by the tile.

use crate::config::TerrainConfig;
use crate::error::ProceduralResult;
use crate::grid::{ColorGrid, HeightField};
use crate::palette::Gradient;
use crate::terrain::TerrainSampler;

/// Integer position of a tile in the unbounded world grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    /// Column, growing east.
    pub x: i64,
    /// Row, growing north.
    pub y: i64,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Tile containing the world position, for tiles `tile_world_size` wide.
    ///
    /// Floors toward negative infinity, so `-0.5` lands in tile `-1`.
    #[inline]
    #[must_use]
    pub fn from_world_pos(world_x: f64, world_y: f64, tile_world_size: f64) -> Self {
        Self {
            x: (world_x / tile_world_size).floor() as i64,
            y: (world_y / tile_world_size).floor() as i64,
        }
    }

    /// World position of the tile's origin corner.
    #[inline]
    #[must_use]
    pub fn world_origin(self, tile_world_size: f64) -> (f64, f64) {
        (self.x as f64 * tile_world_size, self.y as f64 * tile_world_size)
    }

    /// The coordinate `(dx, dy)` tiles away.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i64, dy: i64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Whether a cached tile is part of the visible window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileState {
    /// Requested recently; in view.
    Active,
    /// Released by the window but still cached.
    Passive,
}

/// One generated tile.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    coord: TileCoord,
    heights: HeightField,
    colors: ColorGrid,
}

impl Tile {
    /// Assembles a tile from its parts.
    #[must_use]
    pub fn new(coord: TileCoord, heights: HeightField, colors: ColorGrid) -> Self {
        Self {
            coord,
            heights,
            colors,
        }
    }

    /// Position in the tile grid.
    #[inline]
    #[must_use]
    pub const fn coord(&self) -> TileCoord {
        self.coord
    }

    /// Source heightmap.
    #[inline]
    #[must_use]
    pub fn heights(&self) -> &HeightField {
        &self.heights
    }

    /// Pixels for the renderer.
    #[inline]
    #[must_use]
    pub fn color_grid(&self) -> &ColorGrid {
        &self.colors
    }
}

/// Builds tiles on cache misses and hears about evictions.
pub trait TileFactory {
    /// Generates the tile at `coord`.
    fn create(&self, coord: TileCoord) -> Tile;

    /// Called once for every tile the cache evicts or clears.
    fn dispose(&self, _tile: &Tile) {}
}

/// Noise-plus-gradient tile factory used by the streaming world.
pub struct TerrainTileFactory {
    sampler: TerrainSampler,
    gradient: Gradient,
    config: TerrainConfig,
}

impl TerrainTileFactory {
    /// Creates a factory from terrain settings and a color ramp.
    ///
    /// # Errors
    ///
    /// Returns the validation error if `config` is invalid.
    pub fn new(config: TerrainConfig, gradient: Gradient) -> ProceduralResult<Self> {
        let sampler = TerrainSampler::from_config(&config)?;
        Ok(Self {
            sampler,
            gradient,
            config,
        })
    }

    /// Terrain settings in use.
    #[must_use]
    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// The gradient applied to every tile.
    #[must_use]
    pub fn gradient(&self) -> &Gradient {
        &self.gradient
    }
}

impl TileFactory for TerrainTileFactory {
    fn create(&self, coord: TileCoord) -> Tile {
        let TerrainConfig {
            octaves,
            persistence,
            tile_resolution,
            tile_world_size,
            ..
        } = self.config;

        let heights = self.sampler.render_tile(
            coord.x,
            coord.y,
            tile_resolution,
            tile_world_size,
            octaves,
            persistence,
        );
        let colors = self.gradient.colorize(&heights);
        Tile::new(coord, heights, colors)
    }
}
