//! # Terrastream Procedural Generation
//!
//! Deterministic terrain for an unbounded, streamed 2D world.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed always produces the same tiles
//! 2. **Seamless**: Tiles sample one continuous noise field, so borders match
//! 3. **Bounded**: Only a window of tiles plus an LRU cache live in memory
//!
//! ## Core Components
//!
//! - `SimplexNoise`: Continuous 2D noise with octave summation
//! - `generate_white_noise` / `generate_fractal_noise`: Grid-based value noise
//! - `TerrainSampler`: Per-tile heightmaps in world coordinates
//! - `Gradient`: 256-entry color ramp from height to pixel
//! - `TileCache`: LRU tile store with dispose hook
//! - `ChunkWindow`: Sliding window of tiles around the focus
//!
//! ## Example
//!
//! ```rust,ignore
//! use terrastream_procedural::{ChunkWindow, Gradient, TerrainConfig, TerrainTileFactory, TileCache, TileCoord};
//!
//! let factory = TerrainTileFactory::new(TerrainConfig::default(), Gradient::terrain())?;
//! let cache = TileCache::new(factory, 20)?;
//! let mut window = ChunkWindow::new(cache, TileCoord::new(0, 0))?;
//!
//! // Player walks one tile north-east
//! let delta = window.move_focus_to_tile(1, 1)?;
//! assert_eq!(delta.loaded.len(), 5);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod cache;
pub mod config;
pub mod error;
pub mod fractal;
pub mod grid;
pub mod noise;
pub mod palette;
pub mod shared;
pub mod terrain;
pub mod tile;
pub mod window;

pub use cache::{CacheStats, TileCache};
pub use config::{GradientConfig, TerrainConfig, WorldConfig};
pub use error::{ProceduralError, ProceduralResult};
pub use fractal::{generate_fractal_noise, generate_white_noise, smooth_octave};
pub use grid::{ColorGrid, HeightField, Rgb};
pub use noise::{SimplexNoise, WorldSeed};
pub use palette::{terrain_stops, Gradient, GRADIENT_SIZE};
pub use shared::SharedTileCache;
pub use terrain::TerrainSampler;
pub use tile::{TerrainTileFactory, Tile, TileCoord, TileFactory, TileState};
pub use window::{ChunkWindow, Direction, ShiftPlan, WindowDelta};
