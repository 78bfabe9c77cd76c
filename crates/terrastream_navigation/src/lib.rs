//! # Terrastream Navigation
//!
//! Walkability grids and A* search over generated terrain.
//!
//! ## Core Components
//!
//! - `NavMeshBuilder`: Block-averages a heightmap into a coarse `NavMesh`
//! - `PathFinder`: A* over the mesh with slope-weighted edges
//! - `NavConfig`: Block size and walkability threshold
//!
//! ## Example
//!
//! ```rust,ignore
//! use terrastream_navigation::{NavMeshBuilder, PathFinder, PathOutcome};
//!
//! let mesh = NavMeshBuilder::build(&heights, 8)?;
//! match PathFinder::new(&mesh).find_path((0, 0), (12, 9), 0.6)? {
//!     PathOutcome::Found(path) => follow(path.cells()),
//!     PathOutcome::NotFound => idle(),
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod navmesh;
pub mod pathfinder;

pub use config::NavConfig;
pub use error::{NavError, NavResult};
pub use navmesh::{NavMesh, NavMeshBuilder, UNKNOWN_HEIGHT};
pub use pathfinder::{Path, PathFinder, PathNode, PathOutcome};
