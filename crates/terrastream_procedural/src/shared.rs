//! # Shared Tile Cache
//!
//! A [`TileCache`] behind a `parking_lot::Mutex` for generating tiles on
//! several threads.
//!
//! The lock only guards lookup, insert and evict. Tile generation runs with
//! the lock released, so two threads may build the same tile at once; the
//! first insert wins and the duplicate is dropped.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::{CacheStats, TileCache};
use crate::error::ProceduralResult;
use crate::tile::{Tile, TileCoord, TileFactory, TileState};

/// Thread-safe tile cache with parallel prefetch.
pub struct SharedTileCache<F: TileFactory> {
    factory: Arc<F>,
    inner: Mutex<TileCache<F>>,
}

impl<F> SharedTileCache<F>
where
    F: TileFactory + Send + Sync,
{
    /// Creates an empty shared cache.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ProceduralError::ZeroCapacity`] if `capacity` is zero.
    pub fn new(factory: F, capacity: usize) -> ProceduralResult<Self> {
        let factory = Arc::new(factory);
        let cache = TileCache::with_shared_factory(Arc::clone(&factory), capacity)?;
        Ok(Self {
            factory,
            inner: Mutex::new(cache),
        })
    }

    /// Returns the tile at `coord`, generating it outside the lock on a miss.
    pub fn get(&self, coord: TileCoord) -> Arc<Tile> {
        if let Some(tile) = self.inner.lock().touch(coord) {
            return tile;
        }
        let tile = Arc::new(self.factory.create(coord));
        self.inner.lock().admit(tile)
    }

    /// Generates every uncached coordinate in parallel, then inserts them.
    ///
    /// Returns the number of tiles generated. Inserting more tiles than the
    /// capacity evicts the earliest of them again.
    pub fn prefetch(&self, coords: &[TileCoord]) -> usize {
        let missing: Vec<TileCoord> = {
            let cache = self.inner.lock();
            let mut seen = HashSet::new();
            coords
                .iter()
                .copied()
                .filter(|&coord| !cache.contains(coord) && seen.insert(coord))
                .collect()
        };
        if missing.is_empty() {
            return 0;
        }

        let workers = thread::available_parallelism()
            .map_or(1, std::num::NonZeroUsize::get)
            .min(missing.len());
        let per_worker = missing.len().div_ceil(workers);
        let factory = &self.factory;

        let generated: Vec<Tile> = thread::scope(|scope| {
            let handles: Vec<_> = missing
                .chunks(per_worker)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk.iter().map(|&coord| factory.create(coord)).collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|handle| match handle.join() {
                    Ok(tiles) => tiles,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        });

        let count = generated.len();
        let mut cache = self.inner.lock();
        for tile in generated {
            let _ = cache.admit(Arc::new(tile));
        }
        debug!(count, workers, "prefetched tiles");
        count
    }

    /// Marks a tile passive. Returns `false` if it is not cached.
    pub fn release(&self, coord: TileCoord) -> bool {
        self.inner.lock().release(coord)
    }

    /// Activation state of a cached tile.
    #[must_use]
    pub fn state(&self, coord: TileCoord) -> Option<TileState> {
        self.inner.lock().state(coord)
    }

    /// Whether `coord` is cached.
    #[must_use]
    pub fn contains(&self, coord: TileCoord) -> bool {
        self.inner.lock().contains(coord)
    }

    /// Number of cached tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether the cache holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Hit, miss and eviction counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::RecordingFactory;

    fn coords(n: i64) -> Vec<TileCoord> {
        (0..n).map(|i| TileCoord::new(i, -i)).collect()
    }

    #[test]
    fn test_prefetch_generates_each_missing_tile_once() {
        let shared = SharedTileCache::new(RecordingFactory::default(), 16).unwrap();
        let mut request = coords(8);
        request.extend(coords(4));

        assert_eq!(shared.prefetch(&request), 8);
        assert_eq!(shared.len(), 8);
        assert_eq!(shared.prefetch(&request), 0);
        assert_eq!(shared.stats().misses, 8);
    }

    #[test]
    fn test_prefetch_respects_capacity() {
        let shared = SharedTileCache::new(RecordingFactory::default(), 4).unwrap();
        assert_eq!(shared.prefetch(&coords(10)), 10);
        assert_eq!(shared.len(), 4);
        assert_eq!(shared.stats().evictions, 6);
    }

    #[test]
    fn test_concurrent_gets_share_one_cache() {
        let shared = SharedTileCache::new(RecordingFactory::default(), 32).unwrap();
        thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for coord in coords(16) {
                        let tile = shared.get(coord);
                        assert_eq!(tile.coord(), coord);
                    }
                });
            }
        });

        assert_eq!(shared.len(), 16);
        assert_eq!(shared.state(TileCoord::new(3, -3)), Some(TileState::Active));
        assert!(shared.release(TileCoord::new(3, -3)));
        assert_eq!(shared.state(TileCoord::new(3, -3)), Some(TileState::Passive));
    }
}
