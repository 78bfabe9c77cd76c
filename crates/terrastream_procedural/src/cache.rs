//! # Tile Cache
//!
//! Bounded LRU store from [`TileCoord`] to generated tiles.
//!
//! ## Policy
//!
//! - Every `get` (hit or miss) makes the tile the most recently used
//! - A miss asks the [`TileFactory`] for the tile and inserts it
//! - When the size exceeds the capacity, the single least recently used
//!   tile is evicted and handed to [`TileFactory::dispose`]
//! - `release` only marks a tile passive; it stays cached
//!
//! Recency is a monotonically increasing stamp per access, indexed in a
//! `BTreeMap` so finding the oldest entry is O(log n).

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{ProceduralError, ProceduralResult};
use crate::tile::{Tile, TileCoord, TileFactory, TileState};

/// Running counters for a cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests served from the cache.
    pub hits: u64,
    /// Tiles generated and inserted.
    pub misses: u64,
    /// Tiles evicted to stay within capacity.
    pub evictions: u64,
}

struct Entry {
    tile: Arc<Tile>,
    state: TileState,
    stamp: u64,
}

/// LRU-bounded tile store backed by a factory.
pub struct TileCache<F: TileFactory> {
    factory: Arc<F>,
    capacity: usize,
    entries: HashMap<TileCoord, Entry>,
    /// Access stamp -> coordinate, oldest first.
    recency: BTreeMap<u64, TileCoord>,
    clock: u64,
    stats: CacheStats,
}

impl<F: TileFactory> TileCache<F> {
    /// Creates an empty cache holding at most `capacity` tiles.
    ///
    /// # Errors
    ///
    /// Returns [`ProceduralError::ZeroCapacity`] if `capacity` is zero.
    pub fn new(factory: F, capacity: usize) -> ProceduralResult<Self> {
        Self::with_shared_factory(Arc::new(factory), capacity)
    }

    /// Like [`TileCache::new`], for a factory that is shared elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`ProceduralError::ZeroCapacity`] if `capacity` is zero.
    pub fn with_shared_factory(factory: Arc<F>, capacity: usize) -> ProceduralResult<Self> {
        if capacity == 0 {
            return Err(ProceduralError::ZeroCapacity);
        }
        Ok(Self {
            factory,
            capacity,
            entries: HashMap::with_capacity(capacity + 1),
            recency: BTreeMap::new(),
            clock: 0,
            stats: CacheStats::default(),
        })
    }

    /// Returns the tile at `coord`, generating it on a miss.
    ///
    /// The tile becomes active and most recently used.
    pub fn get(&mut self, coord: TileCoord) -> Arc<Tile> {
        if let Some(tile) = self.touch(coord) {
            return tile;
        }
        let tile = Arc::new(self.factory.create(coord));
        self.admit(tile)
    }

    /// Marks the tile passive without evicting it.
    ///
    /// Returns `false` if the tile is not cached.
    pub fn release(&mut self, coord: TileCoord) -> bool {
        match self.entries.get_mut(&coord) {
            Some(entry) => {
                entry.state = TileState::Passive;
                trace!(x = coord.x, y = coord.y, "released tile");
                true
            }
            None => false,
        }
    }

    /// Cached tile without touching recency or state.
    #[must_use]
    pub fn peek(&self, coord: TileCoord) -> Option<Arc<Tile>> {
        self.entries.get(&coord).map(|entry| Arc::clone(&entry.tile))
    }

    /// Whether `coord` is cached.
    #[must_use]
    pub fn contains(&self, coord: TileCoord) -> bool {
        self.entries.contains_key(&coord)
    }

    /// Activation state of a cached tile.
    #[must_use]
    pub fn state(&self, coord: TileCoord) -> Option<TileState> {
        self.entries.get(&coord).map(|entry| entry.state)
    }

    /// Number of cached tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of cached tiles.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Hit, miss and eviction counters.
    #[must_use]
    pub const fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Cached coordinates, least recently used first.
    #[must_use]
    pub fn lru_order(&self) -> Vec<TileCoord> {
        self.recency.values().copied().collect()
    }

    /// The factory backing this cache.
    #[must_use]
    pub fn factory(&self) -> &Arc<F> {
        &self.factory
    }

    /// Drops every tile, disposing each one.
    pub fn clear(&mut self) {
        for (_, coord) in std::mem::take(&mut self.recency) {
            if let Some(entry) = self.entries.remove(&coord) {
                self.factory.dispose(&entry.tile);
            }
        }
        debug_assert!(self.entries.is_empty());
        debug!("tile cache cleared");
    }

    /// Refreshes a cached tile on a hit.
    pub(crate) fn touch(&mut self, coord: TileCoord) -> Option<Arc<Tile>> {
        let stamp = self.next_stamp();
        let entry = self.entries.get_mut(&coord)?;
        self.recency.remove(&entry.stamp);
        entry.stamp = stamp;
        entry.state = TileState::Active;
        self.recency.insert(stamp, coord);
        self.stats.hits += 1;
        trace!(x = coord.x, y = coord.y, "tile cache hit");
        Some(Arc::clone(&entry.tile))
    }

    /// Inserts a freshly generated tile, evicting as needed.
    ///
    /// If another writer cached the same coordinate first, that tile wins
    /// and is returned instead.
    pub(crate) fn admit(&mut self, tile: Arc<Tile>) -> Arc<Tile> {
        let coord = tile.coord();
        if let Some(existing) = self.touch(coord) {
            return existing;
        }

        let stamp = self.next_stamp();
        self.entries.insert(
            coord,
            Entry {
                tile: Arc::clone(&tile),
                state: TileState::Active,
                stamp,
            },
        );
        self.recency.insert(stamp, coord);
        self.stats.misses += 1;
        debug!(x = coord.x, y = coord.y, size = self.entries.len(), "generated tile");

        while self.entries.len() > self.capacity {
            self.evict_oldest();
        }
        tile
    }

    fn evict_oldest(&mut self) {
        let Some((stamp, coord)) = self.recency.pop_first() else {
            return;
        };
        if let Some(entry) = self.entries.remove(&coord) {
            self.stats.evictions += 1;
            debug!(x = coord.x, y = coord.y, stamp, "evicted tile");
            self.factory.dispose(&entry.tile);
        }
    }

    fn next_stamp(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}
