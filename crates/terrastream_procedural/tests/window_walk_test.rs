//! # Window Walk Integration Test
//!
//! Walks the chunk window across the world and checks that the loaded
//! neighbourhood, the cache bound and the tile seams all hold up.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use terrastream_procedural::{
    ChunkWindow, Gradient, TerrainConfig, TerrainTileFactory, Tile, TileCache, TileCoord,
    TileFactory, WorldConfig,
};

/// Terrain factory that counts disposals.
struct CountingFactory {
    inner: TerrainTileFactory,
    disposed: Arc<AtomicUsize>,
}

impl TileFactory for CountingFactory {
    fn create(&self, coord: TileCoord) -> Tile {
        self.inner.create(coord)
    }

    fn dispose(&self, _tile: &Tile) {
        self.disposed.fetch_add(1, Ordering::Relaxed);
    }
}

fn small_terrain() -> TerrainConfig {
    TerrainConfig {
        tile_resolution: 16,
        octaves: 4,
        ..TerrainConfig::default()
    }
}

fn counting_window(capacity: usize) -> (ChunkWindow<CountingFactory>, Arc<AtomicUsize>) {
    let disposed = Arc::new(AtomicUsize::new(0));
    let factory = CountingFactory {
        inner: TerrainTileFactory::new(small_terrain(), Gradient::terrain()).unwrap(),
        disposed: Arc::clone(&disposed),
    };
    let cache = TileCache::new(factory, capacity).unwrap();
    (ChunkWindow::new(cache, TileCoord::new(0, 0)).unwrap(), disposed)
}

fn assert_neighbourhood<F: TileFactory>(window: &ChunkWindow<F>) {
    let focus = window.focus();
    let expected: HashSet<TileCoord> = (-1..=1)
        .flat_map(|dy| (-1..=1).map(move |dx| focus.offset(dx, dy)))
        .collect();
    let actual: HashSet<TileCoord> = window.coords().into_iter().collect();
    assert_eq!(actual, expected, "window drifted from focus {focus:?}");
}

/// Test: Walk 200 tiles east, every step keeps the 3×3 invariant.
#[test]
fn test_long_walk_east() {
    let (mut window, disposed) = counting_window(20);

    let start = Instant::now();
    for x in 1..=200 {
        let delta = window.move_focus_to_tile(x, 0).unwrap();
        assert_eq!(delta.loaded.len(), 3);
        assert_eq!(delta.released.len(), 3);
        assert_neighbourhood(&window);
        assert!(window.cache().len() <= 20);
    }

    let stats = window.cache().stats();
    println!("Walked 200 tiles in {:?}", start.elapsed());
    println!("Cache stats: {stats:?}");

    assert_eq!(stats.misses, 9 + 200 * 3);
    assert_eq!(disposed.load(Ordering::Relaxed) as u64, stats.evictions);
    assert_eq!(stats.misses - stats.evictions, window.cache().len() as u64);
}

/// Test: Walk a square loop; returning home hits the cache.
#[test]
fn test_loop_walk_reuses_cache() {
    let (mut window, _) = counting_window(30);
    let route = [(1, 0), (1, 1), (0, 1), (0, 0)];

    for &(x, y) in &route {
        let _ = window.move_focus_to_tile(x, y).unwrap();
        assert_neighbourhood(&window);
    }

    // Every tile touched fits in 30 slots, so nothing was regenerated.
    let stats = window.cache().stats();
    assert_eq!(stats.misses, 16);
    assert_eq!(stats.evictions, 0);
}

/// Test: Diagonal steps release exactly the trailing L of five tiles.
#[test]
fn test_diagonal_walk() {
    let (mut window, _) = counting_window(20);

    for step in 1..=50 {
        let delta = window.move_focus_to_tile(step, step).unwrap();
        assert_eq!(delta.loaded.len(), 5);
        assert_eq!(delta.released.len(), 5);

        let old = TileCoord::new(step - 1, step - 1);
        let released: HashSet<TileCoord> = delta.released.iter().copied().collect();
        let trailing: HashSet<TileCoord> = [(-1, 1), (-1, 0), (-1, -1), (0, -1), (1, -1)]
            .iter()
            .map(|&(dx, dy)| old.offset(dx, dy))
            .collect();
        assert_eq!(released, trailing);
    }
}

/// Test: Neighbouring tiles in the window join without a visible seam.
#[test]
fn test_window_tiles_are_seamless() {
    let (window, _) = counting_window(20);
    let centre = window.tile_at(0, 0).unwrap();
    let east = window.tile_at(1, 0).unwrap();

    let size = centre.heights().width();
    for y in 0..size {
        let last = centre.heights().get(size - 1, y).unwrap();
        let first = east.heights().get(0, y).unwrap();
        assert!((last - first).abs() < 0.25, "seam at row {y}: {last} vs {first}");
    }
}

/// Test: Rejected jumps leave the window intact; teleport recovers.
#[test]
fn test_jump_then_teleport() {
    let (mut window, _) = counting_window(20);
    let before = window.coords();

    assert!(window.move_focus_to_tile(5, 5).is_err());
    assert_eq!(window.coords(), before);

    let delta = window.teleport(5, 5);
    assert_eq!(delta.loaded.len(), 9);
    assert_eq!(delta.released.len(), 9);
    assert_neighbourhood(&window);
}

/// Test: A world config loaded from TOML drives the whole pipeline.
#[test]
fn test_world_from_toml() {
    let config = WorldConfig::from_toml_str(
        r#"
        cache_capacity = 12
        window_width = 3
        window_height = 3

        [terrain]
        seed = 7
        octaves = 3
        tile_resolution = 8
        "#,
    )
    .unwrap();

    let mut window = ChunkWindow::from_config(&config, TileCoord::new(-4, 2)).unwrap();
    for x in -3..=2 {
        let _ = window.move_focus_to_tile(x, 2).unwrap();
    }
    assert_neighbourhood(&window);
    assert!(window.cache().len() <= 12);

    let tile = window.tile_at(0, 0).unwrap();
    assert_eq!(tile.color_grid().as_bytes().len(), 8 * 8 * 3);
}
