//! # Chunk Window
//!
//! Keeps a `W × H` block of tiles (3×3 by default) loaded around a focal
//! tile, shifting it one tile at a time as the focus moves.
//!
//! ## Cell Layout
//!
//! Cells are stored row-major. Cell `(col, row)` holds the tile at
//! `focus + (col - W/2, row - H/2)`, so row 0 is the southern edge and
//! column 0 the western edge. North is `+y`.
//!
//! ## Shifting
//!
//! A single-step move is classified by the [`Direction`] lookup table and
//! turned into a [`ShiftPlan`]:
//!
//! - **kept** cells slide to their new slot
//! - **released** cells on the trailing edge are marked passive in the cache
//! - **loaded** cells on the leading edge are fetched from the cache
//!
//! An orthogonal move on a 3×3 window releases and loads 3 tiles; a
//! diagonal move releases and loads 5.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::TileCache;
use crate::config::WorldConfig;
use crate::error::{ProceduralError, ProceduralResult};
use crate::tile::{TerrainTileFactory, Tile, TileCoord, TileFactory};

/// Direction of a single-tile focus step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// No movement.
    Stay,
    /// `(0, +1)`
    North,
    /// `(+1, +1)`
    NorthEast,
    /// `(+1, 0)`
    East,
    /// `(+1, -1)`
    SouthEast,
    /// `(0, -1)`
    South,
    /// `(-1, -1)`
    SouthWest,
    /// `(-1, 0)`
    West,
    /// `(-1, +1)`
    NorthWest,
}

/// Step lookup, indexed by `[dy + 1][dx + 1]`.
const STEP_TABLE: [[Direction; 3]; 3] = [
    [Direction::SouthWest, Direction::South, Direction::SouthEast],
    [Direction::West, Direction::Stay, Direction::East],
    [Direction::NorthWest, Direction::North, Direction::NorthEast],
];

impl Direction {
    /// Classifies a step, or `None` if either component leaves [-1, 1].
    #[must_use]
    pub fn from_step(dx: i64, dy: i64) -> Option<Self> {
        let col = usize::try_from(dx.checked_add(1)?).ok()?;
        let row = usize::try_from(dy.checked_add(1)?).ok()?;
        STEP_TABLE.get(row)?.get(col).copied()
    }

    /// The `(dx, dy)` this direction moves by.
    #[must_use]
    pub const fn delta(self) -> (i64, i64) {
        match self {
            Self::Stay => (0, 0),
            Self::North => (0, 1),
            Self::NorthEast => (1, 1),
            Self::East => (1, 0),
            Self::SouthEast => (1, -1),
            Self::South => (0, -1),
            Self::SouthWest => (-1, -1),
            Self::West => (-1, 0),
            Self::NorthWest => (-1, 1),
        }
    }

    /// Whether both axes change.
    #[must_use]
    pub const fn is_diagonal(self) -> bool {
        let (dx, dy) = self.delta();
        dx != 0 && dy != 0
    }

    /// How the cells of a `width × height` window move for this step.
    #[must_use]
    pub fn plan(self, width: usize, height: usize) -> ShiftPlan {
        let (dx, dy) = self.delta();
        let mut plan = ShiftPlan::default();
        let mut filled = vec![false; width * height];

        for row in 0..height {
            for col in 0..width {
                let from = row * width + col;
                let target_col = col as i64 - dx;
                let target_row = row as i64 - dy;
                let inside = (0..width as i64).contains(&target_col)
                    && (0..height as i64).contains(&target_row);
                if inside {
                    let to = target_row as usize * width + target_col as usize;
                    plan.kept.push((from, to));
                    filled[to] = true;
                } else {
                    plan.released.push(from);
                }
            }
        }

        plan.loaded = filled
            .iter()
            .enumerate()
            .filter_map(|(index, &done)| (!done).then_some(index))
            .collect();
        plan
    }
}

/// Cell movements for one window step. All values are cell indices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShiftPlan {
    /// `(old index, new index)` for cells that stay in view.
    pub kept: Vec<(usize, usize)>,
    /// New indices that need a freshly fetched tile.
    pub loaded: Vec<usize>,
    /// Old indices that fall out of view.
    pub released: Vec<usize>,
}

/// What a focus change did to the window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowDelta {
    /// Step taken, or `None` for a teleport.
    pub direction: Option<Direction>,
    /// Coordinates that entered the window.
    pub loaded: Vec<TileCoord>,
    /// Coordinates that left the window and were released.
    pub released: Vec<TileCoord>,
}

impl WindowDelta {
    fn unchanged() -> Self {
        Self {
            direction: Some(Direction::Stay),
            loaded: Vec::new(),
            released: Vec::new(),
        }
    }

    /// Whether nothing entered or left.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty() && self.released.is_empty()
    }
}

/// Sliding window of loaded tiles around a focal tile.
pub struct ChunkWindow<F: TileFactory> {
    cache: TileCache<F>,
    focus: TileCoord,
    width: usize,
    height: usize,
    cells: Vec<Arc<Tile>>,
}

impl<F: TileFactory> ChunkWindow<F> {
    /// Creates a 3×3 window around `focus`, loading all nine tiles.
    ///
    /// # Errors
    ///
    /// Returns [`ProceduralError::WindowExceedsCapacity`] if the cache holds
    /// fewer than nine tiles.
    pub fn new(cache: TileCache<F>, focus: TileCoord) -> ProceduralResult<Self> {
        Self::with_size(cache, focus, 3, 3)
    }

    /// Creates a `width × height` window around `focus`.
    ///
    /// # Errors
    ///
    /// - [`ProceduralError::InvalidWindowSize`] unless both sides are odd
    /// - [`ProceduralError::WindowExceedsCapacity`] if the window would not
    ///   fit in the cache
    pub fn with_size(
        mut cache: TileCache<F>,
        focus: TileCoord,
        width: usize,
        height: usize,
    ) -> ProceduralResult<Self> {
        if width % 2 == 0 || height % 2 == 0 {
            return Err(ProceduralError::InvalidWindowSize { width, height });
        }
        let cells = width * height;
        if cells > cache.capacity() {
            return Err(ProceduralError::WindowExceedsCapacity {
                cells,
                capacity: cache.capacity(),
            });
        }

        let cells = (0..cells)
            .map(|index| cache.get(Self::coord_for(focus, width, height, index)))
            .collect();
        Ok(Self {
            cache,
            focus,
            width,
            height,
            cells,
        })
    }

    /// Moves the focus to `(new_x, new_y)`, at most one tile on each axis.
    ///
    /// # Errors
    ///
    /// Returns [`ProceduralError::FocusJump`] for larger moves, leaving the
    /// window untouched.
    pub fn move_focus_to_tile(&mut self, new_x: i64, new_y: i64) -> ProceduralResult<WindowDelta> {
        let dx = new_x.saturating_sub(self.focus.x);
        let dy = new_y.saturating_sub(self.focus.y);
        let direction = Direction::from_step(dx, dy).ok_or(ProceduralError::FocusJump { dx, dy })?;
        if direction == Direction::Stay {
            return Ok(WindowDelta::unchanged());
        }

        let plan = direction.plan(self.width, self.height);
        let mut next = self.cells.clone();

        let mut released = Vec::with_capacity(plan.released.len());
        for &index in &plan.released {
            let coord = self.cells[index].coord();
            let _ = self.cache.release(coord);
            released.push(coord);
        }

        for &(from, to) in &plan.kept {
            // Keeps surviving tiles ahead of released ones in LRU order.
            let _ = self.cache.touch(self.cells[from].coord());
            next[to] = Arc::clone(&self.cells[from]);
        }

        self.focus = TileCoord::new(new_x, new_y);
        let mut loaded = Vec::with_capacity(plan.loaded.len());
        for &index in &plan.loaded {
            let coord = Self::coord_for(self.focus, self.width, self.height, index);
            next[index] = self.cache.get(coord);
            loaded.push(coord);
        }
        self.cells = next;

        debug!(
            ?direction,
            x = new_x,
            y = new_y,
            loaded = loaded.len(),
            released = released.len(),
            "window shifted"
        );
        Ok(WindowDelta {
            direction: Some(direction),
            loaded,
            released,
        })
    }

    /// Moves the focus anywhere, reusing tiles that stay in view.
    ///
    /// Single steps go through [`Self::move_focus_to_tile`].
    pub fn teleport(&mut self, new_x: i64, new_y: i64) -> WindowDelta {
        if let Ok(delta) = self.move_focus_to_tile(new_x, new_y) {
            return delta;
        }

        let mut previous: HashMap<TileCoord, Arc<Tile>> = self
            .cells
            .drain(..)
            .map(|tile| (tile.coord(), tile))
            .collect();
        let focus = TileCoord::new(new_x, new_y);

        let coords: Vec<TileCoord> = (0..self.width * self.height)
            .map(|index| Self::coord_for(focus, self.width, self.height, index))
            .collect();

        // Refresh every reused tile before any load can evict it.
        let mut slots: Vec<Option<Arc<Tile>>> = coords
            .iter()
            .map(|coord| {
                let tile = previous.remove(coord)?;
                let _ = self.cache.touch(*coord);
                Some(tile)
            })
            .collect();

        let mut loaded = Vec::new();
        let mut cells = Vec::with_capacity(coords.len());
        for (coord, slot) in coords.into_iter().zip(slots.drain(..)) {
            match slot {
                Some(tile) => cells.push(tile),
                None => {
                    loaded.push(coord);
                    cells.push(self.cache.get(coord));
                }
            }
        }

        let mut released: Vec<TileCoord> = previous.into_keys().collect();
        released.sort_unstable();
        for &coord in &released {
            let _ = self.cache.release(coord);
        }

        warn!(
            from_x = self.focus.x,
            from_y = self.focus.y,
            x = new_x,
            y = new_y,
            loaded = loaded.len(),
            "window teleported"
        );
        self.focus = focus;
        self.cells = cells;
        WindowDelta {
            direction: None,
            loaded,
            released,
        }
    }

    /// Tiles in the window, row-major from the south-west corner.
    #[must_use]
    pub fn current_window(&self) -> &[Arc<Tile>] {
        &self.cells
    }

    /// Coordinates in the window, in cell order.
    #[must_use]
    pub fn coords(&self) -> Vec<TileCoord> {
        self.cells.iter().map(|tile| tile.coord()).collect()
    }

    /// Tile `(dx, dy)` away from the focus, if inside the window.
    #[must_use]
    pub fn tile_at(&self, dx: i64, dy: i64) -> Option<&Arc<Tile>> {
        let col = usize::try_from(dx.checked_add((self.width / 2) as i64)?).ok()?;
        let row = usize::try_from(dy.checked_add((self.height / 2) as i64)?).ok()?;
        if col >= self.width || row >= self.height {
            return None;
        }
        self.cells.get(row * self.width + col)
    }

    /// Current focal tile.
    #[must_use]
    pub const fn focus(&self) -> TileCoord {
        self.focus
    }

    /// Window width in tiles.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Window height in tiles.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// The cache backing the window.
    #[must_use]
    pub fn cache(&self) -> &TileCache<F> {
        &self.cache
    }

    fn coord_for(focus: TileCoord, width: usize, height: usize, index: usize) -> TileCoord {
        let col = (index % width) as i64 - (width / 2) as i64;
        let row = (index / width) as i64 - (height / 2) as i64;
        focus.offset(col, row)
    }
}

impl ChunkWindow<TerrainTileFactory> {
    /// Builds the terrain factory, cache and window described by `config`.
    ///
    /// # Errors
    ///
    /// Returns the first validation error in `config`.
    pub fn from_config(config: &WorldConfig, focus: TileCoord) -> ProceduralResult<Self> {
        config.validate()?;
        let factory = TerrainTileFactory::new(config.terrain.clone(), config.gradient.build()?)?;
        let cache = TileCache::new(factory, config.cache_capacity)?;
        Self::with_size(cache, focus, config.window_width, config.window_height)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::cache::tests::RecordingFactory;
    use crate::tile::TileState;

    fn window(capacity: usize) -> ChunkWindow<RecordingFactory> {
        let cache = TileCache::new(RecordingFactory::default(), capacity).unwrap();
        ChunkWindow::new(cache, TileCoord::new(0, 0)).unwrap()
    }

    fn neighbourhood(focus: TileCoord) -> HashSet<TileCoord> {
        (-1..=1)
            .flat_map(|dy| (-1..=1).map(move |dx| focus.offset(dx, dy)))
            .collect()
    }

    fn assert_covers_focus(window: &ChunkWindow<RecordingFactory>) {
        let coords = window.coords();
        let unique: HashSet<TileCoord> = coords.iter().copied().collect();
        assert_eq!(coords.len(), 9);
        assert_eq!(unique.len(), 9, "duplicate coordinates: {coords:?}");
        assert_eq!(unique, neighbourhood(window.focus()));
    }

    #[test]
    fn test_step_table_covers_all_nine_cases() {
        let mut seen = HashSet::new();
        for dy in -1..=1 {
            for dx in -1..=1 {
                let direction = Direction::from_step(dx, dy).unwrap();
                assert_eq!(direction.delta(), (dx, dy));
                seen.insert(direction);
            }
        }
        assert_eq!(seen.len(), 9);
        assert_eq!(Direction::from_step(2, 0), None);
        assert_eq!(Direction::from_step(0, -2), None);
    }

    #[test]
    fn test_plan_counts() {
        for dy in -1..=1 {
            for dx in -1..=1 {
                let direction = Direction::from_step(dx, dy).unwrap();
                let plan = direction.plan(3, 3);
                let expected = match direction {
                    Direction::Stay => 0,
                    d if d.is_diagonal() => 5,
                    _ => 3,
                };
                assert_eq!(plan.released.len(), expected, "{direction:?}");
                assert_eq!(plan.loaded.len(), expected, "{direction:?}");
                assert_eq!(plan.kept.len(), 9 - expected, "{direction:?}");
            }
        }
    }

    #[test]
    fn test_plan_for_wider_window() {
        let plan = Direction::East.plan(5, 3);
        assert_eq!(plan.released, vec![0, 5, 10]);
        assert_eq!(plan.loaded, vec![4, 9, 14]);
        assert!(plan.kept.contains(&(1, 0)));
    }

    #[test]
    fn test_initial_window_covers_neighbourhood() {
        let window = window(20);
        assert_covers_focus(&window);
        assert_eq!(window.cache().len(), 9);
        assert_eq!(window.tile_at(0, 0).map(|t| t.coord()), Some(TileCoord::new(0, 0)));
        assert_eq!(window.tile_at(-1, 1).map(|t| t.coord()), Some(TileCoord::new(-1, 1)));
        assert!(window.tile_at(2, 0).is_none());
    }

    #[test]
    fn test_orthogonal_move_swaps_three() {
        let mut window = window(20);
        let delta = window.move_focus_to_tile(1, 0).unwrap();

        assert_eq!(delta.direction, Some(Direction::East));
        let released: HashSet<_> = delta.released.iter().copied().collect();
        let loaded: HashSet<_> = delta.loaded.iter().copied().collect();
        assert_eq!(
            released,
            HashSet::from([(-1, -1), (-1, 0), (-1, 1)].map(|(x, y)| TileCoord::new(x, y)))
        );
        assert_eq!(
            loaded,
            HashSet::from([(2, -1), (2, 0), (2, 1)].map(|(x, y)| TileCoord::new(x, y)))
        );
        assert_covers_focus(&window);
    }

    #[test]
    fn test_diagonal_move_swaps_five() {
        let mut window = window(20);
        let delta = window.move_focus_to_tile(1, 1).unwrap();

        // NW, W, SW, S, SE of the old focus.
        let released: HashSet<_> = delta.released.iter().copied().collect();
        let expected = HashSet::from(
            [(-1, 1), (-1, 0), (-1, -1), (0, -1), (1, -1)].map(|(x, y)| TileCoord::new(x, y)),
        );
        assert_eq!(released, expected);
        assert_eq!(delta.loaded.len(), 5);
        assert_covers_focus(&window);

        for coord in &delta.released {
            assert_eq!(window.cache().state(*coord), Some(TileState::Passive));
        }
    }

    #[test]
    fn test_kept_tiles_are_not_refetched() {
        let mut window = window(20);
        let centre = Arc::clone(window.tile_at(0, 0).unwrap());
        let _ = window.move_focus_to_tile(0, 1).unwrap();

        assert!(Arc::ptr_eq(window.tile_at(0, -1).unwrap(), &centre));
        assert_eq!(window.cache().factory().created().len(), 12);
    }

    #[test]
    fn test_jump_rejected_without_mutation() {
        let mut window = window(20);
        let before = window.coords();

        assert_eq!(
            window.move_focus_to_tile(2, 0),
            Err(ProceduralError::FocusJump { dx: 2, dy: 0 })
        );
        assert_eq!(window.coords(), before);
        assert_eq!(window.focus(), TileCoord::new(0, 0));
    }

    #[test]
    fn test_stay_is_a_no_op() {
        let mut window = window(20);
        let delta = window.move_focus_to_tile(0, 0).unwrap();
        assert!(delta.is_empty());
        assert_eq!(delta.direction, Some(Direction::Stay));
    }

    #[test]
    fn test_random_walk_keeps_invariant() {
        let mut window = window(9);
        let steps = [(1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1), (0, -1), (1, -1)];
        let mut state = 0x2545_f491_u64;
        for _ in 0..200 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let (dx, dy) = steps[(state % 8) as usize];
            let focus = window.focus();
            let _ = window.move_focus_to_tile(focus.x + dx, focus.y + dy).unwrap();
            assert_covers_focus(&window);
            assert!(window.cache().len() <= 9);
        }
    }

    #[test]
    fn test_teleport_keeps_visible_tiles_cached() {
        let mut window = window(9);
        let delta = window.teleport(2, 0);
        assert_eq!(delta.loaded.len(), 6);
        assert_covers_focus(&window);

        let disposed = window.cache().factory().disposed();
        for coord in window.coords() {
            assert!(window.cache().contains(coord), "{coord:?} shown but not cached");
            assert!(!disposed.contains(&coord), "{coord:?} shown but disposed");
            assert_eq!(window.cache().state(coord), Some(TileState::Active));
        }
        assert_eq!(disposed.len(), 6);
    }

    #[test]
    fn test_extreme_coordinates_do_not_overflow() {
        let cache = TileCache::new(RecordingFactory::default(), 20).unwrap();
        let mut window = ChunkWindow::new(cache, TileCoord::new(-1, 0)).unwrap();

        assert_eq!(
            window.move_focus_to_tile(i64::MAX, 0),
            Err(ProceduralError::FocusJump { dx: i64::MAX, dy: 0 })
        );
        assert!(matches!(
            window.move_focus_to_tile(0, i64::MIN),
            Err(ProceduralError::FocusJump { .. })
        ));
        assert_eq!(window.focus(), TileCoord::new(-1, 0));

        assert!(window.tile_at(i64::MAX, 0).is_none());
        assert!(window.tile_at(0, i64::MAX).is_none());
        assert!(window.tile_at(i64::MIN, 0).is_none());
        assert_eq!(Direction::from_step(i64::MAX, i64::MAX), None);
    }

    #[test]
    fn test_teleport_reuses_overlap() {
        let mut window = window(20);
        let delta = window.teleport(2, 0);

        assert_eq!(delta.direction, None);
        assert_eq!(delta.loaded.len(), 6);
        assert_eq!(delta.released.len(), 6);
        assert_covers_focus(&window);

        let far = window.teleport(100, -100);
        assert_eq!(far.loaded.len(), 9);
        assert_covers_focus(&window);
    }

    #[test]
    fn test_from_config_builds_terrain_window() {
        let mut config = WorldConfig::default();
        config.terrain.tile_resolution = 8;
        config.window_width = 5;
        config.cache_capacity = 16;
        let mut window = ChunkWindow::from_config(&config, TileCoord::new(3, 3)).unwrap();

        assert_eq!(window.current_window().len(), 15);
        assert_eq!(window.current_window()[0].coord(), TileCoord::new(1, 2));
        let delta = window.move_focus_to_tile(3, 4).unwrap();
        assert_eq!(delta.loaded.len(), 5);
        assert_eq!(window.tile_at(0, 0).unwrap().heights().width(), 8);
    }

    #[test]
    fn test_window_rejects_bad_sizes() {
        let cache = TileCache::new(RecordingFactory::default(), 8).unwrap();
        assert!(matches!(
            ChunkWindow::new(cache, TileCoord::new(0, 0)),
            Err(ProceduralError::WindowExceedsCapacity { cells: 9, capacity: 8 })
        ));

        let cache = TileCache::new(RecordingFactory::default(), 20).unwrap();
        assert!(matches!(
            ChunkWindow::with_size(cache, TileCoord::new(0, 0), 4, 3),
            Err(ProceduralError::InvalidWindowSize { width: 4, height: 3 })
        ));
    }
}
