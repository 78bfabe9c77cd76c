//! # A* Pathfinding
//!
//! Grid search over a [`NavMesh`].
//!
//! ## Cost Model
//!
//! - All 8 neighbours are reachable at the same base cost of 1
//! - Each step adds `10 * |Δh|` for the height change between cells
//! - Cells above the walkability threshold are skipped entirely
//! - The heuristic is squared Euclidean distance to the goal
//!
//! Closed cells are never reopened, even if a cheaper route to them turns
//! up later. Together with the squared heuristic this trades optimality for
//! fewer expansions; paths are valid but not always the cheapest.
//!
//! Open-set ties on `f` go to the earliest inserted entry, so results are
//! deterministic.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use tracing::debug;

use crate::error::{NavError, NavResult};
use crate::navmesh::NavMesh;

/// Base cost of any single step.
const STEP_COST: f64 = 1.0;

/// Extra cost per unit of height change.
const SLOPE_WEIGHT: f64 = 10.0;

/// One cell on a found path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathNode {
    /// Mesh column.
    pub x: usize,
    /// Mesh row.
    pub y: usize,
    /// Cost from the start.
    pub g: f64,
    /// `g` plus the heuristic at this cell.
    pub f: f64,
}

/// Ordered cells from start to goal, both included.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    nodes: Vec<PathNode>,
}

impl Path {
    /// Every cell on the path, start first.
    #[must_use]
    pub fn nodes(&self) -> &[PathNode] {
        &self.nodes
    }

    /// Number of cells, including start and goal.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`; a found path holds at least the start cell.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total cost to reach the goal.
    #[must_use]
    pub fn cost(&self) -> f64 {
        self.nodes.last().map_or(0.0, |node| node.g)
    }

    /// First cell.
    #[must_use]
    pub fn start(&self) -> Option<&PathNode> {
        self.nodes.first()
    }

    /// Last cell.
    #[must_use]
    pub fn goal(&self) -> Option<&PathNode> {
        self.nodes.last()
    }

    /// Whether each cell is one king's move from the previous.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.nodes
            .windows(2)
            .all(|pair| pair[0].x.abs_diff(pair[1].x).max(pair[0].y.abs_diff(pair[1].y)) == 1)
    }

    /// `(x, y)` of each cell, start first.
    #[must_use]
    pub fn cells(&self) -> Vec<(usize, usize)> {
        self.nodes.iter().map(|node| (node.x, node.y)).collect()
    }
}

/// Result of a search that ran to completion.
#[derive(Clone, Debug, PartialEq)]
pub enum PathOutcome {
    /// The goal was reached.
    Found(Path),
    /// The frontier emptied first.
    NotFound,
}

impl PathOutcome {
    /// Whether a path was found.
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// The path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Found(path) => Some(path),
            Self::NotFound => None,
        }
    }

    /// Consumes the outcome, returning the path if any.
    #[must_use]
    pub fn into_path(self) -> Option<Path> {
        match self {
            Self::Found(path) => Some(path),
            Self::NotFound => None,
        }
    }
}

/// Search state for one discovered cell.
struct Node {
    x: usize,
    y: usize,
    g: f64,
    f: f64,
    parent: Option<usize>,
    closed: bool,
}

/// Frontier entry. Stale entries are skipped when popped.
struct OpenEntry {
    f: f64,
    g: f64,
    seq: u64,
    node: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    // Reversed: BinaryHeap is a max-heap and we want the lowest f, then the
    // earliest insertion.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A* search over a borrowed mesh.
pub struct PathFinder<'a> {
    mesh: &'a NavMesh,
}

impl<'a> PathFinder<'a> {
    /// Creates a finder for `mesh`.
    #[must_use]
    pub const fn new(mesh: &'a NavMesh) -> Self {
        Self { mesh }
    }

    /// The mesh being searched.
    #[must_use]
    pub const fn mesh(&self) -> &'a NavMesh {
        self.mesh
    }

    /// Searches from `start` to `goal`, both `(x, y)` mesh cells.
    ///
    /// The start cell is entered regardless of its height; every other cell
    /// must be at or below `walkable_threshold`.
    ///
    /// # Errors
    ///
    /// - [`NavError::OutOfBounds`] if either endpoint is outside the mesh
    /// - [`NavError::InvalidThreshold`] if the threshold is NaN
    pub fn find_path(
        &self,
        start: (usize, usize),
        goal: (usize, usize),
        walkable_threshold: f32,
    ) -> NavResult<PathOutcome> {
        self.mesh.check_bounds(start.0, start.1)?;
        self.mesh.check_bounds(goal.0, goal.1)?;
        if walkable_threshold.is_nan() {
            return Err(NavError::InvalidThreshold(walkable_threshold));
        }

        let mut nodes: Vec<Node> = Vec::new();
        let mut index: HashMap<(usize, usize), usize> = HashMap::new();
        let mut open = BinaryHeap::new();
        let mut seq = 0u64;
        let mut expanded = 0usize;

        let h = heuristic(start, goal);
        nodes.push(Node {
            x: start.0,
            y: start.1,
            g: 0.0,
            f: h,
            parent: None,
            closed: false,
        });
        index.insert(start, 0);
        open.push(OpenEntry {
            f: h,
            g: 0.0,
            seq,
            node: 0,
        });

        while let Some(entry) = open.pop() {
            let current = entry.node;
            if nodes[current].closed || entry.g > nodes[current].g {
                continue;
            }
            nodes[current].closed = true;
            expanded += 1;

            let (cx, cy, cg) = (nodes[current].x, nodes[current].y, nodes[current].g);
            if (cx, cy) == goal {
                let path = reconstruct(&nodes, current);
                debug!(
                    expanded,
                    length = path.len(),
                    cost = path.cost(),
                    "path found"
                );
                return Ok(PathOutcome::Found(path));
            }

            let here = self.height_at(cx, cy);
            for (nx, ny) in self.neighbours(cx, cy) {
                let there = self.height_at(nx, ny);
                if there > f64::from(walkable_threshold) {
                    continue;
                }
                let g = cg + STEP_COST + SLOPE_WEIGHT * (there - here).abs();
                let f = g + heuristic((nx, ny), goal);

                let slot = match index.get(&(nx, ny)) {
                    Some(&existing) => {
                        let node = &mut nodes[existing];
                        if node.closed || g >= node.g {
                            continue;
                        }
                        node.g = g;
                        node.f = f;
                        node.parent = Some(current);
                        existing
                    }
                    None => {
                        nodes.push(Node {
                            x: nx,
                            y: ny,
                            g,
                            f,
                            parent: Some(current),
                            closed: false,
                        });
                        index.insert((nx, ny), nodes.len() - 1);
                        nodes.len() - 1
                    }
                };

                seq += 1;
                open.push(OpenEntry {
                    f,
                    g,
                    seq,
                    node: slot,
                });
            }
        }

        debug!(expanded, ?start, ?goal, "no path");
        Ok(PathOutcome::NotFound)
    }

    fn height_at(&self, x: usize, y: usize) -> f64 {
        self.mesh.get(x, y).map_or(f64::INFINITY, f64::from)
    }

    fn neighbours(&self, x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        (-1i64..=1)
            .flat_map(|dy| (-1i64..=1).map(move |dx| (dx, dy)))
            .filter(|&step| step != (0, 0))
            .filter_map(move |(dx, dy)| {
                let nx = x.checked_add_signed(dx as isize)?;
                let ny = y.checked_add_signed(dy as isize)?;
                self.mesh.contains(nx, ny).then_some((nx, ny))
            })
    }
}

fn heuristic(from: (usize, usize), goal: (usize, usize)) -> f64 {
    let dx = from.0.abs_diff(goal.0) as f64;
    let dy = from.1.abs_diff(goal.1) as f64;
    dx * dx + dy * dy
}

fn reconstruct(nodes: &[Node], goal: usize) -> Path {
    let mut path = Vec::new();
    let mut cursor = Some(goal);
    while let Some(i) = cursor {
        let node = &nodes[i];
        path.push(PathNode {
            x: node.x,
            y: node.y,
            g: node.g,
            f: node.f,
        });
        cursor = node.parent;
    }
    path.reverse();
    Path { nodes: path }
}
