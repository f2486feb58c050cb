use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Cell, Direction};

/// Read-only wall capability consumed by the pathfinder.
///
/// Whoever owns the maze implements this; the pathfinder never sees the
/// storage behind it.
pub trait WallQuery {
    /// Number of rows of the grid.
    fn rows(&self) -> usize;

    /// Number of columns of the grid.
    fn cols(&self) -> usize;

    /// Whether moving from `cell` one step in `dir` crosses a wall.
    ///
    /// Outward edges of boundary cells must always report `true`.
    fn is_edge_blocked(&self, cell: Cell, dir: Direction) -> bool;

    /// Whether `cell` lies inside the grid.
    fn contains(&self, cell: Cell) -> bool {
        cell.row < self.rows() && cell.col < self.cols()
    }
}

/// Which way an interior edge runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    /// Separates `(row, col)` from `(row, col + 1)`.
    Vertical,
    /// Separates `(row, col)` from `(row + 1, col)`.
    Horizontal,
}

/// Structured identifier of an interior edge between two adjacent cells.
///
/// `(row, col)` always names the cell on the lower-index side of the edge.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[display("{orientation:?}({row}, {col})")]
pub struct EdgeId {
    pub orientation: Orientation,
    pub row: usize,
    pub col: usize,
}

impl EdgeId {
    #[must_use]
    pub const fn vertical(row: usize, col: usize) -> Self {
        Self {
            orientation: Orientation::Vertical,
            row,
            col,
        }
    }

    #[must_use]
    pub const fn horizontal(row: usize, col: usize) -> Self {
        Self {
            orientation: Orientation::Horizontal,
            row,
            col,
        }
    }

    /// The edge crossed when leaving `cell` towards `dir`.
    ///
    /// Returns `None` only when the step would underflow; upper bounds are
    /// the grid's concern ([`WallGrid::edge_at`]).
    #[must_use]
    pub fn from_side(cell: Cell, dir: Direction) -> Option<Self> {
        let Cell { row, col } = cell;
        match dir {
            Direction::Right => Some(Self::vertical(row, col)),
            Direction::Left => Some(Self::vertical(row, col.checked_sub(1)?)),
            Direction::Down => Some(Self::horizontal(row, col)),
            Direction::Up => Some(Self::horizontal(row.checked_sub(1)?, col)),
        }
    }

    /// The two cells this edge separates, lower-index cell first.
    #[must_use]
    pub const fn cells(self) -> (Cell, Cell) {
        let near = Cell::new(self.row, self.col);
        let far = match self.orientation {
            Orientation::Vertical => Cell::new(self.row, self.col + 1),
            Orientation::Horizontal => Cell::new(self.row + 1, self.col),
        };
        (near, far)
    }

    /// Whether this edge is an interior edge of a `rows × cols` grid.
    #[must_use]
    pub const fn fits(self, rows: usize, cols: usize) -> bool {
        match self.orientation {
            Orientation::Vertical => self.row < rows && self.col < cols.saturating_sub(1),
            Orientation::Horizontal => self.row < rows.saturating_sub(1) && self.col < cols,
        }
    }
}

/// Tunables for destructible and player-built walls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WallGridConfig {
    /// Lifetime of a built wall, in game time units.
    pub built_wall_duration: f64,
    /// Maximum number of built walls standing at once.
    pub max_built_walls: usize,
    /// Health every wall starts with.
    pub wall_max_health: f32,
}

impl Default for WallGridConfig {
    fn default() -> Self {
        Self {
            built_wall_duration: 10.0,
            max_built_walls: 10,
            wall_max_health: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, derive_more::IsVariant)]
pub enum WallKind {
    /// Part of the generated maze.
    Maze,
    /// Raised during play; disappears at `expires_at`.
    Built { expires_at: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wall {
    pub kind: WallKind,
    pub health: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, derive_more::IsVariant)]
pub enum DamageOutcome {
    /// No wall stands on the edge.
    Missing,
    Damaged { remaining: f32 },
    /// Health reached zero; the edge is open now.
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum BuildOutcome {
    Built(EdgeId),
    /// A built wall already stood there and was taken down.
    Removed(EdgeId),
    /// A maze wall already occupies the edge.
    Occupied(EdgeId),
    LimitReached,
    /// The side faces the outer boundary.
    Boundary,
}

/// Rectangular maze with per-edge walls.
///
/// Interior walls are stored in an ordered map keyed by [`EdgeId`]; the outer
/// boundary is implicit and indestructible.
#[derive(Debug, Clone)]
pub struct WallGrid {
    rows: usize,
    cols: usize,
    config: WallGridConfig,
    walls: BTreeMap<EdgeId, Wall>,
}

impl WallGrid {
    /// A grid with no interior walls.
    #[must_use]
    pub fn open(rows: usize, cols: usize, config: WallGridConfig) -> Self {
        assert!(rows > 0 && cols > 0, "grid must have at least one cell");
        Self {
            rows,
            cols,
            config,
            walls: BTreeMap::new(),
        }
    }

    /// A grid with every interior wall standing, ready to be carved.
    #[must_use]
    pub fn enclosed(rows: usize, cols: usize, config: WallGridConfig) -> Self {
        let mut grid = Self::open(rows, cols, config);
        let vertical = (0..rows).flat_map(|r| (0..cols - 1).map(move |c| EdgeId::vertical(r, c)));
        let horizontal =
            (0..rows - 1).flat_map(|r| (0..cols).map(move |c| EdgeId::horizontal(r, c)));
        for edge in vertical.chain(horizontal) {
            grid.insert_wall(edge);
        }
        grid
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn config(&self) -> &WallGridConfig {
        &self.config
    }

    /// The interior edge on side `dir` of `cell`, or `None` on the boundary.
    #[must_use]
    pub fn edge_at(&self, cell: Cell, dir: Direction) -> Option<EdgeId> {
        EdgeId::from_side(cell, dir).filter(|edge| edge.fits(self.rows, self.cols))
    }

    #[must_use]
    pub fn has_wall(&self, edge: EdgeId) -> bool {
        self.walls.contains_key(&edge)
    }

    #[must_use]
    pub fn wall(&self, edge: EdgeId) -> Option<&Wall> {
        self.walls.get(&edge)
    }

    /// All standing walls in edge order.
    pub fn walls(&self) -> impl Iterator<Item = (EdgeId, &Wall)> + '_ {
        self.walls.iter().map(|(edge, wall)| (*edge, wall))
    }

    /// Raises a maze wall at full health. Returns `false` if one already stood.
    ///
    /// # Panics
    ///
    /// Panics if `edge` is not an interior edge of this grid.
    pub fn insert_wall(&mut self, edge: EdgeId) -> bool {
        assert!(
            edge.fits(self.rows, self.cols),
            "edge {edge} outside {}x{} grid",
            self.rows,
            self.cols
        );
        if self.walls.contains_key(&edge) {
            return false;
        }
        self.walls.insert(
            edge,
            Wall {
                kind: WallKind::Maze,
                health: self.config.wall_max_health,
            },
        );
        true
    }

    pub fn remove_wall(&mut self, edge: EdgeId) -> Option<Wall> {
        self.walls.remove(&edge)
    }

    /// Applies damage to the wall on `edge`, opening the edge at zero health.
    pub fn damage_wall(&mut self, edge: EdgeId, amount: f32) -> DamageOutcome {
        let Some(wall) = self.walls.get_mut(&edge) else {
            return DamageOutcome::Missing;
        };
        wall.health = (wall.health - amount).max(0.0);
        if wall.health > 0.0 {
            return DamageOutcome::Damaged {
                remaining: wall.health,
            };
        }
        self.walls.remove(&edge);
        tracing::debug!(%edge, "wall destroyed");
        DamageOutcome::Destroyed
    }

    #[must_use]
    pub fn built_wall_count(&self) -> usize {
        self.walls.values().filter(|w| w.kind.is_built()).count()
    }

    /// Builds a temporary wall on side `dir` of `cell`, or takes down the
    /// built wall already standing there.
    pub fn toggle_built_wall(&mut self, cell: Cell, dir: Direction, now: f64) -> BuildOutcome {
        let Some(edge) = self.edge_at(cell, dir) else {
            return BuildOutcome::Boundary;
        };
        match self.walls.get(&edge).map(|w| w.kind) {
            Some(WallKind::Built { .. }) => {
                self.walls.remove(&edge);
                tracing::debug!(%edge, "built wall removed");
                return BuildOutcome::Removed(edge);
            }
            Some(WallKind::Maze) => return BuildOutcome::Occupied(edge),
            None => {}
        }
        if self.built_wall_count() >= self.config.max_built_walls {
            return BuildOutcome::LimitReached;
        }
        let expires_at = now + self.config.built_wall_duration;
        self.walls.insert(
            edge,
            Wall {
                kind: WallKind::Built { expires_at },
                health: self.config.wall_max_health,
            },
        );
        tracing::debug!(%edge, expires_at, "built wall raised");
        BuildOutcome::Built(edge)
    }

    /// Removes every built wall whose lifetime ended at or before `now`.
    pub fn expire_built_walls(&mut self, now: f64) -> Vec<EdgeId> {
        let expired: Vec<EdgeId> = self
            .walls
            .iter()
            .filter(|(_, wall)| matches!(wall.kind, WallKind::Built { expires_at } if now >= expires_at))
            .map(|(edge, _)| *edge)
            .collect();
        for edge in &expired {
            self.walls.remove(edge);
        }
        if !expired.is_empty() {
            tracing::debug!(count = expired.len(), "built walls expired");
        }
        expired
    }
}

impl WallQuery for WallGrid {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn is_edge_blocked(&self, cell: Cell, dir: Direction) -> bool {
        self.edge_at(cell, dir)
            .is_none_or(|edge| self.walls.contains_key(&edge))
    }
}
