use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

/// A single square of the maze, addressed by row and column.
///
/// Rows grow "down" and columns grow "right". A cell carries no bounds of its
/// own; whether it lies inside a grid is answered by the grid
/// ([`WallQuery::contains`](crate::WallQuery::contains)).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[display("({row}, {col})")]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance between two cells.
    ///
    /// This is the A* heuristic: admissible and consistent for 4-connected,
    /// unit-cost moves.
    #[must_use]
    pub const fn manhattan_distance(self, other: Self) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// Euclidean distance between cell coordinates.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn euclidean_distance(self, other: Self) -> f32 {
        let dr = self.row.abs_diff(other.row) as f32;
        let dc = self.col.abs_diff(other.col) as f32;
        dr.hypot(dc)
    }

    /// Returns the adjacent cell in `dir`, or `None` if it would underflow.
    ///
    /// The upper grid bounds are not checked here.
    #[must_use]
    pub fn step(self, dir: Direction) -> Option<Self> {
        let Self { row, col } = self;
        match dir {
            Direction::Up => Some(Self::new(row.checked_sub(1)?, col)),
            Direction::Down => Some(Self::new(row + 1, col)),
            Direction::Left => Some(Self::new(row, col.checked_sub(1)?)),
            Direction::Right => Some(Self::new(row, col + 1)),
        }
    }

    /// All adjacent cells that do not underflow, in [`Direction::ALL`] order.
    #[must_use]
    pub fn neighbors(self) -> ArrayVec<(Direction, Self), 4> {
        Direction::ALL
            .into_iter()
            .filter_map(|dir| self.step(dir).map(|cell| (dir, cell)))
            .collect()
    }
}

/// One of the four grid-aligned moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    /// Towards row 0.
    #[display("up")]
    Up,
    /// Towards higher rows.
    #[display("down")]
    Down,
    /// Towards column 0.
    #[display("left")]
    Left,
    /// Towards higher columns.
    #[display("right")]
    Right,
}

impl Direction {
    /// Neighbor expansion order used by the pathfinder.
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Maps a facing angle in degrees to the grid direction it points at.
    ///
    /// Heading 0° faces increasing rows and 90° faces increasing columns.
    /// Each direction covers a 90° sector centred on its axis; any angle is
    /// accepted and wrapped into `[0, 360)`.
    ///
    /// ```
    /// use mazeduel_grid::Direction;
    ///
    /// assert_eq!(Direction::from_heading(0.0), Direction::Down);
    /// assert_eq!(Direction::from_heading(100.0), Direction::Right);
    /// assert_eq!(Direction::from_heading(-90.0), Direction::Left);
    /// assert_eq!(Direction::from_heading(180.0), Direction::Up);
    /// ```
    #[must_use]
    pub fn from_heading(degrees: f32) -> Self {
        let angle = degrees.rem_euclid(360.0);
        if !(45.0..315.0).contains(&angle) {
            Self::Down
        } else if angle < 135.0 {
            Self::Right
        } else if angle < 225.0 {
            Self::Up
        } else {
            Self::Left
        }
    }
}
