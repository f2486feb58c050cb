//! Grid model and route search for the maze arena.
//!
//! The maze is a `rows × cols` grid of [`Cell`]s. Walls sit on the edges
//! between adjacent cells and are identified by [`EdgeId`]. The pathfinder
//! only talks to the [`WallQuery`] capability; [`WallGrid`] is the concrete
//! owner used by the game, with destructible and temporary player-built
//! walls.
//!
//! # Example
//!
//! ```
//! use mazeduel_grid::{Cell, Direction, WallGrid, WallGridConfig, pathfinding};
//!
//! let mut grid = WallGrid::open(3, 3, WallGridConfig::default());
//! let start = Cell::new(0, 0);
//! let goal = Cell::new(2, 2);
//! assert_eq!(pathfinding::find_path(&grid, start, goal).len(), 5);
//!
//! // a built wall blocks the edge until it expires
//! grid.toggle_built_wall(Cell::new(0, 0), Direction::Right, 0.0);
//! grid.toggle_built_wall(Cell::new(0, 0), Direction::Down, 0.0);
//! assert!(pathfinding::find_path(&grid, start, goal).is_empty());
//! grid.expire_built_walls(10.0);
//! assert_eq!(pathfinding::find_path(&grid, start, goal).len(), 5);
//! ```

pub use self::{cell::*, layout::*, wall::*};

mod cell;
mod layout;
pub mod pathfinding;
mod wall;
