use serde::{Deserialize, Serialize};

use crate::{EdgeId, WallGrid, WallGridConfig};

/// Serialized form of a maze: its dimensions and the interior walls standing.
///
/// ```json
/// {
///   "rows": 2,
///   "cols": 3,
///   "walls": [{ "orientation": "vertical", "row": 0, "col": 0 }]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLayout {
    pub rows: usize,
    pub cols: usize,
    #[serde(default)]
    pub walls: Vec<EdgeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum LayoutError {
    #[display("grid must have at least one row and one column, got {rows}x{cols}")]
    Empty { rows: usize, cols: usize },
    #[display("wall {edge} lies outside the {rows}x{cols} grid")]
    WallOutOfBounds {
        edge: EdgeId,
        rows: usize,
        cols: usize,
    },
}

impl GridLayout {
    /// Builds a wall grid from this layout, rejecting walls that do not fit.
    pub fn to_grid(&self, config: WallGridConfig) -> Result<WallGrid, LayoutError> {
        let Self { rows, cols, walls } = self;
        if *rows == 0 || *cols == 0 {
            return Err(LayoutError::Empty {
                rows: *rows,
                cols: *cols,
            });
        }
        let mut grid = WallGrid::open(*rows, *cols, config);
        for &edge in walls {
            if !edge.fits(*rows, *cols) {
                return Err(LayoutError::WallOutOfBounds {
                    edge,
                    rows: *rows,
                    cols: *cols,
                });
            }
            grid.insert_wall(edge);
        }
        Ok(grid)
    }

    /// Captures the walls currently standing on `grid`.
    #[must_use]
    pub fn from_grid(grid: &WallGrid) -> Self {
        Self {
            rows: grid.rows(),
            cols: grid.cols(),
            walls: grid.walls().map(|(edge, _)| edge).collect(),
        }
    }
}
