//! A* search over a [`WallQuery`] grid.
//!
//! Moves are 4-connected with unit cost and the heuristic is the Manhattan
//! distance. The open set is ordered by `f = g + h` and, among equal `f`, by
//! push order, so a given grid and wall state always yields the same route.

use std::{
    cmp::{Ordering, Reverse},
    collections::{BinaryHeap, HashMap, HashSet},
};

use crate::{Cell, WallQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    f_score: usize,
    seq: u64,
    cell: Cell,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: smaller f first, then earlier push.
        Reverse((self.f_score, self.seq)).cmp(&Reverse((other.f_score, other.seq)))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Finds a shortest route from `start` to `goal`.
///
/// The route includes both endpoints. An unreachable goal yields an empty
/// vector; `start == goal` yields `[start]`.
///
/// # Panics
///
/// Panics if `start` or `goal` lies outside the grid.
///
/// # Example
///
/// ```
/// use mazeduel_grid::{Cell, EdgeId, WallGrid, WallGridConfig, pathfinding};
///
/// let mut grid = WallGrid::open(2, 3, WallGridConfig::default());
/// grid.insert_wall(EdgeId::vertical(0, 0));
///
/// let path = pathfinding::find_path(&grid, Cell::new(0, 0), Cell::new(0, 1));
/// assert_eq!(path.len(), 4);
/// assert_eq!(path.first(), Some(&Cell::new(0, 0)));
/// assert_eq!(path.last(), Some(&Cell::new(0, 1)));
/// ```
#[tracing::instrument(level = "trace", skip_all, fields(%start, %goal))]
pub fn find_path<G>(grid: &G, start: Cell, goal: Cell) -> Vec<Cell>
where
    G: WallQuery + ?Sized,
{
    assert!(grid.contains(start), "start {start} outside grid");
    assert!(grid.contains(goal), "goal {goal} outside grid");

    let mut open_set = BinaryHeap::new();
    let mut came_from: HashMap<Cell, Cell> = HashMap::new();
    let mut g_score: HashMap<Cell, usize> = HashMap::new();
    let mut closed_set: HashSet<Cell> = HashSet::new();
    let mut seq = 0;

    g_score.insert(start, 0);
    open_set.push(OpenNode {
        f_score: start.manhattan_distance(goal),
        seq,
        cell: start,
    });

    while let Some(OpenNode { cell: current, .. }) = open_set.pop() {
        if current == goal {
            tracing::trace!(expanded = closed_set.len(), "path found");
            return reconstruct_path(&came_from, current);
        }
        if !closed_set.insert(current) {
            continue;
        }

        let current_g = g_score[&current];
        for (dir, neighbor) in current.neighbors() {
            if !grid.contains(neighbor)
                || closed_set.contains(&neighbor)
                || grid.is_edge_blocked(current, dir)
            {
                continue;
            }
            let tentative_g = current_g + 1;
            if g_score.get(&neighbor).is_none_or(|&g| tentative_g < g) {
                came_from.insert(neighbor, current);
                g_score.insert(neighbor, tentative_g);
                seq += 1;
                open_set.push(OpenNode {
                    f_score: tentative_g + neighbor.manhattan_distance(goal),
                    seq,
                    cell: neighbor,
                });
            }
        }
    }

    tracing::trace!(expanded = closed_set.len(), "no path found");
    vec![]
}

/// Finds the shortest route from `start` to any of `candidates`.
///
/// Each candidate is searched in turn and the first strictly shortest
/// non-empty route wins. Returns an empty vector if no candidate is
/// reachable.
///
/// # Panics
///
/// Panics if `start` or any candidate lies outside the grid.
pub fn find_path_to_nearest<G, I>(grid: &G, start: Cell, candidates: I) -> Vec<Cell>
where
    G: WallQuery + ?Sized,
    I: IntoIterator<Item = Cell>,
{
    let mut best: Vec<Cell> = vec![];
    for candidate in candidates {
        let path = find_path(grid, start, candidate);
        if !path.is_empty() && (best.is_empty() || path.len() < best.len()) {
            best = path;
        }
    }
    best
}

fn reconstruct_path(came_from: &HashMap<Cell, Cell>, mut current: Cell) -> Vec<Cell> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}
