//! Four-directional A* over a [`GridMap`]
//!
//! Nodes live in an arena and refer to their predecessor by index. The best known
//! record for each cell is tracked in a position map; frontier entries that no longer
//! match that record are skipped when popped.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use super::{HazardPolicy, Path};
use crate::grid::{Cell, Direction, GridMap, Position};

/// Search node owned by the arena of a single search
#[derive(Debug, Clone)]
struct SearchNode {
    pos: Position,
    /// Steps from the start
    g: usize,
    /// Manhattan distance to the goal
    h: usize,
    /// Hazard-buffer cells entered on the way here
    hazard_crossings: usize,
    parent: Option<usize>,
}

impl SearchNode {
    fn f(&self) -> usize {
        self.g + self.h
    }

    /// Whether reaching the same cell with `g`/`hazard_crossings` beats this record
    fn improved_by(&self, g: usize, hazard_crossings: usize) -> bool {
        g < self.g || (g == self.g && hazard_crossings < self.hazard_crossings)
    }
}

/// Frontier entry ordered by `(f, hazard_crossings, h, seq)`, smallest first
#[derive(Debug, Clone, PartialEq, Eq)]
struct FrontierEntry {
    f: usize,
    hazard_crossings: usize,
    h: usize,
    seq: usize,
    node: usize,
}

impl FrontierEntry {
    fn key(&self) -> (usize, usize, usize, usize) {
        (self.f, self.hazard_crossings, self.h, self.seq)
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap
        other.key().cmp(&self.key())
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// State of one in-progress search
struct Search<'a> {
    grid: &'a GridMap,
    goal: Position,
    policy: HazardPolicy,
    arena: Vec<SearchNode>,
    best: FxHashMap<Position, usize>,
    closed: FxHashSet<Position>,
    frontier: BinaryHeap<FrontierEntry>,
    seq: usize,
}

impl<'a> Search<'a> {
    fn new(grid: &'a GridMap, goal: Position, policy: HazardPolicy) -> Self {
        let cells = grid.width() * grid.height();
        Self {
            grid,
            goal,
            policy,
            arena: Vec::with_capacity(cells),
            best: FxHashMap::default(),
            closed: FxHashSet::default(),
            frontier: BinaryHeap::new(),
            seq: 0,
        }
    }

    /// Record a node for `pos` and queue it
    fn open(&mut self, pos: Position, g: usize, hazard_crossings: usize, parent: Option<usize>) {
        let h = pos.manhattan_distance(&self.goal);
        let node = SearchNode {
            pos,
            g,
            h,
            hazard_crossings,
            parent,
        };
        let idx = self.arena.len();
        self.frontier.push(FrontierEntry {
            f: node.f(),
            hazard_crossings,
            h,
            seq: self.seq,
            node: idx,
        });
        self.arena.push(node);
        self.best.insert(pos, idx);
        self.seq += 1;
    }

    fn run(mut self, start: Position) -> Option<Path> {
        self.open(start, 0, 0, None);

        while let Some(entry) = self.frontier.pop() {
            let current = entry.node;
            let pos = self.arena[current].pos;

            // Stale entry: a better record replaced it, or the cell is already final
            if self.best.get(&pos) != Some(&current) || !self.closed.insert(pos) {
                continue;
            }

            if pos == self.goal {
                debug!(
                    expanded = self.closed.len(),
                    nodes = self.arena.len(),
                    "A* reached goal"
                );
                return Some(self.reconstruct(current));
            }

            let g = self.arena[current].g + 1;
            let crossings = self.arena[current].hazard_crossings;

            for dir in Direction::ALL {
                let Some(next) = dir.step(pos) else {
                    continue;
                };
                if self.closed.contains(&next) {
                    continue;
                }
                let Some(cell) = self.grid.get(next) else {
                    continue;
                };
                if !self.policy.permits(cell) {
                    continue;
                }

                let next_crossings = crossings + usize::from(cell == Cell::HazardBuffer);
                if let Some(&existing) = self.best.get(&next) {
                    if !self.arena[existing].improved_by(g, next_crossings) {
                        continue;
                    }
                }
                self.open(next, g, next_crossings, Some(current));
            }
        }

        debug!(
            expanded = self.closed.len(),
            policy = ?self.policy,
            "A* frontier exhausted without reaching goal"
        );
        None
    }

    fn reconstruct(&self, goal_node: usize) -> Path {
        let mut positions = Vec::with_capacity(self.arena[goal_node].g + 1);
        let mut cursor = Some(goal_node);
        while let Some(idx) = cursor {
            positions.push(self.arena[idx].pos);
            cursor = self.arena[idx].parent;
        }
        positions.reverse();
        Path::new(positions, self.arena[goal_node].hazard_crossings)
    }
}

/// Shortest 4-directional route from `start` to `goal` under `policy`
///
/// Step cost is 1 and the heuristic is the Manhattan distance, so the returned path
/// is always of minimal length. Among minimal routes the one entering the fewest
/// hazard-buffer cells wins. The start cell itself is never tested for
/// traversability; an impassable goal yields `None`.
pub fn find_path(
    grid: &GridMap,
    start: Position,
    goal: Position,
    policy: HazardPolicy,
) -> Option<Path> {
    if !grid.in_bounds(start) || !grid.in_bounds(goal) {
        return None;
    }
    if start == goal {
        return Some(Path::new(vec![start], 0));
    }
    if !grid.get(goal).is_some_and(|cell| policy.permits(cell)) {
        debug!(%goal, ?policy, "goal cell is not traversable");
        return None;
    }

    Search::new(grid, goal, policy).run(start)
}
