//! Grid path planning with a hazard-aware traversal policy
//!
//! The planner is stateless: every call to [`find_path`] owns its own search arena
//! and returns a complete route or `None`, never a partial path. Running a strict
//! search first and a relaxed one on failure is the caller's decision.

mod search;

pub use search::find_path;

use crate::grid::{Cell, Position};
use serde::{Deserialize, Serialize};

/// Whether hazard-buffer cells may be entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardPolicy {
    /// Hazard-buffer cells are treated like walls
    Avoid,
    /// Hazard-buffer cells are passable; crossings are counted and minimised
    AllowCrossing,
}

impl HazardPolicy {
    /// Traversability predicate for a cell other than the start
    pub fn permits(self, cell: Cell) -> bool {
        match cell {
            Cell::Wall | Cell::Fire => false,
            Cell::HazardBuffer => self == HazardPolicy::AllowCrossing,
            _ => true,
        }
    }
}

/// Route from start to goal inclusive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    positions: Vec<Position>,
    hazard_crossings: usize,
}

impl Path {
    pub(crate) fn new(positions: Vec<Position>, hazard_crossings: usize) -> Self {
        Self {
            positions,
            hazard_crossings,
        }
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Number of unit moves
    pub fn steps(&self) -> usize {
        self.positions.len().saturating_sub(1)
    }

    /// Hazard-buffer cells entered along the route
    pub fn hazard_crossings(&self) -> usize {
        self.hazard_crossings
    }
}
