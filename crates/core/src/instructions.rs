//! Turn-by-turn directions from a planned route
//!
//! Consecutive moves in the same direction collapse into one "go straight" step.
//! At a direction change the finished run is annotated with the upcoming turn.

use crate::grid::{Direction, Position, Turn};
use serde::{Deserialize, Serialize};

/// Default distance represented by one grid cell
pub const DEFAULT_METERS_PER_CELL: usize = 10;
/// Largest cell scale accepted by configuration
pub const MAX_METERS_PER_CELL: usize = 1_000;

/// One directive shown to the occupant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// Walk `meters` in the current heading, then optionally turn
    Straight { meters: usize, then: Option<Turn> },
    /// Closing directive appended to every route
    ReachedExit,
    /// Sole directive when neither search phase found a route
    NoRoute,
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::Straight { meters, then: None } => {
                write!(f, "Go straight {meters} meters")
            }
            Instruction::Straight {
                meters,
                then: Some(turn),
            } => write!(f, "Go straight {meters} meters, then turn {turn}"),
            Instruction::ReachedExit => f.write_str("You have reached the exit"),
            Instruction::NoRoute => f.write_str(
                "No safe route to an exit was found. Stay low and wait for rescue",
            ),
        }
    }
}

/// Converts routes into grouped directional steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionGenerator {
    meters_per_cell: usize,
}

impl Default for InstructionGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_METERS_PER_CELL)
    }
}

impl InstructionGenerator {
    pub fn new(meters_per_cell: usize) -> Self {
        Self { meters_per_cell }
    }

    /// Directives for a route given as start-to-goal positions
    ///
    /// A route with no moves (start equals goal) yields only
    /// [`Instruction::ReachedExit`]. Pairs that are not 4-adjacent are skipped.
    pub fn generate(&self, path: &[Position]) -> Vec<Instruction> {
        let mut headings = path
            .windows(2)
            .filter_map(|pair| Direction::between(pair[0], pair[1]));

        let Some(mut heading) = headings.next() else {
            return vec![Instruction::ReachedExit];
        };

        let mut out = Vec::new();
        let mut run: usize = 1;
        for next in headings {
            if next == heading {
                run += 1;
                continue;
            }
            out.push(Instruction::Straight {
                meters: run.saturating_mul(self.meters_per_cell),
                then: heading.turn_to(next),
            });
            heading = next;
            run = 1;
        }

        out.push(Instruction::Straight {
            meters: run.saturating_mul(self.meters_per_cell),
            then: None,
        });
        out.push(Instruction::ReachedExit);
        out
    }

    /// Same as [`generate`](Self::generate), rendered to text
    pub fn generate_text(&self, path: &[Position]) -> Vec<String> {
        self.generate(path)
            .iter()
            .map(ToString::to_string)
            .collect()
    }
}
