//! Cardinal directions and relative turns on the grid
//!
//! Coordinate convention: increasing x is east, increasing y is south.

use super::layout::Position;
use serde::{Deserialize, Serialize};

/// Cardinal direction, declared in clockwise order starting at north
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

/// Turn between two consecutive runs of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Turn {
    Left,
    Right,
    Around,
}

impl Direction {
    /// Clockwise cycle used both for neighbour expansion and for turn arithmetic
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }

    /// Direction of a single unit step from `from` to `to`
    ///
    /// Returns `None` when the positions are not 4-adjacent.
    pub fn between(from: Position, to: Position) -> Option<Self> {
        if from.x == to.x && from.y.checked_sub(1) == Some(to.y) {
            Some(Direction::North)
        } else if from.y == to.y && from.x + 1 == to.x {
            Some(Direction::East)
        } else if from.x == to.x && from.y + 1 == to.y {
            Some(Direction::South)
        } else if from.y == to.y && from.x.checked_sub(1) == Some(to.x) {
            Some(Direction::West)
        } else {
            None
        }
    }

    /// Turn needed to go from heading `self` to heading `next`
    ///
    /// +1 step in the clockwise cycle is right, +3 is left, +2 is around, 0 is no turn.
    pub fn turn_to(self, next: Direction) -> Option<Turn> {
        match (next.index() + 4 - self.index()) % 4 {
            1 => Some(Turn::Right),
            2 => Some(Turn::Around),
            3 => Some(Turn::Left),
            _ => None,
        }
    }

    /// Neighbouring position one step in this direction, if it does not underflow
    pub fn step(self, pos: Position) -> Option<Position> {
        match self {
            Direction::North => pos.y.checked_sub(1).map(|y| Position::new(pos.x, y)),
            Direction::East => Some(Position::new(pos.x + 1, pos.y)),
            Direction::South => Some(Position::new(pos.x, pos.y + 1)),
            Direction::West => pos.x.checked_sub(1).map(|x| Position::new(x, pos.y)),
        }
    }
}

impl Turn {
    pub fn as_str(self) -> &'static str {
        match self {
            Turn::Left => "left",
            Turn::Right => "right",
            Turn::Around => "around",
        }
    }
}

impl std::fmt::Display for Turn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
