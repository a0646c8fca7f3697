//! Single-character cell codes used in floor layouts

use serde::{Deserialize, Serialize};

/// One cell of a floor layout
///
/// Every code outside the reserved alphabet is a passable floor cell. The input
/// character is kept in [`Cell::Floor`] so that serializing a parsed layout reproduces
/// it byte for byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Impassable
    Wall,
    /// Hazard source, impassable
    Fire,
    /// Occupant position
    User,
    /// Safe target
    Exit,
    /// Ring of cells around a fire source; derived, never authoritative input
    HazardBuffer,
    /// Route annotation written into output layouts
    PathMarker,
    /// Any other code
    Floor(char),
}

impl Cell {
    pub const WALL: char = 'W';
    pub const FIRE: char = 'F';
    pub const USER: char = 'U';
    pub const EXIT: char = 'S';
    pub const HAZARD_BUFFER: char = 'Z';
    pub const PATH_MARKER: char = 'P';
    /// Character used when a cell is reset to plain floor
    pub const FLOOR: char = '.';

    /// Every character with a fixed meaning
    pub const RESERVED: [char; 6] = [
        Self::WALL,
        Self::FIRE,
        Self::USER,
        Self::EXIT,
        Self::HAZARD_BUFFER,
        Self::PATH_MARKER,
    ];

    pub fn from_char(code: char) -> Self {
        match code {
            Self::WALL => Cell::Wall,
            Self::FIRE => Cell::Fire,
            Self::USER => Cell::User,
            Self::EXIT => Cell::Exit,
            Self::HAZARD_BUFFER => Cell::HazardBuffer,
            Self::PATH_MARKER => Cell::PathMarker,
            other => Cell::Floor(other),
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Cell::Wall => Self::WALL,
            Cell::Fire => Self::FIRE,
            Cell::User => Self::USER,
            Cell::Exit => Self::EXIT,
            Cell::HazardBuffer => Self::HAZARD_BUFFER,
            Cell::PathMarker => Self::PATH_MARKER,
            Cell::Floor(c) => c,
        }
    }

    /// Plain floor cell
    pub fn floor() -> Self {
        Cell::Floor(Self::FLOOR)
    }

    /// Walls and fire block movement under every policy
    pub fn is_blocking(self) -> bool {
        matches!(self, Cell::Wall | Cell::Fire)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
