//! Rectangular floor layout parsed from a row-delimited string

use super::cell::Cell;
use crate::error::LayoutError;
use serde::{Deserialize, Serialize};

/// Grid coordinate: `x` is the column, `y` the row (row 0 is the top/north edge)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Sum of absolute coordinate differences
    pub fn manhattan_distance(&self, other: &Position) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Floor layout stored in row-major order: `cells[y * width + x]`
///
/// A `GridMap` is always rectangular and non-empty; [`GridMap::parse`] rejects anything
/// else instead of padding it. Serde encodes it as a list of row strings and decodes
/// through [`GridMap::from_rows`], so the same rules apply to deserialized grids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct GridMap {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) cells: Vec<Cell>,
}

impl GridMap {
    /// Parse a layout string such as `"U..|...|..S"`
    ///
    /// # Errors
    /// Returns [`LayoutError::Empty`] when there are no cells and
    /// [`LayoutError::Ragged`] when a row length differs from the first row.
    pub fn parse(layout: &str, delimiter: char) -> Result<Self, LayoutError> {
        let mut width = None;
        let mut height = 0;
        let mut cells = Vec::with_capacity(layout.len());

        for (row, line) in layout.split(delimiter).enumerate() {
            let before = cells.len();
            cells.extend(line.chars().map(Cell::from_char));
            let found = cells.len() - before;

            match width {
                None => width = Some(found),
                Some(expected) if expected != found => {
                    return Err(LayoutError::Ragged {
                        row,
                        expected,
                        found,
                    });
                }
                Some(_) => {}
            }
            height += 1;
        }

        let width = width.unwrap_or(0);
        if width == 0 {
            return Err(LayoutError::Empty);
        }

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Build a grid from rows of cell codes
    ///
    /// # Errors
    /// Same rules as [`GridMap::parse`].
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, LayoutError> {
        let joined = rows
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join("\n");
        Self::parse(&joined, '\n')
    }

    /// Inverse of [`GridMap::parse`] for the same delimiter
    pub fn serialize(&self, delimiter: char) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.height);
        for (y, row) in self.rows().enumerate() {
            if y > 0 {
                out.push(delimiter);
            }
            out.extend(row.iter().map(|cell| cell.as_char()));
        }
        out
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.in_bounds(pos).then(|| pos.y * self.width + pos.x)
    }

    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos).map(|idx| self.cells[idx])
    }

    /// Overwrite a cell; out-of-bounds positions are ignored
    ///
    /// Returns `true` if the cell was written.
    pub fn set(&mut self, pos: Position, cell: Cell) -> bool {
        match self.index(pos) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Rows from top (y = 0) to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks(self.width)
    }

    /// First cell matching `cell`, scanning rows top-to-bottom and columns left-to-right
    ///
    /// Later duplicates are ignored. A layout with two occupants or two exits
    /// therefore routes from/to whichever appears first.
    pub fn find_position(&self, cell: Cell) -> Option<Position> {
        self.cells
            .iter()
            .position(|&c| c == cell)
            .map(|idx| Position::new(idx % self.width, idx / self.width))
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == cell).count()
    }

    /// Reset route annotations left over from a previous cycle to plain floor
    pub fn clear_path_markers(&mut self) -> usize {
        let mut cleared = 0;
        for cell in &mut self.cells {
            if *cell == Cell::PathMarker {
                *cell = Cell::floor();
                cleared += 1;
            }
        }
        cleared
    }

    /// Mark every intermediate cell of a route with [`Cell::PathMarker`]
    ///
    /// The first and last positions (occupant and exit) keep their codes.
    pub fn stamp_path(&mut self, positions: &[Position]) {
        if positions.len() < 3 {
            return;
        }
        for &pos in &positions[1..positions.len() - 1] {
            self.set(pos, Cell::PathMarker);
        }
    }
}

impl TryFrom<Vec<String>> for GridMap {
    type Error = LayoutError;

    fn try_from(rows: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_rows(&rows)
    }
}

impl From<GridMap> for Vec<String> {
    fn from(grid: GridMap) -> Self {
        grid.rows()
            .map(|row| row.iter().map(|cell| cell.as_char()).collect())
            .collect()
    }
}

impl std::fmt::Display for GridMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.serialize('\n'))
    }
}
