//! Hazard buffer derivation around fire cells
//!
//! Every cell in the 8-neighbourhood of a fire cell becomes [`Cell::HazardBuffer`]
//! unless it is itself fire or wall. Neighbour status is always read from the input
//! grid, so the buffer is exactly one ring wide no matter how rows are scheduled.

use super::cell::Cell;
use super::layout::{GridMap, Position};
use rayon::prelude::*;

/// Return a copy of `grid` with hazard buffers applied
pub fn expand_hazards(grid: &GridMap) -> GridMap {
    let width = grid.width;
    let mut out = grid.clone();

    out.cells
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                if cell.is_blocking() {
                    continue;
                }
                if touches_fire(grid, Position::new(x, y)) {
                    *cell = Cell::HazardBuffer;
                }
            }
        });

    out
}

/// Whether any of the 8 surrounding cells of `pos` in `grid` is fire
fn touches_fire(grid: &GridMap, pos: Position) -> bool {
    let y_min = pos.y.saturating_sub(1);
    let x_min = pos.x.saturating_sub(1);
    let y_max = (pos.y + 1).min(grid.height - 1);
    let x_max = (pos.x + 1).min(grid.width - 1);

    (y_min..=y_max).any(|y| {
        (x_min..=x_max).any(|x| {
            (x, y) != (pos.x, pos.y) && grid.get(Position::new(x, y)) == Some(Cell::Fire)
        })
    })
}
