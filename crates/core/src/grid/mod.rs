//! Floor layout representation and hazard derivation

pub mod cell;
pub mod direction;
pub mod hazard;
pub mod layout;

// Re-export main types
pub use cell::Cell;
pub use direction::{Direction, Turn};
pub use hazard::expand_hazards;
pub use layout::{GridMap, Position};
