//! Evacuation Routing Core Library
//!
//! Guides a building occupant from a tracked position to an exit on a 2-D floor map
//! while fires are active, and re-plans whenever the authoritative layout changes.
//!
//! ## Pipeline
//!
//! change notification → [`GridMap::parse`] → [`expand_hazards`] → [`find_path`]
//! (strict, then relaxed) → [`InstructionGenerator`] → [`ResultSink`]
//!
//! - [`grid`]: layout parsing/serialization, cell codes and hazard buffers
//! - [`planner`]: 4-directional A* with a hazard-crossing tie-break
//! - [`instructions`]: grouped turn-by-turn directions
//! - [`controller`]: debounced, single-flight recompute loop with retried persistence

pub mod config;
pub mod controller;
pub mod error;
pub mod grid;
pub mod instructions;
pub mod planner;

// Re-export main types
pub use config::RouterConfig;
pub use controller::{
    ChangeNotification, ControllerState, CycleOutcome, MemorySink, RecomputeController,
    ResultSink, RetryPolicy, RouteUpdate,
};
pub use error::{ConfigError, LayoutError, RouterError, SinkError};
pub use grid::{expand_hazards, Cell, Direction, GridMap, Position, Turn};
pub use instructions::{Instruction, InstructionGenerator};
pub use planner::{find_path, HazardPolicy, Path};
