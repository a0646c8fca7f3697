//! Persistence boundary for recompute results

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::SinkError;

/// Instruction cursor of a committed route
pub const CURSOR_START: i32 = 0;
/// Instruction cursor when no route exists
pub const CURSOR_NO_ROUTE: i32 = -1;

/// Result record of one recompute cycle, always written as a single unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteUpdate {
    /// Layout with path markers stamped in
    pub layout: String,
    /// Empty, hazard-crossing caution, or no-route error
    pub warning: String,
    pub instructions: Vec<String>,
    /// [`CURSOR_START`] on success, [`CURSOR_NO_ROUTE`] on total failure
    pub instruction_cursor: i32,
}

impl RouteUpdate {
    pub fn has_route(&self) -> bool {
        self.instruction_cursor != CURSOR_NO_ROUTE
    }

    /// Encode as one JSON document
    ///
    /// # Errors
    /// Returns [`SinkError::Encode`] if serialization fails
    pub fn to_json(&self) -> Result<String, SinkError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Destination for committed route updates
///
/// Implementations must write the record atomically: either the whole update is
/// stored or the call fails.
pub trait ResultSink: Send + Sync {
    /// # Errors
    /// Returns error if the record could not be stored; the caller may retry
    fn write(&self, update: &RouteUpdate) -> Result<(), SinkError>;
}

impl<T: ResultSink + ?Sized> ResultSink for Arc<T> {
    fn write(&self, update: &RouteUpdate) -> Result<(), SinkError> {
        (**self).write(update)
    }
}

impl<T: ResultSink + ?Sized> ResultSink for Box<T> {
    fn write(&self, update: &RouteUpdate) -> Result<(), SinkError> {
        (**self).write(update)
    }
}

/// In-memory sink keeping every committed record
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<RouteUpdate>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<RouteUpdate> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultSink for MemorySink {
    fn write(&self, update: &RouteUpdate) -> Result<(), SinkError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| SinkError::Unavailable("memory sink lock poisoned".to_string()))?;
        records.push(update.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RouteUpdate {
        RouteUpdate {
            layout: "UPS".to_string(),
            warning: String::new(),
            instructions: vec![
                "Go straight 20 meters".to_string(),
                "You have reached the exit".to_string(),
            ],
            instruction_cursor: CURSOR_START,
        }
    }

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());

        let first = sample();
        let mut second = sample();
        second.instruction_cursor = CURSOR_NO_ROUTE;

        sink.write(&first).unwrap();
        sink.write(&second).unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.records(), vec![first, second]);
    }

    #[test]
    fn test_shared_sink_through_arc() {
        let sink = Arc::new(MemorySink::new());
        let shared: Arc<dyn ResultSink> = sink.clone();
        shared.write(&sample()).unwrap();
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_json_record_contains_all_fields() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["layout"], "UPS");
        assert_eq!(value["warning"], "");
        assert_eq!(value["instructions"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["instruction_cursor"], 0);
    }

    #[test]
    fn test_has_route() {
        let mut update = sample();
        assert!(update.has_route());
        update.instruction_cursor = CURSOR_NO_ROUTE;
        assert!(!update.has_route());
    }
}
