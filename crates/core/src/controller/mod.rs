//! Reactive recompute controller
//!
//! One [`RecomputeController`] watches one map. Each change notification carries the
//! full layout string, which doubles as the fingerprint:
//!
//! - a layout equal to the last processed one is ignored (debounce)
//! - a notification arriving while a cycle runs is dropped, not queued (single-flight)
//! - the sink write is retried with exponential backoff; nothing else is retried
//!
//! Whatever the cycle outcome, the processed layout becomes the new fingerprint, so a
//! layout that keeps failing is not recomputed until it changes.

mod pipeline;
mod retry;
mod sink;

pub use pipeline::{compute_route, plan_route, RouteComputation, RoutePlan, RouteWarning};
pub use retry::{RetryError, RetryPolicy};
pub use sink::{MemorySink, ResultSink, RouteUpdate, CURSOR_NO_ROUTE, CURSOR_START};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use crossbeam_channel::Receiver;
use tracing::{debug, error, info, warn};

use crate::config::RouterConfig;
use crate::error::{ConfigError, LayoutError, RouterError};

/// Push notification that the authoritative layout of a map changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotification {
    /// Identifies the building; only used for logging
    pub building_id: String,
    /// Identifies the floor; only used for logging
    pub floor_id: String,
    pub layout: String,
}

impl ChangeNotification {
    pub fn new(
        building_id: impl Into<String>,
        floor_id: impl Into<String>,
        layout: impl Into<String>,
    ) -> Self {
        Self {
            building_id: building_id.into(),
            floor_id: floor_id.into(),
            layout: layout.into(),
        }
    }
}

/// Whether a recompute cycle is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Computing,
}

/// What a single [`RecomputeController::handle`] call did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Layout equals the last processed fingerprint
    Unchanged,
    /// Another cycle was in flight
    Dropped,
    /// No occupant and/or no exit in the layout; nothing was written
    MissingEntity { user_found: bool, exit_found: bool },
    /// Layout could not be parsed; nothing was written
    Rejected(LayoutError),
    /// Route update written to the sink
    Committed(RouteUpdate),
}

/// Clears the busy flag when a cycle ends, including on unwind
struct BusyGuard<'a> {
    busy: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(busy: &'a AtomicBool) -> Option<Self> {
        busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { busy })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Event-driven orchestrator for one monitored map
pub struct RecomputeController<S> {
    config: RouterConfig,
    retry: RetryPolicy,
    sink: S,
    busy: AtomicBool,
    /// Layout of the last completed cycle
    last_fingerprint: Mutex<Option<String>>,
}

impl<S: ResultSink> RecomputeController<S> {
    /// Validates `config` before taking ownership of `sink`
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] when the configuration fails validation
    pub fn new(config: RouterConfig, sink: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let retry = config.retry.policy();
        Ok(Self {
            config,
            retry,
            sink,
            busy: AtomicBool::new(false),
            last_fingerprint: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn state(&self) -> ControllerState {
        if self.busy.load(Ordering::Acquire) {
            ControllerState::Computing
        } else {
            ControllerState::Idle
        }
    }

    pub fn last_fingerprint(&self) -> Option<String> {
        self.last_fingerprint
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn is_processed(&self, layout: &str) -> bool {
        self.last_fingerprint
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_deref()
            == Some(layout)
    }

    fn remember(&self, layout: &str) {
        *self
            .last_fingerprint
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(layout.to_string());
    }

    /// Process one change notification
    ///
    /// Safe to call concurrently and repeatedly; see the module docs for the
    /// debounce and single-flight rules.
    ///
    /// # Errors
    /// Returns [`RouterError::Persistence`] when every sink write attempt failed.
    /// The cycle still counts as processed.
    pub fn handle(&self, notification: &ChangeNotification) -> Result<CycleOutcome, RouterError> {
        let layout = notification.layout.as_str();

        if self.is_processed(layout) {
            debug!(
                building = %notification.building_id,
                floor = %notification.floor_id,
                "layout unchanged, skipping recompute"
            );
            return Ok(CycleOutcome::Unchanged);
        }

        let Some(_guard) = BusyGuard::acquire(&self.busy) else {
            debug!(
                building = %notification.building_id,
                floor = %notification.floor_id,
                "recompute already in flight, dropping notification"
            );
            return Ok(CycleOutcome::Dropped);
        };

        // A cycle for this layout may have finished between the check and the acquire
        if self.is_processed(layout) {
            return Ok(CycleOutcome::Unchanged);
        }

        info!(
            building = %notification.building_id,
            floor = %notification.floor_id,
            "recomputing evacuation route"
        );
        let outcome = self.recompute(layout);
        self.remember(layout);
        outcome
    }

    fn recompute(&self, layout: &str) -> Result<CycleOutcome, RouterError> {
        let update = match compute_route(layout, &self.config) {
            Ok(RouteComputation::Ready(update)) => update,
            Ok(RouteComputation::MissingEntity {
                user_found,
                exit_found,
            }) => {
                info!(user_found, exit_found, "layout has no occupant or no exit, nothing to route");
                return Ok(CycleOutcome::MissingEntity {
                    user_found,
                    exit_found,
                });
            }
            Err(err) => {
                warn!(error = %err, "rejecting malformed layout");
                return Ok(CycleOutcome::Rejected(err));
            }
        };

        self.retry
            .run(|attempt| {
                if attempt > 0 {
                    debug!(attempt, "retrying route update write");
                }
                self.sink.write(&update)
            })
            .map_err(|err| {
                error!(attempts = err.attempts, error = %err.last, "route update could not be persisted");
                RouterError::Persistence {
                    attempts: err.attempts,
                    source: err.last,
                }
            })?;

        info!(
            cursor = update.instruction_cursor,
            warning = %update.warning,
            "route update committed"
        );
        Ok(CycleOutcome::Committed(update))
    }

    /// Drain a notification stream until every sender is dropped
    ///
    /// Returns the number of committed cycles.
    pub fn run(&self, notifications: &Receiver<ChangeNotification>) -> usize {
        let mut committed = 0;
        for notification in notifications {
            match self.handle(&notification) {
                Ok(CycleOutcome::Committed(_)) => committed += 1,
                Ok(outcome) => debug!(?outcome, "notification handled"),
                Err(err) => error!(error = %err, "recompute cycle failed"),
            }
        }
        info!(committed, "notification stream closed");
        committed
    }
}
