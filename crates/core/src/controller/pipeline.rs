//! One recompute pass: parse → locate → hazards → plan → instructions → payload
//!
//! Pure with respect to controller state; the controller decides when to run it and
//! what to do with the result.

use tracing::{debug, info, warn};

use super::sink::{RouteUpdate, CURSOR_NO_ROUTE, CURSOR_START};
use crate::config::RouterConfig;
use crate::error::LayoutError;
use crate::grid::{expand_hazards, Cell, GridMap, Position};
use crate::instructions::Instruction;
use crate::planner::{find_path, HazardPolicy, Path};

/// Warning attached to a route update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteWarning {
    None,
    /// Only a route through hazard-buffer cells exists
    HazardCrossing,
    /// No route exists under either policy
    NoRoute,
}

impl RouteWarning {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteWarning::None => "",
            RouteWarning::HazardCrossing => {
                "Caution: no fully safe route exists. The route passes close to fire"
            }
            RouteWarning::NoRoute => "Error: no route to an exit could be found",
        }
    }
}

/// Result of the two-phase search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePlan {
    /// Found without entering any hazard-buffer cell
    Safe(Path),
    /// Found only after allowing hazard-buffer cells
    HazardCrossing(Path),
    NoRoute,
}

impl RoutePlan {
    pub fn path(&self) -> Option<&Path> {
        match self {
            RoutePlan::Safe(path) | RoutePlan::HazardCrossing(path) => Some(path),
            RoutePlan::NoRoute => None,
        }
    }

    pub fn warning(&self) -> RouteWarning {
        match self {
            RoutePlan::Safe(_) => RouteWarning::None,
            RoutePlan::HazardCrossing(_) => RouteWarning::HazardCrossing,
            RoutePlan::NoRoute => RouteWarning::NoRoute,
        }
    }
}

/// Strict search first, relaxed search only if the strict one fails
pub fn plan_route(hazard_grid: &GridMap, start: Position, goal: Position) -> RoutePlan {
    if let Some(path) = find_path(hazard_grid, start, goal, HazardPolicy::Avoid) {
        debug!(steps = path.steps(), "hazard-free route found");
        return RoutePlan::Safe(path);
    }
    if let Some(path) = find_path(hazard_grid, start, goal, HazardPolicy::AllowCrossing) {
        warn!(
            steps = path.steps(),
            hazard_crossings = path.hazard_crossings(),
            "only a hazard-crossing route exists"
        );
        return RoutePlan::HazardCrossing(path);
    }
    warn!(%start, %goal, "no route to exit under either policy");
    RoutePlan::NoRoute
}

/// Outcome of [`compute_route`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteComputation {
    Ready(RouteUpdate),
    /// The layout lacks an occupant and/or an exit cell
    MissingEntity { user_found: bool, exit_found: bool },
}

/// Run a full pass over `layout`
///
/// Stale path markers from a previous cycle are cleared before the new route is
/// stamped. Hazard buffers are only used for planning and never written back.
///
/// # Errors
/// Returns [`LayoutError`] for empty or non-rectangular layouts.
pub fn compute_route(layout: &str, config: &RouterConfig) -> Result<RouteComputation, LayoutError> {
    let delimiter = config.layout.delimiter;
    let mut grid = GridMap::parse(layout, delimiter)?;

    let start = grid.find_position(Cell::User);
    let goal = grid.find_position(Cell::Exit);
    let (Some(start), Some(goal)) = (start, goal) else {
        return Ok(RouteComputation::MissingEntity {
            user_found: start.is_some(),
            exit_found: goal.is_some(),
        });
    };

    for (cell, name) in [(Cell::User, "occupant"), (Cell::Exit, "exit")] {
        let count = grid.count(cell);
        if count > 1 {
            warn!(count, kind = name, "duplicate cells in layout, using the first in scan order");
        }
    }

    let hazard_grid = expand_hazards(&grid);
    let plan = plan_route(&hazard_grid, start, goal);

    let stale = grid.clear_path_markers();
    if stale > 0 {
        debug!(stale, "cleared previous path markers");
    }

    let warning = plan.warning();
    let (instructions, cursor) = match plan.path() {
        Some(path) => {
            grid.stamp_path(path.positions());
            let steps = config
                .instructions
                .generator()
                .generate_text(path.positions());
            (steps, CURSOR_START)
        }
        None => (vec![Instruction::NoRoute.to_string()], CURSOR_NO_ROUTE),
    };

    info!(
        width = grid.width(),
        height = grid.height(),
        %start,
        %goal,
        steps = plan.path().map_or(0, Path::steps),
        instructions = instructions.len(),
        ?warning,
        "route computed"
    );

    Ok(RouteComputation::Ready(RouteUpdate {
        layout: grid.serialize(delimiter),
        warning: warning.as_str().to_string(),
        instructions,
        instruction_cursor: cursor,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready(layout: &str) -> RouteUpdate {
        match compute_route(layout, &RouterConfig::default()).unwrap() {
            RouteComputation::Ready(update) => update,
            other => panic!("expected a route update, got {other:?}"),
        }
    }

    #[test]
    fn test_safe_route_payload() {
        let update = ready("U..|...|..S");
        assert_eq!(update.layout, "UPP|..P|..S");
        assert_eq!(update.warning, "");
        assert_eq!(update.instruction_cursor, CURSOR_START);
        assert_eq!(
            update.instructions,
            vec![
                "Go straight 20 meters, then turn right",
                "Go straight 20 meters",
                "You have reached the exit",
            ]
        );
    }

    #[test]
    fn test_hazard_crossing_route_payload() {
        // Fire sits next to the only corridor, so every route enters the buffer
        let update = ready("WWWWW|U...S|WWFWW");
        assert_eq!(update.warning, RouteWarning::HazardCrossing.as_str());
        assert_eq!(update.instruction_cursor, CURSOR_START);
        assert_eq!(update.layout, "WWWWW|UPPPS|WWFWW");
        assert_eq!(
            update.instructions,
            vec!["Go straight 40 meters", "You have reached the exit"]
        );
    }

    #[test]
    fn test_no_route_payload() {
        let update = ready("WWW..|WUW..|WWW.S");
        assert_eq!(update.warning, RouteWarning::NoRoute.as_str());
        assert_eq!(update.instruction_cursor, CURSOR_NO_ROUTE);
        assert_eq!(update.instructions, vec![Instruction::NoRoute.to_string()]);
        assert_eq!(update.layout, "WWW..|WUW..|WWW.S");
    }

    #[test]
    fn test_hazard_buffers_not_written_back() {
        let update = ready("U....|.....|F...S");
        assert!(!update.layout.contains(Cell::HAZARD_BUFFER));
        assert_eq!(update.warning, "");
    }

    #[test]
    fn test_stale_markers_replaced() {
        // Markers from an old route along the bottom row
        let update = ready("U..|P..|PPS");
        assert_eq!(update.layout, "UPP|..P|..S");
    }

    #[test]
    fn test_adjacent_exit() {
        let update = ready("US");
        assert_eq!(update.layout, "US");
        assert_eq!(
            update.instructions,
            vec!["Go straight 10 meters", "You have reached the exit"]
        );
    }

    #[test]
    fn test_missing_entities() {
        let config = RouterConfig::default();
        assert_eq!(
            compute_route("...|..S", &config).unwrap(),
            RouteComputation::MissingEntity {
                user_found: false,
                exit_found: true
            }
        );
        assert_eq!(
            compute_route("U..|...", &config).unwrap(),
            RouteComputation::MissingEntity {
                user_found: true,
                exit_found: false
            }
        );
    }

    #[test]
    fn test_malformed_layout() {
        let config = RouterConfig::default();
        assert_eq!(compute_route("", &config), Err(LayoutError::Empty));
        assert!(matches!(
            compute_route("U..|.S", &config),
            Err(LayoutError::Ragged { row: 1, .. })
        ));
    }

    #[test]
    fn test_custom_delimiter_and_scale() {
        let config = RouterConfig::from_toml(
            "[layout]\ndelimiter = \";\"\n[instructions]\nmeters_per_cell = 3",
        )
        .unwrap();
        let RouteComputation::Ready(update) = compute_route("U.S;...", &config).unwrap() else {
            panic!("expected a route update");
        };
        assert_eq!(update.layout, "UPS;...");
        assert_eq!(update.instructions[0], "Go straight 6 meters");
    }

    #[test]
    fn test_unvalidated_scale_does_not_panic() {
        let mut config = RouterConfig::default();
        config.instructions.meters_per_cell = usize::MAX;
        let RouteComputation::Ready(update) = compute_route("U..S", &config).unwrap() else {
            panic!("expected a route update");
        };
        assert_eq!(update.instructions[0], format!("Go straight {} meters", usize::MAX));
    }

    #[test]
    fn test_plan_route_phases() {
        let grid = GridMap::parse("UZS|WZW", '|').unwrap();
        let start = Position::new(0, 0);
        let goal = Position::new(2, 0);
        let plan = plan_route(&grid, start, goal);
        assert!(matches!(plan, RoutePlan::HazardCrossing(_)));
        assert_eq!(plan.path().map(Path::hazard_crossings), Some(1));

        let open = GridMap::parse("U.S", '|').unwrap();
        assert!(matches!(plan_route(&open, start, goal), RoutePlan::Safe(_)));

        let blocked = GridMap::parse("UWS", '|').unwrap();
        assert_eq!(plan_route(&blocked, start, goal), RoutePlan::NoRoute);
    }
}
