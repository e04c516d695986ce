//! Operation: check a build-state file against the catalog.

use std::fmt::Write;

use buildplan_core::state::{BuildState, StateValidation};
use buildplan_resolver::Planner;
use buildplan_util::errors::{PlanError, PlanResult};

/// Validate `state`, failing with [`PlanError::State`] when it is invalid.
///
/// On success the returned string is the report to print.
pub fn validate(planner: &Planner, state: &BuildState) -> PlanResult<String> {
    let result = planner.validate_build_state(state);
    if result.is_valid {
        Ok(format!("Build state is valid ({} entries)\n", state.len()))
    } else {
        Err(PlanError::State {
            message: render_errors(&result),
        }
        .into())
    }
}

fn render_errors(result: &StateValidation) -> String {
    let mut out = format!("{} problem(s) found", result.errors.len());
    for error in &result.errors {
        let _ = write!(out, "\n  - {error}");
    }
    out
}
