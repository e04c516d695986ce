//! Operation: show the starter buildings and the overlay they imply.

use std::fmt::Write;

use serde::Serialize;

use buildplan_core::config::StarterEntry;
use buildplan_core::state::BuildState;
use buildplan_resolver::Planner;
use buildplan_util::errors::PlanResult;

#[derive(Debug, Serialize)]
struct PrebuiltReport<'a> {
    starters: &'a [StarterEntry],
    prebuilt: &'a BuildState,
}

pub fn prebuilt(planner: &Planner, json: bool) -> PlanResult<String> {
    let prebuilt = planner.prebuilt_dependencies();
    if json {
        return crate::to_json(&PrebuiltReport {
            starters: planner.base_buildings(),
            prebuilt: &prebuilt,
        });
    }

    let mut out = String::new();
    let _ = writeln!(out, "Starter buildings:");
    for starter in planner.base_buildings() {
        let _ = writeln!(out, "  {} L{}", starter.id, starter.level);
    }
    let _ = writeln!(out, "Prebuilt state ({} buildings):", prebuilt.len());
    for (id, level) in prebuilt.built() {
        let _ = writeln!(out, "  {id} L{level}");
    }
    Ok(out)
}
