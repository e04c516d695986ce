//! Operation: list what must be unbuilt along with a building level.

use std::fmt::Write;

use buildplan_core::state::BuildState;
use buildplan_resolver::Planner;
use buildplan_util::errors::PlanResult;

pub fn cascade(planner: &Planner, building: &str, level: u32, state: &BuildState) -> PlanResult<String> {
    let affected = planner.cascade_unbuild(building, level, state)?;
    if affected.is_empty() {
        return Ok(format!("Nothing depends on {building} L{level}\n"));
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Removing {building} L{level} also removes {} level(s):",
        affected.len()
    );
    for req in &affected {
        let _ = writeln!(out, "{req}");
    }
    Ok(out)
}
