//! Operation: describe one building.

use buildplan_core::catalog::BuildingInfo;
use buildplan_resolver::Planner;
use buildplan_util::errors::{PlanError, PlanResult};

pub fn info(planner: &Planner, id: &str, json: bool) -> PlanResult<String> {
    let info = planner
        .building_info(id)
        .ok_or_else(|| PlanError::UnknownBuilding { id: id.to_string() })?;
    if json {
        crate::to_json(&info)
    } else {
        Ok(render(&info))
    }
}

fn render(info: &BuildingInfo) -> String {
    let mut out = format!("{}\n  max level: {}\n", info.id, info.max_level);
    if let Some(depot) = &info.depot_type {
        out.push_str(&format!("  depot type: {depot}\n"));
    }
    for warn in &info.warns {
        out.push_str(&format!("  warning: {warn}\n"));
    }
    out
}
