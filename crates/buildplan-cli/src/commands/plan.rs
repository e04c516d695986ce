//! Handler for `buildplan plan`.

use std::path::Path;

use miette::Result;

use buildplan_ops::context::load_state;
use buildplan_ops::ops_plan::{self, PlanFormat};
use buildplan_resolver::Planner;

pub fn exec(
    planner: &Planner,
    building: &str,
    level: u32,
    state: Option<&Path>,
    json: bool,
    tree: bool,
) -> Result<()> {
    let state = load_state(state)?;
    let format = if json {
        PlanFormat::Json
    } else if tree {
        PlanFormat::Tree
    } else {
        PlanFormat::Text
    };

    let out = ops_plan::plan(planner, building, level, &state, format)?;
    if json {
        println!("{out}");
    } else {
        print!("{out}");
    }
    Ok(())
}
