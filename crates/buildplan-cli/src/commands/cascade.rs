//! Handler for `buildplan cascade`.

use std::path::Path;

use miette::Result;

use buildplan_ops::context::load_state;
use buildplan_ops::ops_cascade;
use buildplan_resolver::Planner;

pub fn exec(planner: &Planner, building: &str, level: u32, state: &Path) -> Result<()> {
    let state = load_state(Some(state))?;
    print!("{}", ops_cascade::cascade(planner, building, level, &state)?);
    Ok(())
}
