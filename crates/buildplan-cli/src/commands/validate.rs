use std::path::Path;

use miette::Result;

use buildplan_ops::context::load_state;
use buildplan_ops::ops_validate;
use buildplan_resolver::Planner;

pub fn exec(planner: &Planner, state: &Path) -> Result<()> {
    let state = load_state(Some(state))?;
    print!("{}", ops_validate::validate(planner, &state)?);
    Ok(())
}
