use miette::Result;

use buildplan_ops::ops_info;
use buildplan_resolver::Planner;

pub fn exec(planner: &Planner, building: &str, json: bool) -> Result<()> {
    let out = ops_info::info(planner, building, json)?;
    if json {
        println!("{out}");
    } else {
        print!("{out}");
    }
    Ok(())
}
