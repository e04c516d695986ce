use miette::Result;

use buildplan_ops::ops_prebuilt;
use buildplan_resolver::Planner;

pub fn exec(planner: &Planner, json: bool) -> Result<()> {
    let out = ops_prebuilt::prebuilt(planner, json)?;
    if json {
        println!("{out}");
    } else {
        print!("{out}");
    }
    Ok(())
}
