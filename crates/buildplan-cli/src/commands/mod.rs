//! Command dispatch and handler modules.

mod cascade;
mod info;
mod plan;
mod prebuilt;
mod validate;

use miette::Result;

use buildplan_ops::context::load_planner;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    tracing::debug!("Running {:?}", cli.command);
    let planner = load_planner(cli.catalog.as_deref(), cli.config.as_deref())?;

    match cli.command {
        Command::Plan {
            building,
            level,
            state,
            json,
            tree,
        } => plan::exec(&planner, &building, level, state.as_deref(), json, tree),
        Command::Validate { state } => validate::exec(&planner, &state),
        Command::Prebuilt { json } => prebuilt::exec(&planner, json),
        Command::Info { building, json } => info::exec(&planner, &building, json),
        Command::Cascade {
            building,
            level,
            state,
        } => cascade::exec(&planner, &building, level, &state),
    }
}
