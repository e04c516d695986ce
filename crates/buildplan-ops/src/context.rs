//! Loading the catalog and configuration a command runs against.

use std::path::Path;

use buildplan_core::catalog::Catalog;
use buildplan_core::config::PlannerConfig;
use buildplan_core::state::BuildState;
use buildplan_resolver::Planner;
use buildplan_util::errors::{PlanError, PlanResult};

/// Build a planner from a catalog path and an optional config path.
///
/// Without `config_path` the user config at `~/.buildplan/config.toml` is
/// used when it exists, otherwise the built-in defaults.
pub fn load_planner(catalog_path: Option<&Path>, config_path: Option<&Path>) -> PlanResult<Planner> {
    let catalog_path = catalog_path.ok_or_else(|| PlanError::Catalog {
        message: "No building catalog given; pass --catalog or set BUILDPLAN_CATALOG".to_string(),
    })?;
    let catalog = Catalog::from_path(catalog_path)?;
    if catalog.is_empty() {
        tracing::warn!("Catalog {} contains no buildings", catalog_path.display());
    }

    let config = match config_path {
        Some(path) => PlannerConfig::from_path(path)?,
        None => PlannerConfig::load()?,
    };
    tracing::debug!(
        "Loaded {} buildings, {} starters",
        catalog.len(),
        config.starters.len()
    );
    Ok(Planner::new(catalog, config))
}

/// Load a build-state file, or an empty state when none is given.
pub fn load_state(path: Option<&Path>) -> PlanResult<BuildState> {
    match path {
        Some(path) => Ok(BuildState::from_path(path)?),
        None => Ok(BuildState::new()),
    }
}
