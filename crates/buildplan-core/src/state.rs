//! Player build state: the highest level built per building.

use std::collections::BTreeMap;
use std::path::Path;

use buildplan_util::errors::PlanError;
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogProvider;

/// Snapshot of what a player has already constructed.
///
/// Maps building id to the highest level built. An absent entry and an entry
/// at level 0 both mean "not built". Levels are stored signed so that
/// externally loaded state with negative levels can be reported by
/// [`validate_build_state`] instead of failing to parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildState {
    levels: BTreeMap<String, i64>,
}

impl BuildState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a state file: a JSON object mapping building id to level.
    pub fn from_path(path: &Path) -> Result<Self, PlanError> {
        let content = std::fs::read_to_string(path).map_err(|e| PlanError::State {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        serde_json::from_str(&content).map_err(|e| PlanError::State {
            message: format!("Failed to parse {}: {e}", path.display()),
        })
    }

    /// Current level of a building; negative or missing entries read as 0.
    pub fn level(&self, id: &str) -> u32 {
        self.levels
            .get(id)
            .map(|&l| u32::try_from(l.max(0)).unwrap_or(u32::MAX))
            .unwrap_or(0)
    }

    /// Raise a building to at least `level`, never lowering it.
    pub fn raise_to(&mut self, id: &str, level: u32) {
        let entry = self.levels.entry(id.to_string()).or_insert(0);
        *entry = (*entry).max(i64::from(level));
    }

    pub fn is_built(&self, id: &str, level: u32) -> bool {
        self.level(id) >= level
    }

    /// Entries in building-id order, including zero or negative levels.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.levels.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Entries with a positive level, in building-id order.
    pub fn built(&self) -> impl Iterator<Item = (&str, u32)> {
        self.iter()
            .filter(|(_, l)| *l > 0)
            .map(|(id, l)| (id, u32::try_from(l).unwrap_or(u32::MAX)))
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Merge `overlay` into a copy of `self`, keeping the higher level of the
    /// two for every building.
    pub fn merged_with(&self, overlay: &BuildState) -> BuildState {
        let mut merged = self.clone();
        for (id, level) in overlay.built() {
            merged.raise_to(id, level);
        }
        merged
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for BuildState {
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        Self {
            levels: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Outcome of [`validate_build_state`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StateValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Check every entry of `state` against the catalog: the building must
/// exist, and the level must be non-negative and within the building's
/// maximum level.
pub fn validate_build_state<C: CatalogProvider + ?Sized>(
    catalog: &C,
    state: &BuildState,
) -> StateValidation {
    let mut errors = Vec::new();

    for (id, level) in state.iter() {
        let Some(building) = catalog.find_building(id) else {
            errors.push(format!("Invalid building ID: {id}"));
            continue;
        };

        let max_level = i64::from(building.max_level());
        if level > max_level {
            errors.push(format!(
                "Building {id} cannot exceed level {max_level} (current: {level})"
            ));
        }
        if level < 0 {
            errors.push(format!("Building {id} cannot have negative level"));
        }
    }

    StateValidation {
        is_valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_reads_as_zero() {
        let state: BuildState = [("queen", -3)].into_iter().collect();
        assert_eq!(state.level("queen"), 0);
        assert_eq!(state.level("missing"), 0);
    }

    #[test]
    fn raise_never_lowers() {
        let mut state = BuildState::new();
        state.raise_to("queen", 4);
        state.raise_to("queen", 2);
        assert_eq!(state.level("queen"), 4);
    }

    #[test]
    fn built_skips_zero_levels() {
        let state: BuildState = [("a", 0), ("b", 2)].into_iter().collect();
        let built: Vec<_> = state.built().collect();
        assert_eq!(built, vec![("b", 2)]);
    }
}
