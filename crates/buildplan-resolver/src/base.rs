//! Starter-building overlay.
//!
//! Every player owns a fixed set of starter buildings from the outset. This
//! module computes the smallest build state that satisfies all of their
//! prerequisites transitively. It runs once per [`crate::Planner`]; the result
//! is merged into every query's effective state.

use std::collections::HashSet;

use buildplan_core::catalog::CatalogProvider;
use buildplan_core::config::StarterEntry;
use buildplan_core::state::BuildState;

use crate::diagnostics::{PlanEvent, PlanObserver};
use crate::requirement::NodeKey;

/// The resolved starter overlay.
#[derive(Debug, Clone, Default)]
pub struct BaseState {
    starters: Vec<StarterEntry>,
    state: BuildState,
}

impl BaseState {
    /// Walk every starter entry depth-first, recording each visited
    /// `(building, level)` at its highest level seen.
    ///
    /// Starters absent from the catalog are still recorded at their declared
    /// level; their prerequisites simply cannot be followed.
    pub fn resolve<C: CatalogProvider + ?Sized>(
        catalog: &C,
        starters: &[StarterEntry],
        observer: &dyn PlanObserver,
    ) -> Self {
        let mut state = BuildState::new();
        let mut processed = HashSet::new();
        for starter in starters {
            add_with_prerequisites(
                catalog,
                &starter.id,
                starter.level,
                &mut state,
                &mut processed,
                observer,
            );
        }

        tracing::debug!(
            "Prebuilt buildings initialized: {} buildings from {} starters",
            state.len(),
            starters.len()
        );

        Self {
            starters: starters.to_vec(),
            state,
        }
    }

    /// The overlay state: starters plus their transitive prerequisites.
    pub fn state(&self) -> &BuildState {
        &self.state
    }

    pub fn starters(&self) -> &[StarterEntry] {
        &self.starters
    }

    /// Merge the overlay into a caller-supplied state.
    ///
    /// The higher of the two levels wins for every building, so starters and
    /// their prerequisites never read lower than the overlay even when the
    /// caller's state disagrees.
    pub fn effective_state(&self, user: &BuildState) -> BuildState {
        let mut effective = user.merged_with(&self.state);
        for starter in &self.starters {
            effective.raise_to(&starter.id, starter.level);
        }
        effective
    }
}

fn add_with_prerequisites<C: CatalogProvider + ?Sized>(
    catalog: &C,
    id: &str,
    level: u32,
    state: &mut BuildState,
    processed: &mut HashSet<NodeKey>,
    observer: &dyn PlanObserver,
) {
    if !processed.insert(NodeKey::new(id, level)) {
        return;
    }

    state.raise_to(id, level);

    let Some(building) = catalog.find_building(id) else {
        observer.on_event(&PlanEvent::BuildingNotFound { id: id.to_string() });
        return;
    };
    let Some(record) = building.level(level) else {
        observer.on_event(&PlanEvent::LevelNotFound {
            id: id.to_string(),
            level,
        });
        return;
    };

    for (req_id, &req_level) in &record.requirements {
        add_with_prerequisites(catalog, req_id, req_level, state, processed, observer);
    }
}
