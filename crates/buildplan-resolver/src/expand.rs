//! Prerequisite expansion: turns a target `(building, level)` into the flat,
//! deduplicated set of levels that still have to be built.

use std::collections::{HashMap, HashSet};

use buildplan_core::catalog::CatalogProvider;
use buildplan_core::state::BuildState;

use crate::diagnostics::{PlanEvent, PlanObserver};
use crate::requirement::{BuildRequirement, NodeKey};

/// Tracks the nodes on the active expansion path.
///
/// A node is entered before its prerequisites are expanded and left once
/// they are done, so membership means "currently being expanded". Reaching a
/// member again is a cycle.
#[derive(Debug, Default)]
pub struct PathSet {
    active: HashSet<NodeKey>,
}

impl PathSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a node. Returns `false` if it is already on the path.
    pub fn enter(&mut self, key: NodeKey) -> bool {
        self.active.insert(key)
    }

    pub fn leave(&mut self, key: &NodeKey) {
        self.active.remove(key);
    }

    pub fn contains(&self, key: &NodeKey) -> bool {
        self.active.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// Memoized longest-prerequisite-chain lengths.
///
/// Depth depends only on the catalog, never on a build state, so one memo
/// serves every query against the same catalog.
#[derive(Debug, Default)]
pub struct DepthMemo {
    depths: HashMap<NodeKey, u32>,
}

impl DepthMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Depth of a level: 0 when it has no prerequisites (or is unknown),
    /// otherwise one more than its deepest prerequisite.
    pub fn depth<C: CatalogProvider + ?Sized>(&mut self, catalog: &C, id: &str, level: u32) -> u32 {
        let mut in_progress = HashSet::new();
        self.compute(catalog, NodeKey::new(id, level), &mut in_progress).0
    }

    /// Returns the depth and whether a cycle was cut beneath `key`. Cut
    /// results depend on where the walk entered the cycle, so they are not
    /// memoized.
    fn compute<C: CatalogProvider + ?Sized>(
        &mut self,
        catalog: &C,
        key: NodeKey,
        in_progress: &mut HashSet<NodeKey>,
    ) -> (u32, bool) {
        if let Some(&depth) = self.depths.get(&key) {
            return (depth, false);
        }
        if !in_progress.insert(key.clone()) {
            return (0, true);
        }

        let mut depth = 0;
        let mut cut = false;
        if let Some(record) = catalog.find_level(&key.id, key.level) {
            for (id, &level) in &record.requirements {
                let (child, child_cut) = self.compute(catalog, NodeKey::new(id, level), in_progress);
                depth = depth.max(child + 1);
                cut |= child_cut;
            }
        }

        in_progress.remove(&key);
        if !cut {
            self.depths.insert(key, depth);
        }
        (depth, cut)
    }
}

/// Expand every unmet level needed to reach `target_level` of `target_id`.
///
/// For the target and, recursively, for every prerequisite, each level from
/// the building's current level + 1 up to the required level is emitted, so
/// level-chain steps appear explicitly even when the catalog only names the
/// final level. The result is deduplicated and listed in discovery order
/// (prerequisites before the level that needs them).
///
/// Missing buildings or levels and prerequisite cycles are reported to
/// `observer` and the offending branch is skipped.
pub fn expand<C: CatalogProvider + ?Sized>(
    catalog: &C,
    target_id: &str,
    target_level: u32,
    state: &BuildState,
    depths: &mut DepthMemo,
    observer: &dyn PlanObserver,
) -> Vec<BuildRequirement> {
    let mut expansion = Expansion {
        catalog,
        state,
        depths,
        observer,
        emitted: HashSet::new(),
        failed: HashSet::new(),
        out: Vec::new(),
    };
    let mut path = PathSet::new();
    expansion.expand_chain(target_id, target_level, &mut path);
    expansion.out
}

struct Expansion<'a, C: ?Sized> {
    catalog: &'a C,
    state: &'a BuildState,
    depths: &'a mut DepthMemo,
    observer: &'a dyn PlanObserver,
    emitted: HashSet<NodeKey>,
    /// Nodes already reported as missing, so each is reported once.
    failed: HashSet<NodeKey>,
    out: Vec<BuildRequirement>,
}

impl<C: CatalogProvider + ?Sized> Expansion<'_, C> {
    fn expand_chain(&mut self, id: &str, required: u32, path: &mut PathSet) {
        let current = self.state.level(id);
        for level in current.saturating_add(1)..=required {
            self.visit(id, level, path);
        }
    }

    fn visit(&mut self, id: &str, level: u32, path: &mut PathSet) {
        let key = NodeKey::new(id, level);
        if path.contains(&key) {
            self.observer.on_event(&PlanEvent::CycleDetected { node: key });
            return;
        }
        if self.emitted.contains(&key) || self.failed.contains(&key) {
            return;
        }

        let catalog = self.catalog;
        let Some(building) = catalog.find_building(id) else {
            self.failed.insert(key);
            self.observer.on_event(&PlanEvent::BuildingNotFound { id: id.to_string() });
            return;
        };
        let Some(record) = building.level(level) else {
            self.failed.insert(key);
            self.observer.on_event(&PlanEvent::LevelNotFound {
                id: id.to_string(),
                level,
            });
            return;
        };

        path.enter(key.clone());
        for (req_id, &req_level) in &record.requirements {
            self.expand_chain(req_id, req_level, path);
        }
        path.leave(&key);

        self.emitted.insert(key);
        self.out.push(BuildRequirement {
            id: id.to_string(),
            level,
            is_built: self.state.is_built(id, level),
            step: 0,
            depth: self.depths.depth(catalog, id, level),
            requirement_count: record.requirements.len(),
        });
    }
}
