//! Build-order graph and topological ordering.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use buildplan_core::catalog::CatalogProvider;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::diagnostics::{PlanEvent, PlanObserver};
use crate::requirement::{BuildRequirement, NodeKey};

/// Why one level must be built before another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Declared in the dependent level's `requirements`.
    Prerequisite,
    /// Level `L - 1` of the same building precedes level `L`.
    LevelChain,
}

/// Directed graph over `(building, level)` nodes, with edges pointing from a
/// prerequisite to the level that needs it.
pub struct BuildGraph {
    graph: DiGraph<NodeKey, EdgeKind>,
    index: HashMap<NodeKey, NodeIndex>,
}

impl BuildGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
        }
    }

    /// Build the graph spanned by `requirements`.
    ///
    /// Node `i` corresponds to `requirements[i]`. Edges to levels outside the
    /// set are dropped: those are already built or out of scope.
    pub fn from_requirements<C: CatalogProvider + ?Sized>(
        catalog: &C,
        requirements: &[BuildRequirement],
    ) -> Self {
        let mut g = Self::new();
        for req in requirements {
            g.add_node(req.key());
        }

        for req in requirements {
            let Some(dependent) = g.find(&req.key()) else {
                continue;
            };
            if let Some(record) = catalog.find_level(&req.id, req.level) {
                for (req_id, &req_level) in &record.requirements {
                    if let Some(prereq) = g.find(&NodeKey::new(req_id, req_level)) {
                        g.add_edge(prereq, dependent, EdgeKind::Prerequisite);
                    }
                }
            }
            if req.level > 1 {
                if let Some(prev) = g.find(&NodeKey::new(&req.id, req.level - 1)) {
                    g.add_edge(prev, dependent, EdgeKind::LevelChain);
                }
            }
        }
        g
    }

    /// Add or retrieve a node. If the key already exists, returns the existing index.
    pub fn add_node(&mut self, key: NodeKey) -> NodeIndex {
        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }
        let idx = self.graph.add_node(key.clone());
        self.index.insert(key, idx);
        idx
    }

    /// Add an edge from `prerequisite` to `dependent`.
    pub fn add_edge(&mut self, prerequisite: NodeIndex, dependent: NodeIndex, kind: EdgeKind) {
        if !self
            .graph
            .edges(prerequisite)
            .any(|e| e.target() == dependent)
        {
            self.graph.add_edge(prerequisite, dependent, kind);
        }
    }

    pub fn find(&self, key: &NodeKey) -> Option<NodeIndex> {
        self.index.get(key).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &NodeKey {
        &self.graph[idx]
    }

    /// Levels that must be built before `idx`.
    pub fn prerequisites_of(&self, idx: NodeIndex) -> Vec<(NodeIndex, EdgeKind)> {
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| (e.source(), *e.weight()))
            .collect()
    }

    /// Levels that need `idx`.
    pub fn dependents_of(&self, idx: NodeIndex) -> Vec<(NodeIndex, EdgeKind)> {
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.target(), *e.weight()))
            .collect()
    }

    /// Render the prerequisite tree beneath `root`.
    pub fn print_tree(&self, root: &NodeKey) -> String {
        let mut output = String::new();
        let Some(idx) = self.find(root) else {
            return output;
        };
        output.push_str(&format!("{root}\n"));

        let mut visited = HashSet::new();
        visited.insert(idx);
        let prereqs = self.sorted_prerequisites(idx);
        let count = prereqs.len();
        for (i, child) in prereqs.into_iter().enumerate() {
            self.print_subtree(&mut output, child, "", i == count - 1, &mut visited);
        }
        output
    }

    fn print_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        output.push_str(&format!("{prefix}{connector}{}\n", self.graph[idx]));

        if !visited.insert(idx) {
            return;
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let prereqs = self.sorted_prerequisites(idx);
        let count = prereqs.len();
        for (i, child) in prereqs.into_iter().enumerate() {
            self.print_subtree(output, child, &child_prefix, i == count - 1, visited);
        }

        visited.remove(&idx);
    }

    fn sorted_prerequisites(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut prereqs: Vec<NodeIndex> = self
            .prerequisites_of(idx)
            .into_iter()
            .map(|(p, _)| p)
            .collect();
        prereqs.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));
        prereqs
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for BuildGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Tie-break between two simultaneously buildable levels.
///
/// Same building: lower level first. Otherwise lower level first, then fewer
/// direct prerequisites, then levels of other buildings before the target's
/// own, then building id.
pub fn compare_ready(a: &BuildRequirement, b: &BuildRequirement, target_id: &str) -> Ordering {
    if a.id == b.id {
        return a.level.cmp(&b.level);
    }
    a.level
        .cmp(&b.level)
        .then_with(|| a.requirement_count.cmp(&b.requirement_count))
        .then_with(|| (a.id == target_id).cmp(&(b.id == target_id)))
        .then_with(|| a.id.cmp(&b.id))
}

/// Order `requirements` so every prerequisite precedes its dependents and
/// assign contiguous `step` numbers from 1.
///
/// Kahn's algorithm, processed in rounds: each round's ready set is sorted
/// with [`compare_ready`] before it is emitted, so identical inputs always
/// produce identical output. If a cycle keeps some nodes from ever becoming
/// ready, the input order is used instead and an
/// [`PlanEvent::OrderFallback`] is reported.
pub fn order<C: CatalogProvider + ?Sized>(
    catalog: &C,
    requirements: Vec<BuildRequirement>,
    target_id: &str,
    observer: &dyn PlanObserver,
) -> Vec<BuildRequirement> {
    let mut seen = HashSet::new();
    let requirements: Vec<BuildRequirement> = requirements
        .into_iter()
        .filter(|r| seen.insert(r.key()))
        .collect();

    let graph = BuildGraph::from_requirements(catalog, &requirements);
    let mut in_degree: Vec<usize> = (0..requirements.len())
        .map(|i| graph.prerequisites_of(NodeIndex::new(i)).len())
        .collect();

    let mut ready: Vec<usize> = (0..requirements.len())
        .filter(|&i| in_degree[i] == 0)
        .collect();
    let mut sequence: Vec<usize> = Vec::with_capacity(requirements.len());

    while !ready.is_empty() {
        ready.sort_by(|&a, &b| compare_ready(&requirements[a], &requirements[b], target_id));
        let mut next = Vec::new();
        for i in ready {
            sequence.push(i);
            for (dependent, _) in graph.dependents_of(NodeIndex::new(i)) {
                let d = dependent.index();
                in_degree[d] -= 1;
                if in_degree[d] == 0 {
                    next.push(d);
                }
            }
        }
        ready = next;
    }

    if sequence.len() != requirements.len() {
        observer.on_event(&PlanEvent::OrderFallback {
            ordered: sequence.len(),
            total: requirements.len(),
        });
        return number_steps(requirements);
    }

    let mut slots: Vec<Option<BuildRequirement>> = requirements.into_iter().map(Some).collect();
    let ordered = sequence
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect();
    number_steps(ordered)
}

fn number_steps(mut requirements: Vec<BuildRequirement>) -> Vec<BuildRequirement> {
    for (i, req) in requirements.iter_mut().enumerate() {
        req.step = i + 1;
    }
    requirements
}

/// A prerequisite that appears after the level needing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderViolation {
    pub node: NodeKey,
    pub step: usize,
    pub requires: NodeKey,
    pub required_step: usize,
}

/// Check an ordered sequence for prerequisites (declared or level-chain)
/// that appear later than the level needing them. Each violation is also
/// reported to `observer`.
pub fn find_violations<C: CatalogProvider + ?Sized>(
    catalog: &C,
    ordered: &[BuildRequirement],
    observer: &dyn PlanObserver,
) -> Vec<OrderViolation> {
    let positions: HashMap<NodeKey, usize> = ordered
        .iter()
        .enumerate()
        .map(|(i, r)| (r.key(), i))
        .collect();

    let mut violations = Vec::new();
    for (i, req) in ordered.iter().enumerate() {
        let mut needed: Vec<NodeKey> = catalog
            .find_level(&req.id, req.level)
            .map(|record| {
                record
                    .requirements
                    .iter()
                    .map(|(id, &level)| NodeKey::new(id, level))
                    .collect()
            })
            .unwrap_or_default();
        if req.level > 1 {
            needed.push(NodeKey::new(&req.id, req.level - 1));
        }

        for key in needed {
            let Some(&j) = positions.get(&key) else {
                continue;
            };
            if j > i {
                let violation = OrderViolation {
                    node: req.key(),
                    step: req.step,
                    requires: key,
                    required_step: ordered[j].step,
                };
                observer.on_event(&PlanEvent::OrderViolation {
                    node: violation.node.clone(),
                    step: violation.step,
                    requires: violation.requires.clone(),
                    required_step: violation.required_step,
                });
                violations.push(violation);
            }
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{NullObserver, RecordingObserver};
    use buildplan_core::catalog::{Building, Catalog, Level};

    fn req(id: &str, level: u32, requirement_count: usize) -> BuildRequirement {
        BuildRequirement {
            id: id.to_string(),
            level,
            is_built: false,
            step: 0,
            depth: 0,
            requirement_count,
        }
    }

    fn keys(reqs: &[BuildRequirement]) -> Vec<String> {
        reqs.iter().map(|r| r.key().to_string()).collect()
    }

    fn sample_catalog() -> Catalog {
        Catalog::from_buildings(vec![
            Building::new(
                "a",
                vec![Level::new(1), Level::new(2).requires("b", 1)],
            ),
            Building::new("b", vec![Level::new(1)]),
        ])
        .unwrap()
    }

    #[test]
    fn graph_edges_include_level_chain() {
        let catalog = sample_catalog();
        let reqs = vec![req("b", 1, 0), req("a", 1, 0), req("a", 2, 1)];
        let g = BuildGraph::from_requirements(&catalog, &reqs);
        let a2 = g.find(&NodeKey::new("a", 2)).unwrap();
        let mut kinds: Vec<(String, EdgeKind)> = g
            .prerequisites_of(a2)
            .into_iter()
            .map(|(idx, kind)| (g.node(idx).to_string(), kind))
            .collect();
        kinds.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            kinds,
            vec![
                ("a L1".to_string(), EdgeKind::LevelChain),
                ("b L1".to_string(), EdgeKind::Prerequisite),
            ]
        );
    }

    #[test]
    fn duplicate_node_returns_same_index() {
        let mut g = BuildGraph::new();
        let a = g.add_node(NodeKey::new("a", 1));
        let b = g.add_node(NodeKey::new("a", 1));
        assert_eq!(a, b);
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn edges_outside_set_are_ignored() {
        let catalog = sample_catalog();
        let reqs = vec![req("a", 2, 1)];
        let g = BuildGraph::from_requirements(&catalog, &reqs);
        assert!(g.prerequisites_of(NodeIndex::new(0)).is_empty());
    }

    #[test]
    fn orders_prerequisites_first() {
        let catalog = sample_catalog();
        let reqs = vec![req("a", 2, 1), req("a", 1, 0), req("b", 1, 0)];
        let ordered = order(&catalog, reqs, "a", &NullObserver);
        assert_eq!(keys(&ordered), vec!["b L1", "a L1", "a L2"]);
        let steps: Vec<usize> = ordered.iter().map(|r| r.step).collect();
        assert_eq!(steps, vec![1, 2, 3]);
    }

    #[test]
    fn tie_break_prefers_lower_level_then_fewer_requirements() {
        let mut reqs = vec![req("x", 2, 0), req("y", 1, 3), req("z", 1, 1)];
        reqs.sort_by(|a, b| compare_ready(a, b, "target"));
        assert_eq!(keys(&reqs), vec!["z L1", "y L1", "x L2"]);
    }

    #[test]
    fn tie_break_falls_back_to_id() {
        let mut reqs = vec![req("m", 1, 0), req("c", 1, 0), req("k", 1, 0)];
        reqs.sort_by(|a, b| compare_ready(a, b, "target"));
        assert_eq!(keys(&reqs), vec!["c L1", "k L1", "m L1"]);
    }

    #[test]
    fn ordering_is_independent_of_input_order() {
        let catalog = sample_catalog();
        let forward = order(
            &catalog,
            vec![req("b", 1, 0), req("a", 1, 0), req("a", 2, 1)],
            "a",
            &NullObserver,
        );
        let backward = order(
            &catalog,
            vec![req("a", 2, 1), req("a", 1, 0), req("b", 1, 0)],
            "a",
            &NullObserver,
        );
        assert_eq!(forward, backward);
    }

    #[test]
    fn cycle_falls_back_to_input_order() {
        let catalog = Catalog::from_buildings(vec![
            Building::new("a", vec![Level::new(1).requires("b", 1)]),
            Building::new("b", vec![Level::new(1).requires("a", 1)]),
        ])
        .unwrap();
        let observer = RecordingObserver::new();
        let ordered = order(&catalog, vec![req("b", 1, 1), req("a", 1, 1)], "a", &observer);
        assert_eq!(keys(&ordered), vec!["b L1", "a L1"]);
        assert_eq!(ordered[0].step, 1);
        assert_eq!(ordered[1].step, 2);
        assert_eq!(
            observer.events(),
            vec![PlanEvent::OrderFallback {
                ordered: 0,
                total: 2
            }]
        );
    }

    #[test]
    fn violations_detected() {
        let catalog = sample_catalog();
        let mut bad = vec![req("a", 2, 1), req("a", 1, 0), req("b", 1, 0)];
        for (i, r) in bad.iter_mut().enumerate() {
            r.step = i + 1;
        }
        let observer = RecordingObserver::new();
        let violations = find_violations(&catalog, &bad, &observer);
        assert_eq!(violations.len(), 2);
        assert_eq!(observer.events().len(), 2);

        let good = order(&catalog, bad, "a", &NullObserver);
        assert!(find_violations(&catalog, &good, &NullObserver).is_empty());
    }

    #[test]
    fn tree_printing() {
        let catalog = sample_catalog();
        let reqs = vec![req("b", 1, 0), req("a", 1, 0), req("a", 2, 1)];
        let g = BuildGraph::from_requirements(&catalog, &reqs);
        let tree = g.print_tree(&NodeKey::new("a", 2));
        assert_eq!(tree, "a L2\n├── a L1\n└── b L1\n");
    }

    #[test]
    fn tree_for_unknown_root_is_empty() {
        let g = BuildGraph::new();
        assert!(g.print_tree(&NodeKey::new("a", 1)).is_empty());
    }
}
