//! Output records of a dependency query.

use std::fmt;

/// A `(building, level)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    pub id: String,
    pub level: u32,
}

impl NodeKey {
    pub fn new(id: &str, level: u32) -> Self {
        Self {
            id: id.to_string(),
            level,
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} L{}", self.id, self.level)
    }
}

/// One `(building, level)` the player must construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequirement {
    pub id: String,
    pub level: u32,
    /// Whether the effective build state already covers this level.
    pub is_built: bool,
    /// 1-based position in the build order; 0 until ordered.
    pub step: usize,
    /// Longest prerequisite chain beneath this level.
    pub depth: u32,
    /// Number of direct prerequisites declared by this level.
    pub requirement_count: usize,
}

impl BuildRequirement {
    pub fn key(&self) -> NodeKey {
        NodeKey::new(&self.id, self.level)
    }
}

impl fmt::Display for BuildRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>3}. {} L{}", self.step, self.id, self.level)
    }
}

/// The ordered result of a dependency query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    pub target: NodeKey,
    /// Requirements in build order, `step` values 1..=N.
    pub requirements: Vec<BuildRequirement>,
    /// Length of the full order before any truncation.
    pub total: usize,
    /// Set when the size guard or time budget cut the order short.
    pub truncated: bool,
}

impl BuildPlan {
    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BuildRequirement> {
        self.requirements.iter()
    }

    /// Find the entry for a specific building level.
    pub fn find(&self, id: &str, level: u32) -> Option<&BuildRequirement> {
        self.requirements
            .iter()
            .find(|r| r.id == id && r.level == level)
    }
}
