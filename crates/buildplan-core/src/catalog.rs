//! Static building catalog: buildings, their levels, and level prerequisites.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use buildplan_util::errors::PlanError;
use serde::{Deserialize, Serialize};

/// One upgrade tier of a building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub level: u32,
    /// Prerequisite building id -> minimum required level of that building.
    #[serde(default)]
    pub requirements: BTreeMap<String, u32>,
    /// Resource costs and other per-level data the planner does not read.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Level {
    pub fn new(level: u32) -> Self {
        Self {
            level,
            requirements: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Builder-style helper adding one prerequisite.
    pub fn requires(mut self, building: &str, level: u32) -> Self {
        self.requirements.insert(building.to_string(), level);
        self
    }
}

/// An immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: String,
    #[serde(default)]
    pub levels: Vec<Level>,
    #[serde(default, rename = "depotType", skip_serializing_if = "Option::is_none")]
    pub depot_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warns: Vec<String>,
}

impl Building {
    pub fn new(id: &str, levels: Vec<Level>) -> Self {
        Self {
            id: id.to_string(),
            levels,
            depot_type: None,
            warns: Vec::new(),
        }
    }

    /// Look up the record for a specific level number.
    pub fn level(&self, level: u32) -> Option<&Level> {
        self.levels.iter().find(|l| l.level == level)
    }

    /// Highest level number declared for this building (0 if it has none).
    pub fn max_level(&self) -> u32 {
        self.levels.iter().map(|l| l.level).max().unwrap_or(0)
    }

    pub fn info(&self) -> BuildingInfo {
        BuildingInfo {
            id: self.id.clone(),
            max_level: self.max_level(),
            depot_type: self.depot_type.clone(),
            warns: self.warns.clone(),
        }
    }
}

/// Summary of a building for display purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildingInfo {
    pub id: String,
    pub max_level: u32,
    pub depot_type: Option<String>,
    pub warns: Vec<String>,
}

/// Read-only access to building definitions.
pub trait CatalogProvider {
    fn find_building(&self, id: &str) -> Option<&Building>;

    /// All buildings, in catalog order.
    fn buildings(&self) -> &[Building];

    /// Convenience lookup of a single level record.
    fn find_level(&self, id: &str, level: u32) -> Option<&Level> {
        self.find_building(id).and_then(|b| b.level(level))
    }
}

/// In-memory catalog loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    buildings: Vec<Building>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from building records.
    ///
    /// Levels are sorted ascending. Duplicate building ids or duplicate level
    /// numbers within one building are rejected.
    pub fn from_buildings(mut buildings: Vec<Building>) -> Result<Self, PlanError> {
        let mut index = HashMap::with_capacity(buildings.len());
        for (i, building) in buildings.iter_mut().enumerate() {
            if index.insert(building.id.clone(), i).is_some() {
                return Err(PlanError::Catalog {
                    message: format!("duplicate building id: {}", building.id),
                });
            }
            building.levels.sort_by_key(|l| l.level);
            let mut seen = HashSet::new();
            for level in &building.levels {
                if level.level == 0 {
                    return Err(PlanError::Catalog {
                        message: format!("building {} declares level 0", building.id),
                    });
                }
                if !seen.insert(level.level) {
                    return Err(PlanError::Catalog {
                        message: format!(
                            "building {} declares level {} twice",
                            building.id, level.level
                        ),
                    });
                }
            }
        }
        Ok(Self { buildings, index })
    }

    /// Parse a JSON array of buildings.
    pub fn from_json_str(content: &str) -> Result<Self, PlanError> {
        let buildings: Vec<Building> =
            serde_json::from_str(content).map_err(|e| PlanError::Catalog {
                message: format!("Failed to parse catalog: {e}"),
            })?;
        Self::from_buildings(buildings)
    }

    /// Load a catalog from a JSON file (array of buildings) or a directory of
    /// one-building-per-file `*.json` documents, read in file-name order.
    pub fn from_path(path: &Path) -> Result<Self, PlanError> {
        if path.is_dir() {
            Self::from_dir(path)
        } else {
            let content = std::fs::read_to_string(path).map_err(|e| PlanError::Catalog {
                message: format!("Failed to read catalog {}: {e}", path.display()),
            })?;
            Self::from_json_str(&content)
        }
    }

    fn from_dir(dir: &Path) -> Result<Self, PlanError> {
        let files = json_files(dir)?;
        let mut buildings = Vec::with_capacity(files.len());
        for file in &files {
            let content = std::fs::read_to_string(file)?;
            let building: Building =
                serde_json::from_str(&content).map_err(|e| PlanError::Catalog {
                    message: format!("Failed to parse {}: {e}", file.display()),
                })?;
            buildings.push(building);
        }
        tracing::debug!("Loaded {} buildings from {}", buildings.len(), dir.display());
        Self::from_buildings(buildings)
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }
}

/// `*.json` files directly inside `dir`, sorted by path.
fn json_files(dir: &Path) -> Result<Vec<PathBuf>, PlanError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

impl CatalogProvider for Catalog {
    fn find_building(&self, id: &str) -> Option<&Building> {
        self.index.get(id).map(|&i| &self.buildings[i])
    }

    fn buildings(&self) -> &[Building] {
        &self.buildings
    }
}
