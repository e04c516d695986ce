use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use buildplan_util::errors::PlanError;

/// Planner configuration loaded from `~/.buildplan/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub planner: PlannerSection,

    #[serde(default)]
    pub cache: CacheConfig,

    /// Buildings assumed pre-built at game start.
    #[serde(default = "default_starters")]
    pub starters: Vec<StarterEntry>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            planner: PlannerSection::default(),
            cache: CacheConfig::default(),
            starters: default_starters(),
        }
    }
}

/// Query limits from `[planner]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerSection {
    #[serde(default = "default_max_dependencies", rename = "max-dependencies")]
    pub max_dependencies: usize,
    #[serde(default = "default_time_budget_ms", rename = "time-budget-ms")]
    pub time_budget_ms: u64,
    #[serde(default = "default_slow_threshold_ms", rename = "slow-threshold-ms")]
    pub slow_threshold_ms: u64,
    /// Check every computed order for prerequisite violations.
    #[serde(default = "default_validate_order", rename = "validate-order")]
    pub validate_order: bool,
}

impl Default for PlannerSection {
    fn default() -> Self {
        Self {
            max_dependencies: default_max_dependencies(),
            time_budget_ms: default_time_budget_ms(),
            slow_threshold_ms: default_slow_threshold_ms(),
            validate_order: default_validate_order(),
        }
    }
}

fn default_max_dependencies() -> usize {
    500
}

fn default_time_budget_ms() -> u64 {
    5000
}

fn default_slow_threshold_ms() -> u64 {
    100
}

fn default_validate_order() -> bool {
    cfg!(debug_assertions)
}

/// Result cache sizing from `[cache]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Entry count at which the oldest entries are evicted.
    #[serde(default = "default_high_water", rename = "high-water")]
    pub high_water: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            high_water: default_high_water(),
        }
    }
}

fn default_capacity() -> usize {
    100
}

fn default_high_water() -> usize {
    120
}

/// A `[[starters]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarterEntry {
    pub id: String,
    pub level: u32,
}

impl StarterEntry {
    pub fn new(id: &str, level: u32) -> Self {
        Self {
            id: id.to_string(),
            level,
        }
    }
}

fn default_starters() -> Vec<StarterEntry> {
    [
        "queen",
        "plant_depot",
        "wet_soil_depot",
        "fungus_depot",
        "sand_depot",
        "meat_depot",
        "plant_flora",
        "wet_soil_pile",
        "leafcutter",
        "sand_pile",
        "woodlouse_colony",
    ]
    .into_iter()
    .map(|id| StarterEntry::new(id, 1))
    .collect()
}

impl PlannerConfig {
    /// Load the configuration from `~/.buildplan/config.toml`, or return defaults if the file doesn't exist.
    pub fn load() -> miette::Result<Self> {
        let path = Self::default_path();
        if path.is_file() {
            Self::from_path(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load and parse a config file at an explicit path.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PlanError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        toml::from_str(&content).map_err(|e| {
            PlanError::Config {
                message: format!("Failed to parse {}: {e}", path.display()),
            }
            .into()
        })
    }

    /// Returns the default path to the config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the path to the buildplan data directory (`~/.buildplan/`).
pub fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".buildplan")
}
