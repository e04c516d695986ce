//! Bounded result cache for dependency queries.
//!
//! Keys combine the target with a digest of the effective build state. The
//! cache never computes anything itself; on a miss the caller runs the
//! pipeline and stores the result.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use buildplan_core::config::CacheConfig;
use buildplan_core::state::BuildState;
use buildplan_util::hash::short_digest;

use crate::requirement::BuildPlan;

/// Fraction of entries dropped per eviction, as a divisor (1/5 = 20%).
const EVICT_DIVISOR: usize = 5;

/// Canonical text form of a build state: `id:level` pairs of built entries,
/// sorted by building id and joined with `|`, or `empty`.
///
/// Zero-level entries are left out, so an absent building and one recorded
/// at level 0 produce the same fingerprint.
pub fn state_fingerprint(state: &BuildState) -> String {
    let parts: Vec<String> = state
        .built()
        .map(|(id, level)| format!("{id}:{level}"))
        .collect();
    if parts.is_empty() {
        "empty".to_string()
    } else {
        parts.join("|")
    }
}

/// Fixed-length digest of [`state_fingerprint`].
pub fn state_hash(state: &BuildState) -> String {
    short_digest(state_fingerprint(state).as_bytes(), 16)
}

/// Cache key for a query: `target-level-statehash`.
pub fn cache_key(target_id: &str, target_level: u32, state: &BuildState) -> String {
    format!("{target_id}-{target_level}-{}", state_hash(state))
}

/// Counters describing cache traffic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub size: usize,
}

impl CacheMetrics {
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of lookups that hit, 0.0 when nothing was looked up.
    pub fn hit_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            n => self.hits as f64 / n as f64,
        }
    }
}

impl fmt::Display for CacheMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dependency calculator performance:")?;
        writeln!(f, "  Cache hit rate: {:.1}%", self.hit_rate() * 100.0)?;
        writeln!(f, "  Cache size: {} entries", self.size)?;
        writeln!(f, "  Evicted entries: {}", self.evictions)?;
        write!(f, "  Total cache operations: {}", self.lookups())
    }
}

/// Insertion-ordered cache of computed plans.
///
/// Once the entry count reaches `high_water`, the oldest 20% of entries are
/// evicted before the next insert (at least enough to get back to
/// `capacity`). Insertion order stands in for recency.
#[derive(Debug)]
pub struct ResultCache {
    entries: HashMap<String, Arc<BuildPlan>>,
    order: VecDeque<String>,
    capacity: usize,
    high_water: usize,
    metrics: CacheMetrics,
}

impl ResultCache {
    pub fn new(capacity: usize, high_water: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
            high_water: high_water.max(capacity),
            metrics: CacheMetrics::default(),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.capacity, config.high_water)
    }

    /// Look up a key, counting the hit or miss.
    pub fn get(&mut self, key: &str) -> Option<Arc<BuildPlan>> {
        match self.entries.get(key) {
            Some(plan) => {
                self.metrics.hits += 1;
                Some(Arc::clone(plan))
            }
            None => {
                self.metrics.misses += 1;
                None
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Store a plan. Returns the number of entries evicted to make room.
    pub fn put(&mut self, key: String, plan: Arc<BuildPlan>) -> usize {
        if let Some(existing) = self.entries.get_mut(&key) {
            *existing = plan;
            return 0;
        }
        let evicted = self.evict_if_needed();
        self.order.push_back(key.clone());
        self.entries.insert(key, plan);
        evicted
    }

    fn evict_if_needed(&mut self) -> usize {
        let len = self.entries.len();
        if len < self.high_water {
            return 0;
        }
        let to_remove = (len / EVICT_DIVISOR).max(len.saturating_sub(self.capacity)).max(1);
        let mut removed = 0;
        while removed < to_remove {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            if self.entries.remove(&oldest).is_some() {
                removed += 1;
            }
        }
        self.metrics.evictions += removed as u64;
        removed
    }

    /// Drop every entry and reset the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.metrics = CacheMetrics::default();
    }

    pub fn metrics(&self) -> CacheMetrics {
        CacheMetrics {
            size: self.entries.len(),
            ..self.metrics
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}
