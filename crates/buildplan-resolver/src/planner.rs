//! The planning service: validates a query, merges the starter overlay,
//! consults the result cache and, on a miss, runs expansion and ordering.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use buildplan_core::catalog::{BuildingInfo, Catalog, CatalogProvider};
use buildplan_core::config::{PlannerConfig, StarterEntry};
use buildplan_core::state::{self, BuildState, StateValidation};
use buildplan_util::errors::PlanError;

use crate::base::BaseState;
use crate::cache::{cache_key, CacheMetrics, ResultCache};
use crate::cascade;
use crate::diagnostics::{PlanEvent, PlanObserver, TracingObserver, TruncateReason};
use crate::expand::{self, DepthMemo};
use crate::graph::{self, BuildGraph};
use crate::requirement::{BuildPlan, BuildRequirement, NodeKey};

/// Emit a cache summary every this many lookups.
const CACHE_REPORT_INTERVAL: u64 = 50;

/// Plans above this size get a depth distribution in their summary event.
const DEPTH_REPORT_THRESHOLD: usize = 100;

/// Dependency planner over one catalog.
///
/// The starter overlay is resolved once at construction. The result cache and
/// the depth memo are guarded by mutexes, and a query holds the cache lock
/// from lookup to store, so concurrent queries for the same key never compute
/// twice.
pub struct Planner<C: CatalogProvider = Catalog> {
    catalog: C,
    config: PlannerConfig,
    base: BaseState,
    depths: Mutex<DepthMemo>,
    cache: Mutex<ResultCache>,
    observer: Arc<dyn PlanObserver>,
}

impl<C: CatalogProvider + std::fmt::Debug> std::fmt::Debug for Planner<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Planner")
            .field("catalog", &self.catalog)
            .field("config", &self.config)
            .field("base", &self.base)
            .field("depths", &self.depths)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl<C: CatalogProvider> Planner<C> {
    /// Create a planner reporting diagnostics through `tracing`.
    pub fn new(catalog: C, config: PlannerConfig) -> Self {
        Self::with_observer(catalog, config, Arc::new(TracingObserver))
    }

    pub fn with_observer(catalog: C, config: PlannerConfig, observer: Arc<dyn PlanObserver>) -> Self {
        let base = BaseState::resolve(&catalog, &config.starters, observer.as_ref());
        let cache = ResultCache::from_config(&config.cache);
        Self {
            catalog,
            config,
            base,
            depths: Mutex::new(DepthMemo::new()),
            cache: Mutex::new(cache),
            observer,
        }
    }

    /// Compute the ordered build sequence needed to reach `target_level` of
    /// `target_id` from `user_state`.
    ///
    /// Fully satisfied levels are omitted, so an already reached target
    /// yields an empty plan. Unknown targets and levels without a level
    /// record are errors. Catalog faults along the way only degrade the
    /// result. Plans longer than `max-dependencies`, or computed past the
    /// time budget, are cut to a prefix and flagged `truncated`.
    pub fn calculate_build_dependencies(
        &self,
        target_id: &str,
        target_level: u32,
        user_state: &BuildState,
    ) -> Result<Arc<BuildPlan>, PlanError> {
        let building = self
            .catalog
            .find_building(target_id)
            .ok_or_else(|| PlanError::UnknownBuilding {
                id: target_id.to_string(),
            })?;
        if target_level == 0 || building.level(target_level).is_none() {
            return Err(PlanError::InvalidLevel {
                id: target_id.to_string(),
                level: target_level,
                max: building.max_level(),
            });
        }

        let effective = self.base.effective_state(user_state);
        let key = cache_key(target_id, target_level, &effective);

        let mut cache = self.lock_cache();
        let cached = cache.get(&key);
        self.report_cache_traffic(&cache, &key, cached.is_some());
        if let Some(plan) = cached {
            return Ok(plan);
        }

        let plan = Arc::new(self.compute(target_id, target_level, &effective));
        let evicted = cache.put(key, Arc::clone(&plan));
        if evicted > 0 {
            self.observer.on_event(&PlanEvent::CacheEvicted {
                removed: evicted,
                remaining: cache.len(),
            });
        }
        Ok(plan)
    }

    fn compute(&self, target_id: &str, target_level: u32, effective: &BuildState) -> BuildPlan {
        let started = Instant::now();
        let target = NodeKey::new(target_id, target_level);
        let observer = self.observer.as_ref();

        let expanded = {
            let mut depths = self.lock_depths();
            expand::expand(&self.catalog, target_id, target_level, effective, &mut depths, observer)
        };
        let mut ordered = graph::order(&self.catalog, expanded, target_id, observer);

        if self.config.planner.validate_order {
            let violations = graph::find_violations(&self.catalog, &ordered, observer);
            if !violations.is_empty() {
                self.observer.on_event(&PlanEvent::OrderInvalid {
                    target: target.clone(),
                    violations: violations.len(),
                });
            }
        }

        let elapsed = started.elapsed();
        let total = ordered.len();
        let limit = self.config.planner.max_dependencies;

        if elapsed > Duration::from_millis(self.config.planner.slow_threshold_ms) {
            self.observer.on_event(&PlanEvent::SlowCalculation {
                target: target.clone(),
                elapsed,
                entries: total,
            });
        }

        let budget = Duration::from_millis(self.config.planner.time_budget_ms);
        let over_budget = elapsed > budget;
        if over_budget {
            self.observer.on_event(&PlanEvent::BudgetExceeded {
                target: target.clone(),
                elapsed,
                budget,
                entries: total,
            });
        }

        // Progress figures describe the full order, like `total`.
        let built = ordered.iter().filter(|r| r.is_built).count();
        let depths = (total > DEPTH_REPORT_THRESHOLD).then(|| depth_distribution(&ordered));
        let truncated = total > limit;
        if truncated {
            ordered.truncate(limit);
            let reason = if over_budget {
                TruncateReason::TimeBudget
            } else {
                TruncateReason::TooLarge
            };
            self.observer.on_event(&PlanEvent::Truncated {
                target: target.clone(),
                total,
                kept: limit,
                reason,
            });
        }

        self.observer.on_event(&PlanEvent::PlanComputed {
            target: target.clone(),
            total,
            built,
            elapsed,
            depth_distribution: depths,
        });

        BuildPlan {
            target,
            requirements: ordered,
            total,
            truncated,
        }
    }

    fn report_cache_traffic(&self, cache: &ResultCache, key: &str, hit: bool) {
        let event = if hit {
            PlanEvent::CacheHit { key: key.to_string() }
        } else {
            PlanEvent::CacheMiss { key: key.to_string() }
        };
        self.observer.on_event(&event);

        let metrics = cache.metrics();
        if metrics.lookups() % CACHE_REPORT_INTERVAL == 0 {
            self.observer.on_event(&PlanEvent::CacheReport {
                hit_rate: metrics.hit_rate(),
                size: metrics.size,
                lookups: metrics.lookups(),
            });
        }
    }

    /// Render the prerequisite tree of a computed plan's target.
    pub fn plan_tree(&self, plan: &BuildPlan) -> String {
        let graph = BuildGraph::from_requirements(&self.catalog, &plan.requirements);
        graph.print_tree(&plan.target)
    }

    /// Check an externally loaded state against the catalog.
    pub fn validate_build_state(&self, state: &BuildState) -> StateValidation {
        state::validate_build_state(&self.catalog, state)
    }

    /// The starter overlay: starter buildings and everything they need.
    pub fn prebuilt_dependencies(&self) -> BuildState {
        self.base.state().clone()
    }

    /// The configured starter entries.
    pub fn base_buildings(&self) -> &[StarterEntry] {
        self.base.starters()
    }

    pub fn building_info(&self, id: &str) -> Option<BuildingInfo> {
        self.catalog.find_building(id).map(|b| b.info())
    }

    /// Built levels that depend on `target_level` of `target_id`, most
    /// dependent first.
    pub fn cascade_unbuild(
        &self,
        target_id: &str,
        target_level: u32,
        state: &BuildState,
    ) -> Result<Vec<BuildRequirement>, PlanError> {
        if self.catalog.find_building(target_id).is_none() {
            return Err(PlanError::UnknownBuilding {
                id: target_id.to_string(),
            });
        }
        Ok(cascade::cascade_unbuild(&self.catalog, target_id, target_level, state))
    }

    /// Drop all cached plans and reset the cache counters.
    pub fn clear_dependency_cache(&self) {
        self.lock_cache().clear();
    }

    pub fn cache_metrics(&self) -> CacheMetrics {
        self.lock_cache().metrics()
    }

    /// Human-readable cache performance summary.
    pub fn performance_report(&self) -> String {
        self.cache_metrics().to_string()
    }

    fn lock_cache(&self) -> MutexGuard<'_, ResultCache> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_depths(&self) -> MutexGuard<'_, DepthMemo> {
        self.depths.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn depth_distribution(requirements: &[BuildRequirement]) -> BTreeMap<u32, usize> {
    let mut dist = BTreeMap::new();
    for req in requirements {
        *dist.entry(req.depth).or_insert(0) += 1;
    }
    dist
}
