//! Structured diagnostics emitted by the resolution engine.
//!
//! The engine never logs directly; it reports [`PlanEvent`]s to a
//! [`PlanObserver`]. [`TracingObserver`] forwards them to `tracing`.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::requirement::NodeKey;

/// Why a plan was cut short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruncateReason {
    /// The order had more entries than `max-dependencies`.
    TooLarge,
    /// Computation exceeded `time-budget-ms`.
    TimeBudget,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanEvent {
    BuildingNotFound {
        id: String,
    },
    LevelNotFound {
        id: String,
        level: u32,
    },
    /// A node was reached again while still on the active expansion path.
    CycleDetected {
        node: NodeKey,
    },
    /// Topological ordering did not cover every node; input order was used.
    OrderFallback {
        ordered: usize,
        total: usize,
    },
    OrderViolation {
        node: NodeKey,
        step: usize,
        requires: NodeKey,
        required_step: usize,
    },
    /// The ordered plan failed its post-order check.
    OrderInvalid {
        target: NodeKey,
        violations: usize,
    },
    /// Computation ran past `time-budget-ms`, whether or not the plan was cut.
    BudgetExceeded {
        target: NodeKey,
        elapsed: Duration,
        budget: Duration,
        entries: usize,
    },
    Truncated {
        target: NodeKey,
        total: usize,
        kept: usize,
        reason: TruncateReason,
    },
    SlowCalculation {
        target: NodeKey,
        elapsed: Duration,
        entries: usize,
    },
    CacheHit {
        key: String,
    },
    CacheMiss {
        key: String,
    },
    CacheEvicted {
        removed: usize,
        remaining: usize,
    },
    /// Periodic cache summary.
    CacheReport {
        hit_rate: f64,
        size: usize,
        lookups: u64,
    },
    PlanComputed {
        target: NodeKey,
        total: usize,
        built: usize,
        elapsed: Duration,
        /// Entry count per depth, only for large plans.
        depth_distribution: Option<BTreeMap<u32, usize>>,
    },
}

/// Receiver for engine diagnostics.
pub trait PlanObserver: Send + Sync {
    fn on_event(&self, event: &PlanEvent);
}

/// Observer that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl PlanObserver for NullObserver {
    fn on_event(&self, _event: &PlanEvent) {}
}

/// Observer that keeps every event in memory, for callers that want to
/// surface diagnostics themselves.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<PlanEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PlanEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl PlanObserver for RecordingObserver {
    fn on_event(&self, event: &PlanEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
    }
}

/// Default observer: forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PlanObserver for TracingObserver {
    fn on_event(&self, event: &PlanEvent) {
        match event {
            PlanEvent::BuildingNotFound { id } => {
                tracing::error!("Building not found: {id}");
            }
            PlanEvent::LevelNotFound { id, level } => {
                tracing::error!("Level {level} not found for building {id}");
            }
            PlanEvent::CycleDetected { node } => {
                tracing::warn!("Circular dependency detected: {node}");
            }
            PlanEvent::OrderFallback { ordered, total } => {
                tracing::warn!(
                    "Topological sort incomplete: {ordered}/{total} nodes processed, possible cycle; using input order"
                );
            }
            PlanEvent::OrderViolation {
                node,
                step,
                requires,
                required_step,
            } => {
                tracing::warn!(
                    "Dependency violation: {node} (step {step}) requires {requires} (step {required_step})"
                );
            }
            PlanEvent::OrderInvalid { target, violations } => {
                tracing::error!(
                    "Build order validation failed for {target}: {violations} dependency violations found"
                );
            }
            PlanEvent::BudgetExceeded {
                target,
                elapsed,
                budget,
                entries,
            } => {
                tracing::error!(
                    "Calculation timeout for {target}: {}ms exceeds the {}ms budget ({entries} deps)",
                    elapsed.as_millis(),
                    budget.as_millis()
                );
            }
            PlanEvent::Truncated {
                target,
                total,
                kept,
                reason,
            } => match reason {
                TruncateReason::TooLarge => tracing::warn!(
                    "Large dependency set for {target} ({total}), limiting to {kept}"
                ),
                TruncateReason::TimeBudget => tracing::error!(
                    "Calculation for {target} exceeded its time budget, returning {kept} of {total} steps"
                ),
            },
            PlanEvent::SlowCalculation {
                target,
                elapsed,
                entries,
            } => {
                tracing::warn!(
                    "Slow dependency calculation: {:.1}ms for {target} ({entries} deps)",
                    elapsed.as_secs_f64() * 1000.0
                );
            }
            PlanEvent::CacheHit { key } => tracing::trace!(key = %key, "cache hit"),
            PlanEvent::CacheMiss { key } => tracing::trace!(key = %key, "cache miss"),
            PlanEvent::CacheEvicted { removed, remaining } => {
                tracing::debug!("Cache cleanup: removed {removed} entries, {remaining} remaining");
            }
            PlanEvent::CacheReport {
                hit_rate,
                size,
                lookups,
            } => {
                tracing::debug!(
                    "Cache performance: {:.1}% hit rate over {lookups} lookups, {size} entries",
                    hit_rate * 100.0
                );
            }
            PlanEvent::PlanComputed {
                target,
                total,
                built,
                elapsed,
                depth_distribution,
            } => {
                tracing::debug!(
                    target_node = %target,
                    total,
                    built,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "plan computed"
                );
                if let Some(dist) = depth_distribution {
                    let rendered: Vec<String> =
                        dist.iter().map(|(d, n)| format!("D{d}:{n}")).collect();
                    tracing::debug!("Depth distribution for {target}: {}", rendered.join(", "));
                }
            }
        }
    }
}
