//! Operation: compute and render a build plan.

use std::fmt::Write;

use serde::Serialize;

use buildplan_core::state::BuildState;
use buildplan_resolver::{BuildPlan, Planner};
use buildplan_util::errors::PlanResult;

/// Output format for `buildplan plan`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlanFormat {
    #[default]
    Text,
    Json,
    Tree,
}

/// Compact persisted form of one queued build step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueItem {
    pub id: String,
    pub level: u32,
    pub step: usize,
}

/// Compute the plan for `building` at `level` and render it.
pub fn plan(
    planner: &Planner,
    building: &str,
    level: u32,
    state: &BuildState,
    format: PlanFormat,
) -> PlanResult<String> {
    let plan = planner.calculate_build_dependencies(building, level, state)?;
    tracing::debug!("{}", planner.performance_report());
    match format {
        PlanFormat::Text => Ok(render_text(&plan)),
        PlanFormat::Json => crate::to_json(&queue_items(&plan)),
        PlanFormat::Tree => {
            let tree = planner.plan_tree(&plan);
            if tree.is_empty() {
                Ok(render_text(&plan))
            } else {
                Ok(tree)
            }
        }
    }
}

pub fn queue_items(plan: &BuildPlan) -> Vec<QueueItem> {
    plan.iter()
        .map(|r| QueueItem {
            id: r.id.clone(),
            level: r.level,
            step: r.step,
        })
        .collect()
}

pub fn render_text(plan: &BuildPlan) -> String {
    if plan.is_empty() {
        return format!("{} is already built\n", plan.target);
    }

    let mut out = String::new();
    let _ = writeln!(out, "Build plan for {} ({} steps):", plan.target, plan.len());
    for req in plan.iter() {
        let _ = writeln!(out, "{req}");
    }
    if plan.truncated {
        let _ = writeln!(
            out,
            "(truncated: showing {} of {} steps)",
            plan.len(),
            plan.total
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildplan_resolver::{BuildRequirement, NodeKey};

    fn sample(truncated: bool) -> BuildPlan {
        let req = |id: &str, level, step| BuildRequirement {
            id: id.to_string(),
            level,
            is_built: false,
            step,
            depth: 0,
            requirement_count: 0,
        };
        BuildPlan {
            target: NodeKey::new("A", 2),
            requirements: vec![req("B", 1, 1), req("A", 1, 2), req("A", 2, 3)],
            total: if truncated { 10 } else { 3 },
            truncated,
        }
    }

    #[test]
    fn text_lists_numbered_steps() {
        let text = render_text(&sample(false));
        assert_eq!(
            text,
            "Build plan for A L2 (3 steps):\n  1. B L1\n  2. A L1\n  3. A L2\n"
        );
    }

    #[test]
    fn text_mentions_truncation() {
        assert!(render_text(&sample(true)).contains("showing 3 of 10 steps"));
    }

    #[test]
    fn empty_plan_reads_as_built() {
        let plan = BuildPlan {
            target: NodeKey::new("A", 2),
            requirements: Vec::new(),
            total: 0,
            truncated: false,
        };
        assert_eq!(render_text(&plan), "A L2 is already built\n");
    }

    #[test]
    fn queue_items_keep_only_id_level_step() {
        let items = queue_items(&sample(false));
        let json = serde_json::to_value(&items).unwrap();
        assert_eq!(json[0], serde_json::json!({"id": "B", "level": 1, "step": 1}));
        assert_eq!(items.len(), 3);
    }
}
