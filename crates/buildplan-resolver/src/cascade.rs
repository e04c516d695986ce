//! Cascade-unbuild: what has to come down if a building level is removed.

use buildplan_core::catalog::CatalogProvider;
use buildplan_core::state::BuildState;

use crate::requirement::BuildRequirement;

/// Every currently built `(building, level)` whose level record requires
/// `target_id` at `target_level` or higher.
///
/// Entries are ordered highest level first (stable in catalog order within a
/// level) and numbered from 1.
pub fn cascade_unbuild<C: CatalogProvider + ?Sized>(
    catalog: &C,
    target_id: &str,
    target_level: u32,
    state: &BuildState,
) -> Vec<BuildRequirement> {
    let mut affected = Vec::new();
    for building in catalog.buildings() {
        for record in &building.levels {
            let Some(&required) = record.requirements.get(target_id) else {
                continue;
            };
            if required >= target_level && state.is_built(&building.id, record.level) {
                affected.push(BuildRequirement {
                    id: building.id.clone(),
                    level: record.level,
                    is_built: true,
                    step: 0,
                    depth: 0,
                    requirement_count: record.requirements.len(),
                });
            }
        }
    }

    affected.sort_by(|a, b| b.level.cmp(&a.level));
    for (i, req) in affected.iter_mut().enumerate() {
        req.step = i + 1;
    }
    affected
}
