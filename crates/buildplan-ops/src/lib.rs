pub mod context;
pub mod ops_cascade;
pub mod ops_info;
pub mod ops_plan;
pub mod ops_prebuilt;
pub mod ops_validate;

use serde::Serialize;

use buildplan_util::errors::{PlanError, PlanResult};

/// Pretty-print a value as JSON, mapping serializer failures to [`PlanError`].
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> PlanResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| {
        PlanError::Generic {
            message: format!("Failed to serialize output: {e}"),
        }
        .into()
    })
}
