//! Build-dependency resolution engine.
//!
//! Given a target building and level, computes the ordered sequence of
//! constructions a player must complete, accounting for buildings already
//! built and for the starter buildings every player owns from the outset.
//!
//! The pipeline is: [`base`] overlay (once) -> [`expand`] prerequisites ->
//! [`graph`] topological ordering -> [`cache`]. [`planner::Planner`] ties the
//! stages together.

pub mod base;
pub mod cache;
pub mod cascade;
pub mod diagnostics;
pub mod expand;
pub mod graph;
pub mod planner;
pub mod requirement;

pub use planner::Planner;
pub use requirement::{BuildPlan, BuildRequirement, NodeKey};
