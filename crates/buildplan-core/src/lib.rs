//! Core data types for buildplan.
//!
//! This crate defines the read-only building catalog (buildings and their
//! levels), the player's build state and its validation against the catalog,
//! and the planner configuration.
//!
//! This crate is intentionally free of planning logic.

pub mod catalog;
pub mod config;
pub mod state;
