//! Shared utilities for the buildplan crates.
//!
//! This crate provides cross-cutting concerns used by all other buildplan
//! crates: the unified error type and hashing helpers.

pub mod errors;
pub mod hash;
