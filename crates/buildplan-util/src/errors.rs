use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all buildplan operations.
#[derive(Debug, Error, Diagnostic)]
pub enum PlanError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or malformed building catalog.
    #[error("Catalog error: {message}")]
    #[diagnostic(help("Check the catalog JSON for duplicate ids or malformed levels"))]
    Catalog { message: String },

    /// Invalid or unreadable planner configuration.
    #[error("Config error: {message}")]
    #[diagnostic(help("Check ~/.buildplan/config.toml for syntax errors"))]
    Config { message: String },

    /// The requested target building is not in the catalog.
    #[error("Unknown building: {id}")]
    #[diagnostic(help("Run `buildplan info <BUILDING>` with an id from the catalog"))]
    UnknownBuilding { id: String },

    /// The requested target level has no level record.
    #[error("Invalid level {level} for building {id} (max level {max})")]
    InvalidLevel { id: String, level: u32, max: u32 },

    /// A build-state file could not be read or parsed.
    #[error("Build state error: {message}")]
    State { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type PlanResult<T> = miette::Result<T>;
