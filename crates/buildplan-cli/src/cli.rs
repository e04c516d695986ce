//! CLI argument definitions for buildplan.
//!
//! Uses `clap` derive macros to define the command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "buildplan",
    version,
    about = "Compute the order in which to construct buildings",
    long_about = "buildplan reads a building catalog and answers: starting from what I \
                  have built, what must I build, and in what order, to reach a given \
                  building level?"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Building catalog: a JSON file or a directory of JSON files
    #[arg(long, global = true, env = "BUILDPLAN_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Planner config file (defaults to ~/.buildplan/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the ordered build steps to reach a building level
    Plan {
        /// Target building id
        building: String,
        /// Target level
        level: u32,
        /// Current build state (JSON object of building id to level)
        #[arg(long)]
        state: Option<PathBuf>,
        /// Print compact JSON queue records
        #[arg(long, conflicts_with = "tree")]
        json: bool,
        /// Print the target's prerequisite tree
        #[arg(long)]
        tree: bool,
    },

    /// Check a build-state file against the catalog
    Validate {
        /// Build state to check
        #[arg(long)]
        state: PathBuf,
    },

    /// Show starter buildings and everything they imply
    Prebuilt {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Show information about a building
    Info {
        /// Building id
        building: String,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// List built levels that must come down with a building level
    Cascade {
        /// Building id
        building: String,
        /// Level being removed
        level: u32,
        /// Current build state
        #[arg(long)]
        state: PathBuf,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
