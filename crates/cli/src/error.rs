//! Error types for CLI commands
//!
//! Commands fail with a [`CommandError`]. Engine and config failures keep their
//! path-labelled message, and anything raised with `anyhow` passes through.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during command execution
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommandError {
    /// Engine, config or filesystem failure
    #[error(transparent)]
    Engine(#[from] dotagents_core::Error),

    /// Conflicts were left in place because `--force` was not given
    #[error("{count} conflicting target(s) left in place; re-run with --force to replace them")]
    Unresolved {
        /// Number of conflicts reported by the apply
        count: usize,
    },

    /// A path given on the command line does not exist
    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    /// The home directory could not be determined
    #[error("Could not determine the home directory. Please specify it with --home")]
    HomeNotFound,

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for command operations
pub type Result<T> = std::result::Result<T, CommandError>;
