//! Base error types for dotagents
//!
//! This module provides the error type shared by every library crate. Filesystem
//! failures always carry the offending path so a failed task can be reported
//! precisely.

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Base error type for shared functionality
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reading a file
    #[error("Failed to read file {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing a file
    #[error("Failed to write file {}: {source}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error creating a directory
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error reading a directory
    #[error("Failed to read directory {}: {source}", path.display())]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error with file metadata
    #[error("Failed to read metadata for {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error removing a file, directory or link
    #[error("Failed to remove {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error creating a symbolic link
    #[error("Failed to link {} -> {}: {source}", link.display(), value.display())]
    Symlink {
        link: PathBuf,
        value: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error copying a file or tree
    #[error("Failed to copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A pre-image could not be captured, so the original was left in place
    #[error("Failed to back up {}: {source}", path.display())]
    BackupCapture {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// The backup session was already committed
    #[error("Backup session {id} is already finalized")]
    BackupFinalized { id: String },

    /// No backup session with this id exists
    #[error("Backup session not found: {id}")]
    BackupNotFound { id: String },

    /// Path is not absolute
    #[error("Path must be absolute: {}", path.display())]
    PathNotAbsolute { path: PathBuf },

    /// Invalid path prefix
    #[error("Path {} is not under base directory {}", path.display(), base.display())]
    InvalidPathPrefix {
        path: Arc<PathBuf>,
        base: Arc<PathBuf>,
    },

    /// Skill bundle failed validation
    #[error("Invalid skill at {}: {reason}", path.display())]
    InvalidSkill { path: PathBuf, reason: String },

    /// Marketplace manifest or plugin cannot be used
    #[error("Invalid marketplace at {}: {reason}", path.display())]
    InvalidMarketplace { path: PathBuf, reason: String },

    /// A migration selection does not match the conflict it names
    #[error("Invalid selection {index} for {}: only {candidates} candidates", target.display())]
    InvalidSelection {
        target: PathBuf,
        index: usize,
        candidates: usize,
    },

    /// Unknown client identifier
    #[error("Unknown client: {0}")]
    UnknownClient(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error message
    #[error("{0}")]
    Message(String),

    /// Other error with context
    #[error("{context}: {source}")]
    Other {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    /// Create an error with additional context
    #[must_use]
    pub fn context(self, context: impl Into<String>) -> Self {
        Error::Other {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Path this error is about, if any
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Error::FileRead { path, .. }
            | Error::FileWrite { path, .. }
            | Error::DirectoryCreate { path, .. }
            | Error::DirectoryRead { path, .. }
            | Error::Metadata { path, .. }
            | Error::Remove { path, .. }
            | Error::BackupCapture { path, .. }
            | Error::PathNotAbsolute { path }
            | Error::InvalidSkill { path, .. }
            | Error::InvalidMarketplace { path, .. } => Some(path.as_path()),
            Error::Symlink { link, .. } => Some(link.as_path()),
            Error::Copy { to, .. } => Some(to.as_path()),
            Error::InvalidSelection { target, .. } => Some(target.as_path()),
            _ => None,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::io;

    #[test]
    fn test_remove_error_names_path() {
        let err = Error::Remove {
            path: PathBuf::from("/home/user/.claude/commands"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/home/user/.claude/commands"));
        assert!(msg.contains("denied"));
        assert_eq!(
            err.path(),
            Some(std::path::Path::new("/home/user/.claude/commands"))
        );
    }

    #[test]
    fn test_backup_capture_wraps_cause() {
        let cause = Error::Copy {
            from: PathBuf::from("/a"),
            to: PathBuf::from("/b"),
            source: io::Error::other("disk full"),
        };
        let err = Error::BackupCapture {
            path: PathBuf::from("/a"),
            source: Box::new(cause),
        };
        assert!(err.to_string().contains("Failed to back up /a"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_context_keeps_source() {
        let err = Error::Message("inner".to_string()).context("outer");
        assert_eq!(err.to_string(), "outer: inner");
    }
}
