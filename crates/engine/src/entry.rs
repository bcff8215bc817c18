//! Entry kinds
//!
//! - [`SourceKind`]: what a canonical source is expected to be
//! - [`EntryKind`]: what is actually on disk at a path, observed without
//!   following symlinks

use serde::{Deserialize, Serialize};

/// Expected shape of a canonical source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A single file, e.g. `AGENTS.md`
    File,
    /// A directory of artifacts, e.g. `commands/`
    Dir,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::File => "file",
            SourceKind::Dir => "dir",
        }
    }
}

/// Kind of filesystem entry at a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Regular file
    File,
    /// Real directory
    Directory,
    /// Symbolic link, whatever it points at
    Symlink,
    /// Nothing exists at the path
    Missing,
}

impl EntryKind {
    /// Whether something occupies the path
    pub fn exists(self) -> bool {
        !matches!(self, EntryKind::Missing)
    }

    /// Whether the entry is real content rather than a link
    pub fn is_real(self) -> bool {
        matches!(self, EntryKind::File | EntryKind::Directory)
    }
}
