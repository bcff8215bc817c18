//! Type-safe path types
//!
//! This module provides two distinct path types using the newtype pattern:
//!
//! - [`AbsPath`]: Absolute filesystem paths (canonical roots, link sources and targets)
//! - [`RelPath`]: Relative paths (symlink values, backup entry locations)
//!
//! These types prevent common path manipulation errors at compile time.
//!
//! # Examples
//!
//! ```
//! use dotagents_core::path::{AbsPath, RelPath};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let home = AbsPath::new("/home/user".into())?;
//! let commands = home.join_path(".agents/commands");
//! let rel = commands.strip_prefix(&home)?;
//! assert_eq!(rel.as_path().to_str().unwrap(), ".agents/commands");
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// An absolute path on the filesystem
///
/// This type guarantees that the path is absolute (starts with `/` on Unix or a
/// drive letter on Windows).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AbsPath(PathBuf);

impl AbsPath {
    /// Create a new `AbsPath` from a `PathBuf`
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute.
    ///
    /// # Examples
    ///
    /// ```
    /// use dotagents_core::path::AbsPath;
    ///
    /// assert!(AbsPath::new("/home/user".into()).is_ok());
    /// assert!(AbsPath::new("relative/path".into()).is_err());
    /// ```
    pub fn new(path: PathBuf) -> Result<Self> {
        if path.is_absolute() {
            Ok(AbsPath(path))
        } else {
            Err(Error::PathNotAbsolute { path })
        }
    }

    /// Create a new `AbsPath` from a reference to a `Path`
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::new(path.to_path_buf())
    }

    /// Get the underlying `Path`
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Convert to a `PathBuf`
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }

    /// Join with a relative path to create a new absolute path
    pub fn join(&self, rel: &RelPath) -> Self {
        AbsPath(self.0.join(rel.as_path()))
    }

    /// Join with any path fragment
    ///
    /// Joining onto an absolute path always yields an absolute path, so this
    /// cannot fail.
    ///
    /// ```
    /// use dotagents_core::path::AbsPath;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let home = AbsPath::new("/home/user".into())?;
    /// assert_eq!(home.join_path(".claude").as_path().to_str().unwrap(), "/home/user/.claude");
    /// # Ok(())
    /// # }
    /// ```
    pub fn join_path(&self, fragment: impl AsRef<Path>) -> Self {
        AbsPath(self.0.join(fragment))
    }

    /// Get the parent directory
    ///
    /// Returns `None` if this is the root directory.
    pub fn parent(&self) -> Option<Self> {
        self.0.parent().map(|p| AbsPath(p.to_path_buf()))
    }

    /// Remove `.` and `..` components without touching the filesystem
    ///
    /// ```
    /// use dotagents_core::path::AbsPath;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let p = AbsPath::new("/home/user/.claude/../.agents/./commands".into())?;
    /// assert_eq!(p.normalized().as_path().to_str().unwrap(), "/home/user/.agents/commands");
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut out = PathBuf::new();
        for component in self.0.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    // Popping past the root is a no-op, matching how the OS resolves `/..`
                    out.pop();
                }
                other => out.push(other.as_os_str()),
            }
        }
        AbsPath(out)
    }

    /// Strip a base directory prefix to get a relative path
    ///
    /// # Errors
    ///
    /// Returns an error if `self` is not under `base`.
    pub fn strip_prefix(&self, base: &AbsPath) -> Result<RelPath> {
        self.0
            .strip_prefix(&base.0)
            .map(|p| RelPath(p.to_path_buf()))
            .map_err(|_| Error::InvalidPathPrefix {
                path: std::sync::Arc::new(self.as_path().to_path_buf()),
                base: std::sync::Arc::new(base.as_path().to_path_buf()),
            })
    }

    /// The path with its root (and any drive prefix) removed
    ///
    /// Used to place an arbitrary absolute path underneath another directory.
    pub fn without_root(&self) -> RelPath {
        RelPath(
            self.0
                .components()
                .filter(|c| matches!(c, Component::Normal(_)))
                .collect(),
        )
    }

    /// Get the file name
    pub fn file_name(&self) -> Option<&str> {
        self.0.file_name().and_then(|s| s.to_str())
    }
}

impl AsRef<Path> for AbsPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// A relative path (no leading slash)
///
/// This type guarantees that the path is relative (does not start with `/`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelPath(PathBuf);

impl RelPath {
    /// Create a new `RelPath` from a `PathBuf`
    ///
    /// # Errors
    ///
    /// Returns an error if the path is absolute.
    pub fn new(path: PathBuf) -> Result<Self> {
        if path.is_relative() {
            Ok(RelPath(path))
        } else {
            Err(Error::Message(format!(
                "Path must be relative: {}",
                path.display()
            )))
        }
    }

    /// Get the underlying `Path`
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Convert to a `PathBuf`
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }

    /// Whether this path has no components
    pub fn is_empty(&self) -> bool {
        self.0.as_os_str().is_empty()
    }
}

impl std::fmt::Display for AbsPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl std::fmt::Display for RelPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}
