//! System abstraction for filesystem operations
//!
//! This module provides a trait-based abstraction over filesystem operations,
//! enabling testing and dry-run mode. Every path handed to a [`System`] is an
//! [`AbsPath`]; every failure names the path it happened on.

use crate::entry::{EntryKind, SourceKind};
use dotagents_core::path::AbsPath;
use dotagents_core::{Error, Result};
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Abstraction over filesystem operations
///
/// Implementations:
/// - `RealSystem`: Actual filesystem operations
/// - `DryRunSystem`: Reads the real filesystem, records writes without executing them
pub trait System {
    /// Inspect a path without following symlinks
    fn entry_kind(&self, path: &AbsPath) -> Result<EntryKind>;

    /// Read the raw value stored in a symlink
    fn read_link(&self, path: &AbsPath) -> Result<PathBuf>;

    /// Entries directly inside a directory, sorted by name
    fn list_dir(&self, path: &AbsPath) -> Result<Vec<AbsPath>>;

    /// Resolve a path through every symlink
    fn canonicalize(&self, path: &AbsPath) -> Result<PathBuf>;

    /// Read a file's contents
    fn read_file(&self, path: &AbsPath) -> Result<Vec<u8>>;

    /// Write a file, creating parent directories as needed
    fn write_file(&self, path: &AbsPath, content: &[u8]) -> Result<()>;

    /// Create a directory and all of its parents
    fn create_dir_all(&self, path: &AbsPath) -> Result<()>;

    /// Remove whatever is at `path`
    ///
    /// Directories are removed recursively; symlinks are unlinked, never followed.
    /// A missing path is not an error.
    fn remove(&self, path: &AbsPath) -> Result<()>;

    /// Create a symbolic link at `link` storing `value`
    fn symlink(&self, value: &Path, link: &AbsPath, kind: SourceKind) -> Result<()>;

    /// Copy a file or directory tree, recreating nested symlinks as symlinks
    fn copy_tree(&self, from: &AbsPath, to: &AbsPath) -> Result<()>;
}

/// Real filesystem implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct RealSystem;

impl System for RealSystem {
    fn entry_kind(&self, path: &AbsPath) -> Result<EntryKind> {
        match fs::symlink_metadata(path.as_path()) {
            Ok(meta) => {
                let file_type = meta.file_type();
                if file_type.is_symlink() {
                    Ok(EntryKind::Symlink)
                } else if file_type.is_dir() {
                    Ok(EntryKind::Directory)
                } else {
                    Ok(EntryKind::File)
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(EntryKind::Missing),
            Err(e) => Err(Error::Metadata {
                path: path.as_path().to_path_buf(),
                source: e,
            }),
        }
    }

    fn read_link(&self, path: &AbsPath) -> Result<PathBuf> {
        fs::read_link(path.as_path()).map_err(|e| Error::FileRead {
            path: path.as_path().to_path_buf(),
            source: e,
        })
    }

    fn list_dir(&self, path: &AbsPath) -> Result<Vec<AbsPath>> {
        let read_err = |e: io::Error| Error::DirectoryRead {
            path: path.as_path().to_path_buf(),
            source: e,
        };
        let mut entries = fs::read_dir(path.as_path())
            .map_err(read_err)?
            .map(|entry| entry.map(|e| path.join_path(e.file_name())))
            .collect::<io::Result<Vec<_>>>()
            .map_err(read_err)?;
        entries.sort();
        Ok(entries)
    }

    fn canonicalize(&self, path: &AbsPath) -> Result<PathBuf> {
        fs::canonicalize(path.as_path()).map_err(|e| Error::Metadata {
            path: path.as_path().to_path_buf(),
            source: e,
        })
    }

    fn read_file(&self, path: &AbsPath) -> Result<Vec<u8>> {
        fs::read(path.as_path()).map_err(|e| Error::FileRead {
            path: path.as_path().to_path_buf(),
            source: e,
        })
    }

    fn write_file(&self, path: &AbsPath, content: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            self.create_dir_all(&parent)?;
        }

        fs::write(path.as_path(), content).map_err(|e| Error::FileWrite {
            path: path.as_path().to_path_buf(),
            source: e,
        })
    }

    fn create_dir_all(&self, path: &AbsPath) -> Result<()> {
        fs::create_dir_all(path.as_path()).map_err(|e| Error::DirectoryCreate {
            path: path.as_path().to_path_buf(),
            source: e,
        })
    }

    fn remove(&self, path: &AbsPath) -> Result<()> {
        let result = match self.entry_kind(path)? {
            EntryKind::Missing => return Ok(()),
            EntryKind::Directory => fs::remove_dir_all(path.as_path()),
            EntryKind::File => fs::remove_file(path.as_path()),
            EntryKind::Symlink => remove_symlink(path.as_path()),
        };
        result.map_err(|e| Error::Remove {
            path: path.as_path().to_path_buf(),
            source: e,
        })
    }

    fn symlink(&self, value: &Path, link: &AbsPath, kind: SourceKind) -> Result<()> {
        create_symlink(value, link.as_path(), kind).map_err(|e| Error::Symlink {
            link: link.as_path().to_path_buf(),
            value: value.to_path_buf(),
            source: e,
        })
    }

    fn copy_tree(&self, from: &AbsPath, to: &AbsPath) -> Result<()> {
        let copy_err = |e: io::Error| Error::Copy {
            from: from.as_path().to_path_buf(),
            to: to.as_path().to_path_buf(),
            source: e,
        };

        if let Some(parent) = to.parent() {
            self.create_dir_all(&parent)?;
        }

        for entry in WalkDir::new(from.as_path())
            .follow_links(false)
            .follow_root_links(false)
        {
            let entry = entry.map_err(|e| copy_err(io::Error::other(e)))?;
            let rel = entry
                .path()
                .strip_prefix(from.as_path())
                .map_err(|e| copy_err(io::Error::other(e)))?;
            let dest = if rel.as_os_str().is_empty() {
                to.as_path().to_path_buf()
            } else {
                to.as_path().join(rel)
            };

            let file_type = entry.file_type();
            if file_type.is_symlink() {
                let value = fs::read_link(entry.path()).map_err(copy_err)?;
                let kind = if entry.path().is_dir() {
                    SourceKind::Dir
                } else {
                    SourceKind::File
                };
                create_symlink(&value, &dest, kind).map_err(copy_err)?;
            } else if file_type.is_dir() {
                fs::create_dir_all(&dest).map_err(copy_err)?;
            } else {
                fs::copy(entry.path(), &dest).map_err(copy_err)?;
            }
        }
        Ok(())
    }
}

#[cfg(unix)]
fn create_symlink(value: &Path, link: &Path, _kind: SourceKind) -> io::Result<()> {
    std::os::unix::fs::symlink(value, link)
}

#[cfg(windows)]
fn create_symlink(value: &Path, link: &Path, kind: SourceKind) -> io::Result<()> {
    match kind {
        SourceKind::Dir => std::os::windows::fs::symlink_dir(value, link),
        SourceKind::File => std::os::windows::fs::symlink_file(value, link),
    }
}

#[cfg(unix)]
fn remove_symlink(path: &Path) -> io::Result<()> {
    fs::remove_file(path)
}

#[cfg(windows)]
fn remove_symlink(path: &Path) -> io::Result<()> {
    // Directory links must be removed as directories on Windows
    fs::remove_file(path).or_else(|_| fs::remove_dir(path))
}

/// Dry-run system that records operations without executing them
///
/// Reads go to the real filesystem so plans are computed against actual state.
#[derive(Debug, Default)]
pub struct DryRunSystem {
    operations: RefCell<Vec<Operation>>,
}

/// An operation that would be performed on the filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Write a file
    WriteFile { path: AbsPath, size: usize },
    /// Create a directory
    CreateDir { path: AbsPath },
    /// Remove a path
    Remove { path: AbsPath },
    /// Create a symlink
    Symlink { link: AbsPath, value: PathBuf },
    /// Copy a file or tree
    Copy { from: AbsPath, to: AbsPath },
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::WriteFile { path, size } => write!(f, "write {path} ({size} bytes)"),
            Operation::CreateDir { path } => write!(f, "mkdir {path}"),
            Operation::Remove { path } => write!(f, "remove {path}"),
            Operation::Symlink { link, value } => write!(f, "link {link} -> {}", value.display()),
            Operation::Copy { from, to } => write!(f, "copy {from} -> {to}"),
        }
    }
}

impl DryRunSystem {
    /// Create a new dry-run system
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the list of operations that would be performed
    pub fn operations(&self) -> Vec<Operation> {
        self.operations.borrow().clone()
    }

    fn record(&self, op: Operation) {
        self.operations.borrow_mut().push(op);
    }
}

impl System for DryRunSystem {
    fn entry_kind(&self, path: &AbsPath) -> Result<EntryKind> {
        RealSystem.entry_kind(path)
    }

    fn read_link(&self, path: &AbsPath) -> Result<PathBuf> {
        RealSystem.read_link(path)
    }

    fn list_dir(&self, path: &AbsPath) -> Result<Vec<AbsPath>> {
        RealSystem.list_dir(path)
    }

    fn canonicalize(&self, path: &AbsPath) -> Result<PathBuf> {
        RealSystem.canonicalize(path)
    }

    fn read_file(&self, path: &AbsPath) -> Result<Vec<u8>> {
        RealSystem.read_file(path)
    }

    fn write_file(&self, path: &AbsPath, content: &[u8]) -> Result<()> {
        self.record(Operation::WriteFile {
            path: path.clone(),
            size: content.len(),
        });
        Ok(())
    }

    fn create_dir_all(&self, path: &AbsPath) -> Result<()> {
        self.record(Operation::CreateDir { path: path.clone() });
        Ok(())
    }

    fn remove(&self, path: &AbsPath) -> Result<()> {
        self.record(Operation::Remove { path: path.clone() });
        Ok(())
    }

    fn symlink(&self, value: &Path, link: &AbsPath, _kind: SourceKind) -> Result<()> {
        self.record(Operation::Symlink {
            link: link.clone(),
            value: value.to_path_buf(),
        });
        Ok(())
    }

    fn copy_tree(&self, from: &AbsPath, to: &AbsPath) -> Result<()> {
        self.record(Operation::Copy {
            from: from.clone(),
            to: to.clone(),
        });
        Ok(())
    }
}
