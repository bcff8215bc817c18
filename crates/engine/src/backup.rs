//! Backup sessions
//!
//! A [`BackupSession`] captures the pre-image of every path an operation is
//! about to remove. Nothing is written until the first capture; `finalize`
//! commits the session by writing `manifest.json`. Only sessions with a
//! manifest are listed or restorable.
//!
//! Layout:
//!
//! ```text
//! <backup_root>/<scope>-<operation>-<id>/
//!   manifest.json
//!   .claude/commands/...     (path relative to the scope base)
//! ```

use crate::entry::EntryKind;
use crate::roots::Roots;
use crate::system::System;
use chrono::{DateTime, Utc};
use dotagents_core::path::AbsPath;
use dotagents_core::{Error, Result, Scope};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Name of the manifest written on finalize
pub const MANIFEST_FILE: &str = "manifest.json";

/// Default backup directory name inside the canonical root
pub const DEFAULT_BACKUP_DIR: &str = "backups";

/// One captured path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupEntry {
    /// Where the content lived
    pub original: PathBuf,
    /// Where the copy is kept
    pub backup: PathBuf,
}

/// Committed description of a backup session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupManifest {
    pub id: String,
    pub scope: Scope,
    pub operation: String,
    pub created_at: DateTime<Utc>,
    pub entries: Vec<BackupEntry>,
}

/// Per-operation pre-image capture
#[derive(Debug)]
pub struct BackupSession {
    id: String,
    scope: Scope,
    operation: String,
    created_at: DateTime<Utc>,
    base: AbsPath,
    dir: AbsPath,
    entries: Vec<BackupEntry>,
    materialized: bool,
    finalized: bool,
}

impl BackupSession {
    /// Start a session under `backup_root`
    ///
    /// Captured paths are placed relative to `base`; paths outside it keep
    /// their full path minus the root. The id is the creation time followed by
    /// a random suffix, so sessions started in the same millisecond stay apart.
    pub fn new(backup_root: &AbsPath, base: AbsPath, scope: Scope, operation: &str) -> Self {
        let created_at = Utc::now();
        let suffix = Uuid::new_v4().simple().to_string();
        let id = format!("{}-{}", created_at.format("%Y%m%dT%H%M%S%3fZ"), &suffix[..12]);
        let dir = backup_root.join_path(format!("{scope}-{operation}-{id}"));
        Self {
            id,
            scope,
            operation: operation.to_string(),
            created_at,
            base,
            dir,
            entries: Vec::new(),
            materialized: false,
            finalized: false,
        }
    }

    /// Start a session for the scope described by `roots`
    ///
    /// `backup_root` defaults to `<canonical_root>/backups`.
    pub fn for_roots(roots: &Roots, backup_root: Option<&AbsPath>, operation: &str) -> Self {
        let default_root;
        let root = match backup_root {
            Some(root) => root,
            None => {
                default_root = default_backup_root(roots);
                &default_root
            }
        };
        Self::new(root, roots.base.clone(), roots.scope, operation)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Session directory; exists only once something was captured
    pub fn dir(&self) -> &AbsPath {
        &self.dir
    }

    pub fn entries(&self) -> &[BackupEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy `path` into the session before it is removed
    ///
    /// Directories are captured recursively and nested symlinks are kept as
    /// links. A missing path or one captured earlier in this session is a
    /// no-op, so the first pre-image wins.
    pub fn capture<S: System + ?Sized>(&mut self, system: &S, path: &AbsPath) -> Result<()> {
        if self.finalized {
            return Err(Error::BackupFinalized {
                id: self.id.clone(),
            });
        }
        if self
            .entries
            .iter()
            .any(|entry| entry.original == path.as_path())
        {
            return Ok(());
        }
        if system.entry_kind(path)? == EntryKind::Missing {
            return Ok(());
        }

        let rel = match path.strip_prefix(&self.base) {
            Ok(rel) if !rel.is_empty() => rel,
            _ => path.without_root(),
        };
        let dest = self.dir.join(&rel);

        let wrap = |e: Error| Error::BackupCapture {
            path: path.as_path().to_path_buf(),
            source: Box::new(e),
        };
        if !self.materialized {
            system.create_dir_all(&self.dir).map_err(wrap)?;
            self.materialized = true;
            tracing::debug!(dir = %self.dir, "Created backup session");
        }
        system.copy_tree(path, &dest).map_err(wrap)?;

        tracing::info!(path = %path, backup = %dest, "Backed up");
        self.entries.push(BackupEntry {
            original: path.as_path().to_path_buf(),
            backup: dest.into_path_buf(),
        });
        Ok(())
    }

    /// Commit the session
    ///
    /// Returns the session directory, or `None` when nothing was captured (no
    /// directory was ever created). A session can be finalized once.
    pub fn finalize<S: System + ?Sized>(&mut self, system: &S) -> Result<Option<AbsPath>> {
        if self.finalized {
            return Err(Error::BackupFinalized {
                id: self.id.clone(),
            });
        }
        self.finalized = true;

        if self.entries.is_empty() {
            return Ok(None);
        }

        let manifest = BackupManifest {
            id: self.id.clone(),
            scope: self.scope,
            operation: self.operation.clone(),
            created_at: self.created_at,
            entries: self.entries.clone(),
        };
        let json = serde_json::to_vec_pretty(&manifest)?;
        system.write_file(&self.dir.join_path(MANIFEST_FILE), &json)?;
        Ok(Some(self.dir.clone()))
    }
}

/// `<canonical_root>/backups`
pub fn default_backup_root(roots: &Roots) -> AbsPath {
    roots.canonical_root.join_path(DEFAULT_BACKUP_DIR)
}

/// Finalized sessions under `backup_root`, newest first
///
/// Directories without a readable manifest are ignored.
pub fn list_sessions(backup_root: &AbsPath) -> Result<Vec<BackupManifest>> {
    let read_dir = match fs::read_dir(backup_root.as_path()) {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(Error::DirectoryRead {
                path: backup_root.as_path().to_path_buf(),
                source: e,
            });
        }
    };

    let mut sessions = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| Error::DirectoryRead {
            path: backup_root.as_path().to_path_buf(),
            source: e,
        })?;
        match read_manifest(&entry.path().join(MANIFEST_FILE)) {
            Ok(manifest) => sessions.push(manifest),
            Err(e) => {
                tracing::debug!(dir = %entry.path().display(), error = %e, "Skipping backup dir");
            }
        }
    }

    sessions.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    Ok(sessions)
}

fn read_manifest(path: &Path) -> Result<BackupManifest> {
    let bytes = fs::read(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Put every captured path of session `id` back in place
///
/// Whatever currently occupies an original path (typically the link that
/// replaced it) is removed first. Returns the number of restored paths.
pub fn restore<S: System + ?Sized>(system: &S, backup_root: &AbsPath, id: &str) -> Result<usize> {
    let manifest = list_sessions(backup_root)?
        .into_iter()
        .find(|m| m.id == id)
        .ok_or_else(|| Error::BackupNotFound { id: id.to_string() })?;

    for entry in &manifest.entries {
        let original = AbsPath::new(entry.original.clone())?;
        let backup = AbsPath::new(entry.backup.clone())?;
        system.remove(&original)?;
        system.copy_tree(&backup, &original)?;
        tracing::info!(path = %original, "Restored");
    }

    Ok(manifest.entries.len())
}
