//! Link plan execution
//!
//! The apply engine is the only writer. Every destructive step is preceded by
//! a capture into the caller's backup session, and a failed capture aborts the
//! task before anything is removed.

use crate::backup::BackupSession;
use crate::entry::{EntryKind, SourceKind};
use crate::link_target::link_value;
use crate::plan::{LinkPlan, LinkTask};
use crate::system::System;
use dotagents_core::Result;
use dotagents_core::path::AbsPath;

/// Content of a freshly created markdown instructions file
pub const DEFAULT_INSTRUCTIONS: &str = "# AGENTS\n\nAdd shared agent instructions here.\n";

/// Options for [`apply_plan`]
#[derive(Debug, Default)]
pub struct ApplyOptions<'a> {
    /// Replace real content at targets (after backing it up)
    pub force: bool,
    /// Session receiving pre-images of removed entries
    pub backup: Option<&'a mut BackupSession>,
}

/// Outcome counts of an apply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub applied: usize,
    pub skipped: usize,
    pub conflicts: usize,
}

/// Execute a link plan
///
/// A second apply over unchanged state reports `applied == 0`.
pub fn apply_plan<S: System + ?Sized>(
    system: &S,
    plan: &LinkPlan,
    mut options: ApplyOptions<'_>,
) -> Result<ApplyReport> {
    let mut report = ApplyReport::default();

    for task in &plan.tasks {
        match task {
            LinkTask::EnsureSource { path, kind } => {
                ensure_source(system, path, *kind)?;
                report.applied += 1;
            }
            LinkTask::Noop { .. } => {
                report.skipped += 1;
            }
            LinkTask::Conflict {
                source,
                target,
                kind,
            } => {
                report.conflicts += 1;
                if !options.force {
                    tracing::warn!(target = %target, "Conflict left in place");
                    continue;
                }
                if let Some(session) = options.backup.as_deref_mut() {
                    session.capture(system, target)?;
                }
                system.remove(target)?;
                create_link(system, source, target, *kind)?;
                report.applied += 1;
            }
            LinkTask::Link {
                source,
                target,
                kind,
                replace_symlink,
            } => {
                let existing = system.entry_kind(target)?;
                let blocked = existing.is_real() || !*replace_symlink;
                if existing.exists() && blocked && !options.force {
                    tracing::debug!(target = %target, "Target appeared since planning, skipped");
                    report.skipped += 1;
                    continue;
                }

                if existing.exists() {
                    let form_only = existing == EntryKind::Symlink
                        && points_to(system, target, source)?;
                    if !form_only && let Some(session) = options.backup.as_deref_mut() {
                        session.capture(system, target)?;
                    }
                    system.remove(target)?;
                }
                create_link(system, source, target, *kind)?;
                report.applied += 1;
            }
        }
    }

    tracing::debug!(
        applied = report.applied,
        skipped = report.skipped,
        conflicts = report.conflicts,
        "Applied link plan"
    );
    Ok(report)
}

fn ensure_source<S: System + ?Sized>(system: &S, path: &AbsPath, kind: SourceKind) -> Result<()> {
    match kind {
        SourceKind::Dir => system.create_dir_all(path)?,
        SourceKind::File => system.write_file(path, default_content(path).as_bytes())?,
    }
    tracing::info!(path = %path, kind = kind.as_str(), "Created source");
    Ok(())
}

fn default_content(path: &AbsPath) -> &'static str {
    let is_markdown = path
        .as_path()
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));
    if is_markdown { DEFAULT_INSTRUCTIONS } else { "" }
}

fn create_link<S: System + ?Sized>(
    system: &S,
    source: &AbsPath,
    target: &AbsPath,
    kind: SourceKind,
) -> Result<()> {
    if let Some(parent) = target.parent() {
        system.create_dir_all(&parent)?;
    }
    let value = link_value(source, target, kind);
    system.symlink(&value.value, target, kind)?;
    tracing::info!(target = %target, value = %value.value.display(), "Linked");
    Ok(())
}

/// Whether the symlink at `link` already resolves to `source`
fn points_to<S: System + ?Sized>(system: &S, link: &AbsPath, source: &AbsPath) -> Result<bool> {
    let value = system.read_link(link)?;
    let resolved = match link.parent() {
        Some(parent) => parent.join_path(value),
        None => return Ok(false),
    };
    Ok(resolved.normalized() == source.normalized())
}
