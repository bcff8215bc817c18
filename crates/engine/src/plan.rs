//! Link plan construction
//!
//! The plan builder inspects targets without following symlinks and decides,
//! per target, whether it is correct, needs a link, or holds unmanaged content.
//! It never mutates the filesystem and never fails on a conflict.

use crate::entry::{EntryKind, SourceKind};
use crate::link_target::link_value;
use crate::mapping::Mapping;
use crate::system::System;
use dotagents_core::Result;
use dotagents_core::path::AbsPath;
use std::collections::HashSet;

/// One step of a link plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTask {
    /// The canonical source is missing and must be created
    EnsureSource { path: AbsPath, kind: SourceKind },
    /// A link must be created, or a stale link rewritten
    Link {
        source: AbsPath,
        target: AbsPath,
        kind: SourceKind,
        /// The target is a symlink with the wrong value
        replace_symlink: bool,
    },
    /// The target already links to the source
    Noop { source: AbsPath, target: AbsPath },
    /// The target holds real content that is not the source
    Conflict {
        source: AbsPath,
        target: AbsPath,
        kind: SourceKind,
    },
}

impl LinkTask {
    /// Short label used in status output
    pub fn label(&self) -> &'static str {
        match self {
            LinkTask::EnsureSource { .. } => "create",
            LinkTask::Link {
                replace_symlink: true,
                ..
            } => "relink",
            LinkTask::Link { .. } => "link",
            LinkTask::Noop { .. } => "ok",
            LinkTask::Conflict { .. } => "conflict",
        }
    }

    /// Path the task acts on
    pub fn path(&self) -> &AbsPath {
        match self {
            LinkTask::EnsureSource { path, .. } => path,
            LinkTask::Link { target, .. }
            | LinkTask::Noop { target, .. }
            | LinkTask::Conflict { target, .. } => target,
        }
    }
}

/// Ordered tasks plus the conflicts among them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPlan {
    pub tasks: Vec<LinkTask>,
    /// Exactly the `Conflict` tasks of `tasks`, in order
    pub conflicts: Vec<LinkTask>,
}

impl LinkPlan {
    /// Whether applying the plan would change nothing
    pub fn is_clean(&self) -> bool {
        self.tasks
            .iter()
            .all(|task| matches!(task, LinkTask::Noop { .. }))
    }

    fn push(&mut self, task: LinkTask) {
        if matches!(task, LinkTask::Conflict { .. }) {
            self.conflicts.push(task.clone());
        }
        self.tasks.push(task);
    }
}

/// Build a link plan for the given mappings
///
/// Tasks follow mapping order, then target order. A missing source yields one
/// `EnsureSource` no matter how many mappings share it.
pub fn build_link_plan<S: System + ?Sized>(system: &S, mappings: &[Mapping]) -> Result<LinkPlan> {
    let mut plan = LinkPlan::default();
    let mut ensured: HashSet<AbsPath> = HashSet::new();

    for mapping in mappings {
        let source_kind = system.entry_kind(&mapping.source)?;
        if !source_kind.exists() && ensured.insert(mapping.source.clone()) {
            plan.push(LinkTask::EnsureSource {
                path: mapping.source.clone(),
                kind: mapping.kind,
            });
        }

        for target in &mapping.targets {
            if let Some(task) = plan_target(system, mapping, &target.path, source_kind)? {
                tracing::debug!(task = task.label(), target = %target.path, "Planned");
                plan.push(task);
            }
        }
    }

    Ok(plan)
}

fn plan_target<S: System + ?Sized>(
    system: &S,
    mapping: &Mapping,
    target: &AbsPath,
    source_kind: EntryKind,
) -> Result<Option<LinkTask>> {
    if target.normalized() == mapping.source.normalized() {
        return Ok(None);
    }

    let source = mapping.source.clone();
    let task = match system.entry_kind(target)? {
        EntryKind::Missing => LinkTask::Link {
            source,
            target: target.clone(),
            kind: mapping.kind,
            replace_symlink: false,
        },
        EntryKind::Symlink => {
            let expected = link_value(&mapping.source, target, mapping.kind);
            if system.read_link(target)? == expected.value {
                LinkTask::Noop {
                    source,
                    target: target.clone(),
                }
            } else {
                LinkTask::Link {
                    source,
                    target: target.clone(),
                    kind: mapping.kind,
                    replace_symlink: true,
                }
            }
        }
        EntryKind::File | EntryKind::Directory => {
            // A parent directory may itself link into the canonical root
            if source_kind.exists() && same_location(system, target, &mapping.source) {
                return Ok(None);
            }
            LinkTask::Conflict {
                source,
                target: target.clone(),
                kind: mapping.kind,
            }
        }
    };
    Ok(Some(task))
}

fn same_location<S: System + ?Sized>(system: &S, a: &AbsPath, b: &AbsPath) -> bool {
    match (system.canonicalize(a), system.canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
