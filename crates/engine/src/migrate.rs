//! Migration of pre-existing client content into the canonical root
//!
//! Scanning collects every real file or directory that clients already hold
//! for a canonical slot, groups them by content digest and splits the result
//! into automatically mergeable items and genuine conflicts. Applying copies
//! the chosen content, then links every client location to the canonical root.

use crate::apply::{ApplyOptions, ApplyReport, apply_plan};
use crate::backup::BackupSession;
use crate::entry::{EntryKind, SourceKind};
use crate::hash;
use crate::mapping::{
    AGENTS_MD, CLAUDE_MD, GEMINI_MD, Mapping, SKILL_CATEGORIES, build_mappings, detect_overrides,
};
use crate::plan::build_link_plan;
use crate::roots::Roots;
use crate::system::System;
use dotagents_core::path::AbsPath;
use dotagents_core::{Client, Error, Result, SkillValidator};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Category name used for instruction files
pub const INSTRUCTIONS_CATEGORY: &str = "instructions";

/// Label of content already present in the canonical root
pub const CANONICAL_LABEL: &str = "Canonical";

const PREVIEW_LINES: usize = 5;
const PREVIEW_CHARS: usize = 240;

/// One version of the content for a canonical slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationCandidate {
    /// Display names of every holder of this content, joined with `+`
    pub label: String,
    /// First client holding this content; `None` for canonical-only content
    pub client: Option<Client>,
    /// Where the content is copied from
    pub source_path: AbsPath,
    pub kind: EntryKind,
    /// blake3 hex digest of the file or tree
    pub digest: String,
    /// Short excerpt for display
    pub preview: String,
    /// Identical to what the canonical slot already holds
    pub canonical: bool,
}

/// A slot whose content can be merged without a decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationItem {
    pub category: &'static str,
    pub name: String,
    pub target_path: AbsPath,
    pub candidate: MigrationCandidate,
}

/// A slot with several distinct contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationConflict {
    pub category: &'static str,
    pub name: String,
    pub target_path: AbsPath,
    pub candidates: Vec<MigrationCandidate>,
}

/// Result of a migration scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationPlan {
    pub auto: Vec<MigrationItem>,
    pub conflicts: Vec<MigrationConflict>,
}

impl MigrationPlan {
    pub fn is_empty(&self) -> bool {
        self.auto.is_empty() && self.conflicts.is_empty()
    }
}

/// Caller decision for one conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Index into [`MigrationConflict::candidates`]
    Candidate(usize),
    Skip,
}

/// Selections keyed by conflict `target_path`
pub type Selections = HashMap<AbsPath, Selection>;

/// Options for [`apply_migration`]
#[derive(Debug, Default)]
pub struct MigrationOptions<'a> {
    /// Replace conflicting client content with links after copying
    pub force_links: bool,
    pub backup: Option<&'a mut BackupSession>,
}

/// Outcome of a migration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub copied: usize,
    pub skipped: usize,
    pub links: ApplyReport,
    /// Session directory, when anything was backed up
    pub backup_dir: Option<AbsPath>,
}

struct Slot {
    category: &'static str,
    name: String,
    candidates: Vec<MigrationCandidate>,
}

/// Scan client locations for content to migrate
pub fn scan_migration<S: System + ?Sized>(
    system: &S,
    roots: &Roots,
    clients: &[Client],
    validator: &dyn SkillValidator,
) -> Result<MigrationPlan> {
    let overrides = detect_overrides(system, roots)?;
    let mappings = build_mappings(roots, clients, overrides);

    let mut slots: IndexMap<AbsPath, Slot> = IndexMap::new();
    for mapping in &mappings {
        match mapping.kind {
            SourceKind::Dir => scan_dir_mapping(system, mapping, validator, &mut slots)?,
            SourceKind::File => scan_file_mapping(system, roots, mapping, &mut slots)?,
        }
    }

    let mut plan = MigrationPlan::default();
    for (target_path, slot) in slots {
        let mut candidates = slot.candidates;
        let canonical_kind = system.entry_kind(&target_path)?;
        if canonical_kind.is_real() {
            candidates.push(candidate(
                system,
                CANONICAL_LABEL,
                None,
                &target_path,
                canonical_kind,
            )?);
        }

        let mut groups = collapse(candidates);
        match groups.len() {
            0 => {}
            1 => {
                let only = groups.remove(0);
                if !only.canonical {
                    plan.auto.push(MigrationItem {
                        category: slot.category,
                        name: slot.name,
                        target_path,
                        candidate: only,
                    });
                }
            }
            _ => {
                tracing::debug!(
                    target = %target_path,
                    candidates = groups.len(),
                    "Migration conflict"
                );
                plan.conflicts.push(MigrationConflict {
                    category: slot.category,
                    name: slot.name,
                    target_path,
                    candidates: groups,
                });
            }
        }
    }

    Ok(plan)
}

fn scan_dir_mapping<S: System + ?Sized>(
    system: &S,
    mapping: &Mapping,
    validator: &dyn SkillValidator,
    slots: &mut IndexMap<AbsPath, Slot>,
) -> Result<()> {
    let skill_like = SKILL_CATEGORIES.contains(&mapping.name);

    for target in &mapping.targets {
        if system.entry_kind(&target.path)? != EntryKind::Directory {
            continue;
        }

        for entry in system.list_dir(&target.path)? {
            let kind = system.entry_kind(&entry)?;
            if !kind.is_real() {
                continue;
            }
            let Some(file_name) = entry.file_name().map(str::to_string) else {
                continue;
            };

            let name = if skill_like && kind == EntryKind::Directory {
                match validator.validate(entry.as_path()) {
                    Ok(meta) => meta.name,
                    Err(e) => {
                        tracing::debug!(
                            path = %entry,
                            error = %e,
                            "Invalid skill, keyed by directory name"
                        );
                        file_name
                    }
                }
            } else {
                file_name
            };

            let label = target.client.display_name();
            let found = candidate(system, label, Some(target.client), &entry, kind)?;
            slots
                .entry(mapping.source.join_path(&name))
                .or_insert_with(|| Slot {
                    category: mapping.name,
                    name,
                    candidates: Vec::new(),
                })
                .candidates
                .push(found);
        }
    }
    Ok(())
}

fn scan_file_mapping<S: System + ?Sized>(
    system: &S,
    roots: &Roots,
    mapping: &Mapping,
    slots: &mut IndexMap<AbsPath, Slot>,
) -> Result<()> {
    let instruction = mapping.is_instruction();

    for target in &mapping.targets {
        let kind = system.entry_kind(&target.path)?;
        if kind != EntryKind::File {
            continue;
        }

        let (category, slot_path) = if instruction {
            let file = match target.client {
                Client::Claude => CLAUDE_MD,
                Client::Gemini => GEMINI_MD,
                _ => AGENTS_MD,
            };
            (INSTRUCTIONS_CATEGORY, roots.canonical_root.join_path(file))
        } else {
            (mapping.name, mapping.source.clone())
        };

        let label = target.client.display_name();
        let found = candidate(system, label, Some(target.client), &target.path, kind)?;
        let name = slot_path.file_name().unwrap_or(mapping.name).to_string();
        slots
            .entry(slot_path)
            .or_insert_with(|| Slot {
                category,
                name,
                candidates: Vec::new(),
            })
            .candidates
            .push(found);
    }
    Ok(())
}

fn candidate<S: System + ?Sized>(
    system: &S,
    label: &str,
    client: Option<Client>,
    path: &AbsPath,
    kind: EntryKind,
) -> Result<MigrationCandidate> {
    Ok(MigrationCandidate {
        label: label.to_string(),
        client,
        source_path: path.clone(),
        kind,
        digest: hash::digest(path, kind)?,
        preview: preview(system, path, kind)?,
        canonical: client.is_none(),
    })
}

fn preview<S: System + ?Sized>(system: &S, path: &AbsPath, kind: EntryKind) -> Result<String> {
    if kind == EntryKind::Directory {
        let names: Vec<String> = system
            .list_dir(path)?
            .iter()
            .filter_map(|p| p.file_name().map(str::to_string))
            .collect();
        return Ok(format!(
            "{}/ ({} entries: {})",
            path.file_name().unwrap_or_default(),
            names.len(),
            names.join(", ")
        ));
    }

    let content = system.read_file(path)?;
    let text = String::from_utf8_lossy(&content);
    let excerpt: String = text
        .lines()
        .take(PREVIEW_LINES)
        .collect::<Vec<_>>()
        .join("\n")
        .chars()
        .take(PREVIEW_CHARS)
        .collect();
    Ok(excerpt)
}

/// Merge candidates with identical digests, keeping first-seen order
fn collapse(candidates: Vec<MigrationCandidate>) -> Vec<MigrationCandidate> {
    let mut groups: Vec<MigrationCandidate> = Vec::new();
    for candidate in candidates {
        match groups.iter_mut().find(|g| g.digest == candidate.digest) {
            Some(group) => {
                group.label = format!("{}+{}", group.label, candidate.label);
                group.canonical |= candidate.canonical;
            }
            None => groups.push(candidate),
        }
    }
    groups
}

/// Copy selected content into the canonical root, then link every client
///
/// Selections are checked before anything is copied. A conflict without a
/// selection is skipped.
pub fn apply_migration<S: System + ?Sized>(
    system: &S,
    roots: &Roots,
    clients: &[Client],
    plan: &MigrationPlan,
    selections: &Selections,
    mut options: MigrationOptions<'_>,
) -> Result<MigrationReport> {
    for conflict in &plan.conflicts {
        if let Some(Selection::Candidate(index)) = selections.get(&conflict.target_path)
            && *index >= conflict.candidates.len()
        {
            return Err(Error::InvalidSelection {
                target: conflict.target_path.as_path().to_path_buf(),
                index: *index,
                candidates: conflict.candidates.len(),
            });
        }
    }

    let mut report = MigrationReport::default();

    for item in &plan.auto {
        copy_candidate(system, &item.candidate, &item.target_path, options.backup.as_deref_mut())?;
        report.copied += 1;
    }

    for conflict in &plan.conflicts {
        let chosen = match selections.get(&conflict.target_path) {
            Some(Selection::Candidate(index)) => conflict.candidates.get(*index),
            Some(Selection::Skip) | None => None,
        };
        match chosen {
            Some(candidate) if !candidate.canonical => {
                copy_candidate(
                    system,
                    candidate,
                    &conflict.target_path,
                    options.backup.as_deref_mut(),
                )?;
                report.copied += 1;
            }
            _ => {
                tracing::info!(target = %conflict.target_path, "Migration conflict skipped");
                report.skipped += 1;
            }
        }
    }

    let overrides = detect_overrides(system, roots)?;
    let mappings = build_mappings(roots, clients, overrides);
    let link_plan = build_link_plan(system, &mappings)?;
    report.links = apply_plan(
        system,
        &link_plan,
        ApplyOptions {
            force: options.force_links,
            backup: options.backup.as_deref_mut(),
        },
    )?;

    report.backup_dir = options
        .backup
        .as_deref()
        .filter(|session| !session.is_empty())
        .map(|session| session.dir().clone());

    Ok(report)
}

fn copy_candidate<S: System + ?Sized>(
    system: &S,
    candidate: &MigrationCandidate,
    target: &AbsPath,
    backup: Option<&mut BackupSession>,
) -> Result<()> {
    if system.entry_kind(target)?.exists() {
        if let Some(session) = backup {
            session.capture(system, target)?;
        }
        system.remove(target)?;
    }
    system.copy_tree(&candidate.source_path, target)?;
    tracing::info!(
        from = %candidate.source_path,
        to = %target,
        label = %candidate.label,
        "Migrated"
    );
    Ok(())
}
