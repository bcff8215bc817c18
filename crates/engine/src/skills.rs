//! Skill bundles
//!
//! A skill is a directory holding a `SKILL.md` whose YAML frontmatter declares
//! at least a `name` and a `description`:
//!
//! ```yaml
//! ---
//! name: log-session
//! description: Summarize the current session into a log entry
//! allowed-tools: [Read, Write]
//! ---
//! ```

use crate::backup::BackupSession;
use crate::entry::EntryKind;
use crate::system::System;
use dotagents_core::path::AbsPath;
use dotagents_core::{Error, Result, SkillMeta, SkillValidator};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// File marking a directory as a skill bundle
pub const SKILL_FILE: &str = "SKILL.md";

static NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9-]{1,64}$").expect("NAME_REGEX compilation should never fail")
});

/// Validator reading `SKILL.md` frontmatter
#[derive(Debug, Clone, Copy, Default)]
pub struct FrontmatterValidator;

impl SkillValidator for FrontmatterValidator {
    fn validate(&self, dir: &Path) -> Result<SkillMeta> {
        let skill_file = dir.join(SKILL_FILE);
        let content = fs::read_to_string(&skill_file).map_err(|e| Error::InvalidSkill {
            path: dir.to_path_buf(),
            reason: format!("cannot read {SKILL_FILE}: {e}"),
        })?;
        parse_skill_md(&content).map_err(|reason| Error::InvalidSkill {
            path: dir.to_path_buf(),
            reason,
        })
    }
}

/// Parse the frontmatter of a `SKILL.md`
///
/// Returns a human readable reason on failure.
pub fn parse_skill_md(content: &str) -> std::result::Result<SkillMeta, String> {
    let yaml = extract_frontmatter(content).ok_or("missing YAML frontmatter")?;
    let data: serde_yaml::Value =
        serde_yaml::from_str(yaml).map_err(|e| format!("invalid frontmatter: {e}"))?;

    let field = |key: &str| -> String {
        match data.get(key) {
            Some(serde_yaml::Value::String(s)) => s.trim().to_string(),
            Some(serde_yaml::Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    };

    let name = field("name");
    let description = field("description");
    if name.is_empty() || description.is_empty() {
        return Err("frontmatter requires both name and description".to_string());
    }
    if !NAME_REGEX.is_match(&name) {
        return Err(format!(
            "skill name must be lowercase letters, numbers and hyphens (max 64): {name}"
        ));
    }

    let allowed_tools = match data.get("allowed-tools") {
        Some(serde_yaml::Value::Sequence(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    };
    let model = data
        .get("model")
        .and_then(serde_yaml::Value::as_str)
        .map(str::to_string);

    Ok(SkillMeta {
        name,
        description,
        allowed_tools,
        model,
    })
}

/// The YAML between the leading `---` and the closing `---`
fn extract_frontmatter(content: &str) -> Option<&str> {
    let content = content.trim_start_matches('\u{feff}');
    let rest = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some(&rest[..offset]);
        }
        offset += line.len();
    }
    None
}

/// Whether `dir` contains a `SKILL.md`
pub fn is_skill_dir(dir: &Path) -> bool {
    dir.join(SKILL_FILE).is_file()
}

/// Find skill bundles under `root`
///
/// `root` itself when it is a skill, else the skills inside `root/skills/`,
/// else the skills directly inside `root`. Results are sorted by path.
pub fn find_skill_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    if is_skill_dir(root) {
        return Ok(vec![root.to_path_buf()]);
    }

    let nested = root.join("skills");
    if nested.is_dir() {
        let matches = child_skill_dirs(&nested)?;
        if !matches.is_empty() {
            return Ok(matches);
        }
    }

    child_skill_dirs(root)
}

fn child_skill_dirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let read_dir = fs::read_dir(dir).map_err(|e| Error::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut matches = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| Error::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_dir() && is_skill_dir(&path) {
            matches.push(path);
        }
    }
    matches.sort();
    Ok(matches)
}

/// Outcome of a local skill install
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// Names copied into the canonical skills directory
    pub installed: Vec<String>,
    /// Names left alone because they already exist
    pub skipped: Vec<String>,
}

/// Validate and copy local skill bundles into `<canonical_root>/skills/<name>`
///
/// Every bundle is validated before anything is copied, so one invalid skill
/// leaves the canonical root untouched. Existing skills are replaced only
/// with `force`, after being captured into `backup`.
pub fn install_local_skills<S: System + ?Sized>(
    system: &S,
    validator: &dyn SkillValidator,
    source_dir: &Path,
    canonical_root: &AbsPath,
    force: bool,
    mut backup: Option<&mut BackupSession>,
) -> Result<InstallReport> {
    let dirs = find_skill_dirs(source_dir)?;
    if dirs.is_empty() {
        return Err(Error::InvalidSkill {
            path: source_dir.to_path_buf(),
            reason: format!("no {SKILL_FILE} found"),
        });
    }

    let mut bundles = Vec::with_capacity(dirs.len());
    for dir in dirs {
        let meta = validator.validate(&dir)?;
        bundles.push((AbsPath::new(dir)?, meta));
    }

    let skills_root = canonical_root.join_path("skills");
    let mut report = InstallReport::default();
    for (dir, meta) in bundles {
        let dest = skills_root.join_path(&meta.name);
        if system.entry_kind(&dest)? != EntryKind::Missing {
            if !force {
                tracing::info!(skill = %meta.name, "Skill already installed, skipped");
                report.skipped.push(meta.name);
                continue;
            }
            if let Some(session) = backup.as_deref_mut() {
                session.capture(system, &dest)?;
            }
            system.remove(&dest)?;
        }

        system.copy_tree(&dir, &dest)?;
        tracing::info!(skill = %meta.name, dest = %dest, "Installed skill");
        report.installed.push(meta.name);
    }

    Ok(report)
}
