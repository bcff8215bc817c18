//! Local plugin marketplaces
//!
//! A marketplace is a directory carrying `.claude-plugin/marketplace.json`:
//!
//! ```json
//! {
//!   "name": "team-market",
//!   "pluginRoot": "..",
//!   "plugins": [{ "name": "review-kit", "source": "review-kit" }]
//! }
//! ```
//!
//! Plugin sources are resolved against `pluginRoot`, itself relative to the
//! directory holding the manifest. Each plugin contributes `commands/*.md`,
//! `hooks/*` and the skill bundles under `skills/`.

use crate::backup::BackupSession;
use crate::entry::EntryKind;
use crate::skills::{InstallReport, find_skill_dirs, install_local_skills};
use crate::system::System;
use dotagents_core::path::AbsPath;
use dotagents_core::{Error, Result, SkillValidator};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Manifest location inside a marketplace directory
pub const MARKETPLACE_FILE: &str = ".claude-plugin/marketplace.json";

/// Parsed `marketplace.json`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marketplace {
    /// Marketplace name, used in messages
    pub name: String,
    /// Directory plugin sources are relative to
    #[serde(default)]
    pub plugin_root: Option<PathBuf>,
    /// Plugins on offer
    #[serde(default)]
    pub plugins: Vec<PluginEntry>,
    /// Directory holding the manifest
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// One plugin listed by a marketplace
#[derive(Debug, Clone, Deserialize)]
pub struct PluginEntry {
    /// Name used to select the plugin and to label its items
    pub name: String,
    /// Where the plugin content lives
    pub source: PluginSource,
    /// Shown to users, never interpreted
    #[serde(default)]
    pub description: Option<String>,
}

/// Where a plugin lives
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PluginSource {
    /// Path relative to the plugin root, or a URL
    Path(String),
    /// `{ "source": "github", "repo": "owner/name" }` and friends
    Remote {
        /// `github`, `git` or `url`
        source: String,
        /// `owner/name` for GitHub sources
        #[serde(default)]
        repo: Option<String>,
        /// Clone or download URL
        #[serde(default)]
        url: Option<String>,
    },
}

impl PluginSource {
    fn is_local(&self) -> bool {
        match self {
            PluginSource::Path(path) => !path.contains("://"),
            PluginSource::Remote { .. } => false,
        }
    }
}

impl Marketplace {
    /// Directory a local plugin source resolves to
    pub fn plugin_dir(&self, entry: &PluginEntry) -> Option<PathBuf> {
        let PluginSource::Path(source) = &entry.source else {
            return None;
        };
        if !entry.source.is_local() {
            return None;
        }
        let root = match &self.plugin_root {
            Some(root) => self.base_dir.join(root),
            None => self.base_dir.clone(),
        };
        Some(root.join(source))
    }
}

/// Read the manifest of a marketplace
///
/// `path` is either the marketplace directory or the manifest file itself.
pub fn load_marketplace(path: &Path) -> Result<Marketplace> {
    let file = if path.is_dir() {
        path.join(MARKETPLACE_FILE)
    } else {
        path.to_path_buf()
    };
    let file = AbsPath::new(file)?.normalized();

    let bytes = fs::read(file.as_path()).map_err(|e| Error::FileRead {
        path: file.as_path().to_path_buf(),
        source: e,
    })?;
    let mut marketplace: Marketplace =
        serde_json::from_slice(&bytes).map_err(|e| Error::InvalidMarketplace {
            path: file.as_path().to_path_buf(),
            reason: e.to_string(),
        })?;
    marketplace.base_dir = file
        .parent()
        .map(AbsPath::into_path_buf)
        .unwrap_or_default();

    tracing::debug!(
        name = %marketplace.name,
        plugins = marketplace.plugins.len(),
        "Loaded marketplace"
    );
    Ok(marketplace)
}

/// Outcome of a marketplace install
///
/// Names are `plugin:item`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketplaceReport {
    /// Files copied into `commands/`
    pub commands: InstallReport,
    /// Files copied into `hooks/`
    pub hooks: InstallReport,
    /// Bundles copied into `skills/`
    pub skills: InstallReport,
    /// Plugins whose source is not a local path
    pub unsupported: Vec<String>,
}

struct PluginContent {
    name: String,
    commands: Vec<AbsPath>,
    hooks: Vec<AbsPath>,
    skills_dir: Option<AbsPath>,
}

/// Copy the content of marketplace plugins into the canonical root
///
/// `plugins` names the plugins to install; empty means all of them. Every
/// selected plugin is scanned and its skills validated before anything is
/// copied. Existing commands, hooks and skills are replaced only with `force`,
/// after being captured into `backup`. Plugins with a remote source are
/// reported as unsupported and left alone.
pub fn install_marketplace<S: System + ?Sized>(
    system: &S,
    validator: &dyn SkillValidator,
    marketplace: &Marketplace,
    plugins: &[String],
    canonical_root: &AbsPath,
    force: bool,
    mut backup: Option<&mut BackupSession>,
) -> Result<MarketplaceReport> {
    if let Some(missing) = plugins
        .iter()
        .find(|name| !marketplace.plugins.iter().any(|p| &p.name == *name))
    {
        return Err(Error::InvalidMarketplace {
            path: marketplace.base_dir.clone(),
            reason: format!("no plugin named {missing} in {}", marketplace.name),
        });
    }

    let mut report = MarketplaceReport::default();
    let mut contents = Vec::new();
    for entry in &marketplace.plugins {
        if !plugins.is_empty() && !plugins.contains(&entry.name) {
            continue;
        }
        let Some(dir) = marketplace.plugin_dir(entry) else {
            tracing::warn!(plugin = %entry.name, "Remote plugin source is not supported, skipped");
            report.unsupported.push(entry.name.clone());
            continue;
        };
        let content = scan_plugin(system, &entry.name, &AbsPath::new(dir)?.normalized())?;
        if let Some(skills_dir) = &content.skills_dir {
            for dir in find_skill_dirs(skills_dir.as_path())? {
                validator.validate(&dir)?;
            }
        }
        contents.push(content);
    }

    let commands_root = canonical_root.join_path("commands");
    let hooks_root = canonical_root.join_path("hooks");
    for content in contents {
        for file in &content.commands {
            copy_item(
                system,
                &content.name,
                file,
                &commands_root,
                force,
                backup.as_deref_mut(),
                &mut report.commands,
            )?;
        }
        for file in &content.hooks {
            copy_item(
                system,
                &content.name,
                file,
                &hooks_root,
                force,
                backup.as_deref_mut(),
                &mut report.hooks,
            )?;
        }
        if let Some(skills_dir) = &content.skills_dir {
            let skills = install_local_skills(
                system,
                validator,
                skills_dir.as_path(),
                canonical_root,
                force,
                backup.as_deref_mut(),
            )?;
            let prefixed = |names: Vec<String>| {
                names
                    .into_iter()
                    .map(|name| format!("{}:{name}", content.name))
                    .collect::<Vec<_>>()
            };
            report.skills.installed.extend(prefixed(skills.installed));
            report.skills.skipped.extend(prefixed(skills.skipped));
        }
    }

    Ok(report)
}

fn scan_plugin<S: System + ?Sized>(
    system: &S,
    name: &str,
    dir: &AbsPath,
) -> Result<PluginContent> {
    if system.entry_kind(dir)? == EntryKind::Missing {
        return Err(Error::InvalidMarketplace {
            path: dir.as_path().to_path_buf(),
            reason: format!("plugin {name} not found"),
        });
    }

    let commands = list_files(system, &dir.join_path("commands"))?
        .into_iter()
        .filter(|file| {
            file.file_name()
                .is_some_and(|n| n.to_lowercase().ends_with(".md"))
        })
        .collect();
    let hooks = list_files(system, &dir.join_path("hooks"))?;

    let skills_dir = dir.join_path("skills");
    let skills_dir = system
        .entry_kind(&skills_dir)?
        .exists()
        .then_some(skills_dir);

    Ok(PluginContent {
        name: name.to_string(),
        commands,
        hooks,
        skills_dir,
    })
}

/// Regular files directly inside `dir`; nothing when it is missing
fn list_files<S: System + ?Sized>(system: &S, dir: &AbsPath) -> Result<Vec<AbsPath>> {
    if system.entry_kind(dir)? != EntryKind::Directory {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for path in system.list_dir(dir)? {
        if system.entry_kind(&path)? == EntryKind::File {
            files.push(path);
        }
    }
    Ok(files)
}

fn copy_item<S: System + ?Sized>(
    system: &S,
    plugin: &str,
    file: &AbsPath,
    dest_root: &AbsPath,
    force: bool,
    backup: Option<&mut BackupSession>,
    report: &mut InstallReport,
) -> Result<()> {
    let Some(name) = file.file_name() else {
        return Ok(());
    };
    let label = format!("{plugin}:{name}");
    let dest = dest_root.join_path(name);

    if system.entry_kind(&dest)?.exists() {
        if !force {
            tracing::info!(item = %label, "Already installed, skipped");
            report.skipped.push(label);
            return Ok(());
        }
        if let Some(session) = backup {
            session.capture(system, &dest)?;
        }
        system.remove(&dest)?;
    }

    system.copy_tree(file, &dest)?;
    tracing::info!(item = %label, dest = %dest, "Installed");
    report.installed.push(label);
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::skills::{FrontmatterValidator, SKILL_FILE};
    use crate::system::RealSystem;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn market(root: &Path, manifest: &str) {
        write(root, "my-plugin/commands/hello.md", "# hello");
        write(root, "my-plugin/commands/notes.txt", "not a command");
        write(root, "my-plugin/hooks/hooks.json", r#"{"onSave": "echo"}"#);
        write(
            root,
            &format!("my-plugin/skills/plugin-skill/{SKILL_FILE}"),
            "---\nname: plugin-skill\ndescription: From a plugin\n---\n",
        );
        write(root, MARKETPLACE_FILE, manifest);
    }

    const MANIFEST: &str = r#"{
        "name": "local-market",
        "pluginRoot": "..",
        "plugins": [
            { "name": "my-plugin", "source": "my-plugin" },
            { "name": "remote", "source": { "source": "github", "repo": "o/r" } }
        ]
    }"#;

    #[test]
    fn test_load_from_directory() {
        let temp = TempDir::new().unwrap();
        market(temp.path(), MANIFEST);

        let marketplace = load_marketplace(temp.path()).unwrap();
        assert_eq!(marketplace.name, "local-market");
        assert_eq!(marketplace.plugins.len(), 2);
        assert_eq!(
            marketplace.plugin_dir(&marketplace.plugins[0]),
            Some(temp.path().join(".claude-plugin/../my-plugin"))
        );
        assert_eq!(marketplace.plugin_dir(&marketplace.plugins[1]), None);
    }

    #[test]
    fn test_missing_manifest() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            load_marketplace(temp.path()),
            Err(Error::FileRead { .. })
        ));
    }

    #[test]
    fn test_malformed_manifest() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), MARKETPLACE_FILE, "{ \"plugins\": 3 }");
        assert!(matches!(
            load_marketplace(temp.path()),
            Err(Error::InvalidMarketplace { .. })
        ));
    }

    #[test]
    fn test_install_copies_commands_hooks_and_skills() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("market");
        market(&root, MANIFEST);
        let canonical = AbsPath::new(temp.path().join("home/.agents")).unwrap();
        let marketplace = load_marketplace(&root).unwrap();

        let report = install_marketplace(
            &RealSystem,
            &FrontmatterValidator,
            &marketplace,
            &["my-plugin".to_string()],
            &canonical,
            false,
            None,
        )
        .unwrap();

        assert_eq!(report.commands.installed, vec!["my-plugin:hello.md"]);
        assert_eq!(report.hooks.installed, vec!["my-plugin:hooks.json"]);
        assert_eq!(report.skills.installed, vec!["my-plugin:plugin-skill"]);
        assert!(report.unsupported.is_empty());

        let agents = temp.path().join("home/.agents");
        assert!(agents.join("commands/hello.md").is_file());
        assert!(!agents.join("commands/notes.txt").exists());
        assert!(agents.join("hooks/hooks.json").is_file());
        assert!(agents.join("skills/plugin-skill").join(SKILL_FILE).is_file());
    }

    #[test]
    fn test_existing_items_skipped_unless_forced() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("market");
        market(&root, MANIFEST);
        write(temp.path(), "home/.agents/commands/hello.md", "mine");
        let canonical = AbsPath::new(temp.path().join("home/.agents")).unwrap();
        let marketplace = load_marketplace(&root).unwrap();

        let report = install_marketplace(
            &RealSystem,
            &FrontmatterValidator,
            &marketplace,
            &[],
            &canonical,
            false,
            None,
        )
        .unwrap();
        assert_eq!(report.commands.skipped, vec!["my-plugin:hello.md"]);
        assert_eq!(report.unsupported, vec!["remote"]);
        let hello = temp.path().join("home/.agents/commands/hello.md");
        assert_eq!(fs::read_to_string(&hello).unwrap(), "mine");

        let base = AbsPath::new(temp.path().join("home")).unwrap();
        let backups = base.join_path(".agents/backups");
        let mut session =
            BackupSession::new(&backups, base, dotagents_core::Scope::Global, "marketplace-add");
        let forced = install_marketplace(
            &RealSystem,
            &FrontmatterValidator,
            &marketplace,
            &[],
            &canonical,
            true,
            Some(&mut session),
        )
        .unwrap();
        assert_eq!(forced.commands.installed, vec!["my-plugin:hello.md"]);
        assert_eq!(fs::read_to_string(&hello).unwrap(), "# hello");

        let copy = &session.entries()[0].backup;
        assert_eq!(fs::read_to_string(copy).unwrap(), "mine");
    }

    #[test]
    fn test_unknown_plugin_rejected() {
        let temp = TempDir::new().unwrap();
        market(temp.path(), MANIFEST);
        let canonical = AbsPath::new(temp.path().join(".agents")).unwrap();
        let marketplace = load_marketplace(temp.path()).unwrap();

        let result = install_marketplace(
            &RealSystem,
            &FrontmatterValidator,
            &marketplace,
            &["absent".to_string()],
            &canonical,
            false,
            None,
        );
        assert!(matches!(result, Err(Error::InvalidMarketplace { .. })));
    }

    #[test]
    fn test_invalid_plugin_skill_installs_nothing() {
        let temp = TempDir::new().unwrap();
        market(temp.path(), MANIFEST);
        write(
            temp.path(),
            &format!("my-plugin/skills/broken/{SKILL_FILE}"),
            "---\nname: broken\n---\n",
        );
        let canonical = AbsPath::new(temp.path().join("out/.agents")).unwrap();
        let marketplace = load_marketplace(temp.path()).unwrap();

        let result = install_marketplace(
            &RealSystem,
            &FrontmatterValidator,
            &marketplace,
            &[],
            &canonical,
            false,
            None,
        );
        assert!(matches!(result, Err(Error::InvalidSkill { .. })));
        assert!(!temp.path().join("out").exists());
    }
}
