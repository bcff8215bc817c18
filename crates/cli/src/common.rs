//! Common runtime context for commands
//!
//! Roots and the active client set are resolved once per invocation and
//! shared by every command through [`RuntimeContext`].

use anyhow::{Context, Result};
use dotagents_config::Config;
use dotagents_core::{Client, Scope};
use dotagents_engine::backup::default_backup_root;
use dotagents_engine::{AbsPath, BackupSession, Roots};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::CommandError;

/// Runtime context shared by all commands
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    /// Loaded configuration
    pub config: Arc<Config>,
    /// Resolved roots for the active scope
    pub roots: Roots,
    /// Active clients in declaration order
    pub clients: Vec<Client>,
    backup_root: AbsPath,
}

impl RuntimeContext {
    /// Build a context from resolved roots
    ///
    /// The backup root comes from `backup.dir` when configured, otherwise
    /// `<canonical_root>/backups`.
    pub fn new(config: Config, roots: Roots, clients: Vec<Client>) -> Result<Self> {
        let backup_root = match &config.backup.dir {
            Some(dir) => AbsPath::new(absolutize(dir)?)?.normalized(),
            None => default_backup_root(&roots),
        };
        Ok(Self {
            config: Arc::new(config),
            roots,
            clients,
            backup_root,
        })
    }

    /// Directory holding backup sessions
    pub fn backup_root(&self) -> &AbsPath {
        &self.backup_root
    }

    /// Start a backup session for one operation
    pub fn backup_session(&self, operation: &str) -> BackupSession {
        BackupSession::for_roots(&self.roots, Some(&self.backup_root), operation)
    }
}

/// Inputs for root resolution, after command line and config are merged
#[derive(Debug, Clone, Default)]
pub struct RootOptions {
    pub scope: Option<Scope>,
    pub home: Option<PathBuf>,
    pub project: Option<PathBuf>,
}

impl RootOptions {
    /// Scope in effect
    ///
    /// An explicit scope wins. Naming a project directory implies project
    /// scope; otherwise the configured default applies.
    pub fn effective_scope(&self, config: &Config) -> Scope {
        match (self.scope, &self.project) {
            (Some(scope), _) => scope,
            (None, Some(_)) => Scope::Project,
            (None, None) => config.general.scope,
        }
    }

    /// Resolve every root for this invocation
    pub fn resolve(&self, config: &Config) -> Result<Roots> {
        let home = match &self.home {
            Some(home) => absolutize(home)?,
            None => ::dirs::home_dir().ok_or(CommandError::HomeNotFound)?,
        };
        let home = AbsPath::new(home)?.normalized();

        let scope = self.effective_scope(config);
        let project = match scope {
            Scope::Global => None,
            Scope::Project => {
                let dir = match &self.project {
                    Some(dir) => absolutize(dir)?,
                    None => std::env::current_dir()
                        .context("Failed to determine the current directory")?,
                };
                if !dir.is_dir() {
                    return Err(CommandError::PathNotFound(dir).into());
                }
                Some(AbsPath::new(dir)?.normalized())
            }
        };

        tracing::debug!(%scope, home = %home, "Resolving roots");
        Ok(Roots::resolve(scope, home, project, &config.roots)?)
    }
}

/// Make a command line path absolute against the current directory
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let cwd = std::env::current_dir().context("Failed to determine the current directory")?;
        Ok(cwd.join(path))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_project_flag_implies_project_scope() {
        let config = Config::default();
        let options = RootOptions {
            project: Some(PathBuf::from("/tmp")),
            ..RootOptions::default()
        };
        assert_eq!(options.effective_scope(&config), Scope::Project);
    }

    #[test]
    fn test_explicit_scope_wins() {
        let mut config = Config::default();
        config.general.scope = Scope::Project;
        let options = RootOptions {
            scope: Some(Scope::Global),
            project: Some(PathBuf::from("/tmp")),
            ..RootOptions::default()
        };
        assert_eq!(options.effective_scope(&config), Scope::Global);
    }

    #[test]
    fn test_configured_scope_is_default() {
        let mut config = Config::default();
        config.general.scope = Scope::Project;
        assert_eq!(
            RootOptions::default().effective_scope(&config),
            Scope::Project
        );
    }

    #[test]
    fn test_resolve_project_roots() {
        let home = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        let options = RootOptions {
            scope: None,
            home: Some(home.path().to_path_buf()),
            project: Some(project.path().to_path_buf()),
        };

        let roots = options.resolve(&Config::default()).unwrap();
        assert_eq!(roots.scope, Scope::Project);
        assert_eq!(roots.base.as_path(), project.path());
        assert_eq!(
            roots.canonical_root.as_path(),
            project.path().join(".agents")
        );
    }

    #[test]
    fn test_missing_project_dir_rejected() {
        let home = TempDir::new().unwrap();
        let options = RootOptions {
            scope: None,
            home: Some(home.path().to_path_buf()),
            project: Some(home.path().join("absent")),
        };
        assert!(options.resolve(&Config::default()).is_err());
    }

    #[test]
    fn test_backup_root_defaults_under_canonical() {
        let home = TempDir::new().unwrap();
        let options = RootOptions {
            home: Some(home.path().to_path_buf()),
            ..RootOptions::default()
        };
        let config = Config::default();
        let roots = options.resolve(&config).unwrap();
        let context = RuntimeContext::new(config, roots, Client::ALL.to_vec()).unwrap();
        assert_eq!(
            context.backup_root().as_path(),
            home.path().join(".agents/backups")
        );
    }

    #[test]
    fn test_configured_backup_root() {
        let home = TempDir::new().unwrap();
        let options = RootOptions {
            home: Some(home.path().to_path_buf()),
            ..RootOptions::default()
        };
        let mut config = Config::default();
        config.backup.dir = Some(home.path().join("elsewhere"));
        let roots = options.resolve(&config).unwrap();
        let context = RuntimeContext::new(config, roots, vec![Client::Claude]).unwrap();
        assert_eq!(
            context.backup_root().as_path(),
            home.path().join("elsewhere")
        );
    }
}
