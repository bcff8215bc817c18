//! Configuration management
//!
//! This module handles loading dotagents configuration.

use crate::Result;
use dotagents_core::{Client, Error, Scope};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// General configuration section
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GeneralConfig {
    /// Active clients; every known client when unset
    #[serde(default)]
    pub clients: Option<Vec<Client>>,

    /// Scope used when neither `--scope` nor `--project` is given
    #[serde(default)]
    pub scope: Scope,
}

/// Backup configuration section
///
/// ```toml
/// [backup]
/// dir = "~/.local/state/dotagents/backups"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BackupConfig {
    /// Directory holding backup sessions
    ///
    /// Defaults to `backups/` inside the canonical root of the active scope.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// dotagents configuration
///
/// ```toml
/// [general]
/// clients = ["claude", "codex"]
/// scope = "global"
///
/// [roots]
/// claude = "~/work/claude-home"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// General configuration section
    #[serde(default)]
    pub general: GeneralConfig,

    /// Backup configuration section
    #[serde(default)]
    pub backup: BackupConfig,

    /// Per-client root directory overrides
    #[serde(default)]
    pub roots: IndexMap<Client, PathBuf>,
}

impl Config {
    /// Load configuration from a file
    ///
    /// Relative paths are resolved against the file's directory and `~` is
    /// expanded to the home directory.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or TOML parsing fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {e}", path.display()))
        })?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml_str(&content, base_dir)
            .map_err(|e| e.context(format!("Invalid config file {}", path.display())))
    }

    /// Load configuration if the file exists, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.as_ref().display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns error if TOML parsing or validation fails
    pub fn from_toml_str(toml_content: &str, base_dir: &Path) -> Result<Self> {
        let mut config: Self = toml::from_str(toml_content)
            .map_err(|e| Error::Config(format!("Failed to parse config TOML: {e}")))?;

        config.resolve_relative_paths(base_dir);
        config.validate()?;
        Ok(config)
    }

    /// Active clients in declaration order, without duplicates
    pub fn active_clients(&self) -> Vec<Client> {
        match &self.general.clients {
            None => Client::ALL.to_vec(),
            Some(list) => Client::ALL
                .into_iter()
                .filter(|c| list.contains(c))
                .collect(),
        }
    }

    fn validate(&self) -> Result<()> {
        if let Some(clients) = &self.general.clients
            && clients.is_empty()
        {
            return Err(Error::Config(
                "general.clients is empty; remove it to enable every client".to_string(),
            ));
        }
        for (client, root) in &self.roots {
            if !root.is_absolute() {
                return Err(Error::Config(format!(
                    "roots.{client} must be an absolute path: {}",
                    root.display()
                )));
            }
        }
        Ok(())
    }

    fn resolve_relative_paths(&mut self, base_dir: &Path) {
        if let Some(dir) = &self.backup.dir {
            self.backup.dir = Some(Self::resolve_path(dir, base_dir));
        }
        for root in self.roots.values_mut() {
            *root = Self::resolve_path(root, base_dir);
        }
    }

    /// Resolve a single path: expand ~/ and resolve relative paths
    fn resolve_path(path: &Path, base_dir: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();

        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = ::dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~"
            && let Some(home) = ::dirs::home_dir()
        {
            return home;
        }

        if path.is_relative() {
            base_dir.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use tempfile::TempDir;

    fn create_test_config(toml_content: &str) -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, toml_content).unwrap();
        (temp_dir, config_path)
    }

    #[test]
    fn test_load_empty_config() {
        let (_temp_dir, config_path) = create_test_config("");
        let config = Config::load(&config_path).unwrap();

        assert_eq!(config.active_clients(), Client::ALL.to_vec());
        assert_eq!(config.general.scope, Scope::Global);
        assert!(config.backup.dir.is_none());
    }

    #[test]
    fn test_active_clients_follow_declaration_order() {
        let toml = r#"
[general]
clients = ["windsurf", "claude", "claude"]
"#;
        let (_temp_dir, config_path) = create_test_config(toml);
        let config = Config::load(&config_path).unwrap();

        assert_eq!(
            config.active_clients(),
            vec![Client::Claude, Client::Windsurf]
        );
    }

    #[test]
    fn test_empty_client_list_rejected() {
        let (_temp_dir, config_path) = create_test_config("[general]\nclients = []\n");
        let err = Config::load(&config_path).unwrap_err();
        assert!(err.to_string().contains("config"));
    }

    #[test]
    fn test_unknown_client_rejected() {
        let (_temp_dir, config_path) = create_test_config("[general]\nclients = [\"vim\"]\n");
        assert!(Config::load(&config_path).is_err());
    }

    #[test]
    fn test_relative_backup_dir_resolved_against_config_dir() {
        let (temp_dir, config_path) = create_test_config("[backup]\ndir = \"backups\"\n");
        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.backup.dir, Some(temp_dir.path().join("backups")));
    }

    #[test]
    fn test_root_overrides() {
        let toml = r#"
[roots]
claude = "/opt/claude"
"#;
        let (_temp_dir, config_path) = create_test_config(toml);
        let config = Config::load(&config_path).unwrap();
        assert_eq!(
            config.roots.get(&Client::Claude),
            Some(&PathBuf::from("/opt/claude"))
        );
        assert!(!config.roots.contains_key(&Client::Codex));
    }

    #[test]
    fn test_resolve_tilde_path() {
        let temp_dir = TempDir::new().unwrap();
        let resolved = Config::resolve_path(Path::new("~/test/file.txt"), temp_dir.path());

        if let Some(home) = ::dirs::home_dir() {
            assert_eq!(resolved, home.join("test/file.txt"));
        }
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_or_default(temp_dir.path().join("absent.toml")).unwrap();
        assert!(config.general.clients.is_none());
    }
}
