//! XDG directory utilities
//!
//! XDG-compliant locations for dotagents' own files, via the `xdg` crate:
//! `XDG_CONFIG_HOME` defaults to ~/.config

use std::path::PathBuf;
use xdg::BaseDirectories;

/// Get the dotagents config directory
///
/// Returns `$XDG_CONFIG_HOME/dotagents` or `~/.config/dotagents`
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    BaseDirectories::with_prefix("dotagents").get_config_home()
}

/// Get the default config file path
#[must_use]
pub fn default_config_file() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}
