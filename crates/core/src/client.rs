//! Clients and scopes
//!
//! A [`Client`] is an external tool with its own configuration directory
//! conventions. A [`Scope`] decides whether the user-wide or the per-project
//! canonical root is being reconciled.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reconciliation scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// User-wide configuration rooted at the home directory
    #[default]
    Global,
    /// Repository-local configuration rooted at a project directory
    Project,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Global => "global",
            Scope::Project => "project",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "global" | "user" => Ok(Scope::Global),
            "project" | "local" => Ok(Scope::Project),
            other => Err(Error::Config(format!(
                "Invalid scope: {other}. Use 'global' or 'project'"
            ))),
        }
    }
}

/// A tool whose configuration directories are kept in sync
///
/// Variant order is the declaration order used everywhere targets are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Client {
    Claude,
    Factory,
    Codex,
    Cursor,
    Opencode,
    Gemini,
    Github,
    Ampcode,
    Kilocode,
    Roocode,
    Windsurf,
}

impl Client {
    /// Every known client in declaration order
    pub const ALL: [Client; 11] = [
        Client::Claude,
        Client::Factory,
        Client::Codex,
        Client::Cursor,
        Client::Opencode,
        Client::Gemini,
        Client::Github,
        Client::Ampcode,
        Client::Kilocode,
        Client::Roocode,
        Client::Windsurf,
    ];

    /// Identifier used in configuration files and on the command line
    pub fn id(self) -> &'static str {
        match self {
            Client::Claude => "claude",
            Client::Factory => "factory",
            Client::Codex => "codex",
            Client::Cursor => "cursor",
            Client::Opencode => "opencode",
            Client::Gemini => "gemini",
            Client::Github => "github",
            Client::Ampcode => "ampcode",
            Client::Kilocode => "kilocode",
            Client::Roocode => "roocode",
            Client::Windsurf => "windsurf",
        }
    }

    /// Human readable name, used to label migration candidates
    pub fn display_name(self) -> &'static str {
        match self {
            Client::Claude => "Claude",
            Client::Factory => "Factory",
            Client::Codex => "Codex",
            Client::Cursor => "Cursor",
            Client::Opencode => "OpenCode",
            Client::Gemini => "Gemini",
            Client::Github => "GitHub Copilot",
            Client::Ampcode => "Amp",
            Client::Kilocode => "Kilo Code",
            Client::Roocode => "Roo Code",
            Client::Windsurf => "Windsurf",
        }
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Client {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        match wanted.as_str() {
            "copilot" => return Ok(Client::Github),
            "amp" => return Ok(Client::Ampcode),
            "roo" => return Ok(Client::Roocode),
            "kilo" => return Ok(Client::Kilocode),
            _ => {}
        }
        Client::ALL
            .into_iter()
            .find(|c| c.id() == wanted)
            .ok_or_else(|| Error::UnknownClient(s.to_string()))
    }
}
