//! Resolved root directories
//!
//! [`Roots`] is computed once per invocation and threaded through every
//! component, so nothing below the CLI looks at the environment.

use dotagents_core::path::AbsPath;
use dotagents_core::{Client, Error, Result, Scope};
use indexmap::IndexMap;
use std::path::PathBuf;

/// Name of the canonical directory under the scope base
pub const CANONICAL_DIR: &str = ".agents";

/// All absolute paths one invocation works with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roots {
    /// Scope being reconciled
    pub scope: Scope,
    /// Home directory
    pub home: AbsPath,
    /// Home for global scope, the project root for project scope
    pub base: AbsPath,
    /// `<base>/.agents`
    pub canonical_root: AbsPath,
    clients: Vec<AbsPath>,
}

impl Roots {
    /// Resolve roots for a scope
    ///
    /// `project_root` is required for [`Scope::Project`] and ignored for
    /// [`Scope::Global`]. Overrides replace the conventional root of a client.
    pub fn resolve(
        scope: Scope,
        home: AbsPath,
        project_root: Option<AbsPath>,
        overrides: &IndexMap<Client, PathBuf>,
    ) -> Result<Self> {
        let base = match scope {
            Scope::Global => home.clone(),
            Scope::Project => project_root.ok_or_else(|| {
                Error::Config("project scope requires a project root".to_string())
            })?,
        };

        let clients = Client::ALL
            .into_iter()
            .map(|client| match overrides.get(&client) {
                Some(path) => AbsPath::new(path.clone()),
                None => Ok(base.join_path(default_root(scope, client))),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            scope,
            canonical_root: base.join_path(CANONICAL_DIR),
            home,
            base,
            clients,
        })
    }

    /// Root directory of a client in this scope
    pub fn client_root(&self, client: Client) -> &AbsPath {
        &self.clients[client as usize]
    }
}

/// Conventional root of a client, relative to the scope base
fn default_root(scope: Scope, client: Client) -> &'static str {
    match (scope, client) {
        (_, Client::Claude) => ".claude",
        (_, Client::Factory) => ".factory",
        (_, Client::Codex) => ".codex",
        (_, Client::Cursor) => ".cursor",
        (Scope::Global, Client::Opencode) => ".config/opencode",
        (Scope::Project, Client::Opencode) => ".opencode",
        (_, Client::Gemini) => ".gemini",
        (Scope::Global, Client::Github) => ".copilot",
        (Scope::Project, Client::Github) => ".github",
        (Scope::Global, Client::Ampcode) => ".config/amp",
        (Scope::Project, Client::Ampcode) => ".amp",
        (_, Client::Kilocode) => ".kilocode",
        (_, Client::Roocode) => ".roo",
        (_, Client::Windsurf) => ".windsurf",
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::path::Path;

    fn home() -> AbsPath {
        AbsPath::new("/home/u".into()).unwrap()
    }

    #[test]
    fn test_global_roots() {
        let roots = Roots::resolve(Scope::Global, home(), None, &IndexMap::new()).unwrap();
        assert_eq!(roots.canonical_root.as_path(), Path::new("/home/u/.agents"));
        assert_eq!(
            roots.client_root(Client::Github).as_path(),
            Path::new("/home/u/.copilot")
        );
        assert_eq!(
            roots.client_root(Client::Opencode).as_path(),
            Path::new("/home/u/.config/opencode")
        );
    }

    #[test]
    fn test_project_roots() {
        let project = AbsPath::new("/work/repo".into()).unwrap();
        let roots =
            Roots::resolve(Scope::Project, home(), Some(project), &IndexMap::new()).unwrap();
        assert_eq!(roots.base.as_path(), Path::new("/work/repo"));
        assert_eq!(
            roots.canonical_root.as_path(),
            Path::new("/work/repo/.agents")
        );
        assert_eq!(
            roots.client_root(Client::Github).as_path(),
            Path::new("/work/repo/.github")
        );
        assert_eq!(
            roots.client_root(Client::Ampcode).as_path(),
            Path::new("/work/repo/.amp")
        );
    }

    #[test]
    fn test_project_scope_needs_project_root() {
        assert!(Roots::resolve(Scope::Project, home(), None, &IndexMap::new()).is_err());
    }

    #[test]
    fn test_override_replaces_client_root() {
        let mut overrides = IndexMap::new();
        overrides.insert(Client::Claude, PathBuf::from("/opt/claude"));
        let roots = Roots::resolve(Scope::Global, home(), None, &overrides).unwrap();
        assert_eq!(
            roots.client_root(Client::Claude).as_path(),
            Path::new("/opt/claude")
        );
        assert_eq!(
            roots.client_root(Client::Codex).as_path(),
            Path::new("/home/u/.codex")
        );
    }

    #[test]
    fn test_relative_override_rejected() {
        let mut overrides = IndexMap::new();
        overrides.insert(Client::Codex, PathBuf::from("codex"));
        assert!(Roots::resolve(Scope::Global, home(), None, &overrides).is_err());
    }
}
