//! Canonical source to client target mappings
//!
//! The mapping table is a pure function of the scope, the resolved roots, the
//! active clients and the instruction overrides present in the canonical root.
//! Target lists come from static tables filtered by the active client set.

use crate::entry::{EntryKind, SourceKind};
use crate::roots::Roots;
use crate::system::System;
use dotagents_core::path::AbsPath;
use dotagents_core::{Client, Result, Scope};

/// Shared instructions file
pub const AGENTS_MD: &str = "AGENTS.md";
/// Claude-specific instructions override
pub const CLAUDE_MD: &str = "CLAUDE.md";
/// Gemini-specific instructions override
pub const GEMINI_MD: &str = "GEMINI.md";

/// A client location expected to mirror a canonical source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub client: Client,
    pub path: AbsPath,
}

/// One canonical source and every location that should link to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    /// Stable mapping name, e.g. `claude-md` or `commands`
    pub name: &'static str,
    /// Absolute path inside the canonical root
    pub source: AbsPath,
    pub kind: SourceKind,
    pub targets: Vec<Target>,
}

impl Mapping {
    /// Whether this mapping carries instructions rather than an artifact category
    pub fn is_instruction(&self) -> bool {
        INSTRUCTIONS.iter().any(|spec| spec.name == self.name)
    }
}

/// Instruction overrides present in the canonical root
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    pub claude: bool,
    pub gemini: bool,
}

/// Which scopes a target applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scopes {
    Both,
    ProjectOnly,
}

#[derive(Debug)]
struct TargetSpec {
    client: Client,
    rel: &'static str,
    scopes: Scopes,
}

const fn both(client: Client, rel: &'static str) -> TargetSpec {
    TargetSpec {
        client,
        rel,
        scopes: Scopes::Both,
    }
}

const fn project_only(client: Client, rel: &'static str) -> TargetSpec {
    TargetSpec {
        client,
        rel,
        scopes: Scopes::ProjectOnly,
    }
}

#[derive(Debug)]
struct MappingSpec {
    name: &'static str,
    source: &'static str,
    kind: SourceKind,
    targets: &'static [TargetSpec],
    /// Emitted even when every target is filtered out
    always: bool,
}

/// Global-scope instruction mappings, in emission order
///
/// `claude-md` and `gemini-md` name their override file as source; it is
/// swapped for `AGENTS.md` when the override does not exist.
const INSTRUCTIONS: &[MappingSpec] = &[
    MappingSpec {
        name: "claude-md",
        source: CLAUDE_MD,
        kind: SourceKind::File,
        targets: &[both(Client::Claude, CLAUDE_MD)],
        always: false,
    },
    MappingSpec {
        name: "gemini-md",
        source: GEMINI_MD,
        kind: SourceKind::File,
        targets: &[both(Client::Gemini, GEMINI_MD)],
        always: false,
    },
    MappingSpec {
        name: "agents-md",
        source: AGENTS_MD,
        kind: SourceKind::File,
        targets: &[
            both(Client::Factory, AGENTS_MD),
            both(Client::Codex, AGENTS_MD),
            both(Client::Opencode, AGENTS_MD),
            both(Client::Ampcode, AGENTS_MD),
            both(Client::Kilocode, AGENTS_MD),
            both(Client::Roocode, AGENTS_MD),
            both(Client::Windsurf, AGENTS_MD),
        ],
        always: false,
    },
    MappingSpec {
        name: "windsurfrules",
        source: AGENTS_MD,
        kind: SourceKind::File,
        targets: &[both(Client::Windsurf, ".windsurfrules")],
        always: false,
    },
];

/// Artifact categories, emitted in both scopes
const CATEGORIES: &[MappingSpec] = &[
    MappingSpec {
        name: "commands",
        source: "commands",
        kind: SourceKind::Dir,
        targets: &[
            both(Client::Claude, "commands"),
            both(Client::Factory, "commands"),
            both(Client::Codex, "prompts"),
            both(Client::Opencode, "commands"),
            both(Client::Cursor, "commands"),
            both(Client::Gemini, "commands"),
            both(Client::Roocode, "commands"),
        ],
        always: true,
    },
    MappingSpec {
        name: "hooks",
        source: "hooks",
        kind: SourceKind::Dir,
        targets: &[both(Client::Claude, "hooks"), both(Client::Factory, "hooks")],
        always: true,
    },
    MappingSpec {
        name: "skills",
        source: "skills",
        kind: SourceKind::Dir,
        targets: &[
            both(Client::Claude, "skills"),
            both(Client::Factory, "skills"),
            both(Client::Codex, "skills"),
            both(Client::Opencode, "skills"),
            both(Client::Cursor, "skills"),
            both(Client::Gemini, "skills"),
            both(Client::Github, "skills"),
            both(Client::Kilocode, "skills"),
            both(Client::Roocode, "skills"),
            both(Client::Windsurf, "skills"),
        ],
        always: true,
    },
    MappingSpec {
        name: "rules",
        source: "rules",
        kind: SourceKind::Dir,
        targets: &[
            both(Client::Claude, "rules"),
            both(Client::Cursor, "rules"),
            project_only(Client::Github, "instructions"),
            both(Client::Kilocode, "rules"),
            both(Client::Roocode, "rules"),
            both(Client::Windsurf, "rules"),
        ],
        always: true,
    },
    MappingSpec {
        name: "workflows",
        source: "workflows",
        kind: SourceKind::Dir,
        targets: &[
            both(Client::Kilocode, "workflows"),
            both(Client::Windsurf, "workflows"),
        ],
        always: true,
    },
    MappingSpec {
        name: "ignore",
        source: "ignore",
        kind: SourceKind::File,
        targets: &[
            both(Client::Windsurf, ".codeiumignore"),
            both(Client::Roocode, ".rooignore"),
        ],
        always: true,
    },
];

/// Names of the skill-like categories, whose entries are keyed by skill name
pub const SKILL_CATEGORIES: &[&str] = &["skills"];

/// Detect which instruction overrides exist in the canonical root
pub fn detect_overrides<S: System + ?Sized>(system: &S, roots: &Roots) -> Result<Overrides> {
    let exists = |name: &str| -> Result<bool> {
        let kind = system.entry_kind(&roots.canonical_root.join_path(name))?;
        Ok(kind != EntryKind::Missing)
    };
    Ok(Overrides {
        claude: exists(CLAUDE_MD)?,
        gemini: exists(GEMINI_MD)?,
    })
}

/// Build the mapping table
///
/// `clients` is the active set; order of mappings and targets comes from the
/// static tables, never from `clients`.
pub fn build_mappings(roots: &Roots, clients: &[Client], overrides: Overrides) -> Vec<Mapping> {
    let mut mappings = Vec::new();

    if roots.scope == Scope::Global {
        for spec in INSTRUCTIONS {
            let source = match spec.name {
                "claude-md" if !overrides.claude => AGENTS_MD,
                "gemini-md" if !overrides.gemini => AGENTS_MD,
                _ => spec.source,
            };
            if let Some(mapping) = realize(spec, source, roots, clients) {
                mappings.push(mapping);
            }
        }
    }

    for spec in CATEGORIES {
        if let Some(mapping) = realize(spec, spec.source, roots, clients) {
            mappings.push(mapping);
        }
    }

    mappings
}

fn realize(
    spec: &MappingSpec,
    source: &str,
    roots: &Roots,
    clients: &[Client],
) -> Option<Mapping> {
    let targets: Vec<Target> = spec
        .targets
        .iter()
        .filter(|t| clients.contains(&t.client))
        .filter(|t| t.scopes == Scopes::Both || roots.scope == Scope::Project)
        .map(|t| Target {
            client: t.client,
            path: roots.client_root(t.client).join_path(t.rel),
        })
        .collect();

    if targets.is_empty() && !spec.always {
        return None;
    }

    Some(Mapping {
        name: spec.name,
        source: roots.canonical_root.join_path(source),
        kind: spec.kind,
        targets,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use indexmap::IndexMap;
    use std::path::Path;

    fn global_roots() -> Roots {
        let home = AbsPath::new("/home/u".into()).unwrap();
        Roots::resolve(Scope::Global, home, None, &IndexMap::new()).unwrap()
    }

    fn project_roots() -> Roots {
        let home = AbsPath::new("/home/u".into()).unwrap();
        let project = AbsPath::new("/work/repo".into()).unwrap();
        Roots::resolve(Scope::Project, home, Some(project), &IndexMap::new()).unwrap()
    }

    fn find<'a>(mappings: &'a [Mapping], name: &str) -> Option<&'a Mapping> {
        mappings.iter().find(|m| m.name == name)
    }

    fn target_paths(mapping: &Mapping) -> Vec<&Path> {
        mapping.targets.iter().map(|t| t.path.as_path()).collect()
    }

    #[test]
    fn test_global_mapping_order() {
        let mappings = build_mappings(&global_roots(), &Client::ALL, Overrides::default());
        let names: Vec<_> = mappings.iter().map(|m| m.name).collect();
        assert_eq!(
            names,
            vec![
                "claude-md",
                "gemini-md",
                "agents-md",
                "windsurfrules",
                "commands",
                "hooks",
                "skills",
                "rules",
                "workflows",
                "ignore"
            ]
        );
    }

    #[test]
    fn test_instructions_fall_back_to_agents_md() {
        let mappings = build_mappings(&global_roots(), &Client::ALL, Overrides::default());
        let claude = find(&mappings, "claude-md").unwrap();
        assert_eq!(claude.source.as_path(), Path::new("/home/u/.agents/AGENTS.md"));
        assert_eq!(
            target_paths(claude),
            vec![Path::new("/home/u/.claude/CLAUDE.md")]
        );
    }

    #[test]
    fn test_overrides_select_dedicated_sources() {
        let overrides = Overrides {
            claude: true,
            gemini: true,
        };
        let mappings = build_mappings(&global_roots(), &Client::ALL, overrides);
        assert_eq!(
            find(&mappings, "claude-md").unwrap().source.as_path(),
            Path::new("/home/u/.agents/CLAUDE.md")
        );
        assert_eq!(
            find(&mappings, "gemini-md").unwrap().source.as_path(),
            Path::new("/home/u/.agents/GEMINI.md")
        );
    }

    #[test]
    fn test_project_scope_has_no_instruction_mappings() {
        let mappings = build_mappings(&project_roots(), &Client::ALL, Overrides::default());
        assert!(mappings.iter().all(|m| !m.is_instruction()));
        assert!(find(&mappings, "agents-md").is_none());
    }

    #[test]
    fn test_agents_md_omitted_without_targets() {
        let mappings = build_mappings(&global_roots(), &[Client::Claude], Overrides::default());
        assert!(find(&mappings, "agents-md").is_none());
        assert!(find(&mappings, "windsurfrules").is_none());
        let workflows = find(&mappings, "workflows").unwrap();
        assert!(workflows.targets.is_empty());
    }

    #[test]
    fn test_github_locations_by_scope() {
        let global = build_mappings(&global_roots(), &[Client::Github], Overrides::default());
        assert_eq!(
            target_paths(find(&global, "skills").unwrap()),
            vec![Path::new("/home/u/.copilot/skills")]
        );
        assert!(find(&global, "rules").unwrap().targets.is_empty());

        let project = build_mappings(&project_roots(), &[Client::Github], Overrides::default());
        assert_eq!(
            target_paths(find(&project, "skills").unwrap()),
            vec![Path::new("/work/repo/.github/skills")]
        );
        assert_eq!(
            target_paths(find(&project, "rules").unwrap()),
            vec![Path::new("/work/repo/.github/instructions")]
        );
    }

    #[test]
    fn test_project_rules_targets() {
        let mappings = build_mappings(&project_roots(), &Client::ALL, Overrides::default());
        let rules = target_paths(find(&mappings, "rules").unwrap());
        assert!(rules.contains(&Path::new("/work/repo/.cursor/rules")));
        assert!(rules.contains(&Path::new("/work/repo/.claude/rules")));
        assert!(rules.contains(&Path::new("/work/repo/.github/instructions")));
    }

    #[test]
    fn test_target_order_ignores_client_list_order() {
        let a = build_mappings(
            &global_roots(),
            &[Client::Roocode, Client::Claude],
            Overrides::default(),
        );
        let b = build_mappings(
            &global_roots(),
            &[Client::Claude, Client::Roocode],
            Overrides::default(),
        );
        assert_eq!(a, b);
        let commands = find(&a, "commands").unwrap();
        assert_eq!(commands.targets[0].client, Client::Claude);
        assert_eq!(commands.targets[1].client, Client::Roocode);
    }

    #[test]
    fn test_sources_never_appear_as_targets() {
        for roots in [global_roots(), project_roots()] {
            let mappings = build_mappings(&roots, &Client::ALL, Overrides::default());
            for mapping in &mappings {
                assert!(mapping.source.as_path().starts_with(roots.canonical_root.as_path()));
                for other in &mappings {
                    assert!(other.targets.iter().all(|t| t.path != mapping.source));
                }
            }
        }
    }
}
