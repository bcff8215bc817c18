//! # dotagents engine
//!
//! Reconciles one canonical directory of agent configuration with the
//! directories each client tool expects, using symbolic links.
//!
//! - **Roots**: every absolute path an invocation works with
//! - **Mapping Table**: canonical sources and the client targets mirroring them
//! - **Link Plan**: read-only decision per target (create, link, ok, conflict)
//! - **Apply Engine**: the only writer, consulting a backup session
//! - **Backups**: per-operation pre-image capture, listing and restore
//! - **Migration**: merges existing client content into the canonical root
//! - **Skills**: `SKILL.md` validation and local installation
//! - **Marketplaces**: commands, hooks and skills from local plugin marketplaces
//! - **System Abstraction**: filesystem operations abstracted for dry runs

pub mod apply;
pub mod backup;
pub mod entry;
pub mod hash;
pub mod link_target;
pub mod mapping;
pub mod marketplace;
pub mod migrate;
pub mod plan;
pub mod roots;
pub mod skills;
pub mod system;

// Re-export path types from core
pub use dotagents_core::path::{AbsPath, RelPath};

// Re-export error types from core
pub use dotagents_core::{Error, Result};

// Re-export commonly used types
pub use apply::{ApplyOptions, ApplyReport, apply_plan};
pub use backup::{BackupManifest, BackupSession, list_sessions, restore};
pub use entry::{EntryKind, SourceKind};
pub use link_target::{LinkValue, link_value};
pub use mapping::{Mapping, Overrides, Target, build_mappings, detect_overrides};
pub use marketplace::{Marketplace, MarketplaceReport, install_marketplace, load_marketplace};
pub use migrate::{
    MigrationCandidate, MigrationConflict, MigrationItem, MigrationOptions, MigrationPlan,
    MigrationReport, Selection, Selections, apply_migration, scan_migration,
};
pub use plan::{LinkPlan, LinkTask, build_link_plan};
pub use roots::Roots;
pub use skills::{FrontmatterValidator, install_local_skills};
pub use system::{DryRunSystem, RealSystem, System};
