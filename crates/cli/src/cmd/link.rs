//! Link command implementation
//!
//! Builds the link plan for the active scope and applies it, backing up
//! anything a forced link replaces.

use clap::Args;
use dotagents_engine::{
    AbsPath, ApplyOptions, ApplyReport, DryRunSystem, LinkTask, RealSystem, System, apply_plan,
};
use owo_colors::OwoColorize;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::{CommandError, Result};
use crate::stats;

/// Link command
#[derive(Debug, Clone, Default, Args)]
pub struct LinkCommand {
    /// Replace real content at targets (it is backed up first)
    #[arg(short, long)]
    pub force: bool,

    /// Show what would be done without touching the filesystem
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

impl Command for LinkCommand {
    type Output = ApplyReport;

    fn execute(&self, context: &RuntimeContext) -> Result<ApplyReport> {
        let (report, backup_dir, conflicts) = if self.dry_run {
            let system = DryRunSystem::new();
            let outcome = link(&system, context, self.force)?;
            crate::cmd::print_dry_run(&system);
            outcome
        } else {
            link(&RealSystem, context, self.force)?
        };

        if !self.force {
            for target in &conflicts {
                println!("  {} {target}", "conflict".bright_red());
            }
        }

        println!();
        stats::print_apply_summary(&report, self.dry_run);
        stats::print_backup_location(backup_dir.as_ref(), self.dry_run);

        if report.conflicts > 0 && !self.force && !self.dry_run {
            return Err(CommandError::Unresolved {
                count: report.conflicts,
            });
        }
        Ok(report)
    }
}

fn link<S: System + ?Sized>(
    system: &S,
    context: &RuntimeContext,
    force: bool,
) -> Result<(ApplyReport, Option<AbsPath>, Vec<AbsPath>)> {
    let plan = crate::cmd::plan_links(system, context)?;
    let conflicts = plan
        .conflicts
        .iter()
        .map(|task| task.path().clone())
        .collect();

    for task in &plan.tasks {
        if !matches!(task, LinkTask::Noop { .. }) {
            tracing::debug!(label = task.label(), path = %task.path(), "Planned");
        }
    }

    let mut session = context.backup_session("link");
    let report = apply_plan(
        system,
        &plan,
        ApplyOptions {
            force,
            backup: Some(&mut session),
        },
    )?;
    let backup_dir = session.finalize(system)?;
    Ok((report, backup_dir, conflicts))
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::common::RootOptions;
    use dotagents_config::Config;
    use dotagents_core::Client;
    use std::fs;
    use tempfile::TempDir;

    fn context(home: &TempDir, clients: Vec<Client>) -> RuntimeContext {
        let options = RootOptions {
            home: Some(home.path().to_path_buf()),
            ..RootOptions::default()
        };
        let config = Config::default();
        let roots = options.resolve(&config).unwrap();
        RuntimeContext::new(config, roots, clients).unwrap()
    }

    #[test]
    fn test_link_twice_is_idempotent() {
        let home = TempDir::new().unwrap();
        let ctx = context(&home, vec![Client::Claude, Client::Codex]);

        let first = LinkCommand::default().execute(&ctx).unwrap();
        assert!(first.applied > 0);
        assert!(home.path().join(".claude/commands").is_symlink());

        let second = LinkCommand::default().execute(&ctx).unwrap();
        assert_eq!(second.applied, 0);
        assert_eq!(second.conflicts, 0);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let home = TempDir::new().unwrap();
        let ctx = context(&home, vec![Client::Claude]);

        let cmd = LinkCommand {
            force: false,
            dry_run: true,
        };
        let report = cmd.execute(&ctx).unwrap();
        assert!(report.applied > 0);
        assert!(!home.path().join(".agents").exists());
        assert!(!home.path().join(".claude").exists());
    }

    #[test]
    fn test_conflict_fails_without_force() {
        let home = TempDir::new().unwrap();
        fs::create_dir_all(home.path().join(".claude/commands")).unwrap();
        fs::write(home.path().join(".claude/commands/own.md"), "mine").unwrap();
        let ctx = context(&home, vec![Client::Claude]);

        let err = LinkCommand::default().execute(&ctx).unwrap_err();
        assert!(matches!(err, CommandError::Unresolved { count: 1 }));
        assert!(!home.path().join(".claude/commands").is_symlink());
    }

    #[test]
    fn test_force_replaces_and_backs_up() {
        let home = TempDir::new().unwrap();
        fs::create_dir_all(home.path().join(".claude/commands")).unwrap();
        fs::write(home.path().join(".claude/commands/own.md"), "mine").unwrap();
        let ctx = context(&home, vec![Client::Claude]);

        let cmd = LinkCommand {
            force: true,
            dry_run: false,
        };
        let report = cmd.execute(&ctx).unwrap();
        assert_eq!(report.conflicts, 1);
        assert!(home.path().join(".claude/commands").is_symlink());

        let sessions = dotagents_engine::list_sessions(ctx.backup_root()).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].operation, "link");
    }
}
