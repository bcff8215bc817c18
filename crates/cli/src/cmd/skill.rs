//! Skill command implementation
//!
//! Installs local skill bundles into the canonical `skills` directory, where
//! every client's skills link already points.

use clap::Args;
use dotagents_engine::skills::InstallReport;
use dotagents_engine::{FrontmatterValidator, RealSystem, install_local_skills};
use owo_colors::OwoColorize;
use std::path::PathBuf;

use crate::command::Command;
use crate::common::{RuntimeContext, absolutize};
use crate::error::{CommandError, Result};
use crate::stats;

/// Add skills from a local directory
#[derive(Debug, Clone, Args)]
pub struct AddCommand {
    /// A skill directory, or a directory holding several skills
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Replace skills that are already installed (they are backed up first)
    #[arg(short, long)]
    pub force: bool,
}

impl Command for AddCommand {
    type Output = InstallReport;

    fn execute(&self, context: &RuntimeContext) -> Result<InstallReport> {
        let dir = absolutize(&self.dir)?;
        if !dir.is_dir() {
            return Err(CommandError::PathNotFound(dir));
        }

        let system = RealSystem;
        let mut session = context.backup_session("skill-add");
        let report = install_local_skills(
            &system,
            &FrontmatterValidator,
            &dir,
            &context.roots.canonical_root,
            self.force,
            Some(&mut session),
        )?;
        let backup_dir = session.finalize(&system)?;

        for name in &report.installed {
            println!("  {} {name}", "installed".green());
        }
        for name in &report.skipped {
            println!(
                "  {} {name} {}",
                "exists".yellow(),
                "(use --force to replace)".dimmed()
            );
        }
        stats::print_backup_location(backup_dir.as_ref(), false);
        Ok(report)
    }
}
