//! Marketplace command implementation
//!
//! Installs plugin commands, hooks and skills from a local marketplace
//! directory into the canonical root.

use clap::Args;
use dotagents_engine::skills::InstallReport;
use dotagents_engine::{
    FrontmatterValidator, MarketplaceReport, RealSystem, install_marketplace, load_marketplace,
};
use owo_colors::OwoColorize;
use std::path::PathBuf;

use crate::command::Command;
use crate::common::{RuntimeContext, absolutize};
use crate::error::{CommandError, Result};
use crate::stats;

/// Add plugins from a local marketplace
#[derive(Debug, Clone, Args)]
pub struct AddCommand {
    /// Marketplace directory, or its `marketplace.json`
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Plugins to install, comma-separated (defaults to all)
    #[arg(short, long, value_delimiter = ',', value_name = "PLUGIN")]
    pub plugin: Vec<String>,

    /// Replace items that are already installed (they are backed up first)
    #[arg(short, long)]
    pub force: bool,
}

impl Command for AddCommand {
    type Output = MarketplaceReport;

    fn execute(&self, context: &RuntimeContext) -> Result<MarketplaceReport> {
        let path = absolutize(&self.path)?;
        if !path.exists() {
            return Err(CommandError::PathNotFound(path));
        }

        let marketplace = load_marketplace(&path)?;
        let system = RealSystem;
        let mut session = context.backup_session("marketplace-add");
        let report = install_marketplace(
            &system,
            &FrontmatterValidator,
            &marketplace,
            &self.plugin,
            &context.roots.canonical_root,
            self.force,
            Some(&mut session),
        )?;
        let backup_dir = session.finalize(&system)?;

        print_items("command", &report.commands);
        print_items("hook", &report.hooks);
        print_items("skill", &report.skills);
        for name in &report.unsupported {
            println!(
                "  {} {name} {}",
                "remote".yellow(),
                "(only local plugin sources are installed)".dimmed()
            );
        }
        stats::print_backup_location(backup_dir.as_ref(), false);
        Ok(report)
    }
}

fn print_items(kind: &str, report: &InstallReport) {
    for name in &report.installed {
        println!("  {} {kind} {name}", "installed".green());
    }
    for name in &report.skipped {
        println!(
            "  {} {kind} {name} {}",
            "exists".yellow(),
            "(use --force to replace)".dimmed()
        );
    }
}
