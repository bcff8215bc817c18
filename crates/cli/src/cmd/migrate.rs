//! Migrate command implementation
//!
//! Copies existing client content into the canonical root and links every
//! client back to it. Conflicting contents are settled by `--prefer`; a
//! conflict none of the preferred clients holds is skipped.

use clap::Args;
use dotagents_core::Client;
use dotagents_engine::{
    AbsPath, DryRunSystem, FrontmatterValidator, MigrationOptions, MigrationPlan,
    MigrationReport, RealSystem, Selection, Selections, System, apply_migration, scan_migration,
};
use owo_colors::OwoColorize;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;
use crate::stats;

/// Migrate command
#[derive(Debug, Clone, Default, Args)]
pub struct MigrateCommand {
    /// Clients whose content wins a conflict, in order of preference
    #[arg(long, value_delimiter = ',', value_name = "CLIENT")]
    pub prefer: Vec<Client>,

    /// Show what would be done without touching the filesystem
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Leave client content that conflicts with the canonical root in place
    #[arg(long)]
    pub no_force_links: bool,
}

impl Command for MigrateCommand {
    type Output = MigrationReport;

    fn execute(&self, context: &RuntimeContext) -> Result<MigrationReport> {
        if self.dry_run {
            let system = DryRunSystem::new();
            let report = self.migrate(&system, context)?;
            crate::cmd::print_dry_run(&system);
            Ok(report)
        } else {
            self.migrate(&RealSystem, context)
        }
    }
}

impl MigrateCommand {
    fn migrate<S: System + ?Sized>(
        &self,
        system: &S,
        context: &RuntimeContext,
    ) -> Result<MigrationReport> {
        let plan = scan_migration(system, &context.roots, &context.clients, &FrontmatterValidator)?;
        print_plan(&plan);

        let selections = select_by_preference(&plan, &self.prefer);
        let mut session = context.backup_session("migrate");
        let mut report = apply_migration(
            system,
            &context.roots,
            &context.clients,
            &plan,
            &selections,
            MigrationOptions {
                force_links: !self.no_force_links,
                backup: Some(&mut session),
            },
        )?;
        report.backup_dir = session.finalize(system)?;

        println!();
        stats::print_migration_summary(&report, self.dry_run);
        stats::print_skipped_conflicts(
            &skipped_conflicts(&plan, &selections),
            !self.no_force_links,
        );
        stats::print_backup_location(report.backup_dir.as_ref(), self.dry_run);
        Ok(report)
    }
}

/// Pick, for each conflict, the candidate held by the first preferred client
///
/// Candidates with identical content share one merged label (`Claude+Factory`),
/// so any client in the label matches.
pub fn select_by_preference(plan: &MigrationPlan, prefer: &[Client]) -> Selections {
    plan.conflicts
        .iter()
        .map(|conflict| {
            let chosen = prefer.iter().find_map(|client| {
                conflict.candidates.iter().position(|candidate| {
                    candidate
                        .label
                        .split('+')
                        .any(|label| label == client.display_name())
                })
            });
            let selection = chosen.map_or(Selection::Skip, Selection::Candidate);
            (conflict.target_path.clone(), selection)
        })
        .collect()
}

/// Conflict slots the selections leave untouched
pub fn skipped_conflicts<'a>(plan: &'a MigrationPlan, selections: &Selections) -> Vec<&'a AbsPath> {
    plan.conflicts
        .iter()
        .filter(|conflict| {
            matches!(
                selections.get(&conflict.target_path),
                None | Some(Selection::Skip)
            )
        })
        .map(|conflict| &conflict.target_path)
        .collect()
}

fn print_plan(plan: &MigrationPlan) {
    if plan.is_empty() {
        println!("{}", "Nothing to migrate".dimmed());
        return;
    }
    for item in &plan.auto {
        println!(
            "  {:<9} {} {} {}",
            "copy".green(),
            item.target_path,
            "<-".dimmed(),
            item.candidate.label.dimmed()
        );
    }
    for conflict in &plan.conflicts {
        println!(
            "  {:<9} {} [{}]",
            "conflict".bright_red(),
            conflict.target_path,
            conflict.category
        );
        for candidate in &conflict.candidates {
            println!(
                "      {} {} {}",
                candidate.label.bold(),
                candidate.source_path.to_string().dimmed(),
                candidate.preview.lines().next().unwrap_or_default().dimmed()
            );
        }
    }
}
