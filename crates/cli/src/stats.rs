//! Summaries printed after link, migrate and skill operations

use dotagents_engine::{AbsPath, ApplyReport, MigrationReport};
use owo_colors::OwoColorize;

/// Print the outcome of a link apply
pub fn print_apply_summary(report: &ApplyReport, dry_run: bool) {
    let verb = if dry_run { "would be applied" } else { "applied" };
    if report.conflicts > 0 {
        println!(
            "{} {} {} | {} {} unchanged | {} {} conflicts",
            "●".bright_green(),
            report.applied.to_string().bright_green().bold(),
            verb,
            "●".dimmed(),
            report.skipped,
            "●".bright_red(),
            report.conflicts.to_string().bright_red().bold(),
        );
    } else {
        println!(
            "{} {} {} | {} {} unchanged",
            "●".bright_green(),
            report.applied.to_string().bright_green().bold(),
            verb,
            "●".dimmed(),
            report.skipped,
        );
    }
}

/// Print the outcome of a migration
pub fn print_migration_summary(report: &MigrationReport, dry_run: bool) {
    let verb = if dry_run { "would be migrated" } else { "migrated" };
    println!(
        "{} {} {} | {} {} skipped",
        "●".bright_green(),
        report.copied.to_string().bright_green().bold(),
        verb,
        "●".yellow(),
        report.skipped,
    );
    print_apply_summary(&report.links, dry_run);
}

/// Print where replaced content was saved
///
/// A dry run never creates the session directory, so it is reported as the
/// place content would go.
pub fn print_backup_location(dir: Option<&AbsPath>, dry_run: bool) {
    if let Some(dir) = dir {
        println!("{}", format_backup_location(dir, dry_run));
    }
}

fn format_backup_location(dir: &AbsPath, dry_run: bool) -> String {
    let label = if dry_run { "would back up to:" } else { "backup:" };
    format!("  {} {}", label.dimmed(), dir.to_string().dimmed())
}

/// Warn about migration conflicts left without a selection
///
/// With forced links the client content in those slots is replaced and
/// survives only in the backup.
pub fn print_skipped_conflicts(skipped: &[&AbsPath], force_links: bool) {
    if skipped.is_empty() {
        return;
    }
    let fate = if force_links {
        "client content there is kept only in the backup"
    } else {
        "client content there was left in place"
    };
    println!(
        "{} {} conflicts skipped; {fate}",
        "warning:".yellow().bold(),
        skipped.len()
    );
    for path in skipped {
        println!("  {} {path}", "skipped".yellow());
    }
    println!(
        "  {}",
        "rerun with --prefer <CLIENT> to choose which content wins".dimmed()
    );
}
