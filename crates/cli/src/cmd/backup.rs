//! Backup command implementation
//!
//! Lists finalized backup sessions and restores one by id.

use dotagents_engine::{BackupManifest, RealSystem, list_sessions, restore};
use owo_colors::OwoColorize;

use crate::common::RuntimeContext;
use crate::error::Result;

/// List backup sessions, newest first
pub fn run_list(context: &RuntimeContext) -> Result<Vec<BackupManifest>> {
    let sessions = list_sessions(context.backup_root())?;
    if sessions.is_empty() {
        println!(
            "{} {}",
            "No backups in".dimmed(),
            context.backup_root().to_string().dimmed()
        );
        return Ok(sessions);
    }

    for session in &sessions {
        println!(
            "{}  {:<8} {:<10} {} {}",
            session.id.bold(),
            session.scope,
            session.operation,
            session.created_at.format("%Y-%m-%d %H:%M:%S UTC").dimmed(),
            format!("({} entries)", session.entries.len()).dimmed(),
        );
    }
    Ok(sessions)
}

/// Put every path captured by a session back in place
pub fn run_restore(context: &RuntimeContext, id: &str) -> Result<usize> {
    let restored = restore(&RealSystem, context.backup_root(), id)?;
    println!(
        "{} {} restored from {}",
        "●".bright_green(),
        restored.to_string().bright_green().bold(),
        id
    );
    Ok(restored)
}
