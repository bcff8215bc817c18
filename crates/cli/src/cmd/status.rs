//! Status command implementation
//!
//! Prints the link plan without applying it.

use clap::Args;
use dotagents_engine::{LinkPlan, LinkTask, RealSystem};
use owo_colors::OwoColorize;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;

/// Status command
#[derive(Debug, Clone, Default, Args)]
pub struct StatusCommand {
    /// Also list targets that are already linked
    #[arg(short, long)]
    pub all: bool,
}

impl Command for StatusCommand {
    type Output = LinkPlan;

    fn execute(&self, context: &RuntimeContext) -> Result<LinkPlan> {
        let plan = crate::cmd::plan_links(&RealSystem, context)?;

        println!(
            "{} {} ({})",
            "scope".dimmed(),
            context.roots.scope.bold(),
            context.roots.canonical_root
        );

        for task in &plan.tasks {
            if !self.all && matches!(task, LinkTask::Noop { .. }) {
                continue;
            }
            println!("{}", format_task(task));
        }

        let ok = plan
            .tasks
            .iter()
            .filter(|task| matches!(task, LinkTask::Noop { .. }))
            .count();
        if plan.is_clean() {
            println!("{} all {ok} targets linked", "●".bright_green());
        } else {
            println!(
                "{} {ok} linked | {} {} pending | {} {} conflicts",
                "●".bright_green(),
                "●".yellow(),
                plan.tasks.len() - ok - plan.conflicts.len(),
                "●".bright_red(),
                plan.conflicts.len(),
            );
        }
        Ok(plan)
    }
}

fn format_task(task: &LinkTask) -> String {
    let label = format!("{:<8}", task.label());
    let label = match task {
        LinkTask::Noop { .. } => label.green().to_string(),
        LinkTask::Conflict { .. } => label.bright_red().to_string(),
        LinkTask::EnsureSource { .. } => label.cyan().to_string(),
        LinkTask::Link { .. } => label.yellow().to_string(),
    };
    match task {
        LinkTask::EnsureSource { path, kind } => {
            format!("  {label} {path} {}", format!("({})", kind.as_str()).dimmed())
        }
        LinkTask::Link { source, target, .. }
        | LinkTask::Noop { source, target }
        | LinkTask::Conflict { source, target, .. } => {
            format!("  {label} {target} {} {}", "->".dimmed(), source.dimmed())
        }
    }
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::cmd::link::LinkCommand;
    use crate::common::RootOptions;
    use dotagents_config::Config;
    use dotagents_core::Client;
    use tempfile::TempDir;

    fn context(home: &TempDir) -> RuntimeContext {
        let options = RootOptions {
            home: Some(home.path().to_path_buf()),
            ..RootOptions::default()
        };
        let config = Config::default();
        let roots = options.resolve(&config).unwrap();
        RuntimeContext::new(config, roots, vec![Client::Claude]).unwrap()
    }

    #[test]
    fn test_status_is_read_only() {
        let home = TempDir::new().unwrap();
        let ctx = context(&home);

        let plan = StatusCommand::default().execute(&ctx).unwrap();
        assert!(!plan.is_clean());
        assert!(!home.path().join(".agents").exists());
    }

    #[test]
    fn test_status_clean_after_link() {
        let home = TempDir::new().unwrap();
        let ctx = context(&home);

        LinkCommand::default().execute(&ctx).unwrap();
        let plan = StatusCommand { all: true }.execute(&ctx).unwrap();
        assert!(plan.is_clean());
        assert!(plan.conflicts.is_empty());
    }

    #[test]
    fn test_format_task_labels() {
        let source = dotagents_engine::AbsPath::new("/h/.agents/commands".into()).unwrap();
        let target = dotagents_engine::AbsPath::new("/h/.claude/commands".into()).unwrap();
        let line = format_task(&LinkTask::Conflict {
            source,
            target,
            kind: dotagents_engine::SourceKind::Dir,
        });
        assert!(line.contains("conflict"));
        assert!(line.contains("/h/.claude/commands"));
    }
}
