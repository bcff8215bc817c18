//! dotagents CLI library
//!
//! This library contains all the CLI logic for dotagents, making it reusable
//! for testing and integration with other tools.

pub mod cmd;
pub mod command;
pub mod common;
pub mod error;
pub mod stats;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotagents_config::Config;
use dotagents_core::{Client, Scope};
use std::path::PathBuf;

use command::Command;
use common::{RootOptions, RuntimeContext};

/// dotagents - one canonical home for agent configuration
#[derive(Parser)]
#[command(name = "dotagents")]
#[command(about = "Share one set of agent instructions, commands and skills across AI coding tools")]
#[command(version)]
#[command(long_about = "Share one set of agent instructions, commands and skills across AI coding tools

Content lives once under .agents/ (in your home directory or a project) and
every client directory (.claude, .codex, .cursor, ...) links to it.

Examples:
  • dotagents migrate --prefer claude
      → Merge existing client content into ~/.agents, then link

  • dotagents --project . link
      → Link the current project's clients to ./.agents

  • dotagents status
      → Show what is linked, pending or conflicting

  • dotagents marketplace add ./team-market
      → Install plugin commands, hooks and skills into ~/.agents")]
pub struct Cli {
    /// Scope to reconcile (global or project)
    #[arg(long, env = "DOTAGENTS_SCOPE", value_name = "SCOPE")]
    pub scope: Option<Scope>,

    /// Project root for project scope (implies --scope project)
    #[arg(long, env = "DOTAGENTS_PROJECT", value_name = "DIR")]
    pub project: Option<PathBuf>,

    /// Home directory (defaults to $HOME)
    #[arg(long, env = "DOTAGENTS_HOME", value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Active clients, comma-separated (defaults to the config, then all)
    #[arg(long, env = "DOTAGENTS_CLIENTS", value_delimiter = ',', value_name = "CLIENTS")]
    pub clients: Vec<Client>,

    /// Path to the config file
    #[arg(long, env = "DOTAGENTS_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output (shows DEBUG level logs)
    #[arg(short, long)]
    pub verbose: bool,

    /// Write logs to a file (useful for debugging)
    #[arg(long, env = "DOTAGENTS_LOG_FILE", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for the dotagents CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Link every active client to the canonical root
    Link(cmd::link::LinkCommand),

    /// Show the link plan without applying it
    Status(cmd::status::StatusCommand),

    /// Merge existing client content into the canonical root, then link
    Migrate(cmd::migrate::MigrateCommand),

    /// Manage skills in the canonical root
    #[command(subcommand)]
    Skill(SkillCommands),

    /// Install plugins from a local marketplace
    #[command(subcommand)]
    Marketplace(MarketplaceCommands),

    /// Manage backups taken before content was replaced
    #[command(subcommand)]
    Backup(BackupCommands),
}

/// Skill subcommands
#[derive(Subcommand)]
pub enum SkillCommands {
    /// Validate and install skills from a local directory
    Add(cmd::skill::AddCommand),
}

/// Marketplace subcommands
#[derive(Subcommand)]
pub enum MarketplaceCommands {
    /// Copy plugin commands, hooks and skills into the canonical root
    Add(cmd::marketplace::AddCommand),
}

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// List backup sessions, newest first
    List,

    /// Restore every path captured by a session
    Restore {
        /// Session id, as shown by `backup list`
        #[arg(required = true)]
        id: String,
    },
}

/// Load the config file named on the command line, or the default one
fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => match dotagents_config::default_config_file() {
            Some(path) => Config::load_or_default(&path)
                .with_context(|| format!("Failed to load config from {}", path.display())),
            None => Ok(Config::default()),
        },
    }
}

/// Active clients: the command line wins over the config
fn active_clients(cli_clients: &[Client], config: &Config) -> Vec<Client> {
    if cli_clients.is_empty() {
        config.active_clients()
    } else {
        Client::ALL
            .into_iter()
            .filter(|c| cli_clients.contains(c))
            .collect()
    }
}

/// Execute the command based on the command type
fn execute_command(command: Commands, context: &RuntimeContext) -> Result<()> {
    match command {
        Commands::Link(link_cmd) => {
            link_cmd.execute(context)?;
        }
        Commands::Status(status_cmd) => {
            status_cmd.execute(context)?;
        }
        Commands::Migrate(migrate_cmd) => {
            migrate_cmd.execute(context)?;
        }
        Commands::Skill(SkillCommands::Add(add_cmd)) => {
            add_cmd.execute(context)?;
        }
        Commands::Marketplace(MarketplaceCommands::Add(add_cmd)) => {
            add_cmd.execute(context)?;
        }
        Commands::Backup(backup_cmd) => match backup_cmd {
            BackupCommands::List => {
                cmd::backup::run_list(context)?;
            }
            BackupCommands::Restore { id } => {
                cmd::backup::run_restore(context, &id)?;
            }
        },
    }
    Ok(())
}

/// Main entry point for the CLI application
pub fn run(cli: Cli) -> Result<()> {
    dotagents_config::logging::init(cli.verbose, cli.log_file.as_deref())?;

    let config = load_config(cli.config.as_ref())?;
    let clients = active_clients(&cli.clients, &config);

    let options = RootOptions {
        scope: cli.scope,
        home: cli.home,
        project: cli.project,
    };
    let roots = options.resolve(&config)?;
    tracing::debug!(
        scope = %roots.scope,
        canonical = %roots.canonical_root,
        clients = clients.len(),
        "Resolved runtime context"
    );

    let context = RuntimeContext::new(config, roots, clients)?;
    execute_command(cli.command, &context)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::try_parse_from([
            "dotagents",
            "--scope",
            "project",
            "--clients",
            "codex,claude",
            "link",
            "--force",
        ])
        .unwrap();

        assert_eq!(cli.scope, Some(Scope::Project));
        assert_eq!(cli.clients, vec![Client::Codex, Client::Claude]);
        assert!(matches!(cli.command, Commands::Link(ref l) if l.force && !l.dry_run));
    }

    #[test]
    fn test_cli_parses_migrate_preferences() {
        let cli =
            Cli::try_parse_from(["dotagents", "migrate", "--prefer", "factory,claude", "-n"])
                .unwrap();
        let Commands::Migrate(migrate) = cli.command else {
            panic!("expected migrate");
        };
        assert_eq!(migrate.prefer, vec![Client::Factory, Client::Claude]);
        assert!(migrate.dry_run);
        assert!(!migrate.no_force_links);
    }

    #[test]
    fn test_cli_parses_backup_restore() {
        let cli = Cli::try_parse_from(["dotagents", "backup", "restore", "abc"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Backup(BackupCommands::Restore { ref id }) if id == "abc"
        ));
    }

    #[test]
    fn test_cli_parses_marketplace_add() {
        let cli = Cli::try_parse_from([
            "dotagents",
            "marketplace",
            "add",
            "./market",
            "--plugin",
            "review-kit,docs",
        ])
        .unwrap();
        let Commands::Marketplace(MarketplaceCommands::Add(add)) = cli.command else {
            panic!("expected marketplace add");
        };
        assert_eq!(add.path, PathBuf::from("./market"));
        assert_eq!(add.plugin, vec!["review-kit", "docs"]);
        assert!(!add.force);
    }

    #[test]
    fn test_cli_rejects_unknown_client() {
        assert!(Cli::try_parse_from(["dotagents", "--clients", "vim", "status"]).is_err());
    }

    #[test]
    fn test_active_clients_prefers_command_line() {
        let mut config = Config::default();
        config.general.clients = Some(vec![Client::Cursor]);

        assert_eq!(active_clients(&[], &config), vec![Client::Cursor]);
        assert_eq!(
            active_clients(&[Client::Windsurf, Client::Claude], &config),
            vec![Client::Claude, Client::Windsurf]
        );
    }
}
