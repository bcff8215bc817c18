//! Logging configuration for the dotagents CLI
//!
//! Compact terminal output plus an optional debug-level log file, using tracing.

use crate::Result;
use dotagents_core::Error;
use std::path::Path;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over the level derived from `verbose`.
///
/// # Examples
/// ```ignore
/// // Warnings only
/// init(false, None)?;
///
/// // Verbose mode, also appending to a file
/// init(true, Some(Path::new("dotagents.log")))?;
/// ```
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { "debug" } else { "warn" };

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directives(level))
            .map_err(|e| Error::Config(format!("Invalid log filter: {e}")))?,
    };

    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .with_ansi(true);

    // Timestamps only matter when debugging
    let stdout_layer = if verbose {
        stdout_layer.with_filter(env_filter).boxed()
    } else {
        stdout_layer.without_time().with_filter(env_filter).boxed()
    };

    let file_layer = match log_file {
        Some(log_path) => {
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)
                .map_err(|e| Error::FileWrite {
                    path: log_path.to_path_buf(),
                    source: e,
                })?;

            let filter = EnvFilter::try_new("debug")
                .map_err(|e| Error::Config(format!("Invalid log filter: {e}")))?;

            Some(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .pretty()
                    .with_filter(filter),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize logging: {e}")))?;

    Ok(())
}

fn default_directives(level: &str) -> String {
    format!(
        "dotagents={level},dotagents_cli={level},dotagents_engine={level},dotagents_config={level}"
    )
}
