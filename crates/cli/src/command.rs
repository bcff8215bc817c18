//! Command trait for the dotagents CLI
//!
//! Every subcommand that works on resolved roots implements [`Command`], which
//! keeps execution uniform and lets tests drive commands without `clap`.

use crate::common::RuntimeContext;
use crate::error::Result;

/// Trait for all dotagents commands
///
/// The `execute` method receives a [`RuntimeContext`] holding the loaded
/// configuration, the resolved roots and the active clients.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Debug, Args)]
/// pub struct MyCommand {
///     #[arg(short, long)]
///     pub force: bool,
/// }
///
/// impl Command for MyCommand {
///     type Output = ();
///
///     fn execute(&self, context: &RuntimeContext) -> Result<()> {
///         println!("{}", context.roots.canonical_root);
///         Ok(())
///     }
/// }
/// ```
pub trait Command {
    /// The type returned by this command
    ///
    /// Returning the engine report lets callers and tests inspect what
    /// happened after the summary was printed.
    type Output;

    /// Execute the command with the given runtime context
    ///
    /// # Errors
    ///
    /// Returns a `CommandError` if the command fails to execute.
    fn execute(&self, context: &RuntimeContext) -> Result<Self::Output>;
}
