//! CLI command implementations

pub mod backup;
pub mod link;
pub mod marketplace;
pub mod migrate;
pub mod skill;
pub mod status;

use dotagents_engine::{
    DryRunSystem, LinkPlan, Result, System, build_link_plan, build_mappings, detect_overrides,
};
use owo_colors::OwoColorize;

use crate::common::RuntimeContext;

/// Build the link plan for the context's scope and active clients
pub(crate) fn plan_links<S: System + ?Sized>(
    system: &S,
    context: &RuntimeContext,
) -> Result<LinkPlan> {
    let overrides = detect_overrides(system, &context.roots)?;
    let mappings = build_mappings(&context.roots, &context.clients, overrides);
    build_link_plan(system, &mappings)
}

/// Print the operations a dry run recorded
pub(crate) fn print_dry_run(system: &DryRunSystem) {
    let operations = system.operations();
    if operations.is_empty() {
        println!("{}", "Nothing to do".dimmed());
        return;
    }
    for op in operations {
        println!("  {} {op}", "would".dimmed());
    }
}
