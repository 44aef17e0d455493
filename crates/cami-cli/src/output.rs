//! Shared output helpers

use colored::{ColoredString, Colorize};
use serde::Serialize;

use cami_core::{Breakdown, ItemStatus};

use crate::error::Result;

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Status marker for one item of a batch.
pub fn status_symbol(status: &ItemStatus) -> ColoredString {
    match status {
        ItemStatus::Succeeded => "✓".green(),
        ItemStatus::Skipped(_) => "-".yellow(),
        ItemStatus::Failed(_) => "✗".red(),
    }
}

/// One-line summary of a batch.
pub fn print_breakdown(breakdown: &Breakdown) {
    println!(
        "{} succeeded, {} skipped, {} failed",
        breakdown.succeeded.to_string().green(),
        breakdown.skipped.to_string().yellow(),
        breakdown.failed.to_string().red()
    );
}
