//! Interactive prompts for CLI commands
//!
//! Uses dialoguer for terminal-based selection.

use dialoguer::{Confirm, MultiSelect};

use cami_core::UntrackedSource;

use crate::error::Result;

/// Ask which untracked sources to register. Returns the selected names.
pub fn select_untracked(untracked: &[UntrackedSource]) -> Result<Vec<String>> {
    let items: Vec<String> = untracked
        .iter()
        .map(|u| format!("{} ({} agents)", u.name, u.agent_count))
        .collect();

    let selected = MultiSelect::new()
        .with_prompt("Register which sources? (space to toggle, enter to confirm)")
        .items(&items)
        .defaults(&vec![true; items.len()])
        .interact()?;

    Ok(selected.into_iter().map(|i| untracked[i].name.clone()).collect())
}

/// Yes/no confirmation defaulting to no.
pub fn confirm(prompt: &str) -> Result<bool> {
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}
