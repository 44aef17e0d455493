//! Per-item outcome types shared by the batch operations
//!
//! Partial failure is reported as a value: each batch returns the items that
//! succeeded, were skipped, or failed, and the caller decides how to present
//! them.

use serde::{Deserialize, Serialize};

/// Outcome of one item in a batch operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "kebab-case")]
pub enum ItemStatus {
    Succeeded,
    Skipped(String),
    Failed(String),
}

impl ItemStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// Counts of each item status in a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Breakdown {
    /// Tally the statuses of a batch.
    pub fn tally<'a>(statuses: impl IntoIterator<Item = &'a ItemStatus>) -> Self {
        statuses
            .into_iter()
            .fold(Self::default(), |mut acc, status| {
                match status {
                    ItemStatus::Succeeded => acc.succeeded += 1,
                    ItemStatus::Skipped(_) => acc.skipped += 1,
                    ItemStatus::Failed(_) => acc.failed += 1,
                }
                acc
            })
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }
}
