//! Result types for page update operations.

use crate::marker::ContentMarker;
use crate::types::Page;

/// What happened to one source unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStatus {
    /// Rendered and included in the write.
    Prepared,
    /// Its marker is already on the page (or earlier in this run).
    AlreadyPresent,
    /// Only whitespace; skipped.
    Empty,
}

/// Per-unit line of a run report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitReport {
    /// Source file name.
    pub file_name: String,
    /// Marker of the content, absent for empty units.
    pub marker: Option<ContentMarker>,
    /// Outcome.
    pub status: UnitStatus,
}

/// Result of an update run.
#[derive(Debug)]
pub struct UpdateResult {
    /// Page as returned by the write, `None` when there was nothing to add.
    pub page: Option<Page>,
    /// URL to view the page.
    pub url: String,
    /// Version the run started from.
    pub previous_version: u32,
    /// Per-unit outcomes in input order.
    pub units: Vec<UnitReport>,
}

impl UpdateResult {
    /// Whether the page was written.
    #[must_use]
    pub fn is_updated(&self) -> bool {
        self.page.is_some()
    }

    /// Number of sections inserted.
    #[must_use]
    pub fn prepared_count(&self) -> usize {
        count(&self.units, UnitStatus::Prepared)
    }
}

/// Result of a dry-run (no changes made).
#[derive(Debug)]
pub struct DryRunResult {
    /// Body the page would get.
    pub html: String,
    /// Current page title.
    pub current_title: String,
    /// Current page version.
    pub current_version: u32,
    /// Per-unit outcomes in input order.
    pub units: Vec<UnitReport>,
    /// URL to view the page.
    pub url: String,
}

impl DryRunResult {
    /// Whether an update would write anything.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.prepared_count() > 0
    }

    #[must_use]
    pub fn prepared_count(&self) -> usize {
        count(&self.units, UnitStatus::Prepared)
    }
}

fn count(units: &[UnitReport], status: UnitStatus) -> usize {
    units.iter().filter(|u| u.status == status).count()
}
