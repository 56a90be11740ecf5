//! Action implementations (host modifications)
//!
//! Each function probes the current state first and only mutates when the
//! goal is not already met. In dry-run mode nothing is mutated but the
//! returned [`Change`] still says whether a change would have been made.

pub mod files;
pub mod process;
pub mod services;
pub mod units;

pub use files::{backup_file, pin_packages, remove_files, rename_file, write_file};
pub use process::{kill_processes, ProcessMatcher};
pub use services::{disable_service, mask_service, start_service, stop_service};
pub use units::install_unit;

/// What an action did (or would do) to the host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Change {
    pub changed: bool,
    pub details: Vec<String>,
}

impl Change {
    pub fn unchanged(detail: impl Into<String>) -> Self {
        Self {
            changed: false,
            details: vec![detail.into()],
        }
    }

    pub fn changed(detail: impl Into<String>) -> Self {
        Self {
            changed: true,
            details: vec![detail.into()],
        }
    }

    /// Fold another change into this one
    pub fn merge(mut self, other: Change) -> Self {
        self.changed |= other.changed;
        self.details.extend(other.details);
        self
    }
}
