//! Pending changes and save outcomes.
//!
//! The dirty-tracking state of every key can be inspected without touching
//! the disk: [`Database::pending_changes`](crate::Database::pending_changes)
//! lists what the next save would do, and a save reports what it did.

use crate::key::KeyId;

/// The kind of work a save has to do for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// The key has no identifier yet; it gets one and its first write.
    Create,
    /// The key is dirty; its record file is rewritten.
    Update,
    /// The key is flagged for removal; its record file is deleted.
    Delete,
}

/// A change that the next save will apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChange {
    /// Key name at the time of inspection.
    pub name: String,
    /// Identifier, if already assigned.
    pub id: Option<KeyId>,
    /// What the save will do.
    pub kind: ChangeKind,
}

/// What saving a single key did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The record file was written.
    Written,
    /// The record file was deleted (if present) and the key excised.
    Deleted,
    /// Nothing needed writing.
    Unchanged,
}

/// Counts of what a database save did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Record files written.
    pub written: usize,
    /// Keys removed.
    pub deleted: usize,
    /// Keys left untouched.
    pub unchanged: usize,
}

impl SaveReport {
    /// Adds one key outcome to the counts.
    pub fn record(&mut self, outcome: SaveOutcome) {
        match outcome {
            SaveOutcome::Written => self.written += 1,
            SaveOutcome::Deleted => self.deleted += 1,
            SaveOutcome::Unchanged => self.unchanged += 1,
        }
    }

    /// Returns true if the save wrote or deleted any record file.
    #[must_use]
    pub fn touched_records(&self) -> bool {
        self.written + self.deleted > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_outcomes() {
        let mut report = SaveReport::default();
        assert!(!report.touched_records());

        report.record(SaveOutcome::Unchanged);
        assert!(!report.touched_records());

        report.record(SaveOutcome::Written);
        report.record(SaveOutcome::Deleted);
        report.record(SaveOutcome::Written);
        assert_eq!(
            report,
            SaveReport {
                written: 2,
                deleted: 1,
                unchanged: 1,
            }
        );
        assert!(report.touched_records());
    }
}
