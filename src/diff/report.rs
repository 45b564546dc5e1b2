//! Serializable accounts of a resolve/apply cycle.
//!
//! A [`MergeReport`] is a point-in-time snapshot of a change set or merge:
//! what was proposed, what resolved, what was dropped, and what still needs
//! a human decision. It exists for audit logs and review UIs; the engine
//! itself never reads one back.

use super::change_set::{FieldEntry, Resolution};
use crate::record::Value;
use indexmap::IndexMap;
use serde::Serialize;

/// The outcome of one field, as reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChangeOutcome {
    /// Preferences have not been resolved yet.
    Pending,
    /// A target value will be applied as-is.
    Applied { value: Value },
    /// A conflict rule produced a new value.
    Resolved { value: Value },
    /// The conflict stands; caller judgment required.
    Unresolved { candidates: Vec<Value> },
}

/// One working-set field in a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub field: String,
    pub baseline: Value,
    pub proposed: Vec<Value>,
    pub outcome: ChangeOutcome,
}

/// A full account of one change set or merge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[must_use]
pub struct MergeReport {
    /// Record type under merge.
    pub record: String,
    /// Remaining working-set fields, in declaration order.
    pub changes: Vec<FieldChange>,
    /// Fields dropped because the baseline value won.
    pub eliminated: Vec<String>,
    /// Number of fields still requiring caller judgment.
    pub unresolved_count: usize,
}

impl MergeReport {
    pub(crate) fn from_entries(
        record: &str,
        entries: &IndexMap<String, FieldEntry>,
        eliminated: &[String],
    ) -> Self {
        let changes: Vec<FieldChange> = entries
            .iter()
            .map(|(field, entry)| FieldChange {
                field: field.clone(),
                baseline: entry.baseline.clone(),
                proposed: entry.targets.clone(),
                outcome: match &entry.resolution {
                    None => ChangeOutcome::Pending,
                    Some(Resolution::Target { value }) => ChangeOutcome::Applied {
                        value: value.clone(),
                    },
                    Some(Resolution::Resolved { resolution, .. }) => ChangeOutcome::Resolved {
                        value: resolution.clone(),
                    },
                    Some(Resolution::Unresolved { candidates }) => ChangeOutcome::Unresolved {
                        candidates: candidates.clone(),
                    },
                },
            })
            .collect();
        let unresolved_count = changes
            .iter()
            .filter(|c| matches!(c.outcome, ChangeOutcome::Unresolved { .. }))
            .count();
        Self {
            record: record.to_string(),
            changes,
            eliminated: eliminated.to_vec(),
            unresolved_count,
        }
    }

    /// True when nothing remains to apply and nothing was contested.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }

    /// True when every remaining change is safe to persist.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.unresolved_count == 0
            && self
                .changes
                .iter()
                .all(|c| !matches!(c.outcome, ChangeOutcome::Pending))
    }
}
