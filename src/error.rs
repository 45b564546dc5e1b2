//! Unified error types for record-merge.
//!
//! Structural errors (a field name the record does not declare, a differing
//! field with no applicable rule) fail fast through these variants. Data-level
//! ambiguity — a tie between two meaningful values — is never an error: it
//! flows through the return path as [`Resolution::Unresolved`] so that one
//! contested field cannot abort resolution of the rest.
//!
//! [`Resolution::Unresolved`]: crate::diff::Resolution

use thiserror::Error;

/// Main error type for record-merge operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MergeError {
    /// A field name that is not part of the record's declared schema.
    #[error("unknown field `{field}` for {record}")]
    UnknownField {
        record: &'static str,
        field: String,
    },

    /// A field that exists on the record but is not part of this diff's
    /// working set (its values do not differ across the compared sides).
    #[error("field `{field}` is not part of this diff")]
    FieldNotInDiff { field: String },

    /// A differing field reached preference resolution with neither an
    /// explicit rule nor a default rule registered.
    #[error("cannot determine which value is preferred for `{field}`: {values}")]
    MissingRule { field: String, values: String },

    /// A rule was registered with a shape that cannot accept the number of
    /// values under comparison (e.g. a binary rule in an N-way merge).
    #[error("rule for `{field}` expects {expected} values but {actual} were compared")]
    RuleArity {
        field: String,
        expected: usize,
        actual: usize,
    },

    /// A value of the wrong type was written to a typed record field.
    #[error("cannot write {actual} into `{field}` (expected {expected})")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// A merge was constructed without any target records.
    #[error("merge requires at least one target record")]
    NoTargets,
}

impl MergeError {
    /// Create an unknown-field error.
    pub fn unknown_field(record: &'static str, field: impl Into<String>) -> Self {
        Self::UnknownField {
            record,
            field: field.into(),
        }
    }

    /// Create a field-not-in-diff error.
    pub fn not_in_diff(field: impl Into<String>) -> Self {
        Self::FieldNotInDiff {
            field: field.into(),
        }
    }

    /// Create a missing-rule error, formatting the contested values for the
    /// message.
    pub fn missing_rule(field: impl Into<String>, values: impl IntoIterator<Item = String>) -> Self {
        Self::MissingRule {
            field: field.into(),
            values: values.into_iter().collect::<Vec<_>>().join(" -> "),
        }
    }

    /// Create a type-mismatch error for a record setter.
    pub fn type_mismatch(
        field: impl Into<String>,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected,
            actual,
        }
    }
}

/// Convenient Result type for record-merge operations.
pub type Result<T> = std::result::Result<T, MergeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_field_display() {
        let err = MergeError::unknown_field("calendar_event", "venue");
        assert_eq!(err.to_string(), "unknown field `venue` for calendar_event");
    }

    #[test]
    fn test_missing_rule_display() {
        let err =
            MergeError::missing_rule("time", ["11:00 AM".to_string(), "12:00 PM".to_string()]);
        assert!(err.to_string().contains("11:00 AM -> 12:00 PM"));
    }

    #[test]
    fn test_arity_display() {
        let err = MergeError::RuleArity {
            field: "day".into(),
            expected: 2,
            actual: 4,
        };
        assert!(err.to_string().contains("expects 2 values"));
    }
}
