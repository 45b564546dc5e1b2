//! Two-sided field diff.

use super::preference::Preference;
use super::rules::{map_to_sides, Rule, RuleOutcome, RuleSet, SidedOutcome};
use crate::error::{MergeError, Result};
use crate::record::{Record, Value};
use indexmap::IndexMap;

/// The set of fields whose values differ between two records.
///
/// The working set is computed once at construction and iterates in field
/// declaration order. Primary-key fields are excluded unless the diff is
/// built with [`ModelDiff::including_pk`].
///
/// Reading a side's value ([`get_left`](ModelDiff::get_left) /
/// [`get_right`](ModelDiff::get_right)) only requires the field to exist on
/// the record — equal fields read fine and return the shared value. Asking
/// for a *preference* ([`get_preferred`](ModelDiff::get_preferred)) is only
/// meaningful for differing fields and requires an applicable rule.
pub struct ModelDiff<'a, R: Record> {
    left: &'a R,
    right: &'a R,
    entries: IndexMap<String, (Value, Value)>,
    rules: RuleSet,
}

impl<'a, R: Record> ModelDiff<'a, R> {
    /// Diff two records, excluding primary-key fields.
    pub fn new(left: &'a R, right: &'a R) -> Self {
        Self::build(left, right, false)
    }

    /// Diff two records, including primary-key fields in the working set.
    pub fn including_pk(left: &'a R, right: &'a R) -> Self {
        Self::build(left, right, true)
    }

    fn build(left: &'a R, right: &'a R, include_pk: bool) -> Self {
        let entries = left.compare(right, include_pk);
        tracing::trace!(
            record = left.record_name(),
            differing = entries.len(),
            include_pk,
            "computed diff working set"
        );
        Self {
            left,
            right,
            entries,
            rules: RuleSet::new(),
        }
    }

    /// Register a preference rule for one field.
    #[must_use]
    pub fn with_rule(mut self, field: impl Into<String>, rule: Rule) -> Self {
        self.rules.insert(field, rule);
        self
    }

    /// Register the fallback rule for fields without an explicit entry.
    ///
    /// The default applies blindly to every differing field, identifier-like
    /// fields included.
    #[must_use]
    pub fn with_default_rule(mut self, rule: Rule) -> Self {
        self.rules.insert_default(rule);
        self
    }

    /// Names of the differing fields, in declaration order.
    pub fn fields(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// True if `field` differs between the two sides (and is not excluded).
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.entries.contains_key(field)
    }

    /// Number of differing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no fields differ.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The left record's value for a declared field.
    pub fn get_left(&self, field: &str) -> Result<Value> {
        self.read(self.left, field)
    }

    /// The right record's value for a declared field.
    pub fn get_right(&self, field: &str) -> Result<Value> {
        self.read(self.right, field)
    }

    /// Both sides' values for a declared field, left first.
    pub fn all_values(&self, field: &str) -> Result<Vec<Value>> {
        Ok(vec![self.get_left(field)?, self.get_right(field)?])
    }

    fn read(&self, side: &R, field: &str) -> Result<Value> {
        if !side.has_field(field) {
            return Err(MergeError::unknown_field(side.record_name(), field));
        }
        side.get(field)
    }

    /// Resolve the registered rule for a differing field.
    ///
    /// The rule for `field` (or the registered default) is invoked with the
    /// two differing values; a value-bearing outcome is mapped back to the
    /// side(s) that produced it. A value matching neither side is forwarded
    /// as [`RuleOutcome::Value`] — a literal override the caller must handle
    /// itself.
    ///
    /// # Errors
    ///
    /// [`MergeError::FieldNotInDiff`] when the field's values do not differ,
    /// and [`MergeError::MissingRule`] when no explicit or default rule is
    /// registered for it.
    pub fn get_preferred(&self, field: &str) -> Result<RuleOutcome> {
        let (left, right) = self
            .entries
            .get(field)
            .ok_or_else(|| MergeError::not_in_diff(field))?;
        let values = [left.clone(), right.clone()];

        let rule = self.rules.rule(field).ok_or_else(|| {
            MergeError::missing_rule(field, values.iter().map(ToString::to_string))
        })?;

        let outcome = rule.invoke(field, &values)?;
        Ok(match map_to_sides(outcome, &values) {
            SidedOutcome::Pref(p) => RuleOutcome::Preference(p),
            SidedOutcome::Win(_) => RuleOutcome::Preference(Preference::Right),
            SidedOutcome::Literal(v) => RuleOutcome::Value(v),
        })
    }
}
