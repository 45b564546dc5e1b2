//! N-way merges: one baseline, many target candidates.

use super::change_set::{
    apply_entries, build_entries, preferred_of, resolve_all, FieldEntry, Resolution,
};
use super::preference::Preference;
use super::report::MergeReport;
use super::rules::{Rule, RuleSet};
use crate::error::{MergeError, Result};
use crate::record::{FieldState, Record, Value};
use indexmap::IndexMap;

/// A merge of one baseline record with any number of target candidates.
///
/// A field joins the working set when its value differs between the baseline
/// and *any* target. Resolution generalizes the change-set policy: the side
/// holding the most meaningful state wins; when two or more sides hold
/// distinct deliberately-set values, the field is in conflict and the
/// field's conflict rule receives the full ordered value list (baseline
/// first, then every target in argument order).
#[derive(Debug)]
pub struct MergeSet<'a, R: Record> {
    baseline: &'a mut R,
    targets: Vec<&'a R>,
    entries: IndexMap<String, FieldEntry>,
    eliminated: Vec<String>,
    rules: RuleSet,
}

impl<'a, R: Record> MergeSet<'a, R> {
    /// Merge a baseline with one or more targets, excluding primary-key
    /// fields.
    ///
    /// # Errors
    ///
    /// [`MergeError::NoTargets`] when `targets` is empty.
    pub fn new(baseline: &'a mut R, targets: Vec<&'a R>) -> Result<Self> {
        Self::build(baseline, targets, false)
    }

    /// Merge including primary-key fields in the working set.
    pub fn including_pk(baseline: &'a mut R, targets: Vec<&'a R>) -> Result<Self> {
        Self::build(baseline, targets, true)
    }

    fn build(baseline: &'a mut R, targets: Vec<&'a R>, include_pk: bool) -> Result<Self> {
        if targets.is_empty() {
            return Err(MergeError::NoTargets);
        }
        let entries = build_entries(&*baseline, &targets, include_pk);
        tracing::trace!(
            record = baseline.record_name(),
            targets = targets.len(),
            differing = entries.len(),
            "computed merge working set"
        );
        Ok(Self {
            baseline,
            targets,
            entries,
            eliminated: Vec::new(),
            rules: RuleSet::new(),
        })
    }

    /// Register a preference rule for one field.
    #[must_use]
    pub fn with_rule(mut self, field: impl Into<String>, rule: Rule) -> Self {
        self.rules.insert(field, rule);
        self
    }

    /// Register the fallback preference rule.
    #[must_use]
    pub fn with_default_rule(mut self, rule: Rule) -> Self {
        self.rules.insert_default(rule);
        self
    }

    /// Register a conflict rule for one field.
    #[must_use]
    pub fn with_conflict_rule(mut self, field: impl Into<String>, rule: Rule) -> Self {
        self.rules.insert_conflict(field, rule);
        self
    }

    /// Register the fallback conflict rule.
    #[must_use]
    pub fn with_default_conflict_rule(mut self, rule: Rule) -> Self {
        self.rules.insert_default_conflict(rule);
        self
    }

    /// Names of the differing fields still in the working set.
    pub fn fields(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// True if `field` is part of the working set.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.entries.contains_key(field)
    }

    /// Number of fields still in the working set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no fields differ (or every change was dropped).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The baseline's value for a declared field.
    pub fn get_baseline(&self, field: &str) -> Result<Value> {
        if !self.baseline.has_field(field) {
            return Err(MergeError::unknown_field(
                self.baseline.record_name(),
                field,
            ));
        }
        self.baseline.get(field)
    }

    /// Every target's value for a declared field, in argument order.
    pub fn get_targets(&self, field: &str) -> Result<Vec<Value>> {
        self.targets
            .iter()
            .map(|t| {
                if !t.has_field(field) {
                    return Err(MergeError::unknown_field(t.record_name(), field));
                }
                t.get(field)
            })
            .collect()
    }

    /// True if any target holds a value for the field.
    pub fn has_target_value(&self, field: &str) -> Result<bool> {
        Ok(self.get_targets(field)?.iter().any(|v| !v.is_null()))
    }

    /// Baseline value followed by all target values — N+1 entries.
    pub fn all_values(&self, field: &str) -> Result<Vec<Value>> {
        let mut values = vec![self.get_baseline(field)?];
        values.extend(self.get_targets(field)?);
        Ok(values)
    }

    /// Working-set fields whose baseline value is deliberately set.
    pub fn modified_in_baseline(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, e)| FieldState::classify(&e.baseline, &e.default) == FieldState::Modified)
            .map(|(field, _)| field.as_str())
            .collect()
    }

    /// Working-set fields where any target holds a deliberately set value.
    pub fn modified_in_target(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, e)| {
                e.targets
                    .iter()
                    .any(|v| FieldState::classify(v, &e.default) == FieldState::Modified)
            })
            .map(|(field, _)| field.as_str())
            .collect()
    }

    /// Which side is preferred for a working-set field, before conflict
    /// handling. `Right` covers a win by any target side.
    pub fn get_preferred(&self, field: &str) -> Result<Preference> {
        let entry = self
            .entries
            .get(field)
            .ok_or_else(|| MergeError::not_in_diff(field))?;
        preferred_of(field, entry, &self.rules)
    }

    /// The full resolution for a working-set field, once computed.
    pub fn resolution(&self, field: &str) -> Option<&Resolution> {
        self.entries.get(field).and_then(|e| e.resolution.as_ref())
    }

    /// Resolve every working-set field. Chainable; one unresolvable conflict
    /// never aborts resolution of the other fields.
    pub fn resolve_preferences(mut self) -> Result<Self> {
        resolve_all(&mut self.entries, &mut self.eliminated, &self.rules)?;
        Ok(self)
    }

    /// Fields recorded as unresolved by
    /// [`resolve_preferences`](MergeSet::resolve_preferences).
    pub fn unresolved_fields(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, e)| e.resolution.as_ref().is_some_and(Resolution::is_unresolved))
            .map(|(field, _)| field.as_str())
            .collect()
    }

    /// Fields dropped because the baseline value won.
    pub fn eliminated_fields(&self) -> Vec<&str> {
        self.eliminated.iter().map(String::as_str).collect()
    }

    /// True when every remaining field resolved to a concrete value.
    #[must_use]
    pub fn is_fully_resolved(&self) -> bool {
        self.entries
            .values()
            .all(|e| e.resolution.as_ref().is_some_and(|r| !r.is_unresolved()))
    }

    /// A serializable account of this merge's outcome.
    #[must_use]
    pub fn report(&self) -> MergeReport {
        MergeReport::from_entries(self.baseline.record_name(), &self.entries, &self.eliminated)
    }

    /// Enact the merge upon the baseline and return it. Unresolved fields
    /// are written as [`Value::Unresolved`] markers.
    pub fn apply(self) -> Result<&'a mut R> {
        let Self {
            baseline, entries, ..
        } = self;
        apply_entries(&mut *baseline, entries)?;
        Ok(baseline)
    }
}
