//! Directional change sets: baseline → target.

use super::preference::Preference;
use super::report::MergeReport;
use super::rules::{map_to_sides, Rule, RuleSet, SidedOutcome};
use crate::error::{MergeError, Result};
use crate::record::{FieldState, Record, Value};
use indexmap::IndexMap;
use serde::Serialize;

/// The outcome of resolving one field.
///
/// Fields that resolve to the baseline side are *eliminated* — removed from
/// the working set entirely — so they have no `Resolution` at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    /// A target-side value won outright.
    Target { value: Value },
    /// A conflict rule produced a value distinct from every side.
    Resolved {
        candidates: Vec<Value>,
        resolution: Value,
    },
    /// The conflict stands. The contested target values are kept for
    /// visibility but are not safe to auto-apply.
    Unresolved { candidates: Vec<Value> },
}

impl Resolution {
    /// The value `apply()` writes for this resolution. An unresolved field
    /// yields the [`Value::Unresolved`] marker, never a plain value.
    #[must_use]
    pub fn effective(&self) -> Value {
        match self {
            Resolution::Target { value } => value.clone(),
            Resolution::Resolved { resolution, .. } => resolution.clone(),
            Resolution::Unresolved { candidates } => Value::Unresolved(candidates.clone()),
        }
    }

    /// True when this field still requires caller judgment.
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Resolution::Unresolved { .. })
    }
}

/// One working-set field: the values on every side plus the resolution once
/// preferences have been run.
#[derive(Debug, Clone)]
pub(crate) struct FieldEntry {
    pub(crate) default: Value,
    pub(crate) baseline: Value,
    pub(crate) targets: Vec<Value>,
    pub(crate) resolution: Option<Resolution>,
}

impl FieldEntry {
    fn sides(&self) -> Vec<Value> {
        let mut sides = Vec::with_capacity(self.targets.len() + 1);
        sides.push(self.baseline.clone());
        sides.extend(self.targets.iter().cloned());
        sides
    }
}

/// Resolve one field's sides into an outcome.
///
/// `None` means the baseline side won and the field drops out of the working
/// set. The decision procedure:
///
/// 1. Rank every side's state (`Modified > Default > Empty`).
/// 2. If the top-ranked sides agree on a single value, that value wins: kept
///    as-is when the baseline holds it, applied when only targets do.
/// 3. Otherwise two or more sides hold distinct meaningful values. A
///    registered preference rule may still pick a side (or a literal
///    override); failing that the field is in conflict and the conflict rule
///    for the field decides. With no conflict rule the field stays
///    unresolved.
pub(crate) fn resolve_sides(
    field: &str,
    entry: &FieldEntry,
    rules: &RuleSet,
) -> Result<Option<Resolution>> {
    let sides = entry.sides();
    let states: Vec<FieldState> = sides
        .iter()
        .map(|v| FieldState::classify(v, &entry.default))
        .collect();
    let top = states.iter().copied().max().unwrap_or(FieldState::Empty);

    // Distinct values among top-ranked sides, in side order.
    let mut candidates: Vec<&Value> = Vec::new();
    let mut baseline_is_candidate = false;
    for (i, value) in sides.iter().enumerate() {
        if states[i] == top {
            if i == 0 {
                baseline_is_candidate = true;
            }
            if !candidates.contains(&value) {
                candidates.push(value);
            }
        }
    }

    if candidates.len() == 1 {
        if baseline_is_candidate {
            return Ok(None);
        }
        return Ok(Some(Resolution::Target {
            value: candidates[0].clone(),
        }));
    }

    // Two or more distinct meaningful values. Target-side candidates are the
    // payload carried by Unresolved/Resolved outcomes.
    let contested: Vec<Value> = candidates
        .iter()
        .filter(|v| !baseline_is_candidate || ***v != entry.baseline)
        .map(|v| (*v).clone())
        .collect();

    if let Some(rule) = rules.rule(field) {
        let outcome = rule.invoke(field, &sides)?;
        match map_to_sides(outcome, &sides) {
            SidedOutcome::Pref(Preference::Left) => return Ok(None),
            SidedOutcome::Pref(Preference::Right) => {
                return Ok(Some(Resolution::Target {
                    value: contested[0].clone(),
                }))
            }
            SidedOutcome::Pref(Preference::Both) => {}
            SidedOutcome::Pref(_) => {
                return Ok(Some(Resolution::Unresolved {
                    candidates: contested,
                }))
            }
            SidedOutcome::Win(value) => return Ok(Some(Resolution::Target { value })),
            SidedOutcome::Literal(resolution) => {
                return Ok(Some(Resolution::Resolved {
                    candidates: contested,
                    resolution,
                }))
            }
        }
    }

    // Conflict: both the baseline and at least one target hold distinct
    // meaningful values.
    if let Some(rule) = rules.conflict_rule(field) {
        let outcome = rule.invoke(field, &sides)?;
        match map_to_sides(outcome, &sides) {
            SidedOutcome::Pref(Preference::Left) => Ok(None),
            SidedOutcome::Pref(Preference::Right) => Ok(Some(Resolution::Target {
                value: contested[0].clone(),
            })),
            SidedOutcome::Win(value) => Ok(Some(Resolution::Target { value })),
            SidedOutcome::Literal(resolution) => Ok(Some(Resolution::Resolved {
                candidates: contested,
                resolution,
            })),
            SidedOutcome::Pref(_) => Ok(Some(Resolution::Unresolved {
                candidates: contested,
            })),
        }
    } else {
        Ok(Some(Resolution::Unresolved {
            candidates: contested,
        }))
    }
}

/// The preference a field would resolve to, before conflict handling.
pub(crate) fn preferred_of(field: &str, entry: &FieldEntry, rules: &RuleSet) -> Result<Preference> {
    let sides = entry.sides();
    let states: Vec<FieldState> = sides
        .iter()
        .map(|v| FieldState::classify(v, &entry.default))
        .collect();
    let top = states.iter().copied().max().unwrap_or(FieldState::Empty);

    let mut distinct: Vec<&Value> = Vec::new();
    let mut baseline_is_candidate = false;
    for (i, value) in sides.iter().enumerate() {
        if states[i] == top {
            if i == 0 {
                baseline_is_candidate = true;
            }
            if !distinct.contains(&value) {
                distinct.push(value);
            }
        }
    }

    if distinct.len() == 1 {
        return Ok(if baseline_is_candidate {
            Preference::Left
        } else {
            Preference::Right
        });
    }

    match rules.rule(field) {
        Some(rule) => {
            let outcome = rule.invoke(field, &sides)?;
            Ok(match map_to_sides(outcome, &sides) {
                SidedOutcome::Pref(p) => p,
                SidedOutcome::Win(_) => Preference::Right,
                // A literal override is a conflict resolution in disguise
                SidedOutcome::Literal(_) => Preference::Both,
            })
        }
        None => Ok(Preference::Both),
    }
}

/// Run preference resolution over every working-set entry, in place.
pub(crate) fn resolve_all(
    entries: &mut IndexMap<String, FieldEntry>,
    eliminated: &mut Vec<String>,
    rules: &RuleSet,
) -> Result<()> {
    let fields: Vec<String> = entries.keys().cloned().collect();
    for field in fields {
        let outcome = {
            let entry = &entries[&field];
            resolve_sides(&field, entry, rules)?
        };
        match outcome {
            None => {
                tracing::debug!(field = %field, "baseline preferred, change dropped");
                entries.shift_remove(&field);
                eliminated.push(field);
            }
            Some(resolution) => {
                tracing::debug!(field = %field, resolution = ?resolution, "field resolved");
                entries[&field].resolution = Some(resolution);
            }
        }
    }
    Ok(())
}

/// Write every remaining entry's effective value onto the baseline.
///
/// Entries that were never resolved are decided by record state alone —
/// without conflict rules — so a still-contested field surfaces as a
/// [`Value::Unresolved`] marker rather than silently overwriting the
/// baseline.
pub(crate) fn apply_entries<R: Record>(
    baseline: &mut R,
    entries: IndexMap<String, FieldEntry>,
) -> Result<()> {
    let no_rules = RuleSet::new();
    for (field, entry) in entries {
        let value = match &entry.resolution {
            Some(resolution) => resolution.effective(),
            None => match resolve_sides(&field, &entry, &no_rules)? {
                Some(resolution) => resolution.effective(),
                None => continue,
            },
        };
        baseline.set(&field, value)?;
    }
    Ok(())
}

/// Build the working set for one baseline against its targets.
pub(crate) fn build_entries<R: Record>(
    baseline: &R,
    targets: &[&R],
    include_pk: bool,
) -> IndexMap<String, FieldEntry> {
    let mut entries: IndexMap<String, FieldEntry> = IndexMap::new();
    for target in targets {
        for (field, (base_value, _)) in baseline.compare(*target, include_pk) {
            if !entries.contains_key(&field) {
                let default = baseline
                    .field_def(&field)
                    .map(|def| def.default)
                    .unwrap_or(Value::Null);
                entries.insert(
                    field,
                    FieldEntry {
                        default,
                        baseline: base_value,
                        targets: Vec::new(),
                        resolution: None,
                    },
                );
            }
        }
    }
    // Collect every target's value for each differing field, in target order.
    let fields: Vec<String> = entries.keys().cloned().collect();
    for field in &fields {
        let values: Vec<Value> = targets
            .iter()
            .map(|t| t.get(field).unwrap_or(Value::Null))
            .collect();
        entries[field].targets = values;
    }
    // Working set iterates in field declaration order regardless of which
    // target introduced the field.
    let order: Vec<&'static str> = baseline.field_names();
    entries.sort_by(|a, _, b, _| {
        let pos = |name: &str| order.iter().position(|n| *n == name).unwrap_or(usize::MAX);
        pos(a).cmp(&pos(b))
    });
    entries
}

/// A directional diff from a baseline record to a proposed target.
///
/// The baseline is "current truth"; the target carries proposed data. After
/// [`resolve_preferences`](ChangeSet::resolve_preferences), each differing
/// field is either dropped (the baseline value stands), resolved to a value,
/// or left explicitly unresolved; [`apply`](ChangeSet::apply) then writes the
/// effective values back onto the baseline. The engine never persists
/// anything — the caller owns the mutated baseline afterwards.
///
/// ```ignore
/// let merged = ChangeSet::new(&mut baseline, &proposed)
///     .with_conflict_rule("day", Rule::largest())
///     .resolve_preferences()?
///     .apply()?;
/// ```
pub struct ChangeSet<'a, R: Record> {
    baseline: &'a mut R,
    target: &'a R,
    pub(crate) entries: IndexMap<String, FieldEntry>,
    pub(crate) eliminated: Vec<String>,
    rules: RuleSet,
}

impl<'a, R: Record> ChangeSet<'a, R> {
    /// Build a change set from baseline to target, excluding primary-key
    /// fields.
    pub fn new(baseline: &'a mut R, target: &'a R) -> Self {
        Self::build(baseline, target, false)
    }

    /// Build a change set that also proposes primary-key changes.
    pub fn including_pk(baseline: &'a mut R, target: &'a R) -> Self {
        Self::build(baseline, target, true)
    }

    fn build(baseline: &'a mut R, target: &'a R, include_pk: bool) -> Self {
        let entries = build_entries(&*baseline, &[target], include_pk);
        tracing::trace!(
            record = baseline.record_name(),
            differing = entries.len(),
            "computed change set working set"
        );
        Self {
            baseline,
            target,
            entries,
            eliminated: Vec::new(),
            rules: RuleSet::new(),
        }
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

    /// Register a conflict rule for one field, consulted when both sides
    /// hold distinct meaningful values.
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
    pub fn get_left(&self, field: &str) -> Result<Value> {
        read(&*self.baseline, field)
    }

    /// The target's value for a declared field.
    pub fn get_right(&self, field: &str) -> Result<Value> {
        read(self.target, field)
    }

    /// Alias of [`get_left`](ChangeSet::get_left).
    pub fn get_baseline(&self, field: &str) -> Result<Value> {
        self.get_left(field)
    }

    /// Alias of [`get_right`](ChangeSet::get_right).
    pub fn get_target(&self, field: &str) -> Result<Value> {
        self.get_right(field)
    }

    /// True if the target holds any value for the field.
    pub fn has_target_value(&self, field: &str) -> Result<bool> {
        Ok(!self.get_target(field)?.is_null())
    }

    /// Baseline value followed by the target value.
    pub fn all_values(&self, field: &str) -> Result<Vec<Value>> {
        Ok(vec![self.get_left(field)?, self.get_right(field)?])
    }

    /// Working-set fields whose baseline value is deliberately set (neither
    /// empty nor the declared default).
    pub fn modified_in_baseline(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, e)| FieldState::classify(&e.baseline, &e.default) == FieldState::Modified)
            .map(|(field, _)| field.as_str())
            .collect()
    }

    /// Working-set fields whose target value is deliberately set.
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

    /// Which side's value is preferred for a working-set field, before any
    /// conflict handling.
    ///
    /// The side holding the more meaningful state wins outright; when both
    /// sides hold distinct deliberately-set values the result is
    /// [`Preference::Both`] unless a registered preference rule decides
    /// otherwise.
    pub fn get_preferred(&self, field: &str) -> Result<Preference> {
        let entry = self
            .entries
            .get(field)
            .ok_or_else(|| MergeError::not_in_diff(field))?;
        preferred_of(field, entry, &self.rules)
    }

    /// The value the field would receive if this change set were applied
    /// now: the resolution's effective value, or the raw target value before
    /// resolution.
    pub fn get_resolution(&self, field: &str) -> Result<Value> {
        let entry = self
            .entries
            .get(field)
            .ok_or_else(|| MergeError::not_in_diff(field))?;
        Ok(entry
            .resolution
            .as_ref()
            .map_or_else(|| entry.targets[0].clone(), Resolution::effective))
    }

    /// The full resolution for a working-set field, once computed.
    pub fn resolution(&self, field: &str) -> Option<&Resolution> {
        self.entries.get(field).and_then(|e| e.resolution.as_ref())
    }

    /// Resolve every working-set field, dropping changes the baseline wins,
    /// keeping winning target values, and running conflict rules for fields
    /// where both sides hold distinct meaningful values.
    ///
    /// Fields whose conflict has no registered rule are recorded as
    /// [`Resolution::Unresolved`] — resolution of the remaining fields
    /// proceeds regardless. Chainable.
    pub fn resolve_preferences(mut self) -> Result<Self> {
        resolve_all(&mut self.entries, &mut self.eliminated, &self.rules)?;
        Ok(self)
    }

    /// Fields recorded as unresolved by
    /// [`resolve_preferences`](ChangeSet::resolve_preferences).
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

    /// A serializable account of this change set's outcome.
    #[must_use]
    pub fn report(&self) -> MergeReport {
        MergeReport::from_entries(self.baseline.record_name(), &self.entries, &self.eliminated)
    }

    /// Enact the remaining changes upon the baseline and return it.
    ///
    /// Unresolved fields are written as [`Value::Unresolved`] markers; the
    /// caller must check [`unresolved_fields`](ChangeSet::unresolved_fields)
    /// (or the report) before treating the record as ready for persistence.
    pub fn apply(self) -> Result<&'a mut R> {
        let Self {
            baseline, entries, ..
        } = self;
        apply_entries(&mut *baseline, entries)?;
        Ok(baseline)
    }
}

fn read<R: Record>(record: &R, field: &str) -> Result<Value> {
    if !record.has_field(field) {
        return Err(MergeError::unknown_field(record.record_name(), field));
    }
    record.get(field)
}
