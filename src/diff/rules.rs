//! Preference rules and their resolution.
//!
//! A rule decides, for one field, which of the differing values should win.
//! Rules come in a small closed set of shapes chosen at registration time —
//! there is no runtime signature inspection:
//!
//! - [`Rule::fixed`] — always the same [`Preference`].
//! - [`Rule::constant`] — always the same literal value.
//! - [`Rule::binary`] — a two-argument function, for two-sided comparisons.
//! - [`Rule::variadic`] — a function over the full ordered value list.
//!
//! A rule may return either a `Preference` or a concrete value. Returned
//! values are translated back to a side exactly once, centrally, in
//! [`map_to_sides`]: a value the baseline holds maps to `Left` (a no-op),
//! a value only target side(s) hold maps to a win for that value, and a
//! value matching no side at all is forwarded as a literal override.

use super::preference::Preference;
use crate::error::{MergeError, Result};
use crate::record::Value;
use indexmap::IndexMap;
use std::fmt;

/// What a rule produced for one field: a directional preference or a
/// concrete value.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    Preference(Preference),
    Value(Value),
}

impl From<Preference> for RuleOutcome {
    fn from(p: Preference) -> Self {
        RuleOutcome::Preference(p)
    }
}

impl From<Value> for RuleOutcome {
    fn from(v: Value) -> Self {
        RuleOutcome::Value(v)
    }
}

type BinaryFn = Box<dyn Fn(&Value, &Value) -> RuleOutcome + Send + Sync>;
type VariadicFn = Box<dyn Fn(&[Value]) -> RuleOutcome + Send + Sync>;

/// A per-field resolution rule.
pub enum Rule {
    /// Always the same preference.
    Fixed(Preference),
    /// A function of exactly two values (baseline, target).
    Binary(BinaryFn),
    /// A function of the full ordered value list (baseline first).
    Variadic(VariadicFn),
}

impl Rule {
    /// A rule that always resolves to the given preference.
    #[must_use]
    pub fn fixed(preference: Preference) -> Self {
        Rule::Fixed(preference)
    }

    /// A rule that always produces the given literal value.
    ///
    /// This is the supported stand-in for registering a bare value as a
    /// rule: the constant still goes through the central side-mapping, so a
    /// constant equal to one side resolves to that side rather than to a
    /// literal override.
    pub fn constant(value: impl Into<Value>) -> Self {
        let value = value.into();
        Rule::Variadic(Box::new(move |_| RuleOutcome::Value(value.clone())))
    }

    /// A rule evaluated with the two sides of a two-way comparison.
    pub fn binary<F, O>(f: F) -> Self
    where
        F: Fn(&Value, &Value) -> O + Send + Sync + 'static,
        O: Into<RuleOutcome>,
    {
        Rule::Binary(Box::new(move |left, right| f(left, right).into()))
    }

    /// A rule evaluated with the full ordered value list, baseline first.
    pub fn variadic<F, O>(f: F) -> Self
    where
        F: Fn(&[Value]) -> O + Send + Sync + 'static,
        O: Into<RuleOutcome>,
    {
        Rule::Variadic(Box::new(move |values| f(values).into()))
    }

    /// Picks the greatest comparable value, skipping nulls.
    ///
    /// Values that do not order against the current best (mixed variants,
    /// json) are skipped; if nothing orders at all the rule yields
    /// [`Preference::Neither`].
    #[must_use]
    pub fn largest() -> Self {
        Rule::variadic(|values| pick_by(values, std::cmp::Ordering::Greater))
    }

    /// Picks the smallest comparable value, skipping nulls.
    #[must_use]
    pub fn smallest() -> Self {
        Rule::variadic(|values| pick_by(values, std::cmp::Ordering::Less))
    }

    /// Evaluate this rule against the ordered value list for `field`.
    pub fn invoke(&self, field: &str, values: &[Value]) -> Result<RuleOutcome> {
        match self {
            Rule::Fixed(preference) => Ok(RuleOutcome::Preference(*preference)),
            Rule::Binary(f) => {
                if values.len() != 2 {
                    return Err(MergeError::RuleArity {
                        field: field.to_string(),
                        expected: 2,
                        actual: values.len(),
                    });
                }
                Ok(f(&values[0], &values[1]))
            }
            Rule::Variadic(f) => Ok(f(values)),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Fixed(p) => f.debug_tuple("Fixed").field(p).finish(),
            Rule::Binary(_) => f.write_str("Binary(<fn>)"),
            Rule::Variadic(_) => f.write_str("Variadic(<fn>)"),
        }
    }
}

fn pick_by(values: &[Value], keep: std::cmp::Ordering) -> RuleOutcome {
    let mut best: Option<&Value> = None;
    for value in values.iter().filter(|v| !v.is_null()) {
        best = match best {
            None => Some(value),
            Some(current) => match value.partial_cmp(current) {
                Some(ordering) if ordering == keep => Some(value),
                Some(_) => Some(current),
                None => Some(current),
            },
        };
    }
    best.map_or(RuleOutcome::Preference(Preference::Neither), |v| {
        RuleOutcome::Value(v.clone())
    })
}

/// A rule outcome after side-mapping, for internal resolution.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SidedOutcome {
    /// A directional preference (`Left`, `Both`, `Neither`, `NotApplicable`).
    Pref(Preference),
    /// A target-side value won outright; the winning value is kept so N-way
    /// merges know what to apply.
    Win(Value),
    /// The rule produced a value matching no side: a literal override.
    Literal(Value),
}

/// Translate a value-bearing outcome back to the side(s) that produced it.
///
/// `values` is the full ordered side list, index 0 being the baseline/left.
/// The baseline is checked first: a value the baseline already holds is a
/// no-op regardless of how many targets agree with it.
pub(crate) fn map_to_sides(outcome: RuleOutcome, values: &[Value]) -> SidedOutcome {
    match outcome {
        RuleOutcome::Preference(p) => SidedOutcome::Pref(p),
        RuleOutcome::Value(v) => {
            if values.first().is_some_and(|side| *side == v) {
                SidedOutcome::Pref(Preference::Left)
            } else if values.iter().skip(1).any(|side| *side == v) {
                SidedOutcome::Win(v)
            } else {
                SidedOutcome::Literal(v)
            }
        }
    }
}

/// Registered rules for one diff: per-field preference rules with an optional
/// `default` fallback, and per-field conflict rules with their own optional
/// fallback.
///
/// The default rule applies blindly to every differing field without an
/// explicit entry — including identifier-like fields. Narrow defaults such as
/// [`Rule::largest`] should be registered with that in mind.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: IndexMap<String, Rule>,
    default_rule: Option<Rule>,
    conflict_rules: IndexMap<String, Rule>,
    default_conflict: Option<Rule>,
}

impl RuleSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a preference rule for one field.
    pub fn insert(&mut self, field: impl Into<String>, rule: Rule) {
        self.rules.insert(field.into(), rule);
    }

    /// Register the fallback preference rule for fields without an explicit
    /// entry.
    pub fn insert_default(&mut self, rule: Rule) {
        self.default_rule = Some(rule);
    }

    /// Register a conflict rule for one field, consulted only when the field
    /// resolves to [`Preference::Both`].
    pub fn insert_conflict(&mut self, field: impl Into<String>, rule: Rule) {
        self.conflict_rules.insert(field.into(), rule);
    }

    /// Register the fallback conflict rule.
    pub fn insert_default_conflict(&mut self, rule: Rule) {
        self.default_conflict = Some(rule);
    }

    /// The preference rule applicable to `field`: its explicit entry, or the
    /// registered default.
    #[must_use]
    pub fn rule(&self, field: &str) -> Option<&Rule> {
        self.rules.get(field).or(self.default_rule.as_ref())
    }

    /// The conflict rule applicable to `field`: its explicit entry, or the
    /// registered default conflict rule.
    #[must_use]
    pub fn conflict_rule(&self, field: &str) -> Option<&Rule> {
        self.conflict_rules
            .get(field)
            .or(self.default_conflict.as_ref())
    }
}
