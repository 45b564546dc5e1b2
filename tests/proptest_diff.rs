//! Property-based tests for the diff and merge engine.
//!
//! Pins the resolution invariants across random records: equal records
//! never produce work, missing values are always filled, meaningful values
//! never silently vanish, and a total conflict rule leaves nothing
//! unresolved.

use proptest::prelude::*;
use record_merge::{
    ChangeSet, FieldDef, FieldState, MergeError, ModelDiff, Record, Result as MergeResult, Rule,
    Value,
};

#[derive(Debug, Clone, PartialEq)]
struct Sample {
    id: i64,
    nickname: Value,
    motto: Value,
    score: Value,
}

impl Record for Sample {
    fn record_name(&self) -> &'static str {
        "sample"
    }

    fn fields(&self) -> Vec<FieldDef> {
        vec![
            FieldDef::key("id"),
            FieldDef::new("nickname"),
            FieldDef::new("motto"),
            FieldDef::new("score"),
        ]
    }

    fn get(&self, field: &str) -> MergeResult<Value> {
        match field {
            "id" => Ok(Value::from(self.id)),
            "nickname" => Ok(self.nickname.clone()),
            "motto" => Ok(self.motto.clone()),
            "score" => Ok(self.score.clone()),
            _ => Err(MergeError::unknown_field(self.record_name(), field)),
        }
    }

    fn set(&mut self, field: &str, value: Value) -> MergeResult<()> {
        match field {
            "nickname" => self.nickname = value,
            "motto" => self.motto = value,
            "score" => self.score = value,
            _ => return Err(MergeError::unknown_field(self.record_name(), field)),
        }
        Ok(())
    }
}

const DATA_FIELDS: [&str; 3] = ["nickname", "motto", "score"];

fn arb_text_value() -> impl Strategy<Value = Value> {
    proptest::option::of("[a-z]{1,6}").prop_map(Value::from)
}

fn arb_int_value() -> impl Strategy<Value = Value> {
    proptest::option::of(0i64..50).prop_map(Value::from)
}

fn arb_sample() -> impl Strategy<Value = Sample> {
    (arb_text_value(), arb_text_value(), arb_int_value()).prop_map(|(nickname, motto, score)| {
        Sample {
            id: 1,
            nickname,
            motto,
            score,
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn equal_records_are_a_noop(sample in arb_sample()) {
        let diff_target = sample.clone();
        prop_assert!(ModelDiff::new(&sample, &diff_target).is_empty());

        let mut baseline = sample.clone();
        let merged = ChangeSet::new(&mut baseline, &diff_target)
            .resolve_preferences()
            .expect("no rules needed for an empty working set")
            .apply()
            .expect("empty apply cannot fail");
        prop_assert_eq!(merged.clone(), sample);
    }

    #[test]
    fn working_set_is_exactly_the_differing_fields(
        left in arb_sample(),
        right in arb_sample(),
    ) {
        let diff = ModelDiff::new(&left, &right);
        for field in DATA_FIELDS {
            let differs = left.get(field).unwrap() != right.get(field).unwrap();
            prop_assert_eq!(diff.contains(field), differs, "field {}", field);
        }
    }

    #[test]
    fn resolution_never_loses_meaningful_values(
        baseline in arb_sample(),
        target in arb_sample(),
    ) {
        let original = baseline.clone();
        let mut baseline = baseline;
        let merged = ChangeSet::new(&mut baseline, &target)
            .resolve_preferences()
            .expect("state policy is total without rules")
            .apply()
            .expect("sample accepts any value");

        for field in DATA_FIELDS {
            let before = original.get(field).unwrap();
            let proposed = target.get(field).unwrap();
            let after = merged.get(field).unwrap();

            if before == proposed {
                prop_assert_eq!(after, before, "untouched field {}", field);
            } else if before.is_null() {
                // Missing values are always filled from the target
                prop_assert_eq!(after, proposed, "filled field {}", field);
            } else if proposed.is_null() {
                // Meaningful values never vanish in favor of nothing
                prop_assert_eq!(after, before, "kept field {}", field);
            } else {
                // Two meaningful values with no rule: explicit marker
                prop_assert_eq!(
                    after,
                    Value::Unresolved(vec![proposed]),
                    "contested field {}",
                    field
                );
            }
        }
    }

    #[test]
    fn total_conflict_rule_resolves_everything(
        baseline in arb_sample(),
        target in arb_sample(),
    ) {
        let mut baseline = baseline;
        let change_set = ChangeSet::new(&mut baseline, &target)
            .with_default_conflict_rule(Rule::largest())
            .resolve_preferences()
            .expect("largest() is total over same-variant fields");
        prop_assert!(change_set.is_fully_resolved());
        prop_assert!(change_set.unresolved_fields().is_empty());
    }

    #[test]
    fn field_state_classification_is_exhaustive(value in arb_text_value()) {
        let state = FieldState::classify(&value, &Value::Null);
        if value.is_null() {
            prop_assert_eq!(state, FieldState::Empty);
        } else {
            prop_assert_eq!(state, FieldState::Modified);
        }
    }
}
