//! Benchmarks for the diff and merge engine.

use criterion::{criterion_group, criterion_main, Criterion};
use record_merge::{ChangeSet, FieldDef, MergeError, ModelDiff, Record, Result, Rule, Value};
use std::hint::black_box;

struct Ticket {
    id: i64,
    values: Vec<Value>,
}

const FIELD_NAMES: [&str; 8] = [
    "summary", "status", "assignee", "component", "severity", "milestone", "notes", "labels",
];

impl Record for Ticket {
    fn record_name(&self) -> &'static str {
        "ticket"
    }

    fn fields(&self) -> Vec<FieldDef> {
        let mut fields = vec![FieldDef::key("id")];
        fields.extend(FIELD_NAMES.iter().copied().map(FieldDef::new));
        fields
    }

    fn get(&self, field: &str) -> Result<Value> {
        if field == "id" {
            return Ok(Value::from(self.id));
        }
        FIELD_NAMES
            .iter()
            .position(|n| *n == field)
            .map(|i| self.values[i].clone())
            .ok_or_else(|| MergeError::unknown_field("ticket", field.to_string()))
    }

    fn set(&mut self, field: &str, value: Value) -> Result<()> {
        let index = FIELD_NAMES
            .iter()
            .position(|n| *n == field)
            .ok_or_else(|| MergeError::unknown_field("ticket", field.to_string()))?;
        self.values[index] = value;
        Ok(())
    }
}

fn ticket(seed: i64) -> Ticket {
    Ticket {
        id: 1,
        values: (0..FIELD_NAMES.len() as i64)
            .map(|i| {
                if (seed + i) % 3 == 0 {
                    Value::Null
                } else {
                    Value::from(format!("value-{}", (seed * 31 + i) % 7))
                }
            })
            .collect(),
    }
}

fn benchmark_model_diff(c: &mut Criterion) {
    let left = ticket(1);
    let right = ticket(2);
    c.bench_function("model_diff_working_set", |b| {
        b.iter(|| {
            let diff = ModelDiff::new(black_box(&left), black_box(&right));
            black_box(diff.len())
        })
    });
}

fn benchmark_resolve_apply(c: &mut Criterion) {
    c.bench_function("change_set_resolve_apply", |b| {
        b.iter(|| {
            let mut baseline = ticket(1);
            let target = ticket(2);
            let merged = ChangeSet::new(&mut baseline, &target)
                .with_default_conflict_rule(Rule::largest())
                .resolve_preferences()
                .expect("largest() is total here")
                .apply()
                .expect("ticket accepts any value");
            black_box(merged.id)
        })
    });
}

criterion_group!(benches, benchmark_model_diff, benchmark_resolve_apply);
criterion_main!(benches);
