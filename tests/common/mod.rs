//! Shared fixtures for integration tests.
//!
//! A small calendar-event record, stored as raw values so unresolved
//! markers can land on any non-key field.

#![allow(dead_code)]

use chrono::NaiveDate;
use record_merge::{ChangeSet, FieldDef, MergeError, Preference, Record, Result, Rule, Value};

pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[derive(Clone)]
pub struct CalendarEvent {
    pub title: String,
    pub day: Value,
    pub time: Value,
    pub location: Value,
    pub description: Value,
}

impl CalendarEvent {
    pub fn new(title: &str, day: NaiveDate) -> Self {
        Self {
            title: title.to_string(),
            day: Value::from(day),
            time: Value::from("All Day"),
            location: Value::Null,
            description: Value::Null,
        }
    }

    pub fn with_time(mut self, time: &str) -> Self {
        self.time = Value::from(time);
        self
    }

    pub fn with_location(mut self, location: &str) -> Self {
        self.location = Value::from(location);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Value::from(description);
        self
    }
}

impl Record for CalendarEvent {
    fn record_name(&self) -> &'static str {
        "calendar_event"
    }

    fn fields(&self) -> Vec<FieldDef> {
        vec![
            FieldDef::key("title"),
            FieldDef::new("day"),
            FieldDef::new("time").with_default("All Day"),
            FieldDef::new("location"),
            FieldDef::new("description"),
        ]
    }

    fn get(&self, field: &str) -> Result<Value> {
        match field {
            "title" => Ok(Value::from(self.title.clone())),
            "day" => Ok(self.day.clone()),
            "time" => Ok(self.time.clone()),
            "location" => Ok(self.location.clone()),
            "description" => Ok(self.description.clone()),
            _ => Err(MergeError::unknown_field(self.record_name(), field)),
        }
    }

    fn set(&mut self, field: &str, value: Value) -> Result<()> {
        match field {
            "title" => match value {
                Value::Text(v) => {
                    self.title = v;
                    Ok(())
                }
                other => Err(MergeError::type_mismatch(field, "text", other.type_name())),
            },
            "day" => {
                self.day = value;
                Ok(())
            }
            "time" => {
                self.time = value;
                Ok(())
            }
            "location" => {
                self.location = value;
                Ok(())
            }
            "description" => {
                self.description = value;
                Ok(())
            }
            _ => Err(MergeError::unknown_field(self.record_name(), field)),
        }
    }
}

pub fn dads_entry() -> CalendarEvent {
    CalendarEvent::new("Family Picnic", date(2025, 6, 20))
        .with_time("11:00 AM")
        .with_location("Central Park")
        .with_description("Annual family picnic with games and BBQ.")
}

pub fn moms_entry() -> CalendarEvent {
    CalendarEvent::new("Family Picnic", date(2025, 6, 20))
        .with_time("12:00 PM")
        .with_location("Central Park")
        .with_description("Picnic with family and friends, do not forget the salads!")
}

pub fn sons_entry() -> CalendarEvent {
    CalendarEvent::new("Family Picnic", date(2025, 6, 19))
        .with_time("12:00 PM")
        .with_description("Bring your football and frisbee!")
}

pub fn daughters_entry() -> CalendarEvent {
    CalendarEvent::new("Family Picnic", date(2025, 6, 20))
        .with_time("All Day")
        .with_location("Central Park")
}

pub fn unrelated_entry() -> CalendarEvent {
    CalendarEvent::new("Dentist Appointment", date(2025, 7, 1))
}

/// The house rules for merging calendar entries: latest day, earliest time,
/// target's location, and both descriptions joined newest-first.
pub fn event_rules(change_set: ChangeSet<'_, CalendarEvent>) -> ChangeSet<'_, CalendarEvent> {
    change_set
        .with_conflict_rule("day", Rule::largest())
        .with_conflict_rule("time", Rule::smallest())
        .with_conflict_rule("location", Rule::fixed(Preference::Right))
        .with_conflict_rule(
            "description",
            Rule::binary(|baseline: &Value, target: &Value| {
                Value::from(format!("{target}\n\n{baseline}"))
            }),
        )
}
