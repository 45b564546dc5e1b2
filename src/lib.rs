//! **A field-level diff, change-set, and merge engine for record-like data.**
//!
//! `record-merge` compares structured records field by field, applies
//! per-field preference rules to decide which side of each difference should
//! win, detects genuine conflicts, and produces a merged result with an
//! explicit notion of *resolved* versus *unresolved* fields. It is an
//! in-process library: persistence, schema discovery, and query generation
//! stay with your data-access layer, and the engine only ever reads named
//! fields from the records you hand it and writes resolved values back onto
//! the baseline.
//!
//! ## Core Concepts & Modules
//!
//! - **[`record`]**: The [`Record`] trait is the engine's only boundary —
//!   anything that can enumerate its declared fields ([`FieldDef`]) and
//!   read/write them by name as [`Value`]s can be diffed and merged.
//! - **[`diff`]**: The engine itself. [`ModelDiff`] answers "which fields
//!   differ between these two records"; [`ChangeSet`] models a directional
//!   baseline→target proposal with conflict resolution and in-place
//!   application; [`MergeSet`] generalizes to one baseline and N target
//!   candidates.
//! - **[`error`]**: Structural mistakes (unknown field, missing rule) fail
//!   fast with [`MergeError`]; data-level ambiguity never does — a contested
//!   field flows through as [`Resolution::Unresolved`] so that one bad field
//!   cannot abort the rest of a merge.
//!
//! ## How Resolution Works
//!
//! Every differing field is classified on each side as *empty* (no value),
//! *default* (equal to its declared default), or *modified* (deliberately
//! set). The more meaningful side wins outright; two distinct modified
//! values are a conflict, which a per-field conflict rule (string
//! concatenation, `Rule::largest()`, anything callable) may settle. A
//! conflict with no rule is recorded as unresolved and — if applied anyway —
//! is written as a [`Value::Unresolved`] marker that cannot be mistaken for
//! real data.
//!
//! ## Getting Started
//!
//! ```
//! use record_merge::{ChangeSet, FieldDef, MergeError, Preference, Record, Rule, Value};
//!
//! struct Profile {
//!     username: String,
//!     email: Value,
//!     bio: Value,
//! }
//!
//! impl Record for Profile {
//!     fn record_name(&self) -> &'static str {
//!         "profile"
//!     }
//!
//!     fn fields(&self) -> Vec<FieldDef> {
//!         vec![
//!             FieldDef::key("username"),
//!             FieldDef::new("email"),
//!             FieldDef::new("bio"),
//!         ]
//!     }
//!
//!     fn get(&self, field: &str) -> record_merge::Result<Value> {
//!         match field {
//!             "username" => Ok(Value::from(self.username.clone())),
//!             "email" => Ok(self.email.clone()),
//!             "bio" => Ok(self.bio.clone()),
//!             _ => Err(MergeError::unknown_field(self.record_name(), field)),
//!         }
//!     }
//!
//!     fn set(&mut self, field: &str, value: Value) -> record_merge::Result<()> {
//!         match field {
//!             "email" => self.email = value,
//!             "bio" => self.bio = value,
//!             _ => return Err(MergeError::unknown_field(self.record_name(), field)),
//!         }
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> record_merge::Result<()> {
//!     let mut current = Profile {
//!         username: "ada".into(),
//!         email: Value::from("ada@old.example"),
//!         bio: Value::Null,
//!     };
//!     let proposed = Profile {
//!         username: "ada".into(),
//!         email: Value::from("ada@new.example"),
//!         bio: Value::from("Analyst."),
//!     };
//!
//!     let change_set = ChangeSet::new(&mut current, &proposed)
//!         .with_conflict_rule("email", Rule::fixed(Preference::Right))
//!         .resolve_preferences()?;
//!     assert!(change_set.is_fully_resolved());
//!
//!     let merged = change_set.apply()?;
//!     assert_eq!(merged.email, Value::from("ada@new.example"));
//!     assert_eq!(merged.bio, Value::from("Analyst."));
//!     Ok(())
//! }
//! ```
//!
//! The empty `bio` was filled from the proposal without any rule; the
//! modified/modified `email` needed one. Had the conflict rule been left
//! out, `resolve_preferences` would still have succeeded —
//! `unresolved_fields()` would name `email`, and applying anyway would have
//! written an unresolved marker for the caller to deal with before
//! persisting.
//!
//! ## N-Way Merges
//!
//! [`MergeSet`] runs the same machinery over one baseline plus any number of
//! candidate records, e.g. consolidating duplicate rows:
//!
//! ```ignore
//! let merged = MergeSet::new(&mut canonical, vec![&dupe_a, &dupe_b])?
//!     .with_default_conflict_rule(Rule::largest())
//!     .resolve_preferences()?
//!     .apply()?;
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    // Doc completeness: # Errors / # Panics sections are aspirational
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    // Variable names like `left`/`right` or `min`/`max` are clear in context
    clippy::similar_names
)]

pub mod diff;
pub mod error;
pub mod record;

// Re-export main types for convenience
pub use diff::{
    ChangeOutcome, ChangeSet, FieldChange, MergeReport, MergeSet, ModelDiff, Preference,
    Resolution, Rule, RuleOutcome, RuleSet,
};
pub use error::{MergeError, Result};
pub use record::{FieldDef, FieldState, Record, Value};
