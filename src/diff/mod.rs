//! Field-level diff and merge engine.
//!
//! Three entry points, from symmetric to N-way:
//!
//! - [`ModelDiff`]: which fields differ between two records, with rule-driven
//!   preference lookup.
//! - [`ChangeSet`]: a directional baseline→target proposal with conflict
//!   resolution and in-place application.
//! - [`MergeSet`]: one baseline against N target candidates, same machinery
//!   over multi-way value sets.
//!
//! A diff computes its working set once at construction, never mutates its
//! input records during comparison, and is discarded after one
//! resolve/apply cycle. Read-only accessors are safe to call concurrently;
//! `resolve_preferences` and `apply` are not.
//!
//! ```ignore
//! let merged = ChangeSet::new(&mut baseline, &proposed)
//!     .with_conflict_rule("description", Rule::binary(join_paragraphs))
//!     .resolve_preferences()?
//!     .apply()?;
//! ```

mod change_set;
mod merge_set;
mod model_diff;
mod preference;
mod report;
mod rules;

pub use change_set::{ChangeSet, Resolution};
pub use merge_set::MergeSet;
pub use model_diff::ModelDiff;
pub use preference::Preference;
pub use report::{ChangeOutcome, FieldChange, MergeReport};
pub use rules::{Rule, RuleOutcome, RuleSet};
