//! Directional preference between compared values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The resolved direction for a single field comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
    /// A preference does not apply in this context (e.g. the name field of
    /// two different customers).
    NotApplicable,
    /// Neither value is preferred.
    Neither,
    /// The left/baseline value is preferred.
    Left,
    /// The right/target value is preferred.
    Right,
    /// Both values are equally preferable — an irreconcilable tie that
    /// routes to conflict resolution.
    Both,
}

impl Preference {
    /// True when the preference names a single winning side.
    #[must_use]
    pub fn is_decisive(&self) -> bool {
        matches!(self, Preference::Left | Preference::Right)
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Preference::NotApplicable => "not applicable",
            Preference::Neither => "neither",
            Preference::Left => "left",
            Preference::Right => "right",
            Preference::Both => "both",
        };
        write!(f, "{name}")
    }
}
