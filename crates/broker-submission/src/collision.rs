//! Collision policies
//!
//! A [`CollisionPolicy`] decides what happens when `map` targets an
//! identifier that is already registered. It is chosen once per submission.

use crate::error::SubmissionError;
use crate::value::Attributes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a second mapping of a known identifier is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Refuse the mapping
    #[default]
    Error,

    /// Shallow merge, incoming keys win
    Update,

    /// Replace attributes with the incoming ones
    Overwrite,

    /// Keep existing attributes, drop the incoming ones
    Ignore,
}

/// Outcome of resolving a collision
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Attributes to store on the existing entity
    Merged(Attributes),

    /// Existing entity stays as it is
    Unchanged,

    /// Mapping must be refused
    Rejected,
}

impl CollisionPolicy {
    /// All policies, in declaration order
    pub const ALL: [CollisionPolicy; 4] = [Self::Error, Self::Update, Self::Overwrite, Self::Ignore];

    /// Resolve existing and incoming attributes
    ///
    /// Pure: neither argument is modified.
    #[must_use]
    pub fn resolve(self, existing: &Attributes, incoming: &Attributes) -> Resolution {
        match self {
            Self::Error => Resolution::Rejected,
            Self::Ignore => Resolution::Unchanged,
            Self::Overwrite => Resolution::Merged(incoming.clone()),
            Self::Update => {
                let mut merged = existing.clone();
                for (key, value) in incoming {
                    merged.insert(key.clone(), value.clone());
                }
                Resolution::Merged(merged)
            }
        }
    }

    /// Policy name as used in configuration
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Update => "update",
            Self::Overwrite => "overwrite",
            Self::Ignore => "ignore",
        }
    }
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollisionPolicy {
    type Err = SubmissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|policy| policy.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SubmissionError::InvalidPolicy(s.to_string()))
    }
}
