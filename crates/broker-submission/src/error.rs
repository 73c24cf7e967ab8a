//! Error types for the submission graph
//!
//! The registry has a single runtime fault: mapping an identifier that is
//! already known while the collision policy is [`CollisionPolicy::Error`].
//! Policy parsing failures only surface from the configuration layer.
//!
//! [`CollisionPolicy::Error`]: crate::CollisionPolicy::Error

use crate::identifier::EntityIdentifier;

/// Submission graph error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    /// Identifier already mapped and the policy refuses to merge
    #[error("duplicate identifier: {identifier} is already mapped")]
    DuplicateIdentifier {
        /// The identifier that was mapped twice
        identifier: EntityIdentifier,
    },

    /// Unknown collision policy name
    #[error("invalid collision policy: {0:?} (expected error, update, overwrite or ignore)")]
    InvalidPolicy(String),
}

impl SubmissionError {
    /// Check if error is a rejected duplicate mapping
    #[inline]
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateIdentifier { .. })
    }

    /// Identifier involved in the error, if any
    #[must_use]
    pub fn identifier(&self) -> Option<&EntityIdentifier> {
        match self {
            Self::DuplicateIdentifier { identifier } => Some(identifier),
            Self::InvalidPolicy(_) => None,
        }
    }
}
