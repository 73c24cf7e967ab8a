//! Entity identifiers
//!
//! Provides [`EntityIdentifier`], the compound `(entity_type, index)` key of
//! the submission registry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Compound key identifying one logical entity
///
/// Immutable once constructed. Equality, hashing and ordering are structural
/// over both fields, so two identifiers built from the same strings always
/// address the same registry slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityIdentifier {
    entity_type: String,
    index: String,
}

impl EntityIdentifier {
    /// Create identifier
    #[inline]
    #[must_use]
    pub fn new(entity_type: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            index: index.into(),
        }
    }

    /// Entity type (study, sample, run, ...)
    #[inline]
    #[must_use]
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Index within the entity type
    #[inline]
    #[must_use]
    pub fn index(&self) -> &str {
        &self.index
    }
}

impl fmt::Display for EntityIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.entity_type, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn identifier_equality_is_structural() {
        let a = EntityIdentifier::new("sample", "sample1");
        let b = EntityIdentifier::new("sample".to_string(), "sample1".to_string());
        let c = EntityIdentifier::new("run_experiment", "sample1");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn identifier_hashes_by_both_fields() {
        let mut set = HashSet::new();
        set.insert(EntityIdentifier::new("sample", "s1"));
        set.insert(EntityIdentifier::new("sample", "s1"));
        set.insert(EntityIdentifier::new("study", "s1"));

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn identifier_display() {
        let id = EntityIdentifier::new("study", "PRJ1");
        assert_eq!(id.to_string(), "study/PRJ1");
        assert_eq!(id.entity_type(), "study");
        assert_eq!(id.index(), "PRJ1");
    }

    #[test]
    fn identifier_orders_by_type_then_index() {
        let mut ids = vec![
            EntityIdentifier::new("study", "a"),
            EntityIdentifier::new("sample", "b"),
            EntityIdentifier::new("sample", "a"),
        ];
        ids.sort();

        assert_eq!(ids[0], EntityIdentifier::new("sample", "a"));
        assert_eq!(ids[2], EntityIdentifier::new("study", "a"));
    }
}
