//! Entities tracked by a submission
//!
//! An [`Entity`] is owned by the registry of a [`Submission`] and shared with
//! collaborators through [`EntityHandle`]. Every mutable field sits behind its
//! own lock, so archive integrations can record accessions, links and errors
//! from any thread without losing concurrent writes.
//!
//! [`Submission`]: crate::Submission

use crate::identifier::EntityIdentifier;
use crate::value::{AttributeValue, Attributes};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Deref;
use std::sync::Arc;

/// Accessions grouped by archive name
pub type AccessionMap = BTreeMap<String, BTreeSet<String>>;

/// Outbound links grouped by link type
pub type LinkMap = BTreeMap<String, BTreeSet<String>>;

/// Error messages grouped by key (usually the archive that reported them)
pub type ErrorMap = BTreeMap<String, Vec<String>>;

/// A logical domain object (study, sample, experiment, run)
#[derive(Debug)]
pub struct Entity {
    identifier: EntityIdentifier,
    attributes: RwLock<Attributes>,
    accessions: Mutex<AccessionMap>,
    links: Mutex<LinkMap>,
    errors: Mutex<ErrorMap>,
}

impl Entity {
    pub(crate) fn new(identifier: EntityIdentifier, attributes: Attributes) -> Self {
        Self {
            identifier,
            attributes: RwLock::new(attributes),
            accessions: Mutex::new(AccessionMap::new()),
            links: Mutex::new(LinkMap::new()),
            errors: Mutex::new(ErrorMap::new()),
        }
    }

    /// Identifier this entity is registered under
    #[inline]
    #[must_use]
    pub fn identifier(&self) -> &EntityIdentifier {
        &self.identifier
    }

    /// Snapshot of the current attributes
    #[must_use]
    pub fn attributes(&self) -> Attributes {
        self.attributes.read().clone()
    }

    /// Single attribute value
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<AttributeValue> {
        self.attributes.read().get(key).cloned()
    }

    /// Lock the attributes for a collision merge.
    ///
    /// Only the registry calls this, while it holds the entry for this
    /// entity's identifier.
    pub(crate) fn attributes_mut(&self) -> parking_lot::RwLockWriteGuard<'_, Attributes> {
        self.attributes.write()
    }

    /// Record an accession issued by `archive`
    ///
    /// Returns `false` if the pair was already recorded.
    pub fn add_accession(&self, archive: impl Into<String>, accession: impl Into<String>) -> bool {
        self.accessions
            .lock()
            .entry(archive.into())
            .or_default()
            .insert(accession.into())
    }

    /// Snapshot of all accessions
    #[must_use]
    pub fn accessions(&self) -> AccessionMap {
        self.accessions.lock().clone()
    }

    /// Accessions issued by one archive
    #[must_use]
    pub fn accessions_for(&self, archive: &str) -> BTreeSet<String> {
        self.accessions
            .lock()
            .get(archive)
            .cloned()
            .unwrap_or_default()
    }

    /// First accession issued by `archive`, if any
    #[must_use]
    pub fn accession(&self, archive: &str) -> Option<String> {
        self.accessions
            .lock()
            .get(archive)
            .and_then(|set| set.iter().next().cloned())
    }

    /// Check if any archive has accessioned this entity
    #[must_use]
    pub fn has_accessions(&self) -> bool {
        self.accessions.lock().values().any(|set| !set.is_empty())
    }

    /// Record an outbound link to another entity's index
    ///
    /// The target does not need to be mapped yet. Returns `false` if the
    /// link was already recorded.
    pub fn add_link(&self, link_type: impl Into<String>, target_index: impl Into<String>) -> bool {
        self.links
            .lock()
            .entry(link_type.into())
            .or_default()
            .insert(target_index.into())
    }

    /// Snapshot of all links
    #[must_use]
    pub fn links(&self) -> LinkMap {
        self.links.lock().clone()
    }

    /// Linked indices of one link type
    #[must_use]
    pub fn links_for(&self, link_type: &str) -> BTreeSet<String> {
        self.links.lock().get(link_type).cloned().unwrap_or_default()
    }

    /// Record an error against this entity
    pub fn add_error(&self, key: impl Into<String>, message: impl Into<String>) {
        self.errors
            .lock()
            .entry(key.into())
            .or_default()
            .push(message.into());
    }

    /// Snapshot of recorded errors
    #[must_use]
    pub fn errors(&self) -> ErrorMap {
        self.errors.lock().clone()
    }

    /// Check if any error was recorded
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.lock().is_empty()
    }

    /// Serializable copy of the whole entity
    #[must_use]
    pub fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            identifier: self.identifier.clone(),
            attributes: self.attributes(),
            accessions: self.accessions(),
            links: self.links(),
            errors: self.errors(),
        }
    }
}

/// Shared reference to an entity owned by a submission
///
/// Cloning a handle never copies the entity; every clone observes the same
/// attributes, accessions and links.
#[derive(Debug, Clone)]
pub struct EntityHandle(Arc<Entity>);

impl EntityHandle {
    pub(crate) fn new(entity: Entity) -> Self {
        Self(Arc::new(entity))
    }

    /// Check if both handles refer to the same registered entity
    #[inline]
    #[must_use]
    pub fn same_entity(&self, other: &EntityHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for EntityHandle {
    type Target = Entity;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Point-in-time copy of an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Registry key
    pub identifier: EntityIdentifier,

    /// Attributes at snapshot time
    pub attributes: Attributes,

    /// Accessions by archive
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub accessions: AccessionMap,

    /// Links by link type
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub links: LinkMap,

    /// Errors by key
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: ErrorMap,
}
