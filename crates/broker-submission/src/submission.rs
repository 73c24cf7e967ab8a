//! The submission graph
//!
//! Provides [`Submission`], the registry of every entity read during one
//! brokering run. `map` is the only way to create or update an entity; the
//! registry entry for an identifier stays locked while its collision is
//! resolved, so racing callers can never register the same identifier twice.
//!
//! Reads that span several entities (`get_all_accessions`, `snapshot`, error
//! reports) copy the handle list first and then read each entity on its own.
//! They never block writers for longer than one entity and may miss values
//! added to an entity after it was read.

use crate::collision::{CollisionPolicy, Resolution};
use crate::config::SubmissionConfig;
use crate::entity::{AccessionMap, Entity, EntityHandle, EntitySnapshot, ErrorMap};
use crate::error::SubmissionError;
use crate::identifier::EntityIdentifier;
use crate::value::Attributes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Entity registry for one brokering run
#[derive(Debug, Default)]
pub struct Submission {
    registry: DashMap<EntityIdentifier, EntityHandle>,
    collision_policy: CollisionPolicy,
}

/// The same accession claimed by more than one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessionConflict {
    /// Archive that issued the accession
    pub archive: String,

    /// The shared accession
    pub accession: String,

    /// Every entity holding it, sorted
    pub claimants: Vec<EntityIdentifier>,
}

/// Serializable view of a whole submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionSnapshot {
    /// Policy the submission was created with
    pub collision_policy: CollisionPolicy,

    /// Every entity, sorted by identifier
    pub entities: Vec<EntitySnapshot>,
}

type AccessionOwners = BTreeMap<(String, String), Vec<EntityIdentifier>>;

impl Submission {
    /// Create submission that rejects duplicate mappings
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create submission with an explicit collision policy
    #[inline]
    #[must_use]
    pub fn with_policy(collision_policy: CollisionPolicy) -> Self {
        Self {
            registry: DashMap::new(),
            collision_policy,
        }
    }

    /// Create submission from configuration
    #[inline]
    #[must_use]
    pub fn with_config(config: &SubmissionConfig) -> Self {
        Self::with_policy(config.collision_policy)
    }

    /// Policy applied on remapping
    #[inline]
    #[must_use]
    pub fn collision_policy(&self) -> CollisionPolicy {
        self.collision_policy
    }

    /// Register or update an entity
    ///
    /// A new identifier creates an entity with the given attributes. A known
    /// identifier is resolved through the collision policy and the existing
    /// handle is returned, so earlier holders observe the new attributes.
    ///
    /// # Errors
    /// Returns [`SubmissionError::DuplicateIdentifier`] if the identifier is
    /// already mapped under [`CollisionPolicy::Error`]. The registry is left
    /// untouched.
    pub fn map(
        &self,
        entity_type: impl Into<String>,
        index: impl Into<String>,
        attributes: Attributes,
    ) -> Result<EntityHandle, SubmissionError> {
        let identifier = EntityIdentifier::new(entity_type, index);

        match self.registry.entry(identifier) {
            Entry::Vacant(slot) => {
                debug!(
                    entity_type = slot.key().entity_type(),
                    index = slot.key().index(),
                    "mapped new entity"
                );
                let handle = EntityHandle::new(Entity::new(slot.key().clone(), attributes));
                slot.insert(handle.clone());
                Ok(handle)
            }
            Entry::Occupied(slot) => {
                let handle = slot.get().clone();
                {
                    let mut current = handle.attributes_mut();
                    match self.collision_policy.resolve(&current, &attributes) {
                        Resolution::Rejected => {
                            warn!(
                                entity_type = slot.key().entity_type(),
                                index = slot.key().index(),
                                "rejected duplicate mapping"
                            );
                            return Err(SubmissionError::DuplicateIdentifier {
                                identifier: slot.key().clone(),
                            });
                        }
                        Resolution::Unchanged => {}
                        Resolution::Merged(merged) => *current = merged,
                    }
                }
                debug!(
                    entity_type = slot.key().entity_type(),
                    index = slot.key().index(),
                    policy = %self.collision_policy,
                    "resolved mapping collision"
                );
                Ok(handle)
            }
        }
    }

    /// Check if any entity has been mapped
    #[inline]
    #[must_use]
    pub fn has_data(&self) -> bool {
        !self.registry.is_empty()
    }

    /// Number of mapped entities
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Lookup an entity without mapping it
    #[must_use]
    pub fn get_entity(&self, entity_type: &str, index: &str) -> Option<EntityHandle> {
        self.registry
            .get(&EntityIdentifier::new(entity_type, index))
            .map(|entry| entry.value().clone())
    }

    /// All entities of one type, sorted by index
    #[must_use]
    pub fn get_entities(&self, entity_type: &str) -> Vec<EntityHandle> {
        let mut entities: Vec<EntityHandle> = self
            .registry
            .iter()
            .filter(|entry| entry.key().entity_type() == entity_type)
            .map(|entry| entry.value().clone())
            .collect();
        entities.sort_by(|a, b| a.identifier().cmp(b.identifier()));
        entities
    }

    /// Distinct entity types present, sorted
    #[must_use]
    pub fn get_entity_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .registry
            .iter()
            .map(|entry| entry.key().entity_type().to_string())
            .collect();
        types.sort();
        types.dedup();
        types
    }

    /// Resolve the links of one type to registered entities
    ///
    /// Links name an index; the target is looked up with the link type as
    /// its entity type. Targets that were never mapped are skipped.
    #[must_use]
    pub fn get_linked_entities(&self, entity: &Entity, link_type: &str) -> Vec<EntityHandle> {
        entity
            .links_for(link_type)
            .into_iter()
            .filter_map(|index| {
                let linked = self.get_entity(link_type, &index);
                if linked.is_none() {
                    debug!(
                        from = %entity.identifier(),
                        link_type,
                        index = %index,
                        "link target not mapped"
                    );
                }
                linked
            })
            .collect()
    }

    /// Union of the accessions of every resolvable linked entity
    #[must_use]
    pub fn get_linked_accessions(&self, entity: &Entity) -> AccessionMap {
        let mut linked = AccessionMap::new();
        for link_type in entity.links().into_keys() {
            for target in self.get_linked_entities(entity, &link_type) {
                for (archive, accessions) in target.accessions() {
                    linked.entry(archive).or_default().extend(accessions);
                }
            }
        }
        linked
    }

    /// Every accession in the submission, grouped by archive
    ///
    /// Entity traversal order does not affect the result. An accession held
    /// by two entities appears once; see [`Submission::accession_conflicts`].
    #[must_use]
    pub fn get_all_accessions(&self) -> AccessionMap {
        let mut all = AccessionMap::new();
        for ((archive, accession), owners) in self.accession_owners() {
            if owners.len() > 1 {
                debug!(
                    archive = %archive,
                    accession = %accession,
                    claimants = owners.len(),
                    "shared accession collapsed"
                );
            }
            all.entry(archive).or_default().insert(accession);
        }
        all
    }

    /// Accessions of one archive held by more than one entity
    #[must_use]
    pub fn accession_conflicts(&self) -> Vec<AccessionConflict> {
        self.accession_owners()
            .into_iter()
            .filter(|(_, owners)| owners.len() > 1)
            .map(|((archive, accession), claimants)| {
                warn!(
                    archive = %archive,
                    accession = %accession,
                    claimants = claimants.len(),
                    "accession claimed by more than one entity"
                );
                AccessionConflict {
                    archive,
                    accession,
                    claimants,
                }
            })
            .collect()
    }

    /// Check if any entity recorded an error
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.handles().iter().any(|entity| entity.has_errors())
    }

    /// Errors of one entity type, keyed by index
    #[must_use]
    pub fn get_errors(&self, entity_type: &str) -> BTreeMap<String, ErrorMap> {
        self.get_entities(entity_type)
            .into_iter()
            .filter(|entity| entity.has_errors())
            .map(|entity| (entity.identifier().index().to_string(), entity.errors()))
            .collect()
    }

    /// Errors of every entity, keyed by type then index
    #[must_use]
    pub fn get_all_errors(&self) -> BTreeMap<String, BTreeMap<String, ErrorMap>> {
        let mut all: BTreeMap<String, BTreeMap<String, ErrorMap>> = BTreeMap::new();
        for entity in self.handles() {
            let errors = entity.errors();
            if errors.is_empty() {
                continue;
            }
            let id = entity.identifier();
            all.entry(id.entity_type().to_string())
                .or_default()
                .insert(id.index().to_string(), errors);
        }
        all
    }

    /// Serializable copy of the whole submission
    #[must_use]
    pub fn snapshot(&self) -> SubmissionSnapshot {
        SubmissionSnapshot {
            collision_policy: self.collision_policy,
            entities: self.handles().iter().map(|entity| entity.snapshot()).collect(),
        }
    }

    /// Clone every handle out of the registry, sorted by identifier
    fn handles(&self) -> Vec<EntityHandle> {
        let mut handles: Vec<EntityHandle> =
            self.registry.iter().map(|entry| entry.value().clone()).collect();
        handles.sort_by(|a, b| a.identifier().cmp(b.identifier()));
        handles
    }

    fn accession_owners(&self) -> AccessionOwners {
        let mut owners = AccessionOwners::new();
        for entity in self.handles() {
            for (archive, accessions) in entity.accessions() {
                for accession in accessions {
                    owners
                        .entry((archive.clone(), accession))
                        .or_default()
                        .push(entity.identifier().clone());
                }
            }
        }
        owners
    }
}
