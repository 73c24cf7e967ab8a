//! Entity submission through an archive client
//!
//! Provides [`ArchiveSubmitter`], which pushes entity payloads through an
//! [`ArchiveClient`] and writes the outcome back onto the submission graph:
//! accessions on success, entity errors on failure. Errors are recorded and
//! still returned; nothing is swallowed.

use crate::client::{ArchiveClient, Payload};
use crate::config::SubmitterConfig;
use crate::error::ArchiveError;
use broker_submission::{EntityHandle, EntityIdentifier, Submission};
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Submits entities to one archive
pub struct ArchiveSubmitter {
    client: Arc<dyn ArchiveClient>,
    config: SubmitterConfig,
}

/// Per-entity outcome of [`ArchiveSubmitter::submit_all`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionReport {
    /// Archive the entities were submitted to
    pub archive: String,
    /// Entities that received an accession
    pub accessioned: BTreeMap<EntityIdentifier, String>,
    /// Entities the archive refused
    pub failed: BTreeMap<EntityIdentifier, ArchiveError>,
    /// Entities already accessioned by this archive
    pub skipped: Vec<EntityIdentifier>,
}

impl SubmissionReport {
    /// Check if no entity failed
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Failed entities worth submitting again
    #[must_use]
    pub fn retryable(&self) -> Vec<EntityIdentifier> {
        self.failed
            .iter()
            .filter(|(_, err)| err.is_retryable())
            .map(|(id, _)| id.clone())
            .collect()
    }
}

impl std::fmt::Debug for ArchiveSubmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveSubmitter")
            .field("archive", &self.client.archive_name())
            .field("config", &self.config)
            .finish()
    }
}

impl ArchiveSubmitter {
    /// Create submitter with default configuration
    #[must_use]
    pub fn new(client: Arc<dyn ArchiveClient>) -> Self {
        Self::with_config(client, SubmitterConfig::default())
    }

    /// Create submitter with explicit configuration
    #[must_use]
    pub fn with_config(client: Arc<dyn ArchiveClient>, config: SubmitterConfig) -> Self {
        Self { client, config }
    }

    /// Archive this submitter talks to
    #[inline]
    #[must_use]
    pub fn archive_name(&self) -> &str {
        self.client.archive_name()
    }

    /// Submit one entity's payload and record the outcome on the entity
    ///
    /// # Errors
    /// Returns the client's [`ArchiveError`] after recording its message as
    /// an entity error under the archive name.
    pub async fn submit_entity(
        &self,
        entity: &EntityHandle,
        payload: &Payload,
    ) -> Result<String, ArchiveError> {
        let archive = self.client.archive_name();

        match self.client.submit(payload).await {
            Ok(accession) => {
                entity.add_accession(archive, accession.clone());
                info!(
                    archive,
                    entity = %entity.identifier(),
                    accession = %accession,
                    "entity accessioned"
                );
                Ok(accession)
            }
            Err(err) => {
                entity.add_error(archive, err.to_string());
                warn!(
                    archive,
                    entity = %entity.identifier(),
                    category = %err.category(),
                    status = ?err.status(),
                    error = %err,
                    "archive rejected entity"
                );
                Err(err)
            }
        }
    }

    /// Submit every entity of one type concurrently
    ///
    /// `build_payload` turns each entity into the archive document; it gets
    /// the submission so linked entities can be resolved.
    pub async fn submit_all<F>(
        &self,
        submission: &Submission,
        entity_type: &str,
        build_payload: F,
    ) -> SubmissionReport
    where
        F: Fn(&Submission, &EntityHandle) -> Payload,
    {
        let archive = self.client.archive_name();
        let mut report = SubmissionReport {
            archive: archive.to_string(),
            ..SubmissionReport::default()
        };

        let mut pending = Vec::new();
        for entity in submission.get_entities(entity_type) {
            if self.config.skip_accessioned && entity.accession(archive).is_some() {
                debug!(archive, entity = %entity.identifier(), "already accessioned");
                report.skipped.push(entity.identifier().clone());
            } else {
                let payload = build_payload(submission, &entity);
                pending.push((entity, payload));
            }
        }

        let outcomes: Vec<(EntityIdentifier, Result<String, ArchiveError>)> = stream::iter(pending)
            .map(|(entity, payload)| async move {
                let outcome = self.submit_entity(&entity, &payload).await;
                (entity.identifier().clone(), outcome)
            })
            .buffer_unordered(self.config.max_in_flight.max(1))
            .collect()
            .await;

        for (identifier, outcome) in outcomes {
            match outcome {
                Ok(accession) => {
                    report.accessioned.insert(identifier, accession);
                }
                Err(err) => {
                    report.failed.insert(identifier, err);
                }
            }
        }

        info!(
            archive,
            entity_type,
            accessioned = report.accessioned.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            "archive submission finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_retryable_lists_transport_failures_only() {
        let mut report = SubmissionReport::default();
        report
            .failed
            .insert(EntityIdentifier::new("sample", "a"), ArchiveError::transport("timeout"));
        report.failed.insert(
            EntityIdentifier::new("sample", "b"),
            ArchiveError::validation("bad taxon", 400),
        );

        assert!(!report.is_success());
        assert_eq!(report.retryable(), vec![EntityIdentifier::new("sample", "a")]);
    }

    #[test]
    fn empty_report_is_success() {
        assert!(SubmissionReport::default().is_success());
    }
}
