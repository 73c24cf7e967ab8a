//! Archive client contract
//!
//! The broker talks to every archive through [`ArchiveClient`]. Concrete
//! clients own authentication, HTTP and payload encoding; the broker only
//! hands them a payload and expects an accession back.

use crate::error::ArchiveError;

/// Archive-specific document built from entity attributes and links
pub type Payload = serde_json::Value;

/// Narrow contract every archive integration implements
#[async_trait::async_trait]
pub trait ArchiveClient: Send + Sync {
    /// Archive name accessions are recorded under (e.g. `BioSamples`)
    fn archive_name(&self) -> &str;

    /// Submit one payload
    ///
    /// # Errors
    /// Returns the archive's structured error unchanged.
    async fn submit(&self, payload: &Payload) -> Result<String, ArchiveError>;
}

/// Extract an accession from a JSON response field
///
/// # Errors
/// Returns [`ArchiveError::MissingAccession`] if `field` is absent, empty or
/// not a string.
pub fn accession_from_response(response: &Payload, field: &str) -> Result<String, ArchiveError> {
    match response.get(field).and_then(serde_json::Value::as_str) {
        Some(accession) if !accession.is_empty() => Ok(accession.to_string()),
        _ => Err(ArchiveError::MissingAccession {
            message: format!("field {field:?} missing from response"),
        }),
    }
}
