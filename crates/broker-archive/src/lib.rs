//! Archive integration contract for the submission broker
//!
//! Archive clients (sample registries, study registries, read archives) are
//! external collaborators. This crate fixes the one shape they share:
//!
//! - [`ArchiveClient`]: submit a payload, receive an accession
//! - [`ArchiveError`]: structured failure with message, status and category
//! - [`ArchiveSubmitter`]: pushes entities through a client and records
//!   accessions and errors on the submission graph

#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod submitter;

// Re-exports
pub use client::{accession_from_response, ArchiveClient, Payload};
pub use config::SubmitterConfig;
pub use error::{ArchiveError, ErrorCategory};
pub use submitter::{ArchiveSubmitter, SubmissionReport};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
