//! Submission Broker Core
//!
//! In-memory submission graph for brokering metadata into biological-data
//! archives.
//!
//! # Overview
//!
//! - **EntityIdentifier**: `(entity_type, index)` registry key
//! - **Entity**: attributes, accessions by archive, links by type
//! - **CollisionPolicy**: what a second mapping of a known identifier does
//! - **Submission**: the registry, safe to share across threads and tasks
//!
//! # Example
//!
//! ```rust
//! use broker_submission::{attributes, CollisionPolicy, Submission};
//!
//! let submission = Submission::with_policy(CollisionPolicy::Update);
//!
//! let study = submission.map("study", "study1", attributes! { "title" => "SARS-CoV-2" }).unwrap();
//! let sample = submission.map("sample", "sample1", attributes! { "alias" => "s1" }).unwrap();
//! sample.add_accession("BioSamples", "SAME123");
//! study.add_link("sample", "sample1");
//!
//! let linked = submission.get_linked_accessions(&study);
//! assert!(linked["BioSamples"].contains("SAME123"));
//! assert!(submission.get_all_accessions()["BioSamples"].contains("SAME123"));
//! ```

#![warn(missing_docs)]

pub mod collision;
pub mod config;
pub mod entity;
pub mod error;
pub mod identifier;
pub mod submission;
pub mod value;

// Re-exports
pub use collision::{CollisionPolicy, Resolution};
pub use config::SubmissionConfig;
pub use entity::{AccessionMap, Entity, EntityHandle, EntitySnapshot, ErrorMap, LinkMap};
pub use error::SubmissionError;
pub use identifier::EntityIdentifier;
pub use submission::{AccessionConflict, Submission, SubmissionSnapshot};
pub use value::{AttributeValue, Attributes};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building a submission
    pub use crate::{
        attributes, AttributeValue, Attributes, CollisionPolicy, EntityHandle, EntityIdentifier,
        Submission, SubmissionError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
