//! Archive communication errors
//!
//! Every failure an archive client reports is mapped onto [`ArchiveError`]
//! so that the brokering workflow can decide between retrying and aborting
//! without knowing which archive it talked to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Structured error returned by an archive client
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArchiveError {
    /// Credentials rejected or session expired
    #[error("authentication failed ({status}): {message}")]
    Authentication {
        /// Message from the archive
        message: String,
        /// HTTP status code
        status: u16,
    },

    /// Payload rejected by archive validation
    #[error("validation rejected ({status}): {message}")]
    Validation {
        /// Message from the archive
        message: String,
        /// HTTP status code
        status: u16,
    },

    /// Network or server failure
    #[error("transport failure: {message}")]
    Transport {
        /// Description of the failure
        message: String,
    },

    /// Archive accepted the payload but returned no accession
    #[error("response carried no accession: {message}")]
    MissingAccession {
        /// Description of the response
        message: String,
    },
}

/// Coarse classification of an [`ArchiveError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Credentials
    Authentication,
    /// Payload content
    Validation,
    /// Network or server
    Transport,
    /// Response shape
    Response,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Authentication => "authentication",
            Self::Validation => "validation",
            Self::Transport => "transport",
            Self::Response => "response",
        };
        f.write_str(name)
    }
}

impl ArchiveError {
    /// Authentication failure
    #[must_use]
    pub fn authentication(message: impl Into<String>, status: u16) -> Self {
        Self::Authentication {
            message: message.into(),
            status,
        }
    }

    /// Validation rejection
    #[must_use]
    pub fn validation(message: impl Into<String>, status: u16) -> Self {
        Self::Validation {
            message: message.into(),
            status,
        }
    }

    /// Transport failure
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Message reported by the archive
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Authentication { message, .. }
            | Self::Validation { message, .. }
            | Self::Transport { message }
            | Self::MissingAccession { message } => message,
        }
    }

    /// HTTP status, when the archive answered
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. } | Self::Validation { status, .. } => Some(*status),
            Self::Transport { .. } | Self::MissingAccession { .. } => None,
        }
    }

    /// Error category
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication { .. } => ErrorCategory::Authentication,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Transport { .. } => ErrorCategory::Transport,
            Self::MissingAccession { .. } => ErrorCategory::Response,
        }
    }

    /// Check if resubmitting the same payload can succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}
