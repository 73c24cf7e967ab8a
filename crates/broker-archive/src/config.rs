//! Submitter configuration

use serde::{Deserialize, Serialize};

/// Settings for an [`ArchiveSubmitter`](crate::ArchiveSubmitter)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmitterConfig {
    /// Maximum concurrent requests to the archive
    pub max_in_flight: usize,
    /// Skip entities this archive has already accessioned
    pub skip_accessioned: bool,
}

impl SubmitterConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With max in-flight requests (clamped to at least one)
    #[inline]
    #[must_use]
    pub fn with_max_in_flight(mut self, max: usize) -> Self {
        self.max_in_flight = max.max(1);
        self
    }

    /// With skipping of already accessioned entities
    #[inline]
    #[must_use]
    pub fn with_skip_accessioned(mut self, skip: bool) -> Self {
        self.skip_accessioned = skip;
        self
    }
}

impl Default for SubmitterConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 4,
            skip_accessioned: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SubmitterConfig::new();
        assert_eq!(config.max_in_flight, 4);
        assert!(config.skip_accessioned);
    }

    #[test]
    fn max_in_flight_never_zero() {
        assert_eq!(SubmitterConfig::new().with_max_in_flight(0).max_in_flight, 1);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: SubmitterConfig = serde_json::from_str(r#"{ "max_in_flight": 16 }"#).unwrap();
        assert_eq!(config.max_in_flight, 16);
        assert!(config.skip_accessioned);
    }
}
