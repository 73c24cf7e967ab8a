//! Submission configuration

use crate::collision::CollisionPolicy;
use serde::{Deserialize, Serialize};

/// Settings fixed when a [`Submission`](crate::Submission) is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Policy applied when an identifier is mapped twice
    pub collision_policy: CollisionPolicy,
}

impl SubmissionConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With collision policy
    #[inline]
    #[must_use]
    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }
}
