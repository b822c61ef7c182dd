//! One-time provisioning of the storage backend's vector capability.
//!
//! Provisioning is idempotent and runs once before ingestion, never inside
//! it. A failure is non-fatal: the backend may already support vectors, and
//! if it does not, the first write will fail loudly.

use std::fmt;

use async_trait::async_trait;

/// Result of [`Provisioner::ensure_vector_extension`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The capability was missing and has been enabled.
    Enabled,
    /// The capability was already available.
    AlreadyPresent,
    /// Enabling failed; ingestion may still proceed.
    Failed(String),
}

impl ProvisionOutcome {
    /// Whether the backend is known to support vectors.
    pub fn is_ready(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for ProvisionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enabled => f.write_str("vector extension enabled"),
            Self::AlreadyPresent => f.write_str("vector extension already present"),
            Self::Failed(reason) => write!(f, "could not ensure vector extension: {reason}"),
        }
    }
}

/// A backend that can make sure vector storage is available.
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Enable the vector capability if needed. Never returns an error.
    async fn ensure_vector_extension(&self) -> ProvisionOutcome;
}
