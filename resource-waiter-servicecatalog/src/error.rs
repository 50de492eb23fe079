//! Error type for Service Catalog waits.

use crate::aws::CatalogError;
use resource_waiter_core::WaitError;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Product,
    ProvisioningArtifact,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Product => f.write_str("product"),
            Self::ProvisioningArtifact => f.write_str("provisioning artifact"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitGoal {
    Ready,
    Deleted,
}

impl fmt::Display for WaitGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => f.write_str("become ready"),
            Self::Deleted => f.write_str("be deleted"),
        }
    }
}

/// A failed wait on a Service Catalog resource, tagged with the resource it
/// was waiting on.
#[derive(Debug, Error)]
#[error("error waiting for {kind} ({id}) to {goal}: {source}")]
pub struct ServiceCatalogError {
    pub kind: ResourceKind,
    pub id: String,
    pub goal: WaitGoal,
    #[source]
    pub source: WaitError<CatalogError>,
}

impl ServiceCatalogError {
    pub(crate) fn new(
        kind: ResourceKind,
        id: &str,
        goal: WaitGoal,
        source: WaitError<CatalogError>,
    ) -> Self {
        Self {
            kind,
            id: id.to_string(),
            goal,
            source,
        }
    }

    /// The underlying waiter outcome, for callers that branch on timeout
    /// versus unexpected state.
    pub fn wait_error(&self) -> &WaitError<CatalogError> {
        &self.source
    }
}

pub type ServiceCatalogResult<T> = Result<T, ServiceCatalogError>;
