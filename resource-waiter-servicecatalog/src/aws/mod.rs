//! AWS SDK integration: Service Catalog client wrapper and error classification.

pub(crate) mod catalog_client;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The API answered with `ResourceNotFoundException`.
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),
    #[error("Service Catalog API error: {0}")]
    SdkError(String),
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ResourceNotFound(_))
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
