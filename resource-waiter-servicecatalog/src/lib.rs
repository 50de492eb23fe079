//! AWS Service Catalog waiters built on `resource-waiter-core`:
//! - Status fetchers for products and provisioning artifacts
//! - Ready / deleted waiters with their default timeouts
//! - A `CatalogApi` seam over the AWS SDK client

mod aws;
mod error;
pub mod status;
pub mod waiters;

pub use aws::catalog_client::{CatalogApi, ServiceCatalogClient};
pub use aws::{CatalogError, CatalogResult};
pub use error::{ResourceKind, ServiceCatalogError, ServiceCatalogResult, WaitGoal};
pub use status::{product_status, product_status_label, provisioning_artifact_status};
pub use waiters::{
    product_deleted, product_ready, provisioning_artifact_deleted, provisioning_artifact_ready,
    PRODUCT_DELETE_TIMEOUT, PRODUCT_READY_TIMEOUT, PROVISIONING_ARTIFACT_DELETED_TIMEOUT,
    PROVISIONING_ARTIFACT_READY_TIMEOUT, STATUS_CREATED,
};

// Callers build settings and inspect outcomes with these.
pub use resource_waiter_core::{Backoff, CancellationToken, PollSettings, State, WaitError};
